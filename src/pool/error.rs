//! Pool-specific error types.

use thiserror::Error;

use crate::error::SessionError;

/// Result type for pool operations.
pub type PoolResult<T> = Result<T, PoolError>;

/// Errors that can occur while using a [`Minifier`](super::Minifier).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// A session failed to bootstrap while the pool was being built.
    #[error("session bootstrap failed: {0}")]
    Bootstrap(#[from] SessionError),

    /// The session serving the request exited before answering it.
    #[error("minifier session closed before responding")]
    Closed,
}
