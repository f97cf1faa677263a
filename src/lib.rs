//! # puglify
//!
//! Source minification on a dedicated worker thread, inside a sandboxed Lua
//! engine, with results streamed back to a single-threaded host.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │              Host (tokio current-thread + LocalSet)      │
//! │   Session::create / start / send / close_input           │
//! └─────────────────────────────────────────────────────────┘
//!                          │ Request
//!                          ▼ [bridge: inbound BridgeQueue]
//! ┌─────────────────────────────────────────────────────────┐
//! │                Worker thread (one per session)           │
//! │   bootstrap: source → compile → run → globals → minify   │
//! │   serving loop: read → pipeline → write → signal         │
//! └─────────────────────────────────────────────────────────┘
//!                          │ Response
//!                          ▼ [bridge: outbound BridgeQueue + Progress]
//! ┌─────────────────────────────────────────────────────────┐
//! │                Event-loop adapter (host thread)          │
//! │   drain_all → on_data ... → on_complete                  │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! [`Minifier`] layers a round-robin pool with id correlation on top of
//! [`Session`].

pub mod bridge;
pub mod config;
pub mod engine;
pub mod error;
pub mod pool;
pub mod protocol;
pub mod session;

pub use config::Settings;
pub use error::{ErrorKind, Phase, SessionError};
pub use pool::{Minifier, PoolError};
pub use protocol::{Minified, Request, Response};
pub use session::Session;
