//! Error types for sessions and the scripting engine.
//!
//! Failures fall into two disjoint phases. Bootstrap kinds are terminal: the
//! session reports exactly one of them through its error callback and never
//! serves a request. Request kinds are scoped to a single request and travel
//! back through the data callback as a [`Response::Failure`].
//!
//! [`Response::Failure`]: crate::protocol::Response::Failure

use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Which phase of a session an [`ErrorKind`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// One-time preparation of the engine context. Failures are terminal.
    Bootstrap,
    /// Per-request transformation. Failures affect only that request.
    Request,
}

/// Closed set of failure kinds a session can report.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The vendored minifier source could not be obtained.
    #[error("The included minifier bundle is missing or corrupted.")]
    SourceMissing,

    /// The vendored source did not compile.
    #[error("The minifier bundle failed to compile.")]
    CompilationFailure,

    /// Executing the compiled bundle raised an error.
    #[error("The minifier bundle raised an error while attaching to the global scope.")]
    RuntimeFailure,

    /// The engine context has no usable global object.
    #[error("Could not access globals from the context.")]
    ContextMissingGlobals,

    /// The entry point binding is absent from the global object.
    #[error("The global minify function is not present in the context.")]
    EntryPointNotFound,

    /// The entry point binding exists but cannot be called.
    #[error("The global minify was not a function.")]
    EntryPointNotCallable,

    /// The request's source text could not become an engine string.
    #[error("The input source could not be converted to a string.")]
    BadInput,

    /// The entry point returned something that is not an object.
    #[error("The result from minify was not an object.")]
    MalformedResult,

    /// The entry point reported neither an error nor any code.
    #[error("The code property was not attached to the minify result.")]
    CodeMissing,
}

impl ErrorKind {
    /// Every kind, bootstrap kinds first, in step order.
    pub const ALL: [ErrorKind; 9] = [
        Self::SourceMissing,
        Self::CompilationFailure,
        Self::RuntimeFailure,
        Self::ContextMissingGlobals,
        Self::EntryPointNotFound,
        Self::EntryPointNotCallable,
        Self::BadInput,
        Self::MalformedResult,
        Self::CodeMissing,
    ];

    /// The phase this kind can occur in.
    pub fn phase(self) -> Phase {
        match self {
            Self::SourceMissing
            | Self::CompilationFailure
            | Self::RuntimeFailure
            | Self::ContextMissingGlobals
            | Self::EntryPointNotFound
            | Self::EntryPointNotCallable => Phase::Bootstrap,
            Self::BadInput | Self::MalformedResult | Self::CodeMissing => Phase::Request,
        }
    }

    /// Whether this kind ends the session.
    pub fn is_terminal(self) -> bool {
        self.phase() == Phase::Bootstrap
    }
}

/// A session-level failure, as delivered to the error callback.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}{}", detail_suffix(.detail))]
pub struct SessionError {
    kind: ErrorKind,
    detail: Option<String>,
}

impl SessionError {
    /// Create an error with no engine diagnostic attached.
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, detail: None }
    }

    /// Create an error carrying the engine's own diagnostic.
    pub fn with_detail(kind: ErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: Some(detail.into()),
        }
    }

    /// The engine context (and so its globals) could not be brought up at all.
    pub(crate) fn context_unavailable(detail: impl Into<String>) -> Self {
        Self::with_detail(ErrorKind::ContextMissingGlobals, detail)
    }

    /// The failure kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Diagnostic text from the engine, if any.
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail
        .as_deref()
        .map(|detail| format!(" ({detail})"))
        .unwrap_or_default()
}

impl From<ErrorKind> for SessionError {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

/// A diagnostic raised by the scripting engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct EngineError {
    message: String,
}

impl EngineError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<mlua::Error> for EngineError {
    fn from(err: mlua::Error) -> Self {
        Self::new(err.to_string())
    }
}
