//! Message types exchanged between the host and a session's worker thread.
//!
//! Requests travel host → worker, responses travel worker → host. Both are
//! plain owned values so they can cross the thread boundary by move.

use std::fmt;

use serde::ser::SerializeMap;
use serde::{ser, Deserialize, Serialize, Serializer};
use thiserror::Error;

use crate::error::ErrorKind;

/// Event tags understood by the serving loop.
pub mod events {
    /// Run the transformation pipeline and answer with a result.
    pub const MINIFY: &str = "minify";
    /// Stop the serving loop. Never answered.
    pub const TERMINATE: &str = "terminate";
    /// Tag carried by every response.
    pub const RESULT: &str = "result";
}

// ============================================================================
// Request
// ============================================================================

/// A message sent from the host to the worker.
///
/// `id` is a caller-assigned correlation token and `name` an opaque label;
/// both are echoed back untouched. Tags other than `minify` and `terminate`
/// are accepted and silently dropped by the worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub id: String,
    pub name: String,
    pub event: String,
    #[serde(default)]
    pub code: String,
}

impl Request {
    /// A request to minify `code`.
    pub fn minify(id: impl Into<String>, name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            event: events::MINIFY.to_string(),
            code: code.into(),
        }
    }

    /// The shutdown sentinel.
    pub fn terminate() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            event: events::TERMINATE.to_string(),
            code: String::new(),
        }
    }

    /// Parse a request from its JSON form.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn is_minify(&self) -> bool {
        self.event == events::MINIFY
    }

    pub fn is_terminate(&self) -> bool {
        self.event == events::TERMINATE
    }
}

// ============================================================================
// Minified buffer
// ============================================================================

/// Minified output, produced on the worker thread and released on the host.
///
/// Deliberately not `Clone`: the buffer has exactly one owner at a time and
/// moves from the worker into the outbound queue and from there to the host.
#[derive(PartialEq, Eq)]
pub struct Minified(Box<[u8]>);

impl Minified {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes.into_boxed_slice())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// The output as UTF-8, if it is valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.0).ok()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0.into_vec()
    }
}

impl AsRef<[u8]> for Minified {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Minified {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Minified")
            .field(&String::from_utf8_lossy(&self.0))
            .finish()
    }
}

// ============================================================================
// Response
// ============================================================================

/// Why a single request failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// A pipeline step failed before the minifier could report anything.
    #[error("{0}")]
    Pipeline(ErrorKind),
    /// The minifier itself reported an error for this input.
    #[error("{0}")]
    Minifier(String),
}

/// The outcome of running one request through the pipeline.
pub type Outcome = Result<Minified, Rejection>;

/// A message sent from the worker back to the host.
///
/// Always tagged `"result"`. A success carries the minified code and no
/// error; a failure carries a message and no code at all.
#[derive(Debug, PartialEq, Eq)]
pub enum Response {
    Success {
        id: String,
        name: String,
        code: Minified,
    },
    Failure {
        id: String,
        name: String,
        message: String,
    },
}

impl Response {
    /// Build the response for a request's pipeline outcome.
    pub fn from_outcome(id: String, name: String, outcome: Outcome) -> Self {
        match outcome {
            Ok(code) => Self::Success { id, name, code },
            Err(rejection) => Self::Failure {
                id,
                name,
                message: rejection.to_string(),
            },
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Success { id, .. } | Self::Failure { id, .. } => id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Success { name, .. } | Self::Failure { name, .. } => name,
        }
    }

    pub fn event(&self) -> &'static str {
        events::RESULT
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// The failure message, absent on success.
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failure { message, .. } => Some(message),
            Self::Success { .. } => None,
        }
    }

    /// The minified code, absent on failure.
    pub fn code(&self) -> Option<&Minified> {
        match self {
            Self::Success { code, .. } => Some(code),
            Self::Failure { .. } => None,
        }
    }

    /// Take ownership of the minified code.
    pub fn into_code(self) -> Option<Minified> {
        match self {
            Self::Success { code, .. } => Some(code),
            Self::Failure { .. } => None,
        }
    }

    /// Serialize to JSON. Fails when the minified code is not valid UTF-8.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Serializes to the host-facing shape: `error` is `null` on success and the
/// `code` key is omitted entirely on failure.
impl Serialize for Response {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if self.is_success() { 5 } else { 4 };
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry("id", self.id())?;
        map.serialize_entry("name", self.name())?;
        map.serialize_entry("event", self.event())?;
        map.serialize_entry("error", &self.error())?;
        if let Some(code) = self.code() {
            let text = code
                .as_str()
                .ok_or_else(|| <S::Error as ser::Error>::custom("minified code is not valid UTF-8"))?;
            map.serialize_entry("code", text)?;
        }
        map.end()
    }
}
