//! Per-request transformation: text in, minified bytes or a rejection out.

use tracing::warn;

use crate::engine::Engine;
use crate::error::ErrorKind;
use crate::protocol::{Minified, Outcome, Rejection};

/// Fallback when the minifier's `error` value has no textual form.
const UNKNOWN_ERROR: &str = "Unknown error.";

/// Run `code` through the resolved entry point.
///
/// 1. convert the text to an engine string ([`ErrorKind::BadInput`])
/// 2. call the entry point with it as the only argument
/// 3. view the result as an object ([`ErrorKind::MalformedResult`])
/// 4. a present `error` field wins; otherwise `code` is required
///    ([`ErrorKind::CodeMissing`])
///
/// An entry point that raises instead of returning yields nothing usable as
/// an object and is reported as [`ErrorKind::MalformedResult`].
pub fn transform<E: Engine>(engine: &E, entry_point: &E::Function, code: &str) -> Outcome {
    let input = engine
        .new_string(code)
        .map_err(|_| Rejection::Pipeline(ErrorKind::BadInput))?;

    let returned = engine.call(entry_point, input).map_err(|err| {
        warn!(error = %err, "minifier entry point raised");
        Rejection::Pipeline(ErrorKind::MalformedResult)
    })?;

    let result = engine
        .as_object(returned)
        .ok_or(Rejection::Pipeline(ErrorKind::MalformedResult))?;

    if let Some(error) = engine.get_property(&result, "error") {
        let message = engine
            .as_text(&error)
            .unwrap_or_else(|| UNKNOWN_ERROR.to_string());
        return Err(Rejection::Minifier(message));
    }

    engine
        .get_property(&result, "code")
        .and_then(|value| engine.as_bytes(&value))
        .map(Minified::new)
        .ok_or(Rejection::Pipeline(ErrorKind::CodeMissing))
}
