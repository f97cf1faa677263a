//! One-time preparation of a session's engine context.

use tracing::{debug, info};

use crate::engine::{Engine, ScriptSource};
use crate::error::{ErrorKind, SessionError};

/// Load, compile and run the bundle, then resolve `entry_point` on the
/// context's global object.
///
/// Steps run strictly in order and stop at the first failure, which is
/// reported with that step's kind:
///
/// 1. obtain the source text ([`ErrorKind::SourceMissing`])
/// 2. compile it ([`ErrorKind::CompilationFailure`])
/// 3. run it ([`ErrorKind::RuntimeFailure`])
/// 4. fetch the global object ([`ErrorKind::ContextMissingGlobals`])
/// 5. look up the entry point ([`ErrorKind::EntryPointNotFound`])
/// 6. check it is callable ([`ErrorKind::EntryPointNotCallable`])
pub fn bootstrap<E: Engine>(
    engine: &E,
    source: &ScriptSource,
    entry_point: &str,
) -> Result<E::Function, SessionError> {
    let text = source
        .load()
        .map_err(|err| SessionError::with_detail(ErrorKind::SourceMissing, err.to_string()))?;
    debug!(bytes = text.len(), "loaded minifier bundle");

    let unit = engine
        .compile(&text)
        .map_err(|err| SessionError::with_detail(ErrorKind::CompilationFailure, err.message()))?;

    engine
        .run(&unit)
        .map_err(|err| SessionError::with_detail(ErrorKind::RuntimeFailure, err.message()))?;

    let globals = engine.global_object().map_err(|err| {
        SessionError::with_detail(ErrorKind::ContextMissingGlobals, err.message())
    })?;

    let binding = engine
        .get_property(&globals, entry_point)
        .ok_or_else(|| SessionError::new(ErrorKind::EntryPointNotFound))?;

    let function = engine
        .as_function(binding)
        .ok_or_else(|| SessionError::new(ErrorKind::EntryPointNotCallable))?;

    info!(entry_point, "minifier entry point resolved");
    Ok(function)
}
