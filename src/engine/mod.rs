//! The scripting-engine collaborator.
//!
//! A session only needs a handful of engine capabilities: compile and run the
//! vendored bundle, look up its entry point on the global object, call it with
//! a string, and read fields back off the returned object. [`Engine`] captures
//! exactly that, so the bootstrap and pipeline logic stay independent of the
//! concrete engine. [`LuaEngine`] is the production implementation.
//!
//! Engines are created on, used from, and dropped on the worker thread only,
//! so implementations need not be `Send`.

mod lua;
mod source;

pub use lua::LuaEngine;
pub use source::{ScriptSource, BUNDLED_SCRIPT};

use crate::error::EngineResult;

/// Default name of the global the bundle installs.
pub const DEFAULT_ENTRY_POINT: &str = "minify";

/// Operations a scripting engine context must provide.
///
/// Lookups that can come back empty return `Option`, with `None` standing for
/// the engine's "absent" value (`nil`, `undefined`, ...).
pub trait Engine {
    /// A compiled but not yet executed chunk of script.
    type Unit;
    /// Any engine value.
    type Value;
    /// An engine value with properties.
    type Object;
    /// A callable engine value.
    type Function;

    /// Convert host text into an engine string.
    fn new_string(&self, text: &str) -> EngineResult<Self::Value>;

    /// Compile script source without running it.
    fn compile(&self, source: &str) -> EngineResult<Self::Unit>;

    /// Execute a compiled unit in the context's global scope.
    fn run(&self, unit: &Self::Unit) -> EngineResult<Self::Value>;

    /// The context's global object.
    fn global_object(&self) -> EngineResult<Self::Object>;

    /// Read a property, `None` when absent.
    fn get_property(&self, object: &Self::Object, name: &str) -> Option<Self::Value>;

    /// View a value as callable.
    fn as_function(&self, value: Self::Value) -> Option<Self::Function>;

    /// View a value as an object.
    fn as_object(&self, value: Self::Value) -> Option<Self::Object>;

    /// Call `function` with a single argument.
    fn call(&self, function: &Self::Function, arg: Self::Value) -> EngineResult<Self::Value>;

    /// Render a value as human-readable text (used for error fields).
    fn as_text(&self, value: &Self::Value) -> Option<String>;

    /// Raw bytes of a textual value (used for the code field).
    fn as_bytes(&self, value: &Self::Value) -> Option<Vec<u8>>;
}
