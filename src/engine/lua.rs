//! Sandboxed Lua 5.4 engine backed by `mlua`.

use mlua::{Function, Lua, LuaOptions, StdLib, Table, Value};

use super::Engine;
use crate::error::EngineResult;

/// Chunk name reported in Lua diagnostics.
const CHUNK_NAME: &str = "=minify.lua";

/// A private Lua state with no access to the filesystem, processes or modules.
///
/// Only the base, `string`, `table`, `math` and `utf8` libraries are opened,
/// and the base library's file loaders are removed.
pub struct LuaEngine {
    lua: Lua,
}

impl LuaEngine {
    /// Create a sandboxed state, optionally capping its heap at `memory_limit` bytes.
    pub fn sandboxed(memory_limit: Option<usize>) -> EngineResult<Self> {
        let lua = Lua::new_with(sandbox_libraries(), LuaOptions::default())?;
        let globals = lua.globals();
        for name in FILE_LOADERS {
            globals.raw_set(*name, Value::Nil)?;
        }
        if let Some(limit) = memory_limit {
            lua.set_memory_limit(limit)?;
        }
        Ok(Self { lua })
    }

    /// Bytes currently allocated by the state.
    pub fn used_memory(&self) -> usize {
        self.lua.used_memory()
    }
}

/// Base library functions that read from the host filesystem.
const FILE_LOADERS: &[&str] = &["dofile", "loadfile"];

/// Libraries opened in every state, on top of the always-present base library.
fn sandbox_libraries() -> StdLib {
    StdLib::STRING | StdLib::TABLE | StdLib::MATH | StdLib::UTF8
}

impl Engine for LuaEngine {
    type Unit = Function;
    type Value = Value;
    type Object = Table;
    type Function = Function;

    fn new_string(&self, text: &str) -> EngineResult<Value> {
        Ok(Value::String(self.lua.create_string(text)?))
    }

    fn compile(&self, source: &str) -> EngineResult<Function> {
        Ok(self.lua.load(source).set_name(CHUNK_NAME).into_function()?)
    }

    fn run(&self, unit: &Function) -> EngineResult<Value> {
        Ok(unit.call::<Value>(())?)
    }

    fn global_object(&self) -> EngineResult<Table> {
        Ok(self.lua.globals())
    }

    fn get_property(&self, object: &Table, name: &str) -> Option<Value> {
        match object.raw_get::<Value>(name) {
            Ok(Value::Nil) | Err(_) => None,
            Ok(value) => Some(value),
        }
    }

    fn as_function(&self, value: Value) -> Option<Function> {
        match value {
            Value::Function(function) => Some(function),
            _ => None,
        }
    }

    fn as_object(&self, value: Value) -> Option<Table> {
        match value {
            Value::Table(table) => Some(table),
            _ => None,
        }
    }

    fn call(&self, function: &Function, arg: Value) -> EngineResult<Value> {
        Ok(function.call::<Value>(arg)?)
    }

    fn as_text(&self, value: &Value) -> Option<String> {
        match value {
            Value::String(s) => Some(String::from_utf8_lossy(&s.as_bytes()).into_owned()),
            Value::Integer(i) => Some(i.to_string()),
            Value::Number(n) => Some(n.to_string()),
            Value::Boolean(b) => Some(b.to_string()),
            // Error tables carry `message` plus an optional position.
            Value::Table(table) => {
                let message = self.get_property(table, "message")?;
                let message = self.as_text(&message)?;
                let line = table.raw_get::<Option<i64>>("line").ok().flatten();
                let col = table.raw_get::<Option<i64>>("col").ok().flatten();
                match (line, col) {
                    (Some(line), Some(col)) if line > 0 => {
                        Some(format!("{message} (line {line}, col {col})"))
                    }
                    _ => Some(message),
                }
            }
            _ => None,
        }
    }

    fn as_bytes(&self, value: &Value) -> Option<Vec<u8>> {
        match value {
            Value::String(s) => Some(s.as_bytes().to_vec()),
            Value::Integer(i) => Some(i.to_string().into_bytes()),
            Value::Number(n) => Some(n.to_string().into_bytes()),
            _ => None,
        }
    }
}
