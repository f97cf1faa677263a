//! TOML-based configuration for puglify.
//!
//! Supports a config file (puglify.toml) with environment variable expansion.
//!
//! Example configuration:
//! ```toml
//! [engine]
//! entry_point = "minify"
//! script = "${HOME}/minify.lua"   # bundled minifier when omitted
//! memory_limit = 67108864         # bytes
//!
//! [pool]
//! threads = 4                     # available parallelism when omitted
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;

use crate::engine::{ScriptSource, DEFAULT_ENTRY_POINT};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "PUGLIFY_CONFIG";

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Scripting engine configuration.
    pub engine: EngineSettings,

    /// Session pool configuration.
    pub pool: PoolSettings,
}

/// Scripting engine configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Global resolved as the transformation entry point.
    pub entry_point: String,

    /// Path to a replacement minifier script (supports ${ENV_VAR} expansion).
    pub script: Option<String>,

    /// Heap cap for each engine state, in bytes.
    pub memory_limit: Option<usize>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            entry_point: DEFAULT_ENTRY_POINT.to_string(),
            script: None,
            memory_limit: None,
        }
    }
}

impl EngineSettings {
    /// Where sessions load their script from.
    ///
    /// A script path whose variables cannot be expanded yields
    /// [`ScriptSource::Unavailable`], which bootstrap reports as a missing source.
    pub fn script_source(&self) -> ScriptSource {
        match &self.script {
            None => ScriptSource::Bundled,
            Some(path) => match expand_env_vars(path) {
                Ok(expanded) => ScriptSource::File(PathBuf::from(expanded)),
                Err(err) => ScriptSource::Unavailable(err.to_string()),
            },
        }
    }
}

/// Session pool configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PoolSettings {
    /// Number of sessions, each with its own worker thread.
    pub threads: Option<usize>,
}

impl PoolSettings {
    /// Configured thread count, or the machine's available parallelism.
    pub fn thread_count(&self) -> usize {
        self.threads
            .unwrap_or_else(|| thread::available_parallelism().map_or(1, |n| n.get()))
            .max(1)
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `PUGLIFY_CONFIG`
    /// 2. `./puglify.toml`
    /// 3. `~/.config/puglify/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        // Check environment variable first
        if let Ok(path) = env::var(CONFIG_ENV_VAR) {
            return Self::from_file(&path);
        }

        // Check local directory
        let local_config = PathBuf::from("puglify.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        // Check user config directory
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("puglify").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        // Return defaults if no config file found
        Ok(Settings::default())
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.engine.entry_point.trim().is_empty() {
            return Err(SettingsError::InvalidConfig(
                "engine.entry_point must not be empty".to_string(),
            ));
        }
        if self.pool.threads == Some(0) {
            return Err(SettingsError::InvalidConfig(
                "pool.threads must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let var_name = if chars.peek() == Some(&'{') {
            chars.next(); // consume '{'
            let mut name = String::new();
            for ch in chars.by_ref() {
                if ch == '}' {
                    break;
                }
                name.push(ch);
            }
            name
        } else {
            // $VAR ends at the first non-alphanumeric, non-underscore char
            let mut name = String::new();
            while let Some(ch) = chars.next_if(|ch| ch.is_alphanumeric() || *ch == '_') {
                name.push(ch);
            }
            if name.is_empty() {
                // Just a lone $, keep it
                result.push('$');
                continue;
            }
            name
        };

        let value =
            env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
        result.push_str(&value);
    }

    Ok(result)
}
