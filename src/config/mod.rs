//! Configuration module for puglify.
//!
//! Handles the TOML settings file and environment variable expansion.

mod settings;

pub use settings::{
    expand_env_vars, EngineSettings, PoolSettings, Settings, SettingsError, CONFIG_ENV_VAR,
};
