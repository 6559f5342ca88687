//! Presence client configuration.
//!
//! Built-in defaults, an optional TOML file and environment overrides,
//! validated as a whole before the session starts.

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::{ActivityConfig, ButtonConfig, ClientConfig, PresenceConfig, SessionConfig};

use std::path::Path;

use presence_common::ConfigError;

/// Load the effective configuration for this process.
///
/// Reads `$PRESENCE_CONFIG` (or the platform default path), applies
/// environment overrides and validates the result.
pub fn load_config() -> Result<PresenceConfig, ConfigError> {
    let mut config = match std::env::var_os(loader::ENV_CONFIG_PATH) {
        Some(path) => loader::load_from_path(Path::new(&path))?,
        None => loader::load_default()?,
    };

    loader::apply_overrides(&mut config, |key| std::env::var(key).ok());
    validation::validate(&config)?;
    Ok(config)
}
