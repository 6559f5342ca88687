use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use presence_common::ConfigError;
use tracing::{debug, info};

use crate::schema::PresenceConfig;

/// Load config from a specific TOML file path.
///
/// Missing fields fall back to serde defaults.
pub fn load_from_path(path: &Path) -> Result<PresenceConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => ConfigError::FileNotFound(path.to_path_buf()),
        _ => ConfigError::ParseError(format!("failed to read {}: {e}", path.display())),
    })?;

    let config: PresenceConfig = toml::from_str(&content)
        .map_err(|e| ConfigError::ParseError(format!("failed to parse TOML: {e}")))?;

    info!("loaded config from {}", path.display());
    Ok(config)
}

/// Load config from the platform default path, or defaults if there is no file.
///
/// On Linux: `~/.config/fisidi-presence/config.toml`
pub fn load_default() -> Result<PresenceConfig, ConfigError> {
    let path = default_config_path()?;

    match load_from_path(&path) {
        Err(ConfigError::FileNotFound(_)) => {
            debug!("no config at {}, using built-in defaults", path.display());
            Ok(PresenceConfig::default())
        }
        other => other,
    }
}

pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    let config_dir = dirs::config_dir().ok_or_else(|| {
        ConfigError::ParseError("could not determine config directory".into())
    })?;
    Ok(config_dir.join("fisidi-presence").join("config.toml"))
}
