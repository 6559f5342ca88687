use std::path::PathBuf;

use tracing::debug;

use crate::schema::PresenceConfig;

/// Points at a TOML file to load instead of the default location.
pub const ENV_CONFIG_PATH: &str = "PRESENCE_CONFIG";

const ENV_CLIENT_ID: &str = "DISCORD_CLIENT_ID";
const ENV_CLIENT_SECRET: &str = "DISCORD_CLIENT_SECRET";
const ENV_SCOPES: &str = "PRESENCE_SCOPES";
const ENV_REDIRECT_URI: &str = "PRESENCE_REDIRECT_URI";
const ENV_IPC_PATH: &str = "PRESENCE_IPC_PATH";

/// Apply environment overrides on top of a loaded config.
///
/// `lookup` is `std::env::var` in the binary and a map in tests.
pub fn apply_overrides<F>(config: &mut PresenceConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(id) = lookup(ENV_CLIENT_ID) {
        debug!(var = ENV_CLIENT_ID, "client id overridden from environment");
        config.client.client_id = id.trim().to_string();
    }
    if let Some(secret) = lookup(ENV_CLIENT_SECRET).filter(|s| !s.trim().is_empty()) {
        config.client.client_secret = Some(secret.trim().to_string());
    }
    if let Some(raw) = lookup(ENV_SCOPES) {
        config.client.scopes = parse_scopes(&raw);
    }
    if let Some(uri) = lookup(ENV_REDIRECT_URI) {
        config.client.redirect_uri = uri.trim().to_string();
    }
    if let Some(path) = lookup(ENV_IPC_PATH).filter(|p| !p.trim().is_empty()) {
        config.client.ipc_path = Some(PathBuf::from(path.trim()));
    }
}

/// Split a scope list on spaces and commas.
pub fn parse_scopes(raw: &str) -> Vec<String> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
