//! Configuration types. Every section defaults so a partial file works.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Application id registered with the presence service.
pub const DEFAULT_CLIENT_ID: &str = "1323427133393076315";
pub const DEFAULT_REDIRECT_URI: &str = "https://fisidi-discord-rpc.vercel.app/callback";
pub const DEFAULT_SCOPES: [&str; 2] = ["rpc", "activities.write"];

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresenceConfig {
    pub client: ClientConfig,
    pub session: SessionConfig,
    pub activity: ActivityConfig,
}

/// How to reach and authenticate against the local presence service.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub client_id: String,
    /// OAuth2 scopes requested at login. Empty skips authorization entirely.
    pub scopes: Vec<String>,
    pub redirect_uri: String,
    /// Needed to exchange an authorization code for a token.
    pub client_secret: Option<String>,
    /// Fixed IPC socket path; discovered when unset.
    pub ipc_path: Option<PathBuf>,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("client_id", &self.client_id)
            .field("scopes", &self.scopes)
            .field("redirect_uri", &self.redirect_uri)
            .field(
                "client_secret",
                &self.client_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .field("ipc_path", &self.ipc_path)
            .finish()
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            client_id: DEFAULT_CLIENT_ID.into(),
            scopes: DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect(),
            redirect_uri: DEFAULT_REDIRECT_URI.into(),
            client_secret: None,
            ipc_path: None,
        }
    }
}

/// Refresh and reconnect timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub refresh_interval_ms: u64,
    pub max_retries: u32,
    pub backoff_step_ms: u64,
    pub backoff_cap_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            refresh_interval_ms: 15_000,
            max_retries: 3,
            backoff_step_ms: 10_000,
            backoff_cap_ms: 30_000,
        }
    }
}

impl SessionConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }

    pub fn backoff_step(&self) -> Duration {
        Duration::from_millis(self.backoff_step_ms)
    }

    pub fn backoff_cap(&self) -> Duration {
        Duration::from_millis(self.backoff_cap_ms)
    }
}

/// The status shown to other users. Empty strings are left out of the payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityConfig {
    pub details: String,
    pub state: String,
    pub large_image_key: String,
    pub large_image_text: String,
    pub small_image_key: String,
    pub small_image_text: String,
    pub instance: bool,
    pub buttons: Vec<ButtonConfig>,
}

impl Default for ActivityConfig {
    fn default() -> Self {
        Self {
            details: "Join Fire Development".into(),
            state: "🔹 Join Fire Development State".into(),
            large_image_key: "freek_logo".into(),
            large_image_text: "Fisidi Development".into(),
            small_image_key: "fisidi_logo".into(),
            small_image_text: "👹".into(),
            instance: true,
            buttons: vec![
                ButtonConfig {
                    label: "Join Server".into(),
                    url: "https://discord.gg/EyWNsA97cQ".into(),
                },
                ButtonConfig {
                    label: "Website".into(),
                    url: "https://fisidi.com".into(),
                },
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonConfig {
    pub label: String,
    pub url: String,
}
