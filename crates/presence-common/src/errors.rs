use std::path::PathBuf;

/// RPC error codes the presence service uses for missing or rejected grants.
const AUTH_ERROR_CODES: [u32; 3] = [4006, 4009, 5000];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),
}

/// Failures talking to the local presence service.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("OAuth2 authorization error: {0}")]
    Authorization(String),

    #[error("publish error: {0}")]
    Publish(String),

    #[error("rpc error {code}: {message}")]
    Rpc { code: u32, message: String },

    #[error("connection closed by peer ({code}): {message}")]
    Closed { code: u32, message: String },

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("timed out waiting for {0}")]
    Timeout(&'static str),

    #[error("not connected")]
    NotConnected,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl RpcError {
    /// Whether the user has to grant access in the browser before this can succeed.
    pub fn needs_authorization(&self) -> bool {
        match self {
            RpcError::Authorization(_) => true,
            RpcError::Rpc { code, message } | RpcError::Closed { code, message } => {
                AUTH_ERROR_CODES.contains(code) || message.contains("OAuth2")
            }
            other => other.to_string().contains("OAuth2"),
        }
    }
}

/// Anything that stops the application from starting.
#[derive(Debug, thiserror::Error)]
pub enum PresenceError {
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = ConfigError::FileNotFound(PathBuf::from("/tmp/missing.toml"));
        assert_eq!(err.to_string(), "config file not found: /tmp/missing.toml");

        let err = ConfigError::ValidationError("activity.buttons: at most 2".into());
        assert_eq!(
            err.to_string(),
            "config validation error: activity.buttons: at most 2"
        );
    }

    #[test]
    fn rpc_error_display() {
        let err = RpcError::Rpc {
            code: 4000,
            message: "Invalid payload".into(),
        };
        assert_eq!(err.to_string(), "rpc error 4000: Invalid payload");

        let err = RpcError::Timeout("handshake");
        assert_eq!(err.to_string(), "timed out waiting for handshake");
    }

    #[test]
    fn authorization_detection() {
        assert!(RpcError::Authorization("no secret".into()).needs_authorization());
        assert!(RpcError::Rpc {
            code: 5000,
            message: "bad grant".into()
        }
        .needs_authorization());
        assert!(RpcError::Rpc {
            code: 4000,
            message: "OAuth2 Error: invalid_client".into()
        }
        .needs_authorization());
        assert!(RpcError::Connection("OAuth2 token exchange failed".into()).needs_authorization());

        assert!(!RpcError::NotConnected.needs_authorization());
        assert!(!RpcError::Rpc {
            code: 4000,
            message: "Invalid payload".into()
        }
        .needs_authorization());
    }

    #[test]
    fn presence_error_from_config() {
        let err: PresenceError = ConfigError::ValidationError("client.client_id".into()).into();
        assert!(matches!(err, PresenceError::Config(_)));
        assert_eq!(err.to_string(), "config validation error: client.client_id");
    }
}
