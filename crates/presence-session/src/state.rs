//! Session lifecycle states and process exit outcomes.

use std::fmt;

/// Where the session is in its lifecycle.
///
/// `Disconnected → Connecting → Connected → Reconnecting → {Connected | Terminated}`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connecting,
    Connected,
    Reconnecting,
    Terminated,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Disconnected => "disconnected",
            SessionState::Connecting => "connecting",
            SessionState::Connected => "connected",
            SessionState::Reconnecting => "reconnecting",
            SessionState::Terminated => "terminated",
        };
        f.write_str(name)
    }
}

/// Why the session loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    /// A shutdown signal was handled.
    Shutdown,
    /// The very first login failed.
    InitialConnectFailed,
    /// Every reconnect attempt failed.
    RetriesExhausted,
    /// The service stopped delivering events.
    ServiceClosed,
}

impl Exit {
    /// Process exit status.
    pub fn code(self) -> i32 {
        match self {
            Exit::Shutdown => 0,
            Exit::InitialConnectFailed | Exit::RetriesExhausted | Exit::ServiceClosed => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_shutdown_exits_cleanly() {
        assert_eq!(Exit::Shutdown.code(), 0);
        assert_eq!(Exit::InitialConnectFailed.code(), 1);
        assert_eq!(Exit::RetriesExhausted.code(), 1);
        assert_eq!(Exit::ServiceClosed.code(), 1);
    }

    #[test]
    fn state_display() {
        assert_eq!(SessionState::Reconnecting.to_string(), "reconnecting");
    }
}
