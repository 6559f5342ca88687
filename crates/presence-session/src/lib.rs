//! Presence session manager.
//!
//! Owns the connection to the presence service, keeps the activity
//! fresh on a timer and reconnects with bounded retries when the
//! service goes away.

pub mod payload;
pub mod session;
pub mod state;
pub mod timer;

pub use payload::build_activity;
pub use session::{backoff_delay, Reconnect, Session};
pub use state::{Exit, SessionState};
pub use timer::RefreshTimer;
