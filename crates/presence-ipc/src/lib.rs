//! Client for the chat client's local presence RPC.
//!
//! Speaks the framed JSON protocol over a Unix socket or named pipe,
//! performs the handshake and optional OAuth2 grant, and reports
//! connection events to the session that owns it.

pub mod auth;
pub mod client;
pub mod codec;
pub mod discovery;
pub mod protocol;
pub mod service;

pub use auth::authorization_url;
pub use client::{IpcClient, IpcTimeouts};
pub use discovery::{BoxedStream, Connector, SocketConnector};
pub use protocol::{Activity, Assets, Button, Timestamps, User};
pub use service::{PresenceService, ServiceEvent};
