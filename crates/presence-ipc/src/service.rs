//! The seam between the session manager and the presence service.

use async_trait::async_trait;
use presence_common::RpcError;

use crate::protocol::{Activity, User};

/// Events the presence service emits outside of request/response.
#[derive(Debug)]
pub enum ServiceEvent {
    /// Login completed; the service accepts activity updates.
    Ready(User),
    /// The established connection went away.
    Disconnected,
    /// An error reported on an established connection.
    Error(RpcError),
}

/// Operations the session manager needs from a presence service.
#[async_trait]
pub trait PresenceService: Send {
    /// Connect and authenticate. On success a `ServiceEvent::Ready` follows.
    async fn login(&mut self) -> Result<(), RpcError>;

    async fn set_activity(&mut self, activity: &Activity) -> Result<(), RpcError>;

    async fn clear_activity(&mut self) -> Result<(), RpcError>;

    /// Release the connection. No `Disconnected` event is emitted for it.
    async fn destroy(&mut self) -> Result<(), RpcError>;
}
