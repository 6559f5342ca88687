//! Presence service backed by the desktop client's local RPC socket.

use std::time::Duration;

use async_trait::async_trait;
use presence_common::RpcError;
use presence_config::ClientConfig;
use serde_json::json;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use super::connection::Connection;
use crate::auth;
use crate::discovery::{Connector, SocketConnector};
use crate::protocol::{commands, Activity, AuthorizeData, SetActivityArgs, User};
use crate::service::{PresenceService, ServiceEvent};

const EVENT_BUFFER: usize = 64;

/// How long each phase may take before it counts as a failure.
#[derive(Debug, Clone, Copy)]
pub struct IpcTimeouts {
    pub connect: Duration,
    pub handshake: Duration,
    pub request: Duration,
    /// Waiting for the user to approve the grant in the client UI.
    pub authorize: Duration,
}

impl Default for IpcTimeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(10),
            handshake: Duration::from_secs(10),
            request: Duration::from_secs(10),
            authorize: Duration::from_secs(300),
        }
    }
}

/// Handle to the local presence service.
///
/// `login` opens a new socket each time, replacing any previous one.
/// Events for the current socket arrive on the receiver returned by
/// [`IpcClient::new`].
pub struct IpcClient {
    config: ClientConfig,
    timeouts: IpcTimeouts,
    connector: Box<dyn Connector>,
    http: reqwest::Client,
    event_tx: mpsc::Sender<ServiceEvent>,
    connection: Option<Connection>,
    user: Option<User>,
}

impl IpcClient {
    /// Create a client that discovers the local socket (or uses `config.ipc_path`).
    pub fn new(config: ClientConfig) -> (Self, mpsc::Receiver<ServiceEvent>) {
        let timeouts = IpcTimeouts::default();
        let connector =
            SocketConnector::new(config.ipc_path.clone()).with_timeout(timeouts.connect);
        Self::with_connector(config, Box::new(connector))
    }

    pub fn with_connector(
        config: ClientConfig,
        connector: Box<dyn Connector>,
    ) -> (Self, mpsc::Receiver<ServiceEvent>) {
        let (event_tx, event_rx) = mpsc::channel(EVENT_BUFFER);
        let client = Self {
            config,
            timeouts: IpcTimeouts::default(),
            connector,
            http: reqwest::Client::new(),
            event_tx,
            connection: None,
            user: None,
        };
        (client, event_rx)
    }

    pub fn with_timeouts(mut self, timeouts: IpcTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// The account reported by the last successful login.
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_connected(&self) -> bool {
        self.connection.as_ref().is_some_and(Connection::is_live)
    }

    async fn open(&mut self) -> Result<User, RpcError> {
        if let Some(old) = self.connection.take() {
            let _ = old.close().await;
        }

        let stream = self.connector.connect().await?;
        let (connection, user) = Connection::open(
            stream,
            &self.config.client_id,
            self.event_tx.clone(),
            self.timeouts.handshake,
        )
        .await?;

        if !self.config.scopes.is_empty() {
            self.authorize(&connection).await?;
        }

        connection.mark_live();
        self.connection = Some(connection);
        Ok(user)
    }

    /// AUTHORIZE, exchange the code, then AUTHENTICATE with the token.
    async fn authorize(&self, connection: &Connection) -> Result<(), RpcError> {
        debug!(scopes = ?self.config.scopes, "Requesting authorization");
        let data = connection
            .request(
                commands::AUTHORIZE,
                json!({
                    "client_id": self.config.client_id,
                    "scopes": self.config.scopes,
                }),
                self.timeouts.authorize,
            )
            .await?;
        let grant: AuthorizeData = serde_json::from_value(data)
            .map_err(|e| RpcError::Protocol(format!("AUTHORIZE response: {e}")))?;

        let secret = self.config.client_secret.as_deref().ok_or_else(|| {
            RpcError::Authorization("a client secret is required to exchange the grant".into())
        })?;

        let token = auth::exchange_code(
            &self.http,
            &self.config.client_id,
            secret,
            &grant.code,
            &self.config.redirect_uri,
        )
        .await?;

        connection
            .request(
                commands::AUTHENTICATE,
                json!({ "access_token": token }),
                self.timeouts.request,
            )
            .await?;
        debug!("Authenticated with presence service");
        Ok(())
    }

    async fn send_activity(&self, activity: Option<&Activity>) -> Result<(), RpcError> {
        let connection = self.connection.as_ref().ok_or(RpcError::NotConnected)?;
        let args = serde_json::to_value(SetActivityArgs {
            pid: std::process::id(),
            activity,
        })?;
        connection
            .request(commands::SET_ACTIVITY, args, self.timeouts.request)
            .await?;
        Ok(())
    }
}

/// Fold whatever went wrong during login into the connection/authorization split.
fn login_error(err: RpcError) -> RpcError {
    match err {
        RpcError::Authorization(_) | RpcError::Connection(_) => err,
        other if other.needs_authorization() => RpcError::Authorization(other.to_string()),
        other => RpcError::Connection(other.to_string()),
    }
}

#[async_trait]
impl PresenceService for IpcClient {
    async fn login(&mut self) -> Result<(), RpcError> {
        let user = self.open().await.map_err(login_error)?;
        if let Err(e) = self.event_tx.try_send(ServiceEvent::Ready(user.clone())) {
            error!(error = %e, "Could not deliver ready event, dropping connection");
            if let Some(connection) = self.connection.take() {
                let _ = connection.close().await;
            }
            return Err(RpcError::Connection(format!("ready event not delivered: {e}")));
        }

        info!(user = %user.tag(), "Presence service ready");
        self.user = Some(user);
        Ok(())
    }

    async fn set_activity(&mut self, activity: &Activity) -> Result<(), RpcError> {
        self.send_activity(Some(activity))
            .await
            .map_err(|e| RpcError::Publish(e.to_string()))
    }

    async fn clear_activity(&mut self) -> Result<(), RpcError> {
        self.send_activity(None)
            .await
            .map_err(|e| RpcError::Publish(e.to_string()))
    }

    async fn destroy(&mut self) -> Result<(), RpcError> {
        self.user = None;
        match self.connection.take() {
            Some(connection) => connection.close().await,
            None => Ok(()),
        }
    }
}
