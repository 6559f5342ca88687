//! The session state machine and its transition handlers.

mod event_loop;


use std::pin::Pin;
use std::time::Duration;

use presence_common::RpcError;
use presence_config::{ActivityConfig, PresenceConfig, SessionConfig};
use presence_ipc::{authorization_url, PresenceService, ServiceEvent, User};
use tokio::sync::mpsc;
use tokio::time::Sleep;
use tracing::{debug, error, info, warn};

use crate::payload::build_activity;
use crate::state::SessionState;
use crate::timer::RefreshTimer;

/// Result of one reconnect attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconnect {
    /// Login went through; the ready event will finish the transition.
    Attempted,
    /// Login failed; another attempt fires after the delay.
    Scheduled(Duration),
    /// Retry budget spent; the session has been torn down.
    Exhausted,
}

/// Delay before the next attempt after `attempt` failed: `min(step × attempt, cap)`.
pub fn backoff_delay(attempt: u32, step: Duration, cap: Duration) -> Duration {
    step.saturating_mul(attempt).min(cap)
}

struct PendingReconnect {
    delay: Duration,
    sleep: Pin<Box<Sleep>>,
}

/// Keeps one activity published on a presence service.
pub struct Session<S> {
    service: S,
    events: mpsc::Receiver<ServiceEvent>,
    settings: SessionConfig,
    activity: ActivityConfig,
    client_id: String,
    auth_url: String,
    state: SessionState,
    connected: bool,
    /// Unix ms, fixed for the lifetime of the session.
    start_timestamp: i64,
    retry_count: u32,
    refresh_timer: Option<RefreshTimer>,
    pending_reconnect: Option<PendingReconnect>,
}

impl<S: PresenceService> Session<S> {
    pub fn new(service: S, events: mpsc::Receiver<ServiceEvent>, config: &PresenceConfig) -> Self {
        let client = &config.client;
        Self {
            service,
            events,
            settings: config.session.clone(),
            activity: config.activity.clone(),
            client_id: client.client_id.clone(),
            auth_url: authorization_url(&client.client_id, &client.redirect_uri, &client.scopes),
            state: SessionState::Disconnected,
            connected: false,
            start_timestamp: chrono::Utc::now().timestamp_millis(),
            retry_count: 0,
            refresh_timer: None,
            pending_reconnect: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    pub fn start_timestamp(&self) -> i64 {
        self.start_timestamp
    }

    pub fn has_refresh_timer(&self) -> bool {
        self.refresh_timer.is_some()
    }

    /// Delay of the reconnect currently waiting to fire, if any.
    pub fn pending_reconnect(&self) -> Option<Duration> {
        self.pending_reconnect.as_ref().map(|p| p.delay)
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    /// Log in to the presence service. Success is confirmed by a later ready event.
    pub async fn connect(&mut self) -> Result<(), RpcError> {
        if self.state == SessionState::Disconnected {
            self.state = SessionState::Connecting;
        }
        info!(client_id = %self.client_id, "Initializing presence connection");
        self.service.login().await.inspect_err(|e| {
            error!(error = %e, "Failed to connect to presence service");
        })
    }

    pub async fn handle_event(&mut self, event: ServiceEvent) {
        match event {
            ServiceEvent::Ready(user) => self.on_ready(&user).await,
            ServiceEvent::Disconnected => self.on_disconnected().await,
            ServiceEvent::Error(err) => self.on_error(err).await,
        }
    }

    pub async fn on_ready(&mut self, user: &User) {
        info!(user = %user.tag(), "Presence connected");
        self.connected = true;
        self.retry_count = 0;
        self.pending_reconnect = None;
        self.state = SessionState::Connected;

        self.publish_activity().await;
        self.start_refresh_timer();
    }

    pub async fn on_disconnected(&mut self) {
        info!("Presence service disconnected");
        self.connected = false;
        self.state = SessionState::Disconnected;
        self.stop_refresh_timer();
        self.reconnect().await;
    }

    pub async fn on_error(&mut self, err: RpcError) {
        error!(error = %err, "Presence service error");
        if err.needs_authorization() {
            self.print_authorization_url();
        }
        if !self.connected {
            self.stop_refresh_timer();
            self.reconnect().await;
        }
    }

    pub async fn on_refresh_tick(&mut self) {
        if self.connected {
            self.publish_activity().await;
        }
    }

    /// Send the activity, stamped with the session's original start time.
    pub async fn publish_activity(&mut self) {
        let activity = build_activity(&self.activity, self.start_timestamp);
        match self.service.set_activity(&activity).await {
            Ok(()) => info!("Activity successfully set"),
            Err(e) => {
                warn!(error = %e, "Failed to set activity");
                if !self.connected {
                    self.stop_refresh_timer();
                    self.reconnect().await;
                }
            }
        }
    }

    pub async fn reconnect(&mut self) -> Reconnect {
        self.pending_reconnect = None;
        let max_retries = self.settings.max_retries;

        if self.retry_count >= max_retries {
            error!(
                max_retries,
                "Max retry attempts reached, please restart the application"
            );
            self.disconnect().await;
            self.state = SessionState::Terminated;
            return Reconnect::Exhausted;
        }

        self.retry_count += 1;
        self.state = SessionState::Reconnecting;
        info!(
            attempt = self.retry_count,
            max_retries, "Attempting to reconnect"
        );

        match self.connect().await {
            Ok(()) => Reconnect::Attempted,
            Err(e) => {
                let delay = backoff_delay(
                    self.retry_count,
                    self.settings.backoff_step(),
                    self.settings.backoff_cap(),
                );
                warn!(
                    error = %e,
                    delay_ms = delay.as_millis() as u64,
                    "Reconnection failed, retrying later"
                );
                self.pending_reconnect = Some(PendingReconnect {
                    delay,
                    sleep: Box::pin(tokio::time::sleep(delay)),
                });
                Reconnect::Scheduled(delay)
            }
        }
    }

    /// Stop refreshing and release the service. Failures are only logged.
    pub async fn disconnect(&mut self) {
        self.stop_refresh_timer();
        self.pending_reconnect = None;
        self.connected = false;

        if let Err(e) = self.service.clear_activity().await {
            warn!(error = %e, "Failed to clear activity");
        }
        if let Err(e) = self.service.destroy().await {
            warn!(error = %e, "Failed to release presence connection");
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn start_refresh_timer(&mut self) {
        self.stop_refresh_timer();
        let period = self.settings.refresh_interval();
        debug!(period_ms = period.as_millis() as u64, "Starting refresh timer");
        self.refresh_timer = Some(RefreshTimer::start(period));
    }

    fn stop_refresh_timer(&mut self) {
        if self.refresh_timer.take().is_some() {
            debug!("Stopped refresh timer");
        }
    }

    fn print_authorization_url(&self) {
        warn!("Authorization required for the requested scopes");
        println!("Authorize this application by opening:\n{}", self.auth_url);
    }
}
