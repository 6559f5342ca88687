//! The single cooperative loop that drives a session.

use std::future::Future;

use presence_ipc::{PresenceService, ServiceEvent};
use tracing::{info, warn};

use super::{PendingReconnect, Session};
use crate::state::{Exit, SessionState};
use crate::timer::RefreshTimer;

impl<S: PresenceService> Session<S> {
    /// Connect, then dispatch service events, refresh ticks and scheduled
    /// reconnects until `shutdown` resolves or the session gives up.
    pub async fn run<F>(mut self, shutdown: F) -> Exit
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        let first = tokio::select! {
            result = self.connect() => result,
            _ = &mut shutdown => return self.shut_down().await,
        };
        if let Err(e) = first {
            if e.needs_authorization() {
                self.print_authorization_url();
            }
            self.state = SessionState::Terminated;
            return Exit::InitialConnectFailed;
        }

        loop {
            let step = tokio::select! {
                _ = &mut shutdown => return self.shut_down().await,
                event = self.events.recv() => match event {
                    Some(event) => Step::Event(event),
                    None => {
                        warn!("Presence service event stream closed");
                        self.disconnect().await;
                        return Exit::ServiceClosed;
                    }
                },
                _ = next_tick(&mut self.refresh_timer) => Step::Refresh,
                _ = reconnect_due(&mut self.pending_reconnect) => Step::Reconnect,
            };

            // Handlers can wait on the service for minutes; shutdown must not.
            let interrupted = tokio::select! {
                _ = self.step(step) => false,
                _ = &mut shutdown => true,
            };
            if interrupted {
                return self.shut_down().await;
            }

            if self.state == SessionState::Terminated {
                return Exit::RetriesExhausted;
            }
        }
    }

    async fn step(&mut self, step: Step) {
        match step {
            Step::Event(event) => self.handle_event(event).await,
            Step::Refresh => self.on_refresh_tick().await,
            Step::Reconnect => {
                self.reconnect().await;
            }
        }
    }

    async fn shut_down(&mut self) -> Exit {
        info!("Shutdown requested");
        self.disconnect().await;
        Exit::Shutdown
    }
}

enum Step {
    Event(ServiceEvent),
    Refresh,
    Reconnect,
}

async fn next_tick(timer: &mut Option<RefreshTimer>) {
    match timer {
        Some(timer) => timer.tick().await,
        None => std::future::pending().await,
    }
}

async fn reconnect_due(pending: &mut Option<PendingReconnect>) {
    match pending {
        Some(p) => p.sleep.as_mut().await,
        None => std::future::pending().await,
    }
}
