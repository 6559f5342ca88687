//! The periodic activity refresh.

use std::time::Duration;

use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

/// Repeating trigger that re-sends the activity before it goes stale.
///
/// The first tick fires one full period after `start`, since the session
/// publishes immediately when it connects.
#[derive(Debug)]
pub struct RefreshTimer {
    interval: Interval,
}

impl RefreshTimer {
    pub fn start(period: Duration) -> Self {
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval }
    }

    pub fn period(&self) -> Duration {
        self.interval.period()
    }

    pub async fn tick(&mut self) {
        self.interval.tick().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_tick_waits_a_full_period() {
        let mut timer = RefreshTimer::start(Duration::from_millis(40));
        let started = std::time::Instant::now();
        timer.tick().await;
        assert!(started.elapsed() >= Duration::from_millis(35));
        assert_eq!(timer.period(), Duration::from_millis(40));
    }
}
