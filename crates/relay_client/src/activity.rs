//! Liveness logging: a one-off line once chat starts flowing, then a message
//! count every reporting period so a quiet log still shows the bot is alive.

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use tokio::time::{interval, MissedTickBehavior};
use tracing::info;

pub const FIRST_MESSAGE_POLL: Duration = Duration::from_secs(1);
pub const VELOCITY_PERIOD: Duration = Duration::from_secs(15 * 60);

/// Count of events forwarded to the dispatcher since the last report.
#[derive(Debug, Clone, Default)]
pub struct ActivityCounter(Arc<AtomicU64>);

impl ActivityCounter {
    pub fn bump(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn peek(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    /// Reads and resets the count.
    pub fn take(&self) -> u64 {
        self.0.swap(0, Ordering::Relaxed)
    }
}

/// Resolves once the first event has been forwarded.
pub async fn announce_first_message(counter: ActivityCounter, channel: String, poll: Duration) {
    let mut ticker = interval(poll);
    loop {
        ticker.tick().await;
        if counter.peek() > 0 {
            info!(%channel, "received first regular chat message");
            return;
        }
    }
}

/// Logs how many events arrived in the period just ended. Quiet periods are
/// skipped.
pub fn report_velocity(counter: &ActivityCounter) -> Option<u64> {
    let messages = counter.take();
    if messages == 0 {
        return None;
    }
    info!(messages, "past 15 min");
    Some(messages)
}

pub async fn report_velocity_every(counter: ActivityCounter, period: Duration) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick fires immediately.
    ticker.tick().await;
    loop {
        ticker.tick().await;
        report_velocity(&counter);
    }
}

#[cfg(test)]
#[path = "tests/activity_tests.rs"]
mod tests;
