//! Threshold guard with notification cooldown

use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

/// Outcome of evaluating one reading
#[derive(Debug, Clone, PartialEq)]
pub enum NotifyDecision {
    /// Do not notify
    Skip(SkipReason),
    /// Send this alert text
    Notify(String),
}

impl NotifyDecision {
    /// Whether a notification should be sent
    pub fn should_notify(&self) -> bool {
        matches!(self, Self::Notify(_))
    }
}

/// Why a reading did not produce a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No threshold configured
    Disabled,
    /// Level is under the threshold
    BelowThreshold,
    /// A notification went out within the cooldown window
    Cooling,
}

/// Logical guard state for a given cooldown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    /// The next breach will notify
    Armed,
    /// Breaches are suppressed until the cooldown elapses
    Cooling,
}

/// Decides whether a reading should trigger a notification.
///
/// The last notification time is recorded in the same critical section that
/// makes the decision, so concurrent breaches cannot both get through. The
/// lock is never held while a notification is being delivered. State lives
/// only in memory; a restart re-arms the guard.
#[derive(Debug, Default)]
pub struct ThresholdGuard {
    last_notified_at: Mutex<Option<DateTime<Utc>>>,
}

impl ThresholdGuard {
    /// Create an armed guard
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate a reading against the threshold at the current time
    pub fn evaluate(
        &self,
        level: f64,
        threshold: Option<f64>,
        cooldown: Duration,
    ) -> NotifyDecision {
        self.evaluate_at(level, threshold, cooldown, Utc::now())
    }

    /// Evaluate a reading against the threshold at `now`
    pub fn evaluate_at(
        &self,
        level: f64,
        threshold: Option<f64>,
        cooldown: Duration,
        now: DateTime<Utc>,
    ) -> NotifyDecision {
        let Some(threshold) = threshold else {
            return NotifyDecision::Skip(SkipReason::Disabled);
        };

        if level.is_nan() || level < threshold {
            return NotifyDecision::Skip(SkipReason::BelowThreshold);
        }

        let mut last_notified_at = self.last_notified_at.lock();
        if is_cooling(*last_notified_at, now, cooldown) {
            return NotifyDecision::Skip(SkipReason::Cooling);
        }

        // Recorded before delivery; a failed send still uses up the window.
        *last_notified_at = Some(now);
        NotifyDecision::Notify(format_alert_message(level, threshold))
    }

    /// Current state at the current time
    pub fn state(&self, cooldown: Duration) -> GuardState {
        self.state_at(cooldown, Utc::now())
    }

    /// State at `now`
    pub fn state_at(&self, cooldown: Duration, now: DateTime<Utc>) -> GuardState {
        if is_cooling(*self.last_notified_at.lock(), now, cooldown) {
            GuardState::Cooling
        } else {
            GuardState::Armed
        }
    }

    /// When the last notification was dispatched
    pub fn last_notified_at(&self) -> Option<DateTime<Utc>> {
        *self.last_notified_at.lock()
    }
}

/// Alert text for a level that reached the threshold
pub fn format_alert_message(level: f64, threshold: f64) -> String {
    format!("Alert: Level {level:.2} has reached the threshold of {threshold:.2}")
}

fn is_cooling(last: Option<DateTime<Utc>>, now: DateTime<Utc>, cooldown: Duration) -> bool {
    let Some(last) = last else {
        return false;
    };

    match (now - last).to_std() {
        Ok(elapsed) => elapsed < cooldown,
        // Clock went backwards; stay quiet until it catches up.
        Err(_) => true,
    }
}
