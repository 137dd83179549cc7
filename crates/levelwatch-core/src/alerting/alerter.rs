//! Background threshold checks for ingested readings

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, error, info, info_span, Instrument};

use crate::config::AlertingConfig;

use super::guard::{NotifyDecision, SkipReason, ThresholdGuard};
use super::notifier::Notifier;

/// Runs the threshold guard for each reading and delivers alerts.
///
/// One instance is shared by all requests; it owns the guard and therefore
/// the only copy of the cooldown state.
pub struct ThresholdAlerter {
    guard: ThresholdGuard,
    notifier: Arc<dyn Notifier>,
    threshold: Option<f64>,
    cooldown: Duration,
}

impl ThresholdAlerter {
    /// Create an alerter with a fresh, armed guard
    pub fn new(notifier: Arc<dyn Notifier>, config: &AlertingConfig) -> Self {
        Self {
            guard: ThresholdGuard::new(),
            notifier,
            threshold: config.threshold,
            cooldown: config.cooldown,
        }
    }

    /// Configured threshold, if alerting is enabled
    pub fn threshold(&self) -> Option<f64> {
        self.threshold
    }

    /// Configured cooldown
    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// The guard holding the cooldown state
    pub fn guard(&self) -> &ThresholdGuard {
        &self.guard
    }

    /// Check `level` on a detached task.
    ///
    /// Delivery failures are logged and otherwise unobservable. The handle
    /// is only useful to callers that want to wait, such as tests.
    pub fn spawn_check(self: &Arc<Self>, level: f64) -> JoinHandle<NotifyDecision> {
        let alerter = Arc::clone(self);
        tokio::spawn(
            async move { alerter.check(level).await }
                .instrument(info_span!("threshold_check", level)),
        )
    }

    /// Evaluate `level` and, if due, deliver the alert
    pub async fn check(&self, level: f64) -> NotifyDecision {
        // The guard releases its lock before we reach the network call below.
        let decision = self.guard.evaluate(level, self.threshold, self.cooldown);

        match &decision {
            NotifyDecision::Skip(SkipReason::Cooling) => {
                info!(
                    level,
                    threshold = ?self.threshold,
                    "Notification already sent recently, skipping"
                );
            }
            NotifyDecision::Skip(reason) => {
                debug!(level, ?reason, "No notification needed");
            }
            NotifyDecision::Notify(message) => match self.notifier.send(message).await {
                Ok(()) => info!(
                    level,
                    threshold = ?self.threshold,
                    "Threshold notification sent"
                ),
                Err(e) => error!(
                    error = %e,
                    level,
                    threshold = ?self.threshold,
                    "Error sending threshold notification"
                ),
            },
        }

        decision
    }
}
