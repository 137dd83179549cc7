//! Threshold alerting for Levelwatch
//!
//! [`ThresholdGuard`] decides, [`Notifier`] delivers, and
//! [`ThresholdAlerter`] ties the two together for the ingestion path.

mod alerter;
mod guard;
mod notifier;

pub use alerter::ThresholdAlerter;
pub use guard::{format_alert_message, GuardState, NotifyDecision, SkipReason, ThresholdGuard};
pub use notifier::{Notifier, SmsNotifier};
