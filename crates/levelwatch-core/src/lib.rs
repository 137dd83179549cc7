//! # Levelwatch
//!
//! Level telemetry ingestion with threshold SMS alerts.
//!
//! A device posts numeric level readings over HTTP; each one is appended to
//! a SQLite log, the latest value can be read back, and readings at or above
//! a configured threshold trigger an SMS, at most once per cooldown window.
//!
//! ## Architecture
//!
//! - **Store**: append-only SQLite table of readings
//! - **Alerting**: threshold guard with cooldown, SMS notifier
//! - **API**: `POST /api`, `GET /api/level`
//!
//! ## Quick Start
//!
//! ```bash
//! LEVEL_THRESHOLD=10 SMS_API_KEY=... SMS_PHONE_NUMBER=... levelwatch serve
//! curl -X POST localhost:8080/api -d '{"level": 12.5}'
//! curl localhost:8080/api/level
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod alerting;
pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;

pub use config::Config;
pub use error::{Error, Result};

/// Re-exports for convenience
pub mod prelude {
    pub use crate::alerting::{Notifier, SmsNotifier, ThresholdAlerter, ThresholdGuard};
    pub use crate::config::Config;
    pub use crate::db::ReadingStore;
    pub use crate::error::{Error, NotifyError, Result, StoreError};
    pub use crate::models::*;
}
