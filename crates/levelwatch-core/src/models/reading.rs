//! Level reading models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single stored level measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Auto-incrementing row id
    pub id: i64,
    /// Measured level
    pub level: f64,
    /// When the reading was stored
    pub created_at: DateTime<Utc>,
}

/// Request body for level ingestion
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LevelInput {
    /// Measured level
    pub level: f64,
}

/// Response body for a successful ingestion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestResponse {
    /// Always `"success"`
    pub status: String,
    /// Human-readable confirmation
    pub message: String,
}

impl IngestResponse {
    /// Confirmation for a saved level
    pub fn saved(level: f64) -> Self {
        Self {
            status: "success".to_string(),
            message: format!("Received and saved: {level:.6}"),
        }
    }
}
