//! Database layer for Levelwatch
//!
//! Readings live in a single SQLite file.

mod sqlite;

pub use sqlite::{ReadingStore, MAX_RECENT_LIMIT};
