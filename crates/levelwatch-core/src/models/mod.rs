//! Data models for Levelwatch

mod reading;

pub use reading::*;
