//! Watches a camera for registration plates, looks each plate up and keeps a
//! display state that mirrors the latest lookup result.

pub mod config;
pub mod error;
pub mod metrics;
pub mod plate_detection;
