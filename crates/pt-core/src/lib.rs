//! Core domain logic for the product tracker.
//!
//! This crate contains the fundamental types and logic for:
//! - Classification: rating a processing duration against the optimal threshold
//! - Session tracking: timing the active product and closing it on the next scan

pub mod classify;
mod clock;
pub mod session;
mod types;

pub use classify::{
    ClassificationStatus, ConfigurationError, DEFAULT_OPTIMAL_SECONDS, OptimalThreshold, classify,
};
pub use clock::{Clock, SystemClock};
pub use session::{CompletedRecord, ScanOutcome, SessionTracker};
pub use types::{Barcode, ValidationError};
