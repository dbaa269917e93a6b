//! Wall-clock abstraction.

use chrono::{DateTime, Utc};

/// Source of the current instant.
///
/// Tracker operations take `now` explicitly; callers that drive the tracker
/// from live events read it from a `Clock` so tests can substitute their own.
pub trait Clock {
    /// Returns the current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// The system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Whole seconds from `start` to `now`, truncated.
///
/// Saturates at zero when `now` precedes `start` (e.g. after a clock step).
pub(crate) fn elapsed_seconds(start: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    u64::try_from((now - start).num_seconds()).unwrap_or(0)
}
