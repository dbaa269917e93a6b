//! Scan session tracking.
//!
//! A [`SessionTracker`] holds the product currently being processed and when
//! processing started. Each scan closes the previous product, producing a
//! [`CompletedRecord`], and starts timing the new one.
//!
//! # State Machine
//!
//! ```text
//!            scan                      scan
//!   Idle ──────────▶ Tracking ◀──────────────┐
//!    ▲                  │  └─────────────────┘
//!    └──────finish──────┘   (emits CompletedRecord)
//! ```
//!
//! The tracker performs no I/O. Records are returned to the caller, which is
//! responsible for handing them to persistence.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::classify::{ClassificationStatus, OptimalThreshold};
use crate::clock::elapsed_seconds;
use crate::types::{Barcode, ValidationError};

/// A product whose processing has finished.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedRecord {
    pub barcode: Barcode,
    pub duration_seconds: u64,
    pub completed_at: DateTime<Utc>,
}

impl CompletedRecord {
    /// Classifies this record's duration.
    pub fn status(&self, threshold: OptimalThreshold) -> ClassificationStatus {
        threshold.classify(self.duration_seconds)
    }
}

/// Result of a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOutcome {
    /// The record closed by this scan, if a product was being tracked.
    pub previous_record: Option<CompletedRecord>,
    /// The barcode now being tracked.
    pub new_active_barcode: Barcode,
}

/// Tracking state. The start instant exists exactly when a barcode does.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
enum Session {
    #[default]
    Idle,
    Tracking {
        barcode: Barcode,
        started_at: DateTime<Utc>,
    },
}

/// Tracks the active product and its processing time.
#[derive(Debug, Clone, Default)]
pub struct SessionTracker {
    session: Session,
    /// Display value refreshed by [`SessionTracker::tick`].
    elapsed_seconds: u64,
    scan_count: u64,
}

impl SessionTracker {
    /// Creates an idle tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates a raw scanned string and records the scan.
    ///
    /// Empty or whitespace-only input is rejected without touching state.
    pub fn scan(&mut self, raw: &str, now: DateTime<Utc>) -> Result<ScanOutcome, ValidationError> {
        let barcode = Barcode::new(raw)?;
        Ok(self.scan_barcode(barcode, now))
    }

    /// Records a scan of an already validated barcode.
    ///
    /// When a product was being tracked, its record is closed at `now` and
    /// returned. The new barcode starts timing at `now`.
    pub fn scan_barcode(&mut self, barcode: Barcode, now: DateTime<Utc>) -> ScanOutcome {
        let next = Session::Tracking {
            barcode: barcode.clone(),
            started_at: now,
        };
        let previous_record = Self::close(std::mem::replace(&mut self.session, next), now);

        self.elapsed_seconds = 0;
        self.scan_count += 1;

        match &previous_record {
            Some(record) => tracing::debug!(
                previous = %record.barcode,
                duration_seconds = record.duration_seconds,
                active = %barcode,
                "closed product and started next"
            ),
            None => tracing::debug!(active = %barcode, "started tracking"),
        }

        ScanOutcome {
            previous_record,
            new_active_barcode: barcode,
        }
    }

    /// Closes the active product, if any, and returns to idle.
    pub fn finish(&mut self, now: DateTime<Utc>) -> Option<CompletedRecord> {
        let record = Self::close(std::mem::take(&mut self.session), now);
        self.elapsed_seconds = 0;
        if let Some(record) = &record {
            tracing::debug!(
                barcode = %record.barcode,
                duration_seconds = record.duration_seconds,
                "finished tracking"
            );
        }
        record
    }

    /// Recomputes the elapsed display value at `now` and returns it.
    ///
    /// Returns 0 while idle. Never changes which product is active.
    pub fn tick(&mut self, now: DateTime<Utc>) -> u64 {
        self.elapsed_seconds = match &self.session {
            Session::Idle => 0,
            Session::Tracking { started_at, .. } => elapsed_seconds(*started_at, now),
        };
        self.elapsed_seconds
    }

    /// Classifies the active product's elapsed time at `now`.
    ///
    /// Returns `None` while idle.
    pub fn current_status(
        &self,
        now: DateTime<Utc>,
        threshold: OptimalThreshold,
    ) -> Option<ClassificationStatus> {
        match &self.session {
            Session::Idle => None,
            Session::Tracking { started_at, .. } => {
                Some(threshold.classify(elapsed_seconds(*started_at, now)))
            }
        }
    }

    pub fn active_barcode(&self) -> Option<&Barcode> {
        match &self.session {
            Session::Idle => None,
            Session::Tracking { barcode, .. } => Some(barcode),
        }
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        match &self.session {
            Session::Idle => None,
            Session::Tracking { started_at, .. } => Some(*started_at),
        }
    }

    pub const fn is_tracking(&self) -> bool {
        matches!(self.session, Session::Tracking { .. })
    }

    /// Elapsed seconds as of the last [`tick`](Self::tick).
    pub const fn elapsed_seconds(&self) -> u64 {
        self.elapsed_seconds
    }

    /// Number of accepted scans since the tracker was created.
    pub const fn scan_count(&self) -> u64 {
        self.scan_count
    }

    fn close(session: Session, now: DateTime<Utc>) -> Option<CompletedRecord> {
        match session {
            Session::Idle => None,
            Session::Tracking {
                barcode,
                started_at,
            } => Some(CompletedRecord {
                barcode,
                duration_seconds: elapsed_seconds(started_at, now),
                completed_at: now,
            }),
        }
    }
}
