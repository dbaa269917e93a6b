//! Threshold classification of processing durations.
//!
//! A duration is compared against an optimal threshold:
//!
//! | elapsed                          | status     |
//! |----------------------------------|------------|
//! | `< 80%` of the threshold         | `OnTime`   |
//! | `>= 80%` and `<` the threshold   | `Warning`  |
//! | `>=` the threshold               | `OverTime` |
//!
//! Each tier includes its lower bound, so with the default 135 second
//! threshold 108 is already a warning and 135 is already over time.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default optimal processing time for a single product, in seconds.
pub const DEFAULT_OPTIMAL_SECONDS: f64 = 135.0;

/// Configuration errors for threshold values.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum ConfigurationError {
    /// The optimal threshold was zero, negative, or not a finite number.
    #[error("optimal threshold must be a positive number of seconds, got {value}")]
    NonPositiveThreshold { value: f64 },
}

/// Classification of an elapsed duration against the optimal threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationStatus {
    OnTime,
    Warning,
    OverTime,
}

impl ClassificationStatus {
    /// Stable string representation, matching the serialized form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::OnTime => "on_time",
            Self::Warning => "warning",
            Self::OverTime => "over_time",
        }
    }
}

impl fmt::Display for ClassificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ClassificationStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "on_time" => Ok(Self::OnTime),
            "warning" => Ok(Self::Warning),
            "over_time" => Ok(Self::OverTime),
            _ => Err(UnknownStatus(s.to_string())),
        }
    }
}

/// Error type for unknown classification status strings.
#[derive(Debug, Clone, Error)]
#[error("unknown classification status: {0}")]
pub struct UnknownStatus(String);

/// A validated optimal processing threshold in seconds.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
pub struct OptimalThreshold(f64);

impl OptimalThreshold {
    /// Creates a threshold, rejecting zero, negative, NaN and infinite values.
    pub fn new(seconds: f64) -> Result<Self, ConfigurationError> {
        if !seconds.is_finite() || seconds <= 0.0 {
            return Err(ConfigurationError::NonPositiveThreshold { value: seconds });
        }
        Ok(Self(seconds))
    }

    /// Returns the threshold in seconds.
    #[must_use]
    pub const fn seconds(self) -> f64 {
        self.0
    }

    /// Returns the point at which durations start being a warning (80%).
    #[must_use]
    pub fn warning_seconds(self) -> f64 {
        self.0 * 0.8
    }

    /// Classifies an elapsed duration against this threshold.
    #[must_use]
    #[expect(
        clippy::cast_precision_loss,
        reason = "durations are far below 2^52 seconds"
    )]
    pub fn classify(self, elapsed_seconds: u64) -> ClassificationStatus {
        let elapsed = elapsed_seconds as f64;
        if elapsed >= self.0 {
            ClassificationStatus::OverTime
        } else if elapsed * 5.0 >= self.0 * 4.0 {
            // elapsed >= 0.8 * threshold, without rounding 0.8
            ClassificationStatus::Warning
        } else {
            ClassificationStatus::OnTime
        }
    }
}

impl Default for OptimalThreshold {
    fn default() -> Self {
        Self(DEFAULT_OPTIMAL_SECONDS)
    }
}

impl fmt::Display for OptimalThreshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

impl TryFrom<f64> for OptimalThreshold {
    type Error = ConfigurationError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl<'de> Deserialize<'de> for OptimalThreshold {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = f64::deserialize(deserializer)?;
        Self::new(value).map_err(serde::de::Error::custom)
    }
}

/// Classifies `elapsed_seconds` against `optimal_seconds`.
///
/// Fails fast on a non-positive threshold instead of classifying everything
/// as over time.
pub fn classify(
    elapsed_seconds: u64,
    optimal_seconds: f64,
) -> Result<ClassificationStatus, ConfigurationError> {
    Ok(OptimalThreshold::new(optimal_seconds)?.classify(elapsed_seconds))
}
