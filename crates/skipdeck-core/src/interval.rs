use serde::Serialize;

use crate::error::SkipdeckError;

/// Half-open time range `[start, end)` in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimeInterval {
    start: f64,
    end: f64,
}

impl TimeInterval {
    /// Both bounds must be finite and `start` strictly less than `end`.
    pub fn new(start: f64, end: f64) -> Result<Self, SkipdeckError> {
        if !start.is_finite() || !end.is_finite() || start >= end {
            return Err(SkipdeckError::InvalidInterval { start, end });
        }
        Ok(Self { start, end })
    }

    /// For bounds a caller has already validated, such as a segment's
    /// `[start, start + duration)` where duration is known positive.
    pub(crate) fn from_validated(start: f64, end: f64) -> Self {
        debug_assert!(start < end);
        Self { start, end }
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// True when the two ranges share any time, or touch end-to-start.
    /// `[10, 15)` and `[15, 20)` touch and are considered mergeable.
    pub fn overlaps_or_touches(&self, other: &TimeInterval) -> bool {
        other.start <= self.end && self.start <= other.end
    }

    /// Smallest interval covering both inputs.
    pub fn merge(&self, other: &TimeInterval) -> TimeInterval {
        TimeInterval {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}
