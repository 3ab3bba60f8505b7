//! Interval overlap rule for staff schedules.
//!
//! Two sessions conflict when they share any instant. Intervals are half-open,
//! `[start, end)`, so a session ending at 10:00 and another starting at 10:00
//! are back-to-back, not overlapping:
//!
//! ```text
//! existing.start < proposed.end AND existing.end > proposed.start
//! ```
//!
//! `Interval::overlaps` states the rule in memory. The store's overlap query
//! and the session triggers evaluate the same inequality in SQL; the store
//! tests check the query against `overlaps`.

use chrono::{DateTime, Utc};

use crate::clock;

/// Message reported when a write would double-book a staff member.
pub const OVERLAP_CONFLICT: &str = "staff member has overlapping session at this time";

/// A half-open time interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Interval {
    /// Endpoints are taken at stored precision.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start: clock::stored(start),
            end: clock::stored(end),
        }
    }

    /// Strict-inequality overlap test. Touching endpoints do not overlap.
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && self.end > other.start
    }
}
