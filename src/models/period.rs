//! Time coordinates on the weekly grid.
//!
//! A [`Period`] is a point in the week, not a duration. Everything that needs
//! arithmetic works on the absolute minute offset
//! `day * 1440 + hour * 60 + minute`, so intervals are plain half-open
//! `[start, end)` ranges of minutes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Minutes in one day.
pub const MINUTES_PER_DAY: i64 = 1440;

/// A time coordinate: day of the week, hour and minute.
///
/// Field order makes the derived `Ord` agree with [`Period::absolute_minutes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Period {
    /// Day index (0-based).
    pub day: u32,
    /// Hour of day (0..24).
    pub hour: u32,
    /// Minute of hour (0..60).
    pub minute: u32,
}

impl Period {
    /// Creates a period.
    pub const fn new(day: u32, hour: u32, minute: u32) -> Self {
        Self { day, hour, minute }
    }

    /// Absolute minute offset from the start of the week.
    #[inline]
    pub fn absolute_minutes(&self) -> i64 {
        self.day as i64 * MINUTES_PER_DAY + self.hour as i64 * 60 + self.minute as i64
    }

    /// Minute offset from the start of this period's day.
    #[inline]
    pub fn minute_of_day(&self) -> i64 {
        self.hour as i64 * 60 + self.minute as i64
    }

    /// Rebuilds a period from an absolute minute offset.
    ///
    /// Negative offsets clamp to the start of the week.
    pub fn from_absolute(minutes: i64) -> Self {
        let minutes = minutes.max(0);
        let day = minutes / MINUTES_PER_DAY;
        let rest = minutes % MINUTES_PER_DAY;
        Self::new(day as u32, (rest / 60) as u32, (rest % 60) as u32)
    }

    /// The period `minutes` later.
    pub fn plus_minutes(&self, minutes: u32) -> Self {
        Self::from_absolute(self.absolute_minutes() + minutes as i64)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "d{} {:02}:{:02}", self.day, self.hour, self.minute)
    }
}

/// A stretch of time starting at a period.
///
/// Used for blackout lists (unavailable rooms, teachers, student sets).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeSpan {
    /// First blocked minute.
    pub start: Period,
    /// Length in minutes.
    pub minutes: u32,
}

impl TimeSpan {
    /// Creates a span.
    pub const fn new(start: Period, minutes: u32) -> Self {
        Self { start, minutes }
    }

    /// One hour starting at `start`.
    pub const fn hour(start: Period) -> Self {
        Self::new(start, 60)
    }

    /// Absolute start minute (inclusive).
    #[inline]
    pub fn start_minute(&self) -> i64 {
        self.start.absolute_minutes()
    }

    /// Absolute end minute (exclusive).
    #[inline]
    pub fn end_minute(&self) -> i64 {
        self.start_minute() + self.minutes as i64
    }
}
