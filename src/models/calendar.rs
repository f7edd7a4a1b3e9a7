//! Exam-day time grid.
//!
//! Defines the half-open minute windows exams occupy, the named day-parts
//! proctors use to state availability, and the catalog of start times an
//! exam may take.
//!
//! # Time Model
//! Times of day are `chrono::NaiveTime`. Occupancy arithmetic is done in
//! whole minutes since midnight. An exam starting at `s` with duration `d`
//! occupies `[s, s + d)`.

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// Latest minute an exam may end at (21:00).
pub const DEFAULT_CUTOFF_MINUTE: u32 = 21 * 60;

/// Granularity of the start-time grid and of cohort collision checks.
pub const SLOT_MINUTES: u32 = 30;

/// Minutes since midnight for a time of day.
#[inline]
pub fn minute_of_day(time: NaiveTime) -> u32 {
    time.num_seconds_from_midnight() / 60
}

/// Time of day for a minute offset. `None` past 23:59.
#[inline]
pub fn time_at_minute(minute: u32) -> Option<NaiveTime> {
    NaiveTime::from_hms_opt(minute / 60, minute % 60, 0)
}

/// A time interval `[start, end)` in minutes since midnight.
///
/// Half-open interval: includes start, excludes end.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct TimeWindow {
    /// Interval start (minute, inclusive).
    pub start: u32,
    /// Interval end (minute, exclusive).
    pub end: u32,
}

impl TimeWindow {
    /// Creates a new time window.
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Window of an exam starting at `start` lasting `duration_minutes`.
    pub fn for_exam(start: NaiveTime, duration_minutes: u32) -> Self {
        let start = minute_of_day(start);
        Self::new(start, start + duration_minutes)
    }

    /// Length of this window in minutes.
    #[inline]
    pub fn duration(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    /// Whether a minute falls within this window.
    #[inline]
    pub fn contains(&self, minute: u32) -> bool {
        minute >= self.start && minute < self.end
    }

    /// Whether two windows overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Start minutes of the 30-minute sub-slots covered by this window.
    pub fn sub_slots(&self) -> impl Iterator<Item = u32> + '_ {
        (self.start..self.end).step_by(SLOT_MINUTES as usize)
    }
}

/// Named part of an exam day, as used in proctor availability forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DayPart {
    /// 07:00 – 13:00.
    Morning,
    /// 13:00 – 18:00.
    Afternoon,
    /// 18:00 – 21:00.
    Evening,
}

impl DayPart {
    /// Day-part containing a start time, if any.
    pub fn of(time: NaiveTime) -> Option<Self> {
        match time.hour() {
            7..=12 => Some(Self::Morning),
            13..=17 => Some(Self::Afternoon),
            18..=20 => Some(Self::Evening),
            _ => None,
        }
    }

    /// Parses a day-part label such as `"Morning"` or
    /// `"6 PM - 9 PM (Evening)"`.
    pub fn from_label(label: &str) -> Option<Self> {
        let lower = label.to_ascii_lowercase();
        if lower.contains("morning") {
            Some(Self::Morning)
        } else if lower.contains("afternoon") {
            Some(Self::Afternoon)
        } else if lower.contains("evening") || lower.contains("night") {
            Some(Self::Evening)
        } else {
            None
        }
    }

    /// Display label matching the availability form.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Morning => "7 AM - 1 PM (Morning)",
            Self::Afternoon => "1 PM - 6 PM (Afternoon)",
            Self::Evening => "6 PM - 9 PM (Evening)",
        }
    }
}

/// Catalog of permitted exam start times.
///
/// Day classes start from the `day` list, night classes from the `evening`
/// list. Every exam must end by `cutoff_minute`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SlotCatalog {
    /// Day start times (morning and afternoon).
    pub day: Vec<NaiveTime>,
    /// Evening start times, the only ones open to night classes.
    pub evening: Vec<NaiveTime>,
    /// Latest permitted end minute.
    pub cutoff_minute: u32,
}

impl Default for SlotCatalog {
    /// 07:00–17:30 day grid, 18:00–20:30 evening grid, 21:00 cutoff.
    fn default() -> Self {
        Self {
            day: grid(7 * 60, 18 * 60),
            evening: grid(18 * 60, 21 * 60),
            cutoff_minute: DEFAULT_CUTOFF_MINUTE,
        }
    }
}

fn grid(from: u32, until: u32) -> Vec<NaiveTime> {
    (from..until)
        .step_by(SLOT_MINUTES as usize)
        .filter_map(time_at_minute)
        .collect()
}

impl SlotCatalog {
    /// Creates a catalog from explicit lists.
    pub fn new(day: Vec<NaiveTime>, evening: Vec<NaiveTime>) -> Self {
        Self {
            day,
            evening,
            cutoff_minute: DEFAULT_CUTOFF_MINUTE,
        }
    }

    /// Sets the cutoff minute.
    pub fn with_cutoff_minute(mut self, minute: u32) -> Self {
        self.cutoff_minute = minute;
        self
    }

    /// Whether an exam starting at `time` ends by the cutoff.
    pub fn fits(&self, time: NaiveTime, duration_minutes: u32) -> bool {
        TimeWindow::for_exam(time, duration_minutes).end <= self.cutoff_minute
    }

    /// Start times open to a section, in catalog order.
    ///
    /// Night classes take evening times only; day classes take day times
    /// only. Either way the window must end by the cutoff.
    pub fn candidate_times(&self, is_night_class: bool, duration_minutes: u32) -> Vec<NaiveTime> {
        let source = if is_night_class { &self.evening } else { &self.day };
        source
            .iter()
            .copied()
            .filter(|&t| self.fits(t, duration_minutes))
            .collect()
    }

    /// Whether `time` is listed for a section of this kind, ignoring the cutoff.
    pub fn lists(&self, time: NaiveTime, is_night_class: bool) -> bool {
        if is_night_class {
            self.evening.contains(&time)
        } else {
            self.day.contains(&time)
        }
    }
}
