//! Proctor availability.
//!
//! Proctors state availability per date as a mix of literal start times
//! (`"07:30"`) and day-part names (`"1 PM - 6 PM (Afternoon)"`). Entries are
//! normalized once into an [`AvailabilityIndex`] that answers "who may
//! proctor an exam starting at this date and time".
//!
//! # Lookup order
//! 1. Proctors listed for the exact start time on that date.
//! 2. Otherwise, proctors listed for the day-part containing the start.
//! 3. Otherwise, anyone listed for any slot on that date.

use std::collections::{BTreeSet, HashMap, HashSet};

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{DayPart, ProctorId};

/// One proctor's availability as submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProctorAvailability {
    /// Proctor user id.
    #[serde(alias = "user_id")]
    pub proctor_id: ProctorId,
    /// Dates the proctor is available.
    #[serde(alias = "days")]
    pub dates: Vec<NaiveDate>,
    /// Time slots or day-part labels.
    pub time_slots: Vec<String>,
}

impl ProctorAvailability {
    /// Creates an entry with no dates or slots.
    pub fn new(proctor_id: ProctorId) -> Self {
        Self {
            proctor_id,
            dates: Vec::new(),
            time_slots: Vec::new(),
        }
    }

    /// Adds a date.
    pub fn on(mut self, date: NaiveDate) -> Self {
        self.dates.push(date);
        self
    }

    /// Adds a slot label.
    pub fn at(mut self, slot: impl Into<String>) -> Self {
        self.time_slots.push(slot.into());
        self
    }
}

/// Normalized form of an availability slot label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotLabel {
    /// A literal start time, also implying its day-part.
    Time(NaiveTime),
    /// A whole day-part.
    Part(DayPart),
}

impl SlotLabel {
    /// Parses a label.
    ///
    /// `"HH:MM"` and `"HH:MM:SS"` are literal times. A range such as
    /// `"07:00-12:00"` stands for the day-part of its start. Anything else
    /// is matched against day-part names.
    pub fn parse(label: &str) -> Option<Self> {
        let label = label.trim();
        if let Some(time) = parse_clock(label) {
            return Some(Self::Time(time));
        }
        if let Some((start, _)) = label.split_once('-') {
            if let Some(part) = parse_clock(start.trim()).and_then(DayPart::of) {
                return Some(Self::Part(part));
            }
        }
        DayPart::from_label(label).map(Self::Part)
    }
}

fn parse_clock(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .ok()
}

/// Lookup structure over normalized availability.
#[derive(Debug, Clone, Default)]
pub struct AvailabilityIndex {
    by_time: HashMap<(NaiveDate, NaiveTime), BTreeSet<ProctorId>>,
    by_part: HashMap<(NaiveDate, DayPart), BTreeSet<ProctorId>>,
    by_date: HashMap<NaiveDate, BTreeSet<ProctorId>>,
}

impl AvailabilityIndex {
    /// Builds the index.
    ///
    /// When `pool` is given, proctors outside it (users of another college)
    /// are dropped. Unparseable labels are logged and skipped; the proctor
    /// still counts as available on the entry's dates.
    pub fn build(entries: &[ProctorAvailability], pool: Option<&HashSet<ProctorId>>) -> Self {
        let mut index = Self::default();

        for entry in entries {
            if pool.is_some_and(|p| !p.contains(&entry.proctor_id)) {
                continue;
            }
            let labels: Vec<SlotLabel> = entry
                .time_slots
                .iter()
                .filter_map(|raw| {
                    let parsed = SlotLabel::parse(raw);
                    if parsed.is_none() {
                        warn!(
                            proctor = entry.proctor_id,
                            slot = %raw,
                            "unrecognized availability slot"
                        );
                    }
                    parsed
                })
                .collect();

            for &date in &entry.dates {
                // Listed dates count even without usable slot labels.
                index.by_date.entry(date).or_default().insert(entry.proctor_id);
                for label in &labels {
                    index.insert(date, *label, entry.proctor_id);
                }
            }
        }

        index
    }

    fn insert(&mut self, date: NaiveDate, label: SlotLabel, proctor: ProctorId) {
        match label {
            SlotLabel::Time(time) => {
                self.by_time.entry((date, time)).or_default().insert(proctor);
                if let Some(part) = DayPart::of(time) {
                    self.by_part.entry((date, part)).or_default().insert(proctor);
                }
            }
            SlotLabel::Part(part) => {
                self.by_part.entry((date, part)).or_default().insert(proctor);
            }
        }
        self.by_date.entry(date).or_default().insert(proctor);
    }

    /// Proctors available for an exam starting at `start` on `date`,
    /// in ascending id order.
    pub fn available(&self, date: NaiveDate, start: NaiveTime) -> Vec<ProctorId> {
        if let Some(set) = self.by_time.get(&(date, start)) {
            return set.iter().copied().collect();
        }
        if let Some(set) = DayPart::of(start).and_then(|part| self.by_part.get(&(date, part))) {
            return set.iter().copied().collect();
        }
        self.by_date
            .get(&date)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Whether anyone is listed on `date`.
    pub fn has_any_on(&self, date: NaiveDate) -> bool {
        self.by_date.get(&date).is_some_and(|s| !s.is_empty())
    }

    /// Number of distinct proctors across all dates.
    pub fn proctor_count(&self) -> usize {
        self.by_date
            .values()
            .flat_map(|s| s.iter())
            .collect::<HashSet<_>>()
            .len()
    }
}
