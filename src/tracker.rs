//! Resource occupancy trackers.
//!
//! A tracker records which `[start, end)` minute windows a room or proctor
//! is booked for on each date. Every construction, evaluation, mutation and
//! decode pass builds its own tracker; none is shared between chromosomes.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

use chrono::NaiveDate;

use crate::models::{ProctorId, RoomId, SectionId, TimeWindow};

/// One booked window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Booking {
    /// Occupied window.
    pub window: TimeWindow,
    /// Section holding the booking.
    pub section: SectionId,
}

/// Bookings per (date, resource).
#[derive(Debug, Clone)]
pub struct IntervalMap<K> {
    ranges: HashMap<NaiveDate, HashMap<K, Vec<Booking>>>,
}

impl<K> Default for IntervalMap<K> {
    fn default() -> Self {
        Self {
            ranges: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash> IntervalMap<K> {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bookings of one resource on one date.
    pub fn bookings<Q>(&self, date: NaiveDate, key: &Q) -> &[Booking]
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.ranges
            .get(&date)
            .and_then(|by_key| by_key.get(key))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether the resource has no booking overlapping `window`.
    pub fn is_free<Q>(&self, date: NaiveDate, key: &Q, window: TimeWindow) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        !self
            .bookings(date, key)
            .iter()
            .any(|b| b.window.overlaps(&window))
    }

    /// Number of existing bookings overlapping `window`.
    pub fn overlap_count<Q>(&self, date: NaiveDate, key: &Q, window: TimeWindow) -> usize
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.bookings(date, key)
            .iter()
            .filter(|b| b.window.overlaps(&window))
            .count()
    }

    /// Records a booking. Overlaps are not rejected here.
    pub fn mark<Q>(&mut self, date: NaiveDate, key: &Q, window: TimeWindow, section: SectionId)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
    {
        let by_key = self.ranges.entry(date).or_default();
        let booking = Booking { window, section };
        match by_key.get_mut(key) {
            Some(list) => list.push(booking),
            None => {
                by_key.insert(key.to_owned(), vec![booking]);
            }
        }
    }
}

/// Room and proctor occupancy for one pass.
#[derive(Debug, Clone, Default)]
pub struct ResourceTracker {
    /// Bookings keyed by (date, room).
    pub rooms: IntervalMap<RoomId>,
    /// Bookings keyed by (date, proctor).
    pub proctors: IntervalMap<ProctorId>,
}

impl ResourceTracker {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the room is free for the window.
    #[inline]
    pub fn room_free(&self, date: NaiveDate, room: &str, window: TimeWindow) -> bool {
        self.rooms.is_free(date, room, window)
    }

    /// Books a room.
    #[inline]
    pub fn mark_room(
        &mut self,
        date: NaiveDate,
        room: &str,
        window: TimeWindow,
        section: SectionId,
    ) {
        self.rooms.mark(date, room, window, section);
    }

    /// Whether the proctor is free for the window.
    #[inline]
    pub fn proctor_free(&self, date: NaiveDate, proctor: ProctorId, window: TimeWindow) -> bool {
        self.proctors.is_free(date, &proctor, window)
    }

    /// Books a proctor.
    #[inline]
    pub fn mark_proctor(
        &mut self,
        date: NaiveDate,
        proctor: ProctorId,
        window: TimeWindow,
        section: SectionId,
    ) {
        self.proctors.mark(date, &proctor, window, section);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 11, day).unwrap()
    }

    #[test]
    fn test_room_booking() {
        let mut tracker = ResourceTracker::new();
        let morning = TimeWindow::new(540, 630);
        tracker.mark_room(d(2), "R1", morning, 1);

        assert!(!tracker.room_free(d(2), "R1", TimeWindow::new(600, 690)));
        assert!(tracker.room_free(d(2), "R1", TimeWindow::new(630, 720))); // touching
        assert!(tracker.room_free(d(2), "R2", morning));
        assert!(tracker.room_free(d(3), "R1", morning));
    }

    #[test]
    fn test_overlap_count() {
        let mut map: IntervalMap<ProctorId> = IntervalMap::new();
        map.mark(d(2), &7, TimeWindow::new(540, 600), 1);
        map.mark(d(2), &7, TimeWindow::new(570, 630), 2);
        map.mark(d(2), &7, TimeWindow::new(700, 760), 3);

        assert_eq!(map.overlap_count(d(2), &7, TimeWindow::new(560, 620)), 2);
        assert_eq!(map.overlap_count(d(2), &7, TimeWindow::new(800, 860)), 0);
        assert_eq!(map.bookings(d(2), &7).len(), 3);
    }
}
