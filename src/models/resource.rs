//! Room model.
//!
//! Rooms are the spatial resource exams occupy. Capacity is compared against
//! a section's headcount; the building reference is only carried through to
//! the output.

use serde::{Deserialize, Serialize};

use super::RoomId;

/// An exam room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    /// Unique room identifier.
    pub room_id: RoomId,
    /// Seats available.
    #[serde(alias = "room_capacity")]
    pub capacity: u32,
    /// Building the room is in.
    pub building_id: String,
    /// Room classification.
    #[serde(default)]
    pub room_type: RoomType,
}

/// Room classification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomType {
    /// Ordinary lecture room.
    #[default]
    Lecture,
    /// Laboratory.
    Laboratory,
    /// Domain-specific type.
    Custom(String),
}

impl Room {
    /// Creates a lecture room.
    pub fn new(room_id: impl Into<RoomId>, capacity: u32, building_id: impl Into<String>) -> Self {
        Self {
            room_id: room_id.into(),
            capacity,
            building_id: building_id.into(),
            room_type: RoomType::Lecture,
        }
    }

    /// Sets the room type.
    pub fn with_type(mut self, room_type: RoomType) -> Self {
        self.room_type = room_type;
        self
    }

    /// Whether `students` fit.
    #[inline]
    pub fn seats(&self, students: u32) -> bool {
        students <= self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_builder() {
        let r = Room::new("R101", 40, "B1").with_type(RoomType::Laboratory);
        assert_eq!(r.room_id, "R101");
        assert_eq!(r.capacity, 40);
        assert_eq!(r.building_id, "B1");
        assert_eq!(r.room_type, RoomType::Laboratory);
    }

    #[test]
    fn test_room_seats() {
        let r = Room::new("R1", 30, "B1");
        assert!(r.seats(30));
        assert!(!r.seats(31));
    }

    #[test]
    fn test_room_deserialize_defaults() {
        let r: Room =
            serde_json::from_str(r#"{"room_id":"R9","room_capacity":25,"building_id":"B2"}"#)
                .unwrap();
        assert_eq!(r.capacity, 25);
        assert_eq!(r.room_type, RoomType::Lecture);
    }
}
