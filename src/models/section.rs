//! Exam section model.
//!
//! A section (modality) is one exam event: one or more class sections of a
//! course sitting the same paper together. Sections arrive from the upstream
//! repository with their headcount and admissible rooms already computed.

use serde::{Deserialize, Serialize};

/// Section identifier (the modality id upstream).
pub type SectionId = u32;

/// User identifier of an instructor or proctor.
pub type ProctorId = u32;

/// Room identifier.
pub type RoomId = String;

/// An exam section to be scheduled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Unique section identifier.
    #[serde(alias = "modality_id")]
    pub id: SectionId,
    /// Course the exam belongs to.
    pub course_id: String,
    /// Program offering the course.
    pub program_id: String,
    /// Class-section names sitting this exam (e.g. `"BSIT 2A"`).
    #[serde(default)]
    pub sections: Vec<String>,
    /// Headcount across all class sections.
    #[serde(default)]
    pub total_students: u32,
    /// Night classes only take evening start times.
    #[serde(default)]
    pub is_night_class: bool,
    /// Primary instructor, if known.
    #[serde(default)]
    pub instructor_id: Option<ProctorId>,
    /// All instructors of the class sections, deduplicated.
    #[serde(default)]
    pub instructors: Vec<ProctorId>,
    /// Rooms the upstream packer deemed admissible.
    #[serde(default)]
    pub possible_rooms: Vec<RoomId>,
}

/// Key of a course-group: sections of one course with the same
/// day/night classification share a date and start time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CourseGroupKey {
    /// Course identifier.
    pub course_id: String,
    /// Night-class flag.
    pub is_night_class: bool,
}

impl Section {
    /// Creates a day-class section with no class sections or rooms yet.
    pub fn new(id: SectionId, course_id: impl Into<String>, program_id: impl Into<String>) -> Self {
        Self {
            id,
            course_id: course_id.into(),
            program_id: program_id.into(),
            sections: Vec::new(),
            total_students: 0,
            is_night_class: false,
            instructor_id: None,
            instructors: Vec::new(),
            possible_rooms: Vec::new(),
        }
    }

    /// Adds a class-section name.
    pub fn with_class_section(mut self, name: impl Into<String>) -> Self {
        self.sections.push(name.into());
        self
    }

    /// Sets the headcount.
    pub fn with_students(mut self, total: u32) -> Self {
        self.total_students = total;
        self
    }

    /// Marks the section as a night class.
    pub fn night_class(mut self) -> Self {
        self.is_night_class = true;
        self
    }

    /// Sets the primary instructor and lists them among the instructors.
    pub fn with_instructor(mut self, instructor: ProctorId) -> Self {
        self.instructor_id = Some(instructor);
        if !self.instructors.contains(&instructor) {
            self.instructors.push(instructor);
        }
        self
    }

    /// Adds further instructors.
    pub fn with_instructors(mut self, instructors: impl IntoIterator<Item = ProctorId>) -> Self {
        for id in instructors {
            if !self.instructors.contains(&id) {
                self.instructors.push(id);
            }
        }
        self
    }

    /// Adds an admissible room.
    pub fn with_room(mut self, room: impl Into<RoomId>) -> Self {
        self.possible_rooms.push(room.into());
        self
    }

    /// Course-group this section belongs to.
    pub fn group_key(&self) -> CourseGroupKey {
        CourseGroupKey {
            course_id: self.course_id.clone(),
            is_night_class: self.is_night_class,
        }
    }

    /// First class-section name, used as the display name.
    pub fn section_name(&self) -> Option<&str> {
        self.sections.first().map(String::as_str)
    }

    /// Year level read off the first digit of the section name.
    ///
    /// `"BSIT 2A"` is year `'2'`. Sections without a digit fall into one
    /// shared `None` cohort.
    pub fn year_level(&self) -> Option<char> {
        self.section_name()
            .and_then(|name| name.chars().find(|c| c.is_ascii_digit()))
    }

    /// Primary instructor, falling back to the first listed instructor.
    pub fn primary_instructor(&self) -> Option<ProctorId> {
        self.instructor_id.or_else(|| self.instructors.first().copied())
    }

    /// Whether the upstream packer found any room for this section.
    pub fn has_rooms(&self) -> bool {
        !self.possible_rooms.is_empty()
    }
}
