//! Schedule output records.
//!
//! A run produces two disjoint sets: [`ScheduledExam`]s ready for the
//! persistence layer and [`UnscheduledSection`]s handed to the manual editor.
//! Every conflict the decoder finds is a [`Conflict`], which is either
//! critical (the section is not committed) or a warning (it is).

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use super::{ProctorId, RoomId, Section, SectionId};

/// A committed exam.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledExam {
    /// Program offering the course.
    pub program_id: String,
    /// Course of the exam.
    pub course_id: String,
    /// Section (modality) id.
    pub section_id: SectionId,
    /// Assigned room.
    pub room_id: RoomId,
    /// Class sections sitting the exam.
    pub sections: Vec<String>,
    /// Instructors of the class sections.
    pub instructors: Vec<ProctorId>,
    /// One proctor slot per class section; `None` means unassigned.
    pub proctors: Vec<Option<ProctorId>>,
    /// Display name (first class section).
    pub section_name: Option<String>,
    /// Primary instructor.
    pub instructor_id: Option<ProctorId>,
    /// Canonical proctor (first entry of `proctors`).
    pub proctor_id: Option<ProctorId>,
    /// Exam date.
    pub exam_date: NaiveDate,
    /// Start timestamp.
    pub exam_start_time: NaiveDateTime,
    /// End timestamp.
    pub exam_end_time: NaiveDateTime,
    /// Duration as `HH:MM:SS`.
    pub exam_duration: String,
    /// Academic year label.
    pub academic_year: String,
    /// Semester label.
    pub semester: String,
    /// Exam category label (e.g. "Midterm").
    pub exam_category: Option<String>,
    /// Exam period label.
    pub exam_period: String,
    /// College name.
    pub college_name: String,
    /// Building name with id, e.g. `"Main Hall (B1)"`.
    pub building_name: String,
    /// Non-blocking issues found while committing.
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl ScheduledExam {
    /// Start time of day.
    pub fn start_time(&self) -> NaiveTime {
        self.exam_start_time.time()
    }

    /// End time of day.
    pub fn end_time(&self) -> NaiveTime {
        self.exam_end_time.time()
    }

    /// Whether every class section has a proctor.
    pub fn fully_proctored(&self) -> bool {
        !self.proctors.is_empty() && self.proctors.iter().all(Option::is_some)
    }
}

/// The assignment last attempted for a section that was not committed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptedAssignment {
    /// Attempted date.
    pub date: NaiveDate,
    /// Attempted start time.
    pub time: NaiveTime,
    /// Attempted room, if any.
    pub room: Option<RoomId>,
    /// Attempted proctor, if any.
    pub proctor: Option<ProctorId>,
}

/// A section left for manual scheduling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnscheduledSection {
    /// Section (modality) id.
    pub modality_id: SectionId,
    /// Course id.
    pub course_id: String,
    /// Class sections.
    pub sections: Vec<String>,
    /// Program id.
    pub program_id: String,
    /// Instructors.
    pub instructors: Vec<ProctorId>,
    /// Headcount.
    pub total_students: u32,
    /// Admissible rooms.
    pub possible_rooms: Vec<RoomId>,
    /// Night-class flag.
    pub is_night_class: bool,
    /// Why the section was not committed.
    pub conflicts: Vec<String>,
    /// What the engine last tried, if it tried anything.
    pub attempted_assignment: Option<AttemptedAssignment>,
}

impl UnscheduledSection {
    /// Builds the record from a section and its conflicts.
    pub fn from_section(
        section: &Section,
        conflicts: &[Conflict],
        attempted: Option<AttemptedAssignment>,
    ) -> Self {
        Self {
            modality_id: section.id,
            course_id: section.course_id.clone(),
            sections: section.sections.clone(),
            program_id: section.program_id.clone(),
            instructors: section.instructors.clone(),
            total_students: section.total_students,
            possible_rooms: section.possible_rooms.clone(),
            is_night_class: section.is_night_class,
            conflicts: conflicts.iter().map(ToString::to_string).collect(),
            attempted_assignment: attempted,
        }
    }
}

/// How much a conflict matters to the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    /// The section is withheld from the committed schedule.
    Critical,
    /// The section is committed; the issue is reported alongside it.
    Warning,
}

/// A conflict found while decoding a candidate schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Conflict {
    /// No room is assigned (or none was ever admissible).
    NoRoom,
    /// The room is already taken by an accepted exam.
    RoomConflict,
    /// The start time is not in the valid catalog for this section.
    InvalidTimeSlot,
    /// The exam would end after the day cutoff.
    PastCutoff,
    /// A night class has no evening start that fits the duration.
    NoEveningSlot,
    /// The gene disagrees with its course-group's shared date and time.
    CourseGroupSplit,
    /// The section was never placed by the search.
    NotPlaced,
    /// No free proctor could be found.
    NoProctor,
    /// Sections of the course landed on more than one date.
    MultipleDates,
    /// The room seats fewer students than the section's headcount.
    CapacityShortfall,
}

impl Conflict {
    /// Severity of this conflict.
    pub fn severity(&self) -> Severity {
        match self {
            Self::NoRoom
            | Self::RoomConflict
            | Self::InvalidTimeSlot
            | Self::PastCutoff
            | Self::NoEveningSlot
            | Self::CourseGroupSplit
            | Self::NotPlaced => Severity::Critical,
            Self::NoProctor | Self::MultipleDates | Self::CapacityShortfall => Severity::Warning,
        }
    }

    /// Whether this conflict blocks commitment.
    #[inline]
    pub fn is_critical(&self) -> bool {
        self.severity() == Severity::Critical
    }
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::NoRoom => "No suitable room available",
            Self::RoomConflict => "Room conflict at this time",
            Self::InvalidTimeSlot => "Invalid time slot",
            Self::PastCutoff => "Would end after the day cutoff",
            Self::NoEveningSlot => "No evening time slot fits the exam duration",
            Self::CourseGroupSplit => "Course sections split across start times",
            Self::NotPlaced => "Section was not placed",
            Self::NoProctor => "No available proctor - manual assignment needed",
            Self::MultipleDates => "Course has sections on multiple dates",
            Self::CapacityShortfall => "Room capacity below headcount",
        };
        f.write_str(text)
    }
}
