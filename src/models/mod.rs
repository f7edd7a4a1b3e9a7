//! Exam scheduling domain models.
//!
//! Provides the input catalogs (sections, rooms, proctor availability), the
//! exam-day time grid, and the output records of a run.
//!
//! # Domain Mappings
//!
//! | exam-schedule | Generic scheduling |
//! |---------------|--------------------|
//! | Section | Task |
//! | Room | Primary resource |
//! | Proctor | Human resource |
//! | ScheduledExam | Assignment |

mod availability;
mod calendar;
mod resource;
mod schedule;
mod section;

pub use availability::{AvailabilityIndex, ProctorAvailability, SlotLabel};
pub use calendar::{
    minute_of_day, time_at_minute, DayPart, SlotCatalog, TimeWindow, DEFAULT_CUTOFF_MINUTE,
    SLOT_MINUTES,
};
pub use resource::{Room, RoomType};
pub use schedule::{
    AttemptedAssignment, Conflict, ScheduledExam, Severity, UnscheduledSection,
};
pub use section::{CourseGroupKey, ProctorId, RoomId, Section, SectionId};
