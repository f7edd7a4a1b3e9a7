//! GA-based exam scheduling.
//!
//! A chromosome holds one gene per placeable section: date, start time,
//! room and proctor. Sections of one course-group (same course, same
//! day/night flag) share date and start time; the day and night groups of
//! a course are built on the same date.
//!
//! # Pipeline
//!
//! 1. [`construct`]: random, feasible-leaning chromosomes.
//! 2. [`evaluate`]: integer fitness, higher is better.
//! 3. [`operators`]: tournament selection, uniform crossover, group-aware mutation.
//! 4. [`decode`]: the committed schedule and the unscheduled remainder.

mod chromosome;
mod construct;
mod decode;
mod fitness;
pub mod operators;
mod problem;

pub use chromosome::{uniform_crossover, ExamChromosome, Gene, GroupSlots, Slot};
pub use construct::{construct, select_proctor};
pub use decode::{decode, DecodedSchedule};
pub use fitness::{
    evaluate, COHORT_CLASH, DUPLICATE_SECTION, FULLY_ASSIGNED, INVALID_TIME, MULTIPLE_DATES,
    NO_ROOM, PAST_CUTOFF, PROCTOR_OVERLAP, ROOM_OVERLAP, SPLIT_START, YEAR_LEVEL_MIX,
};
pub use problem::{CourseGroup, ExamCatalog, ExamProblem};
