//! Exam timetabling engine.
//!
//! Assigns exam sections to a date, start time, room and proctors for one
//! college at a time. A genetic search explores candidate timetables; the
//! best one is decoded into a committed schedule that never double-books a
//! room or a proctor, plus the sections left for manual scheduling.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Section`, `Room`, `ProctorAvailability`,
//!   `SlotCatalog`, `ScheduledExam`, `UnscheduledSection`, `Conflict`
//! - **`config`**: Exam configuration and GA parameters
//! - **`tracker`**: Per-pass room and proctor occupancy
//! - **`ga`**: Chromosome encoding, construction, fitness, operators, decoding
//! - **`scheduler`**: GA runner, progress and cancellation, persistence sink, summary
//! - **`validation`**: Pre-flight checks (fatal errors and warnings)
//! - **`error`**: Engine errors
//!
//! # Hard rules
//!
//! - A room or proctor holds at most one exam in any overlapping window.
//! - Night classes start in the evening; day classes never do.
//! - Every exam ends by 21:00.
//! - Sections of one course-group share date and start time.

pub mod config;
pub mod error;
pub mod ga;
pub mod models;
pub mod scheduler;
pub mod tracker;
pub mod validation;

pub use config::{ExamConfig, GaParams};
pub use error::{EngineError, Result};
pub use ga::{ExamCatalog, ExamProblem};
pub use scheduler::{ExamScheduler, ProgressReport, ScheduleOutcome, ScheduleSink, ScheduleSummary};
pub use validation::{preflight, PreflightIssue, PreflightKind};
