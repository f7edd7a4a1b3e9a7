//! Exam scheduler runner and outcome handling.
//!
//! Provides the GA runner, the persistence boundary and summary figures.
//!
//! # Runner
//!
//! [`ExamScheduler`] runs pre-flight checks, evolves a population for a
//! fixed number of generations and decodes the best chromosome it has seen.
//! Progress is reported through a callback that can also cancel the run.
//!
//! # Persistence
//!
//! [`ScheduleOutcome::commit`] hands the committed exams to a
//! [`ScheduleSink`] in one batch.
//!
//! # Summary
//!
//! [`ScheduleSummary`] counts scheduled and unscheduled sections, proctor
//! coverage and per-date and per-room load.

mod kpi;
mod runner;
mod sink;

pub use kpi::ScheduleSummary;
pub use runner::{ExamScheduler, ProgressReport, ScheduleOutcome};
pub use sink::ScheduleSink;
