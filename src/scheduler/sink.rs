//! Persistence boundary.
//!
//! The engine never writes anywhere itself. A [`ScheduleSink`] receives the
//! committed exams of a run in one call and either stores all of them or
//! fails; retry policy belongs to the implementor.

use std::convert::Infallible;

use crate::models::ScheduledExam;

/// Receives the committed exams of a run.
pub trait ScheduleSink {
    /// Error raised when persisting fails.
    type Error;

    /// Stores a batch of committed exams.
    fn persist(&mut self, exams: &[ScheduledExam]) -> Result<(), Self::Error>;
}

/// Collects exams in memory.
impl ScheduleSink for Vec<ScheduledExam> {
    type Error = Infallible;

    fn persist(&mut self, exams: &[ScheduledExam]) -> Result<(), Self::Error> {
        self.extend_from_slice(exams);
        Ok(())
    }
}
