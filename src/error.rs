//! Error types for the exam scheduler.
//!
//! Only conditions that stop a run before it starts are errors. Everything
//! the engine can work around (a section without rooms, a date without
//! proctors) is reported as a [`PreflightIssue`](crate::validation::PreflightIssue)
//! and the run proceeds.

use thiserror::Error;

use crate::models::SectionId;

/// Fatal conditions that make the engine refuse to run.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The usable-date list is empty.
    #[error("no usable exam dates were supplied")]
    NoUsableDates,

    /// No proctor is listed in any availability entry (after pool filtering).
    #[error("no proctors are available for this college")]
    NoProctors,

    /// Two sections share one id.
    #[error("duplicate section id: {0}")]
    DuplicateSection(SectionId),

    /// The exam configuration cannot produce a valid window.
    #[error("invalid exam configuration: {0}")]
    InvalidConfig(String),

    /// GA parameters are out of range.
    #[error("invalid GA parameters: {0}")]
    InvalidParameters(String),
}

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            EngineError::NoUsableDates.to_string(),
            "no usable exam dates were supplied"
        );
        assert_eq!(
            EngineError::DuplicateSection(7).to_string(),
            "duplicate section id: 7"
        );
        assert!(EngineError::InvalidParameters("elite_count".into())
            .to_string()
            .contains("elite_count"));
    }
}
