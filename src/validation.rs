//! Pre-flight checks for exam-scheduling problems.
//!
//! Runs before the search. Conditions that make a run pointless are
//! returned as [`EngineError`]s:
//! - Invalid exam configuration
//! - No usable dates
//! - Duplicate section ids
//! - No proctors left after pool filtering
//!
//! Everything else is a [`PreflightIssue`]: the run proceeds and the
//! affected sections usually end up unscheduled.

use std::collections::HashSet;

use tracing::warn;

use crate::error::{EngineError, Result};
use crate::ga::ExamProblem;

/// A non-fatal problem found before the search.
#[derive(Debug, Clone, PartialEq)]
pub struct PreflightIssue {
    /// Issue category.
    pub kind: PreflightKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of pre-flight issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreflightKind {
    /// A section lists no admissible room.
    NoAdmissibleRoom,
    /// A section lists a room missing from the room catalog.
    UnknownRoom,
    /// No admissible room seats the section's headcount.
    CapacityShortfall,
    /// A night class has no evening start that fits the duration.
    NoEveningSlot,
    /// A day class has no day start that ends by the cutoff.
    NoDaySlot,
    /// Nobody is available on a usable date.
    DateWithoutProctors,
}

impl PreflightIssue {
    fn new(kind: PreflightKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Checks a problem before the search.
///
/// # Returns
/// The non-fatal issues found, or the first fatal error.
pub fn preflight(problem: &ExamProblem) -> Result<Vec<PreflightIssue>> {
    problem.config().validate(problem.slots().cutoff_minute)?;

    if problem.dates().is_empty() {
        return Err(EngineError::NoUsableDates);
    }

    let mut ids = HashSet::new();
    for section in problem.sections() {
        if !ids.insert(section.id) {
            return Err(EngineError::DuplicateSection(section.id));
        }
    }

    if problem.availability().proctor_count() == 0 {
        return Err(EngineError::NoProctors);
    }

    let mut issues = Vec::new();

    for section in problem.sections() {
        if !section.has_rooms() {
            issues.push(PreflightIssue::new(
                PreflightKind::NoAdmissibleRoom,
                format!("Section {} ({}) has no admissible room", section.id, section.course_id),
            ));
        }

        for room in &section.possible_rooms {
            if problem.room(room).is_none() {
                issues.push(PreflightIssue::new(
                    PreflightKind::UnknownRoom,
                    format!("Section {} references unknown room '{}'", section.id, room),
                ));
            }
        }

        if section.has_rooms()
            && !section
                .possible_rooms
                .iter()
                .any(|r| problem.room_seats(r, section.total_students))
        {
            issues.push(PreflightIssue::new(
                PreflightKind::CapacityShortfall,
                format!(
                    "No admissible room seats the {} students of section {}",
                    section.total_students, section.id
                ),
            ));
        }

        if problem.candidate_times(section.is_night_class).is_empty() {
            let (kind, part) = if section.is_night_class {
                (PreflightKind::NoEveningSlot, "evening")
            } else {
                (PreflightKind::NoDaySlot, "day")
            };
            issues.push(PreflightIssue::new(
                kind,
                format!(
                    "No {} start fits a {}-minute exam for section {}",
                    part,
                    problem.config().duration_minutes,
                    section.id
                ),
            ));
        }
    }

    for &date in problem.dates() {
        if !problem.availability().has_any_on(date) {
            issues.push(PreflightIssue::new(
                PreflightKind::DateWithoutProctors,
                format!("No proctor is available on {}", date),
            ));
        }
    }

    for issue in &issues {
        warn!(kind = ?issue.kind, "{}", issue.message);
    }

    Ok(issues)
}
