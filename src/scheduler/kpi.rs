//! Schedule summary figures.
//!
//! Computes the headline numbers a scheduling office looks at after a
//! run, from a [`ScheduleOutcome`].
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Scheduled rate | committed / all sections |
//! | Proctor coverage | filled proctor slots / all proctor slots |
//! | Exams per date | committed exams per exam date |
//! | Room usage | committed exams per room |
//! | Conflict counts | unscheduled sections per conflict message |

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use super::runner::ScheduleOutcome;

/// Summary of a run.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleSummary {
    /// Sections in the run.
    pub total_sections: usize,
    /// Committed exams.
    pub scheduled: usize,
    /// Sections left for manual scheduling.
    pub unscheduled: usize,
    /// Fraction of sections committed (0.0..1.0).
    pub scheduled_rate: f64,
    /// Committed exams without a canonical proctor.
    pub without_proctor: usize,
    /// Fraction of proctor slots filled (0.0..1.0).
    pub proctor_coverage: f64,
    /// Committed exams per date.
    pub exams_by_date: BTreeMap<NaiveDate, usize>,
    /// Committed exams per room.
    pub exams_by_room: BTreeMap<String, usize>,
    /// Unscheduled sections per conflict message.
    pub conflict_counts: BTreeMap<String, usize>,
}

impl ScheduleSummary {
    /// Computes the summary of an outcome.
    pub fn calculate(outcome: &ScheduleOutcome) -> Self {
        let scheduled = outcome.scheduled.len();
        let unscheduled = outcome.unscheduled.len();
        let total = scheduled + unscheduled;

        let mut exams_by_date = BTreeMap::new();
        let mut exams_by_room = BTreeMap::new();
        let mut slots = 0usize;
        let mut filled = 0usize;
        let mut without_proctor = 0usize;

        for exam in &outcome.scheduled {
            *exams_by_date.entry(exam.exam_date).or_insert(0) += 1;
            *exams_by_room.entry(exam.room_id.clone()).or_insert(0) += 1;
            slots += exam.proctors.len();
            filled += exam.proctors.iter().filter(|p| p.is_some()).count();
            if exam.proctor_id.is_none() {
                without_proctor += 1;
            }
        }

        let mut conflict_counts = BTreeMap::new();
        for section in &outcome.unscheduled {
            for conflict in &section.conflicts {
                *conflict_counts.entry(conflict.clone()).or_insert(0) += 1;
            }
        }

        Self {
            total_sections: total,
            scheduled,
            unscheduled,
            scheduled_rate: ratio(scheduled, total),
            without_proctor,
            proctor_coverage: ratio(filled, slots),
            exams_by_date,
            exams_by_room,
            conflict_counts,
        }
    }

    /// Checks the summary against minimum rates.
    pub fn meets_thresholds(&self, min_scheduled_rate: f64, min_proctor_coverage: f64) -> bool {
        self.scheduled_rate >= min_scheduled_rate && self.proctor_coverage >= min_proctor_coverage
    }
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}
