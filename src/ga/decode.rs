//! Chromosome decoding.
//!
//! Turns the best chromosome into the committed schedule. Genes are
//! re-validated in gene order against a fresh tracker. Conflicts are split
//! by [`Conflict::is_critical`]: a gene with any critical conflict is
//! withheld and reported as unscheduled, everything else is committed with
//! its warnings attached. Committed exams never share a room or a proctor
//! in overlapping windows.

use std::collections::{BTreeSet, HashMap, HashSet};

use chrono::{NaiveDate, TimeDelta};
use rand::Rng;
use rand::prelude::SliceRandom;
use tracing::debug;

use super::chromosome::{ExamChromosome, Gene, GroupSlots};
use super::construct::select_proctor;
use super::problem::ExamProblem;
use crate::models::{
    AttemptedAssignment, Conflict, ProctorId, ScheduledExam, Section, TimeWindow,
    UnscheduledSection,
};
use crate::tracker::ResourceTracker;

/// Result of decoding one chromosome.
#[derive(Debug, Clone, Default)]
pub struct DecodedSchedule {
    /// Committed exams, in gene order.
    pub scheduled: Vec<ScheduledExam>,
    /// Sections left for manual scheduling.
    pub unscheduled: Vec<UnscheduledSection>,
}

/// Decodes a chromosome into committed and unscheduled sections.
///
/// Every section of the problem ends up in exactly one of the two lists.
pub fn decode<R: Rng>(
    problem: &ExamProblem,
    chromosome: &ExamChromosome,
    rng: &mut R,
) -> DecodedSchedule {
    let mut out = DecodedSchedule::default();
    let mut tracker = ResourceTracker::new();
    let mut seen: HashSet<u32> = HashSet::new();
    let mut course_dates: HashMap<&str, BTreeSet<NaiveDate>> = HashMap::new();
    let group_slots = GroupSlots::from_genes(problem, &chromosome.genes);
    let period = problem.config().period_label(problem.dates());

    for gene in &chromosome.genes {
        let Some(section) = problem.section(gene.section_id) else {
            continue;
        };
        if !seen.insert(section.id) {
            continue;
        }

        let window = problem.window(gene.start);
        let (critical, mut warnings): (Vec<Conflict>, Vec<Conflict>) =
            gene_conflicts(problem, &group_slots, &tracker, &course_dates, section, gene, window)
                .into_iter()
                .partition(Conflict::is_critical);
        if !critical.is_empty() {
            debug!(section = section.id, ?critical, "section withheld");
            let attempted = AttemptedAssignment {
                date: gene.date,
                time: gene.start,
                room: gene.room.clone(),
                proctor: gene.proctor,
            };
            out.unscheduled
                .push(UnscheduledSection::from_section(section, &critical, Some(attempted)));
            continue;
        }
        let Some(room) = gene.room.as_deref() else {
            continue;
        };

        course_dates
            .entry(section.course_id.as_str())
            .or_default()
            .insert(gene.date);
        tracker.mark_room(gene.date, room, window, section.id);

        let proctor = match gene.proctor {
            Some(p) if tracker.proctor_free(gene.date, p, window) => Some(p),
            _ => select_proctor(problem, section, gene.date, gene.start, &tracker, rng),
        };
        let proctors = assign_proctors(problem, section, gene, window, proctor, &mut tracker, rng);
        if proctors.first().copied().flatten().is_none() {
            warnings.push(Conflict::NoProctor);
        }

        out.scheduled
            .push(commit(problem, section, gene, room, proctors, &warnings, &period));
    }

    for section in problem.sections() {
        if seen.insert(section.id) {
            let mut reasons = problem.placement_blockers(section);
            if reasons.is_empty() {
                reasons.push(Conflict::NotPlaced);
            }
            out.unscheduled
                .push(UnscheduledSection::from_section(section, &reasons, None));
        }
    }

    out
}

/// Conflicts of a gene against the genes accepted so far. Proctor
/// shortages are found later, while proctors are assigned.
fn gene_conflicts(
    problem: &ExamProblem,
    group_slots: &GroupSlots,
    tracker: &ResourceTracker,
    course_dates: &HashMap<&str, BTreeSet<NaiveDate>>,
    section: &Section,
    gene: &Gene,
    window: TimeWindow,
) -> Vec<Conflict> {
    let slots = problem.slots();
    let mut conflicts = Vec::new();

    match gene.room.as_deref() {
        None => conflicts.push(Conflict::NoRoom),
        Some(room) => {
            if !tracker.room_free(gene.date, room, window) {
                conflicts.push(Conflict::RoomConflict);
            }
            if !problem.room_seats(room, section.total_students) {
                conflicts.push(Conflict::CapacityShortfall);
            }
        }
    }
    if !slots.lists(gene.start, section.is_night_class) {
        conflicts.push(Conflict::InvalidTimeSlot);
    }
    if window.end > slots.cutoff_minute {
        conflicts.push(Conflict::PastCutoff);
    }
    if problem
        .group_key(section.id)
        .and_then(|key| group_slots.get(key))
        .is_some_and(|slot| slot != gene.slot())
    {
        conflicts.push(Conflict::CourseGroupSplit);
    }
    if course_dates
        .get(section.course_id.as_str())
        .is_some_and(|dates| dates.iter().any(|&d| d != gene.date))
    {
        conflicts.push(Conflict::MultipleDates);
    }
    conflicts
}

/// One proctor per class section, booked in the tracker.
///
/// The first slot holds `primary`; the rest come from free available
/// proctors, then from the instructor at the same index.
fn assign_proctors<R: Rng>(
    problem: &ExamProblem,
    section: &Section,
    gene: &Gene,
    window: TimeWindow,
    primary: Option<ProctorId>,
    tracker: &mut ResourceTracker,
    rng: &mut R,
) -> Vec<Option<ProctorId>> {
    let slots = section.sections.len().max(1);
    let mut proctors = Vec::with_capacity(slots);

    if let Some(p) = primary {
        tracker.mark_proctor(gene.date, p, window, section.id);
    }
    proctors.push(primary);

    let mut pool = problem.availability().available(gene.date, gene.start);
    pool.shuffle(rng);
    let mut pool = pool.into_iter();

    let free = |tracker: &ResourceTracker, p: ProctorId| tracker.proctor_free(gene.date, p, window);
    for idx in 1..slots {
        let picked = pool
            .by_ref()
            .find(|&p| free(tracker, p))
            .or_else(|| {
                section
                    .instructors
                    .get(idx)
                    .copied()
                    .filter(|&p| free(tracker, p))
            });
        if let Some(p) = picked {
            tracker.mark_proctor(gene.date, p, window, section.id);
        }
        proctors.push(picked);
    }

    proctors
}

fn commit(
    problem: &ExamProblem,
    section: &Section,
    gene: &Gene,
    room: &str,
    proctors: Vec<Option<ProctorId>>,
    warnings: &[Conflict],
    period: &str,
) -> ScheduledExam {
    let config = problem.config();
    let start = gene.date.and_time(gene.start);
    let end = start + TimeDelta::minutes(i64::from(config.duration_minutes));

    ScheduledExam {
        program_id: section.program_id.clone(),
        course_id: section.course_id.clone(),
        section_id: section.id,
        room_id: room.to_string(),
        sections: section.sections.clone(),
        instructors: section.instructors.clone(),
        proctor_id: proctors.first().copied().flatten(),
        proctors,
        section_name: section.section_name().map(str::to_string),
        instructor_id: section.primary_instructor(),
        exam_date: gene.date,
        exam_start_time: start,
        exam_end_time: end,
        exam_duration: config.duration_label(),
        academic_year: config.academic_year.clone(),
        semester: config.semester.clone(),
        exam_category: config.exam_category.clone(),
        exam_period: period.to_string(),
        college_name: config.college_name.clone(),
        building_name: problem.building_label(room),
        warnings: warnings.iter().map(ToString::to_string).collect(),
    }
}
