//! Random chromosome construction.
//!
//! Builds one feasible-leaning chromosome per call:
//!
//! 1. One random usable date per course id, shared by its day and night
//!    groups.
//! 2. Per course-group, the first start time (preferred first, the rest
//!    shuffled) at which every member can hold some free admissible room.
//! 3. Sections visited by (day/night, date, time); each takes a free room
//!    that seats its headcount, else any free admissible room, else the
//!    first admissible room.
//! 4. A proctor per section via [`select_proctor`].
//!
//! Construction never fails. When no start time fits a group, the
//! preferred start is kept and the fitness function pays for it.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveTime};
use rand::Rng;
use rand::prelude::{IndexedRandom, SliceRandom};
use tracing::trace;

use super::chromosome::{ExamChromosome, Gene, GroupSlots, Slot};
use super::problem::ExamProblem;
use crate::models::{ProctorId, RoomId, Section, TimeWindow};
use crate::tracker::ResourceTracker;

/// Picks a proctor for a section at (date, start).
///
/// Priority:
/// 1. a night class's own instructor, when available and free;
/// 2. a random available, free proctor;
/// 3. the section's instructor, when free;
/// 4. any free instructor of the section;
///
/// otherwise `None`.
pub fn select_proctor<R: Rng>(
    problem: &ExamProblem,
    section: &Section,
    date: NaiveDate,
    start: NaiveTime,
    tracker: &ResourceTracker,
    rng: &mut R,
) -> Option<ProctorId> {
    let window = problem.window(start);
    let free = |p: ProctorId| tracker.proctor_free(date, p, window);
    let mut available = problem.availability().available(date, start);

    if section.is_night_class {
        if let Some(own) = section.instructor_id {
            if available.contains(&own) && free(own) {
                return Some(own);
            }
        }
    }

    available.shuffle(rng);
    if let Some(p) = available.into_iter().find(|&p| free(p)) {
        return Some(p);
    }

    if let Some(own) = section.instructor_id {
        if free(own) {
            return Some(own);
        }
    }

    section.instructors.iter().copied().find(|&p| free(p))
}

/// Builds a random chromosome for the problem.
pub fn construct<R: Rng>(problem: &ExamProblem, rng: &mut R) -> ExamChromosome {
    if problem.gene_count() == 0 || problem.dates().is_empty() {
        return ExamChromosome::default();
    }

    let slots = choose_group_slots(problem, rng);

    let mut order: Vec<(usize, Slot)> = (0..problem.gene_count())
        .filter_map(|pos| slots.get(&problem.group_of(pos).key).map(|s| (pos, s)))
        .collect();
    order.sort_by_key(|&(pos, slot)| {
        (
            problem.section_at(pos).is_night_class,
            slot.date,
            slot.start,
            pos,
        )
    });

    let mut tracker = ResourceTracker::new();
    let mut genes: Vec<Option<Gene>> = vec![None; problem.gene_count()];
    for (pos, slot) in order {
        let section = problem.section_at(pos);
        let window = problem.window(slot.start);

        let room = pick_room(problem, section, slot.date, window, &tracker, rng);
        if let Some(room) = &room {
            tracker.mark_room(slot.date, room, window, section.id);
        }

        let proctor = select_proctor(problem, section, slot.date, slot.start, &tracker, rng);
        match proctor {
            Some(p) => tracker.mark_proctor(slot.date, p, window, section.id),
            None => trace!(section = section.id, "no proctor during construction"),
        }

        genes[pos] = Some(Gene {
            section_id: section.id,
            date: slot.date,
            start: slot.start,
            room,
            proctor,
        });
    }

    ExamChromosome::new(genes.into_iter().flatten().collect())
}

/// Fixes the shared (date, start) of every course-group.
///
/// Feasibility is probed against a scratch tracker that holds one room per
/// member of each group already accepted.
fn choose_group_slots<R: Rng>(problem: &ExamProblem, rng: &mut R) -> GroupSlots {
    let mut course_dates: HashMap<&str, NaiveDate> = HashMap::new();
    let mut probe = ResourceTracker::new();
    let mut slots = GroupSlots::new();

    for group in problem.groups() {
        let date = match course_dates.get(group.key.course_id.as_str()) {
            Some(&date) => date,
            None => match problem.dates().choose(rng) {
                Some(&date) => {
                    course_dates.insert(group.key.course_id.as_str(), date);
                    date
                }
                None => continue,
            },
        };

        let mut times = problem.preferred_first(group.key.is_night_class);
        let Some(&preferred) = times.first() else {
            continue;
        };
        times[1..].shuffle(rng);

        let members: Vec<&Section> = group
            .members
            .iter()
            .map(|&pos| problem.section_at(pos))
            .collect();

        let mut accepted = None;
        for &start in &times {
            let window = problem.window(start);
            let holds: Option<Vec<&RoomId>> = members
                .iter()
                .map(|s| {
                    s.possible_rooms
                        .iter()
                        .find(|r| probe.room_free(date, r, window))
                })
                .collect();
            if let Some(holds) = holds {
                for (section, room) in members.iter().zip(holds) {
                    probe.mark_room(date, room, window, section.id);
                }
                accepted = Some(start);
                break;
            }
        }

        let start = accepted.unwrap_or_else(|| {
            trace!(course = %group.key.course_id, "no start time fits the whole group");
            preferred
        });
        slots.set(group.key.clone(), Slot { date, start });
    }

    slots
}

/// Room for a section: a free room that seats everyone, else any free
/// admissible room, else the first admissible room.
fn pick_room<R: Rng>(
    problem: &ExamProblem,
    section: &Section,
    date: NaiveDate,
    window: TimeWindow,
    tracker: &ResourceTracker,
    rng: &mut R,
) -> Option<RoomId> {
    let mut rooms: Vec<&RoomId> = section.possible_rooms.iter().collect();
    rooms.shuffle(rng);

    let free: Vec<&RoomId> = rooms
        .into_iter()
        .filter(|r| tracker.room_free(date, r, window))
        .collect();

    free.iter()
        .find(|r| problem.room_seats(r, section.total_students))
        .or_else(|| free.first())
        .map(|r| (**r).clone())
        .or_else(|| {
            trace!(section = section.id, "every admissible room is busy");
            section.possible_rooms.first().cloned()
        })
}
