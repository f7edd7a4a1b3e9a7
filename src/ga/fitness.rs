//! Chromosome fitness.
//!
//! Fitness is an integer, higher is better. Every hard or soft violation
//! subtracts a fixed penalty; every gene with both a room and a proctor
//! earns a small reward. Evaluation is pure: it builds its own trackers and
//! never touches the chromosome.
//!
//! | Condition | Effect |
//! |-----------|--------|
//! | Section appears more than once | −10 000 per extra |
//! | Course id on more than one date | −25 000 per gene after the first date split |
//! | Course-group split across start times on one date | −15 000 |
//! | Start time invalid for the section | −50 000 |
//! | Exam ends after the cutoff | −50 000 |
//! | Cohort sits two courses in one 30-minute slot | −5 000 per slot |
//! | Year levels of one college mixed at one start | −8 000 |
//! | No room | −8 000 |
//! | Room overlap | −20 000 per overlapping booking |
//! | Proctor overlap | −30 000 per overlapping booking |
//! | Room and proctor both assigned | +1 000 |

use std::collections::{BTreeSet, HashMap, HashSet};

use chrono::{NaiveDate, NaiveTime};

use super::chromosome::ExamChromosome;
use super::problem::ExamProblem;
use crate::models::CourseGroupKey;
use crate::tracker::ResourceTracker;

/// Penalty per duplicated section.
pub const DUPLICATE_SECTION: i64 = 10_000;
/// Penalty per gene of a course spread over several dates.
pub const MULTIPLE_DATES: i64 = 25_000;
/// Penalty per gene whose course-group already started at another time that date.
pub const SPLIT_START: i64 = 15_000;
/// Penalty for a start time outside the section's catalog.
pub const INVALID_TIME: i64 = 50_000;
/// Penalty for ending after the cutoff.
pub const PAST_CUTOFF: i64 = 50_000;
/// Penalty per 30-minute slot in which a cohort sits a second course.
pub const COHORT_CLASH: i64 = 5_000;
/// Penalty for mixing year levels of one college at one start.
pub const YEAR_LEVEL_MIX: i64 = 8_000;
/// Penalty for a gene without a room.
pub const NO_ROOM: i64 = 8_000;
/// Penalty per overlapping room booking.
pub const ROOM_OVERLAP: i64 = 20_000;
/// Penalty per overlapping proctor booking.
pub const PROCTOR_OVERLAP: i64 = 30_000;
/// Reward for a gene with both room and proctor.
pub const FULLY_ASSIGNED: i64 = 1_000;

/// Scores a chromosome.
pub fn evaluate(problem: &ExamProblem, chromosome: &ExamChromosome) -> i64 {
    let slots = problem.slots();

    let mut fitness = 0i64;
    let mut tracker = ResourceTracker::new();
    let mut seen: HashMap<u32, u32> = HashMap::new();
    let mut course_dates: HashMap<&str, HashSet<NaiveDate>> = HashMap::new();
    let mut group_starts: HashMap<(CourseGroupKey, NaiveDate), NaiveTime> = HashMap::new();
    let mut cohorts: HashMap<(NaiveDate, u32, Option<char>, &str), HashSet<&str>> = HashMap::new();
    let mut year_levels: HashMap<(NaiveDate, NaiveTime, &str), BTreeSet<Option<char>>> =
        HashMap::new();

    for gene in &chromosome.genes {
        let Some(section) = problem.section(gene.section_id) else {
            continue;
        };

        let count = seen.entry(gene.section_id).or_insert(0);
        *count += 1;
        if *count > 1 {
            fitness -= DUPLICATE_SECTION;
        }

        let dates = course_dates.entry(section.course_id.as_str()).or_default();
        dates.insert(gene.date);
        if dates.len() > 1 {
            fitness -= MULTIPLE_DATES;
        }

        let first_start = *group_starts
            .entry((section.group_key(), gene.date))
            .or_insert(gene.start);
        if first_start != gene.start {
            fitness -= SPLIT_START;
        }

        let window = problem.window(gene.start);
        if !slots.lists(gene.start, section.is_night_class) {
            fitness -= INVALID_TIME;
        }
        if window.end > slots.cutoff_minute {
            fitness -= PAST_CUTOFF;
        }

        let year = section.year_level();
        for minute in window.sub_slots() {
            let courses = cohorts
                .entry((gene.date, minute, year, section.program_id.as_str()))
                .or_default();
            if courses.insert(section.course_id.as_str()) && courses.len() > 1 {
                fitness -= COHORT_CLASH;
            }
        }

        let levels = year_levels
            .entry((gene.date, gene.start, problem.college_of(&section.program_id)))
            .or_default();
        levels.insert(year);
        if levels.len() > 1 {
            fitness -= YEAR_LEVEL_MIX;
        }

        match &gene.room {
            Some(room) => {
                let overlaps = tracker.rooms.overlap_count(gene.date, room.as_str(), window);
                fitness -= ROOM_OVERLAP * overlaps as i64;
                tracker.mark_room(gene.date, room, window, section.id);
            }
            None => fitness -= NO_ROOM,
        }

        if let Some(proctor) = gene.proctor {
            let overlaps = tracker.proctors.overlap_count(gene.date, &proctor, window);
            fitness -= PROCTOR_OVERLAP * overlaps as i64;
            tracker.mark_proctor(gene.date, proctor, window, section.id);
        }

        if gene.room.is_some() && gene.proctor.is_some() {
            fitness += FULLY_ASSIGNED;
        }
    }

    fitness
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExamConfig;
    use crate::ga::chromosome::Gene;
    use crate::ga::ExamCatalog;
    use crate::models::{Room, Section};

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 11, day).unwrap()
    }

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn gene(id: u32, day: u32, start: NaiveTime, room: Option<&str>, proctor: Option<u32>) -> Gene {
        Gene {
            section_id: id,
            date: d(day),
            start,
            room: room.map(Into::into),
            proctor,
        }
    }

    fn problem() -> ExamProblem {
        let catalog = ExamCatalog::new()
            .with_section(
                Section::new(1, "IT101", "BSIT")
                    .with_class_section("BSIT 1A")
                    .with_room("R1"),
            )
            .with_section(
                Section::new(2, "IT101", "BSIT")
                    .with_class_section("BSIT 1B")
                    .with_room("R2"),
            )
            .with_section(
                Section::new(3, "IT205", "BSIT")
                    .with_class_section("BSIT 2A")
                    .with_room("R1"),
            )
            .with_section(
                Section::new(4, "CS101", "BSCS")
                    .with_class_section("BSCS 1A")
                    .with_room("R3"),
            )
            .with_section(
                Section::new(6, "IT110", "BSIT")
                    .with_class_section("BSIT 1C")
                    .with_room("R2"),
            )
            .with_section(
                Section::new(5, "IT101", "BSIT")
                    .with_class_section("BSIT 1N")
                    .night_class()
                    .with_room("R3"),
            )
            .with_date(d(2))
            .with_date(d(3))
            .with_room(Room::new("R1", 40, "B1"))
            .with_room(Room::new("R2", 40, "B1"))
            .with_room(Room::new("R3", 40, "B1"))
            .with_program_college("BSIT", "CCS")
            .with_program_college("BSCS", "CCS");
        ExamProblem::new(catalog, ExamConfig::new(60))
    }

    #[test]
    fn test_clean_schedule_earns_rewards() {
        let p = problem();
        let ch = ExamChromosome::new(vec![
            gene(1, 2, t(8, 0), Some("R1"), Some(10)),
            gene(2, 2, t(8, 0), Some("R2"), Some(11)),
            gene(3, 3, t(8, 0), Some("R1"), Some(10)),
        ]);
        assert_eq!(evaluate(&p, &ch), 3 * FULLY_ASSIGNED);
    }

    #[test]
    fn test_room_overlap() {
        let p = problem();
        let ch = ExamChromosome::new(vec![
            gene(1, 2, t(8, 0), Some("R1"), Some(10)),
            gene(3, 2, t(8, 30), Some("R1"), Some(11)),
        ]);
        // Same date, different courses, overlapping windows in R1. Year
        // levels 1 and 2 do not share a start, so no year-level penalty.
        assert_eq!(evaluate(&p, &ch), 2 * FULLY_ASSIGNED - ROOM_OVERLAP);
    }

    #[test]
    fn test_proctor_overlap_and_missing_room() {
        let p = problem();
        let ch = ExamChromosome::new(vec![
            gene(1, 2, t(8, 0), Some("R1"), Some(10)),
            gene(2, 2, t(8, 0), None, Some(10)),
        ]);
        assert_eq!(
            evaluate(&p, &ch),
            FULLY_ASSIGNED - NO_ROOM - PROCTOR_OVERLAP
        );
    }

    #[test]
    fn test_split_course_penalties() {
        let p = problem();
        // Same course-group, same date, different start.
        let split_start = ExamChromosome::new(vec![
            gene(1, 2, t(8, 0), Some("R1"), None),
            gene(2, 2, t(10, 0), Some("R2"), None),
        ]);
        assert_eq!(evaluate(&p, &split_start), -SPLIT_START);

        // Same course, different dates.
        let split_date = ExamChromosome::new(vec![
            gene(1, 2, t(8, 0), Some("R1"), None),
            gene(2, 3, t(8, 0), Some("R2"), None),
        ]);
        assert_eq!(evaluate(&p, &split_date), -MULTIPLE_DATES);
    }

    #[test]
    fn test_day_and_night_groups_do_not_split() {
        let p = problem();
        let ch = ExamChromosome::new(vec![
            gene(1, 2, t(8, 0), Some("R1"), None),
            gene(5, 2, t(18, 0), Some("R3"), None),
        ]);
        assert_eq!(evaluate(&p, &ch), 0);
    }

    #[test]
    fn test_invalid_time_and_cutoff() {
        let p = problem();
        // Night class at a day time.
        let wrong_list = ExamChromosome::new(vec![gene(5, 2, t(9, 0), Some("R3"), None)]);
        assert_eq!(evaluate(&p, &wrong_list), -INVALID_TIME);

        // 20:30 + 60 minutes runs past 21:00.
        let late = ExamChromosome::new(vec![gene(5, 2, t(20, 30), Some("R3"), None)]);
        assert_eq!(evaluate(&p, &late), -PAST_CUTOFF);
    }

    #[test]
    fn test_cohort_and_year_level() {
        let p = problem();
        // BSIT year 1 sits IT101 and IT110 at once: two 30-minute slots clash.
        let cohort = ExamChromosome::new(vec![
            gene(1, 2, t(8, 0), Some("R1"), None),
            gene(6, 2, t(8, 0), Some("R2"), None),
        ]);
        assert_eq!(evaluate(&p, &cohort), -2 * COHORT_CLASH);

        // Sections of one course sitting together are not a clash.
        let together = ExamChromosome::new(vec![
            gene(1, 2, t(8, 0), Some("R1"), None),
            gene(2, 2, t(8, 0), Some("R2"), None),
        ]);
        assert_eq!(evaluate(&p, &together), 0);

        // BSIT year 2 and BSCS year 1 share a college and a start.
        let mixed = ExamChromosome::new(vec![
            gene(3, 2, t(8, 0), Some("R1"), None),
            gene(4, 2, t(8, 0), Some("R3"), None),
        ]);
        assert_eq!(evaluate(&p, &mixed), -YEAR_LEVEL_MIX);
    }

    #[test]
    fn test_duplicate_section() {
        let p = problem();
        let ch = ExamChromosome::new(vec![
            gene(3, 2, t(8, 0), Some("R1"), None),
            gene(3, 2, t(13, 0), Some("R2"), None),
        ]);
        assert_eq!(evaluate(&p, &ch), -DUPLICATE_SECTION - SPLIT_START);
    }

    #[test]
    fn test_evaluate_is_pure() {
        let p = problem();
        let ch = ExamChromosome::new(vec![
            gene(1, 2, t(8, 0), Some("R1"), Some(10)),
            gene(3, 2, t(8, 30), Some("R1"), Some(10)),
        ]);
        let before = ch.clone();
        assert_eq!(evaluate(&p, &ch), evaluate(&p, &ch));
        assert_eq!(ch, before);
    }
}
