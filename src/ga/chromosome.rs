//! Per-section chromosome for exam scheduling.
//!
//! # Encoding
//!
//! One [`Gene`] per placeable section, at the section's fixed gene position
//! (see [`ExamProblem`]). A gene carries the full decision for its section:
//! date, start time, room and proctor. Sections of one course-group must
//! agree on date and start time; [`GroupSlots`] holds that shared decision.
//!
//! Higher fitness is better. Fitness is never stored on the chromosome;
//! the runner keeps it in a parallel vector per generation.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveTime};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::problem::ExamProblem;
use crate::models::{CourseGroupKey, ProctorId, RoomId, SectionId};

/// Shared date and start time of a course-group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Slot {
    /// Exam date.
    pub date: NaiveDate,
    /// Start time.
    pub start: NaiveTime,
}

/// One section's assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gene {
    /// Section the gene places.
    pub section_id: SectionId,
    /// Exam date.
    pub date: NaiveDate,
    /// Start time.
    pub start: NaiveTime,
    /// Assigned room.
    pub room: Option<RoomId>,
    /// Assigned proctor.
    pub proctor: Option<ProctorId>,
}

impl Gene {
    /// Date and start time of the gene.
    #[inline]
    pub fn slot(&self) -> Slot {
        Slot {
            date: self.date,
            start: self.start,
        }
    }

    /// Moves the gene to a slot. Returns whether anything changed.
    pub fn move_to(&mut self, slot: Slot) -> bool {
        if self.slot() == slot {
            return false;
        }
        self.date = slot.date;
        self.start = slot.start;
        true
    }
}

/// Course-group key → shared (date, start time).
#[derive(Debug, Clone, Default)]
pub struct GroupSlots {
    slots: HashMap<CourseGroupKey, Slot>,
}

impl GroupSlots {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Derives each group's slot from the first gene of one of its
    /// sections, in vector order. Genes of unknown or unplaceable sections
    /// are ignored.
    pub fn from_genes(problem: &ExamProblem, genes: &[Gene]) -> Self {
        let mut slots = Self::new();
        for gene in genes {
            if let Some(key) = problem.group_key(gene.section_id) {
                if !slots.slots.contains_key(key) {
                    slots.slots.insert(key.clone(), gene.slot());
                }
            }
        }
        slots
    }

    /// Slot of a group.
    pub fn get(&self, key: &CourseGroupKey) -> Option<Slot> {
        self.slots.get(key).copied()
    }

    /// Sets a group's slot.
    pub fn set(&mut self, key: CourseGroupKey, slot: Slot) {
        self.slots.insert(key, slot);
    }

    /// Moves a group to another date, keeping its start time.
    pub fn set_date(&mut self, key: &CourseGroupKey, date: NaiveDate) {
        if let Some(slot) = self.slots.get_mut(key) {
            slot.date = date;
        }
    }

    /// Moves a group to another start time, keeping its date.
    pub fn set_start(&mut self, key: &CourseGroupKey, start: NaiveTime) {
        if let Some(slot) = self.slots.get_mut(key) {
            slot.start = start;
        }
    }

    /// Number of groups.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether no group has a slot.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Candidate exam schedule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamChromosome {
    /// Genes in gene-position order.
    pub genes: Vec<Gene>,
}

impl ExamChromosome {
    /// Wraps a gene vector.
    pub fn new(genes: Vec<Gene>) -> Self {
        Self { genes }
    }

    /// Number of genes.
    pub fn len(&self) -> usize {
        self.genes.len()
    }

    /// Whether the chromosome has no genes.
    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    /// Gene placing a section.
    pub fn gene_for(&self, section_id: SectionId) -> Option<&Gene> {
        self.genes.iter().find(|g| g.section_id == section_id)
    }

    /// Checks structural validity against the problem: one gene per
    /// position, holding the expected section, an admissible room, and a
    /// candidate start time.
    pub fn is_valid(&self, problem: &ExamProblem) -> bool {
        if self.genes.len() != problem.gene_count() {
            return false;
        }
        self.genes.iter().enumerate().all(|(pos, gene)| {
            let section = problem.section_at(pos);
            gene.section_id == section.id
                && problem.dates().contains(&gene.date)
                && problem
                    .candidate_times(section.is_night_class)
                    .contains(&gene.start)
                && gene
                    .room
                    .as_ref()
                    .is_some_and(|r| section.possible_rooms.contains(r))
        })
    }

    /// Whether every course-group agrees on date and start time.
    pub fn is_group_consistent(&self, problem: &ExamProblem) -> bool {
        let slots = GroupSlots::from_genes(problem, &self.genes);
        self.genes
            .iter()
            .all(|gene| match problem.group_key(gene.section_id) {
                Some(key) => slots.get(key) == Some(gene.slot()),
                None => true,
            })
    }
}

/// Uniform crossover.
///
/// Position by position, a fair coin decides which parent each child
/// inherits the whole gene from. Parents of different length are returned
/// unchanged.
pub fn uniform_crossover<R: Rng>(
    p1: &ExamChromosome,
    p2: &ExamChromosome,
    rng: &mut R,
) -> (ExamChromosome, ExamChromosome) {
    if p1.len() != p2.len() {
        return (p1.clone(), p2.clone());
    }
    let mut c1 = Vec::with_capacity(p1.len());
    let mut c2 = Vec::with_capacity(p2.len());
    for (a, b) in p1.genes.iter().zip(&p2.genes) {
        if rng.random_bool(0.5) {
            c1.push(a.clone());
            c2.push(b.clone());
        } else {
            c1.push(b.clone());
            c2.push(a.clone());
        }
    }
    (ExamChromosome::new(c1), ExamChromosome::new(c2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use crate::config::ExamConfig;
    use crate::ga::ExamCatalog;
    use crate::models::{Room, Section};

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 11, day).unwrap()
    }

    fn t(h: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, 0, 0).unwrap()
    }

    fn gene(id: SectionId, day: u32, hour: u32, room: &str) -> Gene {
        Gene {
            section_id: id,
            date: d(day),
            start: t(hour),
            room: Some(room.into()),
            proctor: Some(100 + id),
        }
    }

    fn sample_problem() -> ExamProblem {
        let catalog = ExamCatalog::new()
            .with_section(Section::new(1, "IT101", "BSIT").with_room("R1"))
            .with_section(Section::new(2, "IT101", "BSIT").with_room("R2"))
            .with_section(Section::new(3, "IT102", "BSIT").with_room("R1"))
            .with_date(d(2))
            .with_date(d(3))
            .with_room(Room::new("R1", 40, "B1"))
            .with_room(Room::new("R2", 40, "B1"));
        ExamProblem::new(catalog, ExamConfig::new(60))
    }

    #[test]
    fn test_crossover_inherits_positions() {
        let p1 = ExamChromosome::new(vec![
            gene(1, 2, 8, "R1"),
            gene(2, 2, 8, "R2"),
            gene(3, 2, 10, "R1"),
        ]);
        let p2 = ExamChromosome::new(vec![
            gene(1, 3, 9, "R1"),
            gene(2, 3, 9, "R2"),
            gene(3, 3, 13, "R1"),
        ]);
        let mut rng = SmallRng::seed_from_u64(42);

        for _ in 0..20 {
            let (c1, c2) = uniform_crossover(&p1, &p2, &mut rng);
            assert_eq!(c1.len(), 3);
            for pos in 0..3 {
                let a = &c1.genes[pos];
                let b = &c2.genes[pos];
                assert!(a == &p1.genes[pos] || a == &p2.genes[pos]);
                // Complementary children.
                if a == &p1.genes[pos] {
                    assert_eq!(b, &p2.genes[pos]);
                } else {
                    assert_eq!(b, &p1.genes[pos]);
                }
            }
        }
    }

    #[test]
    fn test_crossover_length_mismatch() {
        let p1 = ExamChromosome::new(vec![gene(1, 2, 8, "R1")]);
        let p2 = ExamChromosome::default();
        let mut rng = SmallRng::seed_from_u64(42);
        let (c1, c2) = uniform_crossover(&p1, &p2, &mut rng);
        assert_eq!(c1, p1);
        assert_eq!(c2, p2);
    }

    #[test]
    fn test_group_slots_from_first_gene() {
        let problem = sample_problem();
        let genes = vec![gene(1, 2, 8, "R1"), gene(2, 3, 9, "R2"), gene(3, 2, 10, "R1")];
        let slots = GroupSlots::from_genes(&problem, &genes);

        assert_eq!(slots.len(), 2);
        let key = problem.group_of(1).key.clone();
        assert_eq!(slots.get(&key), Some(Slot { date: d(2), start: t(8) }));
    }

    #[test]
    fn test_group_consistency() {
        let problem = sample_problem();
        let split = ExamChromosome::new(vec![
            gene(1, 2, 8, "R1"),
            gene(2, 3, 9, "R2"),
            gene(3, 2, 10, "R1"),
        ]);
        assert!(!split.is_group_consistent(&problem));

        let aligned = ExamChromosome::new(vec![
            gene(1, 2, 8, "R1"),
            gene(2, 2, 8, "R2"),
            gene(3, 2, 10, "R1"),
        ]);
        assert!(aligned.is_group_consistent(&problem));
        assert!(aligned.is_valid(&problem));
    }

    #[test]
    fn test_group_slots_follow_sections_not_positions() {
        let problem = sample_problem();
        // IT102 first, then both IT101 sections.
        let genes = vec![gene(3, 2, 10, "R1"), gene(1, 2, 8, "R1"), gene(2, 2, 8, "R2")];
        let slots = GroupSlots::from_genes(&problem, &genes);

        let it101 = problem.group_key(1).unwrap();
        let it102 = problem.group_key(3).unwrap();
        assert_eq!(slots.get(it101), Some(Slot { date: d(2), start: t(8) }));
        assert_eq!(slots.get(it102), Some(Slot { date: d(2), start: t(10) }));
        assert!(ExamChromosome::new(genes).is_group_consistent(&problem));
    }

    #[test]
    fn test_invalid_chromosome() {
        let problem = sample_problem();
        // R2 is not admissible for section 1.
        let wrong_room = ExamChromosome::new(vec![
            gene(1, 2, 8, "R2"),
            gene(2, 2, 8, "R2"),
            gene(3, 2, 10, "R1"),
        ]);
        assert!(!wrong_room.is_valid(&problem));
        assert!(!ExamChromosome::default().is_valid(&problem));
    }

    #[test]
    fn test_gene_move_to() {
        let mut g = gene(1, 2, 8, "R1");
        assert!(!g.move_to(g.slot()));
        assert!(g.move_to(Slot { date: d(3), start: t(9) }));
        assert_eq!(g.date, d(3));
        assert_eq!(g.start, t(9));
    }
}
