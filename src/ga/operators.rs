//! Genetic operators for exam chromosomes.
//!
//! [`GeneticOperators`] bundles tournament selection, uniform crossover and
//! the group-aware mutation so the runner can drive them from [`GaParams`].
//!
//! # Mutation
//!
//! Each gene is picked with probability `mutation_rate` and rolls one of
//! four mutation kinds:
//!
//! | Kind | Scope | Effect |
//! |------|-------|--------|
//! | 0 | course-group | new random date (only with `date_mutation_rate`) |
//! | 1 | course-group | new random candidate start time |
//! | 2 | gene | new random admissible room |
//! | 3 | gene | proctor re-picked with the construction rule |
//!
//! Group kinds change the shared (date, start) of the gene's course-group.
//! A second pass then aligns every gene with its group's slot, which also
//! repairs groups split by crossover, and re-picks the proctor of every gene
//! that moved.
//!
//! # Usage
//!
//! ```
//! use exam_schedule::config::GaParams;
//! use exam_schedule::ga::operators::GeneticOperators;
//!
//! let ops = GeneticOperators::from_params(&GaParams::default());
//! assert_eq!(ops.tournament_size, 3);
//! ```

use std::collections::HashSet;

use rand::Rng;
use rand::prelude::IndexedRandom;

use super::chromosome::{uniform_crossover, ExamChromosome, GroupSlots};
use super::construct::select_proctor;
use super::problem::ExamProblem;
use crate::config::GaParams;
use crate::models::CourseGroupKey;
use crate::tracker::ResourceTracker;

/// Mutation kind rolled for a picked gene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    /// Move the course-group to another date.
    Date,
    /// Move the course-group to another start time.
    Time,
    /// Reassign the room.
    Room,
    /// Re-pick the proctor.
    Proctor,
}

impl MutationKind {
    fn roll<R: Rng>(rng: &mut R) -> Self {
        match rng.random_range(0..4) {
            0 => Self::Date,
            1 => Self::Time,
            2 => Self::Room,
            _ => Self::Proctor,
        }
    }
}

/// Selection, crossover and mutation settings.
#[derive(Debug, Clone)]
pub struct GeneticOperators {
    /// Per-gene mutation probability.
    pub mutation_rate: f64,
    /// Probability that a date mutation actually moves the date.
    pub date_mutation_rate: f64,
    /// Contestants per tournament.
    pub tournament_size: usize,
}

impl Default for GeneticOperators {
    fn default() -> Self {
        Self::from_params(&GaParams::default())
    }
}

impl GeneticOperators {
    /// Takes the operator settings from run parameters.
    pub fn from_params(params: &GaParams) -> Self {
        Self {
            mutation_rate: params.mutation_rate,
            date_mutation_rate: params.date_mutation_rate,
            tournament_size: params.tournament_size,
        }
    }

    /// Tournament selection.
    ///
    /// Draws `tournament_size` chromosomes at random (with replacement) and
    /// returns the fittest; the earliest draw wins ties.
    pub fn select<'a, R: Rng>(
        &self,
        population: &'a [ExamChromosome],
        fitness: &[i64],
        rng: &mut R,
    ) -> &'a ExamChromosome {
        let n = population.len().min(fitness.len());
        let mut best = rng.random_range(0..n);
        for _ in 1..self.tournament_size {
            let challenger = rng.random_range(0..n);
            if fitness[challenger] > fitness[best] {
                best = challenger;
            }
        }
        &population[best]
    }

    /// Uniform crossover.
    pub fn crossover<R: Rng>(
        &self,
        p1: &ExamChromosome,
        p2: &ExamChromosome,
        rng: &mut R,
    ) -> (ExamChromosome, ExamChromosome) {
        uniform_crossover(p1, p2, rng)
    }

    /// Mutates a chromosome in place and restores course-group consistency.
    ///
    /// Re-picked proctors are checked against every proctor the mutation
    /// keeps, wherever its gene sits in the vector.
    pub fn mutate<R: Rng>(
        &self,
        problem: &ExamProblem,
        chromosome: &mut ExamChromosome,
        rng: &mut R,
    ) {
        let genes = &mut chromosome.genes;
        let mut slots = GroupSlots::from_genes(problem, genes.as_slice());
        let mut touched: HashSet<&CourseGroupKey> = HashSet::new();

        for gene in genes.iter() {
            if !rng.random_bool(self.mutation_rate) {
                continue;
            }
            let Some(key) = problem.group_key(gene.section_id) else {
                continue;
            };
            if touched.contains(key) {
                continue;
            }
            match MutationKind::roll(rng) {
                MutationKind::Date => {
                    if rng.random_bool(self.date_mutation_rate) {
                        if let Some(&date) = problem.dates().choose(rng) {
                            slots.set_date(key, date);
                            touched.insert(key);
                        }
                    }
                }
                MutationKind::Time => {
                    let times = problem.candidate_times(key.is_night_class);
                    if let Some(&start) = times.choose(rng) {
                        slots.set_start(key, start);
                        touched.insert(key);
                    }
                }
                MutationKind::Room | MutationKind::Proctor => {}
            }
        }

        let mut repick = vec![false; genes.len()];
        for (gene, flag) in genes.iter_mut().zip(repick.iter_mut()) {
            let (Some(section), Some(key)) = (
                problem.section(gene.section_id),
                problem.group_key(gene.section_id),
            ) else {
                continue;
            };

            if slots.get(key).is_some_and(|slot| gene.move_to(slot)) {
                *flag = true;
            } else if !touched.contains(key) && rng.random_bool(self.mutation_rate) {
                match MutationKind::roll(rng) {
                    MutationKind::Room => {
                        if let Some(room) = section.possible_rooms.choose(rng) {
                            gene.room = Some(room.clone());
                        }
                    }
                    MutationKind::Proctor => *flag = true,
                    MutationKind::Date | MutationKind::Time => {}
                }
            }
        }

        let mut proctors = ResourceTracker::new();
        for (gene, &flag) in genes.iter().zip(&repick) {
            if flag {
                continue;
            }
            if let Some(p) = gene.proctor {
                proctors.mark_proctor(gene.date, p, problem.window(gene.start), gene.section_id);
            }
        }
        for (gene, &flag) in genes.iter_mut().zip(&repick) {
            let Some(section) = problem.section(gene.section_id).filter(|_| flag) else {
                continue;
            };
            gene.proctor = select_proctor(problem, section, gene.date, gene.start, &proctors, rng);
            if let Some(p) = gene.proctor {
                proctors.mark_proctor(gene.date, p, problem.window(gene.start), section.id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use crate::config::ExamConfig;
    use crate::ga::chromosome::Gene;
    use crate::ga::construct::construct;
    use crate::ga::ExamCatalog;
    use crate::models::{ProctorAvailability, Room, Section};

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 11, day).unwrap()
    }

    fn problem() -> ExamProblem {
        let mut catalog = ExamCatalog::new()
            .with_date(d(2))
            .with_date(d(3))
            .with_date(d(4))
            .with_room(Room::new("R1", 40, "B1"))
            .with_room(Room::new("R2", 40, "B1"))
            .with_room(Room::new("R3", 40, "B1"))
            .with_availability(
                ProctorAvailability::new(7)
                    .on(d(2))
                    .on(d(3))
                    .on(d(4))
                    .at("Morning")
                    .at("Afternoon"),
            )
            .with_availability(
                ProctorAvailability::new(8)
                    .on(d(2))
                    .on(d(3))
                    .on(d(4))
                    .at("Evening"),
            );
        for (id, course, night) in [
            (1, "IT101", false),
            (2, "IT101", false),
            (3, "IT101", true),
            (4, "IT205", false),
            (5, "IT205", false),
            (6, "CS101", true),
        ] {
            let mut s = Section::new(id, course, "BSIT")
                .with_class_section(format!("BSIT {}A", id))
                .with_room("R1")
                .with_room("R2")
                .with_room("R3");
            if night {
                s = s.night_class();
            }
            catalog = catalog.with_section(s);
        }
        ExamProblem::new(catalog, ExamConfig::new(60))
    }

    #[test]
    fn test_default_operators() {
        let ops = GeneticOperators::default();
        assert!((ops.mutation_rate - 0.25).abs() < 1e-10);
        assert!((ops.date_mutation_rate - 0.3).abs() < 1e-10);
        assert_eq!(ops.tournament_size, 3);
    }

    #[test]
    fn test_mutation_keeps_groups_consistent() {
        let p = problem();
        let ops = GeneticOperators {
            mutation_rate: 0.9,
            date_mutation_rate: 1.0,
            tournament_size: 3,
        };
        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..50 {
            let mut ch = construct(&p, &mut rng);
            ops.mutate(&p, &mut ch, &mut rng);
            assert!(ch.is_group_consistent(&p));
            assert!(ch.is_valid(&p));
        }
    }

    #[test]
    fn test_mutation_repairs_crossover_split() {
        let p = problem();
        let ops = GeneticOperators::default();
        let mut rng = SmallRng::seed_from_u64(42);

        for _ in 0..50 {
            let a = construct(&p, &mut rng);
            let b = construct(&p, &mut rng);
            let (mut c1, mut c2) = ops.crossover(&a, &b, &mut rng);
            ops.mutate(&p, &mut c1, &mut rng);
            ops.mutate(&p, &mut c2, &mut rng);
            assert!(c1.is_group_consistent(&p));
            assert!(c2.is_group_consistent(&p));
        }
    }

    #[test]
    fn test_night_genes_stay_in_evening() {
        let p = problem();
        let ops = GeneticOperators {
            mutation_rate: 1.0,
            date_mutation_rate: 1.0,
            tournament_size: 3,
        };
        let evening = NaiveTime::from_hms_opt(18, 0, 0).unwrap();
        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..50 {
            let mut ch = construct(&p, &mut rng);
            ops.mutate(&p, &mut ch, &mut rng);
            for id in [3, 6] {
                assert!(ch.gene_for(id).unwrap().start >= evening);
            }
        }
    }

    #[test]
    fn test_zero_rate_is_identity() {
        let p = problem();
        let ops = GeneticOperators {
            mutation_rate: 0.0,
            date_mutation_rate: 0.0,
            tournament_size: 3,
        };
        let mut rng = SmallRng::seed_from_u64(42);
        let original = construct(&p, &mut rng);
        let mut ch = original.clone();
        ops.mutate(&p, &mut ch, &mut rng);
        assert_eq!(ch, original);
    }

    #[test]
    fn test_moved_gene_gets_new_proctor_check() {
        let p = problem();
        let ops = GeneticOperators {
            mutation_rate: 0.0,
            date_mutation_rate: 0.0,
            tournament_size: 3,
        };
        let start = NaiveTime::from_hms_opt(8, 0, 0).unwrap();
        let later = NaiveTime::from_hms_opt(10, 0, 0).unwrap();
        let gene = |id: u32, t: NaiveTime, proctor: Option<u32>| Gene {
            section_id: id,
            date: d(2),
            start: t,
            room: Some("R1".into()),
            proctor,
        };
        let evening = NaiveTime::from_hms_opt(18, 0, 0).unwrap();
        // Section 2 disagrees with its group; it is moved to 08:00 and its
        // proctor re-picked. Proctor 7 is already busy with section 1.
        let mut ch = ExamChromosome::new(vec![
            gene(1, start, Some(7)),
            gene(2, later, Some(99)),
            gene(4, later, None),
            gene(5, later, None),
            gene(3, evening, Some(8)),
            gene(6, evening, None),
        ]);
        ops.mutate(&p, &mut ch, &mut rng_seeded());
        assert!(ch.is_group_consistent(&p));
        assert_eq!(ch.genes[1].start, start);
        assert_eq!(ch.genes[1].proctor, None);
    }

    #[test]
    fn test_mutation_ignores_gene_order() {
        let p = problem();
        let ops = GeneticOperators {
            mutation_rate: 0.0,
            date_mutation_rate: 0.0,
            tournament_size: 3,
        };
        let mut rng = SmallRng::seed_from_u64(42);
        let mut reversed = construct(&p, &mut rng);
        reversed.genes.reverse();
        let before = reversed.clone();

        ops.mutate(&p, &mut reversed, &mut rng);
        assert_eq!(reversed, before);
        assert!(reversed.is_group_consistent(&p));
    }

    #[test]
    fn test_repicked_proctor_avoids_later_genes() {
        let p = problem();
        let ops = GeneticOperators {
            mutation_rate: 0.0,
            date_mutation_rate: 0.0,
            tournament_size: 3,
        };
        let at = |h: u32| NaiveTime::from_hms_opt(h, 0, 0).unwrap();
        let gene = |id: u32, h: u32, room: &str, proctor: Option<u32>| Gene {
            section_id: id,
            date: d(2),
            start: at(h),
            room: Some(room.into()),
            proctor,
        };
        // Section 2 moves to 08:00, where proctor 7 already watches section 4
        // further down the vector.
        let mut ch = ExamChromosome::new(vec![
            gene(1, 8, "R1", None),
            gene(2, 10, "R2", None),
            gene(4, 8, "R3", Some(7)),
            gene(5, 8, "R2", None),
            gene(3, 18, "R1", Some(8)),
            gene(6, 18, "R2", None),
        ]);
        ops.mutate(&p, &mut ch, &mut rng_seeded());

        assert_eq!(ch.genes[1].start, at(8));
        assert_eq!(ch.genes[1].proctor, None);
        assert_eq!(ch.genes[2].proctor, Some(7));
    }

    #[test]
    fn test_untouched_genes_get_new_room_or_proctor() {
        let p = problem();
        let ops = GeneticOperators {
            mutation_rate: 1.0,
            date_mutation_rate: 0.0,
            tournament_size: 3,
        };
        let mut rng = SmallRng::seed_from_u64(42);
        let mut room_changes = 0;
        let mut proctor_changes = 0;

        for _ in 0..50 {
            let mut ch = construct(&p, &mut rng);
            for g in &mut ch.genes {
                g.proctor = Some(99);
            }
            let before = ch.clone();
            ops.mutate(&p, &mut ch, &mut rng);

            for (old, new) in before.genes.iter().zip(&ch.genes) {
                if old.slot() != new.slot() {
                    continue;
                }
                if old.room != new.room {
                    room_changes += 1;
                }
                if new.proctor != Some(99) {
                    // Re-picked with the construction rule: 7 by day, 8 at night.
                    assert!(matches!(new.proctor, None | Some(7) | Some(8)));
                    proctor_changes += 1;
                }
            }
        }
        assert!(room_changes > 0);
        assert!(proctor_changes > 0);
    }

    fn rng_seeded() -> SmallRng {
        SmallRng::seed_from_u64(42)
    }

    #[test]
    fn test_tournament_prefers_fitter() {
        let ops = GeneticOperators {
            mutation_rate: 0.25,
            date_mutation_rate: 0.3,
            tournament_size: 8,
        };
        let p = problem();
        let mut rng = SmallRng::seed_from_u64(42);
        let population: Vec<ExamChromosome> = (0..4).map(|_| construct(&p, &mut rng)).collect();
        let fitness = vec![-5_000, 3_000, -100_000, 0];

        let mut wins = 0;
        for _ in 0..100 {
            if std::ptr::eq(ops.select(&population, &fitness, &mut rng), &population[1]) {
                wins += 1;
            }
        }
        // Eight draws out of four miss the best with probability (3/4)^8 ≈ 0.1.
        assert!(wins > 70, "best chromosome won {wins} of 100 tournaments");
    }
}
