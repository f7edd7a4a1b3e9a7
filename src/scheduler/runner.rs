//! Generational GA runner.
//!
//! [`ExamScheduler`] drives one run end to end:
//!
//! 1. pre-flight checks (fatal errors stop the run);
//! 2. an initial population of constructed chromosomes;
//! 3. a fixed number of generations of elitism, tournament selection,
//!    uniform crossover and mutation, tracking the best chromosome ever seen;
//! 4. decoding the best chromosome into the committed schedule.
//!
//! Every `yield_every` generations the runner reports progress to the
//! caller's callback, which may stop the run by returning
//! [`ControlFlow::Break`]. A cancelled run still decodes its best-so-far.
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use exam_schedule::config::{ExamConfig, GaParams};
//! use exam_schedule::ga::{ExamCatalog, ExamProblem};
//! use exam_schedule::models::{ProctorAvailability, Room, Section};
//! use exam_schedule::scheduler::ExamScheduler;
//!
//! let date = NaiveDate::from_ymd_opt(2026, 11, 2).unwrap();
//! let catalog = ExamCatalog::new()
//!     .with_section(Section::new(1, "IT101", "BSIT").with_students(30).with_room("R1"))
//!     .with_date(date)
//!     .with_room(Room::new("R1", 40, "B1"))
//!     .with_availability(ProctorAvailability::new(7).on(date).at("Morning"));
//! let problem = ExamProblem::new(catalog, ExamConfig::new(60));
//!
//! let params = GaParams::default().with_population_size(10).with_generations(5).with_seed(42);
//! let outcome = ExamScheduler::new(params).run(&problem).unwrap();
//! assert_eq!(outcome.scheduled.len(), 1);
//! ```

use std::ops::ControlFlow;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::kpi::ScheduleSummary;
use super::sink::ScheduleSink;
use crate::config::GaParams;
use crate::error::Result;
use crate::ga::operators::GeneticOperators;
use crate::ga::{construct, decode, evaluate, ExamChromosome, ExamProblem};
use crate::models::{ScheduledExam, UnscheduledSection};
use crate::validation::{preflight, PreflightIssue};

/// Progress of a running search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressReport {
    /// Generations completed so far.
    pub generation: usize,
    /// Completion percentage, 0–100, non-decreasing within a run.
    pub percent: u8,
    /// Best fitness seen so far, if any generation has been evaluated.
    pub best_fitness: Option<i64>,
}

/// Result of a run.
#[derive(Debug, Clone, Default)]
pub struct ScheduleOutcome {
    /// Committed exams.
    pub scheduled: Vec<ScheduledExam>,
    /// Sections left for manual scheduling.
    pub unscheduled: Vec<UnscheduledSection>,
    /// Non-fatal issues found before the search.
    pub preflight: Vec<PreflightIssue>,
    /// Fitness of the decoded chromosome.
    pub best_fitness: i64,
    /// Generations actually run.
    pub generations_run: usize,
    /// Whether the caller stopped the run early.
    pub cancelled: bool,
}

impl ScheduleOutcome {
    /// Hands the committed exams to a sink in one batch.
    ///
    /// Nothing is written when no exam was committed.
    ///
    /// # Returns
    /// The number of exams persisted.
    pub fn commit<S: ScheduleSink>(&self, sink: &mut S) -> std::result::Result<usize, S::Error> {
        if self.scheduled.is_empty() {
            return Ok(0);
        }
        sink.persist(&self.scheduled)?;
        Ok(self.scheduled.len())
    }

    /// Summary figures of the outcome.
    pub fn summary(&self) -> ScheduleSummary {
        ScheduleSummary::calculate(self)
    }
}

/// Best chromosome of a search.
struct SearchResult {
    best: ExamChromosome,
    best_fitness: i64,
    generations_run: usize,
    cancelled: bool,
}

/// GA-based exam scheduler.
#[derive(Debug, Clone, Default)]
pub struct ExamScheduler {
    params: GaParams,
}

impl ExamScheduler {
    /// Creates a scheduler with the given parameters.
    pub fn new(params: GaParams) -> Self {
        Self { params }
    }

    /// Run parameters.
    pub fn params(&self) -> &GaParams {
        &self.params
    }

    /// Runs to completion without progress reporting.
    pub fn run(&self, problem: &ExamProblem) -> Result<ScheduleOutcome> {
        self.run_with_progress(problem, |_| ControlFlow::Continue(()))
    }

    /// Runs, reporting progress every `yield_every` generations.
    ///
    /// Returning [`ControlFlow::Break`] from `on_progress` stops the search;
    /// the best chromosome seen so far is still decoded. A completed run
    /// ends with a 100% report; a `Break` returned from that final report
    /// is ignored, since the search is already over.
    pub fn run_with_progress<F>(
        &self,
        problem: &ExamProblem,
        mut on_progress: F,
    ) -> Result<ScheduleOutcome>
    where
        F: FnMut(&ProgressReport) -> ControlFlow<()>,
    {
        self.params.validate()?;
        let issues = preflight(problem)?;

        let mut rng = match self.params.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };

        info!(
            sections = problem.sections().len(),
            genes = problem.gene_count(),
            dates = problem.dates().len(),
            population = self.params.population_size,
            generations = self.params.generations,
            "starting exam search"
        );

        let search = self.search(problem, &mut rng, &mut on_progress);
        if !search.cancelled {
            let _ = on_progress(&ProgressReport {
                generation: search.generations_run,
                percent: 100,
                best_fitness: Some(search.best_fitness),
            });
        }

        let decoded = decode(problem, &search.best, &mut rng);
        info!(
            scheduled = decoded.scheduled.len(),
            unscheduled = decoded.unscheduled.len(),
            best_fitness = search.best_fitness,
            cancelled = search.cancelled,
            "exam search finished"
        );

        Ok(ScheduleOutcome {
            scheduled: decoded.scheduled,
            unscheduled: decoded.unscheduled,
            preflight: issues,
            best_fitness: search.best_fitness,
            generations_run: search.generations_run,
            cancelled: search.cancelled,
        })
    }

    fn search<F>(
        &self,
        problem: &ExamProblem,
        rng: &mut SmallRng,
        on_progress: &mut F,
    ) -> SearchResult
    where
        F: FnMut(&ProgressReport) -> ControlFlow<()>,
    {
        let params = &self.params;
        let ops = GeneticOperators::from_params(params);

        let mut current: Vec<ExamChromosome> = (0..params.population_size)
            .map(|_| construct(problem, rng))
            .collect();
        let mut next: Vec<ExamChromosome> = Vec::with_capacity(params.population_size);
        let mut best: Option<(ExamChromosome, i64)> = None;
        let mut generations_run = 0;
        let mut cancelled = false;

        for generation in 0..params.generations {
            if generation % params.yield_every == 0 {
                let report = ProgressReport {
                    generation,
                    percent: percent_of(generation, params.generations),
                    best_fitness: best.as_ref().map(|(_, f)| *f),
                };
                debug!(generation, best_fitness = ?report.best_fitness, "progress");
                if on_progress(&report).is_break() {
                    info!(generation, "search cancelled");
                    cancelled = true;
                    break;
                }
            }

            let fitness = self.evaluate_all(problem, &current);
            keep_best(&mut best, &current, &fitness);

            self.breed(problem, &ops, &current, &fitness, &mut next, rng);
            std::mem::swap(&mut current, &mut next);
            generations_run = generation + 1;
        }

        // With zero generations, or a cancel before the first evaluation,
        // the initial population is the only candidate.
        if best.is_none() {
            let fitness = self.evaluate_all(problem, &current);
            keep_best(&mut best, &current, &fitness);
        }
        let (best, best_fitness) = best.unwrap_or_default();

        SearchResult {
            best,
            best_fitness,
            generations_run,
            cancelled,
        }
    }

    /// Fills `next` with the elites of `current`, unchanged and fittest
    /// first, then with mutated offspring of tournament winners.
    fn breed<R: Rng>(
        &self,
        problem: &ExamProblem,
        ops: &GeneticOperators,
        current: &[ExamChromosome],
        fitness: &[i64],
        next: &mut Vec<ExamChromosome>,
        rng: &mut R,
    ) {
        let size = self.params.population_size;
        let mut ranked: Vec<usize> = (0..current.len()).collect();
        ranked.sort_by(|&a, &b| fitness[b].cmp(&fitness[a]));

        next.clear();
        next.extend(
            ranked
                .iter()
                .take(self.params.elite_count)
                .map(|&i| current[i].clone()),
        );
        while next.len() < size {
            let p1 = ops.select(current, fitness, rng);
            let p2 = ops.select(current, fitness, rng);
            let (mut c1, mut c2) = ops.crossover(p1, p2, rng);
            ops.mutate(problem, &mut c1, rng);
            next.push(c1);
            if next.len() < size {
                ops.mutate(problem, &mut c2, rng);
                next.push(c2);
            }
        }
    }

    fn evaluate_all(&self, problem: &ExamProblem, population: &[ExamChromosome]) -> Vec<i64> {
        if self.params.parallel {
            population.par_iter().map(|c| evaluate(problem, c)).collect()
        } else {
            population.iter().map(|c| evaluate(problem, c)).collect()
        }
    }
}

/// Replaces `best` only with a strictly fitter chromosome; the earliest
/// index wins ties within a generation.
fn keep_best(
    best: &mut Option<(ExamChromosome, i64)>,
    population: &[ExamChromosome],
    fitness: &[i64],
) {
    let mut top: Option<(usize, i64)> = None;
    for (i, &f) in fitness.iter().enumerate() {
        match top {
            Some((_, t)) if f <= t => {}
            _ => top = Some((i, f)),
        }
    }
    let Some((idx, f)) = top else {
        return;
    };
    let improved = match best {
        Some((_, current)) => f > *current,
        None => true,
    };
    if improved {
        *best = Some((population[idx].clone(), f));
    }
}

fn percent_of(generation: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    ((generation as f64 / total as f64) * 100.0).round().min(100.0) as u8
}
