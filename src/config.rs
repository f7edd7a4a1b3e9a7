//! Run configuration.
//!
//! [`ExamConfig`] carries the exam duration, the preferred start time and
//! the pass-through labels stamped on every committed exam. [`GaParams`]
//! holds the parameters of the evolutionary loop.
//!
//! # Defaults
//!
//! ```
//! use exam_schedule::config::GaParams;
//!
//! let params = GaParams::default();
//! assert_eq!(params.population_size, 50);
//! assert_eq!(params.generations, 100);
//! assert_eq!(params.elite_count, 5);
//! ```

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Exam-level configuration.
///
/// Labels (`academic_year`, `semester`, `exam_category`, `exam_period`,
/// `college_name`) are copied onto the output and never influence
/// conflict checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamConfig {
    /// Exam length in minutes.
    pub duration_minutes: u32,
    /// Start time tried first for every course-group.
    #[serde(default)]
    pub preferred_start_time: Option<NaiveTime>,
    /// Academic year label, e.g. `"2026-2027"`.
    #[serde(default)]
    pub academic_year: String,
    /// Semester label.
    #[serde(default)]
    pub semester: String,
    /// Exam category, e.g. `"Midterm"`.
    #[serde(default)]
    pub exam_category: Option<String>,
    /// Exam period label. Derived from the date range when absent.
    #[serde(default)]
    pub exam_period: Option<String>,
    /// College the schedule is for.
    #[serde(default)]
    pub college_name: String,
}

impl Default for ExamConfig {
    fn default() -> Self {
        Self {
            duration_minutes: 60,
            preferred_start_time: None,
            academic_year: String::new(),
            semester: String::new(),
            exam_category: None,
            exam_period: None,
            college_name: String::new(),
        }
    }
}

impl ExamConfig {
    /// Creates a configuration for exams of the given length.
    pub fn new(duration_minutes: u32) -> Self {
        Self {
            duration_minutes,
            ..Self::default()
        }
    }

    /// Sets the duration from hours and minutes.
    pub fn with_duration(mut self, hours: u32, minutes: u32) -> Self {
        self.duration_minutes = hours * 60 + minutes;
        self
    }

    /// Sets the preferred start time.
    pub fn with_preferred_start(mut self, time: NaiveTime) -> Self {
        self.preferred_start_time = Some(time);
        self
    }

    /// Sets academic year and semester from a combined `"year | semester"` label.
    pub fn with_term(mut self, term: &str) -> Self {
        let mut parts = term.split('|').map(str::trim);
        self.academic_year = parts.next().unwrap_or_default().to_string();
        self.semester = parts.next().unwrap_or_default().to_string();
        self
    }

    /// Sets the exam category.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.exam_category = Some(category.into());
        self
    }

    /// Sets the exam period label.
    pub fn with_period(mut self, period: impl Into<String>) -> Self {
        self.exam_period = Some(period.into());
        self
    }

    /// Sets the college name.
    pub fn with_college(mut self, name: impl Into<String>) -> Self {
        self.college_name = name.into();
        self
    }

    /// Duration formatted as `HH:MM:SS`.
    pub fn duration_label(&self) -> String {
        format!(
            "{:02}:{:02}:00",
            self.duration_minutes / 60,
            self.duration_minutes % 60
        )
    }

    /// Exam period label: the configured one, or one derived from the
    /// first and last usable dates (`"November 2, 2026 - November 6, 2026"`).
    pub fn period_label(&self, sorted_dates: &[NaiveDate]) -> String {
        if let Some(period) = &self.exam_period {
            return period.clone();
        }
        let fmt = |d: &NaiveDate| d.format("%B %-d, %Y").to_string();
        match (sorted_dates.first(), sorted_dates.last()) {
            (Some(first), Some(last)) if first != last => format!("{} - {}", fmt(first), fmt(last)),
            (Some(only), _) => fmt(only),
            _ => String::new(),
        }
    }

    /// Validates the configuration against a day cutoff.
    pub fn validate(&self, cutoff_minute: u32) -> Result<()> {
        if self.duration_minutes == 0 {
            return Err(EngineError::InvalidConfig(
                "duration must be at least one minute".into(),
            ));
        }
        if self.duration_minutes > cutoff_minute {
            return Err(EngineError::InvalidConfig(format!(
                "duration of {} minutes cannot end before the cutoff",
                self.duration_minutes
            )));
        }
        Ok(())
    }
}

/// Parameters of the genetic search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaParams {
    /// Number of chromosomes per generation.
    pub population_size: usize,
    /// Fixed number of generations; there is no early exit.
    pub generations: usize,
    /// Per-gene mutation probability (0.0–1.0).
    pub mutation_rate: f64,
    /// Chromosomes copied unchanged into the next generation.
    pub elite_count: usize,
    /// Contestants per tournament.
    pub tournament_size: usize,
    /// Probability that a date-type group mutation actually moves the date.
    pub date_mutation_rate: f64,
    /// Generations between progress reports (and cancellation checks).
    pub yield_every: usize,
    /// Evaluate fitness on the rayon pool.
    pub parallel: bool,
    /// Seed for reproducible runs. `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for GaParams {
    fn default() -> Self {
        Self {
            population_size: 50,
            generations: 100,
            mutation_rate: 0.25,
            elite_count: 5,
            tournament_size: 3,
            date_mutation_rate: 0.3,
            yield_every: 10,
            parallel: false,
            seed: None,
        }
    }
}

impl GaParams {
    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the generation count.
    pub fn with_generations(mut self, n: usize) -> Self {
        self.generations = n;
        self
    }

    /// Sets the mutation rate.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the elite count.
    pub fn with_elite_count(mut self, n: usize) -> Self {
        self.elite_count = n;
        self
    }

    /// Sets the tournament size.
    pub fn with_tournament_size(mut self, n: usize) -> Self {
        self.tournament_size = n;
        self
    }

    /// Sets the progress interval.
    pub fn with_yield_every(mut self, n: usize) -> Self {
        self.yield_every = n;
        self
    }

    /// Enables or disables parallel evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the parameters.
    pub fn validate(&self) -> Result<()> {
        if self.population_size < 2 {
            return Err(EngineError::InvalidParameters(
                "population_size must be at least 2".into(),
            ));
        }
        if self.elite_count >= self.population_size {
            return Err(EngineError::InvalidParameters(
                "elite_count must be smaller than population_size".into(),
            ));
        }
        if self.tournament_size == 0 {
            return Err(EngineError::InvalidParameters(
                "tournament_size must be at least 1".into(),
            ));
        }
        if self.yield_every == 0 {
            return Err(EngineError::InvalidParameters(
                "yield_every must be at least 1".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.mutation_rate)
            || !(0.0..=1.0).contains(&self.date_mutation_rate)
        {
            return Err(EngineError::InvalidParameters(
                "rates must lie in [0, 1]".into(),
            ));
        }
        Ok(())
    }
}
