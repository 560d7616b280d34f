//! GA run driver.
//!
//! [`EvoRunner`] repeats [`PopulationManager::step`] until the configured
//! [`StopCondition`] holds or a cancellation flag is raised, keeping the best
//! genome seen over the whole run and a per-generation statistics history.

use log::info;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::config::{EvoConfig, StopCondition};
use super::population::PopulationManager;
use super::stats::PopulationStats;
use super::types::Genome;
use crate::error::ConfigError;
use crate::problem::Problem;

/// Objective statistics of one generation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GenerationStats {
    /// Generation index (0 = initial population).
    pub generation: usize,
    /// Best makespan in the population.
    pub min_objective: u32,
    /// Worst makespan in the population.
    pub max_objective: u32,
    /// Mean makespan.
    pub average: f64,
    /// Standard deviation of the makespan.
    pub std_deviation: f64,
}

impl GenerationStats {
    fn capture(generation: usize, stats: &PopulationStats) -> Self {
        Self {
            generation,
            min_objective: stats.min_objective,
            max_objective: stats.max_objective,
            average: stats.average,
            std_deviation: stats.std_deviation,
        }
    }
}

/// Result of a GA run.
#[derive(Debug, Clone)]
pub struct EvoResult {
    /// The best genome found during the entire run.
    pub best: Genome,

    /// Makespan of `best`.
    pub best_objective: u32,

    /// Best genome of the initial population.
    pub initial_best: Genome,

    /// Number of generations executed.
    pub generations: usize,

    /// Whether the run stopped because the best objective stopped improving.
    pub stagnated: bool,

    /// Whether the run was cancelled externally.
    pub cancelled: bool,

    /// Statistics per generation; index 0 is the initial population.
    pub history: Vec<GenerationStats>,
}

/// Executes the GA loop.
///
/// # Examples
///
/// ```
/// use u_fjsp::ga::{EvoConfig, EvoRunner};
/// use u_fjsp::problem::{Job, Problem};
///
/// let problem = Problem::new(
///     2,
///     vec![
///         Job::from_costs(vec![vec![3, 5], vec![2, 4]]),
///         Job::from_costs(vec![vec![4, 2], vec![3, 3]]),
///     ],
/// )
/// .unwrap();
/// let config = EvoConfig::default()
///     .with_population_size(30)
///     .with_max_generations(20)
///     .with_seed(7);
///
/// let result = EvoRunner::run(&problem, &config).unwrap();
/// assert_eq!(result.generations, 20);
/// assert_eq!(result.history.len(), 21);
/// assert!(result.best_objective <= result.initial_best.objective);
/// ```
pub struct EvoRunner;

impl EvoRunner {
    /// Runs the GA to completion.
    ///
    /// Fails only if `config` does not validate.
    pub fn run(problem: &Problem, config: &EvoConfig) -> Result<EvoResult, ConfigError> {
        Self::run_with_cancel(problem, config, None)
    }

    /// Runs the GA with an optional cancellation token.
    ///
    /// If `cancel` is `Some` and the flag is set to `true`, the run stops
    /// before the next generation and returns the best genome found so far.
    pub fn run_with_cancel(
        problem: &Problem,
        config: &EvoConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<EvoResult, ConfigError> {
        let mut manager = PopulationManager::new(problem, config.clone())?;

        info!(
            "starting GA on {} jobs x {} machines, stop: {:?}",
            problem.job_count(),
            problem.machine_count(),
            config.stop
        );

        let initial_best = manager.best().clone();
        let mut best = initial_best.clone();
        let mut history = Vec::new();
        history.push(GenerationStats::capture(0, manager.stats()));

        let mut without_improvement = 0usize;
        let mut stagnated = false;
        let mut cancelled = false;

        loop {
            if let StopCondition::MaxGenerations(limit) = config.stop {
                if manager.generation() >= limit {
                    break;
                }
            }
            if let Some(ref flag) = cancel {
                if flag.load(Ordering::Relaxed) {
                    cancelled = true;
                    break;
                }
            }

            manager.step();
            history.push(GenerationStats::capture(manager.generation(), manager.stats()));

            if manager.best().objective < best.objective {
                best.clone_from(manager.best());
                without_improvement = 0;
            } else {
                without_improvement += 1;
            }

            if let StopCondition::WithoutImprovement(patience) = config.stop {
                if without_improvement >= patience {
                    stagnated = true;
                    break;
                }
            }
        }

        let generations = manager.generation();
        info!(
            "GA finished after {generations} generations: best {} (initial {}){}",
            best.objective,
            initial_best.objective,
            if cancelled {
                ", cancelled"
            } else if stagnated {
                ", stagnated"
            } else {
                ""
            }
        );

        Ok(EvoResult {
            best_objective: best.objective,
            best,
            initial_best,
            generations,
            stagnated,
            cancelled,
            history,
        })
    }
}
