//! Fitness scaling.
//!
//! Turns raw makespans into maximisation-oriented fitness scores that
//! selection can weight by. Every model reads population statistics that
//! must already be up to date, and each genome writes only its own
//! `fitness`, so the per-genome pass can run on rayon workers.
//!
//! # References
//!
//! - Baker (1985), "Adaptive Selection Methods for Genetic Algorithms"
//! - Goldberg (1989), *Genetic Algorithms in Search, Optimization, and
//!   Machine Learning*, ch. 4 (sigma truncation)

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::stats::PopulationStats;
use super::types::Genome;

/// Model used to derive fitness from the objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FitnessModel {
    /// Linear ranking on the sorted population.
    ///
    /// The best genome scores `sp`, the worst `2 - sp`, the rest are
    /// interpolated by rank:
    /// `f(pos) = 2 - sp + 2·(sp - 1)·(pos - 1)/(n - 1)` with `pos = n` for the best.
    #[default]
    LinearRanking,

    /// Sigma truncation on the inverted objective:
    /// `max(0, (max - obj) - (avg_inv - sp·σ_inv))`.
    SigmaScaling,

    /// `max_objective - objective`.
    Raw,
}

/// Rescales every genome's fitness and refreshes the fitness statistics.
///
/// `population` must be sorted ascending by objective (linear ranking
/// relies on it) and `stats` must hold its objective statistics.
/// `selective_pressure` is clamped to `[1, 2]`.
pub fn scale(
    population: &mut [Genome],
    stats: &mut PopulationStats,
    model: FitnessModel,
    selective_pressure: f64,
    parallel: bool,
) {
    let n = population.len();
    let sp = selective_pressure.clamp(1.0, 2.0);
    let s = *stats;

    let score = move |rank: usize, g: &Genome| -> f64 {
        match model {
            FitnessModel::LinearRanking => {
                if n < 2 {
                    return sp;
                }
                let pos = (n - rank) as f64;
                2.0 - sp + 2.0 * (sp - 1.0) * (pos - 1.0) / (n - 1) as f64
            }
            FitnessModel::SigmaScaling => {
                let inverted = (s.max_objective - g.objective) as f64;
                (inverted - (s.average_inverted - sp * s.std_deviation_inverted)).max(0.0)
            }
            FitnessModel::Raw => (s.max_objective - g.objective) as f64,
        }
    };

    assign(population, parallel, score);
    stats.compute_fitness(population);
}

#[cfg(feature = "parallel")]
fn assign<F>(population: &mut [Genome], parallel: bool, score: F)
where
    F: Fn(usize, &Genome) -> f64 + Sync,
{
    if parallel {
        population
            .par_iter_mut()
            .enumerate()
            .for_each(|(rank, g)| g.fitness = score(rank, g));
    } else {
        for (rank, g) in population.iter_mut().enumerate() {
            g.fitness = score(rank, g);
        }
    }
}

#[cfg(not(feature = "parallel"))]
fn assign<F>(population: &mut [Genome], _parallel: bool, score: F)
where
    F: Fn(usize, &Genome) -> f64,
{
    for (rank, g) in population.iter_mut().enumerate() {
        g.fitness = score(rank, g);
    }
}
