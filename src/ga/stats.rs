//! Population statistics.

use super::types::Genome;

/// Summary statistics of one population.
///
/// Objective statistics are computed by [`compute_objective`](Self::compute_objective);
/// fitness statistics are filled in by the fitness scaler after it rescales
/// the population.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PopulationStats {
    /// Best (smallest) makespan.
    pub min_objective: u32,
    /// Worst (largest) makespan.
    pub max_objective: u32,
    /// Mean makespan.
    pub average: f64,
    /// Population standard deviation of the makespan.
    pub std_deviation: f64,
    /// Mean of `max_objective - objective`.
    pub average_inverted: f64,
    /// Population standard deviation of `max_objective - objective`.
    pub std_deviation_inverted: f64,
    /// Smallest scaled fitness.
    pub min_fitness: f64,
    /// Largest scaled fitness.
    pub max_fitness: f64,
    /// Mean scaled fitness.
    pub average_fitness: f64,
}

impl PopulationStats {
    /// Recomputes the objective statistics of `population`, keeping the
    /// fitness fields untouched.
    ///
    /// # Panics
    /// Panics if `population` is empty.
    pub fn compute_objective(&mut self, population: &[Genome]) {
        assert!(!population.is_empty(), "statistics of an empty population");
        let n = population.len() as f64;

        let (min, max, sum) = population.iter().fold(
            (u32::MAX, 0u32, 0.0f64),
            |(lo, hi, sum), g| (lo.min(g.objective), hi.max(g.objective), sum + g.objective as f64),
        );
        let average = sum / n;
        let average_inverted = max as f64 - average;

        let (var, var_inv) = population.iter().fold((0.0f64, 0.0f64), |(v, vi), g| {
            let d = g.objective as f64 - average;
            let di = (max - g.objective) as f64 - average_inverted;
            (v + d * d, vi + di * di)
        });

        self.min_objective = min;
        self.max_objective = max;
        self.average = average;
        self.average_inverted = average_inverted;
        self.std_deviation = (var / n).sqrt();
        self.std_deviation_inverted = (var_inv / n).sqrt();
    }

    /// Recomputes min/max/average fitness of `population`.
    ///
    /// # Panics
    /// Panics if `population` is empty.
    pub fn compute_fitness(&mut self, population: &[Genome]) {
        assert!(!population.is_empty(), "statistics of an empty population");
        let first = population[0].fitness;
        let (min, max, sum) = population
            .iter()
            .fold((first, first, 0.0f64), |(lo, hi, sum), g| {
                (lo.min(g.fitness), hi.max(g.fitness), sum + g.fitness)
            });
        self.min_fitness = min;
        self.max_fitness = max;
        self.average_fitness = sum / population.len() as f64;
    }

    /// Whether every genome has the same objective.
    pub fn is_objective_degenerate(&self) -> bool {
        self.min_objective == self.max_objective
    }
}
