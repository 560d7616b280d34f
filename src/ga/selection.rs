//! Parent selection schemes.
//!
//! Every scheme picks one slot of a population that is sorted ascending by
//! objective and already fitness-scaled. Roulette and stochastic universal
//! sampling need a table built once per generation by
//! [`Selection::preselect`]; the tables live in a [`PreselectionArena`]
//! owned by the population manager and reused across generations.
//!
//! # References
//!
//! - Goldberg (1989), *Genetic Algorithms in Search, Optimization, and
//!   Machine Learning* (roulette, stochastic remainder sampling)
//! - Baker (1987), "Reducing Bias and Inefficiency in the Selection Algorithm"
//! - Blickle & Thiele (1996), "A Comparison of Selection Schemes used in
//!   Evolutionary Algorithms"

use log::warn;
use rand::Rng;

use super::stats::PopulationStats;
use super::types::Genome;

/// Selection scheme for choosing parents.
///
/// # Examples
///
/// ```
/// use u_fjsp::ga::Selection;
///
/// let sel = Selection::Tournament { size: 4, distinct: true };
/// assert!(sel.needs_cumulative_table());
/// assert!(!Selection::Uniform.needs_cumulative_table());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Selection {
    /// Every slot is equally likely.
    #[default]
    Uniform,

    /// Fitness-proportionate selection over a cumulative probability table.
    ///
    /// # Complexity
    /// O(n) table build per generation, O(log n) per selection
    Roulette,

    /// Draw `size` slots and return the one with the highest fitness.
    ///
    /// With `distinct` the group is drawn without replacement.
    Tournament {
        /// Group size, in `[2, population_size]`.
        size: usize,
        /// Draw the group without replacement.
        distinct: bool,
    },

    /// Uniform choice among the genomes tied for the best objective.
    Ranking,

    /// Stochastic universal (remainder) sampling over a per-generation
    /// choice table.
    ///
    /// # Complexity
    /// O(n) table build per generation, O(1) per selection
    Sus,
}

impl Selection {
    /// Whether this scheme's preselection builds the cumulative table.
    pub fn needs_cumulative_table(&self) -> bool {
        matches!(self, Selection::Roulette | Selection::Tournament { .. })
    }

    /// Whether this scheme's preselection builds the SUS choice table.
    pub fn needs_choice_table(&self) -> bool {
        matches!(self, Selection::Sus)
    }

    /// Rebuilds whatever per-generation table this scheme needs.
    ///
    /// Uniform and ranking selection need none; this is then a no-op.
    pub fn preselect<R: Rng>(
        &self,
        population: &[Genome],
        stats: &PopulationStats,
        arena: &mut PreselectionArena,
        rng: &mut R,
    ) {
        if self.needs_cumulative_table() {
            arena.build_cumulative(population, stats);
        } else if self.needs_choice_table() {
            arena.build_choices(population, stats, rng);
        }
    }

    /// Selects a parent slot.
    ///
    /// # Panics
    /// Panics if `population` is empty.
    pub fn select<R: Rng>(
        &self,
        population: &[Genome],
        arena: &PreselectionArena,
        rng: &mut R,
    ) -> usize {
        assert!(
            !population.is_empty(),
            "cannot select from empty population"
        );
        let n = population.len();

        match *self {
            Selection::Uniform => rng.random_range(0..n),
            Selection::Roulette => roulette(arena.cumulative(), rng),
            Selection::Tournament { size, distinct } => tournament(population, size, distinct, rng),
            Selection::Ranking => ranking(population, rng),
            Selection::Sus => {
                let choices = arena.choices();
                assert_eq!(choices.len(), n, "SUS choice table not built");
                choices[rng.random_range(0..n)]
            }
        }
    }
}

/// Per-generation selection tables, sized once for the population and
/// reused every generation.
#[derive(Debug, Clone, Default)]
pub struct PreselectionArena {
    cumulative: Vec<f64>,
    choices: Vec<usize>,
    remainders: Vec<f64>,
}

impl PreselectionArena {
    /// An arena with room for a population of `n` genomes.
    pub fn with_capacity(n: usize) -> Self {
        Self {
            cumulative: Vec::with_capacity(n),
            choices: Vec::with_capacity(n),
            remainders: Vec::with_capacity(n),
        }
    }

    /// Cumulative roulette probabilities, one per slot.
    pub fn cumulative(&self) -> &[f64] {
        &self.cumulative
    }

    /// SUS choice table, one slot index per entry.
    pub fn choices(&self) -> &[usize] {
        &self.choices
    }

    /// Builds the roulette table: running sum of fitness normalised so the
    /// last entry is 1.
    ///
    /// An objective-degenerate population (or one whose fitness sums to
    /// zero) gets equal likelihoods `(i + 1) / n`.
    pub fn build_cumulative(&mut self, population: &[Genome], stats: &PopulationStats) {
        let n = population.len();
        self.cumulative.clear();

        let total: f64 = population.iter().map(|g| g.fitness).sum();
        if stats.is_objective_degenerate() || total <= 0.0 {
            if !stats.is_objective_degenerate() {
                warn!("roulette: fitness sums to zero, falling back to equal likelihoods");
            }
            self.cumulative
                .extend((0..n).map(|i| (i + 1) as f64 / n as f64));
            return;
        }

        let mut running = 0.0;
        for g in population {
            running += g.fitness;
            self.cumulative.push(running / total);
        }
        if let Some(last) = self.cumulative.last_mut() {
            *last = 1.0;
        }
    }

    /// Builds the SUS choice table.
    ///
    /// Each genome gets `floor(fitness / average_fitness)` entries; the
    /// fractional remainders are then given one pass in which remainder `r`
    /// claims a further entry with probability `r`; whatever is still empty
    /// is filled with uniform draws. A population with zero average fitness
    /// or flat fitness is filled uniformly throughout.
    pub fn build_choices<R: Rng>(
        &mut self,
        population: &[Genome],
        stats: &PopulationStats,
        rng: &mut R,
    ) {
        let n = population.len();
        self.choices.clear();

        if stats.average_fitness == 0.0 || stats.max_fitness == stats.min_fitness {
            self.choices
                .extend((0..n).map(|_| rng.random_range(0..n)));
            return;
        }

        self.remainders.clear();
        for (i, g) in population.iter().enumerate() {
            let expected = g.fitness / stats.average_fitness;
            let whole = expected.floor();
            self.remainders.push(expected - whole);
            let room = n - self.choices.len();
            let copies = (whole as usize).min(room);
            self.choices.extend(std::iter::repeat(i).take(copies));
        }

        for i in 0..n {
            if self.choices.len() >= n {
                break;
            }
            let r = self.remainders[i];
            if r > 0.0 && rng.random::<f64>() < r {
                self.choices.push(i);
            }
        }

        while self.choices.len() < n {
            self.choices.push(rng.random_range(0..n));
        }
    }
}

/// First slot whose cumulative probability exceeds a uniform draw.
fn roulette<R: Rng>(cumulative: &[f64], rng: &mut R) -> usize {
    assert!(!cumulative.is_empty(), "roulette table not built");
    let cutoff: f64 = rng.random();
    cumulative
        .partition_point(|&p| p <= cutoff)
        .min(cumulative.len() - 1)
}

fn tournament<R: Rng>(population: &[Genome], size: usize, distinct: bool, rng: &mut R) -> usize {
    let n = population.len();
    assert!(
        (1..=n).contains(&size),
        "tournament size {size} out of range for population of {n}"
    );

    let mut group: Vec<usize> = Vec::with_capacity(size);
    while group.len() < size {
        let pick = rng.random_range(0..n);
        if distinct && group.contains(&pick) {
            continue;
        }
        group.push(pick);
    }

    let mut best = group[0];
    for &idx in &group[1..] {
        if population[idx].fitness > population[best].fitness {
            best = idx;
        }
    }
    best
}

fn ranking<R: Rng>(population: &[Genome], rng: &mut R) -> usize {
    let best = population[0].objective;
    let ties = population
        .iter()
        .take_while(|g| g.objective == best)
        .count();
    if ties == 1 {
        0
    } else {
        rng.random_range(0..ties)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ga::scaling::{scale, FitnessModel};
    use crate::ga::schedule::tests::scenario_problem;
    use crate::random::{EvoRng, GeneratorKind};

    fn scaled(objectives: &[u32], model: FitnessModel) -> (Vec<Genome>, PopulationStats) {
        let p = scenario_problem();
        let mut pop: Vec<Genome> = objectives
            .iter()
            .map(|&o| {
                let mut g = Genome::new(&p);
                g.objective = o;
                g
            })
            .collect();
        pop.sort_by_key(|g| g.objective);
        let mut stats = PopulationStats::default();
        stats.compute_objective(&pop);
        scale(&mut pop, &mut stats, model, 2.0, false);
        (pop, stats)
    }

    fn counts(sel: Selection, pop: &[Genome], stats: &PopulationStats, draws: usize) -> Vec<usize> {
        let mut rng = EvoRng::new(GeneratorKind::ChaCha8, 42);
        let mut arena = PreselectionArena::with_capacity(pop.len());
        sel.preselect(pop, stats, &mut arena, &mut rng);
        let mut counts = vec![0; pop.len()];
        for _ in 0..draws {
            counts[sel.select(pop, &arena, &mut rng)] += 1;
        }
        counts
    }

    #[test]
    fn test_uniform_covers_population() {
        let (pop, stats) = scaled(&[1, 2, 3, 4], FitnessModel::LinearRanking);
        let c = counts(Selection::Uniform, &pop, &stats, 10_000);
        for &x in &c {
            assert!(x > 2000, "expected roughly uniform, got {c:?}");
        }
    }

    #[test]
    fn test_roulette_table_is_valid() {
        for model in [
            FitnessModel::LinearRanking,
            FitnessModel::SigmaScaling,
            FitnessModel::Raw,
        ] {
            let (pop, stats) = scaled(&[3, 4, 4, 8, 9, 15], model);
            let mut arena = PreselectionArena::with_capacity(pop.len());
            arena.build_cumulative(&pop, &stats);
            let table = arena.cumulative();
            assert_eq!(table.len(), pop.len());
            for w in table.windows(2) {
                assert!(w[1] >= w[0], "{model:?}: table must be non-decreasing: {table:?}");
            }
            assert!((table[table.len() - 1] - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_roulette_degenerate_is_equal_likelihood() {
        let (pop, stats) = scaled(&[5, 5, 5, 5], FitnessModel::Raw);
        let mut arena = PreselectionArena::default();
        arena.build_cumulative(&pop, &stats);
        assert_eq!(arena.cumulative(), &[0.25, 0.5, 0.75, 1.0]);
    }

    #[test]
    fn test_roulette_favors_best() {
        let (pop, stats) = scaled(&[1, 50, 80, 100], FitnessModel::Raw);
        let c = counts(Selection::Roulette, &pop, &stats, 10_000);
        assert!(c[0] > c[1] && c[1] > c[2], "got {c:?}");
        // worst has raw fitness 0
        assert_eq!(c[3], 0);
    }

    #[test]
    fn test_tournament_favors_best() {
        let (pop, stats) = scaled(&[1, 5, 8, 10], FitnessModel::LinearRanking);
        let c = counts(
            Selection::Tournament {
                size: 4,
                distinct: true,
            },
            &pop,
            &stats,
            1000,
        );
        // whole population in every group: best always wins
        assert_eq!(c[0], 1000);

        let c = counts(
            Selection::Tournament {
                size: 2,
                distinct: false,
            },
            &pop,
            &stats,
            10_000,
        );
        assert!(c[0] > c[3], "got {c:?}");
        assert!(c[0] > 3000, "best should win often, got {c:?}");
    }

    #[test]
    fn test_ranking_picks_among_ties() {
        let (pop, stats) = scaled(&[2, 2, 2, 7, 9], FitnessModel::LinearRanking);
        let c = counts(Selection::Ranking, &pop, &stats, 9000);
        assert_eq!(c[3] + c[4], 0);
        for &x in &c[..3] {
            assert!(x > 2500, "ties should share evenly, got {c:?}");
        }

        let (pop, stats) = scaled(&[1, 2, 3], FitnessModel::LinearRanking);
        let c = counts(Selection::Ranking, &pop, &stats, 100);
        assert_eq!(c, vec![100, 0, 0]);
    }

    #[test]
    fn test_sus_table_follows_expectation() {
        // Raw fitness 6, 3, 3, 0 -> average 3 -> expected 2, 1, 1, 0
        let (pop, stats) = scaled(&[1, 4, 4, 7], FitnessModel::Raw);
        let mut rng = EvoRng::new(GeneratorKind::ChaCha8, 1);
        let mut arena = PreselectionArena::with_capacity(4);
        arena.build_choices(&pop, &stats, &mut rng);
        assert_eq!(arena.choices(), &[0, 0, 1, 2]);
    }

    #[test]
    fn test_sus_table_always_full() {
        let mut rng = EvoRng::new(GeneratorKind::ChaCha12, 9);
        for seed in 0..50u32 {
            let objectives: Vec<u32> = (0..13).map(|i| (i * 7 + seed) % 17).collect();
            let (pop, stats) = scaled(&objectives, FitnessModel::SigmaScaling);
            let mut arena = PreselectionArena::default();
            arena.build_choices(&pop, &stats, &mut rng);
            assert_eq!(arena.choices().len(), pop.len());
            assert!(arena.choices().iter().all(|&i| i < pop.len()));
        }
    }

    #[test]
    fn test_sus_degenerate_fills_uniformly() {
        let (pop, stats) = scaled(&[3, 3, 3], FitnessModel::Raw);
        assert_eq!(stats.average_fitness, 0.0);
        let c = counts(Selection::Sus, &pop, &stats, 3000);
        assert_eq!(c.iter().sum::<usize>(), 3000);
    }

    #[test]
    #[should_panic(expected = "cannot select from empty population")]
    fn test_empty_population_panics() {
        let pop: Vec<Genome> = vec![];
        let mut rng = EvoRng::new(GeneratorKind::ChaCha8, 0);
        Selection::Uniform.select(&pop, &PreselectionArena::default(), &mut rng);
    }
}
