//! Population management.
//!
//! [`PopulationManager`] owns the active population, a scratch buffer for
//! offspring, the population statistics and the selection tables, and runs
//! one generational step at a time:
//!
//! preselection → reproduction → replacement → sort → statistics → scaling
//!
//! # Reproducibility
//!
//! Each step draws one base seed from the master generator. Mating event `k`
//! (scratch slots `2k` and `2k + 1`) draws every selection, gate and
//! operator decision from its own sub-stream
//! [`derive_stream(base, k)`](crate::random::derive_stream), so the offspring
//! are the same whether reproduction runs on rayon workers or sequentially.
//! Preselection and replacement draw from the master generator on the
//! calling thread.

use log::{debug, info};
use rand::{Rng, RngCore};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::config::EvoConfig;
use super::operators::{mutate, Crossover};
use super::scaling::scale;
use super::schedule::ScheduleBuilder;
use super::selection::{PreselectionArena, Selection};
use super::stats::PopulationStats;
use super::types::Genome;
use crate::error::ConfigError;
use crate::problem::Problem;
use crate::random::{derive_stream, EvoRng};

/// The two population buffers.
///
/// Exactly one buffer is active (the current population); the other is
/// scratch space that reproduction writes into. The generational model
/// swaps the roles; steady-state models copy offspring into the active
/// buffer and keep the roles as they are.
#[derive(Debug, Clone)]
pub struct DoubleBuffer {
    active: Vec<Genome>,
    scratch: Vec<Genome>,
}

impl DoubleBuffer {
    /// Wraps an active population and a scratch buffer.
    pub fn new(active: Vec<Genome>, scratch: Vec<Genome>) -> Self {
        Self { active, scratch }
    }

    /// The current population.
    pub fn active(&self) -> &[Genome] {
        &self.active
    }

    /// The offspring buffer.
    pub fn scratch(&self) -> &[Genome] {
        &self.scratch
    }

    /// Mutable access to both roles at once: `(active, scratch)`.
    pub fn roles_mut(&mut self) -> (&mut [Genome], &mut [Genome]) {
        (&mut self.active, &mut self.scratch)
    }

    /// Makes the scratch buffer the active population; the old population
    /// becomes scratch.
    pub fn promote_scratch(&mut self) {
        std::mem::swap(&mut self.active, &mut self.scratch);
    }
}

/// Owns a population and evolves it one step at a time.
///
/// # Examples
///
/// ```
/// use u_fjsp::ga::{EvoConfig, PopulationManager};
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
/// let config = EvoConfig::default().with_population_size(20).with_seed(1);
///
/// let mut manager = PopulationManager::new(&problem, config).unwrap();
/// let before = manager.best().objective;
/// manager.step();
/// assert!(manager.best().objective <= before);
/// ```
#[derive(Debug)]
pub struct PopulationManager<'a> {
    builder: ScheduleBuilder<'a>,
    config: EvoConfig,
    buffers: DoubleBuffer,
    stats: PopulationStats,
    arena: PreselectionArena,
    rng: EvoRng,
    generation: usize,
}

impl<'a> PopulationManager<'a> {
    /// Validates `config` and creates a random initial population for
    /// `problem`, decoded, sorted and scaled.
    pub fn new(problem: &'a Problem, config: EvoConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut rng = match config.seed {
            Some(seed) => EvoRng::new(config.generator, seed),
            None => EvoRng::from_entropy(config.generator),
        };
        let builder = ScheduleBuilder::new(problem);

        let n = config.population_size;
        let mut active: Vec<Genome> = (0..n).map(|_| Genome::random(problem, &mut rng)).collect();
        decode_all(&builder, &mut active, config.parallel);
        active.sort_by_key(|g| g.objective);

        let scratch = (0..config.model.scratch_size(n))
            .map(|_| Genome::new(problem))
            .collect();

        let mut stats = PopulationStats::default();
        stats.compute_objective(&active);
        scale(
            &mut active,
            &mut stats,
            config.fitness_model,
            config.selective_pressure,
            config.parallel,
        );

        info!(
            "created population of {n} ({} model, {:?} selection): best {}, average {:.2}",
            config.model.name(),
            config.selection,
            stats.min_objective,
            stats.average
        );

        Ok(Self {
            builder,
            buffers: DoubleBuffer::new(active, scratch),
            stats,
            arena: PreselectionArena::with_capacity(n),
            rng,
            generation: 0,
            config,
        })
    }

    /// Runs one generational step.
    ///
    /// On return the active population is sorted ascending by objective,
    /// its statistics are current and its fitness is rescaled.
    pub fn step(&mut self) {
        let config = &self.config;

        config.selection.preselect(
            self.buffers.active(),
            &self.stats,
            &mut self.arena,
            &mut self.rng,
        );

        let base = self.rng.next_u64();
        let breeding = Breeding {
            builder: &self.builder,
            arena: &self.arena,
            selection: config.selection,
            crossover_rate: config.crossover_rate,
            mutation_rate: config.mutation_rate,
            column_probability: config.column_probability,
            base,
        };
        let (active, scratch) = self.buffers.roles_mut();
        breeding.reproduce(active, scratch, config.parallel);

        config.model.replace(&mut self.buffers, &mut self.rng);

        let (active, _) = self.buffers.roles_mut();
        active.sort_by_key(|g| g.objective);
        self.stats.compute_objective(active);
        scale(
            active,
            &mut self.stats,
            config.fitness_model,
            config.selective_pressure,
            config.parallel,
        );

        self.generation += 1;
        debug!(
            "generation {}: min {} max {} avg {:.2} std {:.2}",
            self.generation,
            self.stats.min_objective,
            self.stats.max_objective,
            self.stats.average,
            self.stats.std_deviation
        );
    }

    /// The active population, sorted ascending by objective.
    pub fn population(&self) -> &[Genome] {
        self.buffers.active()
    }

    /// The best genome of the active population.
    pub fn best(&self) -> &Genome {
        &self.buffers.active()[0]
    }

    /// Statistics of the active population.
    pub fn stats(&self) -> &PopulationStats {
        &self.stats
    }

    /// The configuration this manager runs with.
    pub fn config(&self) -> &EvoConfig {
        &self.config
    }

    /// The problem being solved.
    pub fn problem(&self) -> &'a Problem {
        self.builder.problem()
    }

    /// Number of steps run so far.
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// The master random generator.
    ///
    /// Drawing from it changes the rest of the run.
    pub fn rng_mut(&mut self) -> &mut EvoRng {
        &mut self.rng
    }
}

/// Read-only inputs shared by every mating event of one step.
struct Breeding<'s, 'p> {
    builder: &'s ScheduleBuilder<'p>,
    arena: &'s PreselectionArena,
    selection: Selection,
    crossover_rate: f64,
    mutation_rate: f64,
    column_probability: f64,
    base: u64,
}

impl Breeding<'_, '_> {
    #[cfg(feature = "parallel")]
    fn reproduce(&self, parents: &[Genome], scratch: &mut [Genome], parallel: bool) {
        if parallel {
            scratch
                .par_chunks_mut(2)
                .enumerate()
                .for_each(|(k, kids)| self.mate(k, parents, kids));
        } else {
            for (k, kids) in scratch.chunks_mut(2).enumerate() {
                self.mate(k, parents, kids);
            }
        }
    }

    #[cfg(not(feature = "parallel"))]
    fn reproduce(&self, parents: &[Genome], scratch: &mut [Genome], _parallel: bool) {
        for (k, kids) in scratch.chunks_mut(2).enumerate() {
            self.mate(k, parents, kids);
        }
    }

    /// Mating event `k`: fills one or two scratch slots from two parents.
    ///
    /// With a single slot (odd scratch size) crossover produces one child,
    /// and a copy takes either parent with equal probability.
    fn mate(&self, k: usize, parents: &[Genome], kids: &mut [Genome]) {
        let mut rng = derive_stream(self.base, k as u64);

        let mom = &parents[self.selection.select(parents, self.arena, &mut rng)];
        let dad = &parents[self.selection.select(parents, self.arena, &mut rng)];

        let Some((kid1, rest)) = kids.split_first_mut() else {
            return;
        };
        let mut kid2 = rest.first_mut();

        if rng.random::<f64>() < self.crossover_rate {
            Crossover::choose(self.column_probability, &mut rng).apply(
                self.builder,
                mom,
                dad,
                kid1,
                kid2.as_deref_mut(),
                &mut rng,
            );
        } else if let Some(kid2) = kid2.as_deref_mut() {
            kid1.clone_from(mom);
            kid2.clone_from(dad);
        } else if rng.random::<f64>() > 0.5 {
            kid1.clone_from(dad);
        } else {
            kid1.clone_from(mom);
        }

        if rng.random::<f64>() < self.mutation_rate {
            mutate(self.builder, kid1, &mut rng);
        }
        if let Some(kid2) = kid2 {
            if rng.random::<f64>() < self.mutation_rate {
                mutate(self.builder, kid2, &mut rng);
            }
        }
    }
}

#[cfg(feature = "parallel")]
fn decode_all(builder: &ScheduleBuilder<'_>, population: &mut [Genome], parallel: bool) {
    if parallel {
        population.par_iter_mut().for_each(|g| {
            builder.build(g);
        });
    } else {
        for g in population.iter_mut() {
            builder.build(g);
        }
    }
}

#[cfg(not(feature = "parallel"))]
fn decode_all(builder: &ScheduleBuilder<'_>, population: &mut [Genome], _parallel: bool) {
    for g in population.iter_mut() {
        builder.build(g);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ga::replacement::PopulationModel;
    use crate::ga::scaling::FitnessModel;
    use crate::ga::schedule::tests::assert_valid_schedule;
    use crate::problem::Job;

    /// 4 jobs x 3 machines with distinct per-machine costs.
    fn problem() -> Problem {
        Problem::new(
            3,
            vec![
                Job::from_costs(vec![vec![2, 5, 4], vec![1, 6, 5], vec![4, 2, 3]]),
                Job::from_costs(vec![vec![3, 6, 2], vec![4, 4, 3]]),
                Job::from_costs(vec![vec![5, 2, 4], vec![2, 3, 7], vec![6, 1, 2]]),
                Job::from_costs(vec![vec![3, 3, 3]]),
            ],
        )
        .unwrap()
    }

    fn base_config() -> EvoConfig {
        EvoConfig::default()
            .with_population_size(30)
            .with_crossover_rate(0.8)
            .with_mutation_rate(0.3)
            .with_seed(42)
            .with_parallel(false)
    }

    fn assert_sorted(pop: &[Genome]) {
        for w in pop.windows(2) {
            assert!(w[0].objective <= w[1].objective, "population not sorted");
        }
    }

    #[test]
    fn test_new_population_is_sorted_and_scaled() {
        let p = problem();
        let manager = PopulationManager::new(&p, base_config()).unwrap();
        let pop = manager.population();
        assert_eq!(pop.len(), 30);
        assert_sorted(pop);
        for g in pop {
            assert_valid_schedule(&p, g);
        }
        // linear ranking, sp = 2
        assert!((pop[0].fitness - 2.0).abs() < 1e-12);
        assert!(pop[29].fitness.abs() < 1e-12);
        assert_eq!(manager.stats().min_objective, pop[0].objective);
        assert_eq!(manager.generation(), 0);
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let p = problem();
        let config = base_config().with_population_size(1);
        assert_eq!(
            PopulationManager::new(&p, config).unwrap_err(),
            ConfigError::PopulationTooSmall(1)
        );
    }

    #[test]
    fn test_step_keeps_population_valid() {
        let p = problem();
        for selection in [
            Selection::Uniform,
            Selection::Roulette,
            Selection::Tournament {
                size: 3,
                distinct: true,
            },
            Selection::Ranking,
            Selection::Sus,
        ] {
            let config = base_config().with_selection(selection);
            let mut manager = PopulationManager::new(&p, config).unwrap();
            for _ in 0..10 {
                manager.step();
                let pop = manager.population();
                assert_eq!(pop.len(), 30, "{selection:?}");
                assert_sorted(pop);
                for g in pop {
                    assert_valid_schedule(&p, g);
                }
            }
            assert_eq!(manager.generation(), 10);
        }
    }

    #[test]
    fn test_determinism_same_seed() {
        let p = problem();
        let config = base_config().with_selection(Selection::Sus);
        let mut a = PopulationManager::new(&p, config.clone()).unwrap();
        let mut b = PopulationManager::new(&p, config).unwrap();
        assert_eq!(a.population(), b.population());
        for _ in 0..15 {
            a.step();
            b.step();
            assert_eq!(a.population(), b.population());
            assert_eq!(a.stats(), b.stats());
        }
    }

    #[test]
    fn test_different_seeds_diverge() {
        let p = problem();
        let mut a = PopulationManager::new(&p, base_config().with_seed(1)).unwrap();
        let mut b = PopulationManager::new(&p, base_config().with_seed(2)).unwrap();
        for _ in 0..5 {
            a.step();
            b.step();
        }
        assert_ne!(a.population(), b.population());
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_matches_sequential() {
        let p = problem();
        for model in [
            PopulationModel::Generational { genitor: true },
            PopulationModel::SteadyStateElitist { temp_size: 11 },
            PopulationModel::SteadyStateExcess {
                temp_size: 45,
                replace_coefficient: 0.5,
            },
        ] {
            let config = base_config()
                .with_population_model(model)
                .with_tournament(4, true);
            let mut seq = PopulationManager::new(&p, config.clone().with_parallel(false)).unwrap();
            let mut par = PopulationManager::new(&p, config.with_parallel(true)).unwrap();
            for _ in 0..10 {
                seq.step();
                par.step();
                assert_eq!(seq.population(), par.population(), "{model:?}");
            }
        }
    }

    #[test]
    fn test_genitor_never_loses_best() {
        let p = problem();
        let config = base_config().with_selection(Selection::Uniform);
        let mut manager = PopulationManager::new(&p, config).unwrap();
        let mut best = manager.best().objective;
        for _ in 0..30 {
            manager.step();
            assert!(manager.best().objective <= best);
            best = manager.best().objective;
        }
    }

    #[test]
    fn test_steady_state_elitist_and_excess_monotone() {
        let p = problem();
        for model in [
            PopulationModel::SteadyStateElitist { temp_size: 7 },
            PopulationModel::SteadyStateExcess {
                temp_size: 40,
                replace_coefficient: 0.2,
            },
        ] {
            let config = base_config()
                .with_population_model(model)
                .with_fitness_model(FitnessModel::SigmaScaling, 1.5)
                .with_selection(Selection::Roulette);
            let mut manager = PopulationManager::new(&p, config).unwrap();
            for _ in 0..20 {
                let before: Vec<u32> = manager.population().iter().map(|g| g.objective).collect();
                manager.step();
                let after: Vec<u32> = manager.population().iter().map(|g| g.objective).collect();
                assert!(after[0] <= before[0], "{model:?}: best regressed");
                assert!(
                    after.iter().sum::<u32>() <= before.iter().sum::<u32>(),
                    "{model:?}: population got worse"
                );
            }
        }
    }

    #[test]
    fn test_steady_state_uniform_keeps_size() {
        let p = problem();
        let config = base_config()
            .with_population_model(PopulationModel::SteadyStateUniform { temp_size: 9 });
        let mut manager = PopulationManager::new(&p, config).unwrap();
        for _ in 0..10 {
            manager.step();
            assert_eq!(manager.population().len(), 30);
            assert_sorted(manager.population());
        }
    }

    #[test]
    fn test_odd_scratch_sizes() {
        let p = problem();
        for (n, model) in [
            (7, PopulationModel::Generational { genitor: false }),
            (10, PopulationModel::SteadyStateElitist { temp_size: 5 }),
            (6, PopulationModel::SteadyStateExcess {
                temp_size: 9,
                replace_coefficient: 1.0,
            }),
        ] {
            for rate in [0.0, 1.0] {
                let config = base_config()
                    .with_population_size(n)
                    .with_population_model(model)
                    .with_crossover_rate(rate);
                let mut manager = PopulationManager::new(&p, config).unwrap();
                for _ in 0..5 {
                    manager.step();
                }
                assert_eq!(manager.population().len(), n);
                for g in manager.population() {
                    assert_valid_schedule(&p, g);
                }
            }
        }
    }

    #[test]
    fn test_converges_on_small_problem() {
        // every job has one clearly cheapest machine per operation
        let p = Problem::new(
            2,
            vec![
                Job::from_costs(vec![vec![1, 9], vec![9, 1]]),
                Job::from_costs(vec![vec![9, 1], vec![1, 9]]),
            ],
        )
        .unwrap();
        let config = base_config()
            .with_population_size(40)
            .with_tournament(3, true);
        let mut manager = PopulationManager::new(&p, config).unwrap();
        for _ in 0..50 {
            manager.step();
        }
        assert_eq!(manager.best().objective, 2);
    }

    #[test]
    fn test_double_buffer_roles() {
        let p = problem();
        let mut a = Genome::new(&p);
        a.objective = 1;
        let mut b = Genome::new(&p);
        b.objective = 2;
        let mut buffers = DoubleBuffer::new(vec![a], vec![b]);
        buffers.promote_scratch();
        assert_eq!(buffers.active()[0].objective, 2);
        assert_eq!(buffers.scratch()[0].objective, 1);
        let (active, scratch) = buffers.roles_mut();
        active[0].objective = 5;
        scratch[0].objective = 6;
        assert_eq!(buffers.active()[0].objective, 5);
    }
}
