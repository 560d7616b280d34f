//! Engine configuration.
//!
//! [`EvoConfig`] holds every parameter of the evolutionary loop. Rates and
//! selective pressure are clamped into range by their builders; parameter
//! combinations that cannot work together are rejected by
//! [`EvoConfig::validate`].

use super::replacement::PopulationModel;
use super::scaling::FitnessModel;
use super::selection::Selection;
use crate::error::ConfigError;
use crate::random::GeneratorKind;

/// When a run stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StopCondition {
    /// After exactly this many generations.
    MaxGenerations(usize),
    /// After this many consecutive generations without a strictly better
    /// best objective.
    WithoutImprovement(usize),
}

impl Default for StopCondition {
    fn default() -> Self {
        StopCondition::MaxGenerations(500)
    }
}

/// Configuration of the flexible job-shop GA.
///
/// # Defaults
///
/// ```
/// use u_fjsp::ga::{EvoConfig, Selection};
///
/// let config = EvoConfig::default();
/// assert_eq!(config.population_size, 500);
/// assert_eq!(config.selection, Selection::Uniform);
/// assert!(config.validate().is_ok());
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_fjsp::ga::{EvoConfig, FitnessModel, PopulationModel};
///
/// let config = EvoConfig::default()
///     .with_population_size(100)
///     .with_tournament(4, true)
///     .with_fitness_model(FitnessModel::SigmaScaling, 1.5)
///     .with_population_model(PopulationModel::SteadyStateElitist { temp_size: 20 })
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EvoConfig {
    /// Number of genomes in the active population.
    pub population_size: usize,

    /// Parent selection scheme.
    pub selection: Selection,

    /// Replacement policy (and, for steady-state models, offspring count).
    pub model: PopulationModel,

    /// How objectives are turned into fitness.
    pub fitness_model: FitnessModel,

    /// Selective pressure for linear ranking and sigma scaling, in `[1, 2]`.
    pub selective_pressure: f64,

    /// Probability that a mating event recombines instead of copying the
    /// parents (0.0–1.0).
    pub crossover_rate: f64,

    /// Probability that each offspring is mutated (0.0–1.0).
    pub mutation_rate: f64,

    /// Probability of column rather than row crossover (0.0–1.0).
    ///
    /// 1.0 always picks column crossover, 0.0 always row crossover.
    pub column_probability: f64,

    /// When the runner stops.
    pub stop: StopCondition,

    /// Random generator algorithm.
    pub generator: GeneratorKind,

    /// Random seed for reproducibility.
    ///
    /// `None` seeds from entropy.
    pub seed: Option<u64>,

    /// Run reproduction and fitness scaling on rayon workers.
    ///
    /// Results do not depend on this flag. Without the `parallel` feature it
    /// has no effect.
    pub parallel: bool,
}

impl Default for EvoConfig {
    fn default() -> Self {
        Self {
            population_size: 500,
            selection: Selection::default(),
            model: PopulationModel::default(),
            fitness_model: FitnessModel::default(),
            selective_pressure: 2.0,
            crossover_rate: 0.5,
            mutation_rate: 0.1,
            column_probability: 0.5,
            stop: StopCondition::default(),
            generator: GeneratorKind::default(),
            seed: None,
            parallel: true,
        }
    }
}

impl EvoConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the selection scheme.
    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self
    }

    /// Tournament selection with the given group size.
    ///
    /// `distinct` draws the group without replacement.
    pub fn with_tournament(self, size: usize, distinct: bool) -> Self {
        self.with_selection(Selection::Tournament { size, distinct })
    }

    /// Sets the population model.
    pub fn with_population_model(mut self, model: PopulationModel) -> Self {
        self.model = model;
        self
    }

    /// Enables or disables genitor elitism.
    ///
    /// Only meaningful for the generational model; ignored otherwise.
    pub fn with_genitor(mut self, enable: bool) -> Self {
        if let PopulationModel::Generational { genitor } = &mut self.model {
            *genitor = enable;
        }
        self
    }

    /// Sets the fitness model and selective pressure (clamped to `[1, 2]`).
    pub fn with_fitness_model(mut self, model: FitnessModel, selective_pressure: f64) -> Self {
        self.fitness_model = model;
        self.selective_pressure = selective_pressure.clamp(1.0, 2.0);
        self
    }

    /// Sets the crossover rate.
    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the mutation rate.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the probability of column (vs. row) crossover.
    pub fn with_column_probability(mut self, p: f64) -> Self {
        self.column_probability = p.clamp(0.0, 1.0);
        self
    }

    /// Sets the stop condition.
    pub fn with_stop(mut self, stop: StopCondition) -> Self {
        self.stop = stop;
        self
    }

    /// Shorthand for `with_stop(StopCondition::MaxGenerations(n))`.
    pub fn with_max_generations(self, n: usize) -> Self {
        self.with_stop(StopCondition::MaxGenerations(n))
    }

    /// Sets the random generator algorithm.
    pub fn with_generator(mut self, kind: GeneratorKind) -> Self {
        self.generator = kind;
        self
    }

    /// Sets the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Enables or disables parallel reproduction and scaling.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Preset for quick runs: 50 genomes, 100 generations, tournament of 2.
    pub fn fast() -> Self {
        Self {
            population_size: 50,
            selection: Selection::Tournament {
                size: 2,
                distinct: true,
            },
            stop: StopCondition::MaxGenerations(100),
            ..Self::default()
        }
    }

    /// Preset for moderate runs: 200 genomes, tournament of 4, stops after
    /// 100 generations without improvement.
    pub fn balanced() -> Self {
        Self {
            population_size: 200,
            selection: Selection::Tournament {
                size: 4,
                distinct: true,
            },
            crossover_rate: 0.8,
            stop: StopCondition::WithoutImprovement(100),
            ..Self::default()
        }
    }

    /// Preset for long runs: 500 genomes, elitist steady-state replacement
    /// of 100 offspring, sigma scaling with roulette selection, stops after
    /// 300 generations without improvement.
    pub fn quality() -> Self {
        Self {
            population_size: 500,
            selection: Selection::Roulette,
            model: PopulationModel::SteadyStateElitist { temp_size: 100 },
            fitness_model: FitnessModel::SigmaScaling,
            selective_pressure: 1.5,
            crossover_rate: 0.8,
            mutation_rate: 0.2,
            stop: StopCondition::WithoutImprovement(300),
            ..Self::default()
        }
    }

    /// Validates the configuration.
    ///
    /// Returns the first violated constraint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let n = self.population_size;
        if n < 2 {
            return Err(ConfigError::PopulationTooSmall(n));
        }

        if let Selection::Tournament { size, .. } = self.selection {
            if size < 2 || size > n {
                return Err(ConfigError::TournamentGroupSize {
                    group_size: size,
                    population_size: n,
                });
            }
        }

        match self.model {
            PopulationModel::Generational { .. } => {}
            PopulationModel::SteadyStateUniform { temp_size }
            | PopulationModel::SteadyStateElitist { temp_size } => {
                if temp_size == 0 || temp_size > n {
                    return Err(ConfigError::TempPopulationTooLarge {
                        model: self.model.name(),
                        temp_size,
                        population_size: n,
                    });
                }
            }
            PopulationModel::SteadyStateExcess {
                temp_size,
                replace_coefficient,
            } => {
                if temp_size <= n {
                    return Err(ConfigError::TempPopulationTooSmall {
                        temp_size,
                        population_size: n,
                    });
                }
                if !(0.0..=1.0).contains(&replace_coefficient) {
                    return Err(ConfigError::ReplaceCoefficient(replace_coefficient));
                }
            }
        }

        match self.stop {
            StopCondition::MaxGenerations(0) | StopCondition::WithoutImprovement(0) => {
                Err(ConfigError::ZeroStopLimit)
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EvoConfig::default();
        assert_eq!(config.population_size, 500);
        assert_eq!(config.selection, Selection::Uniform);
        assert_eq!(config.model, PopulationModel::Generational { genitor: true });
        assert_eq!(config.fitness_model, FitnessModel::LinearRanking);
        assert!((config.selective_pressure - 2.0).abs() < 1e-12);
        assert!((config.crossover_rate - 0.5).abs() < 1e-12);
        assert!((config.mutation_rate - 0.1).abs() < 1e-12);
        assert!((config.column_probability - 0.5).abs() < 1e-12);
        assert_eq!(config.stop, StopCondition::MaxGenerations(500));
        assert!(config.seed.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = EvoConfig::default()
            .with_population_size(80)
            .with_tournament(3, false)
            .with_population_model(PopulationModel::SteadyStateUniform { temp_size: 10 })
            .with_fitness_model(FitnessModel::Raw, 1.2)
            .with_crossover_rate(0.7)
            .with_mutation_rate(0.3)
            .with_column_probability(0.25)
            .with_stop(StopCondition::WithoutImprovement(40))
            .with_generator(GeneratorKind::ChaCha20)
            .with_parallel(false)
            .with_seed(7);

        assert_eq!(config.population_size, 80);
        assert_eq!(
            config.selection,
            Selection::Tournament {
                size: 3,
                distinct: false
            }
        );
        assert_eq!(config.fitness_model, FitnessModel::Raw);
        assert!((config.crossover_rate - 0.7).abs() < 1e-12);
        assert!((config.column_probability - 0.25).abs() < 1e-12);
        assert_eq!(config.generator, GeneratorKind::ChaCha20);
        assert!(!config.parallel);
        assert_eq!(config.seed, Some(7));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_clamp_rates() {
        let config = EvoConfig::default()
            .with_crossover_rate(-0.5)
            .with_mutation_rate(2.0)
            .with_column_probability(7.0)
            .with_fitness_model(FitnessModel::LinearRanking, 3.0);
        assert_eq!(config.crossover_rate, 0.0);
        assert_eq!(config.mutation_rate, 1.0);
        assert_eq!(config.column_probability, 1.0);
        assert_eq!(config.selective_pressure, 2.0);

        let config = EvoConfig::default().with_fitness_model(FitnessModel::SigmaScaling, 0.2);
        assert_eq!(config.selective_pressure, 1.0);
    }

    #[test]
    fn test_genitor_only_for_generational() {
        let config = EvoConfig::default().with_genitor(false);
        assert_eq!(config.model, PopulationModel::Generational { genitor: false });

        let steady = PopulationModel::SteadyStateElitist { temp_size: 5 };
        let config = EvoConfig::default()
            .with_population_model(steady)
            .with_genitor(true);
        assert_eq!(config.model, steady);
    }

    #[test]
    fn test_validate_population_too_small() {
        let config = EvoConfig::default().with_population_size(1);
        assert_eq!(config.validate(), Err(ConfigError::PopulationTooSmall(1)));
    }

    #[test]
    fn test_validate_tournament_size() {
        let config = EvoConfig::default()
            .with_population_size(10)
            .with_tournament(1, true);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::TournamentGroupSize { group_size: 1, .. })
        ));

        let config = EvoConfig::default()
            .with_population_size(10)
            .with_tournament(11, false);
        assert!(config.validate().is_err());

        let config = EvoConfig::default()
            .with_population_size(10)
            .with_tournament(10, true);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_steady_state_sizes() {
        let base = EvoConfig::default().with_population_size(20);

        for model in [
            PopulationModel::SteadyStateElitist { temp_size: 21 },
            PopulationModel::SteadyStateUniform { temp_size: 21 },
            PopulationModel::SteadyStateUniform { temp_size: 0 },
        ] {
            let config = base.clone().with_population_model(model);
            assert!(
                matches!(config.validate(), Err(ConfigError::TempPopulationTooLarge { .. })),
                "{model:?} should be rejected"
            );
        }

        let config = base
            .clone()
            .with_population_model(PopulationModel::SteadyStateElitist { temp_size: 20 });
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_excess() {
        let base = EvoConfig::default().with_population_size(20);

        let config = base.clone().with_population_model(PopulationModel::SteadyStateExcess {
            temp_size: 20,
            replace_coefficient: 0.5,
        });
        assert!(matches!(
            config.validate(),
            Err(ConfigError::TempPopulationTooSmall { .. })
        ));

        let config = base.clone().with_population_model(PopulationModel::SteadyStateExcess {
            temp_size: 30,
            replace_coefficient: 1.5,
        });
        assert_eq!(config.validate(), Err(ConfigError::ReplaceCoefficient(1.5)));

        let config = base.clone().with_population_model(PopulationModel::SteadyStateExcess {
            temp_size: 30,
            replace_coefficient: f64::NAN,
        });
        assert!(config.validate().is_err());

        let config = base.with_population_model(PopulationModel::SteadyStateExcess {
            temp_size: 21,
            replace_coefficient: 1.0,
        });
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_zero_stop_limit() {
        let config = EvoConfig::default().with_max_generations(0);
        assert_eq!(config.validate(), Err(ConfigError::ZeroStopLimit));
        let config = EvoConfig::default().with_stop(StopCondition::WithoutImprovement(0));
        assert_eq!(config.validate(), Err(ConfigError::ZeroStopLimit));
    }

    // ---- Presets ----

    #[test]
    fn test_presets_are_valid() {
        for config in [EvoConfig::fast(), EvoConfig::balanced(), EvoConfig::quality()] {
            assert!(config.validate().is_ok(), "{config:?}");
        }
        assert_eq!(EvoConfig::fast().population_size, 50);
        assert_eq!(
            EvoConfig::quality().model,
            PopulationModel::SteadyStateElitist { temp_size: 100 }
        );
    }

    #[test]
    fn test_preset_chainable() {
        let config = EvoConfig::fast().with_population_size(75).with_seed(42);
        assert_eq!(config.population_size, 75);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.stop, StopCondition::MaxGenerations(100));
    }
}
