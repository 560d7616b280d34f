//! Genetic algorithm for the flexible job-shop scheduling problem.
//!
//! A genome assigns a machine to every operation; the [`ScheduleBuilder`]
//! turns the assignment into start times and a makespan. The population
//! evolves through preselection, parent selection, row/column crossover,
//! load-balancing mutation and one of four replacement models.
//!
//! # Key Types
//!
//! - [`Genome`] / [`Gene`]: One candidate schedule
//! - [`ScheduleBuilder`]: Deterministic list-scheduling decoder
//! - [`EvoConfig`]: Algorithm parameters (population size, selection, presets)
//! - [`PopulationManager`]: Owns the population and runs single steps
//! - [`EvoRunner`]: Runs steps until a [`StopCondition`] holds
//! - [`EvoResult`]: Final result with per-generation statistics
//!
//! # Strategies
//!
//! - [`FitnessModel`]: Linear ranking, sigma scaling, raw
//! - [`Selection`]: Uniform, roulette, tournament, ranking, SUS
//! - [`Crossover`] and [`mutate`]: Variation operators
//! - [`PopulationModel`]: Generational (with genitor) and three steady-state models
//!
//! # References
//!
//! - Holland (1975), *Adaptation in Natural and Artificial Systems*
//! - Goldberg (1989), *Genetic Algorithms in Search, Optimization, and Machine Learning*
//! - Brandimarte (1993), "Routing and scheduling in a flexible job shop by tabu search"
//! - Pezzella, Morganti & Ciaschetti (2008), "A genetic algorithm for the
//!   Flexible Job-shop Scheduling Problem"

mod config;
mod operators;
mod population;
mod replacement;
mod runner;
mod scaling;
mod schedule;
mod selection;
mod stats;
mod types;

pub use config::{EvoConfig, StopCondition};
pub use operators::{column_crossover, mutate, row_crossover, Crossover};
pub use population::{DoubleBuffer, PopulationManager};
pub use replacement::PopulationModel;
pub use runner::{EvoResult, EvoRunner, GenerationStats};
pub use scaling::{scale, FitnessModel};
pub use schedule::ScheduleBuilder;
pub use selection::{PreselectionArena, Selection};
pub use stats::PopulationStats;
pub use types::{Gene, Genome};
