//! Genetic-algorithm engine for the flexible job-shop scheduling problem.
//!
//! Every operation of every job may run on any machine, at a
//! machine-dependent duration. A genome picks one machine per operation; a
//! deterministic list scheduler turns the choice into start times and a
//! makespan, which the GA minimises.
//!
//! - **Problem** ([`problem`]): jobs, operations and per-machine costs,
//!   loaded from the `.dat` text format or built in code.
//! - **GA** ([`ga`]): schedule decoding, fitness scaling, five selection
//!   schemes, row/column crossover, load-balancing mutation, generational
//!   and steady-state replacement.
//! - **Random source** ([`random`]): seedable generators with a selectable
//!   algorithm, so runs are reproducible.
//! - **Export** ([`export`]): flattened schedules and Gantt chart scripts.
//!
//! # Example
//!
//! ```
//! use u_fjsp::ga::{EvoConfig, EvoRunner};
//! use u_fjsp::problem::Problem;
//!
//! let problem = Problem::parse(
//!     "magic 1337\nnumJobs 2\nnumMachines 2\n\
//!      job {\nnumOperations 2\n3 5\n2 4\n}\n\
//!      job {\nnumOperations 2\n4 2\n3 3\n}\n",
//! )?;
//! let config = EvoConfig::fast().with_seed(42);
//! let result = EvoRunner::run(&problem, &config)?;
//! assert!(result.best_objective >= 5);
//! # Ok::<(), u_fjsp::Error>(())
//! ```

pub mod error;
pub mod export;
pub mod ga;
pub mod problem;
pub mod random;

pub use error::{ConfigError, Error, ProblemError, Result};
