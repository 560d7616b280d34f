//! Error types.
//!
//! Two recoverable failure classes exist: an invalid [`EvoConfig`](crate::ga::EvoConfig)
//! ([`ConfigError`]) and a problem description that cannot be loaded
//! ([`ProblemError`]). Contract violations inside the engine (stepping an
//! empty population, a genome shaped for a different problem) are bugs and
//! panic instead.

use std::path::PathBuf;

use thiserror::Error;

/// An invalid engine configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// The population must hold at least two genomes.
    #[error("population_size must be at least 2, got {0}")]
    PopulationTooSmall(usize),

    /// Tournament group size outside `[2, population_size]`.
    #[error("tournament group size must be in [2, {population_size}], got {group_size}")]
    TournamentGroupSize {
        /// Requested group size.
        group_size: usize,
        /// Configured population size.
        population_size: usize,
    },

    /// Elitist and uniform steady-state models need `1 <= temp <= population`.
    #[error(
        "temporary population size must be in [1, {population_size}] for {model} replacement, got {temp_size}"
    )]
    TempPopulationTooLarge {
        /// Model name, for the message.
        model: &'static str,
        /// Requested temporary population size.
        temp_size: usize,
        /// Configured population size.
        population_size: usize,
    },

    /// The excess model needs a temporary population strictly larger than the population.
    #[error(
        "temporary population size must exceed population size ({population_size}) for excess replacement, got {temp_size}"
    )]
    TempPopulationTooSmall {
        /// Requested temporary population size.
        temp_size: usize,
        /// Configured population size.
        population_size: usize,
    },

    /// Replacement coefficient outside `[0, 1]`.
    #[error("replacement coefficient must be in [0, 1], got {0}")]
    ReplaceCoefficient(f64),

    /// A run needs at least one generation (or one stagnation generation).
    #[error("stop condition limit must be at least 1")]
    ZeroStopLimit,
}

/// A problem description that could not be loaded.
#[derive(Debug, Error)]
pub enum ProblemError {
    /// The source file could not be read.
    #[error("couldn't open {path:?}: {source}")]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Unsupported format version.
    #[error("bad file format: magic {0}, expected 1337")]
    BadMagic(i64),

    /// A line could not be parsed.
    #[error("line {line}: {message}")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// What went wrong.
        message: String,
    },

    /// A required header (`numJobs`, `numMachines`) never appeared.
    #[error("missing header field `{0}`")]
    MissingHeader(&'static str),

    /// Number of `job { }` blocks differs from `numJobs`.
    #[error("expected {expected} jobs, found {found}")]
    JobCount {
        /// Declared job count.
        expected: usize,
        /// Parsed job blocks.
        found: usize,
    },

    /// The problem has no jobs or no machines.
    #[error("problem must have at least one job and one machine")]
    Empty,

    /// A job without operations.
    #[error("job {0} has no operations")]
    EmptyJob(usize),

    /// A cost vector whose width differs from the machine count.
    #[error("job {job} operation {operation}: expected {expected} machine costs, found {found}")]
    CostWidth {
        /// Job index.
        job: usize,
        /// Operation position within the job.
        operation: usize,
        /// Machine count.
        expected: usize,
        /// Costs supplied.
        found: usize,
    },

    /// Even the slowest schedule must fit in `u32` time units.
    #[error("sum of worst-case operation durations ({0}) exceeds {max}", max = u32::MAX)]
    HorizonOverflow(u64),
}

/// Umbrella error for callers that load a problem and configure a run in one go.
#[derive(Debug, Error)]
pub enum Error {
    /// See [`ConfigError`].
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// See [`ProblemError`].
    #[error(transparent)]
    Problem(#[from] ProblemError),

    /// Writing an export failed.
    #[error("export failed: {0}")]
    Export(#[from] std::io::Error),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;
