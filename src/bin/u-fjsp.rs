//! Command-line driver: loads a `.dat` problem, runs the GA and writes the
//! initial and final schedules as Gantt chart scripts.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use log::{error, info};

use u_fjsp::export::{random_job_colors, GanttExport};
use u_fjsp::ga::{
    EvoConfig, EvoRunner, FitnessModel, Genome, PopulationModel, Selection, StopCondition,
};
use u_fjsp::problem::Problem;
use u_fjsp::random::{EvoRng, GeneratorKind};

/// Flexible job-shop scheduling with a genetic algorithm.
#[derive(Parser, Debug)]
#[command(name = "u-fjsp", version, about, long_about = None)]
struct Cli {
    /// Problem file in the `.dat` format
    problem: PathBuf,

    /// Population size
    #[arg(short = 'n', long, default_value_t = 500)]
    population: usize,

    /// Stop after this many generations
    #[arg(short, long, default_value_t = 500)]
    generations: usize,

    /// Count only generations without improvement towards the limit
    #[arg(long)]
    until_stagnant: bool,

    /// Parent selection scheme
    #[arg(long, value_enum, default_value_t = SelectionArg::Uniform)]
    selection: SelectionArg,

    /// Tournament group size
    #[arg(long, default_value_t = 4)]
    tournament_size: usize,

    /// Allow the same genome to appear twice in a tournament group
    #[arg(long)]
    allow_duplicates: bool,

    /// Population (replacement) model
    #[arg(long, value_enum, default_value_t = ModelArg::Generational)]
    model: ModelArg,

    /// Disable genitor elitism (generational model)
    #[arg(long)]
    no_genitor: bool,

    /// Offspring per step for steady-state models
    #[arg(long, default_value_t = 50)]
    temp_size: usize,

    /// Share of the population open to replacement (excess model)
    #[arg(long, default_value_t = 0.2)]
    replace_coefficient: f64,

    /// Fitness model
    #[arg(long, value_enum, default_value_t = FitnessArg::Ranking)]
    fitness: FitnessArg,

    /// Selective pressure, 1.0 to 2.0
    #[arg(long, default_value_t = 2.0)]
    pressure: f64,

    /// Crossover probability
    #[arg(long, default_value_t = 0.5)]
    crossover: f64,

    /// Mutation probability
    #[arg(long, default_value_t = 0.1)]
    mutation: f64,

    /// Probability of column (vs. row) crossover
    #[arg(long, default_value_t = 0.5)]
    column: f64,

    /// Random generator algorithm
    #[arg(long, value_enum, default_value_t = GeneratorArg::Chacha12)]
    generator: GeneratorArg,

    /// Random seed (entropy when omitted)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Run on a single thread
    #[arg(long)]
    sequential: bool,

    /// Directory for solution_init.m and solution_best.m
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,

    /// Log level filter (overridden by RUST_LOG)
    #[arg(long, default_value = "info")]
    log: String,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SelectionArg {
    Uniform,
    Roulette,
    Tournament,
    Ranking,
    Sus,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModelArg {
    Generational,
    Uniform,
    Elitist,
    Excess,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FitnessArg {
    Ranking,
    Sigma,
    Raw,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum GeneratorArg {
    Chacha8,
    Chacha12,
    Chacha20,
    Small,
}

impl Cli {
    fn config(&self) -> EvoConfig {
        let selection = match self.selection {
            SelectionArg::Uniform => Selection::Uniform,
            SelectionArg::Roulette => Selection::Roulette,
            SelectionArg::Tournament => Selection::Tournament {
                size: self.tournament_size,
                distinct: !self.allow_duplicates,
            },
            SelectionArg::Ranking => Selection::Ranking,
            SelectionArg::Sus => Selection::Sus,
        };
        let model = match self.model {
            ModelArg::Generational => PopulationModel::Generational {
                genitor: !self.no_genitor,
            },
            ModelArg::Uniform => PopulationModel::SteadyStateUniform {
                temp_size: self.temp_size,
            },
            ModelArg::Elitist => PopulationModel::SteadyStateElitist {
                temp_size: self.temp_size,
            },
            ModelArg::Excess => PopulationModel::SteadyStateExcess {
                temp_size: self.temp_size,
                replace_coefficient: self.replace_coefficient,
            },
        };
        let fitness = match self.fitness {
            FitnessArg::Ranking => FitnessModel::LinearRanking,
            FitnessArg::Sigma => FitnessModel::SigmaScaling,
            FitnessArg::Raw => FitnessModel::Raw,
        };
        let generator = match self.generator {
            GeneratorArg::Chacha8 => GeneratorKind::ChaCha8,
            GeneratorArg::Chacha12 => GeneratorKind::ChaCha12,
            GeneratorArg::Chacha20 => GeneratorKind::ChaCha20,
            GeneratorArg::Small => GeneratorKind::Small,
        };
        let stop = if self.until_stagnant {
            StopCondition::WithoutImprovement(self.generations)
        } else {
            StopCondition::MaxGenerations(self.generations)
        };

        let mut config = EvoConfig::default()
            .with_population_size(self.population)
            .with_selection(selection)
            .with_population_model(model)
            .with_fitness_model(fitness, self.pressure)
            .with_crossover_rate(self.crossover)
            .with_mutation_rate(self.mutation)
            .with_column_probability(self.column)
            .with_stop(stop)
            .with_generator(generator)
            .with_parallel(!self.sequential);
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        config
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let _logger = match flexi_logger::Logger::try_with_env_or_str(&cli.log).and_then(|l| l.start()) {
        Ok(handle) => handle,
        Err(e) => {
            eprintln!("cannot initialise logging: {e}");
            return ExitCode::FAILURE;
        }
    };

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> u_fjsp::Result<()> {
    let problem = Problem::from_file(&cli.problem)?;
    info!(
        "{}: {} jobs, {} machines, {} operations",
        cli.problem.display(),
        problem.job_count(),
        problem.machine_count(),
        problem.total_operations()
    );

    let config = cli.config();
    let result = EvoRunner::run(&problem, &config)?;

    println!("{:>6} {:>8} {:>8} {:>10} {:>10}", "gen", "min", "max", "avg", "std");
    for h in &result.history {
        println!(
            "{:>6} {:>8} {:>8} {:>10.2} {:>10.2}",
            h.generation, h.min_objective, h.max_objective, h.average, h.std_deviation
        );
    }
    println!(
        "best makespan {} after {} generations (initial {})",
        result.best_objective, result.generations, result.initial_best.objective
    );

    let mut rng = match config.seed {
        Some(seed) => EvoRng::new(config.generator, seed),
        None => EvoRng::from_entropy(config.generator),
    };
    let colors = random_job_colors(problem.job_count(), &mut rng);

    std::fs::create_dir_all(&cli.out_dir)?;
    write_script(
        &cli.out_dir.join("solution_init.m"),
        &problem,
        &result.initial_best,
        &colors,
    )?;
    write_script(
        &cli.out_dir.join("solution_best.m"),
        &problem,
        &result.best,
        &colors,
    )?;
    Ok(())
}

fn write_script(
    path: &Path,
    problem: &Problem,
    genome: &Genome,
    colors: &[[f64; 3]],
) -> u_fjsp::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    GanttExport::new(problem, genome).write_gantt_script(colors, &mut out)?;
    out.flush()?;
    info!("wrote {}", path.display());
    Ok(())
}
