//! Genome representation.
//!
//! A [`Genome`] holds one [`Gene`] per operation, grouped by job in problem
//! order. The machine of every gene is the decision variable; start times
//! are derived by the [`ScheduleBuilder`](super::ScheduleBuilder) and never
//! written by hand.

use rand::Rng;

use crate::problem::Problem;

/// Machine assignment and derived start time of one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Gene {
    /// Machine index the operation runs on.
    pub machine: usize,
    /// Start time computed by the schedule builder.
    pub start: u32,
}

impl Gene {
    /// A gene assigned to `machine` whose start time is not yet computed.
    pub fn on(machine: usize) -> Self {
        Self { machine, start: 0 }
    }
}

/// One candidate schedule.
///
/// `objective` is the makespan (smaller is better); `fitness` is the
/// population-relative scaled score used by selection (larger is better).
#[derive(Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Genome {
    pub(crate) rows: Vec<Vec<Gene>>,
    /// Makespan of the decoded schedule.
    pub objective: u32,
    /// Scaled fitness (set by the fitness scaler).
    pub fitness: f64,
}

impl Clone for Genome {
    fn clone(&self) -> Self {
        Self {
            rows: self.rows.clone(),
            objective: self.objective,
            fitness: self.fitness,
        }
    }

    // Population slots are overwritten every step; reuse their allocations.
    fn clone_from(&mut self, source: &Self) {
        self.rows.clone_from(&source.rows);
        self.objective = source.objective;
        self.fitness = source.fitness;
    }
}

impl Genome {
    /// A genome shaped for `problem` with every operation on machine 0 and
    /// no schedule yet (`objective == u32::MAX`).
    pub fn new(problem: &Problem) -> Self {
        let rows = problem
            .jobs()
            .iter()
            .map(|job| vec![Gene::default(); job.operation_count()])
            .collect();
        Self {
            rows,
            objective: u32::MAX,
            fitness: 0.0,
        }
    }

    /// Builds a genome from explicit machine assignments (`machines[job][position]`).
    ///
    /// The schedule is not decoded; call
    /// [`ScheduleBuilder::build`](super::ScheduleBuilder::build) afterwards.
    ///
    /// # Panics
    /// Panics if the shape does not match `problem` or a machine index is out
    /// of range.
    pub fn from_machines(problem: &Problem, machines: &[Vec<usize>]) -> Self {
        assert_eq!(
            machines.len(),
            problem.job_count(),
            "genome must have one row per job"
        );
        let rows = machines
            .iter()
            .zip(problem.jobs())
            .map(|(row, job)| {
                assert_eq!(
                    row.len(),
                    job.operation_count(),
                    "genome row must have one gene per operation"
                );
                row.iter()
                    .map(|&m| {
                        assert!(m < problem.machine_count(), "machine {m} out of range");
                        Gene::on(m)
                    })
                    .collect()
            })
            .collect();
        Self {
            rows,
            objective: u32::MAX,
            fitness: 0.0,
        }
    }

    /// A genome with a uniformly random machine per operation (schedule not decoded).
    pub fn random<R: Rng>(problem: &Problem, rng: &mut R) -> Self {
        let last = problem.machine_count() - 1;
        let rows = problem
            .jobs()
            .iter()
            .map(|job| {
                (0..job.operation_count())
                    .map(|_| Gene::on(rng.random_range(0..=last)))
                    .collect()
            })
            .collect();
        Self {
            rows,
            objective: u32::MAX,
            fitness: 0.0,
        }
    }

    /// Genes of `job` in operation order.
    pub fn genes(&self, job: usize) -> &[Gene] {
        &self.rows[job]
    }

    /// All rows, one per job.
    pub fn rows(&self) -> &[Vec<Gene>] {
        &self.rows
    }

    /// Number of jobs this genome encodes.
    pub fn job_count(&self) -> usize {
        self.rows.len()
    }

    /// Whether this genome has exactly one gene per operation of `problem`.
    pub fn fits(&self, problem: &Problem) -> bool {
        self.rows.len() == problem.job_count()
            && self
                .rows
                .iter()
                .zip(problem.jobs())
                .all(|(row, job)| row.len() == job.operation_count())
    }
}
