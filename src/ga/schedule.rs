//! Genome decoding: machine assignments → start times → makespan.
//!
//! # Algorithm
//!
//! A single-pass list scheduler. Positions are swept in order; at each
//! position the jobs are visited in ascending index, and each operation
//! starts as soon as both its job predecessor and its machine are free:
//!
//! ```text
//! for i in 0..max_ops:
//!     for j in 0..jobs:
//!         if job j has operation i on machine m:
//!             start      = max(job_finish[j], machine_free[m])
//!             finish     = start + duration(j, i, m)
//!             job_finish[j] = machine_free[m] = finish
//! makespan = max(job_finish)
//! ```
//!
//! At equal position the lower job index claims a machine first. The
//! outcome depends on that order; it is part of the decoder's definition.
//!
//! # Complexity
//! O(total operations + jobs + machines) per genome

use super::types::Genome;
use crate::problem::Problem;

/// Decodes genomes against one problem instance.
#[derive(Debug, Clone, Copy)]
pub struct ScheduleBuilder<'a> {
    problem: &'a Problem,
}

impl<'a> ScheduleBuilder<'a> {
    /// Creates a builder for `problem`.
    pub fn new(problem: &'a Problem) -> Self {
        Self { problem }
    }

    /// The problem this builder decodes against.
    pub fn problem(&self) -> &'a Problem {
        self.problem
    }

    /// Recomputes every gene's start time and the genome's objective.
    ///
    /// Returns the makespan, which is also stored in `genome.objective`.
    ///
    /// # Panics
    /// Panics if the genome is not shaped for this problem.
    pub fn build(&self, genome: &mut Genome) -> u32 {
        let problem = self.problem;
        assert!(
            genome.fits(problem),
            "genome shape does not match problem ({} jobs)",
            problem.job_count()
        );

        let mut machine_free = vec![0u32; problem.machine_count()];
        let mut job_finish = vec![0u32; problem.job_count()];

        for i in 0..problem.max_operations() {
            for (j, row) in genome.rows.iter_mut().enumerate() {
                let Some(gene) = row.get_mut(i) else {
                    continue;
                };
                let m = gene.machine;
                let start = job_finish[j].max(machine_free[m]);
                let finish = start + problem.duration(j, i, m);
                gene.start = start;
                job_finish[j] = finish;
                machine_free[m] = finish;
            }
        }

        let makespan = job_finish.iter().copied().max().unwrap_or(0);
        genome.objective = makespan;
        makespan
    }
}
