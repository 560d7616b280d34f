//! Problem data model and validation.

use crate::error::ProblemError;

/// One operation: its processing time on every machine.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Operation {
    /// `costs[m]` is the duration when processed on machine `m`.
    pub costs: Vec<u32>,
}

impl Operation {
    /// Creates an operation from its per-machine durations.
    pub fn new(costs: Vec<u32>) -> Self {
        Self { costs }
    }
}

/// A job: operations that must run in order.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Job {
    /// Operations in precedence order.
    pub operations: Vec<Operation>,
}

impl Job {
    /// Creates a job from its operations.
    pub fn new(operations: Vec<Operation>) -> Self {
        Self { operations }
    }

    /// Convenience constructor from a cost matrix (`costs[position][machine]`).
    pub fn from_costs(costs: Vec<Vec<u32>>) -> Self {
        Self::new(costs.into_iter().map(Operation::new).collect())
    }

    /// Number of operations in this job.
    pub fn operation_count(&self) -> usize {
        self.operations.len()
    }
}

/// A validated flexible job-shop instance.
///
/// # Examples
///
/// ```
/// use u_fjsp::problem::{Job, Problem};
///
/// let problem = Problem::new(2, vec![
///     Job::from_costs(vec![vec![3, 5], vec![2, 4]]),
///     Job::from_costs(vec![vec![4, 2], vec![3, 3]]),
/// ]).unwrap();
/// assert_eq!(problem.max_operations(), 2);
/// assert_eq!(problem.duration(1, 0, 1), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Problem {
    jobs: Vec<Job>,
    machine_count: usize,
    max_operations: usize,
}

impl Problem {
    /// Builds a problem, checking that it is well formed.
    ///
    /// Requires at least one job and one machine, at least one operation per
    /// job, and exactly `machine_count` costs per operation. The sum over all
    /// operations of their largest cost bounds every start and finish time
    /// and must fit in `u32`.
    pub fn new(machine_count: usize, jobs: Vec<Job>) -> Result<Self, ProblemError> {
        if jobs.is_empty() || machine_count == 0 {
            return Err(ProblemError::Empty);
        }
        for (j, job) in jobs.iter().enumerate() {
            if job.operations.is_empty() {
                return Err(ProblemError::EmptyJob(j));
            }
            for (k, op) in job.operations.iter().enumerate() {
                if op.costs.len() != machine_count {
                    return Err(ProblemError::CostWidth {
                        job: j,
                        operation: k,
                        expected: machine_count,
                        found: op.costs.len(),
                    });
                }
            }
        }
        let horizon: u64 = jobs
            .iter()
            .flat_map(|job| &job.operations)
            .map(|op| op.costs.iter().copied().max().unwrap_or(0) as u64)
            .sum();
        if horizon > u32::MAX as u64 {
            return Err(ProblemError::HorizonOverflow(horizon));
        }

        let max_operations = jobs
            .iter()
            .map(Job::operation_count)
            .max()
            .unwrap_or(0);

        Ok(Self {
            jobs,
            machine_count,
            max_operations,
        })
    }

    /// Jobs in problem order.
    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    /// Number of jobs.
    pub fn job_count(&self) -> usize {
        self.jobs.len()
    }

    /// Number of machines.
    pub fn machine_count(&self) -> usize {
        self.machine_count
    }

    /// Largest operation count over all jobs.
    pub fn max_operations(&self) -> usize {
        self.max_operations
    }

    /// Total number of operations in the instance.
    pub fn total_operations(&self) -> usize {
        self.jobs.iter().map(Job::operation_count).sum()
    }

    /// Duration of operation `position` of `job` on `machine`.
    ///
    /// # Panics
    /// Panics if any index is out of range.
    #[inline]
    pub fn duration(&self, job: usize, position: usize, machine: usize) -> u32 {
        self.jobs[job].operations[position].costs[machine]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_by_two() -> Vec<Job> {
        vec![
            Job::from_costs(vec![vec![3, 5], vec![2, 4]]),
            Job::from_costs(vec![vec![4, 2], vec![3, 3]]),
        ]
    }

    #[test]
    fn test_new_valid() {
        let p = Problem::new(2, two_by_two()).unwrap();
        assert_eq!(p.job_count(), 2);
        assert_eq!(p.machine_count(), 2);
        assert_eq!(p.max_operations(), 2);
        assert_eq!(p.total_operations(), 4);
        assert_eq!(p.duration(0, 1, 1), 4);
    }

    #[test]
    fn test_ragged_jobs() {
        let jobs = vec![
            Job::from_costs(vec![vec![1, 1]]),
            Job::from_costs(vec![vec![1, 1], vec![2, 2], vec![3, 3]]),
        ];
        let p = Problem::new(2, jobs).unwrap();
        assert_eq!(p.max_operations(), 3);
        assert_eq!(p.total_operations(), 4);
    }

    #[test]
    fn test_rejects_empty() {
        assert!(matches!(Problem::new(2, vec![]), Err(ProblemError::Empty)));
        assert!(matches!(
            Problem::new(0, two_by_two()),
            Err(ProblemError::Empty)
        ));
    }

    #[test]
    fn test_rejects_empty_job() {
        let jobs = vec![Job::from_costs(vec![vec![1]]), Job::new(vec![])];
        assert!(matches!(
            Problem::new(1, jobs),
            Err(ProblemError::EmptyJob(1))
        ));
    }

    #[test]
    fn test_rejects_cost_width() {
        let jobs = vec![Job::from_costs(vec![vec![1, 2], vec![3]])];
        match Problem::new(2, jobs) {
            Err(ProblemError::CostWidth {
                job,
                operation,
                expected,
                found,
            }) => {
                assert_eq!((job, operation, expected, found), (0, 1, 2, 1));
            }
            other => panic!("expected CostWidth, got {other:?}"),
        }
    }

    #[test]
    fn test_rejects_horizon_overflow() {
        let jobs = vec![Job::from_costs(vec![vec![3_000_000_000, 1], vec![3_000_000_000, 2]])];
        assert!(matches!(
            Problem::new(2, jobs),
            Err(ProblemError::HorizonOverflow(6_000_000_000))
        ));

        // exactly at the limit is accepted
        let jobs = vec![Job::from_costs(vec![vec![u32::MAX - 1], vec![1]])];
        assert!(Problem::new(1, jobs).is_ok());
    }
}
