//! Textual `.dat` problem format.
//!
//! ```text
//! magic 1337
//! numJobs 2
//! numMachines 2
//! job {
//!     numOperations 2
//!     3 5
//!     2 4
//! }
//! job {
//!     numOperations 2
//!     4 2
//!     3 3
//! }
//! ```
//!
//! Each line inside a `job { }` block after `numOperations` lists the
//! durations of one operation on machines `0..numMachines`.

use std::path::Path;

use log::debug;

use super::model::{Job, Operation, Problem};
use crate::error::ProblemError;

const MAGIC: i64 = 1337;

impl Problem {
    /// Reads and parses a problem file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ProblemError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ProblemError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let problem = Self::parse(&text)?;
        debug!(
            "loaded {:?}: {} jobs, {} machines, {} operations",
            path,
            problem.job_count(),
            problem.machine_count(),
            problem.total_operations()
        );
        Ok(problem)
    }

    /// Parses a problem from its textual description.
    pub fn parse(text: &str) -> Result<Self, ProblemError> {
        let mut job_count: Option<usize> = None;
        let mut machine_count: Option<usize> = None;
        let mut jobs: Vec<Job> = Vec::new();
        // (declared operation count, operations parsed so far)
        let mut open: Option<(Option<usize>, Vec<Operation>)> = None;

        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }

            if let Some((mut declared, mut ops)) = open.take() {
                if line.starts_with('}') {
                    if let Some(n) = declared {
                        if n != ops.len() {
                            return Err(parse_error(
                                line_no,
                                format!("numOperations is {n} but {} cost lines follow", ops.len()),
                            ));
                        }
                    }
                    jobs.push(Job::new(ops));
                    continue;
                }

                if let Some(rest) = line.strip_prefix("numOperations") {
                    declared = Some(parse_number(rest, line_no)?);
                } else {
                    let width = machine_count.ok_or(ProblemError::MissingHeader("numMachines"))?;
                    let costs = parse_costs(line, line_no)?;
                    if costs.len() != width {
                        return Err(ProblemError::CostWidth {
                            job: jobs.len(),
                            operation: ops.len(),
                            expected: width,
                            found: costs.len(),
                        });
                    }
                    ops.push(Operation::new(costs));
                }
                open = Some((declared, ops));
                continue;
            }

            if let Some(rest) = line.strip_prefix("magic") {
                let magic: i64 = rest
                    .trim()
                    .parse()
                    .map_err(|_| parse_error(line_no, format!("invalid magic `{}`", rest.trim())))?;
                if magic != MAGIC {
                    return Err(ProblemError::BadMagic(magic));
                }
            } else if let Some(rest) = line.strip_prefix("numJobs") {
                job_count = Some(parse_number(rest, line_no)?);
            } else if let Some(rest) = line.strip_prefix("numMachines") {
                machine_count = Some(parse_number(rest, line_no)?);
            } else if line.starts_with("job") && line.ends_with('{') {
                open = Some((None, Vec::new()));
            }
        }

        if open.is_some() {
            return Err(parse_error(text.lines().count(), "unterminated job block".into()));
        }

        let expected = job_count.ok_or(ProblemError::MissingHeader("numJobs"))?;
        let machine_count = machine_count.ok_or(ProblemError::MissingHeader("numMachines"))?;
        if expected != jobs.len() {
            return Err(ProblemError::JobCount {
                expected,
                found: jobs.len(),
            });
        }

        Problem::new(machine_count, jobs)
    }
}

fn parse_error(line: usize, message: String) -> ProblemError {
    ProblemError::Parse { line, message }
}

fn parse_number(field: &str, line: usize) -> Result<usize, ProblemError> {
    let field = field.trim();
    field
        .parse()
        .map_err(|_| parse_error(line, format!("expected a non-negative integer, found `{field}`")))
}

fn parse_costs(line: &str, line_no: usize) -> Result<Vec<u32>, ProblemError> {
    line.split_whitespace()
        .map(|tok| {
            tok.parse::<u32>()
                .map_err(|_| parse_error(line_no, format!("invalid duration `{tok}`")))
        })
        .collect()
}
