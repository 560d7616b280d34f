//! Schedule export.
//!
//! Flattens a decoded genome into one [`ScheduleEntry`] per operation and
//! renders the entries as a MATLAB/Octave script that draws a Gantt chart
//! through a `plotgantt(T, machine_count)` helper.

use rand::Rng;
use std::io::{self, Write};

use crate::ga::Genome;
use crate::problem::Problem;

/// One scheduled operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScheduleEntry {
    /// Job index (0-based).
    pub job: usize,
    /// Operation position within the job (0-based).
    pub position: usize,
    /// Assigned machine index.
    pub machine: usize,
    /// Start time.
    pub start: u32,
    /// Processing time on the assigned machine.
    pub duration: u32,
}

impl ScheduleEntry {
    /// Completion time.
    pub fn finish(&self) -> u32 {
        self.start + self.duration
    }
}

/// Flattens `genome` into entries in job/position order.
///
/// `genome` must be decoded (start times computed) for the entries to be
/// meaningful.
///
/// # Panics
/// Panics if `genome` does not fit `problem`.
pub fn schedule_entries(problem: &Problem, genome: &Genome) -> Vec<ScheduleEntry> {
    assert!(genome.fits(problem), "genome shape does not match problem");
    genome
        .rows()
        .iter()
        .enumerate()
        .flat_map(|(job, row)| {
            row.iter().enumerate().map(move |(position, gene)| ScheduleEntry {
                job,
                position,
                machine: gene.machine,
                start: gene.start,
                duration: problem.duration(job, position, gene.machine),
            })
        })
        .collect()
}

/// A schedule ready for visualisation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GanttExport {
    /// Number of machines in the problem.
    pub machine_count: usize,
    /// Scheduled operations in job/position order.
    pub entries: Vec<ScheduleEntry>,
}

impl GanttExport {
    /// Exports a decoded genome.
    pub fn new(problem: &Problem, genome: &Genome) -> Self {
        Self {
            machine_count: problem.machine_count(),
            entries: schedule_entries(problem, genome),
        }
    }

    /// Latest completion time over all entries.
    pub fn makespan(&self) -> u32 {
        self.entries.iter().map(ScheduleEntry::finish).max().unwrap_or(0)
    }

    /// Writes the Gantt script.
    ///
    /// `colors[job]` is the RGB colour (components in `[0, 1]`) of every bar
    /// of that job. Operation names are 1-based `job/operation`.
    ///
    /// # Panics
    /// Panics if a job has no colour.
    pub fn write_gantt_script<W: Write>(&self, colors: &[[f64; 3]], out: &mut W) -> io::Result<()> {
        let mut current_job = None;
        for e in &self.entries {
            if current_job != Some(e.job) {
                if current_job.is_some() {
                    writeln!(out)?;
                }
                let [r, g, b] = colors[e.job];
                writeln!(out, "color = [{r:.6} {g:.6} {b:.6}];")?;
                current_job = Some(e.job);
            }
            writeln!(
                out,
                "T{}_{} = struct('StartTime', {}, 'ProcTime', {}, 'Machine', {}, 'Name', '{}/{}', 'Color', color);",
                e.job,
                e.position,
                e.start,
                e.duration,
                e.machine,
                e.job + 1,
                e.position + 1
            )?;
        }
        if current_job.is_some() {
            writeln!(out)?;
        }

        write!(out, "\nT=[")?;
        for e in &self.entries {
            write!(out, " T{}_{}", e.job, e.position)?;
        }
        writeln!(out, " ];")?;
        writeln!(out, "plotgantt(T, {});", self.machine_count)
    }
}

/// One random RGB colour per job, each component uniform in `[0, 1)`.
pub fn random_job_colors<R: Rng>(job_count: usize, rng: &mut R) -> Vec<[f64; 3]> {
    (0..job_count)
        .map(|_| [rng.random(), rng.random(), rng.random()])
        .collect()
}
