//! Variation operators for machine-assignment genomes.
//!
//! Both crossovers exchange whole genes between parents and then let the
//! [`ScheduleBuilder`] recompute the children's start times, so every child
//! is a valid schedule by construction.
//!
//! # Crossover Operators
//!
//! - [`Crossover::Row`]: one job's assignments from one parent, all other
//!   jobs from the other
//! - [`Crossover::Column`]: one operation position across all jobs from one
//!   parent, every other position from the other
//!
//! # Mutation
//!
//! - [`mutate`]: move one operation from the most loaded machine to the
//!   least loaded one
//!
//! # References
//!
//! - Kacem, Hammadi & Borne (2002), "Approach by localization and
//!   multiobjective evolutionary optimization for flexible job-shop
//!   scheduling problems"

use rand::Rng;

use super::schedule::ScheduleBuilder;
use super::types::Genome;

/// Crossover operator applied to one mating event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Crossover {
    /// Exchange at the job level.
    Row,
    /// Exchange at the operation-position level.
    Column,
}

impl Crossover {
    /// Picks the operator for one mating event: [`Column`](Self::Column)
    /// with probability `column_probability`, otherwise [`Row`](Self::Row).
    pub fn choose<R: Rng>(column_probability: f64, rng: &mut R) -> Self {
        if rng.random::<f64>() < column_probability {
            Crossover::Column
        } else {
            Crossover::Row
        }
    }

    /// Recombines `mom` and `dad` into `kid1` and, if given, `kid2`.
    ///
    /// `kid1` inherits the cut (job or position) from `mom` and everything
    /// else from `dad`; `kid2` the reverse. Both children are decoded.
    pub fn apply<R: Rng>(
        self,
        builder: &ScheduleBuilder<'_>,
        mom: &Genome,
        dad: &Genome,
        kid1: &mut Genome,
        kid2: Option<&mut Genome>,
        rng: &mut R,
    ) {
        match self {
            Crossover::Row => row_crossover(builder, mom, dad, kid1, kid2, rng),
            Crossover::Column => column_crossover(builder, mom, dad, kid1, kid2, rng),
        }
    }
}

/// Row crossover: pick a random job `r`; for job `r` `kid1` copies `mom`
/// and `kid2` copies `dad`, for every other job the other way round.
pub fn row_crossover<R: Rng>(
    builder: &ScheduleBuilder<'_>,
    mom: &Genome,
    dad: &Genome,
    kid1: &mut Genome,
    kid2: Option<&mut Genome>,
    rng: &mut R,
) {
    let jobs = builder.problem().job_count();
    let cut = rng.random_range(0..jobs);

    fill_rows(kid1, mom, dad, cut);
    builder.build(kid1);
    if let Some(kid2) = kid2 {
        fill_rows(kid2, dad, mom, cut);
        builder.build(kid2);
    }
}

/// Column crossover: pick a random position `p`; in every job `kid1` takes
/// `mom`'s gene at `p` and `dad`'s elsewhere, `kid2` the reverse.
pub fn column_crossover<R: Rng>(
    builder: &ScheduleBuilder<'_>,
    mom: &Genome,
    dad: &Genome,
    kid1: &mut Genome,
    kid2: Option<&mut Genome>,
    rng: &mut R,
) {
    let positions = builder.problem().max_operations();
    let cut = rng.random_range(0..positions);

    fill_columns(kid1, mom, dad, cut);
    builder.build(kid1);
    if let Some(kid2) = kid2 {
        fill_columns(kid2, dad, mom, cut);
        builder.build(kid2);
    }
}

fn fill_rows(kid: &mut Genome, at_cut: &Genome, elsewhere: &Genome, cut: usize) {
    for (j, row) in kid.rows.iter_mut().enumerate() {
        let src = if j == cut { at_cut } else { elsewhere };
        row.clone_from(&src.rows[j]);
    }
    kid.fitness = 0.0;
}

fn fill_columns(kid: &mut Genome, at_cut: &Genome, elsewhere: &Genome, cut: usize) {
    for (j, row) in kid.rows.iter_mut().enumerate() {
        row.clone_from(&elsewhere.rows[j]);
        if let Some(gene) = row.get_mut(cut) {
            *gene = at_cut.rows[j][cut];
        }
    }
    kid.fitness = 0.0;
}

/// Load-balancing mutation.
///
/// Sums the assigned durations per machine, picks one operation uniformly
/// among those on the most loaded machine and moves it to the least loaded
/// machine, then re-decodes. Ties resolve to the lowest machine index.
/// Nothing changes when the most loaded machine has no operations, which
/// can only happen when every load is zero.
pub fn mutate<R: Rng>(builder: &ScheduleBuilder<'_>, genome: &mut Genome, rng: &mut R) {
    let problem = builder.problem();
    let mut load = vec![0u64; problem.machine_count()];
    for (j, row) in genome.rows.iter().enumerate() {
        for (k, gene) in row.iter().enumerate() {
            load[gene.machine] += problem.duration(j, k, gene.machine) as u64;
        }
    }

    let busiest = first_extreme(&load, |a, b| a > b);
    let idlest = first_extreme(&load, |a, b| a < b);

    let candidates: Vec<(usize, usize)> = genome
        .rows
        .iter()
        .enumerate()
        .flat_map(|(j, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, gene)| gene.machine == busiest)
                .map(move |(k, _)| (j, k))
        })
        .collect();

    let pick = match candidates.len() {
        0 => return,
        1 => 0,
        n => rng.random_range(0..n),
    };
    let (j, k) = candidates[pick];
    genome.rows[j][k].machine = idlest;
    builder.build(genome);
}

/// Index of the first element that no later element beats under `better`.
fn first_extreme(values: &[u64], better: impl Fn(u64, u64) -> bool) -> usize {
    let mut idx = 0;
    for (i, &v) in values.iter().enumerate() {
        if better(v, values[idx]) {
            idx = i;
        }
    }
    idx
}
