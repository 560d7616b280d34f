//! Population models and replacement policies.
//!
//! After reproduction has filled the scratch buffer, the population model
//! decides how the offspring enter the active population:
//!
//! - **Generational**: the offspring *are* the next population; optional
//!   genitor elitism reinstates the previous best.
//! - **Steady-state elitist**: sorted offspring overwrite the worst part of
//!   the active population only where they are better.
//! - **Steady-state excess** ("4+3"): like elitist, but more offspring than
//!   parents are bred and a coefficient picks how much of the population is
//!   open to replacement.
//! - **Steady-state uniform**: each offspring overwrites a distinct random slot.
//!
//! # References
//!
//! - Whitley (1989), "The GENITOR Algorithm and Selection Pressure"
//! - Syswerda (1991), "A Study of Reproduction in Generational and
//!   Steady-State Genetic Algorithms"

use log::trace;
use rand::Rng;

use super::population::DoubleBuffer;
use super::types::Genome;

/// How offspring replace the active population.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PopulationModel {
    /// Whole-generation replacement.
    Generational {
        /// Keep the previous best when the new generation lost it.
        genitor: bool,
    },

    /// Each of `temp_size` offspring replaces a distinct random slot.
    SteadyStateUniform {
        /// Offspring per step, in `[1, population_size]`.
        temp_size: usize,
    },

    /// `temp_size` sorted offspring replace worse genomes among the worst
    /// `temp_size` slots.
    SteadyStateElitist {
        /// Offspring per step, in `[1, population_size]`.
        temp_size: usize,
    },

    /// `temp_size` sorted offspring replace worse genomes among the worst
    /// `floor(replace_coefficient · population_size)` slots.
    SteadyStateExcess {
        /// Offspring per step, strictly greater than `population_size`.
        temp_size: usize,
        /// Share of the population open to replacement, in `[0, 1]`.
        replace_coefficient: f64,
    },
}

impl Default for PopulationModel {
    fn default() -> Self {
        PopulationModel::Generational { genitor: true }
    }
}

impl PopulationModel {
    /// Short name for logs and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            PopulationModel::Generational { .. } => "generational",
            PopulationModel::SteadyStateUniform { .. } => "uniform",
            PopulationModel::SteadyStateElitist { .. } => "elitist",
            PopulationModel::SteadyStateExcess { .. } => "excess",
        }
    }

    /// Whether this is a steady-state model.
    pub fn is_steady_state(&self) -> bool {
        !matches!(self, PopulationModel::Generational { .. })
    }

    /// Size of the scratch buffer for a population of `population_size`.
    pub fn scratch_size(&self, population_size: usize) -> usize {
        match *self {
            PopulationModel::Generational { .. } => population_size,
            PopulationModel::SteadyStateUniform { temp_size }
            | PopulationModel::SteadyStateElitist { temp_size }
            | PopulationModel::SteadyStateExcess { temp_size, .. } => temp_size,
        }
    }

    /// Merges the freshly bred scratch buffer into the population.
    ///
    /// On return `buffers.active()` holds the new population; it is not yet
    /// sorted.
    pub fn replace<R: Rng>(&self, buffers: &mut DoubleBuffer, rng: &mut R) {
        match *self {
            PopulationModel::Generational { genitor } => {
                buffers.promote_scratch();
                if genitor {
                    let (active, previous) = buffers.roles_mut();
                    reinstate_best(previous, active);
                }
            }
            PopulationModel::SteadyStateUniform { .. } => {
                let (active, scratch) = buffers.roles_mut();
                replace_uniform(active, scratch, rng);
            }
            PopulationModel::SteadyStateElitist { .. } => {
                let (active, scratch) = buffers.roles_mut();
                let start = active.len().saturating_sub(scratch.len());
                replace_sorted(active, scratch, start);
            }
            PopulationModel::SteadyStateExcess {
                replace_coefficient,
                ..
            } => {
                let (active, scratch) = buffers.roles_mut();
                let n = active.len();
                let open = (replace_coefficient.clamp(0.0, 1.0) * n as f64).floor() as usize;
                replace_sorted(active, scratch, n - open.min(n));
            }
        }
    }
}

/// Genitor elitism: if the previous generation's best beats the new best,
/// copy it over the new generation's worst slot.
fn reinstate_best(previous: &[Genome], next: &mut [Genome]) {
    let old_best = best_index(previous);
    let new_best = best_index(next);
    if previous[old_best].objective < next[new_best].objective {
        let worst = worst_index(next);
        trace!(
            "genitor: slot {worst} ({}) <- previous best ({})",
            next[worst].objective,
            previous[old_best].objective
        );
        next[worst].clone_from(&previous[old_best]);
    }
}

/// Sorts `scratch` and sweeps it against `active[start..]` (sorted
/// ascending): whenever an active genome is worse than the next offspring
/// it is overwritten and the offspring consumed.
fn replace_sorted(active: &mut [Genome], scratch: &mut [Genome], start: usize) {
    scratch.sort_by_key(|g| g.objective);
    let mut j = 0;
    for slot in active[start..].iter_mut() {
        if j >= scratch.len() {
            break;
        }
        if slot.objective > scratch[j].objective {
            slot.clone_from(&scratch[j]);
            j += 1;
        }
    }
    trace!("sorted reinsertion: {j} of {} offspring accepted", scratch.len());
}

/// Each offspring overwrites a distinct, uniformly drawn slot.
fn replace_uniform<R: Rng>(active: &mut [Genome], scratch: &[Genome], rng: &mut R) {
    let n = active.len();
    assert!(
        scratch.len() <= n,
        "uniform reinsertion needs at most {n} offspring, got {}",
        scratch.len()
    );
    let mut taken = vec![false; n];
    for child in scratch {
        let slot = loop {
            let pick = rng.random_range(0..n);
            if !taken[pick] {
                break pick;
            }
        };
        taken[slot] = true;
        active[slot].clone_from(child);
    }
}

/// First slot holding the smallest objective.
pub(crate) fn best_index(population: &[Genome]) -> usize {
    let mut idx = 0;
    for (i, g) in population.iter().enumerate() {
        if g.objective < population[idx].objective {
            idx = i;
        }
    }
    idx
}

/// First slot holding the largest objective.
pub(crate) fn worst_index(population: &[Genome]) -> usize {
    let mut idx = 0;
    for (i, g) in population.iter().enumerate() {
        if g.objective > population[idx].objective {
            idx = i;
        }
    }
    idx
}
