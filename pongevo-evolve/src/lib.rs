//! PONGEVO Evolution - Genetic engine for paddle chromosomes
//!
//! This crate provides the generational step:
//! - Selection (tournament)
//! - Crossover (single-point plus per-gene swap)
//! - Mutation (Gaussian, floor-clamped)
//! - Population replacement (top half survives, bottom half is replaced)

pub mod selection;
pub mod crossover;
pub mod mutation;

pub use selection::{tournament_select, select_parents, rank_by_fitness, by_fitness_desc};
pub use crossover::crossover;
pub use mutation::{mutate, mutate_genes};

use pongevo_core::Chromosome;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Evolution configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EvolutionConfig {
    /// Per-gene mutation probability
    pub mutation_rate: f64,
    /// Std-dev of the Gaussian mutation noise
    pub mutation_strength: f64,
    /// Individuals sampled per selection tournament
    pub tournament_size: usize,
    /// Per-gene swap probability after the crossover split
    pub gene_swap_rate: f64,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            mutation_rate: 0.1,
            mutation_strength: 0.2,
            tournament_size: 3,
            gene_swap_rate: 0.1,
        }
    }
}

impl EvolutionConfig {
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate;
        self
    }

    pub fn with_mutation_strength(mut self, strength: f64) -> Self {
        self.mutation_strength = strength;
        self
    }

    pub fn with_tournament_size(mut self, size: usize) -> Self {
        self.tournament_size = size;
        self
    }

    pub fn with_gene_swap_rate(mut self, rate: f64) -> Self {
        self.gene_swap_rate = rate;
        self
    }
}

// ============================================================================
// GENERATION STEP
// ============================================================================

/// Number of individuals kept from a population of `len`.
///
/// Half rounded down, but never zero for a non-empty population.
pub fn survivor_count(len: usize) -> usize {
    if len == 0 {
        0
    } else {
        (len / 2).max(1)
    }
}

/// Produce the next generation.
///
/// The population is ranked by fitness (stable, descending). The top half
/// survives with its statistics reset and its generation set to
/// `generation`. The rest is replaced by offspring of survivors chosen by
/// tournament selection, crossed over and mutated. The result has the
/// same length as the input: survivors first, then offspring.
pub fn evolve_population<R: Rng>(
    mut population: Vec<Chromosome>,
    generation: u32,
    config: &EvolutionConfig,
    rng: &mut R,
) -> Vec<Chromosome> {
    let target = population.len();
    let keep = survivor_count(target);

    population.sort_by(by_fitness_desc);
    population.truncate(keep);

    let mut survivors = population;
    for s in survivors.iter_mut() {
        s.reset_stats();
        s.generation = generation;
    }

    let needed = target - survivors.len();
    let mut offspring = Vec::with_capacity(needed + 1);

    while offspring.len() < needed {
        let parents = select_parents(&survivors, 2, config.tournament_size, rng);
        let (a, b) = match parents.as_slice() {
            [a, b] => (*a, *b),
            _ => break,
        };

        let (mut child_a, mut child_b) = crossover(a, b, generation, config.gene_swap_rate, rng);
        mutate(&mut child_a, config, rng);
        mutate(&mut child_b, config, rng);

        offspring.push(child_a);
        offspring.push(child_b);
    }
    offspring.truncate(needed);

    debug!(
        generation,
        survivors = survivors.len(),
        offspring = offspring.len(),
        "population evolved"
    );

    survivors.extend(offspring);
    survivors
}
