//! Selection operators for genetic algorithms
//!
//! Implements tournament selection where individuals compete
//! in small tournaments, with the winner being selected for breeding.

use std::cmp::Ordering;

use pongevo_core::Chromosome;
use rand::seq::index;
use rand::Rng;

/// Tournament selection: select an individual by running a tournament.
///
/// Samples `tournament_size` distinct individuals (fewer if the pool is
/// smaller) and returns the one with the highest fitness. Ties go to the
/// first one sampled.
///
/// Returns `None` for an empty pool.
pub fn tournament_select<'a, R: Rng>(
    pool: &'a [Chromosome],
    tournament_size: usize,
    rng: &mut R,
) -> Option<&'a Chromosome> {
    if pool.is_empty() {
        return None;
    }

    let amount = tournament_size.clamp(1, pool.len());
    let mut best: Option<&Chromosome> = None;

    for idx in index::sample(rng, pool.len(), amount) {
        let candidate = &pool[idx];
        match best {
            Some(current) if candidate.fitness <= current.fitness => {}
            _ => best = Some(candidate),
        }
    }

    best
}

/// Select `count` parents via tournament selection.
///
/// Returns an empty vector for an empty pool.
pub fn select_parents<'a, R: Rng>(
    pool: &'a [Chromosome],
    count: usize,
    tournament_size: usize,
    rng: &mut R,
) -> Vec<&'a Chromosome> {
    (0..count)
        .filter_map(|_| tournament_select(pool, tournament_size, rng))
        .collect()
}

/// Compare by fitness, highest first
pub fn by_fitness_desc(a: &Chromosome, b: &Chromosome) -> Ordering {
    b.fitness.partial_cmp(&a.fitness).unwrap_or(Ordering::Equal)
}

/// Indices of the population ordered by fitness (descending).
///
/// Stable: equal fitness keeps population order.
pub fn rank_by_fitness(population: &[Chromosome]) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..population.len()).collect();
    indices.sort_by(|&a, &b| by_fitness_desc(&population[a], &population[b]));
    indices
}
