//! Fitness scoring from match statistics
//!
//! Level 3 - Steps

use pongevo_core::Chromosome;

/// Points per match won
pub const WIN_WEIGHT: f64 = 100.0;

/// Points per unit of point differential
pub const DIFFERENTIAL_WEIGHT: f64 = 10.0;

/// Points per point scored
pub const SCORED_WEIGHT: f64 = 1.0;

/// Fitness from raw statistics.
///
/// `wins * 100 + (scored - conceded) * 10 + scored`
pub fn fitness_from_stats(wins: u32, points_scored: u32, points_conceded: u32) -> f64 {
    let differential = points_scored as f64 - points_conceded as f64;
    wins as f64 * WIN_WEIGHT + differential * DIFFERENTIAL_WEIGHT + points_scored as f64 * SCORED_WEIGHT
}

/// Recompute and store a chromosome's fitness
pub fn calculate_fitness(chromosome: &mut Chromosome) -> f64 {
    chromosome.fitness = fitness_from_stats(
        chromosome.wins,
        chromosome.points_scored,
        chromosome.points_conceded,
    );
    chromosome.fitness
}
