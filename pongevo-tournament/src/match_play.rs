//! Match play - simulating games between two chromosomes
//!
//! Level 2 - Phase-level implementation

use pongevo_core::{Chromosome, MatchOutcome, PongGame, Side, SimConfig};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

/// Simulate one match to completion (Level 2 phase).
///
/// `left` plays the left paddle. The tick cap comes from `config.max_ticks`.
pub fn play_match<R: Rng>(
    left: &Chromosome,
    right: &Chromosome,
    config: &SimConfig,
    rng: &mut R,
) -> MatchOutcome {
    let mut game = PongGame::new(left, right, config.clone(), rng);
    game.run_to_completion(config.max_ticks, rng)
}

/// Aggregate of several independent games between the same two players
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SeriesResult {
    pub left_wins: u32,
    pub right_wins: u32,
    /// Games decided by the tick cap
    pub timeouts: u32,
    pub games_played: u32,
    /// Total ticks over all games
    pub total_ticks: u64,
}

impl SeriesResult {
    /// Result of a single game
    pub fn from_outcome(outcome: &MatchOutcome) -> Self {
        Self {
            left_wins: (outcome.winner == Side::Left) as u32,
            right_wins: (outcome.winner == Side::Right) as u32,
            timeouts: outcome.timed_out as u32,
            games_played: 1,
            total_ticks: outcome.ticks,
        }
    }

    /// Combine two results
    pub fn combine(&self, other: &SeriesResult) -> SeriesResult {
        SeriesResult {
            left_wins: self.left_wins + other.left_wins,
            right_wins: self.right_wins + other.right_wins,
            timeouts: self.timeouts + other.timeouts,
            games_played: self.games_played + other.games_played,
            total_ticks: self.total_ticks + other.total_ticks,
        }
    }

    pub fn left_win_rate(&self) -> f64 {
        if self.games_played == 0 {
            0.0
        } else {
            self.left_wins as f64 / self.games_played as f64
        }
    }

    pub fn avg_ticks(&self) -> f64 {
        if self.games_played == 0 {
            0.0
        } else {
            self.total_ticks as f64 / self.games_played as f64
        }
    }
}

/// Play `games` independent games in parallel.
///
/// Game `i` runs on its own `ChaCha8Rng` seeded with `seed + i`, so the
/// result does not depend on thread scheduling.
pub fn play_series_parallel(
    left: &Chromosome,
    right: &Chromosome,
    config: &SimConfig,
    games: u32,
    seed: u64,
) -> SeriesResult {
    (0..games)
        .into_par_iter()
        .map(|i| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(i as u64));
            SeriesResult::from_outcome(&play_match(left, right, config, &mut rng))
        })
        .reduce(SeriesResult::default, |a, b| a.combine(&b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(seed: u64) -> (Chromosome, Chromosome) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        (Chromosome::random(0, &mut rng), Chromosome::random(0, &mut rng))
    }

    #[test]
    fn test_play_match_reaches_terminal_state() {
        let (a, b) = pair(1);
        let config = SimConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(2);

        let outcome = play_match(&a, &b, &config, &mut rng);
        let (w, l) = match outcome.winner {
            Side::Left => (outcome.left_score, outcome.right_score),
            Side::Right => (outcome.right_score, outcome.left_score),
        };
        if outcome.timed_out {
            assert!(w >= l);
        } else {
            assert_eq!(w, config.winning_score);
            assert!(l < config.winning_score);
        }
        assert!(outcome.ticks <= config.max_ticks);
    }

    #[test]
    fn test_play_match_is_deterministic() {
        let (a, b) = pair(3);
        let config = SimConfig::default();

        let first = play_match(&a, &b, &config, &mut ChaCha8Rng::seed_from_u64(7));
        let second = play_match(&a, &b, &config, &mut ChaCha8Rng::seed_from_u64(7));
        assert_eq!(first, second);
    }

    #[test]
    fn test_series_counts() {
        let (a, b) = pair(4);
        let config = SimConfig::default().with_winning_score(2);

        let result = play_series_parallel(&a, &b, &config, 8, 100);
        assert_eq!(result.games_played, 8);
        assert_eq!(result.left_wins + result.right_wins, 8);
        assert!(result.avg_ticks() > 0.0);

        // Same seed, same aggregate regardless of scheduling
        assert_eq!(result, play_series_parallel(&a, &b, &config, 8, 100));
    }

    #[test]
    fn test_empty_series() {
        let (a, b) = pair(5);
        let result = play_series_parallel(&a, &b, &SimConfig::default(), 0, 0);
        assert_eq!(result, SeriesResult::default());
        assert_eq!(result.left_win_rate(), 0.0);
    }
}
