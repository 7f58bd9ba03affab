//! Match command - play repeated games between two random chromosomes
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: create_contestants(), play_series_parallel(), report_results()
//! - Level 4: formatting utilities

use anyhow::Result;
use clap::Args;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use pongevo_core::{Chromosome, ChromosomeSnapshot, SimConfig};
use pongevo_tournament::{play_series_parallel, SeriesResult};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct MatchArgs {
    /// Number of games to play
    #[arg(long, default_value = "100")]
    pub games: u32,

    /// Points needed to win a game
    #[arg(long, default_value = "5")]
    pub winning_score: u32,

    /// Tick cap per game
    #[arg(long, default_value = "10000")]
    pub max_ticks: u64,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run match command
///
/// This function reads like a table of contents:
/// 1. Create two random contestants
/// 2. Play all games in parallel, one seeded RNG per game
/// 3. Report results
pub fn run(args: MatchArgs, seed: Option<u64>) -> Result<()> {
    let mut rng = create_rng(seed);
    let (left, right) = create_contestants(&mut rng);
    let series_seed: u64 = rng.gen();

    let config = SimConfig::default()
        .with_winning_score(args.winning_score)
        .with_max_ticks(args.max_ticks);

    tracing::info!(
        "Starting match: {} vs {} ({} games)",
        left.name(),
        right.name(),
        args.games
    );

    let result = play_series_parallel(&left, &right, &config, args.games, series_seed);

    report_results(&left, &right, &result, &args)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn create_contestants(rng: &mut ChaCha8Rng) -> (Chromosome, Chromosome) {
    (Chromosome::random(0, rng), Chromosome::random(0, rng))
}

fn report_results(left: &Chromosome, right: &Chromosome, result: &SeriesResult, args: &MatchArgs) -> Result<()> {
    if args.json {
        print_json_results(left, right, result)
    } else {
        print_text_results(left, right, result);
        Ok(())
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

/// Create RNG from seed or random
fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    }
}

fn percent(count: u32, total: u32) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

fn print_json_results(left: &Chromosome, right: &Chromosome, result: &SeriesResult) -> Result<()> {
    #[derive(Serialize)]
    struct JsonOutput {
        left: ChromosomeSnapshot,
        right: ChromosomeSnapshot,
        games_played: u32,
        left_wins: u32,
        right_wins: u32,
        timeouts: u32,
        left_win_rate: f64,
        avg_ticks: f64,
    }

    let output = JsonOutput {
        left: left.snapshot(),
        right: right.snapshot(),
        games_played: result.games_played,
        left_wins: result.left_wins,
        right_wins: result.right_wins,
        timeouts: result.timeouts,
        left_win_rate: result.left_win_rate(),
        avg_ticks: result.avg_ticks(),
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_text_results(left: &Chromosome, right: &Chromosome, result: &SeriesResult) {
    let total = result.games_played;

    println!("\n=== Match Results ===");
    println!("Left:  {}", describe(left));
    println!("Right: {}", describe(right));
    println!("Total games: {}", total);
    println!("Left wins:   {} ({:.1}%)", result.left_wins, percent(result.left_wins, total));
    println!("Right wins:  {} ({:.1}%)", result.right_wins, percent(result.right_wins, total));
    println!("Timeouts:    {} ({:.1}%)", result.timeouts, percent(result.timeouts, total));
    println!("Avg ticks:   {:.1}", result.avg_ticks());
}

fn describe(c: &Chromosome) -> String {
    format!(
        "{} [react {:.2} predict {:.2} aggr {:.2} noise {:.2} speed {:.2} antic {:.2}]",
        c.name(),
        c.reaction_time(),
        c.prediction_depth(),
        c.aggression(),
        c.noise_tolerance(),
        c.speed_scaling(),
        c.anticipation()
    )
}

// ============================================================================
// TESTS
// ============================================================================
