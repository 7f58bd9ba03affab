//! Run command - drive tournaments and evolution to completion
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: build_manager_config(), run_tournaments(), save_report()
//! - Level 3: simulate_match(), tournament_progress()
//! - Level 4: formatting utilities

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use pongevo_core::{ChromosomeSnapshot, MatchOutcome, PongGame, SimConfig};
use pongevo_evolve::EvolutionConfig;
use pongevo_tournament::{play_match, ManagerConfig, ManagerSnapshot, Match, TournamentManager};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct RunArgs {
    /// Population size
    #[arg(long, default_value = "32")]
    pub population: usize,

    /// Number of tournaments (generations) to run
    #[arg(long, default_value = "1")]
    pub tournaments: usize,

    /// Points needed to win a match
    #[arg(long, default_value = "5")]
    pub winning_score: u32,

    /// Tick cap per match
    #[arg(long, default_value = "10000")]
    pub max_ticks: u64,

    /// Per-gene mutation probability
    #[arg(long, default_value = "0.1")]
    pub mutation_rate: f64,

    /// Std-dev of mutation noise
    #[arg(long, default_value = "0.2")]
    pub mutation_strength: f64,

    /// Emit a frame snapshot at trace level every K ticks (0 = off)
    #[arg(long, default_value = "0")]
    pub frame_every: u64,

    /// Print the final report as JSON
    #[arg(long)]
    pub json: bool,

    /// Write the final report to a JSON file
    #[arg(long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Champion of one generation
#[derive(Clone, Debug, Serialize)]
struct ChampionRecord {
    generation: u32,
    champion: Option<ChromosomeSnapshot>,
}

/// Counters accumulated over the whole run
#[derive(Clone, Debug, Default, Serialize)]
struct RunStats {
    matches_played: u64,
    timeouts: u64,
    total_ticks: u64,
    champions: Vec<ChampionRecord>,
}

impl RunStats {
    fn observe(&mut self, outcome: &MatchOutcome) {
        self.matches_played += 1;
        self.total_ticks += outcome.ticks;
        if outcome.timed_out {
            self.timeouts += 1;
        }
    }

    fn avg_ticks(&self) -> f64 {
        if self.matches_played == 0 {
            0.0
        } else {
            self.total_ticks as f64 / self.matches_played as f64
        }
    }
}

/// Everything written by `--output` / `--json`
#[derive(Debug, Serialize)]
struct RunReport {
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
    seed: Option<u64>,
    config: ManagerConfig,
    stats: RunStats,
    state: ManagerSnapshot,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run tournaments command
///
/// This function reads like a table of contents:
/// 1. Build the manager configuration
/// 2. Initialize the population and start the run
/// 3. Drive every match until the last tournament completes
/// 4. Report and optionally save results
pub fn run(args: RunArgs, seed: Option<u64>) -> Result<()> {
    let config = build_manager_config(&args, seed);
    let mut manager = TournamentManager::new(config.clone());

    tracing::info!(
        "Starting run: population={}, tournaments={}, seed={:?}",
        args.population,
        args.tournaments,
        seed
    );

    let started_at = Utc::now();
    manager.initialize(args.population)?;
    manager.start(args.tournaments)?;

    let stats = run_tournaments(&mut manager, &args)?;

    let report = RunReport {
        started_at,
        finished_at: Utc::now(),
        seed,
        config,
        stats,
        state: manager.get_state(),
    };

    if let Some(path) = &args.output {
        save_report(&report, path)?;
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report);
    }

    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Map command arguments onto the manager configuration
fn build_manager_config(args: &RunArgs, seed: Option<u64>) -> ManagerConfig {
    let sim = SimConfig::default()
        .with_winning_score(args.winning_score)
        .with_max_ticks(args.max_ticks);
    let evolution = EvolutionConfig::default()
        .with_mutation_rate(args.mutation_rate)
        .with_mutation_strength(args.mutation_strength);

    let config = ManagerConfig::default()
        .with_population_size(args.population)
        .with_sim(sim)
        .with_evolution(evolution);

    match seed {
        Some(s) => config.with_seed(s),
        None => config,
    }
}

/// The driver loop: next match, simulate, record, check completion
fn run_tournaments(manager: &mut TournamentManager, args: &RunArgs) -> Result<RunStats> {
    let mut stats = RunStats::default();
    let mut progress = tournament_progress(manager)?;

    loop {
        let next = manager.get_next_match()?;
        if let Some(m) = next {
            let outcome = simulate_match(manager, &m, args.frame_every)?;
            manager.record_match(m.id, outcome.winner, outcome.left_score, outcome.right_score)?;
            stats.observe(&outcome);
            progress.inc(1);
        }

        let generation = manager.generation();
        let finished = manager.check_tournament_complete()?;

        if finished || manager.generation() != generation {
            progress.finish_and_clear();
            stats.champions.push(announce_champion(manager, generation));
            if finished {
                return Ok(stats);
            }
            progress = tournament_progress(manager)?;
        } else if next.is_none() {
            bail!("bracket stalled: no playable match in generation {}", generation);
        }
    }
}

/// Write the report as pretty JSON
fn save_report(report: &RunReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let json = serde_json::to_string_pretty(report).context("Failed to serialize report")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write report: {}", path.display()))?;
    tracing::info!("Saved report to {}", path.display());

    Ok(())
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// Simulate one bracket match with the manager's random source.
///
/// With `frame_every > 0` the game is ticked here so frames can be sampled.
fn simulate_match(manager: &mut TournamentManager, m: &Match, frame_every: u64) -> Result<MatchOutcome> {
    let (left, right) = manager
        .contestants(m)
        .with_context(|| format!("Match {} has unassigned players", m.id))?;
    let (left, right) = (left.clone(), right.clone());
    let sim = manager.config().sim.clone();
    let rng = manager.rng_mut();

    if frame_every == 0 {
        return Ok(play_match(&left, &right, &sim, rng));
    }

    let mut game = PongGame::new(&left, &right, sim.clone(), rng);
    while !game.game_over && game.ticks < sim.max_ticks {
        game.update(rng);
        if game.ticks % frame_every == 0 {
            let frame = serde_json::to_string(&game.snapshot())?;
            tracing::trace!(match_id = m.id, tick = game.ticks, %frame, "frame");
        }
    }
    game.force_finish();

    game.outcome()
        .with_context(|| format!("Match {} ended without a winner", m.id))
}

/// Progress bar sized to the playable matches of the active bracket
fn tournament_progress(manager: &TournamentManager) -> Result<ProgressBar> {
    let playable = manager
        .tournament()
        .map(|t| t.matches().filter(|m| !m.completed).count())
        .unwrap_or(0);

    let pb = ProgressBar::new(playable as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{prefix} [{bar:40}] {pos}/{len} matches ({elapsed})")?
            .progress_chars("=> "),
    );
    pb.set_prefix(format!("Generation {}", manager.generation()));
    Ok(pb)
}

/// Log the champion of the tournament that just finished
fn announce_champion(manager: &TournamentManager, generation: u32) -> ChampionRecord {
    let champion = manager
        .history()
        .last()
        .filter(|h| h.generation == generation)
        .and_then(|h| h.champion.clone());

    match &champion {
        Some(c) => tracing::info!(
            "Generation {} champion: {} ({}W/{}L, fitness {:.1})",
            generation,
            c.name,
            c.wins,
            c.losses,
            c.fitness
        ),
        None => tracing::warn!("Generation {} finished without a champion", generation),
    }

    ChampionRecord { generation, champion }
}

// ============================================================================
// LEVEL 4 - FORMATTING
// ============================================================================

fn print_summary(report: &RunReport) {
    let stats = &report.stats;

    println!("\n=== Run Summary ===");
    println!("Generations:   {}", report.state.generation + 1);
    println!("Matches:       {}", stats.matches_played);
    println!("Timeouts:      {}", stats.timeouts);
    println!("Avg ticks:     {:.1}", stats.avg_ticks());
    println!(
        "Duration:      {:.1}s",
        (report.finished_at - report.started_at).num_milliseconds() as f64 / 1000.0
    );

    println!("\nChampions:");
    for record in &stats.champions {
        match &record.champion {
            Some(c) => println!("  Gen {:>3}: {} (fitness {:.1})", record.generation, c.name, c.fitness),
            None => println!("  Gen {:>3}: -", record.generation),
        }
    }

    println!("\nTop 5 (final generation):");
    for (i, c) in report.state.standings.iter().take(5).enumerate() {
        println!(
            "  #{} {} {}W/{}L {}-{} fitness {:.1}",
            i + 1,
            c.name,
            c.wins,
            c.losses,
            c.points_scored,
            c.points_conceded,
            c.fitness
        );
        println!("     {}", format_traits(c));
    }
}

fn format_traits(c: &ChromosomeSnapshot) -> String {
    c.traits
        .iter()
        .map(|(name, value)| format!("{}={:.2}", name, value))
        .collect::<Vec<_>>()
        .join(" ")
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn args(population: usize, tournaments: usize) -> RunArgs {
        RunArgs {
            population,
            tournaments,
            winning_score: 2,
            max_ticks: 5_000,
            mutation_rate: 0.1,
            mutation_strength: 0.2,
            frame_every: 0,
            json: false,
            output: None,
        }
    }

    #[test]
    fn test_build_manager_config() {
        let config = build_manager_config(&args(6, 2), Some(9));
        assert_eq!(config.population_size, 6);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.sim.winning_score, 2);
        assert_eq!(config.sim.max_ticks, 5_000);
    }

    #[test]
    fn test_run_tournaments_records_every_generation() {
        let a = args(4, 3);
        let mut manager = TournamentManager::new(build_manager_config(&a, Some(1)));
        manager.initialize(a.population).unwrap();
        manager.start(a.tournaments).unwrap();

        let stats = run_tournaments(&mut manager, &a).unwrap();

        assert_eq!(stats.matches_played, 9);
        let generations: Vec<u32> = stats.champions.iter().map(|c| c.generation).collect();
        assert_eq!(generations, vec![0, 1, 2]);
        assert!(stats.champions.iter().all(|c| c.champion.is_some()));
    }

    #[test]
    fn test_frame_sampling_matches_direct_play() {
        let mut a = args(2, 1);
        let run_with = |frame_every: u64, a: &mut RunArgs| {
            a.frame_every = frame_every;
            let mut manager = TournamentManager::new(build_manager_config(a, Some(5)));
            manager.initialize(2).unwrap();
            manager.start(1).unwrap();
            let m = manager.get_next_match().unwrap().unwrap();
            simulate_match(&mut manager, &m, frame_every).unwrap()
        };

        let direct = run_with(0, &mut a);
        let sampled = run_with(7, &mut a);
        assert_eq!(direct, sampled);
    }

    #[test]
    fn test_save_report() {
        let a = args(2, 1);
        let mut manager = TournamentManager::new(build_manager_config(&a, Some(3)));
        manager.initialize(2).unwrap();
        manager.start(1).unwrap();
        let stats = run_tournaments(&mut manager, &a).unwrap();

        let report = RunReport {
            started_at: Utc::now(),
            finished_at: Utc::now(),
            seed: Some(3),
            config: manager.config().clone(),
            stats,
            state: manager.get_state(),
        };

        let path = std::env::temp_dir().join(format!("pongevo_report_{}.json", std::process::id()));
        save_report(&report, &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();

        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["stats"]["matches_played"], 1);
        assert!(value["started_at"].is_string());
    }
}
