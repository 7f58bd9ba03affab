//! PONGEVO Tournament - Brackets and the generation orchestrator
//!
//! This crate provides tournament infrastructure:
//! - Fitness scoring from match statistics
//! - Match play between two chromosomes
//! - Single-elimination brackets with byes
//! - A manager that runs tournaments back to back with evolution between them
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: TournamentManager (orchestration)
//! - Level 2: Tournament bracket, play_match (phases)
//! - Level 3: calculate_fitness (steps)
//! - Level 4: utilities, configuration

mod bracket;
mod config;
mod error;
mod fitness;
mod manager;
mod match_play;

pub use bracket::{BracketSnapshot, Match, MatchSnapshot, Tournament};
pub use config::{ManagerConfig, DEFAULT_HISTORY_LIMIT, DEFAULT_POPULATION_SIZE};
pub use error::{Result, TournamentError};
pub use fitness::{calculate_fitness, fitness_from_stats};
pub use manager::{HistoryEntry, ManagerSnapshot, TournamentManager};
pub use match_play::{play_match, play_series_parallel, SeriesResult};
