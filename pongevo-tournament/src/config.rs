//! Configuration for the tournament manager
//!
//! Level 4 - Utilities and configuration

use pongevo_core::SimConfig;
use pongevo_evolve::EvolutionConfig;
use serde::{Deserialize, Serialize};

/// Default number of chromosomes per generation
pub const DEFAULT_POPULATION_SIZE: usize = 32;

/// Default number of past-generation summaries kept
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// Manager configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ManagerConfig {
    /// Chromosomes created by `initialize` / auto-initialization
    pub population_size: usize,
    /// Most recent history entries retained
    pub history_limit: usize,
    /// Random seed for reproducibility (None = entropy)
    pub seed: Option<u64>,
    /// Simulator settings used by drivers
    pub sim: SimConfig,
    /// Genetic engine settings
    pub evolution: EvolutionConfig,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            population_size: DEFAULT_POPULATION_SIZE,
            history_limit: DEFAULT_HISTORY_LIMIT,
            seed: None,
            sim: SimConfig::default(),
            evolution: EvolutionConfig::default(),
        }
    }
}

impl ManagerConfig {
    /// Set population size
    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population_size = size;
        self
    }

    /// Set history limit
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    /// Set random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set simulator config
    pub fn with_sim(mut self, sim: SimConfig) -> Self {
        self.sim = sim;
        self
    }

    /// Set evolution config
    pub fn with_evolution(mut self, evolution: EvolutionConfig) -> Self {
        self.evolution = evolution;
        self
    }
}
