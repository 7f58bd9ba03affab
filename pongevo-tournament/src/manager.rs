//! Tournament manager - runs a series of tournaments with evolution between them
//!
//! Level 1 - Orchestration

use std::collections::VecDeque;

use pongevo_core::{Chromosome, ChromosomeSnapshot, Side};
use pongevo_evolve::{evolve_population, rank_by_fitness};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::bracket::{BracketSnapshot, Match, Tournament};
use crate::config::ManagerConfig;
use crate::error::{Result, TournamentError};

/// Summary of one finished tournament
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub generation: u32,
    pub champion: Option<ChromosomeSnapshot>,
    /// Whole population, fitness descending
    pub standings: Vec<ChromosomeSnapshot>,
}

/// Serializable view of the manager
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ManagerSnapshot {
    pub generation: u32,
    pub population_size: usize,
    pub tournaments_to_run: usize,
    pub tournaments_completed: usize,
    pub tournament: Option<BracketSnapshot>,
    pub standings: Vec<ChromosomeSnapshot>,
    pub history: Vec<HistoryEntry>,
}

/// Owns the population and the active bracket.
///
/// Single driver contract: one caller loops `get_next_match`, simulates,
/// `record_match`, `check_tournament_complete`.
pub struct TournamentManager {
    config: ManagerConfig,
    population: Vec<Chromosome>,
    tournament: Option<Tournament>,
    generation: u32,
    tournaments_to_run: usize,
    tournaments_completed: usize,
    history: VecDeque<HistoryEntry>,
    rng: ChaCha8Rng,
    finished: bool,
}

impl TournamentManager {
    pub fn new(config: ManagerConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        Self {
            config,
            population: Vec::new(),
            tournament: None,
            generation: 0,
            tournaments_to_run: 0,
            tournaments_completed: 0,
            history: VecDeque::new(),
            rng,
            finished: false,
        }
    }

    // ========================================================================
    // Level 1 - Orchestration
    // ========================================================================

    /// Create a fresh generation-0 population of `size` random chromosomes.
    ///
    /// Discards any active tournament and history.
    pub fn initialize(&mut self, size: usize) -> Result<()> {
        if size == 0 {
            return Err(TournamentError::EmptyPopulation);
        }

        self.config.population_size = size;
        self.population = (0..size)
            .map(|_| Chromosome::random(0, &mut self.rng))
            .collect();
        self.generation = 0;
        self.tournament = None;
        self.tournaments_to_run = 0;
        self.tournaments_completed = 0;
        self.history.clear();
        self.finished = false;

        info!(size, "population initialized");
        Ok(())
    }

    /// Begin a run of `num_tournaments` tournaments.
    ///
    /// Initializes a population of the configured size first if none
    /// exists.
    pub fn start(&mut self, num_tournaments: usize) -> Result<()> {
        if num_tournaments == 0 {
            return Err(TournamentError::NoTournamentsRequested);
        }
        if self.population.is_empty() {
            self.initialize(self.config.population_size)?;
        }

        self.tournaments_to_run = num_tournaments;
        self.tournaments_completed = 0;
        self.finished = false;
        self.start_single_tournament();
        Ok(())
    }

    /// Next playable match of the active bracket, if any
    pub fn get_next_match(&mut self) -> Result<Option<Match>> {
        let tournament = self.tournament.as_mut().ok_or(TournamentError::NoActiveTournament)?;
        Ok(tournament.get_current_match())
    }

    /// Record a simulated result. `winner` is the side that won; player 1
    /// plays left.
    pub fn record_match(
        &mut self,
        match_id: usize,
        winner: Side,
        player1_score: u32,
        player2_score: u32,
    ) -> Result<Match> {
        let tournament = self.tournament.as_mut().ok_or(TournamentError::NoActiveTournament)?;
        tournament.record_result(match_id, winner, player1_score, player2_score, &mut self.population)
    }

    /// Close out the active tournament if its bracket is exhausted.
    ///
    /// On completion a history entry is appended. If more tournaments
    /// remain, the population is evolved, a new bracket is started and
    /// `false` is returned. Returns `true` once the whole run is done;
    /// further calls keep returning `true` without side effects.
    pub fn check_tournament_complete(&mut self) -> Result<bool> {
        if self.finished {
            return Ok(true);
        }

        let tournament = self.tournament.as_mut().ok_or(TournamentError::NoActiveTournament)?;
        tournament.get_current_match();
        if !tournament.is_completed() {
            return Ok(false);
        }

        let champion = tournament.champion();
        self.tournaments_completed += 1;
        self.record_history(champion);

        info!(
            generation = self.generation,
            champion = champion.and_then(|i| self.population.get(i)).map(Chromosome::name).unwrap_or("none"),
            completed = self.tournaments_completed,
            requested = self.tournaments_to_run,
            "tournament complete"
        );

        if self.tournaments_completed < self.tournaments_to_run {
            self.generation += 1;
            let population = std::mem::take(&mut self.population);
            self.population =
                evolve_population(population, self.generation, &self.config.evolution, &mut self.rng);
            info!(generation = self.generation, "population evolved");
            self.start_single_tournament();
            Ok(false)
        } else {
            self.finished = true;
            Ok(true)
        }
    }

    /// Full state for display or serialization
    pub fn get_state(&self) -> ManagerSnapshot {
        ManagerSnapshot {
            generation: self.generation,
            population_size: self.config.population_size,
            tournaments_to_run: self.tournaments_to_run,
            tournaments_completed: self.tournaments_completed,
            tournament: self.tournament.as_ref().map(|t| t.snapshot(&self.population)),
            standings: if self.tournament.is_some() {
                self.standings().into_iter().map(Chromosome::snapshot).collect()
            } else {
                Vec::new()
            },
            history: self.history.iter().cloned().collect(),
        }
    }

    // ========================================================================
    // Level 2 - Phases
    // ========================================================================

    fn start_single_tournament(&mut self) {
        for c in &mut self.population {
            c.reset_stats();
        }
        self.tournament = Some(Tournament::build(self.population.len(), self.generation, &mut self.rng));

        info!(
            generation = self.generation,
            players = self.population.len(),
            tournament = self.tournaments_completed + 1,
            of = self.tournaments_to_run,
            "tournament started"
        );
    }

    fn record_history(&mut self, champion: Option<usize>) {
        let entry = HistoryEntry {
            generation: self.generation,
            champion: champion.and_then(|i| self.population.get(i)).map(Chromosome::snapshot),
            standings: self.standings().into_iter().map(Chromosome::snapshot).collect(),
        };
        self.history.push_back(entry);
        while self.history.len() > self.config.history_limit {
            self.history.pop_front();
        }
    }

    // ========================================================================
    // Level 4 - Accessors
    // ========================================================================

    /// Population sorted by fitness descending, ties in population order
    pub fn standings(&self) -> Vec<&Chromosome> {
        rank_by_fitness(&self.population)
            .into_iter()
            .map(|i| &self.population[i])
            .collect()
    }

    /// The two chromosomes a match refers to (left, right)
    pub fn contestants(&self, m: &Match) -> Option<(&Chromosome, &Chromosome)> {
        let (p1, p2) = m.players()?;
        Some((self.population.get(p1)?, self.population.get(p2)?))
    }

    pub fn population(&self) -> &[Chromosome] {
        &self.population
    }

    pub fn tournament(&self) -> Option<&Tournament> {
        self.tournament.as_ref()
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn tournaments_to_run(&self) -> usize {
        self.tournaments_to_run
    }

    pub fn tournaments_completed(&self) -> usize {
        self.tournaments_completed
    }

    pub fn history(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.history.iter()
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// The run's random source, for drivers simulating matches
    pub fn rng_mut(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}
