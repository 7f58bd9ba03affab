//! Single-elimination bracket
//!
//! Level 2 - Phases
//!
//! The bracket never owns chromosomes. Players are indices into the
//! manager's population, so stat updates made while recording results are
//! visible to the genetic engine afterwards.

use pongevo_core::{Chromosome, ChromosomeSnapshot, Side};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, TournamentError};
use crate::fitness::calculate_fitness;

// ============================================================================
// MATCH
// ============================================================================

/// One bracket slot
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Match {
    /// Unique within the bracket, assigned in round order
    pub id: usize,
    pub round: usize,
    /// Population index of player 1 (plays the left side)
    pub player1: Option<usize>,
    /// Population index of player 2 (plays the right side)
    pub player2: Option<usize>,
    pub winner: Option<usize>,
    pub player1_score: u32,
    pub player2_score: u32,
    pub completed: bool,
}

impl Match {
    fn empty(id: usize, round: usize) -> Self {
        Self {
            id,
            round,
            player1: None,
            player2: None,
            winner: None,
            player1_score: 0,
            player2_score: 0,
            completed: false,
        }
    }

    /// Both players, if assigned
    pub fn players(&self) -> Option<(usize, usize)> {
        Some((self.player1?, self.player2?))
    }

    /// Player on the given side
    pub fn player(&self, side: Side) -> Option<usize> {
        match side {
            Side::Left => self.player1,
            Side::Right => self.player2,
        }
    }

    /// A first-round slot won without an opponent
    pub fn is_bye(&self) -> bool {
        self.completed && self.player1.is_some() && self.player2.is_none()
    }

    pub fn snapshot(&self, population: &[Chromosome]) -> MatchSnapshot {
        let lookup = |idx: Option<usize>| idx.and_then(|i| population.get(i)).map(Chromosome::snapshot);
        MatchSnapshot {
            match_id: self.id,
            round_num: self.round,
            player1: lookup(self.player1),
            player2: lookup(self.player2),
            winner: lookup(self.winner),
            player1_score: self.player1_score,
            player2_score: self.player2_score,
            completed: self.completed,
        }
    }
}

/// Serializable view of a match with embedded player records
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchSnapshot {
    pub match_id: usize,
    pub round_num: usize,
    pub player1: Option<ChromosomeSnapshot>,
    pub player2: Option<ChromosomeSnapshot>,
    pub winner: Option<ChromosomeSnapshot>,
    pub player1_score: u32,
    pub player2_score: u32,
    pub completed: bool,
}

/// Serializable view of a whole bracket
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BracketSnapshot {
    pub generation: u32,
    pub rounds: Vec<Vec<MatchSnapshot>>,
    pub current_round: usize,
    pub current_match_idx: usize,
    pub completed: bool,
    pub champion: Option<ChromosomeSnapshot>,
    pub total_rounds: usize,
}

// ============================================================================
// TOURNAMENT
// ============================================================================

/// Single-elimination bracket over a population
#[derive(Clone, Debug)]
pub struct Tournament {
    generation: u32,
    rounds: Vec<Vec<Match>>,
    current_round: usize,
    current_match_idx: usize,
    completed: bool,
    champion: Option<usize>,
}

impl Tournament {
    /// Build a bracket over population indices `0..population_len`.
    ///
    /// Players are shuffled and paired into round 0; an unpaired last
    /// player gets a bye. Each later round has half as many matches as the
    /// one before (rounded down) and starts empty.
    pub fn build<R: Rng>(population_len: usize, generation: u32, rng: &mut R) -> Self {
        let mut seeding: Vec<usize> = (0..population_len).collect();
        seeding.shuffle(rng);

        let mut next_id = 0;
        let mut first_round = Vec::with_capacity(population_len.div_ceil(2));
        for pair in seeding.chunks(2) {
            let mut m = Match::empty(next_id, 0);
            m.player1 = Some(pair[0]);
            m.player2 = pair.get(1).copied();
            if m.player2.is_none() {
                m.winner = m.player1;
                m.completed = true;
            }
            first_round.push(m);
            next_id += 1;
        }

        let mut matches_in_round = first_round.len() / 2;
        let mut rounds = vec![first_round];

        while matches_in_round >= 1 {
            let round_num = rounds.len();
            let round: Vec<Match> = (0..matches_in_round)
                .map(|i| Match::empty(next_id + i, round_num))
                .collect();
            next_id += matches_in_round;
            rounds.push(round);
            matches_in_round /= 2;
        }

        debug!(
            generation,
            players = population_len,
            rounds = rounds.len(),
            "bracket built"
        );

        Self {
            generation,
            rounds,
            current_round: 0,
            current_match_idx: 0,
            completed: false,
            champion: None,
        }
    }

    // ========================================================================
    // Level 2 - Phases
    // ========================================================================

    /// Next playable match, scanning forward from the cursor.
    ///
    /// Returns `None` either because a predecessor match is still
    /// unplayed, or because the bracket is exhausted; in the second case
    /// the tournament is marked completed and the champion determined.
    pub fn get_current_match(&mut self) -> Option<Match> {
        if self.completed {
            return None;
        }

        while self.current_round < self.rounds.len() {
            while self.current_match_idx < self.rounds[self.current_round].len() {
                let m = self.rounds[self.current_round][self.current_match_idx];

                if !m.completed {
                    if m.players().is_some() {
                        return Some(m);
                    }
                    self.advance_winners();
                    let m = self.rounds[self.current_round][self.current_match_idx];
                    return m.players().map(|_| m);
                }

                self.current_match_idx += 1;
            }

            self.current_match_idx = 0;
            self.current_round += 1;
            self.advance_winners();
        }

        self.completed = true;
        self.determine_champion();
        None
    }

    /// Copy every decided winner into its slot in the following round.
    ///
    /// Winner of match `i` goes to match `i / 2`, as player 1 for even `i`
    /// and player 2 for odd `i`. A winner whose slot does not exist is
    /// eliminated. Re-running with nothing new decided changes nothing.
    pub fn advance_winners(&mut self) {
        for round_idx in 0..self.rounds.len().saturating_sub(1) {
            let (done, rest) = self.rounds.split_at_mut(round_idx + 1);
            let source = &done[round_idx];
            let next_round = &mut rest[0];

            for (i, m) in source.iter().enumerate() {
                let winner = match (m.completed, m.winner) {
                    (true, Some(w)) => w,
                    _ => continue,
                };
                if let Some(next) = next_round.get_mut(i / 2) {
                    if i % 2 == 0 {
                        next.player1 = Some(winner);
                    } else {
                        next.player2 = Some(winner);
                    }
                }
            }
        }
    }

    /// Record the result of a playable match.
    ///
    /// Applies the outcome to both players' statistics, recomputes their
    /// fitness, and moves the cursor past the match if it is the one under
    /// the cursor. `population` must be the population the bracket was
    /// built over.
    pub fn record_result(
        &mut self,
        match_id: usize,
        winner: Side,
        player1_score: u32,
        player2_score: u32,
        population: &mut [Chromosome],
    ) -> Result<Match> {
        let (round_idx, match_idx) = self
            .locate(match_id)
            .ok_or(TournamentError::UnknownMatch(match_id))?;

        let m = &mut self.rounds[round_idx][match_idx];
        if m.completed {
            return Err(TournamentError::MatchAlreadyCompleted(match_id));
        }
        let (p1, p2) = m.players().ok_or(TournamentError::PlayersNotAssigned(match_id))?;
        if p1 >= population.len() || p2 >= population.len() {
            return Err(TournamentError::UnknownMatch(match_id));
        }

        let (winner_idx, loser_idx) = match winner {
            Side::Left => (p1, p2),
            Side::Right => (p2, p1),
        };

        m.winner = Some(winner_idx);
        m.player1_score = player1_score;
        m.player2_score = player2_score;
        m.completed = true;
        let recorded = *m;

        apply_points(&mut population[p1], player1_score, player2_score);
        apply_points(&mut population[p2], player2_score, player1_score);
        population[winner_idx].wins += 1;
        population[loser_idx].losses += 1;
        calculate_fitness(&mut population[p1]);
        calculate_fitness(&mut population[p2]);

        if (round_idx, match_idx) == (self.current_round, self.current_match_idx) {
            self.current_match_idx += 1;
        }

        debug!(
            match_id,
            round = round_idx,
            winner = population[winner_idx].name(),
            score = %format!("{}-{}", player1_score, player2_score),
            "match recorded"
        );

        Ok(recorded)
    }

    fn determine_champion(&mut self) {
        self.champion = self
            .rounds
            .last()
            .and_then(|round| round.first())
            .filter(|m| m.completed)
            .and_then(|m| m.winner);
    }

    fn locate(&self, match_id: usize) -> Option<(usize, usize)> {
        self.rounds.iter().enumerate().find_map(|(r, round)| {
            round.iter().position(|m| m.id == match_id).map(|i| (r, i))
        })
    }

    // ========================================================================
    // Level 4 - Accessors
    // ========================================================================

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn rounds(&self) -> &[Vec<Match>] {
        &self.rounds
    }

    pub fn total_rounds(&self) -> usize {
        self.rounds.len()
    }

    /// (current round, current match index)
    pub fn cursor(&self) -> (usize, usize) {
        (self.current_round, self.current_match_idx)
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Population index of the champion, once completed
    pub fn champion(&self) -> Option<usize> {
        self.champion
    }

    /// Look up a match by id
    pub fn get_match(&self, match_id: usize) -> Option<&Match> {
        self.locate(match_id).map(|(r, i)| &self.rounds[r][i])
    }

    /// All matches in round order
    pub fn matches(&self) -> impl Iterator<Item = &Match> {
        self.rounds.iter().flatten()
    }

    pub fn snapshot(&self, population: &[Chromosome]) -> BracketSnapshot {
        BracketSnapshot {
            generation: self.generation,
            rounds: self
                .rounds
                .iter()
                .map(|round| round.iter().map(|m| m.snapshot(population)).collect())
                .collect(),
            current_round: self.current_round,
            current_match_idx: self.current_match_idx,
            completed: self.completed,
            champion: self
                .champion
                .and_then(|i| population.get(i))
                .map(Chromosome::snapshot),
            total_rounds: self.rounds.len(),
        }
    }
}

fn apply_points(chromosome: &mut Chromosome, scored: u32, conceded: u32) {
    chromosome.points_scored += scored;
    chromosome.points_conceded += conceded;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn make_population(n: usize, rng: &mut ChaCha8Rng) -> Vec<Chromosome> {
        (0..n).map(|_| Chromosome::random(0, rng)).collect()
    }

    /// Play the bracket to the end with random winners.
    /// Returns the number of matches actually played.
    fn play_out(t: &mut Tournament, pop: &mut [Chromosome], rng: &mut ChaCha8Rng) -> usize {
        let mut played = 0;
        for _ in 0..1000 {
            match t.get_current_match() {
                Some(m) => {
                    let side = if rng.gen_bool(0.5) { Side::Left } else { Side::Right };
                    let (s1, s2) = match side {
                        Side::Left => (5, rng.gen_range(0..5)),
                        Side::Right => (rng.gen_range(0..5), 5),
                    };
                    t.record_result(m.id, side, s1, s2, pop).unwrap();
                    played += 1;
                }
                None if t.is_completed() => return played,
                None => panic!("bracket stalled with no playable match"),
            }
        }
        panic!("bracket did not terminate");
    }

    #[test]
    fn test_round_sizes() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let sizes = |n: usize, rng: &mut ChaCha8Rng| -> Vec<usize> {
            Tournament::build(n, 0, rng).rounds().iter().map(Vec::len).collect()
        };

        assert_eq!(sizes(1, &mut rng), vec![1]);
        assert_eq!(sizes(2, &mut rng), vec![1]);
        assert_eq!(sizes(3, &mut rng), vec![2, 1]);
        assert_eq!(sizes(4, &mut rng), vec![2, 1]);
        assert_eq!(sizes(6, &mut rng), vec![3, 1]);
        assert_eq!(sizes(8, &mut rng), vec![4, 2, 1]);
        assert_eq!(sizes(32, &mut rng), vec![16, 8, 4, 2, 1]);
    }

    #[test]
    fn test_first_round_seeding_and_bye() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let t = Tournament::build(5, 3, &mut rng);
        let first = &t.rounds()[0];

        let mut seen: Vec<usize> = first
            .iter()
            .flat_map(|m| [m.player1, m.player2])
            .flatten()
            .collect();
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2, 3, 4]);

        let bye = &first[2];
        assert!(bye.is_bye());
        assert_eq!(bye.winner, bye.player1);
        assert!(first[..2].iter().all(|m| !m.completed));
        assert_eq!(t.generation(), 3);
    }

    #[test]
    fn test_match_ids_are_sequential() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let t = Tournament::build(8, 0, &mut rng);
        let ids: Vec<usize> = t.matches().map(|m| m.id).collect();
        assert_eq!(ids, (0..7).collect::<Vec<_>>());
    }

    #[test]
    fn test_single_player_is_champion() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut pop = make_population(1, &mut rng);
        let mut t = Tournament::build(1, 0, &mut rng);

        assert_eq!(play_out(&mut t, &mut pop, &mut rng), 0);
        assert!(t.is_completed());
        assert_eq!(t.champion(), Some(0));
    }

    #[test]
    fn test_bracket_terminates_for_all_sizes() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);

        for n in 1..=33 {
            let mut pop = make_population(n, &mut rng);
            let mut t = Tournament::build(n, 0, &mut rng);
            let played = play_out(&mut t, &mut pop, &mut rng);

            assert!(t.is_completed(), "n = {}", n);
            let champion = t.champion().expect("champion");
            assert!(champion < n);

            let byes = t.matches().filter(|m| m.is_bye()).count();
            let total = t.matches().count();
            assert!(t.matches().all(|m| m.completed), "n = {}", n);
            assert_eq!(played, total - byes, "n = {}", n);
            if n.is_power_of_two() {
                assert_eq!(played, n - 1, "n = {}", n);
            }

            for m in t.matches().filter(|m| !m.is_bye()) {
                let (p1, p2) = m.players().expect("assigned");
                let w = m.winner.expect("winner");
                assert!(w == p1 || w == p2);
            }

            // Stats are consistent with matches played
            let wins: u32 = pop.iter().map(|c| c.wins).sum();
            let losses: u32 = pop.iter().map(|c| c.losses).sum();
            assert_eq!(wins as usize, played);
            assert_eq!(losses as usize, played);
        }
    }

    #[test]
    fn test_waits_for_predecessors() {
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let mut pop = make_population(4, &mut rng);
        let mut t = Tournament::build(4, 0, &mut rng);

        let final_id = t.rounds()[1][0].id;
        assert_eq!(
            t.record_result(final_id, Side::Left, 5, 0, &mut pop),
            Err(TournamentError::PlayersNotAssigned(final_id))
        );

        let m0 = t.get_current_match().unwrap();
        assert_eq!((m0.round, m0.id), (0, 0));
        t.record_result(m0.id, Side::Left, 5, 2, &mut pop).unwrap();

        let m1 = t.get_current_match().unwrap();
        assert_eq!(m1.id, 1);
        t.record_result(m1.id, Side::Right, 3, 5, &mut pop).unwrap();

        let fin = t.get_current_match().unwrap();
        assert_eq!(fin.id, final_id);
        assert_eq!(fin.player1, m0.player1);
        assert_eq!(fin.player2, m1.player2);
    }

    #[test]
    fn test_advance_winners_is_idempotent() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut pop = make_population(4, &mut rng);
        let mut t = Tournament::build(4, 0, &mut rng);

        let m0 = t.get_current_match().unwrap();
        t.record_result(m0.id, Side::Left, 5, 1, &mut pop).unwrap();
        t.advance_winners();
        let once = t.rounds().to_vec();
        t.advance_winners();
        assert_eq!(t.rounds(), once.as_slice());
        assert_eq!(t.rounds()[1][0].player1, m0.player1);
        assert_eq!(t.rounds()[1][0].player2, None);
    }

    #[test]
    fn test_record_rejects_duplicates_and_unknown() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let mut pop = make_population(4, &mut rng);
        let mut t = Tournament::build(4, 0, &mut rng);

        let m = t.get_current_match().unwrap();
        t.record_result(m.id, Side::Left, 5, 0, &mut pop).unwrap();
        assert_eq!(
            t.record_result(m.id, Side::Left, 5, 0, &mut pop),
            Err(TournamentError::MatchAlreadyCompleted(m.id))
        );
        assert_eq!(
            t.record_result(99, Side::Left, 5, 0, &mut pop),
            Err(TournamentError::UnknownMatch(99))
        );
    }

    #[test]
    fn test_record_updates_stats_and_fitness() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut pop = make_population(2, &mut rng);
        let mut t = Tournament::build(2, 0, &mut rng);

        let m = t.get_current_match().unwrap();
        let (p1, p2) = m.players().unwrap();
        let recorded = t.record_result(m.id, Side::Right, 3, 5, &mut pop).unwrap();

        assert_eq!(recorded.winner, Some(p2));
        assert!(recorded.completed);

        assert_eq!((pop[p1].wins, pop[p1].losses), (0, 1));
        assert_eq!((pop[p1].points_scored, pop[p1].points_conceded), (3, 5));
        assert_eq!(pop[p1].fitness, -20.0 + 3.0);

        assert_eq!((pop[p2].wins, pop[p2].losses), (1, 0));
        assert_eq!((pop[p2].points_scored, pop[p2].points_conceded), (5, 3));
        assert_eq!(pop[p2].fitness, 100.0 + 20.0 + 5.0);

        assert!(t.get_current_match().is_none());
        assert!(t.is_completed());
        assert_eq!(t.champion(), Some(p2));
    }

    #[test]
    fn test_out_of_order_record_keeps_cursor() {
        let mut rng = ChaCha8Rng::seed_from_u64(10);
        let mut pop = make_population(4, &mut rng);
        let mut t = Tournament::build(4, 0, &mut rng);

        let second = t.rounds()[0][1];
        t.record_result(second.id, Side::Left, 5, 4, &mut pop).unwrap();
        assert_eq!(t.cursor(), (0, 0));

        let m = t.get_current_match().unwrap();
        assert_eq!(m.id, t.rounds()[0][0].id);
    }

    #[test]
    fn test_snapshot_serializes() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let pop = make_population(3, &mut rng);
        let t = Tournament::build(3, 2, &mut rng);

        let snap = t.snapshot(&pop);
        assert_eq!(snap.total_rounds, 2);
        assert_eq!(snap.generation, 2);
        assert!(snap.rounds[0][1].player2.is_none());
        assert!(snap.rounds[0][1].winner.is_some());
        assert!(snap.champion.is_none());

        let json = serde_json::to_string(&snap).unwrap();
        assert!(json.contains("\"total_rounds\":2"));
    }
}
