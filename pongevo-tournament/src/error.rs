//! Error type for bracket and manager operations

use thiserror::Error;

/// Invalid-state conditions a driver can trigger
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TournamentError {
    #[error("population is empty: initialize with at least one chromosome")]
    EmptyPopulation,

    #[error("at least one tournament must be requested")]
    NoTournamentsRequested,

    #[error("no active tournament: call start() first")]
    NoActiveTournament,

    #[error("match {0} does not exist in the current bracket")]
    UnknownMatch(usize),

    #[error("match {0} does not have both players assigned yet")]
    PlayersNotAssigned(usize),

    #[error("match {0} has already been recorded")]
    MatchAlreadyCompleted(usize),
}

pub type Result<T> = std::result::Result<T, TournamentError>;
