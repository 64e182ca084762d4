//! Tournament error types.

use thiserror::Error;

use super::models::{PlayerId, RoundNumber};
use crate::db::StoreError;

/// Tournament errors
#[derive(Debug, Error)]
pub enum TournamentError {
    /// Standings or pairing requested with an odd number of players
    #[error("Invalid state: there must be an even number of players, have {count}")]
    OddPlayerCount { count: usize },

    /// Pairing requested before anyone registered
    #[error("Invalid state: no players registered")]
    NoPlayers,

    /// No unreported match between the two players in the current round
    #[error("No match found in round {round} between players {winner} and {loser}")]
    NoMatchFound {
        round: RoundNumber,
        winner: PlayerId,
        loser: PlayerId,
    },

    /// Registration name rejected
    #[error("Invalid player name: {0}")]
    InvalidName(String),

    /// Persistence failure, propagated unchanged
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl TournamentError {
    /// Get a client-safe error message that doesn't leak store internals
    pub fn client_message(&self) -> String {
        match self {
            TournamentError::Store(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }

    /// Whether this error reports a tournament state the caller can fix
    pub fn is_invalid_state(&self) -> bool {
        matches!(
            self,
            TournamentError::OddPlayerCount { .. } | TournamentError::NoPlayers
        )
    }
}

/// Result type for tournament operations
pub type TournamentResult<T> = Result<T, TournamentError>;
