//! Tournament data models for Swiss-system play.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Player ID type (assigned by the store)
pub type PlayerId = i64;

/// Round number type. Round 0 means no round has been paired yet.
pub type RoundNumber = i32;

/// A registered player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Player ID
    pub id: PlayerId,
    /// Sanitized display name (need not be unique)
    pub name: String,
    /// Matches won so far
    pub wins: i32,
    /// Registration timestamp
    pub registered_at: DateTime<Utc>,
}

/// One row of the standings table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
    /// Player ID
    pub id: PlayerId,
    /// Player name
    pub name: String,
    /// Matches won
    pub wins: i32,
    /// Reported matches the player took part in
    pub matches: i64,
}

impl Standing {
    /// Matches lost, derived from matches played and wins
    pub fn losses(&self) -> i64 {
        self.matches - i64::from(self.wins)
    }
}

/// Two adjacent-rank players scheduled to meet in the next round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pairing {
    pub player1_id: PlayerId,
    pub player1_name: String,
    pub player2_id: PlayerId,
    pub player2_name: String,
}

impl Pairing {
    /// Player IDs as a tuple, in seating order
    pub fn ids(&self) -> (PlayerId, PlayerId) {
        (self.player1_id, self.player2_id)
    }

    /// Whether the given player sits in this pairing
    pub fn contains(&self, player_id: PlayerId) -> bool {
        self.player1_id == player_id || self.player2_id == player_id
    }
}

/// A match between two players in a given round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    /// Round the match belongs to
    pub round: RoundNumber,
    pub player1_id: PlayerId,
    pub player2_id: PlayerId,
    /// Winner, once reported
    pub winner_id: Option<PlayerId>,
}

impl Match {
    /// Create an unreported match
    pub fn new(round: RoundNumber, player1_id: PlayerId, player2_id: PlayerId) -> Self {
        Self {
            round,
            player1_id,
            player2_id,
            winner_id: None,
        }
    }

    /// Whether a winner has been recorded
    pub fn is_reported(&self) -> bool {
        self.winner_id.is_some()
    }

    /// Whether the two players occupy this match's slots, in either order
    pub fn is_between(&self, a: PlayerId, b: PlayerId) -> bool {
        (self.player1_id == a && self.player2_id == b)
            || (self.player1_id == b && self.player2_id == a)
    }

    /// Whether the player occupies either slot
    pub fn involves(&self, player_id: PlayerId) -> bool {
        self.player1_id == player_id || self.player2_id == player_id
    }

    /// The losing player, once reported
    pub fn loser_id(&self) -> Option<PlayerId> {
        self.winner_id.map(|winner| {
            if winner == self.player1_id {
                self.player2_id
            } else {
                self.player1_id
            }
        })
    }
}
