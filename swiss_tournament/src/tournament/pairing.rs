//! Adjacent-rank Swiss pairing.
//!
//! Rank 1 meets rank 2, rank 3 meets rank 4, and so on. Rematches are not
//! avoided: two players who stay adjacent in the standings meet again.

use super::errors::{TournamentError, TournamentResult};
use super::models::{Pairing, Standing};

/// Pair consecutive entries of already-ranked standings.
///
/// # Errors
///
/// * `TournamentError::OddPlayerCount` - one player would be left without an opponent
pub fn pair_adjacent(standings: &[Standing]) -> TournamentResult<Vec<Pairing>> {
    if standings.len() % 2 != 0 {
        return Err(TournamentError::OddPlayerCount {
            count: standings.len(),
        });
    }

    Ok(standings
        .chunks_exact(2)
        .map(|pair| Pairing {
            player1_id: pair[0].id,
            player1_name: pair[0].name.clone(),
            player2_id: pair[1].id,
            player2_name: pair[1].name.clone(),
        })
        .collect())
}
