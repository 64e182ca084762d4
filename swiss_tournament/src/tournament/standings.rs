//! Standings calculation.
//!
//! Ranks players by win count. Ties keep the order the records arrived in,
//! which for every store is registration order, so rankings are stable
//! between calls.

use super::errors::{TournamentError, TournamentResult};
use super::models::Standing;

/// Rank players by wins, descending.
///
/// # Errors
///
/// * `TournamentError::OddPlayerCount` - the player count is odd, so the
///   standings cannot feed a pairing
pub fn rank(mut records: Vec<Standing>) -> TournamentResult<Vec<Standing>> {
    if records.len() % 2 != 0 {
        return Err(TournamentError::OddPlayerCount {
            count: records.len(),
        });
    }

    // sort_by is stable
    records.sort_by(|a, b| b.wins.cmp(&a.wins));
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standing(id: i64, wins: i32) -> Standing {
        Standing {
            id,
            name: format!("Player {id}"),
            wins,
            matches: i64::from(wins),
        }
    }

    #[test]
    fn test_rank_sorts_by_wins_descending() {
        let ranked = rank(vec![standing(1, 0), standing(2, 2), standing(3, 1), standing(4, 3)])
            .unwrap();
        let ids: Vec<_> = ranked.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![4, 2, 3, 1]);
    }

    #[test]
    fn test_rank_keeps_input_order_on_ties() {
        let ranked = rank(vec![
            standing(1, 1),
            standing(2, 0),
            standing(3, 1),
            standing(4, 0),
        ])
        .unwrap();
        let ids: Vec<_> = ranked.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 3, 2, 4]);
    }

    #[test]
    fn test_rank_rejects_odd_count() {
        let err = rank(vec![standing(1, 0), standing(2, 0), standing(3, 0)]).unwrap_err();
        assert!(matches!(err, TournamentError::OddPlayerCount { count: 3 }));
    }

    #[test]
    fn test_rank_empty_is_even() {
        assert!(rank(Vec::new()).unwrap().is_empty());
    }
}
