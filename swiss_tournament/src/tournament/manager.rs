//! Tournament manager: registration, Swiss pairing, match recording and resets.

use std::sync::Arc;
use tokio::sync::Mutex;

use super::errors::{TournamentError, TournamentResult};
use super::models::{Match, Pairing, PlayerId, RoundNumber, Standing};
use super::{pairing, standings};
use crate::db::{InMemoryTournamentRepository, PgTournamentRepository, TournamentRepository};
use crate::security::sanitize_name;

/// Tournament manager
///
/// Cloning is cheap; clones share the store and the round lock.
#[derive(Clone)]
pub struct TournamentManager {
    repo: Arc<dyn TournamentRepository>,
    /// Serializes pairing, reporting and resets issued through this manager
    round_lock: Arc<Mutex<()>>,
}

impl TournamentManager {
    /// Create a new tournament manager over any store
    pub fn new(repo: Arc<dyn TournamentRepository>) -> Self {
        Self {
            repo,
            round_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Manager backed by a fresh in-memory store
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryTournamentRepository::new()))
    }

    /// Manager backed by PostgreSQL
    pub fn postgres(pool: sqlx::PgPool) -> Self {
        Self::new(Arc::new(PgTournamentRepository::new(pool)))
    }

    /// Register a player
    ///
    /// The name is trimmed and markup-escaped before it is stored. Names need
    /// not be unique.
    ///
    /// # Errors
    ///
    /// * `TournamentError::InvalidName` - empty or over-long name
    pub async fn register_player(&self, name: &str) -> TournamentResult<PlayerId> {
        let name = sanitize_name(name).map_err(TournamentError::InvalidName)?;
        let id = self.repo.create_player(&name).await?;
        log::debug!("Registered player {} '{}'", id, name);
        Ok(id)
    }

    /// Number of registered players
    pub async fn count_players(&self) -> TournamentResult<usize> {
        Ok(self.repo.count_players().await?.max(0) as usize)
    }

    /// Players ranked by wins, descending; ties in registration order
    ///
    /// # Errors
    ///
    /// * `TournamentError::OddPlayerCount` - an odd number of players is registered
    pub async fn player_standings(&self) -> TournamentResult<Vec<Standing>> {
        standings::rank(self.repo.get_standings().await?)
    }

    /// Pair the next round and persist its matches
    ///
    /// Adjacent players in the standings meet: first vs second, third vs
    /// fourth, and so on. The round counter advances by one and every pair
    /// becomes an unreported match of the new round.
    ///
    /// Calling this while matches of the previous round are unreported is
    /// allowed; those matches simply stay unreported.
    ///
    /// # Errors
    ///
    /// * `TournamentError::OddPlayerCount` - odd player count; nothing is written
    /// * `TournamentError::NoPlayers` - nobody is registered; nothing is written
    pub async fn swiss_pairings(&self) -> TournamentResult<Vec<Pairing>> {
        let _guard = self.round_lock.lock().await;
        let (_, pairs) = self.pair_next_round().await?;
        Ok(pairs)
    }

    /// Record the outcome of a match in the current round
    ///
    /// If the store holds no match at all yet, the first round is paired from
    /// the current standings before the result is recorded, so callers need
    /// not call [`swiss_pairings`](Self::swiss_pairings) before the very first
    /// report.
    ///
    /// The winner's match is marked and their win credited as one unit. The
    /// loser's record is untouched.
    ///
    /// # Returns
    ///
    /// * `TournamentResult<RoundNumber>` - the round the result was recorded in
    ///
    /// # Errors
    ///
    /// * `TournamentError::NoMatchFound` - the two players have no unreported
    ///   match in the current round
    /// * `TournamentError::OddPlayerCount` / `NoPlayers` - bootstrap pairing failed
    pub async fn report_match(
        &self,
        winner_id: PlayerId,
        loser_id: PlayerId,
    ) -> TournamentResult<RoundNumber> {
        let _guard = self.round_lock.lock().await;

        if self.repo.count_matches().await? == 0 {
            log::info!("No matches recorded yet, pairing the first round");
            self.pair_next_round().await?;
        }

        let round = self.repo.current_round().await?;
        let affected = self.repo.record_result(round, winner_id, loser_id).await?;
        if affected == 0 {
            log::warn!(
                "Rejected report: no open match between {} and {} in round {}",
                winner_id,
                loser_id,
                round
            );
            return Err(TournamentError::NoMatchFound {
                round,
                winner: winner_id,
                loser: loser_id,
            });
        }

        log::info!(
            "Round {}: player {} beat player {}",
            round,
            winner_id,
            loser_id
        );
        Ok(round)
    }

    /// Delete all matches, reset the round counter to 0 and every player's wins to 0
    ///
    /// Registered players are kept.
    pub async fn delete_matches(&self) -> TournamentResult<()> {
        let _guard = self.round_lock.lock().await;
        self.repo.reset_matches().await?;
        log::info!("All matches deleted, round counter and wins reset");
        Ok(())
    }

    /// Delete all players (their matches go with them)
    ///
    /// The round counter is left as it is; call
    /// [`delete_matches`](Self::delete_matches) for a full reset.
    pub async fn delete_players(&self) -> TournamentResult<()> {
        let _guard = self.round_lock.lock().await;
        self.repo.delete_all_players().await?;
        log::info!("All players deleted");
        Ok(())
    }

    /// Current round number (0 before the first pairing)
    pub async fn current_round(&self) -> TournamentResult<RoundNumber> {
        Ok(self.repo.current_round().await?)
    }

    /// Matches of a round, in pairing order
    pub async fn round_matches(&self, round: RoundNumber) -> TournamentResult<Vec<Match>> {
        Ok(self.repo.list_matches(round).await?)
    }

    /// Pair and persist the next round. Callers hold `round_lock`.
    async fn pair_next_round(&self) -> TournamentResult<(RoundNumber, Vec<Pairing>)> {
        let ranked = self.player_standings().await?;
        if ranked.is_empty() {
            return Err(TournamentError::NoPlayers);
        }

        let pairs = pairing::pair_adjacent(&ranked)?;
        let ids: Vec<_> = pairs.iter().map(Pairing::ids).collect();
        let round = self.repo.open_round(&ids).await?;

        log::info!("Paired round {} ({} matches)", round, pairs.len());
        Ok((round, pairs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{StoreError, StoreResult};
    use async_trait::async_trait;
    use std::time::Duration;

    async fn manager_with(names: &[&str]) -> (TournamentManager, Vec<PlayerId>) {
        let manager = TournamentManager::in_memory();
        let mut ids = Vec::new();
        for name in names {
            ids.push(manager.register_player(name).await.unwrap());
        }
        (manager, ids)
    }

    #[tokio::test]
    async fn test_register_sanitizes_name() {
        let (manager, ids) = manager_with(&["  <b>Ann</b> "]).await;
        let standings = manager.repo.get_standings().await.unwrap();
        assert_eq!(standings[0].id, ids[0]);
        assert_eq!(standings[0].name, "&lt;b&gt;Ann&lt;/b&gt;");
    }

    #[tokio::test]
    async fn test_register_rejects_blank_name() {
        let manager = TournamentManager::in_memory();
        let err = manager.register_player("   ").await.unwrap_err();
        assert!(matches!(err, TournamentError::InvalidName(_)));
        assert_eq!(manager.count_players().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_count_players() {
        let (manager, _) = manager_with(&["A", "B", "C"]).await;
        assert_eq!(manager.count_players().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_pairing_advances_round_and_creates_matches() {
        let (manager, ids) = manager_with(&["A", "B", "C", "D"]).await;

        let pairs = manager.swiss_pairings().await.unwrap();

        assert_eq!(manager.current_round().await.unwrap(), 1);
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].ids(), (ids[0], ids[1]));
        assert_eq!(pairs[1].ids(), (ids[2], ids[3]));

        let matches = manager.round_matches(1).await.unwrap();
        assert_eq!(matches.len(), 2);
        assert!(matches.iter().all(|m| m.round == 1 && !m.is_reported()));
    }

    #[tokio::test]
    async fn test_odd_count_pairing_writes_nothing() {
        let (manager, _) = manager_with(&["A", "B", "C"]).await;

        let err = manager.swiss_pairings().await.unwrap_err();

        assert!(matches!(err, TournamentError::OddPlayerCount { count: 3 }));
        assert_eq!(manager.current_round().await.unwrap(), 0);
        assert_eq!(manager.repo.count_matches().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_pairing_without_players_fails() {
        let manager = TournamentManager::in_memory();
        let err = manager.swiss_pairings().await.unwrap_err();
        assert!(matches!(err, TournamentError::NoPlayers));
        assert_eq!(manager.current_round().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_first_report_bootstraps_round_one() {
        let (manager, ids) = manager_with(&["P1", "P2", "P3", "P4"]).await;

        let round = manager.report_match(ids[0], ids[1]).await.unwrap();

        assert_eq!(round, 1);
        let matches = manager.round_matches(1).await.unwrap();
        assert_eq!(matches.len(), 2);
        assert!(matches[0].is_between(ids[0], ids[1]));
        assert_eq!(matches[0].winner_id, Some(ids[0]));
        assert!(matches[1].is_between(ids[2], ids[3]));
        assert!(!matches[1].is_reported());

        let standings = manager.player_standings().await.unwrap();
        assert_eq!(standings[0].id, ids[0]);
        assert_eq!(standings[0].wins, 1);
    }

    #[tokio::test]
    async fn test_report_accepts_either_seat_order() {
        let (manager, ids) = manager_with(&["A", "B"]).await;
        manager.swiss_pairings().await.unwrap();

        manager.report_match(ids[1], ids[0]).await.unwrap();

        let matches = manager.round_matches(1).await.unwrap();
        assert_eq!(matches[0].winner_id, Some(ids[1]));
        assert_eq!(matches[0].loser_id(), Some(ids[0]));
    }

    #[tokio::test]
    async fn test_duplicate_report_rejected_without_double_count() {
        let (manager, ids) = manager_with(&["A", "B", "C", "D"]).await;
        manager.report_match(ids[0], ids[1]).await.unwrap();

        let err = manager.report_match(ids[0], ids[1]).await.unwrap_err();
        assert!(matches!(err, TournamentError::NoMatchFound { round: 1, .. }));

        // Reversing the outcome is rejected too.
        assert!(manager.report_match(ids[1], ids[0]).await.is_err());

        let standings = manager.player_standings().await.unwrap();
        let wins: i32 = standings.iter().map(|s| s.wins).sum();
        assert_eq!(wins, 1);
        assert_eq!(standings[0].wins, 1);
    }

    #[tokio::test]
    async fn test_report_for_unpaired_players_rejected() {
        let (manager, ids) = manager_with(&["A", "B", "C", "D"]).await;
        manager.swiss_pairings().await.unwrap();

        let err = manager.report_match(ids[0], ids[2]).await.unwrap_err();

        assert!(matches!(
            err,
            TournamentError::NoMatchFound { round: 1, winner, loser } if winner == ids[0] && loser == ids[2]
        ));
        assert!(manager.player_standings().await.unwrap().iter().all(|s| s.wins == 0));
    }

    #[tokio::test]
    async fn test_report_targets_current_round_only() {
        let (manager, ids) = manager_with(&["A", "B", "C", "D"]).await;
        manager.swiss_pairings().await.unwrap();
        manager.report_match(ids[0], ids[1]).await.unwrap();
        manager.report_match(ids[2], ids[3]).await.unwrap();

        // Round 2 pairs the two winners and the two losers.
        let pairs = manager.swiss_pairings().await.unwrap();
        assert_eq!(pairs[0].ids(), (ids[0], ids[2]));
        assert_eq!(pairs[1].ids(), (ids[1], ids[3]));

        // A and B no longer meet in the current round.
        assert!(manager.report_match(ids[0], ids[1]).await.is_err());
        assert_eq!(manager.report_match(ids[2], ids[0]).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_report_on_odd_fresh_tournament_fails_cleanly() {
        let (manager, ids) = manager_with(&["A", "B", "C"]).await;

        let err = manager.report_match(ids[0], ids[1]).await.unwrap_err();

        assert!(matches!(err, TournamentError::OddPlayerCount { .. }));
        assert_eq!(manager.current_round().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_matches_resets_everything_but_players() {
        let (manager, ids) = manager_with(&["A", "B", "C", "D"]).await;
        manager.report_match(ids[0], ids[1]).await.unwrap();
        manager.report_match(ids[2], ids[3]).await.unwrap();
        manager.swiss_pairings().await.unwrap();

        manager.delete_matches().await.unwrap();

        assert_eq!(manager.current_round().await.unwrap(), 0);
        assert_eq!(manager.count_players().await.unwrap(), 4);
        let standings = manager.player_standings().await.unwrap();
        assert!(standings.iter().all(|s| s.wins == 0 && s.matches == 0));
    }

    #[tokio::test]
    async fn test_delete_players_leaves_round_counter() {
        let (manager, _) = manager_with(&["A", "B"]).await;
        manager.swiss_pairings().await.unwrap();

        manager.delete_players().await.unwrap();

        assert_eq!(manager.count_players().await.unwrap(), 0);
        assert_eq!(manager.current_round().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_first_reports_pair_once() {
        let (manager, ids) = manager_with(&["A", "B", "C", "D"]).await;
        let (a, b) = (manager.clone(), manager.clone());

        let (first, second) = tokio::join!(
            a.report_match(ids[0], ids[1]),
            b.report_match(ids[3], ids[2])
        );

        assert_eq!(first.unwrap(), 1);
        assert_eq!(second.unwrap(), 1);
        assert_eq!(manager.current_round().await.unwrap(), 1);
        assert_eq!(manager.repo.count_matches().await.unwrap(), 2);
    }

    /// Store whose every operation times out
    struct UnavailableRepository;

    fn unavailable<T>() -> StoreResult<T> {
        Err(StoreError::Timeout(Duration::from_secs(5)))
    }

    #[async_trait]
    impl TournamentRepository for UnavailableRepository {
        async fn count_players(&self) -> StoreResult<i64> {
            unavailable()
        }
        async fn create_player(&self, _name: &str) -> StoreResult<PlayerId> {
            unavailable()
        }
        async fn get_standings(&self) -> StoreResult<Vec<Standing>> {
            unavailable()
        }
        async fn current_round(&self) -> StoreResult<RoundNumber> {
            unavailable()
        }
        async fn increment_round(&self) -> StoreResult<RoundNumber> {
            unavailable()
        }
        async fn create_match(&self, _: RoundNumber, _: PlayerId, _: PlayerId) -> StoreResult<()> {
            unavailable()
        }
        async fn count_matches(&self) -> StoreResult<i64> {
            unavailable()
        }
        async fn set_match_winner(
            &self,
            _: RoundNumber,
            _: PlayerId,
            _: PlayerId,
            _: PlayerId,
        ) -> StoreResult<u64> {
            unavailable()
        }
        async fn increment_player_wins(&self, _: PlayerId) -> StoreResult<()> {
            unavailable()
        }
        async fn list_matches(&self, _: RoundNumber) -> StoreResult<Vec<Match>> {
            unavailable()
        }
        async fn delete_all_matches(&self) -> StoreResult<()> {
            unavailable()
        }
        async fn reset_round_counter(&self) -> StoreResult<()> {
            unavailable()
        }
        async fn reset_all_player_wins(&self) -> StoreResult<()> {
            unavailable()
        }
        async fn delete_all_players(&self) -> StoreResult<()> {
            unavailable()
        }
    }

    #[tokio::test]
    async fn test_store_errors_propagate_unchanged() {
        let manager = TournamentManager::new(Arc::new(UnavailableRepository));

        let err = manager.report_match(1, 2).await.unwrap_err();
        assert!(matches!(err, TournamentError::Store(StoreError::Timeout(_))));
        assert_eq!(err.client_message(), "Internal server error");

        assert!(matches!(
            manager.swiss_pairings().await,
            Err(TournamentError::Store(_))
        ));
        assert!(matches!(
            manager.delete_matches().await,
            Err(TournamentError::Store(_))
        ));
    }
}
