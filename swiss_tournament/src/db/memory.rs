//! In-memory tournament store.
//!
//! Holds players, matches and the round counter behind a single mutex.
//! Every operation, including the composite ones, runs under that one lock,
//! so each is atomic with respect to the others. Used for tests, demos and
//! embedding without a database.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::errors::StoreResult;
use super::repository::TournamentRepository;
use crate::tournament::models::{Match, Player, PlayerId, RoundNumber, Standing};

#[derive(Debug, Default)]
struct State {
    players: Vec<Player>,
    matches: Vec<Match>,
    round: RoundNumber,
    next_player_id: PlayerId,
}

impl State {
    fn increment_round(&mut self) -> RoundNumber {
        self.round += 1;
        self.round
    }

    fn set_match_winner(
        &mut self,
        round: RoundNumber,
        player1_id: PlayerId,
        player2_id: PlayerId,
        winner_id: PlayerId,
    ) -> u64 {
        if winner_id != player1_id && winner_id != player2_id {
            return 0;
        }

        let mut affected = 0;
        for m in self.matches.iter_mut().filter(|m| {
            m.round == round && !m.is_reported() && m.is_between(player1_id, player2_id)
        }) {
            m.winner_id = Some(winner_id);
            affected += 1;
        }
        affected
    }

    fn increment_player_wins(&mut self, player_id: PlayerId) {
        if let Some(player) = self.players.iter_mut().find(|p| p.id == player_id) {
            player.wins += 1;
        }
    }

    fn reset_matches(&mut self) {
        self.matches.clear();
        self.round = 0;
        for player in &mut self.players {
            player.wins = 0;
        }
    }
}

/// Process-local implementation of `TournamentRepository`
#[derive(Debug, Default)]
pub struct InMemoryTournamentRepository {
    state: Mutex<State>,
}

impl InMemoryTournamentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all registered players, in registration order
    pub fn players(&self) -> Vec<Player> {
        self.state().players.clone()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl TournamentRepository for InMemoryTournamentRepository {
    async fn count_players(&self) -> StoreResult<i64> {
        Ok(self.state().players.len() as i64)
    }

    async fn create_player(&self, name: &str) -> StoreResult<PlayerId> {
        let mut state = self.state();
        state.next_player_id += 1;
        let id = state.next_player_id;
        state.players.push(Player {
            id,
            name: name.to_string(),
            wins: 0,
            registered_at: Utc::now(),
        });
        Ok(id)
    }

    async fn get_standings(&self) -> StoreResult<Vec<Standing>> {
        let state = self.state();
        let mut standings: Vec<Standing> = state
            .players
            .iter()
            .map(|p| Standing {
                id: p.id,
                name: p.name.clone(),
                wins: p.wins,
                matches: state
                    .matches
                    .iter()
                    .filter(|m| m.is_reported() && m.involves(p.id))
                    .count() as i64,
            })
            .collect();
        standings.sort_by(|a, b| b.wins.cmp(&a.wins));
        Ok(standings)
    }

    async fn current_round(&self) -> StoreResult<RoundNumber> {
        Ok(self.state().round)
    }

    async fn increment_round(&self) -> StoreResult<RoundNumber> {
        Ok(self.state().increment_round())
    }

    async fn create_match(
        &self,
        round: RoundNumber,
        player1_id: PlayerId,
        player2_id: PlayerId,
    ) -> StoreResult<()> {
        self.state()
            .matches
            .push(Match::new(round, player1_id, player2_id));
        Ok(())
    }

    async fn count_matches(&self) -> StoreResult<i64> {
        Ok(self.state().matches.len() as i64)
    }

    async fn set_match_winner(
        &self,
        round: RoundNumber,
        player1_id: PlayerId,
        player2_id: PlayerId,
        winner_id: PlayerId,
    ) -> StoreResult<u64> {
        Ok(self
            .state()
            .set_match_winner(round, player1_id, player2_id, winner_id))
    }

    async fn increment_player_wins(&self, player_id: PlayerId) -> StoreResult<()> {
        self.state().increment_player_wins(player_id);
        Ok(())
    }

    async fn list_matches(&self, round: RoundNumber) -> StoreResult<Vec<Match>> {
        Ok(self
            .state()
            .matches
            .iter()
            .filter(|m| m.round == round)
            .cloned()
            .collect())
    }

    async fn delete_all_matches(&self) -> StoreResult<()> {
        self.state().matches.clear();
        Ok(())
    }

    async fn reset_round_counter(&self) -> StoreResult<()> {
        self.state().round = 0;
        Ok(())
    }

    async fn reset_all_player_wins(&self) -> StoreResult<()> {
        for player in &mut self.state().players {
            player.wins = 0;
        }
        Ok(())
    }

    async fn delete_all_players(&self) -> StoreResult<()> {
        let mut state = self.state();
        state.players.clear();
        // Every match references a deleted player.
        state.matches.clear();
        Ok(())
    }

    async fn open_round(&self, pairs: &[(PlayerId, PlayerId)]) -> StoreResult<RoundNumber> {
        let mut state = self.state();
        let round = state.increment_round();
        state.matches.extend(
            pairs
                .iter()
                .map(|&(player1_id, player2_id)| Match::new(round, player1_id, player2_id)),
        );
        Ok(round)
    }

    async fn record_result(
        &self,
        round: RoundNumber,
        winner_id: PlayerId,
        loser_id: PlayerId,
    ) -> StoreResult<u64> {
        let mut state = self.state();
        let affected = state.set_match_winner(round, winner_id, loser_id, winner_id);
        if affected > 0 {
            state.increment_player_wins(winner_id);
        }
        Ok(affected)
    }

    async fn reset_matches(&self) -> StoreResult<()> {
        self.state().reset_matches();
        Ok(())
    }
}
