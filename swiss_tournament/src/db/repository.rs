//! Repository trait for tournament persistence.
//!
//! This module provides a trait-based abstraction over the tournament store,
//! with a PostgreSQL implementation. The in-memory implementation lives in
//! [`super::memory`].

use async_trait::async_trait;
use sqlx::{PgExecutor, PgPool, Row};

use super::errors::StoreResult;
use super::timeouts::{with_default_timeout, with_transaction_timeout};
use crate::tournament::models::{Match, PlayerId, RoundNumber, Standing};

/// Trait for tournament store operations
///
/// The round counter is owned by the store. Core logic reads it with
/// [`current_round`](TournamentRepository::current_round) and passes it back
/// explicitly.
///
/// The composite operations (`open_round`, `record_result`, `reset_matches`)
/// have default implementations built from the primitives. Stores that can
/// run several statements atomically override them.
#[async_trait]
pub trait TournamentRepository: Send + Sync {
    /// Number of registered players
    async fn count_players(&self) -> StoreResult<i64>;

    /// Register a player, returning the store-assigned ID
    async fn create_player(&self, name: &str) -> StoreResult<PlayerId>;

    /// All players ordered by wins descending, then registration order
    async fn get_standings(&self) -> StoreResult<Vec<Standing>>;

    /// Current round number (0 before the first pairing)
    async fn current_round(&self) -> StoreResult<RoundNumber>;

    /// Advance the round counter, returning the new round number
    async fn increment_round(&self) -> StoreResult<RoundNumber>;

    /// Insert an unreported match
    async fn create_match(
        &self,
        round: RoundNumber,
        player1_id: PlayerId,
        player2_id: PlayerId,
    ) -> StoreResult<()>;

    /// Number of matches across all rounds
    async fn count_matches(&self) -> StoreResult<i64>;

    /// Set the winner of the unreported match in `round` between the two
    /// players (either seat order). Returns the number of matches updated.
    async fn set_match_winner(
        &self,
        round: RoundNumber,
        player1_id: PlayerId,
        player2_id: PlayerId,
        winner_id: PlayerId,
    ) -> StoreResult<u64>;

    /// Add one win to a player
    async fn increment_player_wins(&self, player_id: PlayerId) -> StoreResult<()>;

    /// Matches of a round, in creation order
    async fn list_matches(&self, round: RoundNumber) -> StoreResult<Vec<Match>>;

    /// Delete every match
    async fn delete_all_matches(&self) -> StoreResult<()>;

    /// Set the round counter back to 0
    async fn reset_round_counter(&self) -> StoreResult<()>;

    /// Set every player's wins back to 0
    async fn reset_all_player_wins(&self) -> StoreResult<()>;

    /// Delete every player (and, with them, their matches)
    async fn delete_all_players(&self) -> StoreResult<()>;

    /// Advance the round and insert one unreported match per pair
    async fn open_round(&self, pairs: &[(PlayerId, PlayerId)]) -> StoreResult<RoundNumber> {
        let round = self.increment_round().await?;
        for &(player1_id, player2_id) in pairs {
            self.create_match(round, player1_id, player2_id).await?;
        }
        Ok(round)
    }

    /// Record `winner_id` as the winner of its match against `loser_id` and
    /// credit the win. The win is only credited when a match was updated.
    async fn record_result(
        &self,
        round: RoundNumber,
        winner_id: PlayerId,
        loser_id: PlayerId,
    ) -> StoreResult<u64> {
        let affected = self
            .set_match_winner(round, winner_id, loser_id, winner_id)
            .await?;
        if affected > 0 {
            self.increment_player_wins(winner_id).await?;
        }
        Ok(affected)
    }

    /// Delete all matches, reset the round counter and all wins
    async fn reset_matches(&self) -> StoreResult<()> {
        self.delete_all_matches().await?;
        self.reset_round_counter().await?;
        self.reset_all_player_wins().await
    }
}

/// Default PostgreSQL implementation of `TournamentRepository`
#[derive(Clone)]
pub struct PgTournamentRepository {
    pool: PgPool,
}

impl PgTournamentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

async fn increment_round_with<'e>(executor: impl PgExecutor<'e>) -> Result<RoundNumber, sqlx::Error> {
    let row = sqlx::query("UPDATE rounds SET curr_round = curr_round + 1 RETURNING curr_round")
        .fetch_one(executor)
        .await?;
    Ok(row.get("curr_round"))
}

async fn create_match_with<'e>(
    executor: impl PgExecutor<'e>,
    round: RoundNumber,
    player1_id: PlayerId,
    player2_id: PlayerId,
) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO matches (round_num, player1_id, player2_id) VALUES ($1, $2, $3)")
        .bind(round)
        .bind(player1_id)
        .bind(player2_id)
        .execute(executor)
        .await?;
    Ok(())
}

async fn set_match_winner_with<'e>(
    executor: impl PgExecutor<'e>,
    round: RoundNumber,
    player1_id: PlayerId,
    player2_id: PlayerId,
    winner_id: PlayerId,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE matches
        SET winner_id = $4
        WHERE round_num = $1
          AND winner_id IS NULL
          AND $4 IN ($2, $3)
          AND ((player1_id = $2 AND player2_id = $3) OR (player1_id = $3 AND player2_id = $2))
        "#,
    )
    .bind(round)
    .bind(player1_id)
    .bind(player2_id)
    .bind(winner_id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}

async fn increment_player_wins_with<'e>(
    executor: impl PgExecutor<'e>,
    player_id: PlayerId,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE players SET num_wins = num_wins + 1 WHERE player_id = $1")
        .bind(player_id)
        .execute(executor)
        .await?;
    Ok(())
}

#[async_trait]
impl TournamentRepository for PgTournamentRepository {
    async fn count_players(&self) -> StoreResult<i64> {
        let row = with_default_timeout(
            sqlx::query("SELECT COUNT(*) AS count FROM players").fetch_one(&self.pool),
        )
        .await?;
        Ok(row.get("count"))
    }

    async fn create_player(&self, name: &str) -> StoreResult<PlayerId> {
        let row = with_default_timeout(
            sqlx::query("INSERT INTO players (name) VALUES ($1) RETURNING player_id")
                .bind(name)
                .fetch_one(&self.pool),
        )
        .await?;
        Ok(row.get("player_id"))
    }

    async fn get_standings(&self) -> StoreResult<Vec<Standing>> {
        let rows = with_default_timeout(
            sqlx::query(
                r#"
                SELECT p.player_id, p.name, p.num_wins,
                       (SELECT COUNT(*)
                        FROM matches m
                        WHERE m.winner_id IS NOT NULL
                          AND (m.player1_id = p.player_id OR m.player2_id = p.player_id)
                       ) AS matches_played
                FROM players p
                ORDER BY p.num_wins DESC, p.player_id ASC
                "#,
            )
            .fetch_all(&self.pool),
        )
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| Standing {
                id: r.get("player_id"),
                name: r.get("name"),
                wins: r.get("num_wins"),
                matches: r.get("matches_played"),
            })
            .collect())
    }

    async fn current_round(&self) -> StoreResult<RoundNumber> {
        let row = with_default_timeout(
            sqlx::query("SELECT curr_round FROM rounds").fetch_one(&self.pool),
        )
        .await?;
        Ok(row.get("curr_round"))
    }

    async fn increment_round(&self) -> StoreResult<RoundNumber> {
        with_default_timeout(increment_round_with(&self.pool)).await
    }

    async fn create_match(
        &self,
        round: RoundNumber,
        player1_id: PlayerId,
        player2_id: PlayerId,
    ) -> StoreResult<()> {
        with_default_timeout(create_match_with(&self.pool, round, player1_id, player2_id)).await
    }

    async fn count_matches(&self) -> StoreResult<i64> {
        let row = with_default_timeout(
            sqlx::query("SELECT COUNT(*) AS count FROM matches").fetch_one(&self.pool),
        )
        .await?;
        Ok(row.get("count"))
    }

    async fn set_match_winner(
        &self,
        round: RoundNumber,
        player1_id: PlayerId,
        player2_id: PlayerId,
        winner_id: PlayerId,
    ) -> StoreResult<u64> {
        with_default_timeout(set_match_winner_with(
            &self.pool, round, player1_id, player2_id, winner_id,
        ))
        .await
    }

    async fn increment_player_wins(&self, player_id: PlayerId) -> StoreResult<()> {
        with_default_timeout(increment_player_wins_with(&self.pool, player_id)).await
    }

    async fn list_matches(&self, round: RoundNumber) -> StoreResult<Vec<Match>> {
        let rows = with_default_timeout(
            sqlx::query(
                "SELECT round_num, player1_id, player2_id, winner_id
                 FROM matches WHERE round_num = $1 ORDER BY match_id",
            )
            .bind(round)
            .fetch_all(&self.pool),
        )
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| Match {
                round: r.get("round_num"),
                player1_id: r.get("player1_id"),
                player2_id: r.get("player2_id"),
                winner_id: r.get("winner_id"),
            })
            .collect())
    }

    async fn delete_all_matches(&self) -> StoreResult<()> {
        with_default_timeout(sqlx::query("DELETE FROM matches").execute(&self.pool)).await?;
        Ok(())
    }

    async fn reset_round_counter(&self) -> StoreResult<()> {
        with_default_timeout(sqlx::query("UPDATE rounds SET curr_round = 0").execute(&self.pool))
            .await?;
        Ok(())
    }

    async fn reset_all_player_wins(&self) -> StoreResult<()> {
        with_default_timeout(sqlx::query("UPDATE players SET num_wins = 0").execute(&self.pool))
            .await?;
        Ok(())
    }

    async fn delete_all_players(&self) -> StoreResult<()> {
        with_default_timeout(sqlx::query("DELETE FROM players").execute(&self.pool)).await?;
        Ok(())
    }

    async fn open_round(&self, pairs: &[(PlayerId, PlayerId)]) -> StoreResult<RoundNumber> {
        with_transaction_timeout(async {
            let mut tx = self.pool.begin().await?;

            let round = increment_round_with(&mut *tx).await?;
            for &(player1_id, player2_id) in pairs {
                create_match_with(&mut *tx, round, player1_id, player2_id).await?;
            }

            tx.commit().await?;
            Ok::<_, sqlx::Error>(round)
        })
        .await
    }

    async fn record_result(
        &self,
        round: RoundNumber,
        winner_id: PlayerId,
        loser_id: PlayerId,
    ) -> StoreResult<u64> {
        with_transaction_timeout(async {
            let mut tx = self.pool.begin().await?;

            let affected =
                set_match_winner_with(&mut *tx, round, winner_id, loser_id, winner_id).await?;
            if affected == 0 {
                tx.rollback().await?;
                return Ok(0);
            }

            increment_player_wins_with(&mut *tx, winner_id).await?;
            tx.commit().await?;
            Ok::<_, sqlx::Error>(affected)
        })
        .await
    }

    async fn reset_matches(&self) -> StoreResult<()> {
        with_transaction_timeout(async {
            let mut tx = self.pool.begin().await?;

            sqlx::query("DELETE FROM matches").execute(&mut *tx).await?;
            sqlx::query("UPDATE rounds SET curr_round = 0")
                .execute(&mut *tx)
                .await?;
            sqlx::query("UPDATE players SET num_wins = 0")
                .execute(&mut *tx)
                .await?;

            tx.commit().await?;
            Ok::<_, sqlx::Error>(())
        })
        .await
    }
}
