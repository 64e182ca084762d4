//! # Swiss Tournament
//!
//! A Swiss-system tournament library: player registration, round-by-round
//! pairing, match result recording and standings.
//!
//! Players are ranked by win count and each round pairs neighbours in the
//! ranking. The core runs against a [`db::TournamentRepository`], with a
//! PostgreSQL store for persistent use and an in-memory store for tests and
//! embedding.
//!
//! ## Core Modules
//!
//! - [`tournament`]: Standings, pairing and the round/match lifecycle
//! - [`db`]: Store trait, PostgreSQL and in-memory stores, connection config
//! - [`security`]: Sanitization of caller-supplied names
//!
//! ## Example
//!
//! ```no_run
//! use swiss_tournament::db::{Database, DatabaseConfig};
//! use swiss_tournament::TournamentManager;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::new(&DatabaseConfig::from_env()?).await?;
//!     db.migrate().await?;
//!
//!     let tournament = TournamentManager::postgres(db.pool().clone());
//!     for pairing in tournament.swiss_pairings().await? {
//!         println!("{} vs {}", pairing.player1_name, pairing.player2_name);
//!     }
//!     Ok(())
//! }
//! ```

/// Persistence: store trait, PostgreSQL and in-memory implementations.
pub mod db;

/// Input sanitization.
pub mod security;

/// Swiss pairing, standings and match recording.
pub mod tournament;
pub use tournament::{
    Match, Pairing, Player, PlayerId, RoundNumber, Standing, TournamentError, TournamentManager,
    TournamentResult,
};
