//! Tournament module for Swiss-system play.
//!
//! This module provides the tournament core:
//! - Player registration
//! - Standings ranked by win count
//! - Adjacent-rank pairing of each new round
//! - Match result recording, with first-round pairing on demand
//! - Match and player resets
//!
//! Each round moves through `no matches yet -> paired -> fully reported`.
//! Reporting never starts the next round; call
//! [`TournamentManager::swiss_pairings`] again for that.
//!
//! ## Example
//!
//! ```
//! use swiss_tournament::tournament::TournamentManager;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let tournament = TournamentManager::in_memory();
//!
//!     let ada = tournament.register_player("Ada").await?;
//!     let grace = tournament.register_player("Grace").await?;
//!
//!     // The first report pairs round 1 on its own.
//!     tournament.report_match(ada, grace).await?;
//!
//!     let standings = tournament.player_standings().await?;
//!     assert_eq!(standings[0].id, ada);
//!     assert_eq!(standings[0].wins, 1);
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod manager;
pub mod models;
pub mod pairing;
pub mod standings;

pub use errors::{TournamentError, TournamentResult};
pub use manager::TournamentManager;
pub use models::{Match, Pairing, Player, PlayerId, RoundNumber, Standing};
