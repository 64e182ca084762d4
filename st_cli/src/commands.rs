//! Command execution and output rendering.

use anyhow::Error;
use rand::Rng;
use serde_json::json;
use swiss_tournament::{Match, Pairing, PlayerId, RoundNumber, Standing, TournamentManager};

/// A parsed command
#[derive(Debug)]
pub enum Command {
    Migrate,
    Register(Vec<String>),
    Count,
    Standings,
    Pair,
    Report { winner: PlayerId, loser: PlayerId },
    Matches { round: Option<RoundNumber> },
    ResetMatches,
    ResetPlayers,
    Simulate { players: usize, rounds: u32 },
}

impl Command {
    /// Whether the command runs without a database
    pub fn is_in_memory(&self) -> bool {
        matches!(self, Command::Simulate { .. })
    }
}

/// Execute a command against the manager and print its result
pub async fn run(manager: &TournamentManager, command: Command, json: bool) -> Result<(), Error> {
    match command {
        Command::Migrate => {
            println!("Schema is up to date");
        }
        Command::Register(names) => {
            let mut ids = Vec::with_capacity(names.len());
            for name in &names {
                ids.push(manager.register_player(name).await?);
            }
            if json {
                println!("{}", json!({ "registered": ids }));
            } else {
                for (id, name) in ids.iter().zip(&names) {
                    println!("Registered #{id} {}", name.trim());
                }
            }
        }
        Command::Count => {
            let count = manager.count_players().await?;
            if json {
                println!("{}", json!({ "players": count }));
            } else {
                println!("{count}");
            }
        }
        Command::Standings => {
            let standings = manager.player_standings().await?;
            let round = manager.current_round().await?;
            print_standings(&standings, round, json)?;
        }
        Command::Pair => {
            let pairs = manager.swiss_pairings().await?;
            let round = manager.current_round().await?;
            print_pairings(&pairs, round, json)?;
        }
        Command::Report { winner, loser } => {
            let round = manager.report_match(winner, loser).await?;
            if json {
                println!(
                    "{}",
                    json!({ "round": round, "winner": winner, "loser": loser })
                );
            } else {
                println!("Round {round}: #{winner} beat #{loser}");
            }
        }
        Command::Matches { round } => {
            let round = match round {
                Some(round) => round,
                None => manager.current_round().await?,
            };
            let matches = manager.round_matches(round).await?;
            print_matches(&matches, round, json)?;
        }
        Command::ResetMatches => {
            manager.delete_matches().await?;
            println!("Matches deleted; round counter and wins reset");
        }
        Command::ResetPlayers => {
            manager.delete_players().await?;
            println!("Players deleted");
        }
        Command::Simulate { players, rounds } => {
            simulate(manager, players, rounds, json).await?;
        }
    }
    Ok(())
}

/// Play `rounds` rounds with random winners and print the final standings
async fn simulate(
    manager: &TournamentManager,
    players: usize,
    rounds: u32,
    json: bool,
) -> Result<(), Error> {
    for i in 1..=players {
        manager.register_player(&format!("Player {i}")).await?;
    }

    let mut rng = rand::rng();
    for _ in 0..rounds {
        let pairs = manager.swiss_pairings().await?;
        let round = manager.current_round().await?;
        if !json {
            print_pairings(&pairs, round, false)?;
        }

        for pairing in &pairs {
            let (winner, loser) = if rng.random_bool(0.5) {
                (pairing.player1_id, pairing.player2_id)
            } else {
                (pairing.player2_id, pairing.player1_id)
            };
            manager.report_match(winner, loser).await?;
        }
    }

    let standings = manager.player_standings().await?;
    print_standings(&standings, manager.current_round().await?, json)
}

fn print_standings(standings: &[Standing], round: RoundNumber, json: bool) -> Result<(), Error> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({ "round": round, "standings": standings }))?
        );
        return Ok(());
    }

    println!("Standings after round {round}");
    println!("{:>4}  {:>6}  {:<30} {:>4} {:>4} {:>4}", "rank", "id", "name", "W", "L", "P");
    for (rank, s) in standings.iter().enumerate() {
        println!(
            "{:>4}  {:>6}  {:<30} {:>4} {:>4} {:>4}",
            rank + 1,
            s.id,
            s.name,
            s.wins,
            s.losses(),
            s.matches
        );
    }
    Ok(())
}

fn print_pairings(pairs: &[Pairing], round: RoundNumber, json: bool) -> Result<(), Error> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({ "round": round, "pairings": pairs }))?
        );
        return Ok(());
    }

    println!("Round {round} pairings");
    for p in pairs {
        println!(
            "  #{} {}  vs  #{} {}",
            p.player1_id, p.player1_name, p.player2_id, p.player2_name
        );
    }
    Ok(())
}

fn print_matches(matches: &[Match], round: RoundNumber, json: bool) -> Result<(), Error> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({ "round": round, "matches": matches }))?
        );
        return Ok(());
    }

    println!("Round {round} matches");
    for m in matches {
        let result = match m.winner_id {
            Some(winner) => format!("winner #{winner}"),
            None => "pending".to_string(),
        };
        println!("  #{} vs #{}  {}", m.player1_id, m.player2_id, result);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_simulate_plays_all_rounds() {
        let manager = TournamentManager::in_memory();

        simulate(&manager, 8, 3, true).await.unwrap();

        assert_eq!(manager.current_round().await.unwrap(), 3);
        let standings = manager.player_standings().await.unwrap();
        assert_eq!(standings.len(), 8);
        let wins: i32 = standings.iter().map(|s| s.wins).sum();
        assert_eq!(wins, 12);
    }

    #[tokio::test]
    async fn test_simulate_odd_field_fails() {
        let manager = TournamentManager::in_memory();
        assert!(simulate(&manager, 5, 1, true).await.is_err());
    }

    #[tokio::test]
    async fn test_run_register_and_report() {
        let manager = TournamentManager::in_memory();

        run(
            &manager,
            Command::Register(vec!["Ada".into(), "Grace".into()]),
            true,
        )
        .await
        .unwrap();
        run(&manager, Command::Report { winner: 2, loser: 1 }, true)
            .await
            .unwrap();

        let standings = manager.player_standings().await.unwrap();
        assert_eq!(standings[0].name, "Grace");
        assert_eq!(standings[0].wins, 1);
        assert!(run(&manager, Command::Report { winner: 2, loser: 1 }, true)
            .await
            .is_err());
    }
}
