//! Command-line driver for a Swiss tournament.
//!
//! Every command except `simulate` runs against PostgreSQL; `simulate`
//! plays a throwaway tournament in memory with random results.

mod commands;

use anyhow::{Context, Error};
use log::info;
use pico_args::Arguments;
use swiss_tournament::{
    RoundNumber, TournamentManager,
    db::{Database, DatabaseConfig},
};

use commands::Command;

const HELP: &str = "\
Run a Swiss-system tournament

USAGE:
  st_cli [OPTIONS] <COMMAND>

COMMANDS:
  migrate                      Create or update the tournament schema
  register <NAME>...           Register one or more players
  count                        Print the number of registered players
  standings                    Print players ranked by wins
  pair                         Pair the next round and print the pairings
  report <WINNER> <LOSER>      Record a match result in the current round
  matches                      Print the matches of a round
  reset-matches                Delete all matches, reset round and wins
  reset-players                Delete all players
  simulate                     Play an in-memory tournament with random results

OPTIONS:
  --db-url     URL         Database connection string  [default: env DATABASE_URL]
  --round      N           Round for `matches`  [default: current round]
  --players    N           Players for `simulate`  [default: 8]
  --rounds     N           Rounds for `simulate`  [default: 3]

FLAGS:
  --json                   Print results as JSON
  -h, --help               Print help information

ENVIRONMENT:
  DATABASE_URL             PostgreSQL connection string
  DB_MAX_CONNECTIONS       Pool size  [default: 10]
  RUST_LOG                 Log filter, e.g. info or debug
";

struct Args {
    database_url: Option<String>,
    json: bool,
    command: Command,
}

fn parse_args(mut pargs: Arguments) -> Result<Args, Error> {
    let database_url = pargs.opt_value_from_str("--db-url")?;
    let json = pargs.contains("--json");
    let round: Option<RoundNumber> = pargs.opt_value_from_str("--round")?;
    let players: usize = pargs.opt_value_from_str("--players")?.unwrap_or(8);
    let rounds: u32 = pargs.opt_value_from_str("--rounds")?.unwrap_or(3);

    let subcommand = pargs
        .subcommand()?
        .context("missing command (see --help)")?;

    let command = match subcommand.as_str() {
        "migrate" => Command::Migrate,
        "register" => {
            let names: Vec<String> = pargs
                .finish()
                .into_iter()
                .map(|arg| arg.to_string_lossy().into_owned())
                .collect();
            if names.is_empty() {
                anyhow::bail!("register needs at least one name");
            }
            return Ok(Args {
                database_url,
                json,
                command: Command::Register(names),
            });
        }
        "count" => Command::Count,
        "standings" => Command::Standings,
        "pair" => Command::Pair,
        "report" => Command::Report {
            winner: pargs.free_from_str().context("missing WINNER id")?,
            loser: pargs.free_from_str().context("missing LOSER id")?,
        },
        "matches" => Command::Matches { round },
        "reset-matches" => Command::ResetMatches,
        "reset-players" => Command::ResetPlayers,
        "simulate" => Command::Simulate { players, rounds },
        other => anyhow::bail!("unknown command '{other}' (see --help)"),
    };

    let rest = pargs.finish();
    if !rest.is_empty() {
        anyhow::bail!("unexpected arguments: {rest:?}");
    }

    Ok(Args {
        database_url,
        json,
        command,
    })
}

async fn connect(database_url: Option<String>) -> Result<Database, Error> {
    let config = match database_url {
        Some(url) => DatabaseConfig::with_url_from_env(url)?,
        None => DatabaseConfig::from_env()?,
    };

    info!("Connecting to database");
    let db = Database::new(&config)
        .await
        .context("Failed to connect to database")?;
    db.migrate().await.context("Failed to apply migrations")?;
    Ok(db)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    env_logger::builder().format_target(false).init();

    let args = parse_args(pargs)?;

    let manager = if args.command.is_in_memory() {
        TournamentManager::in_memory()
    } else {
        let db = connect(args.database_url).await?;
        TournamentManager::postgres(db.pool().clone())
    };

    commands::run(&manager, args.command, args.json).await
}
