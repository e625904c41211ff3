use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "pokerdb",
    about = "pokerdb: ledger for poker home games: players, buy-ins, and settled sessions",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Directory holding database files [default: ~/.config/pokerdb]
    #[arg(long, global = true, value_name = "PATH")]
    pub data_dir: Option<PathBuf>,

    /// Rounds of final-stack entry allowed before settlement gives up
    #[arg(long, global = true, value_name = "N")]
    pub max_attempts: Option<u32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create a new, empty database
    #[command(name = "newdb")]
    NewDb(NewDbArgs),
    /// Register a player in a database
    #[command(name = "addPlayer", alias = "add-player")]
    AddPlayer(AddPlayerArgs),
    /// List players with their lifetime profit
    #[command(name = "listPlayers", alias = "list-players")]
    ListPlayers(DbArgs),
    /// Rename a player, keeping their statistics
    #[command(name = "renamePlayer", alias = "rename-player")]
    RenamePlayer(RenamePlayerArgs),
    /// Run an interactive session and settle it
    #[command(name = "startSession", alias = "start-session")]
    StartSession(DbArgs),
    /// Show the leaderboard and database totals
    Stats(DbArgs),
}

#[derive(Args)]
pub struct NewDbArgs {
    pub name: String,
    /// Overwrite an existing database of the same name
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct DbArgs {
    pub db: String,
}

#[derive(Args)]
pub struct AddPlayerArgs {
    pub db: String,
    pub name: String,
}

#[derive(Args)]
pub struct RenamePlayerArgs {
    pub db: String,
    pub old_name: String,
    pub new_name: String,
}
