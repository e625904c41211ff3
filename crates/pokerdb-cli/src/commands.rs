use std::fmt::Write as _;
use std::io::{self, IsTerminal};

use colored::Colorize;
use pokerdb_ledger::{SessionLedger, SettlementEngine, SettlementReport, StatsProjection};
use pokerdb_store::{DatabaseStore, FileStore};
use pokerdb_types::{Database, Money, RegistryError};
use tracing::{debug, info};

use crate::cli::*;
use crate::config::AppConfig;
use crate::controller::SessionController;
use crate::input::{InputProvider, LineInput, TerminalInput};

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = AppConfig::from_cli(&cli)?;
    debug!(root = %config.store.root.display(), max_attempts = config.settlement.max_attempts, "configuration resolved");
    let store = FileStore::new(config.store.clone());
    let engine = SettlementEngine::new(config.settlement.clone());

    match cli.command {
        Command::NewDb(args) => cmd_newdb(&store, args),
        Command::AddPlayer(args) => reported(cmd_add_player(&store, args)),
        Command::ListPlayers(args) => cmd_list_players(&store, args, config.format),
        Command::RenamePlayer(args) => reported(cmd_rename_player(&store, args)),
        Command::StartSession(args) => cmd_start_session(&store, &engine, args),
        Command::Stats(args) => cmd_stats(&store, args, config.format),
    }
}

/// Player-level failures are reported and leave the database untouched;
/// they do not fail the process.
fn reported(result: anyhow::Result<()>) -> anyhow::Result<()> {
    match result {
        Err(err) if err.downcast_ref::<RegistryError>().is_some() => {
            eprintln!("{} {err}", "error:".red().bold());
            Ok(())
        }
        other => other,
    }
}

fn cmd_newdb(store: &FileStore, args: NewDbArgs) -> anyhow::Result<()> {
    create_database(store, &args.name, args.force)?;
    println!(
        "{} Created database {} at {}",
        "✓".green().bold(),
        args.name.yellow(),
        store.path_for(&args.name)?.display()
    );
    Ok(())
}

fn cmd_add_player(store: &impl DatabaseStore, args: AddPlayerArgs) -> anyhow::Result<()> {
    add_player(store, &args.db, &args.name)?;
    println!("Player {} added.", args.name.bold());
    Ok(())
}

fn cmd_list_players(store: &impl DatabaseStore, args: DbArgs, format: OutputFormat) -> anyhow::Result<()> {
    let db = store.open(&args.db)?;
    match format {
        OutputFormat::Text => print!("{}", render_players(&db)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&db.players)?),
    }
    Ok(())
}

fn cmd_rename_player(store: &impl DatabaseStore, args: RenamePlayerArgs) -> anyhow::Result<()> {
    rename_player(store, &args.db, &args.old_name, &args.new_name)?;
    println!("Player renamed to: {}", args.new_name.bold());
    Ok(())
}

fn cmd_start_session(
    store: &impl DatabaseStore,
    engine: &SettlementEngine,
    args: DbArgs,
) -> anyhow::Result<()> {
    let report = if io::stdin().is_terminal() {
        start_session(store, engine, &args.db, &mut TerminalInput)?
    } else {
        let stdin = io::stdin();
        let mut input = LineInput::new(stdin.lock(), io::stdout());
        start_session(store, engine, &args.db, &mut input)?
    };
    if let Some(report) = report {
        println!("{} Session saved to {}", "✓".green().bold(), args.db.yellow());
        print!("{}", render_settlement(&report));
    }
    Ok(())
}

fn cmd_stats(store: &impl DatabaseStore, args: DbArgs, format: OutputFormat) -> anyhow::Result<()> {
    let db = store.open(&args.db)?;
    let stats = StatsProjection::build(&db);
    match format {
        OutputFormat::Text => print!("{}", render_stats(&stats)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
    }
    Ok(())
}

pub fn create_database(store: &impl DatabaseStore, name: &str, force: bool) -> anyhow::Result<Database> {
    let db = if force {
        store.recreate(name)?
    } else {
        store.create(name)?
    };
    info!(db = name, force, "database created");
    Ok(db)
}

pub fn add_player(store: &impl DatabaseStore, db_name: &str, name: &str) -> anyhow::Result<()> {
    let mut db = store.open(db_name)?;
    db.players.add(name)?;
    store.save(db_name, &db)?;
    info!(db = db_name, player = name, "player added");
    Ok(())
}

pub fn rename_player(
    store: &impl DatabaseStore,
    db_name: &str,
    old_name: &str,
    new_name: &str,
) -> anyhow::Result<()> {
    let mut db = store.open(db_name)?;
    db.players.rename(old_name, new_name)?;
    store.save(db_name, &db)?;
    info!(db = db_name, from = old_name, to = new_name, "player renamed");
    Ok(())
}

/// Run an interactive session against `db_name` and save the result.
///
/// Returns `None` when there was nobody to play with. Nothing from the
/// session is saved unless it settles; players registered along the way are
/// saved as soon as they are added.
pub fn start_session<I: InputProvider + ?Sized>(
    store: &impl DatabaseStore,
    engine: &SettlementEngine,
    db_name: &str,
    input: &mut I,
) -> anyhow::Result<Option<SettlementReport>> {
    let mut db = store.open(db_name)?;
    if db.players.is_empty() {
        input.error("No players in the database. Add players first.");
        return Ok(None);
    }

    let ledger = SessionLedger::open();
    info!(db = db_name, start = %ledger.session().start_time, "session started");
    let report = SessionController::new(input, engine).run(&mut db, ledger, |db| {
        store.save(db_name, db)?;
        Ok(())
    })?;
    store.save(db_name, &db)?;
    Ok(Some(report))
}

pub fn render_players(db: &Database) -> String {
    if db.players.is_empty() {
        return "No players in the database.\n".to_string();
    }
    let mut out = String::from("List of Players:\n----------------\n");
    for player in db.players.iter() {
        let _ = writeln!(out, "Name: {}, Profit: {}", player.name, player.profit);
    }
    out
}

pub fn render_settlement(report: &SettlementReport) -> String {
    let mut out = format!(
        "Session settled: {} players, {:.2} hours, {} in play\n",
        report.outcomes.len(),
        report.hours,
        report.session.total_contributions()
    );
    for outcome in &report.outcomes {
        let _ = writeln!(
            out,
            "  {}: in {}, out {}, profit {}",
            outcome.name,
            outcome.contribution,
            outcome.final_stack,
            signed(outcome.profit)
        );
    }
    out
}

pub fn render_stats(stats: &StatsProjection) -> String {
    let mut out = String::new();
    if stats.is_empty() {
        out.push_str("No players in the database.\n");
    } else {
        let width = stats
            .leaderboard
            .iter()
            .map(|p| p.name.chars().count())
            .max()
            .unwrap_or(0)
            .max(4);
        let _ = writeln!(
            out,
            "{:>3}  {:<width$}  {:>10}  {:>8}  {:>7}  {:>11}  {:>9}",
            "#", "Name", "Profit", "Sessions", "Hours", "Per Session", "Per Hour"
        );
        for (rank, p) in stats.leaderboard.iter().enumerate() {
            let per_session = p.profit_per_session.map(signed).unwrap_or_else(|| "-".into());
            let per_hour = p
                .profit_per_hour
                .map(|v| format!("{v:+.2}"))
                .unwrap_or_else(|| "-".into());
            let _ = writeln!(
                out,
                "{:>3}  {:<width$}  {:>10}  {:>8}  {:>7.2}  {:>11}  {:>9}",
                rank + 1,
                p.name,
                signed(p.profit),
                p.sessions,
                p.hours_played,
                per_session,
                per_hour
            );
        }
    }

    let s = &stats.summary;
    let _ = writeln!(out, "\nPlayers: {}", s.players);
    let _ = writeln!(out, "Sessions: {}", s.sessions);
    let _ = writeln!(out, "Total hours: {:.2}", s.total_hours);
    let _ = writeln!(out, "Total in play: {}", s.total_in_play);
    let _ = writeln!(out, "Registry net: {}", s.registry_net);
    if s.unbalanced_sessions > 0 {
        let _ = writeln!(out, "Unbalanced sessions: {}", s.unbalanced_sessions);
    }
    out
}

fn signed(amount: Money) -> String {
    if amount.is_negative() {
        amount.to_string()
    } else {
        format!("+{amount}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pokerdb_store::{InMemoryStore, StoreError};
    use std::io::Cursor;

    fn store_with(names: &[&str]) -> InMemoryStore {
        let store = InMemoryStore::new();
        create_database(&store, "friday", false).unwrap();
        for name in names {
            add_player(&store, "friday", name).unwrap();
        }
        store
    }

    fn scripted(lines: &[&str]) -> LineInput<Cursor<Vec<u8>>, Vec<u8>> {
        let mut text = lines.join("\n");
        text.push('\n');
        LineInput::new(Cursor::new(text.into_bytes()), Vec::new())
    }

    #[test]
    fn newdb_refuses_to_overwrite() {
        let store = store_with(&["Alice"]);
        let err = create_database(&store, "friday", false).unwrap_err();
        assert!(matches!(err.downcast_ref::<StoreError>(), Some(StoreError::AlreadyExists(_))));
        assert_eq!(store.open("friday").unwrap().players.len(), 1);
    }

    #[test]
    fn newdb_force_overwrites() {
        let store = store_with(&["Alice"]);
        create_database(&store, "friday", true).unwrap();
        assert!(store.open("friday").unwrap().players.is_empty());
    }

    #[test]
    fn add_player_persists() {
        let store = store_with(&["Alice", "Bob"]);
        let db = store.open("friday").unwrap();
        assert!(db.players.exists("Alice"));
        assert!(db.players.exists("Bob"));
    }

    #[test]
    fn duplicate_player_is_reported_not_fatal() {
        let store = store_with(&["Alice"]);
        let result = add_player(&store, "friday", "Alice");
        assert!(matches!(
            result.as_ref().unwrap_err().downcast_ref::<RegistryError>(),
            Some(RegistryError::AlreadyExists(_))
        ));
        assert!(reported(result).is_ok());
    }

    #[test]
    fn missing_database_is_fatal() {
        let store = InMemoryStore::new();
        let result = add_player(&store, "nope", "Alice");
        assert!(reported(result).is_err());
    }

    #[test]
    fn rename_keeps_stats_and_rejects_taken_names() {
        let store = store_with(&["Alice", "Bob"]);
        rename_player(&store, "friday", "Bob", "Robert").unwrap();
        let db = store.open("friday").unwrap();
        assert!(db.players.exists("Robert"));
        assert!(!db.players.exists("Bob"));

        let err = rename_player(&store, "friday", "Robert", "Alice").unwrap_err();
        assert!(matches!(err.downcast_ref::<RegistryError>(), Some(RegistryError::AlreadyExists(_))));
        let err = rename_player(&store, "friday", "Zed", "Zack").unwrap_err();
        assert!(matches!(err.downcast_ref::<RegistryError>(), Some(RegistryError::NotFound(_))));
    }

    #[test]
    fn list_players_text() {
        let store = store_with(&["Alice", "Bob"]);
        let text = render_players(&store.open("friday").unwrap());
        assert_eq!(
            text,
            "List of Players:\n----------------\nName: Alice, Profit: 0.00\nName: Bob, Profit: 0.00\n"
        );
        assert_eq!(render_players(&Database::new()), "No players in the database.\n");
    }

    #[test]
    fn session_is_saved_after_settlement() {
        let store = store_with(&["Alice", "Bob"]);
        let mut input = scripted(&["1", "Alice", "100", "1", "Bob", "100", "4", "150", "50"]);
        let report = start_session(&store, &SettlementEngine::default(), "friday", &mut input)
            .unwrap()
            .unwrap();
        assert_eq!(report.outcomes.len(), 2);

        let db = store.open("friday").unwrap();
        assert_eq!(db.sessions().len(), 1);
        assert_eq!(db.players.get("Alice").unwrap().profit, Money::from_units(50));
        assert_eq!(db.players.get("Bob").unwrap().profit, Money::from_units(-50));

        let text = render_settlement(&report);
        assert!(text.contains("Alice: in 100.00, out 150.00, profit +50.00"));
        assert!(text.contains("Bob: in 100.00, out 50.00, profit -50.00"));
    }

    #[test]
    fn empty_registry_refuses_to_start() {
        let store = store_with(&[]);
        let mut input = scripted(&[]);
        let report = start_session(&store, &SettlementEngine::default(), "friday", &mut input).unwrap();
        assert!(report.is_none());
        let out = String::from_utf8(input.writer().clone()).unwrap();
        assert!(out.contains("Add players first."));
    }

    #[test]
    fn aborted_session_keeps_registered_players_only() {
        let store = store_with(&["Alice"]);
        let mut input = scripted(&["1", "Alice", "20", "3", "Dana", "20", "4"]);
        assert!(start_session(&store, &SettlementEngine::default(), "friday", &mut input).is_err());

        let db = store.open("friday").unwrap();
        assert!(db.players.exists("Dana"));
        assert!(db.sessions().is_empty());
        assert_eq!(db.players.get("Alice").unwrap().sessions, 0);
    }

    #[test]
    fn stats_text_lists_leaderboard_and_summary() {
        let store = store_with(&["Alice", "Bob", "Carol"]);
        let mut input = scripted(&["1", "Alice", "100", "1", "Bob", "100", "4", "150", "50"]);
        start_session(&store, &SettlementEngine::default(), "friday", &mut input).unwrap();

        let text = render_stats(&StatsProjection::build(&store.open("friday").unwrap()));
        let alice = text.find("Alice").unwrap();
        let carol = text.find("Carol").unwrap();
        let bob = text.find("Bob").unwrap();
        assert!(alice < carol && carol < bob);
        assert!(text.contains("Sessions: 1"));
        assert!(text.contains("Total in play: 200.00"));
        assert!(text.contains("Registry net: 0.00"));
        assert!(!text.contains("Unbalanced"));
    }
}
