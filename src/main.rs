use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;
use tracing::error;

use residency_tracker::cli::{self, Command, USAGE};
use residency_tracker::{get_all_states, load_states, logging, setup_database, Config, LoadMode};

fn main() {
    logging::init();

    if let Err(e) = run() {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let config = Config::from_env();
    let invocation = cli::parse_args(std::env::args().skip(1), &config)?;

    match invocation.command {
        Command::LoadStates { file, mode } => {
            run_load_states(&invocation.database_path, &file, mode)
        }
        Command::ListStates => run_list_states(&invocation.database_path),
        Command::Help => {
            println!("{}", USAGE);
            Ok(())
        }
    }
}

fn open_database(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;
    setup_database(&conn).context("Failed to initialize database schema")?;
    Ok(conn)
}

fn run_load_states(db_path: &Path, file: &Path, mode: LoadMode) -> Result<()> {
    println!("🗺️  Loading states from {}", file.display());

    let mut conn = open_database(db_path)?;
    let report = load_states(&mut conn, file, mode)
        .with_context(|| format!("Error loading fixtures from {}", file.display()))?;

    for record in &report.outcomes {
        println!(
            "  {}: {} ({})",
            record.outcome.as_str(),
            record.name,
            record.abbreviation
        );
    }

    println!("\n{}", "=".repeat(50));
    println!("✓ Created:   {}", report.created());
    println!("✓ Updated:   {}", report.updated());
    if mode == LoadMode::Update {
        println!("✓ Unchanged: {}", report.unchanged());
    }
    println!("⚠ Skipped:   {}", report.skipped());
    println!("{}", "=".repeat(50));

    Ok(())
}

fn run_list_states(db_path: &Path) -> Result<()> {
    let conn = open_database(db_path)?;
    let states = get_all_states(&conn)?;

    if states.is_empty() {
        println!("No states stored. Run: residency-tracker load-states");
        return Ok(());
    }

    println!("{:<4} {:<24} {:>9}  {}", "Abbr", "Name", "Threshold", "Active");
    for state in &states {
        println!(
            "{:<4} {:<24} {:>9}  {}",
            state.abbreviation,
            state.name,
            state.day_threshold,
            if state.is_active { "yes" } else { "no" }
        );
    }
    println!("\n✓ {} states", states.len());

    Ok(())
}
