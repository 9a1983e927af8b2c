// Command-line parsing
//
//   residency-tracker [--db PATH] load-states [--file PATH] [--update]
//   residency-tracker [--db PATH] states

use crate::config::Config;
use crate::loader::LoadMode;
use anyhow::{anyhow, bail, Result};
use std::path::PathBuf;

pub const USAGE: &str = "\
Usage: residency-tracker [--db PATH] <command>

Commands:
  load-states [--file PATH] [--update]
      Load US states from a YAML fixture (default: fixtures/states.yaml).
      Existing states are skipped unless --update is given.
  states
      List stored states.

Environment:
  RESIDENCY_DB_PATH         database file (default: residency.db)
  RESIDENCY_STATES_FIXTURE  default fixture for load-states
  RUST_LOG                  log filter (default: info)";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    LoadStates { file: PathBuf, mode: LoadMode },
    ListStates,
    Help,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub database_path: PathBuf,
    pub command: Command,
}

/// Parse arguments (without the program name) on top of a base config
pub fn parse_args<I, S>(args: I, config: &Config) -> Result<Invocation>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut args = args.into_iter().map(Into::into);
    let mut database_path = config.database_path.clone();
    let mut command = None;
    let mut file = config.fixture_path.clone();
    let mut mode = LoadMode::Skip;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                return Ok(Invocation {
                    database_path,
                    command: Command::Help,
                })
            }
            "--db" => database_path = PathBuf::from(value_for("--db", args.next())?),
            "load-states" | "states" if command.is_none() => command = Some(arg.clone()),
            "--file" if command.as_deref() == Some("load-states") => {
                file = PathBuf::from(value_for("--file", args.next())?)
            }
            "--update" if command.as_deref() == Some("load-states") => mode = LoadMode::Update,
            other => bail!("unexpected argument '{}'\n\n{}", other, USAGE),
        }
    }

    let command = match command.as_deref() {
        Some("load-states") => Command::LoadStates { file, mode },
        Some("states") => Command::ListStates,
        _ => Command::Help,
    };

    Ok(Invocation {
        database_path,
        command,
    })
}

fn value_for(flag: &str, value: Option<String>) -> Result<String> {
    value
        .filter(|v| !v.starts_with("--"))
        .ok_or_else(|| anyhow!("{} requires a value", flag))
}
