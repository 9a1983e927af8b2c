use crate::entities::{normalize_abbreviation, State};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

/// Event for audit trail ("Every change is an event")
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Event {
    pub event_id: String,
    pub timestamp: DateTime<Utc>,
    pub event_type: String,
    pub entity_type: String,
    pub entity_id: String,
    pub data: serde_json::Value,
    pub actor: String,
}

impl Event {
    pub fn new(
        event_type: &str,
        entity_type: &str,
        entity_id: &str,
        data: serde_json::Value,
        actor: &str,
    ) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            event_type: event_type.to_string(),
            entity_type: entity_type.to_string(),
            entity_id: entity_id.to_string(),
            data,
            actor: actor.to_string(),
        }
    }
}

pub fn setup_database(conn: &Connection) -> rusqlite::Result<()> {
    // WAL for crash recovery; in-memory databases stay in "memory" mode
    let _mode: String =
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;

    // ==========================================================================
    // States Table
    // abbreviation is the natural key, state_uuid the stable identity
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS states (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            state_uuid TEXT UNIQUE NOT NULL,
            abbreviation TEXT UNIQUE NOT NULL CHECK (length(abbreviation) = 2),
            name TEXT UNIQUE NOT NULL,
            day_threshold INTEGER NOT NULL CHECK (day_threshold >= 0),
            is_active INTEGER NOT NULL DEFAULT 0,
            version INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;

    // ==========================================================================
    // Events Table (audit trail)
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS events (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            event_id TEXT UNIQUE NOT NULL,
            timestamp TEXT NOT NULL,
            event_type TEXT NOT NULL,
            entity_type TEXT NOT NULL,
            entity_id TEXT NOT NULL,
            data TEXT NOT NULL,
            actor TEXT NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    // ==========================================================================
    // Indexes
    // ==========================================================================
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_states_name ON states(name)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_events_entity ON events(entity_type, entity_id)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_events_timestamp ON events(timestamp)",
        [],
    )?;

    Ok(())
}

const STATE_COLUMNS: &str = "state_uuid, abbreviation, name, day_threshold, is_active,
                             version, created_at, updated_at";

fn parse_timestamp(idx: usize, value: String) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

fn state_from_row(row: &Row<'_>) -> rusqlite::Result<State> {
    Ok(State {
        id: row.get(0)?,
        abbreviation: row.get(1)?,
        name: row.get(2)?,
        day_threshold: row.get(3)?,
        is_active: row.get(4)?,
        version: row.get(5)?,
        created_at: parse_timestamp(6, row.get(6)?)?,
        updated_at: parse_timestamp(7, row.get(7)?)?,
    })
}

/// Natural-key lookup: zero or one state
pub fn find_state_by_abbreviation(
    conn: &Connection,
    abbreviation: &str,
) -> rusqlite::Result<Option<State>> {
    conn.query_row(
        &format!("SELECT {} FROM states WHERE abbreviation = ?1", STATE_COLUMNS),
        params![normalize_abbreviation(abbreviation)],
        state_from_row,
    )
    .optional()
}

pub fn insert_state(conn: &Connection, state: &State) -> rusqlite::Result<()> {
    conn.execute(
        &format!(
            "INSERT INTO states ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            STATE_COLUMNS
        ),
        params![
            state.id,
            state.abbreviation,
            state.name,
            state.day_threshold,
            state.is_active,
            state.version,
            state.created_at.to_rfc3339(),
            state.updated_at.to_rfc3339(),
        ],
    )?;

    Ok(())
}

/// Overwrite the mutable values of a state
///
/// Never touches state_uuid, abbreviation or is_active.
pub fn update_state_values(conn: &Connection, state: &State) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE states
         SET name = ?1,
             day_threshold = ?2,
             version = ?3,
             updated_at = ?4
         WHERE abbreviation = ?5",
        params![
            state.name,
            state.day_threshold,
            state.version,
            state.updated_at.to_rfc3339(),
            state.abbreviation,
        ],
    )
}

/// Toggle the active flag, as the activation page and admin do
///
/// Returns false when no state has this abbreviation.
pub fn set_state_active(
    conn: &Connection,
    abbreviation: &str,
    is_active: bool,
) -> rusqlite::Result<bool> {
    let changed = conn.execute(
        "UPDATE states SET is_active = ?1, updated_at = ?2 WHERE abbreviation = ?3",
        params![
            is_active,
            Utc::now().to_rfc3339(),
            normalize_abbreviation(abbreviation)
        ],
    )?;

    Ok(changed > 0)
}

/// All states, ordered by name
pub fn get_all_states(conn: &Connection) -> rusqlite::Result<Vec<State>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM states ORDER BY name",
        STATE_COLUMNS
    ))?;

    let states = stmt
        .query_map([], state_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(states)
}

pub fn count_states(conn: &Connection) -> rusqlite::Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM states", [], |row| row.get(0))
}

/// Insert event into audit trail
pub fn insert_event(conn: &Connection, event: &Event) -> rusqlite::Result<()> {
    let data_json = event.data.to_string();

    conn.execute(
        "INSERT INTO events (
            event_id, timestamp, event_type, entity_type, entity_id, data, actor
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            event.event_id,
            event.timestamp.to_rfc3339(),
            event.event_type,
            event.entity_type,
            event.entity_id,
            data_json,
            event.actor,
        ],
    )?;

    Ok(())
}

/// Get events for a specific entity, newest first
pub fn get_events_for_entity(
    conn: &Connection,
    entity_type: &str,
    entity_id: &str,
) -> rusqlite::Result<Vec<Event>> {
    let mut stmt = conn.prepare(
        "SELECT event_id, timestamp, event_type, entity_type, entity_id, data, actor
         FROM events
         WHERE entity_type = ?1 AND entity_id = ?2
         ORDER BY timestamp DESC, id DESC",
    )?;

    let events = stmt
        .query_map(params![entity_type, entity_id], |row| {
            let data_json: String = row.get(5)?;

            Ok(Event {
                event_id: row.get(0)?,
                timestamp: parse_timestamp(1, row.get(1)?)?,
                event_type: row.get(2)?,
                entity_type: row.get(3)?,
                entity_id: row.get(4)?,
                data: serde_json::from_str(&data_json).map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        5,
                        rusqlite::types::Type::Text,
                        Box::new(e),
                    )
                })?,
                actor: row.get(6)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(events)
}

pub fn count_events(conn: &Connection) -> rusqlite::Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM events", [], |row| row.get(0))
}
