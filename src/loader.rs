// 📥 Fixture Loader - YAML fixture → states table
//
// Reconciles a fixture against persisted states by natural key:
// - absent   → created (always inactive)
// - present  → skipped, or overwritten in update mode
//
// Parse and validation happen before the first write, and every write of a
// run shares one transaction: a failing load applies nothing.

use crate::db::{self, Event};
use crate::entities::State;
use crate::error::{LoadError, LoadResult};
use crate::fixture::{Fixture, StateRecord};
use crate::schema::SchemaValidator;
use rusqlite::Connection;
use std::path::Path;
use tracing::{debug, info};

/// Actor recorded on audit events written by a load
pub const LOADER_ACTOR: &str = "load_states";

// ============================================================================
// MODE & OUTCOMES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadMode {
    /// Leave existing states untouched
    #[default]
    Skip,
    /// Overwrite name and threshold of existing states
    Update,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Created,
    Updated,
    /// Update mode, but the stored values already matched
    Unchanged,
    Skipped,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Created => "Created",
            Outcome::Updated => "Updated",
            Outcome::Unchanged => "Unchanged",
            Outcome::Skipped => "Skipped existing",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordOutcome {
    pub abbreviation: String,
    pub name: String,
    pub outcome: Outcome,
}

// ============================================================================
// LOAD REPORT
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub fixture_digest: String,
    pub outcomes: Vec<RecordOutcome>,
    pub ignored_entries: usize,
}

impl LoadReport {
    fn count(&self, outcome: Outcome) -> usize {
        self.outcomes.iter().filter(|o| o.outcome == outcome).count()
    }

    pub fn created(&self) -> usize {
        self.count(Outcome::Created)
    }

    pub fn updated(&self) -> usize {
        self.count(Outcome::Updated)
    }

    pub fn unchanged(&self) -> usize {
        self.count(Outcome::Unchanged)
    }

    pub fn skipped(&self) -> usize {
        self.count(Outcome::Skipped)
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn summary(&self) -> String {
        format!(
            "Created: {}, Updated: {}, Unchanged: {}, Skipped: {}",
            self.created(),
            self.updated(),
            self.unchanged(),
            self.skipped()
        )
    }
}

// ============================================================================
// LOADER
// ============================================================================

/// Load a fixture file into the states table
pub fn load_states(conn: &mut Connection, path: &Path, mode: LoadMode) -> LoadResult<LoadReport> {
    info!(path = %path.display(), ?mode, "loading states fixture");
    let fixture = Fixture::from_path(path)?;
    load_fixture(conn, &fixture, mode)
}

/// Reconcile an already parsed fixture against the database
pub fn load_fixture(
    conn: &mut Connection,
    fixture: &Fixture,
    mode: LoadMode,
) -> LoadResult<LoadReport> {
    SchemaValidator::new()
        .validate_batch(&fixture.records)
        .map_err(LoadError::Validation)?;

    let mut report = LoadReport {
        fixture_digest: fixture.digest.clone(),
        outcomes: Vec::with_capacity(fixture.records.len()),
        ignored_entries: fixture.ignored_entries,
    };

    // Dropping the transaction on error rolls everything back
    let tx = conn.transaction()?;

    for record in &fixture.records {
        let outcome = apply_record(&tx, record, mode, &fixture.digest)?;
        report.outcomes.push(RecordOutcome {
            abbreviation: record.abbreviation.clone(),
            name: record.name.clone(),
            outcome,
        });
    }

    tx.commit()?;

    info!(
        created = report.created(),
        updated = report.updated(),
        unchanged = report.unchanged(),
        skipped = report.skipped(),
        ignored = report.ignored_entries,
        "states fixture loaded"
    );

    Ok(report)
}

fn apply_record(
    conn: &Connection,
    record: &StateRecord,
    mode: LoadMode,
    digest: &str,
) -> LoadResult<Outcome> {
    if record.is_active == Some(true) {
        debug!(abbreviation = %record.abbreviation, "ignoring is_active from fixture");
    }

    let existing = db::find_state_by_abbreviation(conn, &record.abbreviation)?;

    let outcome = match (existing, mode) {
        (None, _) => {
            let state = State::new(&record.abbreviation, &record.name, record.threshold());
            db::insert_state(conn, &state)?;
            db::insert_event(
                conn,
                &Event::new(
                    "state_created",
                    "state",
                    &state.id,
                    serde_json::json!({
                        "abbreviation": state.abbreviation,
                        "name": state.name,
                        "day_threshold": state.day_threshold,
                        "fixture_sha256": digest,
                    }),
                    LOADER_ACTOR,
                ),
            )?;
            debug!("Created: {}", state.display_name());
            Outcome::Created
        }
        (Some(current), LoadMode::Skip) => {
            debug!("Skipped existing: {}", current.display_name());
            Outcome::Skipped
        }
        (Some(current), LoadMode::Update) => {
            if !current.differs_from(&record.name, record.threshold()) {
                debug!("Unchanged: {}", current.display_name());
                Outcome::Unchanged
            } else {
                let next = current.next_version(&record.name, record.threshold());
                db::update_state_values(conn, &next)?;
                db::insert_event(
                    conn,
                    &Event::new(
                        "state_updated",
                        "state",
                        &next.id,
                        serde_json::json!({
                            "abbreviation": next.abbreviation,
                            "version": next.version,
                            "name": { "from": current.name, "to": next.name },
                            "day_threshold": {
                                "from": current.day_threshold,
                                "to": next.day_threshold,
                            },
                            "fixture_sha256": digest,
                        }),
                        LOADER_ACTOR,
                    ),
                )?;
                debug!("Updated: {}", next.display_name());
                Outcome::Updated
            }
        }
    };

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{count_events, count_states, find_state_by_abbreviation, setup_database};

    fn open() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();
        conn
    }

    fn fixture(text: &str) -> Fixture {
        Fixture::parse(text).unwrap()
    }

    const NEW_YORK: &str = "
- model: tracker.state
  fields:
    abbreviation: NY
    name: New York
    day_threshold: 184
";

    #[test]
    fn test_idempotency_load_twice() {
        let mut conn = open();
        let ny = fixture(NEW_YORK);

        let first = load_fixture(&mut conn, &ny, LoadMode::Skip).unwrap();
        let second = load_fixture(&mut conn, &ny, LoadMode::Skip).unwrap();

        assert_eq!(first.created(), 1);
        assert_eq!(second.created(), 0);
        assert_eq!(second.skipped(), 1);
        assert_eq!(count_states(&conn).unwrap(), 1);

        let state = find_state_by_abbreviation(&conn, "NY").unwrap().unwrap();
        assert_eq!(state.day_threshold, 184);
        assert!(!state.is_active);
        assert_eq!(state.version, 1);
    }

    #[test]
    fn test_new_states_are_inactive_even_if_fixture_says_active() {
        let mut conn = open();
        let text = "
- model: tracker.state
  fields:
    abbreviation: CA
    name: California
    is_active: true
";
        load_fixture(&mut conn, &fixture(text), LoadMode::Skip).unwrap();

        let state = find_state_by_abbreviation(&conn, "CA").unwrap().unwrap();
        assert!(!state.is_active);
        assert_eq!(state.day_threshold, 183);
    }

    #[test]
    fn test_skip_mode_overwrites_nothing() {
        let mut conn = open();
        load_fixture(&mut conn, &fixture(NEW_YORK), LoadMode::Skip).unwrap();

        let changed = NEW_YORK
            .replace("New York", "New York State")
            .replace("184", "183");
        let report = load_fixture(&mut conn, &fixture(&changed), LoadMode::Skip).unwrap();

        assert_eq!(report.skipped(), 1);
        let state = find_state_by_abbreviation(&conn, "NY").unwrap().unwrap();
        assert_eq!(state.name, "New York");
        assert_eq!(state.day_threshold, 184);
    }

    #[test]
    fn test_update_mode_overwrites_values_and_keeps_active_flag() {
        let mut conn = open();
        load_fixture(&mut conn, &fixture(NEW_YORK), LoadMode::Skip).unwrap();
        let before = find_state_by_abbreviation(&conn, "NY").unwrap().unwrap();
        db::set_state_active(&conn, "NY", true).unwrap();

        let changed = NEW_YORK
            .replace("New York", "New York State")
            .replace("184", "183");
        let report = load_fixture(&mut conn, &fixture(&changed), LoadMode::Update).unwrap();

        assert_eq!(report.updated(), 1);
        let after = find_state_by_abbreviation(&conn, "NY").unwrap().unwrap();
        assert_eq!(after.id, before.id);
        assert_eq!(after.abbreviation, "NY");
        assert_eq!(after.name, "New York State");
        assert_eq!(after.day_threshold, 183);
        assert_eq!(after.version, 2);
        assert!(after.is_active, "user-set active flag must survive an update");

        let events = db::get_events_for_entity(&conn, "state", &after.id).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type, "state_updated");
        assert_eq!(events[0].data["day_threshold"]["from"], 184);
        assert_eq!(events[0].data["fixture_sha256"], report.fixture_digest);
    }

    #[test]
    fn test_update_mode_with_same_values_is_unchanged() {
        let mut conn = open();
        let ny = fixture(NEW_YORK);
        load_fixture(&mut conn, &ny, LoadMode::Skip).unwrap();

        let report = load_fixture(&mut conn, &ny, LoadMode::Update).unwrap();

        assert_eq!(report.unchanged(), 1);
        assert_eq!(report.updated(), 0);
        let state = find_state_by_abbreviation(&conn, "NY").unwrap().unwrap();
        assert_eq!(state.version, 1);
        assert_eq!(count_events(&conn).unwrap(), 1);
    }

    #[test]
    fn test_invalid_fixture_applies_nothing() {
        let mut conn = open();
        let text = "
- model: tracker.state
  fields:
    abbreviation: NV
    name: Nevada
- model: tracker.state
  fields:
    abbreviation: Nevada
    name: Nevada Again
";
        let result = load_fixture(&mut conn, &fixture(text), LoadMode::Skip);

        assert!(matches!(result, Err(LoadError::Validation(_))));
        assert_eq!(count_states(&conn).unwrap(), 0);
        assert_eq!(count_events(&conn).unwrap(), 0);
    }

    #[test]
    fn test_database_failure_rolls_back_whole_load() {
        let mut conn = open();
        db::insert_state(&conn, &State::new("WA", "Washington", 183)).unwrap();

        // DC is new, but its name collides with WA's unique name
        let text = "
- model: tracker.state
  fields:
    abbreviation: OR
    name: Oregon
    day_threshold: 200
- model: tracker.state
  fields:
    abbreviation: DC
    name: Washington
";
        let err = load_fixture(&mut conn, &fixture(text), LoadMode::Skip).unwrap_err();

        assert!(err.is_constraint_violation());
        assert!(find_state_by_abbreviation(&conn, "OR").unwrap().is_none());
        assert_eq!(count_states(&conn).unwrap(), 1);
        assert_eq!(count_events(&conn).unwrap(), 0);
    }

    #[test]
    fn test_report_counts_and_ignored_entries() {
        let mut conn = open();
        let text = "
- model: tracker.state
  fields: {abbreviation: HI, name: Hawaii, day_threshold: 200}
- model: tracker.office
  fields: {name: HQ}
- model: tracker.state
  fields: {abbreviation: ID, name: Idaho, day_threshold: 270}
";
        let report = load_fixture(&mut conn, &fixture(text), LoadMode::Update).unwrap();

        assert_eq!(report.total(), 2);
        assert_eq!(report.created(), 2);
        assert_eq!(report.ignored_entries, 1);
        assert_eq!(
            report.summary(),
            "Created: 2, Updated: 0, Unchanged: 0, Skipped: 0"
        );
    }
}
