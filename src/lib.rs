// Residency Tracker - Core Library
// Loads US state records (natural key: abbreviation) from YAML fixtures

pub mod cli;
pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod fixture;
pub mod loader;
pub mod logging;
pub mod schema;

// Re-export commonly used types
pub use config::Config;
pub use db::{
    Event, count_states, find_state_by_abbreviation, get_all_states, get_events_for_entity,
    insert_event, set_state_active, setup_database,
};
pub use entities::{DayThreshold, State};
pub use error::{LoadError, LoadResult};
pub use fixture::{Fixture, StateRecord};
pub use loader::{load_fixture, load_states, LoadMode, LoadReport, Outcome, RecordOutcome};
pub use schema::{SchemaValidator, ValidationError, ValidationResult};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
