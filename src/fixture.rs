// 📄 Fixture Layer - YAML → StateRecord
// Reads Django-style fixtures: a list of {model, pk, fields} entries

use crate::entities::{normalize_abbreviation, DayThreshold};
use crate::error::{LoadError, LoadResult};
use crate::schema::ValidationError;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Model label of state entries; every other model is ignored
pub const STATE_MODEL: &str = "tracker.state";

/// Bundled fixture, relative to the working directory
pub const DEFAULT_FIXTURE_PATH: &str = "fixtures/states.yaml";

// ============================================================================
// RAW FIXTURE SHAPE
// ============================================================================

#[derive(Debug, Deserialize)]
struct FixtureEntry {
    model: String,

    // pk is ignored: states are matched by abbreviation
    #[serde(default)]
    fields: serde_yaml::Value,
}

#[derive(Debug, Deserialize)]
struct StateFields {
    #[serde(default)]
    abbreviation: String,

    #[serde(default)]
    name: String,

    #[serde(default = "default_day_threshold")]
    day_threshold: i64,

    /// Accepted for compatibility; loads never activate a state
    #[serde(default)]
    is_active: Option<bool>,
}

fn default_day_threshold() -> i64 {
    DayThreshold::DEFAULT as i64
}

// ============================================================================
// STATE RECORD
// ============================================================================

/// One state entry as read from a fixture (not yet validated)
#[derive(Debug, Clone, PartialEq)]
pub struct StateRecord {
    /// 1-based position among all entries of the file
    pub entry: usize,
    pub abbreviation: String,
    pub name: String,
    pub day_threshold: i64,
    pub is_active: Option<bool>,
}

impl StateRecord {
    pub fn new(abbreviation: &str, name: &str, day_threshold: i64) -> Self {
        StateRecord {
            entry: 0,
            abbreviation: normalize_abbreviation(abbreviation),
            name: name.trim().to_string(),
            day_threshold,
            is_active: None,
        }
    }

    /// Label used in validation messages and logs
    pub fn label(&self) -> String {
        if self.abbreviation.is_empty() {
            format!("entry #{}", self.entry)
        } else {
            format!("entry #{} ({})", self.entry, self.abbreviation)
        }
    }

    /// Threshold as stored; only meaningful after validation
    pub fn threshold(&self) -> u32 {
        self.day_threshold.clamp(0, u32::MAX as i64) as u32
    }
}

// ============================================================================
// PARSED FIXTURE
// ============================================================================

#[derive(Debug, Clone)]
pub struct Fixture {
    pub path: PathBuf,

    /// SHA-256 of the raw file, hex encoded
    pub digest: String,

    pub records: Vec<StateRecord>,

    /// Entries for models other than tracker.state
    pub ignored_entries: usize,
}

impl Fixture {
    /// Read and parse a fixture file
    pub fn from_path(path: &Path) -> LoadResult<Fixture> {
        if !path.exists() {
            return Err(LoadError::FileNotFound(path.to_path_buf()));
        }

        let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut fixture = Fixture::parse(&text)?;
        fixture.path = path.to_path_buf();
        Ok(fixture)
    }

    /// Parse fixture text
    pub fn parse(text: &str) -> LoadResult<Fixture> {
        let digest = compute_digest(text);

        let entries: Vec<FixtureEntry> = if text.trim().is_empty() {
            Vec::new()
        } else {
            serde_yaml::from_str::<Option<Vec<FixtureEntry>>>(text)?.unwrap_or_default()
        };

        let mut records = Vec::new();
        let mut ignored_entries = 0;
        let mut field_errors = Vec::new();

        for (index, entry) in entries.into_iter().enumerate() {
            let position = index + 1;

            if !entry.model.trim().eq_ignore_ascii_case(STATE_MODEL) {
                debug!(model = %entry.model, entry = position, "ignoring non-state fixture entry");
                ignored_entries += 1;
                continue;
            }

            match serde_yaml::from_value::<StateFields>(entry.fields) {
                Ok(fields) => records.push(StateRecord {
                    entry: position,
                    abbreviation: normalize_abbreviation(&fields.abbreviation),
                    name: fields.name.trim().to_string(),
                    day_threshold: fields.day_threshold,
                    is_active: fields.is_active,
                }),
                Err(e) => field_errors.push(ValidationError::new(
                    &format!("entry #{}", position),
                    "fields",
                    &e.to_string(),
                )),
            }
        }

        if !field_errors.is_empty() {
            return Err(LoadError::Validation(field_errors));
        }

        Ok(Fixture {
            path: PathBuf::new(),
            digest,
            records,
            ignored_entries,
        })
    }
}

pub fn compute_digest(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}
