// 🗺️ State Entity - Tax residency jurisdiction
//
// "Abbreviation is the NATURAL KEY, state_uuid is IDENTITY"
//
// - Abbreviation resolves fixture rows to persisted rows across loads
// - UUID never changes, even when name or threshold are corrected
// - is_active belongs to the user: loads never turn it on

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// DAY THRESHOLDS
// ============================================================================

/// Statutory day thresholds in use across US jurisdictions
pub struct DayThreshold;

impl DayThreshold {
    /// "183 days or more" - the common rule
    pub const DEFAULT: u32 = 183;

    /// "More than 183 days"
    pub const MORE_THAN_183: u32 = 184;

    pub const EXTENDED_185: u32 = 185;

    pub const EXTENDED_200: u32 = 200;

    pub const EXTENDED_270: u32 = 270;

    /// Upper bound a threshold can take (leap year)
    pub const MAX: u32 = 366;

    /// All named thresholds, default first
    pub const NAMED: [u32; 5] = [
        Self::DEFAULT,
        Self::MORE_THAN_183,
        Self::EXTENDED_185,
        Self::EXTENDED_200,
        Self::EXTENDED_270,
    ];

    pub fn is_named(days: u32) -> bool {
        Self::NAMED.contains(&days)
    }
}

// ============================================================================
// STATE ENTITY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct State {
    /// Stable identity (UUID) - NEVER changes
    pub id: String,

    /// Natural key: two upper-case letters, unique
    pub abbreviation: String,

    pub name: String,

    /// Days of presence that trigger tax residency
    pub day_threshold: u32,

    /// Set only by the activation page or admin, never by a load
    pub is_active: bool,

    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl State {
    /// Create a new, inactive state with a fresh UUID
    pub fn new(abbreviation: &str, name: &str, day_threshold: u32) -> Self {
        let now = Utc::now();

        State {
            id: uuid::Uuid::new_v4().to_string(),
            abbreviation: normalize_abbreviation(abbreviation),
            name: name.trim().to_string(),
            day_threshold,
            is_active: false,
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }

    /// True when name or threshold differ from the given values
    pub fn differs_from(&self, name: &str, day_threshold: u32) -> bool {
        self.name != name || self.day_threshold != day_threshold
    }

    /// Next version carrying new values; identity and is_active are kept
    pub fn next_version(&self, name: &str, day_threshold: u32) -> State {
        let mut next = self.clone();
        next.name = name.to_string();
        next.day_threshold = day_threshold;
        next.version += 1;
        next.updated_at = Utc::now();
        next
    }

    pub fn display_name(&self) -> String {
        format!("{} ({})", self.name, self.abbreviation)
    }
}

/// Canonical form of an abbreviation: trimmed, upper-case
pub fn normalize_abbreviation(raw: &str) -> String {
    raw.trim().to_ascii_uppercase()
}
