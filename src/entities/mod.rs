// Entity Models
// "Identity persists, values change"
//
// A state has:
// - Stable identity (UUID) that NEVER changes
// - A natural key (abbreviation) used to match fixture rows
// - Values (name, threshold) that a load in update mode may replace

pub mod state;

pub use state::{normalize_abbreviation, DayThreshold, State};
