// Runtime configuration
// Defaults < environment variables < command-line flags

use crate::fixture::DEFAULT_FIXTURE_PATH;
use std::path::PathBuf;

pub const DEFAULT_DB_PATH: &str = "residency.db";

pub const ENV_DB_PATH: &str = "RESIDENCY_DB_PATH";
pub const ENV_FIXTURE_PATH: &str = "RESIDENCY_STATES_FIXTURE";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub database_path: PathBuf,
    pub fixture_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database_path: PathBuf::from(DEFAULT_DB_PATH),
            fixture_path: PathBuf::from(DEFAULT_FIXTURE_PATH),
        }
    }
}

impl Config {
    /// Defaults, overridden by RESIDENCY_DB_PATH / RESIDENCY_STATES_FIXTURE
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(path) = lookup(ENV_DB_PATH).filter(|p| !p.trim().is_empty()) {
            config.database_path = PathBuf::from(path);
        }
        if let Some(path) = lookup(ENV_FIXTURE_PATH).filter(|p| !p.trim().is_empty()) {
            config.fixture_path = PathBuf::from(path);
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(|_| None);
        assert_eq!(config.database_path, PathBuf::from("residency.db"));
        assert_eq!(config.fixture_path, PathBuf::from("fixtures/states.yaml"));
    }

    #[test]
    fn test_env_overrides() {
        let config = Config::from_lookup(|key| match key {
            ENV_DB_PATH => Some("/var/lib/residency/app.db".to_string()),
            ENV_FIXTURE_PATH => Some("  ".to_string()),
            _ => None,
        });
        assert_eq!(config.database_path, PathBuf::from("/var/lib/residency/app.db"));
        assert_eq!(config.fixture_path, PathBuf::from(DEFAULT_FIXTURE_PATH));
    }
}
