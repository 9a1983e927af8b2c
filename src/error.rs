// Error types for fixture loading
// Library code returns LoadError; the binary wraps it in anyhow

use crate::schema::ValidationError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("fixture file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("failed to read fixture {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed fixture: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("fixture failed validation ({} error(s)): {}", .0.len(), summarize(.0))]
    Validation(Vec<ValidationError>),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

impl LoadError {
    /// True when the database constraint layer rejected a write
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            LoadError::Database(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation
        )
    }
}

fn summarize(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

pub type LoadResult<T> = Result<T, LoadError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_lists_every_error() {
        let err = LoadError::Validation(vec![
            ValidationError::new("entry #1", "abbreviation", "must be two letters"),
            ValidationError::new("entry #2", "name", "required field is empty"),
        ]);

        let message = err.to_string();
        assert!(message.contains("2 error(s)"));
        assert!(message.contains("[entry #1] abbreviation: must be two letters"));
        assert!(message.contains("[entry #2] name: required field is empty"));
    }

    #[test]
    fn test_file_not_found_names_path() {
        let err = LoadError::FileNotFound(PathBuf::from("missing/states.yaml"));
        assert_eq!(err.to_string(), "fixture file not found: missing/states.yaml");
        assert!(!err.is_constraint_violation());
    }
}
