// 📐 Shape Layer - Schema Validation
// Validates fixture records before anything touches the database

use crate::entities::DayThreshold;
use crate::fixture::StateRecord;
use std::collections::HashMap;

/// Column limit on states.name
pub const MAX_NAME_LEN: usize = 100;

// ============================================================================
// VALIDATION RESULT
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub context: String,
}

impl ValidationError {
    pub fn new(context: &str, field: &str, message: &str) -> Self {
        ValidationError {
            field: field.to_string(),
            message: message.to_string(),
            context: context.to_string(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.context, self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult = Result<(), Vec<ValidationError>>;

// ============================================================================
// SCHEMA VALIDATOR
// ============================================================================

#[derive(Debug, Default)]
pub struct SchemaValidator;

impl SchemaValidator {
    pub fn new() -> Self {
        SchemaValidator
    }

    /// Validate a single record against the State schema
    pub fn validate_record(&self, record: &StateRecord) -> ValidationResult {
        let mut errors = Vec::new();
        let context = record.label();

        if record.abbreviation.is_empty() {
            errors.push(ValidationError::new(&context, "abbreviation", "Required field is empty"));
        } else if record.abbreviation.len() != 2
            || !record.abbreviation.chars().all(|c| c.is_ascii_uppercase())
        {
            errors.push(ValidationError::new(
                &context,
                "abbreviation",
                &format!("Must be two letters, got '{}'", record.abbreviation),
            ));
        }

        if record.name.is_empty() {
            errors.push(ValidationError::new(&context, "name", "Required field is empty"));
        } else if record.name.chars().count() > MAX_NAME_LEN {
            errors.push(ValidationError::new(
                &context,
                "name",
                &format!("Must be at most {} characters", MAX_NAME_LEN),
            ));
        }

        if record.day_threshold < 1 || record.day_threshold > DayThreshold::MAX as i64 {
            errors.push(ValidationError::new(
                &context,
                "day_threshold",
                &format!(
                    "Must be between 1 and {}, got {}",
                    DayThreshold::MAX,
                    record.day_threshold
                ),
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate every record, plus uniqueness of abbreviation and name
    /// across the batch
    pub fn validate_batch(&self, records: &[StateRecord]) -> ValidationResult {
        let mut errors = Vec::new();
        let mut seen_abbreviations: HashMap<&str, usize> = HashMap::new();
        let mut seen_names: HashMap<&str, usize> = HashMap::new();

        for record in records {
            if let Err(mut record_errors) = self.validate_record(record) {
                errors.append(&mut record_errors);
            }

            if !record.abbreviation.is_empty() {
                if let Some(first) = seen_abbreviations.insert(&record.abbreviation, record.entry) {
                    errors.push(ValidationError::new(
                        &record.label(),
                        "abbreviation",
                        &format!("Duplicate of entry #{}", first),
                    ));
                }
            }

            if !record.name.is_empty() {
                if let Some(first) = seen_names.insert(&record.name, record.entry) {
                    errors.push(ValidationError::new(
                        &record.label(),
                        "name",
                        &format!("Duplicate of entry #{}", first),
                    ));
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(entry: usize, abbreviation: &str, name: &str, threshold: i64) -> StateRecord {
        let mut record = StateRecord::new(abbreviation, name, threshold);
        record.entry = entry;
        record
    }

    #[test]
    fn test_valid_record() {
        let validator = SchemaValidator::new();
        assert!(validator.validate_record(&record(1, "NY", "New York", 184)).is_ok());
        assert!(validator.validate_record(&record(2, "id", "Idaho", 270)).is_ok());
    }

    #[test]
    fn test_collects_every_field_error() {
        let validator = SchemaValidator::new();
        let errors = validator
            .validate_record(&record(4, "NYC", "", 0))
            .unwrap_err();

        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["abbreviation", "name", "day_threshold"]);
        assert_eq!(errors[0].context, "entry #4 (NYC)");
    }

    #[test]
    fn test_rejects_non_letter_abbreviation() {
        let validator = SchemaValidator::new();
        assert!(validator.validate_record(&record(1, "N1", "Nowhere", 183)).is_err());
        assert!(validator.validate_record(&record(1, "", "Nowhere", 183)).is_err());
    }

    #[test]
    fn test_threshold_bounds() {
        let validator = SchemaValidator::new();
        assert!(validator.validate_record(&record(1, "AK", "Alaska", 366)).is_ok());
        assert!(validator.validate_record(&record(1, "AK", "Alaska", 367)).is_err());
        assert!(validator.validate_record(&record(1, "AK", "Alaska", -5)).is_err());
    }

    #[test]
    fn test_name_length_limit() {
        let validator = SchemaValidator::new();
        let long_name = "x".repeat(MAX_NAME_LEN + 1);
        assert!(validator.validate_record(&record(1, "AK", &long_name, 183)).is_err());
    }

    #[test]
    fn test_batch_rejects_duplicate_keys() {
        let validator = SchemaValidator::new();
        let records = vec![
            record(1, "NY", "New York", 184),
            record(2, "ny", "New York State", 183),
            record(3, "NJ", "New York", 183),
        ];

        let errors = validator.validate_batch(&records).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].field, "abbreviation");
        assert_eq!(errors[0].message, "Duplicate of entry #1");
        assert_eq!(errors[1].field, "name");
    }
}
