use thiserror::Error;

/// Failures the ingestion routine reports by kind rather than by message
#[derive(Debug, Error, PartialEq)]
pub enum LoadError {
    #[error("'{0}' is reserved for the source registry")]
    ReservedName(String),

    #[error("invalid table name '{0}': use ASCII letters, digits and '_', not starting with a digit")]
    InvalidTableName(String),

    #[error("duplicate source '{0}'")]
    DuplicateSource(String),

    #[error("CSV payload has no header row")]
    EmptyPayload,

    #[error("expected {expected} fields in line {line}, saw {found}")]
    RaggedRow {
        line: u64,
        expected: usize,
        found: usize,
    },
}

/// Check that a dataset name is usable as a table name
pub fn validate_table_name(name: &str) -> Result<(), LoadError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };

    if !valid || name.to_ascii_lowercase().starts_with("sqlite_") {
        return Err(LoadError::InvalidTableName(name.to_string()));
    }
    Ok(())
}
