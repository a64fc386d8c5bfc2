use std::result::Result as StdResult;

use thiserror::Error;

/// Error type shared by the store, aggregation, and persistence layers.
#[derive(Debug, Error)]
pub enum DesireError {
    #[error("Invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },
    #[error("Desire not found: {0}")]
    NotFound(String),
    #[error("Format error: {0}")]
    Format(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = StdResult<T, DesireError>;

impl DesireError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        DesireError::Validation {
            field,
            message: message.into(),
        }
    }

    /// Name of the offending field for validation failures.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            DesireError::Validation { field, .. } => Some(*field),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for DesireError {
    fn from(err: serde_json::Error) -> Self {
        DesireError::Format(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_names_the_field() {
        let err = DesireError::validation("cost", "must be greater than 0");
        assert_eq!(err.field(), Some("cost"));
        assert_eq!(err.to_string(), "Invalid cost: must be greater than 0");
    }

    #[test]
    fn json_errors_become_format_errors() {
        let err: DesireError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, DesireError::Format(_)));
    }
}
