use std::collections::BTreeMap;

use thiserror::Error;

/// Field name to message, as produced by form validation.
pub type FieldErrors = BTreeMap<String, String>;

#[derive(Debug, Error)]
pub enum RoofdeskError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation failed: {}", summarize(.0))]
    Validation(FieldErrors),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Permission denied: {0}")]
    Permission(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

fn summarize(errors: &FieldErrors) -> String {
    errors
        .iter()
        .map(|(field, message)| format!("{field}: {message}"))
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<rusqlite::Error> for RoofdeskError {
    fn from(e: rusqlite::Error) -> Self {
        RoofdeskError::Database(e.to_string())
    }
}
