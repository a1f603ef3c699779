//! Error types for the FitForge domain model

use thiserror::Error;

/// Errors raised while interpreting domain values
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("Unknown {kind}: {value}")]
    UnknownVariant { kind: &'static str, value: String },

    #[error("Invalid date: {0}")]
    InvalidDate(String),
}

impl ModelError {
    pub(crate) fn unknown(kind: &'static str, value: &str) -> Self {
        ModelError::UnknownVariant {
            kind,
            value: value.to_string(),
        }
    }
}
