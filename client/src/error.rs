//! Client error types

use fitforge_shared::validation::ValidationError;
use fitforge_shared::EntityKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    /// The local mirror could not be opened or migrated
    #[error("Failed to initialize offline database: {0}")]
    StoreInit(String),

    #[error("Local store error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Query encoding error: {0}")]
    Query(#[from] serde_urlencoded::ser::Error),

    #[error("{store} has no index named '{index}'")]
    UnknownIndex { store: EntityKind, index: String },

    #[error("{}", .0.user_message())]
    Validation(ValidationError),

    /// The server answered with a non-success status
    #[error("{message}")]
    Http { status: u16, message: String },

    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("You're offline")]
    Offline,

    #[error("Malformed pending operation {id}: {reason}")]
    MalformedOperation { id: i64, reason: String },

    /// A queued change points at a device-created record the server never got
    #[error("{store} record {local_id} has not been synced")]
    Unsynced { store: EntityKind, local_id: i64 },
}

impl ClientError {
    /// The server refused the request itself (4xx)
    pub fn is_rejection(&self) -> bool {
        matches!(self, ClientError::Http { status, .. } if (400..500).contains(status))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::Http { status: 404, .. })
    }
}

impl From<validator::ValidationErrors> for ClientError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let err = fitforge_shared::validation::first_error(&errors)
            .unwrap_or_else(|| ValidationError::new("input", "Invalid input"));
        ClientError::Validation(err)
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_classification() {
        let conflict = ClientError::Http {
            status: 409,
            message: "Username already exists".to_string(),
        };
        assert!(conflict.is_rejection());
        assert!(!conflict.is_not_found());
        assert_eq!(conflict.to_string(), "Username already exists");

        let unavailable = ClientError::Http {
            status: 503,
            message: "down".to_string(),
        };
        assert!(!unavailable.is_rejection());
    }
}
