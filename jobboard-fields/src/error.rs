//! Error types for the listing field panels

use std::path::PathBuf;
use thiserror::Error;

/// Result type for field panel operations
pub type Result<T> = std::result::Result<T, FieldsError>;

/// Errors that can occur while building, rendering or saving listing fields.
///
/// Malformed submissions never produce an error; they are coerced. These
/// variants cover collaborator and setup failures the host has to see.
#[derive(Debug, Error)]
pub enum FieldsError {
    /// Listing record not found in the store
    #[error("listing not found: {id}")]
    ListingNotFound { id: u64 },

    /// The backing store rejected an operation
    #[error("storage error: {message}")]
    Storage { message: String },

    /// A required collaborator was not supplied to the builder
    #[error("missing collaborator: {name}")]
    MissingCollaborator { name: &'static str },

    /// Field definitions directory not found
    #[error("field definitions directory not found: {path}")]
    NotInitialized { path: PathBuf },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl FieldsError {
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FieldsError::ListingNotFound { id: 42 };
        assert_eq!(err.to_string(), "listing not found: 42");
    }

    #[test]
    fn test_missing_collaborator() {
        let err = FieldsError::MissingCollaborator { name: "geocoder" };
        assert!(err.to_string().contains("geocoder"));
    }
}
