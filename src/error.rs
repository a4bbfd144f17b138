//! Error types for shootplan.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for shootplan operations.
pub type Result<T> = std::result::Result<T, PlannerError>;

/// Errors that can occur while planning, storing or importing projects.
#[derive(Error, Debug)]
pub enum PlannerError {
    // Storage Errors
    #[error("Failed to read file: {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}: {source}")]
    FileWriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Directory creation failed: {path}: {source}")]
    DirectoryCreateError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid storage key: {key}")]
    InvalidKey { key: String },

    #[error("Storage unavailable: {reason}")]
    StorageUnavailable { reason: String },

    // Serialization Errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid export document: {reason}")]
    InvalidDocument { reason: String },

    #[error("Migration failed: {reason}")]
    MigrationError { reason: String },

    // Domain Errors
    #[error("Invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("Project not found: {id}")]
    ProjectNotFound { id: String },

    #[error("Duplicate project id: {id}")]
    DuplicateProjectId { id: String },

    #[error("Unknown template: {id}")]
    UnknownTemplate { id: String },

    // Configuration Errors
    #[error("Invalid configuration value for {key}: {value}")]
    Config { key: String, value: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PlannerError {
    /// Shorthand for a validation failure on a named field.
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        PlannerError::Validation {
            field,
            reason: reason.into(),
        }
    }

    /// Get the error code for this error type.
    pub fn error_code(&self) -> &'static str {
        match self {
            PlannerError::FileReadError { .. } => "FILE_READ_ERROR",
            PlannerError::FileWriteError { .. } => "FILE_WRITE_ERROR",
            PlannerError::DirectoryCreateError { .. } => "DIRECTORY_CREATE_ERROR",
            PlannerError::InvalidKey { .. } => "INVALID_KEY",
            PlannerError::StorageUnavailable { .. } => "STORAGE_UNAVAILABLE",
            PlannerError::Json(_) => "JSON_ERROR",
            PlannerError::InvalidDocument { .. } => "INVALID_DOCUMENT",
            PlannerError::MigrationError { .. } => "MIGRATION_ERROR",
            PlannerError::Validation { .. } => "VALIDATION_ERROR",
            PlannerError::ProjectNotFound { .. } => "PROJECT_NOT_FOUND",
            PlannerError::DuplicateProjectId { .. } => "DUPLICATE_PROJECT_ID",
            PlannerError::UnknownTemplate { .. } => "UNKNOWN_TEMPLATE",
            PlannerError::Config { .. } => "CONFIG_ERROR",
            PlannerError::Io(_) => "IO_ERROR",
        }
    }

    /// Returns true for faults of the storage layer itself.
    ///
    /// These are absorbed at the slot boundary and never reach callers of
    /// [`crate::state::Slot`].
    pub fn is_storage_fault(&self) -> bool {
        matches!(
            self,
            PlannerError::FileReadError { .. }
                | PlannerError::FileWriteError { .. }
                | PlannerError::DirectoryCreateError { .. }
                | PlannerError::StorageUnavailable { .. }
                | PlannerError::Json(_)
                | PlannerError::Io(_)
        )
    }

    /// Returns a user-friendly recovery suggestion.
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            PlannerError::FileWriteError { .. } | PlannerError::DirectoryCreateError { .. } => {
                Some("Check that the data directory is writable and the disk is not full.")
            }
            PlannerError::InvalidDocument { .. } => {
                Some("Import a file produced by 'shootplan export'.")
            }
            PlannerError::ProjectNotFound { .. } => {
                Some("Run 'shootplan list' to see the available project ids.")
            }
            PlannerError::UnknownTemplate { .. } => {
                Some("Available templates: portrait-classic, product-commercial, wedding-documentary, landscape-golden-hour, event-documentary, commercial-corporate.")
            }
            PlannerError::Config { .. } => Some("Fix the value in your environment or .env file."),
            PlannerError::MigrationError { .. } => {
                Some("Export your data before retrying; unmigrated records are left untouched.")
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = PlannerError::ProjectNotFound {
            id: "abc".to_string(),
        };
        assert_eq!(err.error_code(), "PROJECT_NOT_FOUND");
        assert!(err.recovery_suggestion().is_some());
    }

    #[test]
    fn test_validation_message() {
        let err = PlannerError::validation("amount", "must not be negative");
        assert_eq!(err.to_string(), "Invalid amount: must not be negative");
        assert!(!err.is_storage_fault());
    }

    #[test]
    fn test_template_hint_names_every_template() {
        let err = PlannerError::UnknownTemplate { id: "x".to_string() };
        let hint = err.recovery_suggestion().unwrap();
        for template in crate::model::TEMPLATES {
            assert!(hint.contains(template.id), "{} missing from hint", template.id);
        }
    }

    #[test]
    fn test_storage_fault_classification() {
        let err = PlannerError::StorageUnavailable {
            reason: "quota exceeded".to_string(),
        };
        assert!(err.is_storage_fault());
    }
}
