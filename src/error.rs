//! Error handling for Stackwise
//!
//! Cost and layout computations are infallible; errors only come from
//! persistence, migration, configuration and editor operations.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for Stackwise operations
pub type Result<T> = std::result::Result<T, StackwiseError>;

/// Main error type for Stackwise operations
#[derive(Error, Debug)]
pub enum StackwiseError {
    // File Errors
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

    // Project Errors
    #[error("Project already exists: {path}")]
    ProjectAlreadyExists { path: PathBuf },

    #[error("Project not found: {path}")]
    ProjectNotFound { path: PathBuf },

    #[error("Invalid project structure: {reason}")]
    InvalidProjectStructure { reason: String },

    #[error("Unknown template: {name}")]
    UnknownTemplate { name: String },

    // Schema Errors
    #[error("Invalid project schema version: {version}")]
    InvalidSchemaVersion { version: String },

    #[error("Migration failed from {from} to {to}: {reason}")]
    MigrationError {
        from: String,
        to: String,
        reason: String,
    },

    // Editor Errors
    #[error("Layer not found: {id}")]
    LayerNotFound { id: String },

    #[error("Use path not found: {id}")]
    UsePathNotFound { id: String },

    #[error("Cannot delete the last layer")]
    CannotDeleteLastLayer,

    #[error("Invalid selection: {reason}")]
    InvalidSelection { reason: String },

    // Undo/Redo Errors
    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Nothing to redo")]
    NothingToRedo,

    // Configuration Errors
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    // Serialization Errors
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StackwiseError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            StackwiseError::FileReadError { .. } => "FILE_READ_ERROR",
            StackwiseError::FileWriteError { .. } => "FILE_WRITE_ERROR",
            StackwiseError::ProjectAlreadyExists { .. } => "PROJECT_ALREADY_EXISTS",
            StackwiseError::ProjectNotFound { .. } => "PROJECT_NOT_FOUND",
            StackwiseError::InvalidProjectStructure { .. } => "INVALID_PROJECT_STRUCTURE",
            StackwiseError::UnknownTemplate { .. } => "UNKNOWN_TEMPLATE",
            StackwiseError::InvalidSchemaVersion { .. } => "INVALID_SCHEMA_VERSION",
            StackwiseError::MigrationError { .. } => "MIGRATION_ERROR",
            StackwiseError::LayerNotFound { .. } => "LAYER_NOT_FOUND",
            StackwiseError::UsePathNotFound { .. } => "USE_PATH_NOT_FOUND",
            StackwiseError::CannotDeleteLastLayer => "CANNOT_DELETE_LAST_LAYER",
            StackwiseError::InvalidSelection { .. } => "INVALID_SELECTION",
            StackwiseError::NothingToUndo => "NOTHING_TO_UNDO",
            StackwiseError::NothingToRedo => "NOTHING_TO_REDO",
            StackwiseError::InvalidConfig { .. } => "INVALID_CONFIG",
            StackwiseError::Serialization(_) => "SERIALIZATION_ERROR",
            StackwiseError::Io(_) => "IO_ERROR",
        }
    }

    /// Returns a user-friendly recovery suggestion.
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            StackwiseError::ProjectNotFound { .. } => {
                Some("Check the path, or create a project with 'stackwise-cli init <path>'.")
            }
            StackwiseError::ProjectAlreadyExists { .. } => {
                Some("Choose another path or remove the existing file first.")
            }
            StackwiseError::UnknownTemplate { .. } => Some(
                "Available templates: blank, sample, microservices, three-tier, serverless.",
            ),
            StackwiseError::InvalidSchemaVersion { .. } => {
                Some("The project was written by a newer version of Stackwise.")
            }
            StackwiseError::LayerNotFound { .. } => {
                Some("Run 'stackwise-cli levels <path>' to list layer ids.")
            }
            StackwiseError::CannotDeleteLastLayer => Some("A project must keep at least one layer."),
            StackwiseError::NothingToUndo => Some("There are no actions to undo."),
            StackwiseError::NothingToRedo => Some("There are no undone actions to redo."),
            StackwiseError::InvalidConfig { .. } => {
                Some("Check the configuration file against the documented defaults.")
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
        let err = StackwiseError::LayerNotFound {
            id: "42".to_string(),
        };
        assert_eq!(err.error_code(), "LAYER_NOT_FOUND");
        assert_eq!(err.to_string(), "Layer not found: 42");
    }

    #[test]
    fn test_recovery_suggestions() {
        assert!(StackwiseError::NothingToUndo.recovery_suggestion().is_some());
        assert!(StackwiseError::Io(std::io::Error::other("boom"))
            .recovery_suggestion()
            .is_none());
    }
}
