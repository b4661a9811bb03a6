//! Error types for the schema tool.

use thiserror::Error;

/// Exit code for usage and configuration errors.
pub const EXIT_USAGE_ERROR: u8 = 1;
/// Exit code when an operation precondition is not met.
pub const EXIT_PRECONDITION_ERROR: u8 = 2;
/// Exit code for a rolled back migration.
pub const EXIT_MIGRATION_ERROR: u8 = 3;
/// Exit code for database driver failures.
pub const EXIT_DRIVER_ERROR: u8 = 4;
/// Exit code when catalog rows arrive out of order.
pub const EXIT_CATALOG_ERROR: u8 = 5;
/// Exit code for file system errors.
pub const EXIT_IO_ERROR: u8 = 7;

/// Main error type for schema operations.
#[derive(Error, Debug)]
pub enum MetaError {
    /// Missing required parameter or unknown operation
    #[error("Usage error: {0}")]
    Usage(String),

    /// Configuration error (invalid YAML, bad connection string, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Operation refused before touching the database
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// A script inside the migration transaction failed; everything was rolled back
    #[error("Migration failed in script {file}: {message}")]
    Migration { file: String, message: String },

    /// Database connection or query error with context
    #[error("Database error: {message}\n  Context: {context}")]
    Driver { message: String, context: String },

    /// Column rows for a table were not contiguous or not ordered by position
    #[error("Catalog rows are not ordered by table and position (table {table})")]
    UnsortedCatalog { table: String },

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MetaError {
    /// Create a Driver error with context about where it occurred
    pub fn driver(message: impl ToString, context: impl Into<String>) -> Self {
        MetaError::Driver {
            message: message.to_string(),
            context: context.into(),
        }
    }

    /// Create a Migration error for the given script file
    pub fn migration(file: impl Into<String>, message: impl Into<String>) -> Self {
        MetaError::Migration {
            file: file.into(),
            message: message.into(),
        }
    }

    /// The underlying message without the variant prefix.
    ///
    /// Used when a script failure is reported next to its file name.
    pub fn detail(&self) -> String {
        match self {
            MetaError::Driver { message, .. } => message.clone(),
            MetaError::Migration { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            MetaError::Usage(_) | MetaError::Config(_) | MetaError::Yaml(_) => EXIT_USAGE_ERROR,
            MetaError::Precondition(_) => EXIT_PRECONDITION_ERROR,
            MetaError::Migration { .. } => EXIT_MIGRATION_ERROR,
            MetaError::Driver { .. } => EXIT_DRIVER_ERROR,
            MetaError::UnsortedCatalog { .. } => EXIT_CATALOG_ERROR,
            MetaError::Io(_) | MetaError::Json(_) => EXIT_IO_ERROR,
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for schema operations.
pub type Result<T> = std::result::Result<T, MetaError>;
