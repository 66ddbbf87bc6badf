//! Error types for deck-core

use std::path::PathBuf;

/// Result type for deck-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in deck-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A target file that must exist is missing
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Line number outside `1..=line_count`
    #[error("Invalid line number {line}: {path} has {line_count} lines")]
    InvalidLineNumber {
        path: PathBuf,
        line: usize,
        line_count: usize,
    },

    /// The privileged helper process could not be started
    #[error("Failed to start privileged command `{program}`: {source}")]
    PrivilegedCommandCreationFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The privileged helper ran and reported failure
    #[error("Privileged command failed: {0}")]
    PrivilegedCommandFailed(String),

    /// Elevation was refused or the target is not writable
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// An import document carries a schema version we do not read
    #[error("Unsupported schema version {found:?} (expected {expected:?})")]
    UnsupportedSchemaVersion { found: String, expected: String },

    /// The line about to be removed no longer matches what was scanned
    #[error("Line {line} of {path} changed since it was scanned")]
    StaleDeclaration { path: PathBuf, line: usize },

    /// No group matches the given name or id
    #[error("Group not found: {0}")]
    GroupNotFound(String),

    /// Input rejected by a validator
    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    /// A path handed to the backup store is not one of its backups
    #[error("Not a backup managed by EnvDeck: {path}")]
    NotABackup { path: PathBuf },

    /// Neither a platform data directory nor a home directory is known
    #[error("Could not determine a data directory; pass --data-dir or set ENVDECK_DATA_DIR")]
    NoDataDir,

    // Transparent wrappers for underlying crate errors
    /// Filesystem error from deck-fs
    #[error(transparent)]
    Fs(#[from] deck_fs::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn validation(field: &str, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// Attach the file path to a line-number error from deck-blocks.
    pub(crate) fn from_blocks(path: &std::path::Path, err: deck_blocks::Error) -> Self {
        match err {
            deck_blocks::Error::InvalidLineNumber { line, line_count } => {
                Self::InvalidLineNumber {
                    path: path.to_path_buf(),
                    line,
                    line_count,
                }
            }
        }
    }
}
