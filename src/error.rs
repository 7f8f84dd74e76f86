//! Error types for manifest building and metadata enumeration.

use thiserror::Error;

/// Result type for package operations.
pub type PackageResult<T> = Result<T, PackageError>;

/// Error type for package operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PackageError {
    /// The external CLI could not be started.
    #[error("Failed to run '{command}': {message}")]
    Spawn { command: String, message: String },

    /// The external CLI wrote to its error stream.
    #[error("{command} reported an error:\n{stderr}")]
    Transport { command: String, stderr: String },

    /// The external CLI exited unsuccessfully without writing to stderr.
    #[error("{command} exited with status {code:?}")]
    Exit { command: String, code: Option<i32> },

    /// The external CLI's output was not the expected JSON document.
    #[error("Failed to parse output of {command}: {message}")]
    Json { command: String, message: String },

    /// A manifest document could not be parsed.
    #[error("Failed to parse package.xml: {0}")]
    Xml(String),

    /// A folder-based type has no known folder type.
    #[error("No folder type is known for metadata type '{0}'")]
    UnknownFolderType(String),

    /// The user tried to build a manifest without selecting anything.
    #[error("Please select components for package.xml")]
    EmptySelection,

    /// Filesystem error.
    #[error("IO error: {0}")]
    Io(String),
}

impl PackageError {
    /// Whether the error came from talking to the external CLI.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            PackageError::Spawn { .. } | PackageError::Transport { .. } | PackageError::Exit { .. }
        )
    }
}

impl From<std::io::Error> for PackageError {
    fn from(err: std::io::Error) -> Self {
        PackageError::Io(err.to_string())
    }
}
