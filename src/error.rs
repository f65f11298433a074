// file: src/error.rs
// version: 1.0.0
// guid: 75ece708-0718-4210-ac00-7a0142820130

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for the application
pub type Result<T> = std::result::Result<T, InstallError>;

/// Error types for the Debian install agent
#[derive(Error, Debug)]
pub enum InstallError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Command failed: {command}\nError: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("Command timed out after {timeout_secs}s: {command}")]
    CommandTimeout { command: String, timeout_secs: u64 },

    #[error("Failed to launch {command}: {source}")]
    CommandSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Installation cancelled")]
    Cancelled,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl InstallError {
    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a command-failure error from an argv vector and captured stderr
    pub fn command_failed(argv: &[String], stderr: impl Into<String>) -> Self {
        Self::CommandFailed {
            command: argv.join(" "),
            stderr: stderr.into(),
        }
    }

    /// Create a command-timeout error from an argv vector
    pub fn command_timeout(argv: &[String], timeout_secs: u64) -> Self {
        Self::CommandTimeout {
            command: argv.join(" "),
            timeout_secs,
        }
    }

    /// Create a file-write error for a path inside the target tree
    pub fn file_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileWrite {
            path: path.into(),
            source,
        }
    }
}
