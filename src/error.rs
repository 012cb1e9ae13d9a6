//! Error types for gyro-inject

use std::path::PathBuf;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// gyro-inject error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Could not open a stream connection
    #[error("Connection to {addr} failed: {source}")]
    Connection {
        /// Target address as given by the caller
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Could not bind a listening socket
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        /// Bind address as given by the caller
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Writing a record to an open stream failed
    #[error("Send failed: {0}")]
    Send(#[source] std::io::Error),

    /// Operation requires a connected session
    #[error("Not connected")]
    NotConnected,

    /// Snapshot file could not be read or written
    #[error("Storage error on {}: {source}", .path.display())]
    Storage {
        /// Snapshot path
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Snapshot document is malformed or incomplete
    #[error("Parse error in {}: {reason}", .path.display())]
    Parse {
        /// Snapshot path
        path: PathBuf,
        /// What was wrong with the document
        reason: String,
    },

    /// I/O error outside the session and snapshot paths
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file missing, unreadable or invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid command-line value
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    pub(crate) fn parse(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Error::Parse {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Storage {
            path: path.into(),
            source,
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_operation_and_cause() {
        let err = Error::Connection {
            addr: "10.0.0.1:16384".to_string(),
            source: std::io::Error::from(std::io::ErrorKind::ConnectionRefused),
        };
        let msg = err.to_string();
        assert!(msg.contains("10.0.0.1:16384"));
        assert!(msg.contains("refused"));

        let err = Error::parse("/tmp/a.xml", "missing field 'z'");
        assert_eq!(
            err.to_string(),
            "Parse error in /tmp/a.xml: missing field 'z'"
        );
    }
}
