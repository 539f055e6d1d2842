use std::time::Duration;
use thiserror::Error;

/// Errors raised by the adapter
#[derive(Error, Debug)]
pub enum Error {
    /// A required option was absent at construction time
    #[error("Configuration error: adapter requires option '{key}'")]
    MissingOption {
        /// Dotted option name, e.g. `ftp.host`
        key: &'static str,
    },

    /// Configuration could not be parsed
    #[error("Configuration error: {0}")]
    Config(String),

    /// Filename is empty or resolves outside the configured base path
    #[error("Invalid filename: {0:?}")]
    InvalidFilename(String),

    /// The remote operation failed
    #[error(transparent)]
    Transfer(#[from] TransferError),

    /// The session did not become ready within the configured bound
    #[error("Connection not ready after {0:?}")]
    ConnectionTimeout(Duration),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error reports a missing remote file
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Transfer(err) if err.is_not_found())
    }
}

/// Errors reported by a [`TransferClient`](crate::TransferClient)
#[derive(Error, Debug)]
pub enum TransferError {
    /// The remote path does not exist
    #[error("Remote file not found: {0}")]
    NotFound(String),

    /// No usable session
    #[error("Connection error: {0}")]
    Connection(String),

    /// A download stream failed after it was opened
    #[error("Stream error: {0}")]
    Stream(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from the underlying protocol client, passed through as-is
    #[error("Transfer client error: {0}")]
    Client(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl TransferError {
    /// Wrap an error from the underlying protocol client
    pub fn client<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        TransferError::Client(err.into())
    }

    /// Whether this error reports a missing remote file
    pub fn is_not_found(&self) -> bool {
        match self {
            TransferError::NotFound(_) => true,
            TransferError::Io(err) => err.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }
}

/// Result alias for adapter operations
pub type Result<T> = std::result::Result<T, Error>;
