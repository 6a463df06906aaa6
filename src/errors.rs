/*!
 * Error types for the thesisrag application.
 *
 * This module contains custom error types for the different layers of the
 * application, using the thiserror crate for ergonomic error definitions.
 * Orchestration code wraps these in `anyhow::Error` with context.
 */

use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

impl ProviderError {
    /// Map a non-success HTTP status and body to the matching error variant
    pub fn from_status(status_code: u16, message: String) -> Self {
        match status_code {
            401 | 403 => Self::AuthenticationError(message),
            429 => Self::RateLimitExceeded(message),
            _ => Self::ApiError { status_code, message },
        }
    }

    /// Map a transport-level reqwest failure
    pub fn from_transport(error: reqwest::Error) -> Self {
        if error.is_connect() || error.is_timeout() {
            Self::ConnectionError(error.to_string())
        } else {
            Self::RequestFailed(error.to_string())
        }
    }
}

/// Errors from the external document converter
#[derive(Error, Debug)]
pub enum ConversionError {
    /// The converter binary could not be started
    #[error("Converter binary not found: {0}")]
    BinaryNotFound(String),

    /// The converter exited with a failure status
    #[error("Conversion failed (exit code {code:?}): {stderr}")]
    Failed {
        /// Process exit code, if any
        code: Option<i32>,
        /// Filtered standard error output
        stderr: String,
    },

    /// The converter did not finish in time
    #[error("Conversion timed out after {0} seconds")]
    TimedOut(u64),

    /// Any other I/O failure while running the converter
    #[error("Conversion I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the on-disk vector store
#[derive(Error, Debug)]
pub enum StoreError {
    /// The store has not been built yet
    #[error("Vector store not found at {0}; run the index command first")]
    NotIndexed(String),

    /// SQLite failure
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A stored embedding could not be decoded
    #[error("Corrupt embedding for chunk {0}")]
    CorruptEmbedding(String),

    /// Embeddings and chunks were not paired one to one
    #[error("Expected {expected} embeddings, got {actual}")]
    EmbeddingCountMismatch {
        /// Number of chunks
        expected: usize,
        /// Number of embeddings received
        actual: usize,
    },

    /// The connection mutex was poisoned
    #[error("Failed to acquire store lock: {0}")]
    Lock(String),

    /// Creating or replacing the store file failed
    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Invalid or incomplete configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from the document converter
    #[error("Conversion error: {0}")]
    Conversion(#[from] ConversionError),

    /// Error from the vector store
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
