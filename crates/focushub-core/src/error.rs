//! Core error types for focushub-core.
//!
//! Every external boundary (local storage, document store, email relay,
//! configuration) has its own error enum; `CoreError` wraps them for
//! callers that do not care which boundary failed.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for focushub-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Local or remote persistence errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Outbound email errors
    #[error("Email error: {0}")]
    Email(#[from] EmailError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Persistence errors, shared by local storage and document store adapters.
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQLite failure in the embedded stores
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Failed to open the database file
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Transport failure talking to the remote document store
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Remote store answered with a non-success status
    #[error("Remote store returned HTTP {status}: {message}")]
    Remote { status: u16, message: String },

    /// Stored payload could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Endpoint could not be turned into a request URL
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// A lock guarding the store was poisoned
    #[error("Store lock poisoned")]
    Poisoned,
}

/// Outbound email errors.
#[derive(Error, Debug)]
pub enum EmailError {
    /// No recipient given
    #[error("Email is required")]
    MissingRecipient,

    /// Transport failure talking to the relay
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Relay rejected the message
    #[error("Failed to send email (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    /// Relay endpoint is not a valid URL
    #[error("Invalid relay endpoint: {0}")]
    InvalidEndpoint(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dot-path key
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Data directory could not be created
    #[error("Failed to prepare data directory {path}: {source}")]
    DataDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Validation errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// Task text empty after trimming
    #[error("Task text must not be empty")]
    EmptyTaskText,

    /// Target sessions must be positive
    #[error("Target sessions must be at least 1")]
    ZeroTargetSessions,

    /// Custom focus duration outside the accepted range
    #[error("Custom focus duration must be between {min} and {max} minutes (got {got})")]
    CustomDurationOutOfRange { got: u64, min: u64, max: u64 },

    /// Unknown preset key
    #[error("Unknown preset: {0}")]
    UnknownPreset(String),

    /// Unknown timer mode
    #[error("Unknown timer mode: {0}")]
    UnknownMode(String),

    /// No task with the given id
    #[error("Task not found: {0}")]
    TaskNotFound(String),
}

impl From<Box<dyn std::error::Error + Send + Sync>> for CoreError {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        CoreError::Custom(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
