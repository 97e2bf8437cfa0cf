/// Error types for the review loop
///
/// Errors fall into two groups:
/// - setup failures (configuration, database connection, base map) which
///   abort before the first record is shown
/// - per-record failures (image download/decode, malformed documents) which
///   the loop may skip depending on the configured policy

use thiserror::Error;

use crate::state::data::RecordId;

/// All errors produced while setting up or running a review session
#[derive(Debug, Error)]
pub enum ReviewError {
    /// Missing or invalid configuration (e.g. no connection string)
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// The database could not be reached during startup
    #[error("Database connection error: {message}")]
    Connection { message: String },

    /// A query or update failed after the connection was established
    #[error("Database error during {operation}: {message}")]
    Database { operation: String, message: String },

    /// Image download or decode failed
    #[error("Failed to fetch image {url}: {message}")]
    Fetch { url: String, message: String },

    /// A pending document is missing a field the review needs
    #[error("Malformed record {id}: {message}")]
    MalformedRecord { id: RecordId, message: String },

    /// The static base map could not be loaded
    #[error("Could not load base map from {path}: {message}")]
    BaseMap { path: String, message: String },

    /// The review window could not be created or was closed mid-review
    #[error("Display error: {message}")]
    Display { message: String },

    /// Background task failure
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl ReviewError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    pub fn database(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Database {
            operation: operation.into(),
            message: message.into(),
        }
    }

    pub fn fetch(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Fetch {
            url: url.into(),
            message: message.into(),
        }
    }

    pub fn malformed(id: RecordId, message: impl Into<String>) -> Self {
        Self::MalformedRecord {
            id,
            message: message.into(),
        }
    }

    pub fn base_map(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BaseMap {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn display(message: impl Into<String>) -> Self {
        Self::Display {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether the loop may continue with the next record after this error
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Fetch { .. } | Self::MalformedRecord { .. })
    }
}

impl From<tokio::task::JoinError> for ReviewError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::internal(format!("Task join error: {}", err))
    }
}

impl From<iced::Error> for ReviewError {
    fn from(err: iced::Error) -> Self {
        Self::display(err.to_string())
    }
}
