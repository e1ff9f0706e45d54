//! Error types for ACME DNS-01 challenge provisioning
//!
//! This module defines all error types used throughout the crate.

use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Result type alias for challenge provisioning operations
pub type Result<T> = std::result::Result<T, Error>;

/// Remote operation performed against a single TXT record set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOperation {
    /// Reading the current record set
    Read,
    /// Creating a record set that did not exist
    Create,
    /// Writing back an existing record set with an appended value
    Update,
    /// Deleting a record set
    Delete,
}

impl fmt::Display for RecordOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecordOperation::Read => "read",
            RecordOperation::Create => "create",
            RecordOperation::Update => "update",
            RecordOperation::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// Core error type for challenge provisioning
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// A provider-specific required field was missing or empty
    #[error("Configuration error: {provider} {field} must be set")]
    MissingField {
        /// Provider name
        provider: &'static str,
        /// Missing field name
        field: &'static str,
    },

    /// Provider type not supported
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// A challenge identifier cannot be expressed within the configured zone
    #[error("Identifier '{identifier}' is not within zone '{zone}'")]
    Mapping {
        /// Challenge identifier
        identifier: String,
        /// Configured zone name
        zone: String,
    },

    /// A remote operation on one record set failed
    #[error("Failed to {operation} TXT record set '{record}': {source}")]
    RecordOperation {
        /// Operation that failed
        operation: RecordOperation,
        /// Record set name
        record: String,
        /// Underlying provider error
        #[source]
        source: Box<Error>,
    },

    /// Provider-specific error
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// HTTP client errors (from provider APIs)
    #[error("HTTP error: {0}")]
    Http(String),

    /// Authentication errors
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Rate limiting errors
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Lazy zone initialization failed; the failure is cached
    #[error("Zone initialization failed: {0}")]
    Initialization(#[source] Arc<Error>),

    /// One or more record sets could not be removed
    #[error("Failed to remove {} TXT record set(s): {}", .0.len(), failed_records(.0))]
    Removal(Vec<Error>),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a missing-field configuration error
    pub fn missing_field(provider: &'static str, field: &'static str) -> Self {
        Self::MissingField { provider, field }
    }

    /// Create an unsupported-operation error
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }

    /// Create a mapping error
    pub fn mapping(identifier: impl Into<String>, zone: impl Into<String>) -> Self {
        Self::Mapping {
            identifier: identifier.into(),
            zone: zone.into(),
        }
    }

    /// Tag an error with the record set and operation it came from
    pub fn record_operation(
        operation: RecordOperation,
        record: impl Into<String>,
        source: Error,
    ) -> Self {
        Self::RecordOperation {
            operation,
            record: record.into(),
            source: Box::new(source),
        }
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a rate limit error
    pub fn rate_limited(msg: impl Into<String>) -> Self {
        Self::RateLimited(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Whether this error was detected before any remote state was touched
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::Config(_) | Error::MissingField { .. } | Error::Unsupported(_)
        )
    }

    /// Record set name this error is tagged with, if any
    pub fn record(&self) -> Option<&str> {
        match self {
            Error::RecordOperation { record, .. } => Some(record),
            _ => None,
        }
    }
}

fn failed_records(errors: &[Error]) -> String {
    errors
        .iter()
        .map(|e| match e {
            Error::Mapping { identifier, .. } => identifier.as_str(),
            _ => e.record().unwrap_or("<unknown>"),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
