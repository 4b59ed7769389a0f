//! Error types for lease-mutex-core
//!
//! Contention is deliberately absent: losing a race is reported as `Ok(false)`
//! by the mutex operations, never as an error. Everything here is a condition
//! the caller must be able to tell apart from "someone else holds it".
//!
//! Categories and exit codes:
//! - **Validation** (exit code 1): invalid arguments or configuration
//! - **System** (exit code 2): store unavailable, IO failures
//! - **Not found** (exit code 3): lock record missing, bootstrap not run
//! - **Invalid state** (exit code 4): unreadable stored records, parse failures
//! - **Cancelled** (exit code 130): outcome of the write is unknown

use std::fmt;

use thiserror::Error;

use crate::cancel::CancelReason;

/// Operation that was in flight when an error surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Acquire,
    Release,
    Inspect,
}

impl Operation {
    /// Returns the lowercase name used in logs and messages.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Acquire => "acquire",
            Self::Release => "release",
            Self::Inspect => "inspect",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Core error type for lease-mutex operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
    /// Caller bug detected before any store round trip.
    #[error("invalid {field}: {reason}")]
    InvalidArgument { field: &'static str, reason: String },

    /// The lock record has never been seeded.
    #[error("lock record '{lock}' not found (run `init` to bootstrap it)")]
    NotFound { lock: String },

    /// The store could not be reached or rejected the request for
    /// reasons other than the predicate.
    #[error("lock store unavailable: {0}")]
    Unavailable(String),

    /// The call was abandoned before the store answered. The write may or
    /// may not have been applied.
    #[error("{operation} on '{lock}' cancelled ({reason}); the lock state is unknown")]
    Cancelled {
        operation: Operation,
        lock: String,
        reason: CancelReason,
    },

    /// Configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Filesystem failure while loading configuration.
    #[error("IO error: {0}")]
    IoError(String),

    /// Malformed configuration or input text.
    #[error("parse error: {0}")]
    ParseError(String),

    /// A stored record could not be decoded.
    #[error("corrupt lock record '{lock}': {reason}")]
    CorruptRecord { lock: String, reason: String },
}

impl Error {
    /// Create an invalid argument error for `field`.
    pub fn invalid_argument(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field,
            reason: reason.into(),
        }
    }

    /// Create a not-found error for a lock name.
    pub fn not_found(lock: impl Into<String>) -> Self {
        Self::NotFound { lock: lock.into() }
    }

    /// Create an unavailable error.
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Create an invalid configuration error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a corrupt record error.
    pub fn corrupt_record(lock: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::CorruptRecord {
            lock: lock.into(),
            reason: reason.into(),
        }
    }

    /// Stable machine-readable code.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidArgument { .. } => "INVALID_ARGUMENT",
            Self::NotFound { .. } => "LOCK_NOT_FOUND",
            Self::Unavailable(_) => "STORE_UNAVAILABLE",
            Self::Cancelled { .. } => "CANCELLED",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::IoError(_) => "IO_ERROR",
            Self::ParseError(_) => "PARSE_ERROR",
            Self::CorruptRecord { .. } => "CORRUPT_RECORD",
        }
    }

    /// Returns the process exit code for this error.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidArgument { .. } | Self::InvalidConfig(_) => 1,
            Self::Unavailable(_) | Self::IoError(_) => 2,
            Self::NotFound { .. } => 3,
            Self::ParseError(_) | Self::CorruptRecord { .. } => 4,
            Self::Cancelled { .. } => 130,
        }
    }

    /// True when the stored lock state after this error cannot be known.
    pub const fn is_indeterminate(&self) -> bool {
        matches!(self, Self::Cancelled { .. } | Self::Unavailable(_))
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        Self::Unavailable(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::IoError(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::ParseError(format!("failed to parse config: {err}"))
    }
}

/// Result type alias for lease-mutex-core operations
pub type Result<T> = std::result::Result<T, Error>;
