//! Outcomes the CLI reports as failures even though the protocol treats
//! them as ordinary answers.

use thiserror::Error;

/// `EX_TEMPFAIL`: the lock is busy, try again later.
pub const EXIT_TEMPFAIL: i32 = 75;

/// Interrupted by Ctrl-C.
pub const EXIT_INTERRUPTED: i32 = 130;

fn holder_label(holder: Option<&String>) -> &str {
    holder.map_or("another owner", String::as_str)
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("lock '{lock}' is held by {}", holder_label(.holder.as_ref()))]
    Busy { lock: String, holder: Option<String> },

    #[error("'{owner}' does not hold lock '{lock}'")]
    NotHeld { lock: String, owner: String },

    #[error("interrupted while waiting for lock '{lock}'")]
    Interrupted { lock: String },
}

impl Error {
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Busy { .. } | Self::NotHeld { .. } => EXIT_TEMPFAIL,
            Self::Interrupted { .. } => EXIT_INTERRUPTED,
        }
    }
}
