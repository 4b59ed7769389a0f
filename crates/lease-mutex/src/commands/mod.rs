//! Subcommand implementations

pub mod acquire;
pub mod console;
pub mod init;
pub mod release;
pub mod status;
