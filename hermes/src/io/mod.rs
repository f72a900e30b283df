//! I/O helpers for hermes commands.

pub mod advisory;
pub mod config;
pub mod executor;
pub mod git;
pub mod init;
pub mod ledger;
pub mod probe;
pub mod process;
pub mod prompt;
pub mod settings;
