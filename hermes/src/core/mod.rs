//! Deterministic, pure logic shared by the hermes commands.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! data structures and return deterministic outputs suitable for tests.

pub mod branch;
pub mod estimate;
pub mod failure;
pub mod format;
pub mod plan;
pub mod repo_state;
pub mod stats;
