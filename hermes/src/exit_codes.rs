//! Stable exit codes for the hermes CLI.

/// Command completed, including plans that were shown but not executed.
pub const OK: i32 = 0;
/// Environment error, failed command, or any other unhandled error.
pub const FAILURE: i32 = 1;
