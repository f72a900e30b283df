//! Time-saved estimation for ledger entries.
//!
//! The estimate is a fixed formula, never a measurement: each top-level
//! command has a base saving in seconds, and each underlying command beyond
//! the first adds a fixed increment for syntax lookup and recall.

/// Seconds credited for every underlying command after the first.
pub const PER_COMMAND_SECONDS: f64 = 15.0;

/// Base saving in seconds for a top-level command; unknown names earn nothing.
pub fn base_estimate(command: &str) -> f64 {
    match command {
        "plan" => 120.0,
        "start" => 60.0,
        "sync" => 90.0,
        "wip" => 30.0,
        "conflict" => 180.0,
        "worktree" => 90.0,
        _ => 0.0,
    }
}

/// Estimated seconds saved by one invocation.
pub fn estimate_time_saved(command: &str, git_commands_run: u32) -> f64 {
    let extra = git_commands_run.saturating_sub(1);
    base_estimate(command) + f64::from(extra) * PER_COMMAND_SECONDS
}
