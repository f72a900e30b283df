//! Ledger aggregate and the summary math derived from it.
//!
//! Counters on [`Stats`] only ever grow. History is bounded: appending past
//! the cap evicts the oldest entries, which leaves the counters untouched, so
//! replaying history can disagree with the all-time totals.

use serde::{Deserialize, Serialize};

use crate::core::estimate::estimate_time_saved;

pub const DAY_MS: i64 = 24 * 60 * 60 * 1000;
pub const DEFAULT_HISTORY_CAP: usize = 1000;
pub const TOP_COMMANDS: usize = 5;

/// One recorded invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsEntry {
    /// Epoch milliseconds.
    pub timestamp: i64,
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    /// Wall-clock seconds.
    #[serde(default)]
    pub duration: f64,
    pub success: bool,
    #[serde(default)]
    pub git_commands_run: u32,
    #[serde(default)]
    pub time_saved: f64,
}

impl StatsEntry {
    pub fn new(
        timestamp: i64,
        command: &str,
        args: Vec<String>,
        duration: f64,
        success: bool,
        git_commands_run: u32,
    ) -> Self {
        Self {
            timestamp,
            command: command.to_string(),
            args,
            duration,
            success,
            git_commands_run,
            time_saved: estimate_time_saved(command, git_commands_run),
        }
    }
}

/// Durable aggregate persisted as `.hermes/stats.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_commands: u64,
    pub total_git_commands: u64,
    pub total_time_saved: f64,
    pub command_history: Vec<StatsEntry>,
    /// Epoch milliseconds of the first write; never changes afterwards.
    pub start_date: i64,
    pub last_used: i64,
}

impl Stats {
    pub fn empty(now_ms: i64) -> Self {
        Self {
            total_commands: 0,
            total_git_commands: 0,
            total_time_saved: 0.0,
            command_history: Vec::new(),
            start_date: now_ms,
            last_used: now_ms,
        }
    }

    /// Fold one entry into the counters and history, evicting the oldest
    /// history entries beyond `history_cap`.
    pub fn append(&mut self, entry: StatsEntry, history_cap: usize) {
        self.total_commands += 1;
        self.total_git_commands += u64::from(entry.git_commands_run);
        self.total_time_saved += entry.time_saved;
        self.last_used = self.last_used.max(entry.timestamp);
        self.command_history.push(entry);
        if self.command_history.len() > history_cap {
            let excess = self.command_history.len() - history_cap;
            self.command_history.drain(..excess);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandCount {
    pub command: String,
    pub count: usize,
}

/// Windowed view over the ledger plus all-time totals.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsSummary {
    pub window_days: u32,
    /// Entries inside the window.
    pub total_commands: usize,
    pub all_time_commands: u64,
    pub git_commands_run: u64,
    pub all_time_git_commands: u64,
    pub time_saved_seconds: f64,
    pub all_time_time_saved_seconds: f64,
    /// Successes over windowed entries, 0 for an empty window.
    pub success_rate: f64,
    pub top_commands: Vec<CommandCount>,
    /// Whole days since `start_date`, at least 1.
    pub days_active: u64,
    pub commands_per_day: f64,
}

/// Summarize `stats` over the `window_days` preceding `now_ms`.
pub fn summarize(stats: &Stats, window_days: u32, now_ms: i64) -> StatsSummary {
    let cutoff = now_ms.saturating_sub(i64::from(window_days).saturating_mul(DAY_MS));
    let recent: Vec<&StatsEntry> = stats
        .command_history
        .iter()
        .filter(|entry| entry.timestamp >= cutoff)
        .collect();

    let successes = recent.iter().filter(|entry| entry.success).count();
    let success_rate = if recent.is_empty() {
        0.0
    } else {
        successes as f64 / recent.len() as f64
    };

    let days_active = days_since(stats.start_date, now_ms);

    StatsSummary {
        window_days,
        total_commands: recent.len(),
        all_time_commands: stats.total_commands,
        git_commands_run: recent
            .iter()
            .map(|entry| u64::from(entry.git_commands_run))
            .sum(),
        all_time_git_commands: stats.total_git_commands,
        time_saved_seconds: recent.iter().map(|entry| entry.time_saved).sum(),
        all_time_time_saved_seconds: stats.total_time_saved,
        success_rate,
        top_commands: top_commands(&recent),
        days_active,
        commands_per_day: stats.total_commands as f64 / days_active as f64,
    }
}

/// Most frequent commands; ties keep first-encountered order.
fn top_commands(entries: &[&StatsEntry]) -> Vec<CommandCount> {
    let mut counts: Vec<CommandCount> = Vec::new();
    for entry in entries {
        match counts.iter_mut().find(|c| c.command == entry.command) {
            Some(existing) => existing.count += 1,
            None => counts.push(CommandCount {
                command: entry.command.clone(),
                count: 1,
            }),
        }
    }
    // Stable sort preserves insertion order among equal counts.
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(TOP_COMMANDS);
    counts
}

fn days_since(start_ms: i64, now_ms: i64) -> u64 {
    let elapsed = now_ms.saturating_sub(start_ms).max(0);
    let days = (elapsed + DAY_MS - 1) / DAY_MS;
    days.max(1) as u64
}
