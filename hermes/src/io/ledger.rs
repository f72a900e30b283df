//! Persistent efficiency ledger at `.hermes/stats.json`.
//!
//! Every write is a read-modify-write under an exclusive lock on
//! `.hermes/stats.lock`, so concurrent `hermes` processes never lose
//! entries. Recording is best effort: failures are logged and swallowed so
//! they never change the outcome of the command being tracked.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::Utc;
use fs2::FileExt;
use tracing::{debug, instrument, warn};

use crate::core::stats::{Stats, StatsEntry, StatsSummary, summarize};
use crate::io::init::HermesPaths;

pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Exclusive lock on the ledger, released on drop.
struct LedgerLock {
    _file: File,
}

impl LedgerLock {
    fn acquire(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create directory {}", parent.display()))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(path)
            .with_context(|| format!("open lock file {}", path.display()))?;
        file.lock_exclusive()
            .with_context(|| format!("lock {}", path.display()))?;
        Ok(Self { _file: file })
    }
}

#[derive(Debug, Clone)]
pub struct Ledger {
    stats_path: PathBuf,
    lock_path: PathBuf,
    history_cap: usize,
}

impl Ledger {
    pub fn new(paths: &HermesPaths, history_cap: usize) -> Self {
        Self::from_paths(&paths.stats_path, &paths.stats_lock_path, history_cap)
    }

    pub fn from_paths(stats_path: &Path, lock_path: &Path, history_cap: usize) -> Self {
        Self {
            stats_path: stats_path.to_path_buf(),
            lock_path: lock_path.to_path_buf(),
            history_cap,
        }
    }

    /// Record one invocation, logging instead of failing on I/O errors.
    pub fn record(
        &self,
        command: &str,
        args: &[String],
        duration_secs: f64,
        success: bool,
        git_commands_run: u32,
    ) {
        if let Err(err) = self.try_record(command, args, duration_secs, success, git_commands_run) {
            warn!(command, err = %format!("{err:#}"), "failed to update stats ledger");
        }
    }

    pub fn try_record(
        &self,
        command: &str,
        args: &[String],
        duration_secs: f64,
        success: bool,
        git_commands_run: u32,
    ) -> Result<()> {
        let entry = StatsEntry::new(
            now_ms(),
            command,
            args.to_vec(),
            duration_secs,
            success,
            git_commands_run,
        );
        self.record_entry(entry)
    }

    #[instrument(skip_all, fields(command = %entry.command, success = entry.success))]
    pub fn record_entry(&self, entry: StatsEntry) -> Result<()> {
        let _lock = LedgerLock::acquire(&self.lock_path)?;
        let mut stats = self.load_at(entry.timestamp);
        stats.append(entry, self.history_cap);
        self.save(&stats)?;
        debug!(total = stats.total_commands, "stats ledger updated");
        Ok(())
    }

    /// Current ledger contents; a missing or unreadable file is an empty ledger.
    pub fn load(&self) -> Stats {
        self.load_at(now_ms())
    }

    fn load_at(&self, now: i64) -> Stats {
        let contents = match fs::read_to_string(&self.stats_path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Stats::empty(now);
            }
            Err(err) => {
                warn!(path = %self.stats_path.display(), err = %err, "cannot read stats ledger");
                return Stats::empty(now);
            }
        };
        match serde_json::from_str(&contents) {
            Ok(stats) => stats,
            Err(err) => {
                warn!(path = %self.stats_path.display(), err = %err, "stats ledger is corrupt, starting fresh");
                Stats::empty(now)
            }
        }
    }

    fn save(&self, stats: &Stats) -> Result<()> {
        let mut buf = serde_json::to_string_pretty(stats).context("serialize stats")?;
        buf.push('\n');
        let tmp_path = self.stats_path.with_extension("json.tmp");
        fs::write(&tmp_path, buf)
            .with_context(|| format!("write temp stats {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &self.stats_path)
            .with_context(|| format!("replace stats {}", self.stats_path.display()))?;
        Ok(())
    }

    pub fn summarize(&self, window_days: u32) -> StatsSummary {
        self.summarize_at(window_days, now_ms())
    }

    pub fn summarize_at(&self, window_days: u32, now: i64) -> StatsSummary {
        summarize(&self.load_at(now), window_days, now)
    }

    /// Run `body`, timing it and recording the outcome.
    ///
    /// `body` receives a counter to bump for every command it runs on the
    /// user's behalf. The body's result is returned unchanged.
    pub fn track<T>(
        &self,
        command: &str,
        args: &[String],
        body: impl FnOnce(&mut u32) -> Result<T>,
    ) -> Result<T> {
        let started = Instant::now();
        let mut git_commands_run = 0;
        let result = body(&mut git_commands_run);
        self.record(
            command,
            args,
            started.elapsed().as_secs_f64(),
            result.is_ok(),
            git_commands_run,
        );
        result
    }
}
