//! Tool settings stored under `.hermes/settings.toml`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::core::stats::DEFAULT_HISTORY_CAP;

/// Hermes tool settings (TOML).
///
/// Separate from the team-shared `config.json`: these tune how hermes talks
/// to its collaborators. Missing fields default to the values below.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HermesSettings {
    pub advisory: AdvisorySettings,
    pub ledger: LedgerSettings,
    pub executor: ExecutorSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AdvisorySettings {
    /// Advisory CLI executable.
    pub program: String,
    /// Model selector passed as `--model`.
    pub model: String,
    /// Ceiling on a single advisory call.
    pub timeout_secs: u64,
    /// Discard response bytes beyond this limit.
    pub output_limit_bytes: usize,
    /// Pass `--allow-all-tools` for non-interactive use.
    pub allow_all_tools: bool,
}

impl Default for AdvisorySettings {
    fn default() -> Self {
        Self {
            program: "copilot".to_string(),
            model: "claude-sonnet-4.5".to_string(),
            timeout_secs: 120,
            output_limit_bytes: 10 * 1024 * 1024,
            allow_all_tools: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LedgerSettings {
    /// Maximum entries kept in `commandHistory`.
    pub history_cap: usize,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            history_cap: DEFAULT_HISTORY_CAP,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ExecutorSettings {
    /// Per-command ceiling for plan commands.
    pub command_timeout_secs: u64,
    /// Truncate captured command output beyond this many bytes.
    pub output_limit_bytes: usize,
}

impl Default for ExecutorSettings {
    fn default() -> Self {
        Self {
            command_timeout_secs: 10 * 60,
            output_limit_bytes: 1_000_000,
        }
    }
}

impl HermesSettings {
    pub fn validate(&self) -> Result<()> {
        if self.advisory.program.trim().is_empty() {
            return Err(anyhow!("advisory.program must be non-empty"));
        }
        if self.advisory.timeout_secs == 0 {
            return Err(anyhow!("advisory.timeout_secs must be > 0"));
        }
        if self.advisory.output_limit_bytes == 0 {
            return Err(anyhow!("advisory.output_limit_bytes must be > 0"));
        }
        if self.ledger.history_cap == 0 {
            return Err(anyhow!("ledger.history_cap must be > 0"));
        }
        if self.executor.command_timeout_secs == 0 {
            return Err(anyhow!("executor.command_timeout_secs must be > 0"));
        }
        if self.executor.output_limit_bytes == 0 {
            return Err(anyhow!("executor.output_limit_bytes must be > 0"));
        }
        Ok(())
    }
}

/// Load settings from a TOML file.
///
/// If the file is missing, returns `HermesSettings::default()`.
pub fn load_settings(path: &Path) -> Result<HermesSettings> {
    if !path.exists() {
        return Ok(HermesSettings::default());
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let settings: HermesSettings =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    settings.validate()?;
    Ok(settings)
}

/// Atomically write settings to disk (temp file + rename).
pub fn write_settings(path: &Path, settings: &HermesSettings) -> Result<()> {
    settings.validate()?;
    let mut buf = toml::to_string_pretty(settings).context("serialize settings toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("settings path missing parent {}", path.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp settings {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace settings {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_returns_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let settings = load_settings(&temp.path().join("missing.toml")).expect("load");
        assert_eq!(settings, HermesSettings::default());
    }

    #[test]
    fn write_then_load_round_trips() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join(".hermes/settings.toml");
        let mut settings = HermesSettings::default();
        settings.advisory.model = "gpt-5".to_string();
        write_settings(&path, &settings).expect("write");
        assert_eq!(load_settings(&path).expect("load"), settings);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("settings.toml");
        fs::write(&path, "[advisory]\nmodel = \"gpt-5.2\"\n").expect("write");
        let settings = load_settings(&path).expect("load");
        assert_eq!(settings.advisory.model, "gpt-5.2");
        assert_eq!(settings.advisory.program, "copilot");
        assert_eq!(settings.ledger.history_cap, DEFAULT_HISTORY_CAP);
    }

    #[test]
    fn zero_history_cap_is_rejected() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("settings.toml");
        fs::write(&path, "[ledger]\nhistory_cap = 0\n").expect("write");
        let err = load_settings(&path).unwrap_err();
        assert!(err.to_string().contains("history_cap"));
    }
}
