//! Initialization helpers for `.hermes/` scaffolding.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use tracing::debug;

use super::config::{HermesConfig, write_config};
use super::settings::{HermesSettings, write_settings};

const GITIGNORE_MARKER: &str = ".hermes/backups";
const GITIGNORE_ENTRIES: &str = ".hermes/backups/\n.hermes/stats.json\n.hermes/stats.lock\n";

/// All canonical paths within `.hermes/` for a repository root.
#[derive(Debug, Clone)]
pub struct HermesPaths {
    pub root: PathBuf,
    pub hermes_dir: PathBuf,
    pub backups_dir: PathBuf,
    pub config_path: PathBuf,
    pub settings_path: PathBuf,
    pub stats_path: PathBuf,
    pub stats_lock_path: PathBuf,
    pub gitignore_path: PathBuf,
}

impl HermesPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let hermes_dir = root.join(".hermes");
        Self {
            root: root.clone(),
            hermes_dir: hermes_dir.clone(),
            backups_dir: hermes_dir.join("backups"),
            config_path: hermes_dir.join("config.json"),
            settings_path: hermes_dir.join("settings.toml"),
            stats_path: hermes_dir.join("stats.json"),
            stats_lock_path: hermes_dir.join("stats.lock"),
            gitignore_path: root.join(".gitignore"),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.config_path.is_file()
    }
}

/// Options for `init_hermes`.
#[derive(Debug, Clone)]
pub struct InitOptions {
    /// If true, overwrite an existing configuration.
    pub force: bool,
    /// Current branch, used to pick the main branch name.
    pub current_branch: String,
    /// Preferred editor recorded in the config.
    pub editor: Option<String>,
}

/// Create `.hermes/` scaffolding in `root`.
///
/// Fails if `.hermes/config.json` already exists unless `options.force` is set.
/// Existing settings are kept; the `.gitignore` entries are added once.
pub fn init_hermes(root: &Path, options: &InitOptions) -> Result<HermesPaths> {
    let paths = HermesPaths::new(root);
    if paths.is_initialized() && !options.force {
        return Err(anyhow!(
            "hermes init: .hermes/config.json already exists (use --force to overwrite)"
        ));
    }

    fs::create_dir_all(&paths.backups_dir)
        .with_context(|| format!("create directory {}", paths.backups_dir.display()))?;

    let config = HermesConfig::default_for(
        &project_name(root),
        &options.current_branch,
        options.editor.as_deref(),
    );
    write_config(&paths.config_path, &config)?;
    if !paths.settings_path.exists() {
        write_settings(&paths.settings_path, &HermesSettings::default())?;
    }
    append_gitignore(&paths.gitignore_path)?;

    Ok(paths)
}

fn project_name(root: &Path) -> String {
    let resolved = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
    resolved
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "project".to_string())
}

fn append_gitignore(path: &Path) -> Result<()> {
    let existing = if path.exists() {
        fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?
    } else {
        String::new()
    };
    if existing.contains(GITIGNORE_MARKER) {
        debug!("gitignore already lists hermes entries");
        return Ok(());
    }
    let mut updated = existing;
    if !updated.is_empty() {
        if !updated.ends_with('\n') {
            updated.push('\n');
        }
        updated.push('\n');
    }
    updated.push_str("# Hermes\n");
    updated.push_str(GITIGNORE_ENTRIES);
    fs::write(path, updated).with_context(|| format!("write {}", path.display()))
}
