//! Per-invocation handles for a repository using hermes.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use crate::io::advisory::CopilotAdvisor;
use crate::io::config::{HermesConfig, load_config};
use crate::io::executor::ShellRunner;
use crate::io::git::Git;
use crate::io::init::HermesPaths;
use crate::io::ledger::Ledger;
use crate::io::prompt::PromptEngine;
use crate::io::settings::{HermesSettings, load_settings};

/// Everything a command needs, opened once from the repository root.
pub struct Workspace {
    pub paths: HermesPaths,
    pub git: Git,
    pub settings: HermesSettings,
    /// `None` until `hermes init` has run, or when the file is unusable.
    pub config: Option<HermesConfig>,
    pub ledger: Ledger,
    pub prompts: PromptEngine,
}

impl Workspace {
    pub fn open(root: &Path) -> Result<Self> {
        let paths = HermesPaths::new(root);
        let settings = load_settings(&paths.settings_path).context("load hermes settings")?;
        let config = load_config(&paths.config_path);
        let ledger = Ledger::new(&paths, settings.ledger.history_cap);
        debug!(
            root = %root.display(),
            configured = config.is_some(),
            "workspace opened"
        );
        Ok(Self {
            git: Git::new(root),
            paths,
            settings,
            config,
            ledger,
            prompts: PromptEngine::new(),
        })
    }

    pub fn advisor(&self) -> CopilotAdvisor {
        CopilotAdvisor::new(&self.paths.root, self.settings.advisory.clone())
    }

    pub fn runner(&self) -> ShellRunner {
        ShellRunner::new(&self.paths.root, &self.settings.executor)
    }
}
