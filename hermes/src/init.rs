//! `hermes init`: scaffold `.hermes/` in the repository.

use std::path::Path;

use anyhow::Result;
use tracing::{debug, info};

use crate::display;
use crate::io::git::Git;
use crate::io::init::{HermesPaths, InitOptions, init_hermes};

/// Initialize `root`, taking the main branch and editor from the environment.
pub fn run_init(root: &Path, force: bool) -> Result<HermesPaths> {
    let current_branch = Git::new(root).current_branch().unwrap_or_else(|err| {
        debug!(err = %err, "cannot read current branch, assuming main");
        "main".to_string()
    });
    let options = InitOptions {
        force,
        current_branch,
        editor: std::env::var("EDITOR").ok().filter(|editor| !editor.is_empty()),
    };
    let paths = init_hermes(root, &options)?;
    info!(config = %paths.config_path.display(), "hermes initialized");

    display::success("Hermes initialized");
    display::note(&format!("\nConfiguration: {}", paths.config_path.display()));
    display::note(&format!("Settings: {}", paths.settings_path.display()));
    display::note("\nNext: try `hermes plan \"<what you want to do>\"`");
    Ok(paths)
}
