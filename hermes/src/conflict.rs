//! `hermes conflict explain|apply`: understand and resolve merge conflicts.

use std::fs;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::core::plan::strip_code_fence;
use crate::display;
use crate::guided::Guide;
use crate::io::advisory::Advisor;
use crate::io::executor::CommandRunner;
use crate::io::git::Git;
use crate::io::ledger::Ledger;

const PREVIEW_LINES: usize = 20;

pub fn explain_intent(files: &[String]) -> String {
    format!(
        "Explain these merge conflicts: {}. For each file, explain what each side is trying to do and recommend a resolution strategy.",
        files.join(", ")
    )
}

/// Print an explanation of the current conflicts.
///
/// Returns `None` when nothing is conflicted.
pub fn run_explain<A, R>(
    guide: &Guide<'_, Git, A, R>,
    ledger: &Ledger,
) -> Result<Option<String>>
where
    A: Advisor,
    R: CommandRunner,
{
    ledger.track("conflict", &["explain".to_string()], |_| {
        display::heading("Analyzing conflicts...");
        let files = guide.repo.conflicted_files();
        if files.is_empty() {
            display::note("No conflicts detected");
            return Ok(None);
        }
        let (_, explanation) = guide.analyze(&explain_intent(&files), &files)?;
        display::conflict_explanation(&explanation, &files);
        Ok(Some(explanation))
    })
}

/// Per-file results of `conflict apply`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyOutcome {
    /// Written and staged.
    pub resolved: Vec<String>,
    /// Previewed only.
    pub proposed: Vec<String>,
    /// Could not be read.
    pub unreadable: Vec<String>,
}

/// Ask for a resolution of every conflicted file and preview it.
///
/// With `accept`, each resolution is written and staged; otherwise files
/// are left untouched.
pub fn run_apply<A, R>(
    guide: &Guide<'_, Git, A, R>,
    ledger: &Ledger,
    accept: bool,
) -> Result<ApplyOutcome>
where
    A: Advisor,
    R: CommandRunner,
{
    ledger.track("conflict", &["apply".to_string()], |commands_run| {
        display::heading("Resolving conflicts...");
        let git = guide.repo;
        let files = git.conflicted_files();
        let mut outcome = ApplyOutcome::default();
        if files.is_empty() {
            display::note("No conflicts to resolve");
            return Ok(outcome);
        }

        for file in files {
            display::note(&format!("\n{file}"));
            let path = git.workdir().join(&file);
            let content = match fs::read_to_string(&path) {
                Ok(content) => content,
                Err(err) => {
                    warn!(file = %file, err = %err, "cannot read conflicted file");
                    display::warning(&format!("Could not read {file}, skipping..."));
                    outcome.unreadable.push(file);
                    continue;
                }
            };

            let prompt = guide
                .prompts
                .render_resolution(&file, &content)
                .context("render resolution prompt")?;
            let resolution = resolved_body(&guide.advisor.ask(&prompt)?);
            display::note("\nProposed resolution preview:");
            display::note(&preview(&resolution));

            if !accept {
                outcome.proposed.push(file);
                continue;
            }
            display::step(&format!("Applying resolution to {file}"));
            fs::write(&path, &resolution).with_context(|| format!("write {}", path.display()))?;
            git.add(&file)?;
            *commands_run += 1;
            info!(file = %file, "conflict resolved and staged");
            display::note("Resolved and staged");
            outcome.resolved.push(file);
        }

        if accept {
            display::note("\nRemember to commit after resolving all conflicts");
        } else {
            display::note("\nNo files were changed. Re-run with --accept to apply the resolutions.");
        }
        Ok(outcome)
    })
}

/// Unwrap a response that is entirely one fenced block; keep a trailing newline.
fn resolved_body(response: &str) -> String {
    let trimmed = response.trim();
    let body = if trimmed.starts_with("```") && trimmed.ends_with("```") {
        strip_code_fence(trimmed)
    } else {
        response.trim_end()
    };
    format!("{body}\n")
}

fn preview(text: &str) -> String {
    let rule = "-".repeat(50);
    let lines: Vec<&str> = text.lines().collect();
    let mut out = format!("{rule}\n");
    for line in lines.iter().take(PREVIEW_LINES) {
        out.push_str(line);
        out.push('\n');
    }
    if lines.len() > PREVIEW_LINES {
        out.push_str(&format!("... ({} more lines)\n", lines.len() - PREVIEW_LINES));
    }
    out.push_str(&rule);
    out
}
