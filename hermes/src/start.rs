//! `hermes start <task>`: create and switch to a branch for new work.

use anyhow::Result;

use crate::core::branch::{generate_branch_name, is_protected_branch};
use crate::display;
use crate::guided::{Guide, GuidedOutcome, GuidedRequest, run_guided};
use crate::io::advisory::Advisor;
use crate::io::config::HermesConfig;
use crate::io::executor::CommandRunner;
use crate::io::ledger::Ledger;
use crate::io::probe::RepoQueries;

const START_FIELDS: &[&str] = &["baseBranch", "branchName"];

/// Branch name from the configured feature pattern, if configured.
pub fn suggested_branch(config: Option<&HermesConfig>, task: &str) -> Option<String> {
    config.map(|config| generate_branch_name(&config.branches.feature_pattern, task, None))
}

pub fn start_intent(task: &str, suggested: Option<&str>) -> String {
    let mut intent = format!("Start working on: {task}.");
    if let Some(branch) = suggested {
        intent.push_str(&format!(" Suggested branch name: {branch}."));
    }
    intent.push_str(
        " Provide base branch, conventional branch name, and Git commands to create and switch to the branch.",
    );
    intent
}

pub fn run_start<Q, A, R>(
    guide: &Guide<'_, Q, A, R>,
    config: Option<&HermesConfig>,
    ledger: &Ledger,
    task: &str,
) -> Result<GuidedOutcome>
where
    Q: RepoQueries,
    A: Advisor,
    R: CommandRunner,
{
    ledger.track("start", &[task.to_string()], |commands_run| {
        display::heading("Starting new task...");
        let suggested = suggested_branch(config, task);
        if let Some(branch) = &suggested {
            display::note(&format!("Suggested branch: {branch}\n"));
        }
        let protected = config.map(|config| config.project.protected_branches.as_slice());

        let request = GuidedRequest {
            intent: start_intent(task, suggested.as_deref()),
            extra_fields: START_FIELDS,
        };
        let outcome = run_guided(guide, &request, commands_run, |plan| {
            if let (Some(base), Some(branch)) = (&plan.base_branch, &plan.branch_name) {
                display::note(&format!("Base branch: {base}"));
                display::note(&format!("New branch: {branch}\n"));
            }
            if let Some(branch) = plan
                .branch_name
                .as_deref()
                .filter(|branch| is_protected_branch(branch, protected))
            {
                display::warning(&format!("{branch} is a protected branch"));
            }
        })?;

        if let Some(plan) = outcome.completed_plan() {
            let branch = plan.branch_name.as_deref().unwrap_or("new branch");
            display::success(&format!("Created and switched to {branch}"));
            if config.is_some_and(|config| config.preferences.learning_mode) {
                display::note(
                    "\nLearning tip: Branch created from clean state ensures no unexpected commits",
                );
            }
        }
        Ok(outcome)
    })
}
