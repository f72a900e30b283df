//! `hermes worktree new <task>`: separate checkout for a parallel task.

use anyhow::Result;

use crate::display;
use crate::guided::{Guide, GuidedOutcome, GuidedRequest, run_guided};
use crate::io::advisory::Advisor;
use crate::io::executor::CommandRunner;
use crate::io::ledger::Ledger;
use crate::io::probe::RepoQueries;

const WORKTREE_FIELDS: &[&str] = &["branchName", "worktreePath"];

pub fn worktree_intent(task: &str) -> String {
    format!(
        "Create a worktree for: {task}. Provide safe branch name, worktree path (e.g., ../repo-branchname), and git worktree commands."
    )
}

pub fn run_worktree_new<Q, A, R>(
    guide: &Guide<'_, Q, A, R>,
    ledger: &Ledger,
    task: &str,
) -> Result<GuidedOutcome>
where
    Q: RepoQueries,
    A: Advisor,
    R: CommandRunner,
{
    ledger.track("worktree", &[task.to_string()], |commands_run| {
        display::heading("Creating worktree...");
        let request = GuidedRequest {
            intent: worktree_intent(task),
            extra_fields: WORKTREE_FIELDS,
        };
        let outcome = run_guided(guide, &request, commands_run, |plan| {
            if let (Some(branch), Some(path)) = (&plan.branch_name, &plan.worktree_path) {
                display::note(&format!("Branch: {branch}"));
                display::note(&format!("Path: {path}\n"));
            }
        })?;
        if let Some(plan) = outcome.completed_plan() {
            let path = plan.worktree_path.as_deref().unwrap_or("new worktree");
            display::success(&format!("Worktree created at {path}"));
        }
        Ok(outcome)
    })
}
