//! `hermes workflow`: fixed command sequences that need no advice.

use anyhow::Result;

use crate::core::plan::{Plan, PlanCommand};
use crate::core::repo_state::RepoState;
use crate::display;
use crate::io::config::HermesConfig;
use crate::io::executor::{CommandRunner, StepEvent, execute_plan};
use crate::io::git::Git;
use crate::io::ledger::Ledger;
use crate::io::probe::probe;

const BUILT_IN: &[(&str, &str)] = &[
    ("pr-ready", "Sync, rebase, and push for PR"),
    ("daily-sync", "Fetch updates and show status"),
    ("quick-commit", "Stage and commit all changes"),
];

fn plan_of(commands: &[String]) -> Plan {
    Plan {
        commands: commands.iter().filter_map(|c| PlanCommand::new(c.as_str())).collect(),
        ..Plan::default()
    }
}

/// Run `commands` in order through `runner`, counting successes.
fn run_steps<R: CommandRunner>(runner: &R, commands: &[String], commands_run: &mut u32) -> Result<()> {
    let result = execute_plan(runner, &plan_of(commands), |event| match event {
        StepEvent::Starting(command) => display::step(command.as_str()),
        StepEvent::Finished(_, output) => display::step_output(output),
    });
    *commands_run += result.commands_run;
    result.into_result()?;
    Ok(())
}

pub fn pr_ready_commands(config: Option<&HermesConfig>) -> Vec<String> {
    let main = config.map_or("main", |config| config.project.main_branch.as_str());
    vec![
        "git fetch origin".to_string(),
        format!("git rebase origin/{main}"),
        "git push --force-with-lease".to_string(),
    ]
}

pub fn run_pr_ready<R: CommandRunner>(
    runner: &R,
    config: Option<&HermesConfig>,
    ledger: &Ledger,
) -> Result<()> {
    ledger.track("workflow", &["pr-ready".to_string()], |commands_run| {
        display::heading("Preparing branch for PR...");
        run_steps(runner, &pr_ready_commands(config), commands_run)?;
        display::success("Branch ready for PR!");
        display::note("\nNext: Create PR with `gh pr create` or use your Git hosting UI");
        Ok(())
    })
}

pub fn run_daily_sync<R: CommandRunner>(runner: &R, git: &Git, ledger: &Ledger) -> Result<RepoState> {
    ledger.track("workflow", &["daily-sync".to_string()], |commands_run| {
        display::heading("Running daily sync...");
        run_steps(runner, &["git fetch --all --prune".to_string()], commands_run)?;
        let state = probe(git)?;
        display::note(&format!("\n{}", display::state_summary(&state)));
        if state.behind > 0 {
            display::note("Suggestion: Run `hermes sync` to catch up");
        } else {
            display::note("Up to date with remote");
        }
        display::success("Daily sync complete!");
        Ok(state)
    })
}

/// Stage everything, show the staged summary, and commit when a message is given.
///
/// Returns whether a commit was made.
pub fn run_quick_commit<R: CommandRunner>(
    runner: &R,
    git: &Git,
    ledger: &Ledger,
    message: Option<&str>,
) -> Result<bool> {
    ledger.track("workflow", &["quick-commit".to_string()], |commands_run| {
        display::heading("Quick commit...");
        let state = probe(git)?;
        if state.is_clean {
            display::note("Nothing to commit");
            return Ok(false);
        }
        run_steps(runner, &["git add -A".to_string()], commands_run)?;
        display::note("\nStaged changes:");
        display::step_output(&git.staged_stat()?);

        let Some(message) = message else {
            display::note("\nTip: Use `git commit` with a descriptive message, or pass -m");
            return Ok(false);
        };
        display::step(&format!("git commit -m \"{message}\""));
        let committed = git.commit_staged(message)?;
        if committed {
            *commands_run += 1;
            display::success("Changes committed");
        }
        Ok(committed)
    })
}

/// Built-in shortcuts followed by the project's configured workflows.
pub fn workflow_list(config: Option<&HermesConfig>) -> String {
    let mut out = String::from("Available workflows:\n\nBuilt-in:\n");
    for (name, description) in BUILT_IN {
        out.push_str(&format!("  - {name:<14}- {description}\n"));
    }
    match config {
        Some(config) if !config.workflows.is_empty() => {
            out.push_str("\nProject-specific:\n");
            for (name, steps) in &config.workflows {
                out.push_str(&format!("  - {name:<14}- {}\n", steps.join(" -> ")));
            }
        }
        _ => out.push_str("\nRun `hermes init` to define custom workflows\n"),
    }
    out
}
