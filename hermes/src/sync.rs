//! `hermes sync`: bring the current branch up to date.

use anyhow::Result;

use crate::display;
use crate::guided::{Guide, GuidedOutcome, GuidedRequest, run_guided};
use crate::io::advisory::Advisor;
use crate::io::config::HermesConfig;
use crate::io::executor::CommandRunner;
use crate::io::ledger::Ledger;
use crate::io::probe::RepoQueries;

const SYNC_FIELDS: &[&str] = &["approach", "isRisky", "riskExplanation"];

/// Source branch: `--from`, else the configured main branch, else `main`.
pub fn sync_source<'a>(from: Option<&'a str>, config: Option<&'a HermesConfig>) -> &'a str {
    from.or_else(|| config.map(|config| config.project.main_branch.as_str()))
        .unwrap_or("main")
}

pub fn sync_intent(source: &str) -> String {
    format!(
        "Sync branch from {source}. Evaluate if rebase or merge is safer. Check if branch is shared."
    )
}

pub fn run_sync<Q, A, R>(
    guide: &Guide<'_, Q, A, R>,
    config: Option<&HermesConfig>,
    ledger: &Ledger,
    from: Option<&str>,
) -> Result<GuidedOutcome>
where
    Q: RepoQueries,
    A: Advisor,
    R: CommandRunner,
{
    let args: Vec<String> = from.map(str::to_string).into_iter().collect();
    ledger.track("sync", &args, |commands_run| {
        display::heading("Syncing branch...");
        let request = GuidedRequest {
            intent: sync_intent(sync_source(from, config)),
            extra_fields: SYNC_FIELDS,
        };
        let outcome = run_guided(guide, &request, commands_run, |plan| {
            if plan.is_risky {
                if let Some(risk) = &plan.risk_explanation {
                    display::warning(risk);
                    display::note("");
                }
            }
        })?;
        if let Some(plan) = outcome.completed_plan() {
            let approach = plan.approach.as_deref().unwrap_or("selected method");
            display::success(&format!("Branch synced using {approach}"));
        }
        Ok(outcome)
    })
}
