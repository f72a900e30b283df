//! `hermes wip`: save work in progress by committing or stashing.

use anyhow::Result;

use crate::display;
use crate::guided::{Guide, GuidedOutcome, GuidedRequest, run_guided};
use crate::io::advisory::Advisor;
use crate::io::executor::CommandRunner;
use crate::io::ledger::Ledger;
use crate::io::probe::RepoQueries;

const WIP_FIELDS: &[&str] = &["approach"];

pub fn wip_intent(message: Option<&str>) -> String {
    let mut intent = String::from("Save work in progress");
    if let Some(message) = message {
        intent.push_str(&format!(" with message: \"{message}\""));
    }
    intent.push_str(". Decide whether to commit or stash.");
    intent
}

pub fn run_wip<Q, A, R>(
    guide: &Guide<'_, Q, A, R>,
    ledger: &Ledger,
    message: Option<&str>,
) -> Result<GuidedOutcome>
where
    Q: RepoQueries,
    A: Advisor,
    R: CommandRunner,
{
    let args: Vec<String> = message.map(str::to_string).into_iter().collect();
    ledger.track("wip", &args, |commands_run| {
        display::heading("Saving work in progress...");
        let request = GuidedRequest {
            intent: wip_intent(message),
            extra_fields: WIP_FIELDS,
        };
        let outcome = run_guided(guide, &request, commands_run, |_| {})?;
        if let Some(plan) = outcome.completed_plan() {
            let approach = plan.approach.as_deref().unwrap_or("selected method");
            display::success(&format!("Work saved using {approach}"));
        }
        Ok(outcome)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::git::Git;
    use crate::io::init::HermesPaths;
    use crate::io::prompt::PromptEngine;
    use crate::test_support::{ScriptedAdvisor, ScriptedRunner, TestRepo};

    #[test]
    fn intent_quotes_message() {
        assert_eq!(
            wip_intent(Some("half done")),
            "Save work in progress with message: \"half done\". Decide whether to commit or stash."
        );
    }

    #[test]
    fn empty_plan_is_a_successful_no_op() {
        let repo = TestRepo::new().expect("repo");
        let git = Git::new(repo.path());
        let advisor = ScriptedAdvisor::new().respond(r#"{"explanation":"Nothing to save."}"#);
        let runner = ScriptedRunner::new();
        let prompts = PromptEngine::new();
        let guide = Guide::new(&git, &advisor, &runner, &prompts);
        let ledger = Ledger::new(&HermesPaths::new(repo.path()), 10);

        let outcome = run_wip(&guide, &ledger, None).expect("wip");
        assert!(outcome.completed_plan().is_none());
        assert!(runner.calls().is_empty());
        let entry = &ledger.load().command_history[0];
        assert!(entry.success);
        assert_eq!(entry.git_commands_run, 0);
    }
}
