//! The shared probe, ask, parse, execute flow behind the guided commands.
//!
//! `start`, `sync`, `wip`, and `worktree new` differ only in the intent they
//! send and how they present the plan before it runs.

use anyhow::{Context, Result};
use tracing::{debug, instrument, warn};

use crate::core::plan::{Plan, parse_plan};
use crate::core::repo_state::RepoState;
use crate::display;
use crate::io::advisory::Advisor;
use crate::io::executor::{CommandRunner, StepEvent, execute_plan};
use crate::io::probe::{RepoQueries, probe};
use crate::io::prompt::PromptEngine;

/// Collaborators a guided command needs.
pub struct Guide<'a, Q, A, R> {
    pub repo: &'a Q,
    pub advisor: &'a A,
    pub runner: &'a R,
    pub prompts: &'a PromptEngine,
}

impl<'a, Q, A, R> Guide<'a, Q, A, R>
where
    Q: RepoQueries,
    A: Advisor,
    R: CommandRunner,
{
    pub fn new(repo: &'a Q, advisor: &'a A, runner: &'a R, prompts: &'a PromptEngine) -> Self {
        Self {
            repo,
            advisor,
            runner,
            prompts,
        }
    }

    /// Snapshot the repository and ask for free-form guidance.
    pub fn analyze(&self, intent: &str, conflicted_files: &[String]) -> Result<(RepoState, String)> {
        let state = probe(self.repo)?;
        let prompt = self
            .prompts
            .render_analysis(&state, intent, conflicted_files)
            .context("render analysis prompt")?;
        let guidance = self.advisor.ask(&prompt)?;
        Ok((state, guidance))
    }
}

/// What a guided request asks for.
#[derive(Debug, Clone)]
pub struct GuidedRequest<'a> {
    pub intent: String,
    /// Command-specific plan fields to request, e.g. `branchName`.
    pub extra_fields: &'a [&'a str],
}

/// Result of a guided run that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuidedOutcome {
    /// The plan was parsed and every command in it ran.
    Executed { plan: Plan, commands_run: u32 },
    /// The response was shown verbatim instead of being executed.
    NotExecutable { raw: String },
}

impl GuidedOutcome {
    /// The plan, when at least one of its commands ran.
    pub fn completed_plan(&self) -> Option<&Plan> {
        match self {
            Self::Executed { plan, commands_run } if *commands_run > 0 => Some(plan),
            _ => None,
        }
    }
}

/// Probe, ask for a plan, show it, and execute it.
///
/// `present` runs after parsing and before the explanation is printed.
/// `commands_run` is updated even when a command fails, so callers can
/// record partial progress.
#[instrument(skip_all)]
pub fn run_guided<Q, A, R>(
    guide: &Guide<'_, Q, A, R>,
    request: &GuidedRequest<'_>,
    commands_run: &mut u32,
    present: impl FnOnce(&Plan),
) -> Result<GuidedOutcome>
where
    Q: RepoQueries,
    A: Advisor,
    R: CommandRunner,
{
    let state = probe(guide.repo)?;
    let prompt = guide
        .prompts
        .render_plan(&state, &request.intent, request.extra_fields)
        .context("render plan prompt")?;
    let raw = guide.advisor.ask(&prompt)?;

    let parsed = match parse_plan(&raw) {
        Ok(parsed) => parsed,
        Err(failure) => {
            debug!("advisory response is not a plan");
            display::unparsed_response(&failure.raw);
            return Ok(GuidedOutcome::NotExecutable { raw: failure.raw });
        }
    };
    for skipped in &parsed.skipped {
        warn!(descriptor = %skipped, "skipping invalid command descriptor");
        display::warning(&format!("Skipping invalid command: {skipped}"));
    }

    let plan = parsed.plan;
    present(&plan);
    if let Some(explanation) = &plan.explanation {
        display::note(&format!("{explanation}\n"));
    }
    display::cautions(&plan);
    if plan.is_empty() {
        display::warning("No commands to execute.");
        return Ok(GuidedOutcome::Executed {
            plan,
            commands_run: 0,
        });
    }

    let result = execute_plan(guide.runner, &plan, |event| match event {
        StepEvent::Starting(command) => display::step(command.as_str()),
        StepEvent::Finished(_, output) => display::step_output(output),
    });
    *commands_run = result.commands_run;
    let ran = result.into_result()?;
    Ok(GuidedOutcome::Executed {
        plan,
        commands_run: ran,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::git::Git;
    use crate::test_support::{ScriptedAdvisor, ScriptedRunner, TestRepo};

    fn request(intent: &str) -> GuidedRequest<'static> {
        GuidedRequest {
            intent: intent.to_string(),
            extra_fields: &["approach"],
        }
    }

    #[test]
    fn executes_parsed_commands_and_sends_state() {
        let repo = TestRepo::new().expect("repo");
        let git = Git::new(repo.path());
        let advisor = ScriptedAdvisor::new()
            .respond(r#"{"explanation":"x","commands":["git fetch",{"cmd":"git status"}],"approach":"merge"}"#);
        let runner = ScriptedRunner::new();
        let prompts = PromptEngine::new();
        let guide = Guide::new(&git, &advisor, &runner, &prompts);

        let mut count = 0;
        let mut presented = None;
        let outcome = run_guided(&guide, &request("Sync branch"), &mut count, |plan| {
            presented = plan.approach.clone();
        })
        .expect("guided");

        assert_eq!(count, 2);
        assert_eq!(presented.as_deref(), Some("merge"));
        assert!(matches!(outcome, GuidedOutcome::Executed { commands_run: 2, .. }));
        assert_eq!(runner.calls(), vec!["git fetch", "git status"]);
        let prompt = &advisor.prompts()[0];
        assert!(prompt.contains("\"currentBranch\": \"main\""));
        assert!(prompt.contains("Sync branch"));
        assert!(prompt.contains("approach"));
    }

    #[test]
    fn prose_response_is_not_executed() {
        let repo = TestRepo::new().expect("repo");
        let git = Git::new(repo.path());
        let advisor = ScriptedAdvisor::new().respond("Run git pull, probably.");
        let runner = ScriptedRunner::new();
        let prompts = PromptEngine::new();
        let guide = Guide::new(&git, &advisor, &runner, &prompts);

        let mut count = 0;
        let outcome = run_guided(&guide, &request("Sync"), &mut count, |_| {
            panic!("presenter must not run for unparsed responses")
        })
        .expect("guided");
        assert_eq!(
            outcome,
            GuidedOutcome::NotExecutable {
                raw: "Run git pull, probably.".to_string()
            }
        );
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn failure_reports_partial_progress() {
        let repo = TestRepo::new().expect("repo");
        let git = Git::new(repo.path());
        let advisor =
            ScriptedAdvisor::new().respond(r#"{"commands":["git fetch","git rebase x","git push"]}"#);
        let runner = ScriptedRunner::new().fail_on("git rebase x", "no such ref");
        let prompts = PromptEngine::new();
        let guide = Guide::new(&git, &advisor, &runner, &prompts);

        let mut count = 0;
        let err = run_guided(&guide, &request("Sync"), &mut count, |_| {}).unwrap_err();
        assert_eq!(count, 1);
        assert!(format!("{err:#}").contains("no such ref"));
        assert_eq!(runner.calls(), vec!["git fetch", "git rebase x"]);
    }

    #[test]
    fn outside_a_repository_fails_before_asking() {
        let temp = tempfile::tempdir().expect("tempdir");
        let git = Git::new(temp.path());
        let advisor = ScriptedAdvisor::new().respond("{}");
        let runner = ScriptedRunner::new();
        let prompts = PromptEngine::new();
        let guide = Guide::new(&git, &advisor, &runner, &prompts);

        let mut count = 0;
        let err = run_guided(&guide, &request("Sync"), &mut count, |_| {}).unwrap_err();
        assert!(err.downcast_ref::<crate::error::EnvError>().is_some());
        assert!(advisor.prompts().is_empty());
    }
}
