//! Guided commands end to end: scripted advice, real shell, real git.

use std::fs;

use hermes::guided::{Guide, GuidedOutcome};
use hermes::io::config::HermesConfig;
use hermes::io::executor::ShellRunner;
use hermes::io::git::Git;
use hermes::io::ledger::Ledger;
use hermes::io::init::HermesPaths;
use hermes::io::prompt::PromptEngine;
use hermes::io::settings::ExecutorSettings;
use hermes::test_support::{ScriptedAdvisor, TestRepo};
use hermes::{start, sync};

fn ledger_for(dir: &std::path::Path) -> Ledger {
    Ledger::new(&HermesPaths::new(dir), 100)
}

#[test]
fn start_creates_and_switches_branch() {
    let repo = TestRepo::new().expect("repo");
    let git = Git::new(repo.path());
    let advisor = ScriptedAdvisor::new().respond(
        r#"Here is the plan:
```json
{
  "baseBranch": "main",
  "branchName": "feature/add-login",
  "explanation": "Branch from an up-to-date main.",
  "commands": [
    {"command": "git checkout main", "description": "go to main"},
    {"cmd": "git checkout -b feature/add-login"}
  ]
}
```"#,
    );
    let runner = ShellRunner::new(repo.path(), &ExecutorSettings::default());
    let prompts = PromptEngine::new();
    let guide = Guide::new(&git, &advisor, &runner, &prompts);
    let stats_dir = tempfile::tempdir().expect("tempdir");
    let ledger = ledger_for(stats_dir.path());
    let config = HermesConfig::default_for("demo", "main", None);

    let outcome = start::run_start(&guide, Some(&config), &ledger, "Add login").expect("start");
    assert!(matches!(outcome, GuidedOutcome::Executed { commands_run: 2, .. }));
    assert_eq!(git.current_branch().expect("branch"), "feature/add-login");
    assert!(advisor.prompts()[0].contains("Suggested branch name: feature/add-login."));

    let stats = ledger.load();
    assert_eq!(stats.total_git_commands, 2);
    assert_eq!(stats.total_time_saved, 75.0);
}

#[test]
fn sync_stops_at_first_failure_without_rollback() {
    let repo = TestRepo::new().expect("repo");
    let git = Git::new(repo.path());
    let advisor = ScriptedAdvisor::new().respond(
        r#"{"approach":"rebase","commands":[
            "git checkout -b scratch",
            "git rebase origin/does-not-exist",
            "git checkout -b never-created"
        ]}"#,
    );
    let runner = ShellRunner::new(repo.path(), &ExecutorSettings::default());
    let prompts = PromptEngine::new();
    let guide = Guide::new(&git, &advisor, &runner, &prompts);
    let stats_dir = tempfile::tempdir().expect("tempdir");
    let ledger = ledger_for(stats_dir.path());

    let err = sync::run_sync(&guide, None, &ledger, Some("main")).unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("git rebase origin/does-not-exist"), "{message}");

    // The first command stays applied; the third never ran.
    assert_eq!(git.current_branch().expect("branch"), "scratch");
    assert!(
        repo.git(&["rev-parse", "--verify", "--quiet", "refs/heads/never-created"])
            .is_err()
    );

    let entry = &ledger.load().command_history[0];
    assert!(!entry.success);
    assert_eq!(entry.git_commands_run, 1);
    assert_eq!(entry.args, vec!["main".to_string()]);
}

#[test]
fn unparseable_advice_changes_nothing() {
    let repo = TestRepo::new().expect("repo");
    let git = Git::new(repo.path());
    let advisor = ScriptedAdvisor::new().respond("You should probably stash first, then pull.");
    let runner = ShellRunner::new(repo.path(), &ExecutorSettings::default());
    let prompts = PromptEngine::new();
    let guide = Guide::new(&git, &advisor, &runner, &prompts);
    let stats_dir = tempfile::tempdir().expect("tempdir");
    let ledger = ledger_for(stats_dir.path());

    let outcome = hermes::wip::run_wip(&guide, &ledger, Some("halfway")).expect("wip");
    assert!(matches!(outcome, GuidedOutcome::NotExecutable { .. }));
    assert!(git.status_porcelain().expect("status").trim().is_empty());

    let entry = &ledger.load().command_history[0];
    assert!(entry.success);
    assert_eq!(entry.git_commands_run, 0);
    assert_eq!(entry.time_saved, 30.0);
}

#[test]
fn conflict_apply_resolves_real_merge() {
    let repo = TestRepo::new().expect("repo");
    repo.conflicted_merge("shared.txt").expect("merge");
    let git = Git::new(repo.path());
    let advisor = ScriptedAdvisor::new().respond("```\nours and theirs\n```");
    let runner = ShellRunner::new(repo.path(), &ExecutorSettings::default());
    let prompts = PromptEngine::new();
    let guide = Guide::new(&git, &advisor, &runner, &prompts);
    let stats_dir = tempfile::tempdir().expect("tempdir");
    let ledger = ledger_for(stats_dir.path());

    let outcome = hermes::conflict::run_apply(&guide, &ledger, true).expect("apply");
    assert_eq!(outcome.resolved, vec!["shared.txt".to_string()]);
    assert_eq!(
        fs::read_to_string(repo.path().join("shared.txt")).expect("read"),
        "ours and theirs\n"
    );
    assert!(git.conflicted_files().is_empty());
}
