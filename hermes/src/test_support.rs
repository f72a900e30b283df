//! Test-only helpers: temporary git repositories and scripted collaborators.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result, anyhow};
use tempfile::TempDir;

use crate::core::plan::PlanCommand;
use crate::io::advisory::Advisor;
use crate::io::executor::CommandRunner;

/// A throwaway git repository on branch `main` with one initial commit.
pub struct TestRepo {
    dir: TempDir,
    _remote: Option<TempDir>,
}

impl TestRepo {
    pub fn new() -> Result<Self> {
        let dir = tempfile::tempdir().context("create temp repo dir")?;
        let repo = Self { dir, _remote: None };
        repo.git(&["init", "--quiet"])?;
        repo.git(&["symbolic-ref", "HEAD", "refs/heads/main"])?;
        repo.git(&["config", "user.email", "test@example.com"])?;
        repo.git(&["config", "user.name", "test"])?;
        repo.git(&["config", "commit.gpgsign", "false"])?;
        repo.commit_file("README.md", "hi\n", "chore: init")?;
        Ok(repo)
    }

    /// Like [`TestRepo::new`], with `main` pushed to a bare `origin` and
    /// tracking `origin/main`.
    pub fn with_origin() -> Result<Self> {
        let mut repo = Self::new()?;
        let remote = tempfile::tempdir().context("create temp remote dir")?;
        run_git(remote.path(), &["init", "--quiet", "--bare"])?;
        let url = remote.path().to_string_lossy().to_string();
        repo.git(&["remote", "add", "origin", &url])?;
        repo.git(&["push", "--quiet", "-u", "origin", "main"])?;
        repo._remote = Some(remote);
        Ok(repo)
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write_file(&self, name: &str, contents: &str) -> Result<PathBuf> {
        let path = self.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create directory {}", parent.display()))?;
        }
        fs::write(&path, contents).with_context(|| format!("write {}", path.display()))?;
        Ok(path)
    }

    pub fn commit_file(&self, name: &str, contents: &str, message: &str) -> Result<()> {
        self.write_file(name, contents)?;
        self.git(&["add", "--", name])?;
        self.git(&["commit", "--quiet", "-m", message])?;
        Ok(())
    }

    /// Run git in the repository and return trimmed stdout.
    pub fn git(&self, args: &[&str]) -> Result<String> {
        run_git(self.path(), args)
    }

    /// Leave the repository mid-merge with `name` conflicted.
    pub fn conflicted_merge(&self, name: &str) -> Result<()> {
        self.diverge(name)?;
        // Exits non-zero on conflict, as do the rebase and cherry-pick below.
        let _ = self.git(&["merge", "--quiet", "other"]);
        Ok(())
    }

    /// Leave the repository mid-rebase of `main` onto `other`, with `name` conflicted.
    pub fn conflicted_rebase(&self, name: &str) -> Result<()> {
        self.diverge(name)?;
        let _ = self.git(&["rebase", "other"]);
        Ok(())
    }

    /// Leave the repository mid-cherry-pick of `other` onto `main`, with `name` conflicted.
    pub fn conflicted_cherry_pick(&self, name: &str) -> Result<()> {
        self.diverge(name)?;
        let _ = self.git(&["cherry-pick", "other"]);
        Ok(())
    }

    /// Give `main` and a new branch `other` conflicting edits to `name`, on `main`.
    fn diverge(&self, name: &str) -> Result<()> {
        self.commit_file(name, "base\n", "add conflicting file")?;
        self.git(&["checkout", "--quiet", "-b", "other"])?;
        self.commit_file(name, "theirs\n", "theirs")?;
        self.git(&["checkout", "--quiet", "main"])?;
        self.commit_file(name, "ours\n", "ours")
    }
}

fn run_git(dir: &Path, args: &[&str]) -> Result<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .with_context(|| format!("spawn git {}", args.join(" ")))?;
    if !output.status.success() {
        return Err(anyhow!(
            "git {} failed: {}",
            args.join(" "),
            String::from_utf8_lossy(&output.stderr).trim()
        ));
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Advisor that replays canned responses in order and keeps every prompt.
#[derive(Default)]
pub struct ScriptedAdvisor {
    responses: RefCell<VecDeque<Result<String, String>>>,
    prompts: RefCell<Vec<String>>,
}

impl ScriptedAdvisor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, text: &str) -> Self {
        self.responses.borrow_mut().push_back(Ok(text.to_string()));
        self
    }

    pub fn fail(self, message: &str) -> Self {
        self.responses
            .borrow_mut()
            .push_back(Err(message.to_string()));
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.borrow().clone()
    }
}

impl Advisor for ScriptedAdvisor {
    fn ask(&self, prompt: &str) -> Result<String> {
        self.prompts.borrow_mut().push(prompt.to_string());
        match self.responses.borrow_mut().pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(anyhow!(message)),
            None => Err(anyhow!("scripted advisor has no response left")),
        }
    }
}

/// Runner that records commands instead of running them.
///
/// Every command succeeds with empty output unless registered with
/// [`ScriptedRunner::fail_on`] or [`ScriptedRunner::output_for`].
#[derive(Default)]
pub struct ScriptedRunner {
    failures: Vec<(String, String)>,
    outputs: Vec<(String, String)>,
    calls: RefCell<Vec<String>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_on(mut self, command: &str, detail: &str) -> Self {
        self.failures
            .push((command.to_string(), detail.to_string()));
        self
    }

    pub fn output_for(mut self, command: &str, output: &str) -> Self {
        self.outputs
            .push((command.to_string(), output.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, command: &PlanCommand) -> Result<String> {
        let text = command.as_str();
        self.calls.borrow_mut().push(text.to_string());
        if let Some((_, detail)) = self.failures.iter().find(|(cmd, _)| cmd == text) {
            return Err(anyhow!(detail.clone()));
        }
        Ok(self
            .outputs
            .iter()
            .find(|(cmd, _)| cmd == text)
            .map(|(_, out)| out.clone())
            .unwrap_or_default())
    }
}
