//! Git adapter for hermes commands.
//!
//! Read-only queries used by the state prober, plus the few writes hermes
//! performs itself (staging resolved files). Plan commands do not go through
//! here; they run as literal shell text in [`crate::io::executor`].

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use anyhow::{Context, Result, anyhow};
use tracing::{debug, instrument};

use crate::core::repo_state::parse_ahead_behind;

/// Marker left in the git directory by an in-progress operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Rebase,
    Merge,
    CherryPick,
}

impl Marker {
    /// Paths (relative to the git dir) whose existence signals the marker.
    fn paths(self) -> &'static [&'static str] {
        match self {
            Self::Rebase => &["rebase-merge", "rebase-apply"],
            Self::Merge => &["MERGE_HEAD"],
            Self::CherryPick => &["CHERRY_PICK_HEAD"],
        }
    }
}

/// Wrapper for executing git commands in a working directory.
#[derive(Debug, Clone)]
pub struct Git {
    workdir: PathBuf,
}

impl Git {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
        }
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Return the current branch name (`HEAD` when detached).
    #[instrument(skip_all)]
    pub fn current_branch(&self) -> Result<String> {
        let out = self.run_capture(&["rev-parse", "--abbrev-ref", "HEAD"])?;
        let name = out.trim().to_string();
        debug!(branch = %name, "current branch");
        Ok(name)
    }

    /// Raw `git status --porcelain` output.
    pub fn status_porcelain(&self) -> Result<String> {
        self.run_capture(&["status", "--porcelain"])
    }

    /// Upstream tracking ref of the current branch, `None` when unset.
    pub fn upstream(&self) -> Result<Option<String>> {
        let output = self.run(&["rev-parse", "--abbrev-ref", "@{upstream}"])?;
        if !output.status.success() {
            return Ok(None);
        }
        let name = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok((!name.is_empty()).then_some(name))
    }

    /// Absolute path of the repository's git directory.
    pub fn git_dir(&self) -> Result<PathBuf> {
        let out = self.run_capture(&["rev-parse", "--git-dir"])?;
        let dir = PathBuf::from(out.trim());
        if dir.is_absolute() {
            Ok(dir)
        } else {
            Ok(self.workdir.join(dir))
        }
    }

    /// Whether an in-progress operation marker exists.
    pub fn has_marker(&self, marker: Marker) -> Result<bool> {
        let git_dir = self.git_dir()?;
        Ok(marker.paths().iter().any(|path| git_dir.join(path).exists()))
    }

    /// `(ahead, behind)` of HEAD relative to `upstream`.
    #[instrument(skip_all, fields(upstream))]
    pub fn ahead_behind(&self, upstream: &str) -> Result<(u32, u32)> {
        let range = format!("{upstream}...HEAD");
        let out = self.run_capture(&["rev-list", "--left-right", "--count", &range])?;
        parse_ahead_behind(&out).ok_or_else(|| anyhow!("unexpected rev-list output: '{}'", out.trim()))
    }

    /// Files with unresolved merge conflicts; empty when the query fails.
    pub fn conflicted_files(&self) -> Vec<String> {
        match self.run_capture(&["diff", "--name-only", "--diff-filter=U"]) {
            Ok(out) => out
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect(),
            Err(err) => {
                debug!(err = %err, "conflicted file query failed");
                Vec::new()
            }
        }
    }

    /// Stage a single path.
    pub fn add(&self, path: &str) -> Result<()> {
        self.run_checked(&["add", "--", path])?;
        Ok(())
    }

    /// `git diff --cached --stat` output.
    pub fn staged_stat(&self) -> Result<String> {
        self.run_capture(&["diff", "--cached", "--stat"])
    }

    /// True if there is anything staged for commit.
    pub fn has_staged_changes(&self) -> Result<bool> {
        let out = self.run(&["diff", "--cached", "--name-only"])?;
        Ok(!String::from_utf8_lossy(&out.stdout).trim().is_empty())
    }

    /// Commit staged changes with a message.
    ///
    /// If there are no staged changes, this returns Ok(false) and does nothing.
    #[instrument(skip_all)]
    pub fn commit_staged(&self, message: &str) -> Result<bool> {
        if !self.has_staged_changes()? {
            debug!("no staged changes, skipping commit");
            return Ok(false);
        }
        debug!("committing staged changes");
        self.run_checked(&["commit", "-m", message])?;
        Ok(true)
    }

    fn run_capture(&self, args: &[&str]) -> Result<String> {
        let output = self.run_checked(args)?;
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    fn run_checked(&self, args: &[&str]) -> Result<Output> {
        let output = self.run(args)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!("git {} failed: {}", args.join(" "), stderr.trim()));
        }
        Ok(output)
    }

    fn run(&self, args: &[&str]) -> Result<Output> {
        Command::new("git")
            .args(args)
            .current_dir(&self.workdir)
            .output()
            .with_context(|| format!("spawn git {}", args.join(" ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestRepo;

    #[test]
    fn reads_branch_and_status() {
        let repo = TestRepo::new().expect("repo");
        let git = Git::new(repo.path());
        assert_eq!(git.current_branch().expect("branch"), "main");
        assert!(git.status_porcelain().expect("status").trim().is_empty());

        repo.write_file("notes.txt", "hi").expect("write");
        assert!(git.status_porcelain().expect("status").starts_with("??"));
    }

    #[test]
    fn no_upstream_is_none() {
        let repo = TestRepo::new().expect("repo");
        let git = Git::new(repo.path());
        assert_eq!(git.upstream().expect("upstream"), None);
    }

    #[test]
    fn merge_marker_is_detected() {
        let repo = TestRepo::new().expect("repo");
        let git = Git::new(repo.path());
        assert!(!git.has_marker(Marker::Merge).expect("marker"));
        let git_dir = git.git_dir().expect("git dir");
        std::fs::write(git_dir.join("MERGE_HEAD"), "deadbeef\n").expect("write marker");
        assert!(git.has_marker(Marker::Merge).expect("marker"));
        assert!(!git.has_marker(Marker::CherryPick).expect("marker"));
    }

    #[test]
    fn add_and_commit_staged() {
        let repo = TestRepo::new().expect("repo");
        let git = Git::new(repo.path());
        assert!(!git.commit_staged("nothing").expect("commit"));
        repo.write_file("a.txt", "a").expect("write");
        git.add("a.txt").expect("add");
        assert!(git.staged_stat().expect("stat").contains("a.txt"));
        assert!(git.commit_staged("add a").expect("commit"));
    }
}
