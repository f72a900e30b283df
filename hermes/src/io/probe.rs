//! Repository state prober.
//!
//! Issues the independent read-only queries concurrently and joins them into
//! one [`RepoState`]. Only the branch query is fatal; every other query
//! degrades to its default on failure.

use std::thread;

use anyhow::Result;
use tracing::{debug, instrument, warn};

use crate::core::repo_state::{InProgress, RepoState, StatusSummary, classify_status};
use crate::error::EnvError;
use crate::io::git::{Git, Marker};

/// Read-only repository queries the prober depends on.
pub trait RepoQueries: Sync {
    fn current_branch(&self) -> Result<String>;
    fn status_porcelain(&self) -> Result<String>;
    fn upstream(&self) -> Result<Option<String>>;
    fn has_marker(&self, marker: Marker) -> Result<bool>;
    fn ahead_behind(&self, upstream: &str) -> Result<(u32, u32)>;
}

impl RepoQueries for Git {
    fn current_branch(&self) -> Result<String> {
        Git::current_branch(self)
    }

    fn status_porcelain(&self) -> Result<String> {
        Git::status_porcelain(self)
    }

    fn upstream(&self) -> Result<Option<String>> {
        Git::upstream(self)
    }

    fn has_marker(&self, marker: Marker) -> Result<bool> {
        Git::has_marker(self, marker)
    }

    fn ahead_behind(&self, upstream: &str) -> Result<(u32, u32)> {
        Git::ahead_behind(self, upstream)
    }
}

/// Take a snapshot of the repository.
///
/// Fails with [`EnvError::NotARepository`] when the current branch cannot be
/// read.
#[instrument(skip_all)]
pub fn probe<Q: RepoQueries>(repo: &Q) -> Result<RepoState> {
    let (branch, status, upstream, in_progress) = thread::scope(|scope| {
        let branch = scope.spawn(|| repo.current_branch());
        let status = scope.spawn(|| status_or_default(repo));
        let upstream = scope.spawn(|| upstream_or_none(repo));
        let rebase = scope.spawn(|| marker_or_false(repo, Marker::Rebase));
        let merge = scope.spawn(|| marker_or_false(repo, Marker::Merge));
        let cherry_pick = scope.spawn(|| marker_or_false(repo, Marker::CherryPick));

        let in_progress = InProgress {
            rebase: rebase.join().unwrap_or(false),
            merge: merge.join().unwrap_or(false),
            cherry_pick: cherry_pick.join().unwrap_or(false),
        };
        (
            branch.join(),
            status.join().unwrap_or_default(),
            upstream.join().unwrap_or(None),
            in_progress,
        )
    });

    let branch = match branch {
        Ok(Ok(name)) => name,
        Ok(Err(err)) => {
            debug!(err = %err, "current branch query failed");
            return Err(EnvError::NotARepository.into());
        }
        Err(_) => return Err(EnvError::NotARepository.into()),
    };

    let ahead_behind = upstream.as_deref().map(|upstream| {
        repo.ahead_behind(upstream).unwrap_or_else(|err| {
            warn!(err = %err, upstream, "ahead/behind query failed");
            (0, 0)
        })
    });

    let state = RepoState::assemble(branch, status, upstream, in_progress, ahead_behind);
    debug!(
        branch = %state.current_branch,
        clean = state.is_clean,
        ahead = state.ahead,
        behind = state.behind,
        "repository probed"
    );
    Ok(state)
}

fn status_or_default<Q: RepoQueries>(repo: &Q) -> StatusSummary {
    match repo.status_porcelain() {
        Ok(out) => classify_status(&out),
        Err(err) => {
            warn!(err = %err, "status query failed");
            StatusSummary::default()
        }
    }
}

fn upstream_or_none<Q: RepoQueries>(repo: &Q) -> Option<String> {
    repo.upstream().unwrap_or_else(|err| {
        debug!(err = %err, "no upstream tracking ref");
        None
    })
}

fn marker_or_false<Q: RepoQueries>(repo: &Q, marker: Marker) -> bool {
    repo.has_marker(marker).unwrap_or_else(|err| {
        debug!(err = %err, ?marker, "marker check failed");
        false
    })
}
