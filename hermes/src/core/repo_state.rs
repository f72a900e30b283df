//! Immutable repository snapshot and the pure parts of building it.

use serde::Serialize;

/// Point-in-time summary of the working repository.
///
/// Built fresh on every invocation and never mutated afterwards. Serialized
/// (camelCase) into advisory prompts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoState {
    pub current_branch: String,
    pub is_clean: bool,
    pub has_uncommitted_changes: bool,
    pub has_untracked_files: bool,
    pub is_in_rebase: bool,
    pub is_in_merge: bool,
    pub is_in_cherry_pick: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_tracking: Option<String>,
    pub ahead: u32,
    pub behind: u32,
}

/// In-progress special operations detected from marker files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InProgress {
    pub rebase: bool,
    pub merge: bool,
    pub cherry_pick: bool,
}

/// Classification of `git status --porcelain` output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusSummary {
    /// Number of non-empty status lines.
    pub entries: usize,
    pub has_uncommitted_changes: bool,
    pub has_untracked_files: bool,
}

impl StatusSummary {
    pub fn is_clean(&self) -> bool {
        self.entries == 0
    }
}

/// Classify porcelain status lines by their two-character prefix.
///
/// An `M` in either column marks uncommitted modifications, `??` marks an
/// untracked file. Blank lines are ignored.
pub fn classify_status(porcelain: &str) -> StatusSummary {
    let mut summary = StatusSummary::default();
    for line in porcelain.lines().filter(|line| !line.trim().is_empty()) {
        summary.entries += 1;
        let mut code = line.chars();
        let index = code.next();
        let worktree = code.next();
        if index == Some('M') || worktree == Some('M') {
            summary.has_uncommitted_changes = true;
        }
        if line.starts_with("??") {
            summary.has_untracked_files = true;
        }
    }
    summary
}

/// Parse `git rev-list --left-right --count <upstream>...HEAD` output.
///
/// The left column counts commits only on the upstream (behind), the right
/// column commits only on HEAD (ahead). Returns `(ahead, behind)`, or `None`
/// when the output does not hold two counts.
pub fn parse_ahead_behind(output: &str) -> Option<(u32, u32)> {
    let mut parts = output.split_whitespace();
    let behind = parts.next()?.parse().ok()?;
    let ahead = parts.next()?.parse().ok()?;
    Some((ahead, behind))
}

impl RepoState {
    /// Assemble a snapshot from independently gathered parts.
    ///
    /// Without a tracking ref the ahead/behind counts are forced to zero.
    pub fn assemble(
        current_branch: String,
        status: StatusSummary,
        remote_tracking: Option<String>,
        in_progress: InProgress,
        ahead_behind: Option<(u32, u32)>,
    ) -> Self {
        let (ahead, behind) = match remote_tracking {
            Some(_) => ahead_behind.unwrap_or((0, 0)),
            None => (0, 0),
        };
        Self {
            current_branch,
            is_clean: status.is_clean(),
            has_uncommitted_changes: status.has_uncommitted_changes,
            has_untracked_files: status.has_untracked_files,
            is_in_rebase: in_progress.rebase,
            is_in_merge: in_progress.merge,
            is_in_cherry_pick: in_progress.cherry_pick,
            remote_tracking,
            ahead,
            behind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_status_is_clean() {
        let summary = classify_status("");
        assert!(summary.is_clean());
        assert!(!summary.has_uncommitted_changes);
        assert!(!summary.has_untracked_files);
    }

    #[test]
    fn blank_lines_do_not_count() {
        assert!(classify_status("\n\n  \n").is_clean());
    }

    #[test]
    fn modified_in_either_column_is_uncommitted() {
        assert!(classify_status(" M src/lib.rs").has_uncommitted_changes);
        assert!(classify_status("M  src/lib.rs").has_uncommitted_changes);
        assert!(classify_status("MM src/lib.rs").has_uncommitted_changes);
    }

    #[test]
    fn added_file_is_dirty_but_not_modified() {
        let summary = classify_status("A  new.rs");
        assert!(!summary.is_clean());
        assert!(!summary.has_uncommitted_changes);
        assert!(!summary.has_untracked_files);
    }

    #[test]
    fn untracked_prefix_is_detected() {
        let summary = classify_status("?? notes.txt\n M a.rs\n");
        assert_eq!(summary.entries, 2);
        assert!(summary.has_untracked_files);
        assert!(summary.has_uncommitted_changes);
    }

    #[test]
    fn clean_iff_no_entries() {
        for porcelain in ["", "?? a", " D gone.rs", "R  a -> b\n?? c"] {
            let summary = classify_status(porcelain);
            assert_eq!(summary.is_clean(), summary.entries == 0, "{porcelain:?}");
        }
    }

    #[test]
    fn parses_left_right_counts() {
        assert_eq!(parse_ahead_behind("3\t5\n"), Some((5, 3)));
        assert_eq!(parse_ahead_behind("garbage"), None);
        assert_eq!(parse_ahead_behind("1"), None);
    }

    #[test]
    fn no_tracking_ref_forces_zero_counts() {
        let state = RepoState::assemble(
            "main".to_string(),
            StatusSummary::default(),
            None,
            InProgress::default(),
            Some((4, 2)),
        );
        assert_eq!(state.remote_tracking, None);
        assert_eq!((state.ahead, state.behind), (0, 0));
    }

    #[test]
    fn tracking_ref_keeps_counts() {
        let state = RepoState::assemble(
            "feature/x".to_string(),
            classify_status(" M a.rs"),
            Some("origin/feature/x".to_string()),
            InProgress {
                rebase: true,
                ..InProgress::default()
            },
            Some((1, 2)),
        );
        assert_eq!((state.ahead, state.behind), (1, 2));
        assert!(state.is_in_rebase);
        assert!(!state.is_clean);
    }

    #[test]
    fn serializes_camel_case_without_missing_tracking() {
        let state = RepoState::assemble(
            "main".to_string(),
            StatusSummary::default(),
            None,
            InProgress::default(),
            None,
        );
        let json = serde_json::to_value(&state).expect("serialize");
        assert_eq!(json["currentBranch"], "main");
        assert_eq!(json["isClean"], true);
        assert!(json.get("remoteTracking").is_none());
    }
}
