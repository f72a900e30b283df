//! User-facing console output.
//!
//! Everything here writes plain text to stdout. Diagnostics belong in
//! `tracing`, not here.

use crate::core::plan::Plan;
use crate::core::repo_state::RepoState;

pub fn heading(text: &str) {
    println!("{text}\n");
}

/// Echo a command just before it runs.
pub fn step(command: &str) {
    println!("  $ {command}");
}

/// Indented command output shown after a step.
pub fn step_output(output: &str) {
    for line in output.lines() {
        println!("    {line}");
    }
}

pub fn success(text: &str) {
    println!("\nDone: {text}");
}

pub fn warning(text: &str) {
    println!("Warning: {text}");
}

pub fn note(text: &str) {
    println!("{text}");
}

/// Show a response that could not be turned into a plan.
pub fn unparsed_response(raw: &str) {
    println!("Suggested plan:\n");
    println!("{raw}");
    println!("\nCould not auto-execute. Please review the plan above.");
}

/// Free-form guidance followed by the state it was based on.
pub fn guidance(text: &str, state: &RepoState) {
    println!("Recommended plan:\n");
    println!("{text}\n");
    print!("{}", state_summary(state));
}

/// Print the plan's risks and safety notes, if it has any.
pub fn cautions(plan: &Plan) {
    if let Some(text) = cautions_summary(plan) {
        print!("{text}");
    }
}

pub fn cautions_summary(plan: &Plan) -> Option<String> {
    if plan.risks.is_empty() && plan.safety_notes.is_empty() {
        return None;
    }
    let mut out = String::new();
    if !plan.risks.is_empty() {
        out.push_str("Risks:\n");
        for risk in &plan.risks {
            out.push_str(&format!("  - {risk}\n"));
        }
    }
    if !plan.safety_notes.is_empty() {
        out.push_str("Safety notes:\n");
        for note in &plan.safety_notes {
            out.push_str(&format!("  - {note}\n"));
        }
    }
    out.push('\n');
    Some(out)
}

pub fn conflict_explanation(text: &str, files: &[String]) {
    println!("Conflicts detected:\n");
    for file in files {
        println!("  - {file}");
    }
    println!("\nAnalysis:\n");
    println!("{text}");
}

/// Multi-line summary of a snapshot.
pub fn state_summary(state: &RepoState) -> String {
    let mut out = String::from("Current state:\n");
    out.push_str(&format!("  Branch: {}\n", state.current_branch));
    let status = if state.is_clean {
        "Clean"
    } else {
        "Uncommitted changes"
    };
    out.push_str(&format!("  Status: {status}\n"));
    if let Some(remote) = &state.remote_tracking {
        out.push_str(&format!("  Remote: {remote}\n"));
        if state.ahead > 0 {
            out.push_str(&format!("  {} ahead\n", state.ahead));
        }
        if state.behind > 0 {
            out.push_str(&format!("  {} behind\n", state.behind));
        }
    }
    if state.is_in_rebase {
        out.push_str("  In rebase\n");
    }
    if state.is_in_merge {
        out.push_str("  In merge\n");
    }
    if state.is_in_cherry_pick {
        out.push_str("  In cherry-pick\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::repo_state::{InProgress, StatusSummary};

    #[test]
    fn summary_lists_tracking_and_in_progress_flags() {
        let state = RepoState::assemble(
            "feature/x".to_string(),
            StatusSummary {
                entries: 1,
                has_uncommitted_changes: true,
                has_untracked_files: false,
            },
            Some("origin/feature/x".to_string()),
            InProgress {
                rebase: true,
                ..InProgress::default()
            },
            Some((2, 0)),
        );
        let text = state_summary(&state);
        assert!(text.contains("Branch: feature/x"));
        assert!(text.contains("Uncommitted changes"));
        assert!(text.contains("Remote: origin/feature/x"));
        assert!(text.contains("2 ahead"));
        assert!(!text.contains("behind"));
        assert!(text.contains("In rebase"));
    }

    #[test]
    fn cautions_list_risks_and_safety_notes() {
        let plan = Plan {
            risks: vec!["rewrites published history".to_string()],
            safety_notes: vec!["uses --force-with-lease".to_string()],
            ..Plan::default()
        };
        let text = cautions_summary(&plan).expect("cautions");
        assert!(text.contains("Risks:\n  - rewrites published history\n"));
        assert!(text.contains("Safety notes:\n  - uses --force-with-lease\n"));
        assert!(cautions_summary(&Plan::default()).is_none());
    }

    #[test]
    fn summary_without_remote_omits_counts() {
        let state = RepoState::assemble(
            "main".to_string(),
            StatusSummary::default(),
            None,
            InProgress::default(),
            None,
        );
        let text = state_summary(&state);
        assert!(text.contains("Status: Clean"));
        assert!(!text.contains("Remote"));
    }
}
