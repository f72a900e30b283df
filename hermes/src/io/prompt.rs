//! Prompt rendering for the advisory service.

use anyhow::{Context, Result};
use minijinja::{Environment, context};

use crate::core::repo_state::RepoState;

const ANALYSIS_TEMPLATE: &str = include_str!("prompts/analysis.md");
const PLAN_TEMPLATE: &str = include_str!("prompts/plan.md");
const RESOLVE_TEMPLATE: &str = include_str!("prompts/resolve.md");

/// Template engine wrapper around minijinja.
pub struct PromptEngine {
    env: Environment<'static>,
}

impl Default for PromptEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptEngine {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.add_template("analysis", ANALYSIS_TEMPLATE)
            .expect("analysis template should be valid");
        env.add_template("plan", PLAN_TEMPLATE)
            .expect("plan template should be valid");
        env.add_template("resolve", RESOLVE_TEMPLATE)
            .expect("resolve template should be valid");
        Self { env }
    }

    /// Free-form guidance prompt for `plan` and `conflict explain`.
    pub fn render_analysis(
        &self,
        state: &RepoState,
        intent: &str,
        conflicted_files: &[String],
    ) -> Result<String> {
        let template = self.env.get_template("analysis")?;
        let rendered = template.render(context! {
            state => state_json(state)?,
            intent => intent.trim(),
            conflicted_files => conflicted_files,
        })?;
        Ok(rendered)
    }

    /// Structured plan prompt; `extra_fields` names command-specific keys.
    pub fn render_plan(
        &self,
        state: &RepoState,
        intent: &str,
        extra_fields: &[&str],
    ) -> Result<String> {
        let template = self.env.get_template("plan")?;
        let rendered = template.render(context! {
            state => state_json(state)?,
            intent => intent.trim(),
            extra_fields => extra_fields,
        })?;
        Ok(rendered)
    }

    /// Ask for a conflict-free body of one file.
    pub fn render_resolution(&self, path: &str, content: &str) -> Result<String> {
        let template = self.env.get_template("resolve")?;
        let rendered = template.render(context! {
            path => path,
            content => content,
        })?;
        Ok(rendered)
    }
}

fn state_json(state: &RepoState) -> Result<String> {
    serde_json::to_string_pretty(state).context("serialize repository state")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::repo_state::{InProgress, StatusSummary};

    fn state() -> RepoState {
        RepoState::assemble(
            "feature/login".to_string(),
            StatusSummary::default(),
            None,
            InProgress::default(),
            None,
        )
    }

    #[test]
    fn plan_prompt_embeds_state_intent_and_fields() {
        let prompt = PromptEngine::new()
            .render_plan(&state(), "  sync from main ", &["approach", "isRisky"])
            .expect("render");
        assert!(prompt.contains("\"currentBranch\": \"feature/login\""));
        assert!(prompt.contains("User wants to: \"sync from main\""));
        assert!(prompt.contains("commands[], approach, isRisky, risks[]"));
        assert!(prompt.contains("RAW JSON ONLY"));
    }

    #[test]
    fn analysis_prompt_lists_conflicts_only_when_present() {
        let engine = PromptEngine::new();
        let without = engine
            .render_analysis(&state(), "what now", &[])
            .expect("render");
        assert!(!without.contains("<conflicted_files>"));

        let with = engine
            .render_analysis(&state(), "explain", &["src/a.rs".to_string()])
            .expect("render");
        assert!(with.contains("<conflicted_files>"));
        assert!(with.contains("- src/a.rs"));
    }

    #[test]
    fn resolution_prompt_includes_file() {
        let prompt = PromptEngine::new()
            .render_resolution("a.txt", "<<<<<<< HEAD\nx\n=======\ny\n>>>>>>> b\n")
            .expect("render");
        assert!(prompt.contains("`a.txt`"));
        assert!(prompt.contains("<<<<<<< HEAD"));
    }
}
