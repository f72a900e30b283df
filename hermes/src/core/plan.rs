//! Interpretation of advisory responses into executable plans.
//!
//! Responses may be strict JSON, JSON inside a fenced code block or
//! surrounded by commentary, or plain prose. Anything that does not yield a
//! JSON object is a [`ParseFailure`], which callers present verbatim instead
//! of executing.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use serde_json::{Map, Value};

static FENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"```[A-Za-z0-9_+-]*\s*([\s\S]*?)\s*```").expect("fence regex should compile")
});

/// Literal command text, ready to hand to the shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanCommand(String);

impl PlanCommand {
    /// Wrap command text; blank text is not a command.
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlanCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Accepted shapes of one element of `commands`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CommandDescriptor {
    Text(String),
    Object {
        command: Option<String>,
        cmd: Option<String>,
    },
}

impl CommandDescriptor {
    fn into_command(self) -> Option<PlanCommand> {
        match self {
            Self::Text(text) => PlanCommand::new(text),
            Self::Object { command, cmd } => command
                .and_then(PlanCommand::new)
                .or_else(|| cmd.and_then(PlanCommand::new)),
        }
    }
}

/// Canonical plan produced from one advisory response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    pub explanation: Option<String>,
    pub commands: Vec<PlanCommand>,
    pub base_branch: Option<String>,
    pub branch_name: Option<String>,
    pub approach: Option<String>,
    pub is_risky: bool,
    pub risk_explanation: Option<String>,
    pub worktree_path: Option<String>,
    pub risks: Vec<String>,
    pub safety_notes: Vec<String>,
}

impl Plan {
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// A plan plus the command descriptors that had to be dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPlan {
    pub plan: Plan,
    /// Compact JSON of each dropped descriptor, in response order.
    pub skipped: Vec<String>,
}

/// The response could not be understood as a plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFailure {
    /// The response exactly as received.
    pub raw: String,
}

/// Return the interior of the first fenced code block, or the trimmed text.
pub fn strip_code_fence(text: &str) -> &str {
    match FENCE_RE.captures(text).and_then(|caps| caps.get(1)) {
        Some(inner) => inner.as_str().trim(),
        None => text.trim(),
    }
}

/// Parse an advisory response into a [`Plan`].
///
/// Fenced blocks are tried in order, then the whole text. A JSON object
/// without a usable `commands` array is a valid, empty plan.
pub fn parse_plan(raw: &str) -> Result<ParsedPlan, ParseFailure> {
    let object = FENCE_RE
        .captures_iter(raw)
        .filter_map(|caps| caps.get(1))
        .find_map(|block| find_object(block.as_str()))
        .or_else(|| find_object(raw.trim()))
        .ok_or_else(|| ParseFailure {
            raw: raw.to_string(),
        })?;
    Ok(plan_from_object(&object))
}

fn find_object(text: &str) -> Option<Map<String, Value>> {
    parse_object(text).or_else(|| embedded_object(text).and_then(parse_object))
}

fn parse_object(text: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// Slice from the first `{` to the last `}` for JSON wrapped in prose.
fn embedded_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

fn plan_from_object(object: &Map<String, Value>) -> ParsedPlan {
    let mut commands = Vec::new();
    let mut skipped = Vec::new();
    match object.get("commands") {
        None | Some(Value::Null) => {}
        Some(Value::Array(items)) => {
            for item in items {
                // Derived struct variants also accept sequences; only strings
                // and objects are descriptors.
                let resolved = match item {
                    Value::String(_) | Value::Object(_) => {
                        serde_json::from_value::<CommandDescriptor>(item.clone())
                            .ok()
                            .and_then(CommandDescriptor::into_command)
                    }
                    _ => None,
                };
                match resolved {
                    Some(command) => commands.push(command),
                    None => skipped.push(item.to_string()),
                }
            }
        }
        Some(other) => skipped.push(other.to_string()),
    }

    let plan = Plan {
        explanation: text_field(object, "explanation"),
        commands,
        base_branch: text_field(object, "baseBranch"),
        branch_name: text_field(object, "branchName"),
        approach: text_field(object, "approach"),
        is_risky: object
            .get("isRisky")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        risk_explanation: text_field(object, "riskExplanation"),
        worktree_path: text_field(object, "worktreePath"),
        risks: text_list(object, "risks"),
        safety_notes: text_list(object, "safetyNotes"),
    };
    ParsedPlan { plan, skipped }
}

fn text_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    object
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn text_list(object: &Map<String, Value>, key: &str) -> Vec<String> {
    object
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
