//! Branch naming from configured patterns and protected-branch checks.

use std::sync::LazyLock;

use regex::Regex;

static NON_SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("slug regex should compile"));
static MULTI_SLASH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/{2,}").expect("slash regex should compile"));

/// Protected branches assumed when no config is present.
pub const DEFAULT_PROTECTED_BRANCHES: &[&str] = &["main", "master", "production", "staging"];

/// Lowercase `text` and join its alphanumeric runs with `-`.
pub fn slugify(text: &str) -> String {
    let lowered = text.to_lowercase();
    NON_SLUG_RE
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}

/// Fill `{description}` and `{ticket}` in a branch pattern.
///
/// Only the first occurrence of each placeholder is replaced. Repeated
/// slashes collapse to one and a trailing slash is dropped.
pub fn generate_branch_name(pattern: &str, description: &str, ticket: Option<&str>) -> String {
    let name = pattern
        .replacen("{description}", &slugify(description), 1)
        .replacen("{ticket}", ticket.unwrap_or(""), 1);
    let name = MULTI_SLASH_RE.replace_all(&name, "/");
    name.strip_suffix('/').unwrap_or(&name).to_string()
}

/// Whether `branch` is in `protected`, or in the defaults when `None`.
pub fn is_protected_branch(branch: &str, protected: Option<&[String]>) -> bool {
    match protected {
        Some(list) => list.iter().any(|name| name == branch),
        None => DEFAULT_PROTECTED_BRANCHES.contains(&branch),
    }
}
