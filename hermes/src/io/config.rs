//! Repository configuration stored at `.hermes/config.json`.
//!
//! The file is meant to be committed and shared by a team. Hermes only reads
//! it; `hermes init` is the one place that writes it.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use jsonschema::Draft;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::core::branch::DEFAULT_PROTECTED_BRANCHES;

const CONFIG_SCHEMA: &str = include_str!("schemas/config.schema.json");
pub const CONFIG_VERSION: &str = "0.1.0";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HermesConfig {
    pub version: String,
    pub project: ProjectConfig,
    pub branches: BranchPatterns,
    #[serde(default)]
    pub workflows: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub integrations: Integrations,
    #[serde(default)]
    pub preferences: Preferences,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    pub name: String,
    pub main_branch: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub develop_branch: Option<String>,
    pub protected_branches: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BranchPatterns {
    pub feature_pattern: String,
    pub bugfix_pattern: String,
    pub hotfix_pattern: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum TicketSystem {
    Linear,
    Jira,
    Github,
    Gitlab,
    None,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum CiSystem {
    GithubActions,
    GitlabCi,
    Jenkins,
    None,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Integrations {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tickets: Option<TicketSystem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ci: Option<CiSystem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Preferences {
    pub auto_backup: bool,
    pub learning_mode: bool,
    pub default_editor: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            auto_backup: true,
            learning_mode: false,
            default_editor: "vim".to_string(),
        }
    }
}

impl HermesConfig {
    /// Defaults used by `hermes init`.
    ///
    /// The main branch is `master` only when that is the current branch.
    pub fn default_for(project_name: &str, current_branch: &str, editor: Option<&str>) -> Self {
        let main_branch = if current_branch == "master" {
            "master"
        } else {
            "main"
        };
        let mut workflows = BTreeMap::new();
        workflows.insert(
            "feature".to_string(),
            vec!["start", "sync", "test", "pr"]
                .into_iter()
                .map(str::to_string)
                .collect(),
        );
        workflows.insert(
            "hotfix".to_string(),
            vec!["start", "sync", "test", "fast-track"]
                .into_iter()
                .map(str::to_string)
                .collect(),
        );
        Self {
            version: CONFIG_VERSION.to_string(),
            project: ProjectConfig {
                name: project_name.to_string(),
                main_branch: main_branch.to_string(),
                develop_branch: None,
                protected_branches: DEFAULT_PROTECTED_BRANCHES
                    .iter()
                    .map(|name| name.to_string())
                    .collect(),
            },
            branches: BranchPatterns {
                feature_pattern: "feature/{description}".to_string(),
                bugfix_pattern: "bugfix/{description}".to_string(),
                hotfix_pattern: "hotfix/{description}".to_string(),
            },
            workflows,
            integrations: Integrations {
                tickets: Some(TicketSystem::None),
                ci: Some(CiSystem::None),
            },
            preferences: Preferences {
                default_editor: editor.unwrap_or("vim").to_string(),
                ..Preferences::default()
            },
        }
    }
}

/// Read and validate a config file, failing on any problem.
pub fn read_config(path: &Path) -> Result<HermesConfig> {
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let value: Value =
        serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))?;
    validate_schema(&value)?;
    let config: HermesConfig = serde_json::from_value(value)
        .with_context(|| format!("parse {} as hermes config", path.display()))?;
    Ok(config)
}

/// Load the config if present.
///
/// A missing file is `None`. An unreadable or invalid file is also `None`,
/// with a warning, so commands fall back to built-in defaults.
pub fn load_config(path: &Path) -> Option<HermesConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "no hermes config");
        return None;
    }
    match read_config(path) {
        Ok(config) => Some(config),
        Err(err) => {
            warn!(path = %path.display(), err = %format!("{err:#}"), "could not load hermes config");
            None
        }
    }
}

/// Serialize `config` to pretty-printed JSON with trailing newline.
pub fn write_config(path: &Path, config: &HermesConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let mut payload = serde_json::to_string_pretty(config).context("serialize config")?;
    payload.push('\n');
    fs::write(path, payload).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

/// Validate a config document against the embedded JSON Schema (Draft 2020-12).
fn validate_schema(instance: &Value) -> Result<()> {
    let schema: Value = serde_json::from_str(CONFIG_SCHEMA).context("parse config schema")?;
    let compiled = jsonschema::options()
        .with_draft(Draft::Draft202012)
        .build(&schema)
        .context("compile config schema")?;
    let messages: Vec<String> = compiled
        .iter_errors(instance)
        .map(|err| err.to_string())
        .collect();
    if !messages.is_empty() {
        bail!("config validation failed:\n- {}", messages.join("\n- "));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_passes_schema_and_round_trips() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join(".hermes/config.json");
        let config = HermesConfig::default_for("demo", "main", Some("nano"));
        write_config(&path, &config).expect("write");
        assert_eq!(read_config(&path).expect("read"), config);
    }

    #[test]
    fn master_checkout_keeps_master_as_main_branch() {
        let config = HermesConfig::default_for("demo", "master", None);
        assert_eq!(config.project.main_branch, "master");
        let config = HermesConfig::default_for("demo", "feature/x", None);
        assert_eq!(config.project.main_branch, "main");
    }

    #[test]
    fn writes_camel_case_keys() {
        let config = HermesConfig::default_for("demo", "main", None);
        let json = serde_json::to_value(&config).expect("serialize");
        assert_eq!(json["project"]["mainBranch"], "main");
        assert_eq!(json["branches"]["featurePattern"], "feature/{description}");
        assert_eq!(json["integrations"]["ci"], "none");
        assert_eq!(json["preferences"]["autoBackup"], true);
    }

    #[test]
    fn schema_violation_is_reported() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("config.json");
        fs::write(
            &path,
            r#"{"version":"0.1.0","project":{"name":"x","mainBranch":"main","protectedBranches":[]},"branches":{"featurePattern":"f/{description}","bugfixPattern":"b","hotfixPattern":"h"},"integrations":{"tickets":"trello"}}"#,
        )
        .expect("write");
        let err = read_config(&path).unwrap_err();
        assert!(format!("{err:#}").contains("config validation failed"));
        assert_eq!(load_config(&path), None);
    }

    #[test]
    fn missing_and_corrupt_files_load_as_none() {
        let temp = tempfile::tempdir().expect("tempdir");
        assert_eq!(load_config(&temp.path().join("missing.json")), None);
        let path = temp.path().join("config.json");
        fs::write(&path, "{ not json").expect("write");
        assert_eq!(load_config(&path), None);
    }

    #[test]
    fn minimal_config_fills_optional_sections() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("config.json");
        fs::write(
            &path,
            r#"{"version":"0.1.0","project":{"name":"x","mainBranch":"trunk","protectedBranches":["trunk"]},"branches":{"featurePattern":"feat/{description}","bugfixPattern":"fix/{description}","hotfixPattern":"hot/{description}"}}"#,
        )
        .expect("write");
        let config = read_config(&path).expect("read");
        assert!(config.workflows.is_empty());
        assert_eq!(config.integrations, Integrations::default());
        assert!(config.preferences.auto_backup);
    }
}
