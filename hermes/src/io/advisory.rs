//! Advisory service client.
//!
//! The [`Advisor`] trait decouples commands from the actual backend
//! (currently the GitHub Copilot CLI). Tests use scripted advisors that
//! return predetermined text without spawning processes.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;

use anyhow::Result;
use tracing::{debug, info, instrument, warn};

use crate::core::failure::classify_advisory_failure;
use crate::error::EnvError;
use crate::io::process::run_command_with_timeout;
use crate::io::settings::AdvisorySettings;

/// Opaque text-in, text-out planning backend.
pub trait Advisor {
    /// Send `prompt` and return the response text.
    fn ask(&self, prompt: &str) -> Result<String>;
}

/// Advisor that spawns the Copilot CLI in non-interactive mode.
#[derive(Debug, Clone)]
pub struct CopilotAdvisor {
    workdir: PathBuf,
    settings: AdvisorySettings,
}

impl CopilotAdvisor {
    pub fn new(workdir: impl Into<PathBuf>, settings: AdvisorySettings) -> Self {
        Self {
            workdir: workdir.into(),
            settings,
        }
    }

    fn command(&self, prompt: &str) -> Command {
        let mut cmd = Command::new(&self.settings.program);
        cmd.arg("-p")
            .arg(prompt)
            .arg("--model")
            .arg(&self.settings.model);
        if self.settings.allow_all_tools {
            cmd.arg("--allow-all-tools");
        }
        // Silent mode prints only the response, without banner or usage stats.
        cmd.arg("-s").current_dir(&self.workdir);
        cmd
    }
}

impl Advisor for CopilotAdvisor {
    #[instrument(skip_all, fields(program = %self.settings.program, model = %self.settings.model))]
    fn ask(&self, prompt: &str) -> Result<String> {
        info!(prompt_bytes = prompt.len(), "asking advisory service");
        let program = self.settings.program.as_str();
        let timeout = Duration::from_secs(self.settings.timeout_secs);

        let output = match run_command_with_timeout(
            self.command(prompt),
            timeout,
            self.settings.output_limit_bytes,
        ) {
            Ok(output) => output,
            Err(err) if is_not_found(&err) => {
                return Err(EnvError::AdvisoryMissing {
                    program: program.to_string(),
                }
                .into());
            }
            Err(err) => return Err(err.context(format!("run {program}"))),
        };

        if output.timed_out {
            warn!(timeout_secs = self.settings.timeout_secs, "advisory call timed out");
            return Err(EnvError::AdvisoryTimedOut {
                program: program.to_string(),
                timeout_secs: self.settings.timeout_secs,
            }
            .into());
        }

        let stdout = output.stdout_text();
        let stderr = output.stderr_text();
        if !output.status.success() || stdout.is_empty() {
            let detail = if stderr.is_empty() { &stdout } else { &stderr };
            let kind = classify_advisory_failure(&format!("{stderr}\n{stdout}"));
            warn!(exit_code = ?output.status.code(), ?kind, "advisory call failed");
            return Err(EnvError::from_advisory_failure(kind, program, detail).into());
        }

        debug!(response_bytes = stdout.len(), "advisory response received");
        Ok(stdout)
    }
}

fn is_not_found(err: &anyhow::Error) -> bool {
    err.chain()
        .filter_map(|cause| cause.downcast_ref::<std::io::Error>())
        .any(|io| io.kind() == ErrorKind::NotFound)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;

    fn settings(program: &Path) -> AdvisorySettings {
        AdvisorySettings {
            program: program.display().to_string(),
            timeout_secs: 10,
            ..AdvisorySettings::default()
        }
    }

    fn fake_cli(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("fake-copilot");
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write script");
        let mut perms = fs::metadata(&path).expect("metadata").permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms).expect("chmod");
        path
    }

    #[test]
    fn returns_trimmed_stdout() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cli = fake_cli(temp.path(), "echo '  {\"commands\":[]}  '");
        let advisor = CopilotAdvisor::new(temp.path(), settings(&cli));
        assert_eq!(advisor.ask("hi").expect("ask"), "{\"commands\":[]}");
    }

    #[test]
    fn passes_prompt_model_and_flags() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cli = fake_cli(temp.path(), "echo \"$@\"");
        let advisor = CopilotAdvisor::new(temp.path(), settings(&cli));
        let echoed = advisor.ask("plan it").expect("ask");
        assert_eq!(
            echoed,
            "-p plan it --model claude-sonnet-4.5 --allow-all-tools -s"
        );
    }

    #[test]
    fn missing_program_is_classified() {
        let temp = tempfile::tempdir().expect("tempdir");
        let advisor = CopilotAdvisor::new(temp.path(), settings(&temp.path().join("nope")));
        let err = advisor.ask("hi").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EnvError>(),
            Some(EnvError::AdvisoryMissing { .. })
        ));
    }

    #[test]
    fn authentication_failure_is_classified() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cli = fake_cli(temp.path(), "echo 'Error: not logged in' >&2; exit 1");
        let advisor = CopilotAdvisor::new(temp.path(), settings(&cli));
        let err = advisor.ask("hi").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EnvError>(),
            Some(EnvError::AdvisoryUnauthenticated { .. })
        ));
    }

    #[test]
    fn subscription_failure_is_classified() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cli = fake_cli(
            temp.path(),
            "echo 'No active Copilot subscription found' >&2; exit 1",
        );
        let advisor = CopilotAdvisor::new(temp.path(), settings(&cli));
        let err = advisor.ask("hi").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EnvError>(),
            Some(EnvError::AdvisoryNotEntitled { .. })
        ));
    }

    #[test]
    fn unknown_failure_carries_detail() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cli = fake_cli(temp.path(), "echo 'model overloaded' >&2; exit 2");
        let advisor = CopilotAdvisor::new(temp.path(), settings(&cli));
        let err = advisor.ask("hi").unwrap_err();
        match err.downcast_ref::<EnvError>() {
            Some(EnvError::AdvisoryFailed { detail, .. }) => assert_eq!(detail, "model overloaded"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn timeout_is_reported() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cli = fake_cli(temp.path(), "sleep 5");
        let mut settings = settings(&cli);
        settings.timeout_secs = 1;
        let advisor = CopilotAdvisor::new(temp.path(), settings);
        let err = advisor.ask("hi").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EnvError>(),
            Some(EnvError::AdvisoryTimedOut { timeout_secs: 1, .. })
        ));
    }
}
