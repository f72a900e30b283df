//! Command executor for parsed plans.
//!
//! Runs plan commands strictly in order, one at a time, and stops at the
//! first failure. Commands that already ran are not rolled back.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, info, instrument, warn};

use crate::core::plan::{Plan, PlanCommand};
use crate::io::process::{run_command_with_timeout, shell_command};
use crate::io::settings::ExecutorSettings;

/// Abstraction over how a literal command is run.
pub trait CommandRunner {
    /// Run one command and return its output payload.
    fn run(&self, command: &PlanCommand) -> Result<String>;
}

/// Runner that executes commands through the platform shell in the
/// repository working directory.
#[derive(Debug, Clone)]
pub struct ShellRunner {
    workdir: PathBuf,
    timeout: Duration,
    output_limit_bytes: usize,
}

impl ShellRunner {
    pub fn new(workdir: impl Into<PathBuf>, settings: &ExecutorSettings) -> Self {
        Self {
            workdir: workdir.into(),
            timeout: Duration::from_secs(settings.command_timeout_secs),
            output_limit_bytes: settings.output_limit_bytes,
        }
    }
}

impl CommandRunner for ShellRunner {
    #[instrument(skip_all, fields(command = %command))]
    fn run(&self, command: &PlanCommand) -> Result<String> {
        let mut cmd = shell_command(command.as_str());
        cmd.current_dir(&self.workdir);
        let output = run_command_with_timeout(cmd, self.timeout, self.output_limit_bytes)
            .with_context(|| format!("run `{command}`"))?;
        if output.timed_out {
            return Err(anyhow!("timed out after {:?}", self.timeout));
        }
        if !output.status.success() {
            let stderr = output.stderr_text();
            let detail = if stderr.is_empty() {
                output.stdout_text()
            } else {
                stderr
            };
            let code = output
                .status
                .code()
                .map_or_else(|| "none (killed by signal)".to_string(), |code| code.to_string());
            return Err(anyhow!("exit code {code}: {detail}"));
        }
        Ok(output.payload())
    }
}

/// The command that stopped execution and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandFailure {
    pub command: PlanCommand,
    /// Error text from the underlying tool.
    pub detail: String,
}

/// Outcome of running a plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    /// Commands that completed successfully.
    pub commands_run: u32,
    pub all_succeeded: bool,
    pub failure: Option<CommandFailure>,
}

impl ExecutionResult {
    /// Convert a failed execution into an error for propagation.
    pub fn into_result(self) -> Result<u32> {
        match self.failure {
            None => Ok(self.commands_run),
            Some(failure) => Err(anyhow!(
                "command `{}` failed after {} successful command(s): {}",
                failure.command,
                self.commands_run,
                failure.detail
            )),
        }
    }
}

/// Events surfaced while a plan runs.
#[derive(Debug, Clone, Copy)]
pub enum StepEvent<'a> {
    /// About to run a command.
    Starting(&'a PlanCommand),
    /// A command finished; carries its output payload.
    Finished(&'a PlanCommand, &'a str),
}

/// Run `plan.commands` in order, reporting each step before it runs.
///
/// Stops at the first failing command; later commands are never attempted.
#[instrument(skip_all, fields(commands = plan.commands.len()))]
pub fn execute_plan<R: CommandRunner>(
    runner: &R,
    plan: &Plan,
    mut on_step: impl FnMut(StepEvent<'_>),
) -> ExecutionResult {
    let mut commands_run = 0;
    for command in &plan.commands {
        on_step(StepEvent::Starting(command));
        match runner.run(command) {
            Ok(payload) => {
                commands_run += 1;
                debug!(%command, "command succeeded");
                on_step(StepEvent::Finished(command, &payload));
            }
            Err(err) => {
                warn!(%command, err = %format!("{err:#}"), "command failed, stopping plan");
                return ExecutionResult {
                    commands_run,
                    all_succeeded: false,
                    failure: Some(CommandFailure {
                        command: command.clone(),
                        detail: format!("{err:#}"),
                    }),
                };
            }
        }
    }
    info!(commands_run, "plan executed");
    ExecutionResult {
        commands_run,
        all_succeeded: true,
        failure: None,
    }
}
