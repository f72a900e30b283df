//! Environment errors that abort an invocation before any mutation.

use thiserror::Error;

use crate::core::failure::AdvisoryFailureKind;

#[derive(Debug, Error)]
pub enum EnvError {
    #[error("not a git repository, or git is not installed\nRun hermes inside a git working tree.")]
    NotARepository,

    #[error("advisory CLI `{program}` not found\nInstall it from: https://github.com/github/copilot-cli\nThen authenticate with: copilot login")]
    AdvisoryMissing { program: String },

    #[error("advisory CLI `{program}` is not authenticated\nRun: {program} login")]
    AdvisoryUnauthenticated { program: String },

    #[error(
        "your account is not entitled to use `{program}`\nCheck that your GitHub Copilot subscription is active and that your organization allows the CLI."
    )]
    AdvisoryNotEntitled { program: String },

    #[error("advisory CLI `{program}` timed out after {timeout_secs}s")]
    AdvisoryTimedOut { program: String, timeout_secs: u64 },

    #[error("advisory CLI `{program}` failed: {detail}")]
    AdvisoryFailed { program: String, detail: String },
}

impl EnvError {
    /// Map a classified advisory failure to user-facing guidance.
    pub fn from_advisory_failure(kind: AdvisoryFailureKind, program: &str, detail: &str) -> Self {
        let program = program.to_string();
        match kind {
            AdvisoryFailureKind::Missing => Self::AdvisoryMissing { program },
            AdvisoryFailureKind::Unauthenticated => Self::AdvisoryUnauthenticated { program },
            AdvisoryFailureKind::NotEntitled => Self::AdvisoryNotEntitled { program },
            AdvisoryFailureKind::Unknown => Self::AdvisoryFailed {
                program,
                detail: detail.trim().to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_kind_gets_distinct_guidance() {
        let messages: Vec<String> = [
            AdvisoryFailureKind::Missing,
            AdvisoryFailureKind::Unauthenticated,
            AdvisoryFailureKind::NotEntitled,
            AdvisoryFailureKind::Unknown,
        ]
        .into_iter()
        .map(|kind| EnvError::from_advisory_failure(kind, "copilot", "boom").to_string())
        .collect();

        assert!(messages[0].contains("not found"));
        assert!(messages[1].contains("copilot login"));
        assert!(messages[2].contains("subscription"));
        assert!(messages[3].ends_with("boom"));
    }
}
