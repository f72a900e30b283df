//! `hermes plan`: analysis only, nothing is executed.

use anyhow::Result;
use tracing::info;

use crate::display;
use crate::guided::Guide;
use crate::io::advisory::Advisor;
use crate::io::executor::CommandRunner;
use crate::io::ledger::Ledger;
use crate::io::probe::RepoQueries;

/// Print advisory guidance for `intent` alongside the current state.
///
/// Returns the guidance text.
pub fn run_plan<Q, A, R>(guide: &Guide<'_, Q, A, R>, ledger: &Ledger, intent: &str) -> Result<String>
where
    Q: RepoQueries,
    A: Advisor,
    R: CommandRunner,
{
    ledger.track("plan", &[intent.to_string()], |_| {
        display::heading("Analyzing repository state...");
        let (state, guidance) = guide.analyze(intent, &[])?;
        display::guidance(&guidance, &state);
        display::note("\nNo changes have been made. Review the plan above.");
        info!(branch = %state.current_branch, "plan shown");
        Ok(guidance)
    })
}
