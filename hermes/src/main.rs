use std::path::Path;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use hermes::guided::Guide;
use hermes::workspace::Workspace;
use hermes::{
    conflict, exit_codes, init, logging, plan, start, stats, sync, wip, workflow, worktree,
};

#[derive(Parser)]
#[command(
    name = "hermes",
    version,
    about = "Plan and run safe git operations with an AI assistant"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create `.hermes/` configuration for this repository.
    Init {
        /// Overwrite an existing configuration.
        #[arg(short, long)]
        force: bool,
    },
    /// Analyze the repository and propose a plan without changing anything.
    Plan {
        /// What you want to achieve.
        intent: String,
    },
    /// Start a new piece of work on a fresh branch.
    Start {
        /// Description of the task.
        task: String,
    },
    /// Bring the current branch up to date.
    Sync {
        /// Branch to sync from (default: the configured main branch).
        #[arg(long)]
        from: Option<String>,
    },
    /// Save work in progress by committing or stashing.
    Wip {
        /// Message for the saved work.
        #[arg(short, long)]
        message: Option<String>,
    },
    /// Manage git worktrees.
    #[command(subcommand)]
    Worktree(WorktreeCommand),
    /// Understand and resolve merge conflicts.
    #[command(subcommand)]
    Conflict(ConflictCommand),
    /// Run predefined workflow shortcuts.
    #[command(subcommand)]
    Workflow(WorkflowCommand),
    /// Show efficiency statistics.
    Stats {
        /// Number of days to include.
        #[arg(short, long)]
        days: Option<u32>,
        /// Include the whole history.
        #[arg(long)]
        all_time: bool,
    },
}

#[derive(Subcommand)]
enum WorktreeCommand {
    /// Create a new worktree for a task.
    New {
        /// Description of the task.
        task: String,
    },
}

#[derive(Subcommand)]
enum ConflictCommand {
    /// Explain the current merge conflicts.
    Explain,
    /// Propose resolutions for every conflicted file.
    Apply {
        /// Write and stage the proposed resolutions.
        #[arg(long)]
        accept: bool,
    },
}

#[derive(Subcommand)]
enum WorkflowCommand {
    /// Fetch, rebase on the main branch, and push.
    PrReady,
    /// Fetch all remotes and show status.
    DailySync,
    /// Stage all changes and optionally commit them.
    QuickCommit {
        /// Commit with this message.
        #[arg(short, long)]
        message: Option<String>,
    },
    /// List available workflows.
    List,
}

fn main() {
    logging::init();
    if let Err(err) = run() {
        eprintln!("Error: {err:#}");
        std::process::exit(exit_codes::FAILURE);
    }
    std::process::exit(exit_codes::OK);
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let root = std::env::current_dir().context("resolve current directory")?;
    dispatch(&root, cli.command)
}

fn dispatch(root: &Path, command: Command) -> Result<()> {
    let ws = Workspace::open(root)?;
    let advisor = ws.advisor();
    let runner = ws.runner();
    let guide = Guide::new(&ws.git, &advisor, &runner, &ws.prompts);
    let config = ws.config.as_ref();

    match command {
        Command::Init { force } => {
            init::run_init(root, force)?;
        }
        Command::Plan { intent } => {
            plan::run_plan(&guide, &ws.ledger, &intent)?;
        }
        Command::Start { task } => {
            start::run_start(&guide, config, &ws.ledger, &task)?;
        }
        Command::Sync { from } => {
            sync::run_sync(&guide, config, &ws.ledger, from.as_deref())?;
        }
        Command::Wip { message } => {
            wip::run_wip(&guide, &ws.ledger, message.as_deref())?;
        }
        Command::Worktree(WorktreeCommand::New { task }) => {
            worktree::run_worktree_new(&guide, &ws.ledger, &task)?;
        }
        Command::Conflict(ConflictCommand::Explain) => {
            conflict::run_explain(&guide, &ws.ledger)?;
        }
        Command::Conflict(ConflictCommand::Apply { accept }) => {
            conflict::run_apply(&guide, &ws.ledger, accept)?;
        }
        Command::Workflow(WorkflowCommand::PrReady) => {
            workflow::run_pr_ready(&runner, config, &ws.ledger)?;
        }
        Command::Workflow(WorkflowCommand::DailySync) => {
            workflow::run_daily_sync(&runner, &ws.git, &ws.ledger)?;
        }
        Command::Workflow(WorkflowCommand::QuickCommit { message }) => {
            workflow::run_quick_commit(&runner, &ws.git, &ws.ledger, message.as_deref())?;
        }
        Command::Workflow(WorkflowCommand::List) => {
            print!("{}", workflow::workflow_list(config));
        }
        Command::Stats { days, all_time } => {
            stats::run_stats(&ws.ledger, days, all_time);
        }
    }
    Ok(())
}
