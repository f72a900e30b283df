//! Git assistant that turns advisory plans into supervised git operations.
//!
//! Every guided command follows the same pipeline: the repository is probed
//! into a [`core::repo_state::RepoState`], the state and the user's intent are
//! sent to an advisory service, the response is parsed into a
//! [`core::plan::Plan`], and the plan's commands are executed in order. Each
//! invocation is recorded in the efficiency ledger.
//!
//! - **[`core`]**: Pure, deterministic logic (status classification, plan
//!   parsing, time-saved estimates, ledger summaries). No I/O.
//! - **[`io`]**: Side-effecting adapters (git, subprocesses, the advisory CLI,
//!   the executor, the ledger file, configuration). Behind traits where tests
//!   need to substitute them.
//!
//! Command modules ([`plan`], [`start`], [`sync`], [`wip`], [`worktree`],
//! [`conflict`], [`workflow`], [`stats`], [`init`]) wire the two together.

pub mod conflict;
pub mod core;
pub mod display;
pub mod error;
pub mod exit_codes;
pub mod guided;
pub mod init;
pub mod io;
pub mod logging;
pub mod plan;
pub mod start;
pub mod stats;
pub mod sync;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod wip;
pub mod workflow;
pub mod workspace;
pub mod worktree;
