//! Process execution.
//!
//! The contributor never spawns processes directly; it hands an [`Execution`]
//! to an [`Executor`] so callers and tests can substitute their own.

pub mod command;
mod types;

pub use command::CommandExecutor;
pub use types::*;
