//! Types shared by executors.

use std::fmt;
use std::io::{self, Write};
use std::path::PathBuf;

use thiserror::Error;

/// A single command invocation.
pub struct Execution {
  pub command: String,
  pub args: Vec<String>,
  /// Working directory for the process.
  pub dir: PathBuf,
  pub stdout: Box<dyn Write + Send>,
  pub stderr: Box<dyn Write + Send>,
}

impl Execution {
  /// An execution whose output is thrown away.
  pub fn new(command: impl Into<String>, args: Vec<String>, dir: impl Into<PathBuf>) -> Self {
    Self {
      command: command.into(),
      args,
      dir: dir.into(),
      stdout: Box::new(io::sink()),
      stderr: Box::new(io::sink()),
    }
  }

  pub fn with_stdout(mut self, stdout: impl Write + Send + 'static) -> Self {
    self.stdout = Box::new(stdout);
    self
  }

  pub fn with_stderr(mut self, stderr: impl Write + Send + 'static) -> Self {
    self.stderr = Box::new(stderr);
    self
  }

  /// The command line as it would be typed, for messages.
  pub fn command_line(&self) -> String {
    if self.args.is_empty() {
      self.command.clone()
    } else {
      format!("{} {}", self.command, self.args.join(" "))
    }
  }
}

impl fmt::Debug for Execution {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Execution")
      .field("command", &self.command)
      .field("args", &self.args)
      .field("dir", &self.dir)
      .finish_non_exhaustive()
  }
}

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum ExecuteError {
  /// The process could not be started.
  #[error("failed to start {cmd}: {source}")]
  Spawn {
    cmd: String,
    #[source]
    source: io::Error,
  },

  /// Command ran and exited unsuccessfully.
  #[error("command failed with exit code {code:?}: {cmd}")]
  CmdFailed { cmd: String, code: Option<i32> },

  /// Output could not be forwarded or the process could not be awaited.
  #[error("io error: {0}")]
  Io(#[from] io::Error),
}

/// Runs executions to completion.
pub trait Executor {
  fn execute(&self, execution: Execution) -> Result<(), ExecuteError>;
}

impl<E: Executor + ?Sized> Executor for Box<E> {
  fn execute(&self, execution: Execution) -> Result<(), ExecuteError> {
    (**self).execute(execution)
  }
}
