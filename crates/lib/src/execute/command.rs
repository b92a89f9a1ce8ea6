//! Executor backed by `std::process::Command`.

use std::io::{self, Read, Write};
use std::process::{Command, Stdio};
use std::thread;

use tracing::{debug, info};

use crate::execute::types::{ExecuteError, Execution, Executor};

/// Runs executions as child processes, blocking until they exit.
///
/// The child inherits the caller's environment. Stdout and stderr are
/// streamed to the execution's sinks while the process runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandExecutor;

impl Executor for CommandExecutor {
  fn execute(&self, execution: Execution) -> Result<(), ExecuteError> {
    let cmd = execution.command_line();
    info!(cmd = %cmd, dir = ?execution.dir, "executing command");

    let Execution {
      command,
      args,
      dir,
      mut stdout,
      mut stderr,
    } = execution;

    let mut child = Command::new(&command)
      .args(&args)
      .current_dir(&dir)
      .stdin(Stdio::null())
      .stdout(Stdio::piped())
      .stderr(Stdio::piped())
      .spawn()
      .map_err(|source| ExecuteError::Spawn {
        cmd: cmd.clone(),
        source,
      })?;

    let child_stdout = child.stdout.take();
    let child_stderr = child.stderr.take();

    let forwarded = thread::scope(|scope| {
      let out = scope.spawn(move || forward(child_stdout, &mut stdout));
      let err = forward(child_stderr, &mut stderr);
      let out = out.join().unwrap_or_else(|_| Err(io::Error::other("stdout forwarder panicked")));
      out.and(err)
    });

    let status = child.wait()?;
    forwarded?;

    if !status.success() {
      debug!(cmd = %cmd, code = ?status.code(), "command failed");
      return Err(ExecuteError::CmdFailed {
        cmd,
        code: status.code(),
      });
    }

    Ok(())
  }
}

fn forward(source: Option<impl Read>, sink: &mut dyn Write) -> io::Result<()> {
  if let Some(mut source) = source {
    io::copy(&mut source, sink)?;
  }
  sink.flush()
}
