//! Build log output.
//!
//! Buildpack output is read by people watching a build scroll past, so it is
//! written to its own sink with a fixed indentation scheme instead of going
//! through `tracing`:
//!
//! ```text
//!   Header
//!     Body line
//!       <command output>
//! ```
//!
//! Every header and body line is mirrored as a `tracing` event so the same
//! progress is visible to whatever subscriber the host installs.

use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use owo_colors::{OwoColorize, Stream};
use tracing::info;

const HEADER_INDENT: &str = "  ";
const BODY_INDENT: &str = "    ";
const OUTPUT_INDENT: &str = "      ";

/// The shared destination of a logger and all of its writers.
///
/// `at_line_start` belongs to the sink rather than to each writer, so output
/// interleaved from several writers is indented once per line.
struct SinkState {
  writer: Box<dyn Write + Send>,
  at_line_start: bool,
}

type Sink = Arc<Mutex<SinkState>>;

/// Writes the human-readable build log. Cheap to clone; clones share a sink.
#[derive(Clone, Default)]
pub struct Logger {
  sink: Option<Sink>,
  /// Stream whose terminal decides styling; `None` writes plain text.
  color: Option<Stream>,
}

impl Logger {
  /// A logger writing plain text to `writer`.
  pub fn new(writer: impl Write + Send + 'static) -> Self {
    Self {
      sink: Some(Arc::new(Mutex::new(SinkState {
        writer: Box::new(writer),
        at_line_start: true,
      }))),
      color: None,
    }
  }

  /// A logger writing to stdout, styled when stdout supports it.
  pub fn stdout() -> Self {
    Self {
      color: Some(Stream::Stdout),
      ..Self::new(io::stdout())
    }
  }

  /// A logger that drops everything written to it.
  pub fn discard() -> Self {
    Self::default()
  }

  pub fn header(&self, message: impl fmt::Display) {
    let message = message.to_string();
    info!(target: "libbs::log", "{}", message);
    let styled = match self.color {
      Some(stream) => message.if_supports_color(stream, |s| s.bold()).to_string(),
      None => message,
    };
    self.write_line(&format!("{}{}", HEADER_INDENT, styled));
  }

  pub fn body(&self, message: impl fmt::Display) {
    let message = message.to_string();
    info!(target: "libbs::log", "{}", message);
    for line in message.lines() {
      self.write_line(&format!("{}{}", BODY_INDENT, line));
    }
  }

  /// A writer for subprocess output, indented one level below body text.
  ///
  /// Writers taken from the same logger may be used together, e.g. one for
  /// stdout and one for stderr.
  pub fn info_writer(&self) -> LogWriter {
    LogWriter {
      sink: self.sink.clone(),
    }
  }

  fn write_line(&self, line: &str) {
    let Some(sink) = &self.sink else {
      return;
    };
    if let Ok(mut state) = sink.lock() {
      if !state.at_line_start {
        let _ = state.writer.write_all(b"\n");
      }
      let _ = writeln!(state.writer, "{}", line);
      state.at_line_start = true;
    }
  }
}

impl fmt::Debug for Logger {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Logger")
      .field("enabled", &self.sink.is_some())
      .field("color", &self.color.is_some())
      .finish()
  }
}

/// Line-indenting writer handed to subprocesses.
pub struct LogWriter {
  sink: Option<Sink>,
}

impl Write for LogWriter {
  fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
    let Some(sink) = &self.sink else {
      return Ok(buf.len());
    };
    let mut state = sink.lock().map_err(|_| io::Error::other("log sink poisoned"))?;

    for chunk in buf.split_inclusive(|b| *b == b'\n') {
      if state.at_line_start {
        state.writer.write_all(OUTPUT_INDENT.as_bytes())?;
      }
      state.writer.write_all(chunk)?;
      state.at_line_start = chunk.ends_with(b"\n");
    }

    Ok(buf.len())
  }

  fn flush(&mut self) -> io::Result<()> {
    match &self.sink {
      Some(sink) => sink
        .lock()
        .map_err(|_| io::Error::other("log sink poisoned"))?
        .writer
        .flush(),
      None => Ok(()),
    }
  }
}
