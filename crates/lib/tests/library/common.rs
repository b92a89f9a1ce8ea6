//! Shared test helpers for library integration tests.

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use libbs::config::BuildpackConfiguration;
use libbs::execute::ExecuteError;
use libbs::resolve::AlwaysInteresting;
use libbs::{ArtifactResolver, ConfigurationResolver, Execution, Executor};
use tempfile::TempDir;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

pub const ARTIFACT_KEY: &str = "LIBBS_IT_BUILT_ARTIFACT";
pub const MODULE_KEY: &str = "LIBBS_IT_BUILT_MODULE";

/// Build an in-memory zip with the given `(name, content)` entries.
pub fn zip_bytes(entries: &[(&str, &str)]) -> Vec<u8> {
  let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
  for (name, content) in entries {
    writer.start_file(*name, SimpleFileOptions::default()).unwrap();
    writer.write_all(content.as_bytes()).unwrap();
  }
  writer.finish().unwrap().into_inner()
}

/// An executable-looking jar that expands to a single `fixture-marker` file.
pub fn stub_application_jar() -> Vec<u8> {
  zip_bytes(&[("fixture-marker", "")])
}

/// Resolver whose only configuration is the artifact key with `default`.
pub fn resolver(default: &str) -> ArtifactResolver {
  ArtifactResolver {
    artifact_configuration_key: ARTIFACT_KEY.to_string(),
    module_configuration_key: MODULE_KEY.to_string(),
    configuration_resolver: ConfigurationResolver::new(vec![BuildpackConfiguration::new(
      ARTIFACT_KEY,
      Some(default),
      "",
    )]),
    interesting_file_detector: Box::new(AlwaysInteresting),
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedExecution {
  pub command: String,
  pub args: Vec<String>,
  pub dir: PathBuf,
}

/// Records every execution and optionally drops files into the working
/// directory, standing in for a build tool.
#[derive(Clone, Default)]
pub struct RecordingExecutor {
  pub calls: Arc<Mutex<Vec<RecordedExecution>>>,
  pub produces: Vec<(String, Vec<u8>)>,
  pub output: Option<String>,
}

impl RecordingExecutor {
  pub fn producing(path: &str, content: Vec<u8>) -> Self {
    Self {
      produces: vec![(path.to_string(), content)],
      ..Self::default()
    }
  }

  pub fn calls(&self) -> Vec<RecordedExecution> {
    self.calls.lock().unwrap().clone()
  }
}

impl Executor for RecordingExecutor {
  fn execute(&self, mut execution: Execution) -> Result<(), ExecuteError> {
    self.calls.lock().unwrap().push(RecordedExecution {
      command: execution.command.clone(),
      args: execution.args.clone(),
      dir: execution.dir.clone(),
    });

    for (path, content) in &self.produces {
      let target = execution.dir.join(path);
      if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)?;
      }
      std::fs::write(target, content)?;
    }

    if let Some(output) = &self.output {
      execution.stdout.write_all(output.as_bytes())?;
    }

    Ok(())
  }
}

/// Isolated application, layers and cache directories.
pub struct TestEnv {
  pub temp: TempDir,
}

impl TestEnv {
  pub fn new() -> Self {
    let temp = TempDir::new().unwrap();
    for dir in ["application", "layers", "cache"] {
      std::fs::create_dir(temp.path().join(dir)).unwrap();
    }
    Self { temp }
  }

  pub fn application(&self) -> PathBuf {
    self.temp.path().join("application")
  }

  pub fn layers(&self) -> PathBuf {
    self.temp.path().join("layers")
  }

  pub fn cache(&self) -> PathBuf {
    self.temp.path().join("cache")
  }

  /// Write a file relative to the application directory.
  pub fn write_source(&self, relative_path: &str, content: impl AsRef<[u8]>) {
    write(&self.application().join(relative_path), content);
  }
}

pub fn write(path: &Path, content: impl AsRef<[u8]>) {
  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent).unwrap();
  }
  std::fs::write(path, content).unwrap();
}
