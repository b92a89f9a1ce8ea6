//! Contributes a built application into a cached layer.
//!
//! A contribution runs the build tool in the application directory, stages
//! the artifact it produced as `application.zip` in a cache layer, then
//! replaces the application's source tree with the artifact's contents. When
//! the layer's metadata still matches, the build is skipped and the staged
//! artifact from the previous build is expanded instead.

use std::fs::{self, File};
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use thiserror::Error;
use toml::{Table, Value};
use tracing::{debug, info};

use crate::cache::{Cache, CacheError};
use crate::consts::APPLICATION_ZIP;
use crate::execute::{ExecuteError, Execution, Executor};
use crate::layer::{Layer, LayerContributor, LayerError, LayerTypes};
use crate::log::Logger;
use crate::plan::BuildpackPlan;
use crate::resolve::{ArtifactResolver, ResolveError};
use crate::util::archive::{ArchiveError, extract_zip};
use crate::util::fs::{ListingError, copy_file, file_listing};

#[derive(Debug, Error)]
pub enum ApplicationError {
  #[error("error running build: {0}")]
  Build(#[source] ExecuteError),

  #[error("unable to resolve artifact: {0}")]
  ResolveArtifact(#[source] ResolveError),

  #[error("unable to open {path}: {source}")]
  Open {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("unable to copy {from} to {to}: {source}")]
  Copy {
    from: PathBuf,
    to: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("unable to contribute application layer: {0}")]
  Layer(#[from] LayerError),

  #[error("unable to generate build dependencies: {0}")]
  PlanEntry(#[source] CacheError),

  #[error("unable to list children of {path}: {source}")]
  ListChildren {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("unable to remove {path}: {source}")]
  Remove {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("unable to extract {path}: {source}")]
  Extract {
    path: PathBuf,
    #[source]
    source: ArchiveError,
  },

  #[error("unable to list files in {path}: {source}")]
  Listing {
    path: PathBuf,
    #[source]
    source: ListingError,
  },
}

/// One build of one application. Constructed per build and dropped after
/// [`Application::contribute`] returns.
pub struct Application<'a> {
  pub application_path: PathBuf,
  pub arguments: Vec<String>,
  pub artifact_resolver: ArtifactResolver,
  pub cache: Cache,
  pub command: String,
  pub executor: Box<dyn Executor>,
  pub layer_contributor: LayerContributor,
  pub logger: Logger,
  pub plan: &'a mut BuildpackPlan,
}

impl Application<'_> {
  pub fn name(&self) -> &'static str {
    "application"
  }

  /// Build (or reuse) the application layer and expand it over the source tree.
  ///
  /// The source tree is only removed once the staged artifact has been opened
  /// from the layer, and the plan entry is only appended once the artifact has
  /// been expanded.
  pub fn contribute(&mut self, layer: Layer) -> Result<Layer, ApplicationError> {
    self.layer_contributor.logger = self.logger.clone();

    let layer = self
      .layer_contributor
      .contribute(layer, |layer| self.build(layer), LayerTypes::cache())?;

    let mut entry = self.cache.as_plan_entry().map_err(ApplicationError::PlanEntry)?;
    entry
      .metadata
      .insert("layer".to_string(), Value::String(self.cache.name().to_string()));

    let file = layer.path.join(APPLICATION_ZIP);
    let staged = File::open(&file).map_err(|source| ApplicationError::Open {
      path: file.clone(),
      source,
    })?;

    self.remove_source()?;

    extract_zip(BufReader::new(staged), &self.application_path, 0)
      .map_err(|source| ApplicationError::Extract { path: file, source })?;

    self.plan.push(entry);

    info!(application = ?self.application_path, layer = %layer.name, "application contributed");
    Ok(layer)
  }

  /// Metadata describing the inputs of a build, for use as the layer
  /// contributor's expected metadata.
  ///
  /// Keys in `additional` are kept unless they collide with a computed key.
  pub fn expected_metadata(&self, additional: Table) -> Result<Table, ApplicationError> {
    let mut metadata = additional;

    let files = file_listing(&self.application_path).map_err(|source| ApplicationError::Listing {
      path: self.application_path.clone(),
      source,
    })?;
    metadata.insert(
      "files".to_string(),
      Value::Array(files.iter().map(|f| Value::Table(f.to_table())).collect()),
    );

    metadata.insert(
      "arguments".to_string(),
      Value::Array(self.arguments.iter().cloned().map(Value::String).collect()),
    );

    metadata.insert(
      "artifact-pattern".to_string(),
      Value::String(self.artifact_resolver.pattern()),
    );

    if let Some(version) = self.java_version() {
      metadata.insert("java-version".to_string(), Value::String(version));
    }

    Ok(metadata)
  }

  fn build(&self, layer: Layer) -> Result<Layer, ApplicationError> {
    self.logger.body(format!(
      "Executing {} {}",
      command_name(&self.command),
      self.arguments.join(" ")
    ));

    let execution = Execution {
      command: self.command.clone(),
      args: self.arguments.clone(),
      dir: self.application_path.clone(),
      stdout: Box::new(self.logger.info_writer()),
      stderr: Box::new(self.logger.info_writer()),
    };
    self.executor.execute(execution).map_err(ApplicationError::Build)?;

    let artifact = self
      .artifact_resolver
      .resolve(&self.application_path)
      .map_err(ApplicationError::ResolveArtifact)?;

    let mut input = File::open(&artifact).map_err(|source| ApplicationError::Open {
      path: artifact.clone(),
      source,
    })?;

    let file = layer.path.join(APPLICATION_ZIP);
    let copied = copy_file(&mut input, &file).map_err(|source| ApplicationError::Copy {
      from: artifact.clone(),
      to: file.clone(),
      source,
    })?;

    info!(artifact = ?artifact, bytes = copied, "staged application artifact");
    Ok(layer)
  }

  fn remove_source(&self) -> Result<(), ApplicationError> {
    self.logger.header("Removing source code");

    let list_err = |source: io::Error| ApplicationError::ListChildren {
      path: self.application_path.clone(),
      source,
    };

    for entry in fs::read_dir(&self.application_path).map_err(list_err)? {
      let entry = entry.map_err(list_err)?;
      let path = entry.path();

      let removed = match entry.file_type() {
        Ok(file_type) if file_type.is_dir() => fs::remove_dir_all(&path),
        Ok(_) => fs::remove_file(&path),
        Err(e) => Err(e),
      };
      removed.map_err(|source| ApplicationError::Remove { path, source })?;
    }

    Ok(())
  }

  /// The version reported by `javac -version`, if a compiler can be run.
  fn java_version(&self) -> Option<String> {
    let output = CapturedOutput::default();
    let execution = Execution {
      command: "javac".to_string(),
      args: vec!["-version".to_string()],
      dir: self.application_path.clone(),
      stdout: Box::new(output.clone()),
      stderr: Box::new(output.clone()),
    };

    if let Err(e) = self.executor.execute(execution) {
      debug!(error = %e, "unable to determine java version");
      return None;
    }

    parse_javac_version(&output.text())
  }
}

fn command_name(command: &str) -> String {
  Path::new(command)
    .file_name()
    .map(|n| n.to_string_lossy().to_string())
    .unwrap_or_else(|| command.to_string())
}

/// `javac 17.0.2` prints the version after the program name.
fn parse_javac_version(output: &str) -> Option<String> {
  output.lines().find_map(|line| {
    let mut words = line.split_whitespace();
    match (words.next(), words.next()) {
      (Some("javac"), Some(version)) => Some(version.to_string()),
      _ => None,
    }
  })
}

#[derive(Clone, Default)]
struct CapturedOutput(Arc<Mutex<Vec<u8>>>);

impl CapturedOutput {
  fn text(&self) -> String {
    self
      .0
      .lock()
      .map(|b| String::from_utf8_lossy(&b).to_string())
      .unwrap_or_default()
  }
}

impl Write for CapturedOutput {
  fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
    self
      .0
      .lock()
      .map_err(|_| io::Error::other("output buffer poisoned"))?
      .extend_from_slice(buf);
    Ok(buf.len())
  }

  fn flush(&mut self) -> io::Result<()> {
    Ok(())
  }
}
