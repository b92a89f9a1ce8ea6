//! Implementation of the `bs contribute` command.
//!
//! Runs one application contribution against a layers directory and records
//! the resulting plan entry in a TOML plan file.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use toml::Table;
use tracing::debug;

use libbs::consts::{BUILD_ARGUMENTS_KEY, BUILD_COMMAND_KEY};
use libbs::resolve::ExecutableJarDetector;
use libbs::{
  Application, ArtifactResolver, BuildpackPlan, Cache, CommandExecutor, ConfigurationResolver, LayerContributor,
  Layers, Logger,
};

use crate::output::{format_duration, print_stat, print_success};

pub struct ContributeOptions {
  pub application: PathBuf,
  pub layers: PathBuf,
  pub cache: PathBuf,
  pub plan: PathBuf,
  pub command: Option<String>,
  pub executable_jar: bool,
  pub args: Vec<String>,
}

pub fn cmd_contribute(opts: ContributeOptions) -> Result<()> {
  let start = Instant::now();
  let logger = Logger::stdout();

  let configuration = ConfigurationResolver::standard();
  configuration.log(&logger);

  let command = match opts.command {
    Some(command) => command,
    None => configuration.require(BUILD_COMMAND_KEY)?,
  };
  let arguments = if opts.args.is_empty() {
    configuration.resolve_args(BUILD_ARGUMENTS_KEY)
  } else {
    opts.args
  };

  let application_path = dunce::canonicalize(&opts.application)
    .with_context(|| format!("Application directory not found: {}", opts.application.display()))?;

  let mut artifact_resolver = ArtifactResolver::new(configuration);
  if opts.executable_jar {
    artifact_resolver = artifact_resolver.with_detector(ExecutableJarDetector);
  }

  let mut plan = load_plan(&opts.plan)?;

  let mut application = Application {
    application_path,
    arguments,
    artifact_resolver,
    cache: Cache::new(opts.cache.clone()),
    command,
    executor: Box::new(CommandExecutor),
    layer_contributor: LayerContributor::new("Application", Table::new()),
    logger,
    plan: &mut plan,
  };

  let expected = application
    .expected_metadata(Table::new())
    .context("Failed to compute expected layer metadata")?;
  debug!(keys = ?expected.keys().collect::<Vec<_>>(), "expected layer metadata");
  application.layer_contributor.expected_metadata = expected;

  let layer = Layers::new(opts.layers.clone())
    .layer(application.name())
    .context("Failed to open application layer")?;

  let layer = application.contribute(layer).context("Failed to contribute application")?;

  let content = plan.to_toml().context("Failed to serialize plan")?;
  fs::write(&opts.plan, content).with_context(|| format!("Failed to write plan: {}", opts.plan.display()))?;

  print_success("Application contributed");
  print_stat("Layer", &layer.path.display().to_string());
  print_stat("Plan entries", &plan.entries.len().to_string());
  print_stat("Elapsed", &format_duration(start.elapsed()));
  Ok(())
}

fn load_plan(path: &Path) -> Result<BuildpackPlan> {
  if !path.exists() {
    return Ok(BuildpackPlan::default());
  }

  let content = fs::read_to_string(path).with_context(|| format!("Failed to read plan: {}", path.display()))?;
  BuildpackPlan::from_toml(&content).with_context(|| format!("Failed to parse plan: {}", path.display()))
}
