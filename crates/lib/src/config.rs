//! Buildpack configuration resolved from the environment.
//!
//! Each known key has a default; a value set in the environment (even an
//! empty one) overrides it.

use std::fmt;

use thiserror::Error;

use crate::consts::{
  BUILD_ARGUMENTS_KEY, BUILD_COMMAND_KEY, BUILT_ARTIFACT_KEY, BUILT_MODULE_KEY, DEFAULT_BUILT_ARTIFACT,
};
use crate::log::Logger;

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("{0} must be set")]
  Missing(String),
}

/// A configuration key understood by the buildpack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildpackConfiguration {
  pub name: String,
  pub default: Option<String>,
  pub description: String,
}

impl BuildpackConfiguration {
  pub fn new(name: &str, default: Option<&str>, description: &str) -> Self {
    Self {
      name: name.to_string(),
      default: default.map(str::to_string),
      description: description.to_string(),
    }
  }
}

/// The value a key resolved to and whether it came from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
  pub value: Option<String>,
  pub explicit: bool,
}

impl fmt::Display for Resolved {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.value.as_deref().unwrap_or(""))
  }
}

#[derive(Debug, Clone, Default)]
pub struct ConfigurationResolver {
  pub configurations: Vec<BuildpackConfiguration>,
}

impl ConfigurationResolver {
  pub fn new(configurations: Vec<BuildpackConfiguration>) -> Self {
    Self { configurations }
  }

  /// Resolver for the keys this crate understands.
  pub fn standard() -> Self {
    Self::new(vec![
      BuildpackConfiguration::new(BUILD_COMMAND_KEY, None, "the command used to build the application"),
      BuildpackConfiguration::new(BUILD_ARGUMENTS_KEY, None, "the arguments passed to the build command"),
      BuildpackConfiguration::new(
        BUILT_ARTIFACT_KEY,
        Some(DEFAULT_BUILT_ARTIFACT),
        "the built application artifact, as a glob relative to the application",
      ),
      BuildpackConfiguration::new(BUILT_MODULE_KEY, None, "the module whose target directory holds the artifact"),
    ])
  }

  /// Resolve `name` from the environment, falling back to its default.
  ///
  /// Unknown keys are still looked up in the environment but have no default.
  pub fn resolve(&self, name: &str) -> Resolved {
    if let Ok(value) = std::env::var(name) {
      return Resolved {
        value: Some(value),
        explicit: true,
      };
    }

    let default = self
      .configurations
      .iter()
      .find(|c| c.name == name)
      .and_then(|c| c.default.clone());

    Resolved {
      value: default,
      explicit: false,
    }
  }

  /// Resolve `name`, failing when it has neither a value nor a default.
  pub fn require(&self, name: &str) -> Result<String, ConfigError> {
    self
      .resolve(name)
      .value
      .ok_or_else(|| ConfigError::Missing(name.to_string()))
  }

  /// Resolve `name` and split it on whitespace.
  pub fn resolve_args(&self, name: &str) -> Vec<String> {
    self
      .resolve(name)
      .value
      .map(|v| v.split_whitespace().map(str::to_string).collect())
      .unwrap_or_default()
  }

  /// Write every known key with its effective value to the build log.
  pub fn log(&self, logger: &Logger) {
    logger.header("Build Configuration:");
    for configuration in &self.configurations {
      let resolved = self.resolve(&configuration.name);
      let source = if resolved.explicit { "" } else { " (default)" };
      logger.body(format!(
        "${:<20} {}{}  {}",
        configuration.name, resolved, source, configuration.description
      ));
    }
  }
}
