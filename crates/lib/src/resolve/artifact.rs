//! Glob-based artifact resolution.

use std::path::{Path, PathBuf};

use glob::{GlobError, Pattern, PatternError, glob};
use thiserror::Error;
use tracing::debug;

use crate::config::ConfigurationResolver;
use crate::consts::{BUILT_ARTIFACT_KEY, BUILT_MODULE_KEY};
use crate::resolve::detect::{AlwaysInteresting, DetectError, InterestingFileDetector};

#[derive(Debug, Error)]
pub enum ResolveError {
  #[error("invalid artifact pattern {pattern}: {source}")]
  Pattern {
    pattern: String,
    #[source]
    source: PatternError,
  },

  #[error("failed to read artifact candidate: {0}")]
  Glob(#[from] GlobError),

  #[error(transparent)]
  Detect(#[from] DetectError),

  #[error("unable to find single built artifact in {pattern}, candidates: {candidates:?}")]
  NoSingleArtifact { pattern: String, candidates: Vec<PathBuf> },
}

/// Finds the file a build produced inside the application directory.
///
/// The pattern comes from configuration:
/// 1. the artifact key, when set explicitly;
/// 2. otherwise `<module>/target/*.[jw]ar`, when the module key is set;
/// 3. otherwise the artifact key's default.
#[derive(Debug)]
pub struct ArtifactResolver {
  pub artifact_configuration_key: String,
  pub module_configuration_key: String,
  pub configuration_resolver: ConfigurationResolver,
  pub interesting_file_detector: Box<dyn InterestingFileDetector>,
}

impl ArtifactResolver {
  pub fn new(configuration_resolver: ConfigurationResolver) -> Self {
    Self {
      artifact_configuration_key: BUILT_ARTIFACT_KEY.to_string(),
      module_configuration_key: BUILT_MODULE_KEY.to_string(),
      configuration_resolver,
      interesting_file_detector: Box::new(AlwaysInteresting),
    }
  }

  pub fn with_detector(mut self, detector: impl InterestingFileDetector + 'static) -> Self {
    self.interesting_file_detector = Box::new(detector);
    self
  }

  /// The glob, relative to the application directory, that artifacts must match.
  pub fn pattern(&self) -> String {
    let artifact = self.configuration_resolver.resolve(&self.artifact_configuration_key);
    if artifact.explicit {
      return artifact.value.unwrap_or_default();
    }

    let module = self.configuration_resolver.resolve(&self.module_configuration_key);
    if module.explicit {
      if let Some(module) = module.value.filter(|m| !m.is_empty()) {
        return Path::new(&module)
          .join("target")
          .join("*.[jw]ar")
          .to_string_lossy()
          .to_string();
      }
    }

    artifact.value.unwrap_or_default()
  }

  /// Resolve the single artifact below `application_path`.
  ///
  /// Only regular files are candidates. When several match, the detector is
  /// used to narrow them to exactly one.
  pub fn resolve(&self, application_path: &Path) -> Result<PathBuf, ResolveError> {
    let pattern = self.pattern();
    let full = format!(
      "{}/{}",
      Pattern::escape(&application_path.to_string_lossy()),
      pattern
    );

    let matches = glob(&full).map_err(|source| ResolveError::Pattern {
      pattern: pattern.clone(),
      source,
    })?;

    let mut candidates = Vec::new();
    for entry in matches {
      let path = entry?;
      if path.is_file() {
        candidates.push(path);
      }
    }
    candidates.sort();

    debug!(pattern = %pattern, candidates = candidates.len(), "resolved artifact candidates");

    if candidates.len() == 1 {
      return Ok(candidates.remove(0));
    }

    if candidates.len() > 1 {
      let mut interesting = Vec::new();
      for candidate in &candidates {
        if self.interesting_file_detector.interesting(candidate)? {
          interesting.push(candidate.clone());
        }
      }
      if interesting.len() == 1 {
        return Ok(interesting.remove(0));
      }
    }

    Err(ResolveError::NoSingleArtifact { pattern, candidates })
  }
}
