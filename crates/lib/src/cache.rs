//! The build system's dependency cache.
//!
//! Build tools such as Maven or Gradle download dependencies into a local
//! repository that buildpacks keep in a cache layer. After a build the jars
//! found there are reported in the buildpack plan.

use std::path::{Path, PathBuf};

use thiserror::Error;
use toml::{Table, Value};
use walkdir::WalkDir;

use crate::consts::BUILD_DEPENDENCIES_ENTRY;
use crate::plan::BuildpackPlanEntry;
use crate::util::hash::{HashError, hash_file};

#[derive(Debug, Error)]
pub enum CacheError {
  #[error("failed to walk {path}: {source}")]
  Walk {
    path: PathBuf,
    #[source]
    source: walkdir::Error,
  },

  #[error("cache {0} is not a directory")]
  NotADirectory(PathBuf),

  #[error(transparent)]
  Hash(#[from] HashError),
}

/// A dependency jar found in the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MavenJar {
  pub name: String,
  pub version: String,
  pub sha256: String,
}

impl MavenJar {
  /// Describe the jar at `path`, deriving name and version from its file name.
  ///
  /// `commons-io-2.11.0.jar` becomes `commons-io` / `2.11.0`. Names without a
  /// `-<digit>` boundary get the version `unknown`.
  pub fn from_path(path: &Path) -> Result<Self, HashError> {
    let stem = path
      .file_stem()
      .map(|s| s.to_string_lossy().to_string())
      .unwrap_or_default();
    let (name, version) = split_name_version(&stem);

    Ok(Self {
      name,
      version,
      sha256: hash_file(path)?.0,
    })
  }

  pub fn to_table(&self) -> Table {
    let mut table = Table::new();
    table.insert("name".to_string(), Value::String(self.name.clone()));
    table.insert("version".to_string(), Value::String(self.version.clone()));
    table.insert("sha256".to_string(), Value::String(self.sha256.clone()));
    table
  }
}

fn split_name_version(stem: &str) -> (String, String) {
  let boundary = stem
    .char_indices()
    .find(|(i, c)| *c == '-' && stem[i + 1..].starts_with(|n: char| n.is_ascii_digit()))
    .map(|(i, _)| i);

  match boundary {
    Some(i) if i > 0 => (stem[..i].to_string(), stem[i + 1..].to_string()),
    _ => (stem.to_string(), "unknown".to_string()),
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cache {
  pub path: PathBuf,
}

impl Cache {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  pub fn name(&self) -> &'static str {
    "cache"
  }

  /// Every jar in the cache, ordered by path.
  ///
  /// A cache that was never populated has no dependencies.
  pub fn dependencies(&self) -> Result<Vec<MavenJar>, CacheError> {
    if !self.path.exists() {
      return Ok(Vec::new());
    }
    if !self.path.is_dir() {
      return Err(CacheError::NotADirectory(self.path.clone()));
    }

    let mut dependencies = Vec::new();
    for entry in WalkDir::new(&self.path).sort_by_file_name() {
      let entry = entry.map_err(|source| CacheError::Walk {
        path: self.path.clone(),
        source,
      })?;

      let is_jar = entry.path().extension().is_some_and(|e| e == "jar");
      if entry.file_type().is_file() && is_jar {
        dependencies.push(MavenJar::from_path(entry.path())?);
      }
    }

    Ok(dependencies)
  }

  /// A `build-dependencies` plan entry listing the cached jars.
  pub fn as_plan_entry(&self) -> Result<BuildpackPlanEntry, CacheError> {
    let dependencies = self
      .dependencies()?
      .iter()
      .map(|jar| Value::Table(jar.to_table()))
      .collect();

    let mut entry = BuildpackPlanEntry::new(BUILD_DEPENDENCIES_ENTRY);
    entry
      .metadata
      .insert("dependencies".to_string(), Value::Array(dependencies));
    Ok(entry)
  }
}
