//! Tie-breaking between several artifact candidates.

use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

use thiserror::Error;
use zip::ZipArchive;
use zip::result::ZipError;

const MANIFEST_PATH: &str = "META-INF/MANIFEST.MF";

#[derive(Debug, Error)]
pub enum DetectError {
  #[error("failed to read {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

/// Decides whether a glob match is worth considering as the artifact.
pub trait InterestingFileDetector: fmt::Debug {
  fn interesting(&self, path: &Path) -> Result<bool, DetectError>;
}

/// Treats every candidate as interesting, so ties are never broken.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysInteresting;

impl InterestingFileDetector for AlwaysInteresting {
  fn interesting(&self, _path: &Path) -> Result<bool, DetectError> {
    Ok(true)
  }
}

/// Prefers deployable archives: any `.war`, or a `.jar` whose manifest
/// declares a `Main-Class`.
///
/// Build tools commonly leave `-sources.jar` and `-javadoc.jar` next to the
/// real artifact; neither has a main class.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecutableJarDetector;

impl InterestingFileDetector for ExecutableJarDetector {
  fn interesting(&self, path: &Path) -> Result<bool, DetectError> {
    match path.extension().and_then(|e| e.to_str()) {
      Some("war") => Ok(true),
      Some("jar") => has_main_class(path),
      _ => Ok(false),
    }
  }
}

fn has_main_class(path: &Path) -> Result<bool, DetectError> {
  let read_err = |source: io::Error| DetectError::Read {
    path: path.to_path_buf(),
    source,
  };

  let file = File::open(path).map_err(read_err)?;
  let Ok(mut archive) = ZipArchive::new(BufReader::new(file)) else {
    return Ok(false);
  };

  let mut manifest = match archive.by_name(MANIFEST_PATH) {
    Ok(entry) => entry,
    Err(ZipError::FileNotFound) => return Ok(false),
    Err(ZipError::Io(source)) => return Err(read_err(source)),
    Err(_) => return Ok(false),
  };

  let mut content = String::new();
  manifest.read_to_string(&mut content).map_err(read_err)?;

  Ok(content.lines().any(|line| {
    line
      .split_once(':')
      .is_some_and(|(key, value)| key.trim() == "Main-Class" && !value.trim().is_empty())
  }))
}
