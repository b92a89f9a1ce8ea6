//! Filesystem helpers used when staging artifacts into layers.

use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::Path;

use toml::{Table, Value};
use walkdir::WalkDir;

use crate::util::hash::{HashError, hash_file};

/// Error while listing a directory tree.
#[derive(Debug, thiserror::Error)]
pub enum ListingError {
  #[error("failed to resolve {path}: {source}")]
  Canonicalize {
    path: String,
    #[source]
    source: io::Error,
  },

  #[error("failed to walk directory: {0}")]
  Walk(#[from] walkdir::Error),

  #[error(transparent)]
  Hash(#[from] HashError),
}

/// One entry of a directory listing.
///
/// Directories carry no digest. Paths are absolute with symlinks resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
  pub path: String,
  pub mode: String,
  pub sha256: Option<String>,
}

impl FileEntry {
  pub fn to_table(&self) -> Table {
    let mut table = Table::new();
    table.insert("path".to_string(), Value::String(self.path.clone()));
    table.insert("mode".to_string(), Value::String(self.mode.clone()));
    if let Some(sha256) = &self.sha256 {
      table.insert("sha256".to_string(), Value::String(sha256.clone()));
    }
    table
  }
}

/// Copy everything from `source` into a new file at `destination`.
///
/// Parent directories are created as needed and an existing file is truncated.
pub fn copy_file(source: &mut impl Read, destination: &Path) -> io::Result<u64> {
  if let Some(parent) = destination.parent() {
    fs::create_dir_all(parent)?;
  }

  let mut out = File::create(destination)?;
  let copied = io::copy(source, &mut out)?;
  out.flush()?;
  Ok(copied)
}

/// List every file and directory below `root`, sorted by path.
///
/// The root itself is not included.
pub fn file_listing(root: &Path) -> Result<Vec<FileEntry>, ListingError> {
  let root = dunce::canonicalize(root).map_err(|source| ListingError::Canonicalize {
    path: root.display().to_string(),
    source,
  })?;

  let mut entries = Vec::new();

  for entry in WalkDir::new(&root).min_depth(1).sort_by_file_name() {
    let entry = entry?;
    let metadata = entry.metadata()?;

    let sha256 = if metadata.is_file() {
      Some(hash_file(entry.path())?.0)
    } else {
      None
    };

    entries.push(FileEntry {
      path: entry.path().to_string_lossy().to_string(),
      mode: file_mode(&metadata),
      sha256,
    });
  }

  entries.sort_by(|a, b| a.path.cmp(&b.path));
  Ok(entries)
}

#[cfg(unix)]
fn file_mode(metadata: &fs::Metadata) -> String {
  use std::os::unix::fs::PermissionsExt;
  format!("{:04o}", metadata.permissions().mode() & 0o7777)
}

#[cfg(not(unix))]
fn file_mode(metadata: &fs::Metadata) -> String {
  if metadata.permissions().readonly() {
    "0444".to_string()
  } else {
    "0644".to_string()
  }
}
