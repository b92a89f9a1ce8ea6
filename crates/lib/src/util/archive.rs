//! Zip extraction.

use std::fs::{self, File};
use std::io::{self, Read, Seek};
use std::path::{Path, PathBuf};

use tracing::debug;
use zip::ZipArchive;
use zip::result::ZipError;

#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
  #[error("failed to open zip: {0}")]
  Open(#[source] ZipError),

  #[error("failed to read zip entry {index}: {source}")]
  Entry {
    index: usize,
    #[source]
    source: ZipError,
  },

  #[error("zip entry escapes destination: {0}")]
  UnsafeEntry(String),

  #[error("failed to write {path}: {source}")]
  Write {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

/// Extract a zip stream into `dest`.
///
/// The first `strip_components` path components of every entry are dropped;
/// entries that become empty are skipped. Unix permissions stored in the
/// archive are restored.
pub fn extract_zip<R: Read + Seek>(reader: R, dest: &Path, strip_components: usize) -> Result<(), ArchiveError> {
  let mut archive = ZipArchive::new(reader).map_err(ArchiveError::Open)?;

  let write_err = |path: &Path| {
    let path = path.to_path_buf();
    move |source: io::Error| ArchiveError::Write { path, source }
  };

  fs::create_dir_all(dest).map_err(write_err(dest))?;

  for index in 0..archive.len() {
    let mut entry = archive
      .by_index(index)
      .map_err(|source| ArchiveError::Entry { index, source })?;

    let Some(path) = entry.enclosed_name() else {
      return Err(ArchiveError::UnsafeEntry(entry.name().to_string()));
    };

    let stripped: PathBuf = path.components().skip(strip_components).collect();
    if stripped.as_os_str().is_empty() {
      continue;
    }

    let dest_path = dest.join(&stripped);

    if entry.is_dir() {
      fs::create_dir_all(&dest_path).map_err(write_err(&dest_path))?;
      continue;
    }

    if let Some(parent) = dest_path.parent() {
      fs::create_dir_all(parent).map_err(write_err(parent))?;
    }

    let mut outfile = File::create(&dest_path).map_err(write_err(&dest_path))?;
    io::copy(&mut entry, &mut outfile).map_err(write_err(&dest_path))?;

    #[cfg(unix)]
    {
      use std::os::unix::fs::PermissionsExt;
      if let Some(mode) = entry.unix_mode() {
        fs::set_permissions(&dest_path, fs::Permissions::from_mode(mode & 0o7777))
          .map_err(write_err(&dest_path))?;
      }
    }
  }

  debug!(dest = ?dest, entries = archive.len(), "extracted zip");
  Ok(())
}
