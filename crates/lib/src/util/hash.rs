//! SHA-256 fingerprints for staged files and cached dependencies.

use std::fs;
use std::io::Read;
use std::path::Path;

use sha2::{Digest, Sha256};

/// A full 64-character SHA-256 digest, lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sha256Digest(pub String);

#[derive(Debug, thiserror::Error)]
#[error("failed to read file {path}: {source}")]
pub struct HashError {
  pub path: String,
  #[source]
  pub source: std::io::Error,
}

/// Hash a file's contents.
///
/// Reads in 8 KiB chunks so large artifacts are never held in memory.
pub fn hash_file(path: &Path) -> Result<Sha256Digest, HashError> {
  let read_err = |source: std::io::Error| HashError {
    path: path.display().to_string(),
    source,
  };

  let mut file = fs::File::open(path).map_err(read_err)?;

  let mut hasher = Sha256::new();
  let mut buffer = [0u8; 8192];

  loop {
    let bytes_read = file.read(&mut buffer).map_err(read_err)?;
    if bytes_read == 0 {
      break;
    }
    hasher.update(&buffer[..bytes_read]);
  }

  Ok(Sha256Digest(hex::encode(hasher.finalize())))
}
