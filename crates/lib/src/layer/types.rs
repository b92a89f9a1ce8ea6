use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use toml::Table;

#[derive(Debug, Error)]
pub enum LayerError {
  #[error("failed to create layer directory {path}: {source}")]
  CreateDir {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to read layer metadata {path}: {source}")]
  ReadMetadata {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to parse layer metadata {path}: {source}")]
  ParseMetadata {
    path: PathBuf,
    #[source]
    source: toml::de::Error,
  },

  #[error("failed to serialize layer metadata: {0}")]
  SerializeMetadata(#[from] toml::ser::Error),

  #[error("failed to write layer metadata {path}: {source}")]
  WriteMetadata {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to reset layer {path}: {source}")]
  Reset {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

/// When a layer is made available.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerTypes {
  /// Visible to subsequent buildpacks during build.
  #[serde(default)]
  pub build: bool,
  /// Restored on the next build.
  #[serde(default)]
  pub cache: bool,
  /// Exported into the application image.
  #[serde(default)]
  pub launch: bool,
}

impl LayerTypes {
  pub fn cache() -> Self {
    Self {
      cache: true,
      ..Self::default()
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
  pub name: String,
  pub path: PathBuf,
  pub metadata: Table,
  pub types: LayerTypes,
}

#[derive(Serialize, Deserialize)]
struct LayerFile {
  #[serde(default)]
  types: LayerTypes,
  #[serde(default)]
  metadata: Table,
}

impl Layer {
  /// Location of the `<name>.toml` file beside the layer directory.
  pub fn metadata_file(&self) -> PathBuf {
    self.path.with_file_name(format!("{}.toml", self.name))
  }

  /// Persist types and metadata.
  pub fn write(&self) -> Result<(), LayerError> {
    let file = self.metadata_file();
    let content = toml::to_string(&LayerFile {
      types: self.types,
      metadata: self.metadata.clone(),
    })?;
    fs::write(&file, content).map_err(|source| LayerError::WriteMetadata { path: file, source })
  }

  /// Drop metadata in memory and on disk.
  pub fn clear_metadata(&mut self) -> Result<(), LayerError> {
    self.metadata = Table::new();
    let file = self.metadata_file();
    match fs::remove_file(&file) {
      Ok(()) => Ok(()),
      Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
      Err(source) => Err(LayerError::WriteMetadata { path: file, source }),
    }
  }

  /// Empty the layer directory, leaving it in place.
  pub fn reset(&self) -> Result<(), LayerError> {
    let reset_err = |source: io::Error| LayerError::Reset {
      path: self.path.clone(),
      source,
    };

    if self.path.exists() {
      fs::remove_dir_all(&self.path).map_err(reset_err)?;
    }
    fs::create_dir_all(&self.path).map_err(reset_err)
  }
}

/// The platform's layers root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layers {
  pub path: PathBuf,
}

impl Layers {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  /// Open the named layer, creating its directory.
  ///
  /// Metadata restored from a previous build is loaded; types are not, since
  /// each build declares them afresh.
  pub fn layer(&self, name: &str) -> Result<Layer, LayerError> {
    let path = self.path.join(name);
    fs::create_dir_all(&path).map_err(|source| LayerError::CreateDir {
      path: path.clone(),
      source,
    })?;

    let mut layer = Layer {
      name: name.to_string(),
      path,
      metadata: Table::new(),
      types: LayerTypes::default(),
    };

    if let Some(stored) = read_layer_file(&layer.metadata_file())? {
      layer.metadata = stored.metadata;
    }

    Ok(layer)
  }
}

fn read_layer_file(path: &Path) -> Result<Option<LayerFile>, LayerError> {
  let content = match fs::read_to_string(path) {
    Ok(content) => content,
    Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
    Err(source) => {
      return Err(LayerError::ReadMetadata {
        path: path.to_path_buf(),
        source,
      });
    }
  };

  toml::from_str(&content)
    .map(Some)
    .map_err(|source| LayerError::ParseMetadata {
      path: path.to_path_buf(),
      source,
    })
}
