//! Skip-if-cached layer contribution.

use toml::Table;
use tracing::{debug, info};

use crate::layer::types::{Layer, LayerError, LayerTypes};
use crate::log::Logger;

/// Contributes a layer only when its stored metadata differs from what the
/// current build expects.
#[derive(Debug, Clone)]
pub struct LayerContributor {
  /// Display name used in the build log.
  pub name: String,
  pub expected_metadata: Table,
  pub logger: Logger,
}

impl LayerContributor {
  pub fn new(name: impl Into<String>, expected_metadata: Table) -> Self {
    Self {
      name: name.into(),
      expected_metadata,
      logger: Logger::discard(),
    }
  }

  /// Reuse `layer` if its metadata matches, otherwise rebuild it with `f`.
  ///
  /// A layer without a metadata file never matches, even when nothing is
  /// expected.
  ///
  /// On a rebuild the layer directory is emptied before `f` runs and the
  /// expected metadata is recorded only after `f` succeeds, so a failed
  /// contribution is never mistaken for a cache hit. In both cases `types`
  /// are applied and persisted.
  pub fn contribute<F, E>(&self, mut layer: Layer, f: F, types: LayerTypes) -> Result<Layer, E>
  where
    F: FnOnce(Layer) -> Result<Layer, E>,
    E: From<LayerError>,
  {
    if layer.metadata_file().exists() && layer.metadata == self.expected_metadata {
      info!(layer = %layer.name, path = ?layer.path, "reusing cached layer");
      self
        .logger
        .header(format!("{}: Reusing cached layer {}", self.name, layer.path.display()));
      layer.types = types;
      layer.write()?;
      return Ok(layer);
    }

    info!(layer = %layer.name, path = ?layer.path, "contributing to layer");
    debug!(layer = %layer.name, stored = ?layer.metadata, "layer metadata changed");
    self.logger.header(format!("{}: Contributing to layer", self.name));

    // Forget the old metadata first so an interrupted rebuild is not reused.
    layer.clear_metadata()?;
    layer.reset()?;

    let mut layer = f(layer)?;

    layer.metadata = self.expected_metadata.clone();
    layer.types = types;
    layer.write()?;
    Ok(layer)
  }
}
