//! Buildpack layers.
//!
//! A layer is a directory under the platform's layers root plus a
//! `<name>.toml` file beside it recording its types and metadata. A layer
//! whose stored metadata equals what the current build expects is reused
//! untouched; anything else is rebuilt from scratch.
//!
//! # Submodules
//!
//! - [`contributor`] - skip-if-cached contribution protocol

pub mod contributor;
mod types;

pub use contributor::LayerContributor;
pub use types::*;
