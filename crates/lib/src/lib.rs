//! libbs: build-system support for buildpacks.
//!
//! This crate contributes a compiled application into a cached buildpack
//! layer:
//! - `Application`: runs the build, stages the artifact, replaces the source tree
//! - `LayerContributor`: reuses a layer whose metadata still matches
//! - `ArtifactResolver`: finds the artifact a build produced
//! - `Cache`: reports the build tool's cached dependencies in the plan

pub mod application;
pub mod cache;
pub mod config;
pub mod consts;
pub mod execute;
pub mod layer;
pub mod log;
pub mod plan;
pub mod resolve;
pub mod util;

pub use application::{Application, ApplicationError};
pub use cache::Cache;
pub use config::ConfigurationResolver;
pub use execute::{CommandExecutor, Execution, Executor};
pub use layer::{Layer, LayerContributor, LayerTypes, Layers};
pub use log::Logger;
pub use plan::{BuildpackPlan, BuildpackPlanEntry};
pub use resolve::ArtifactResolver;
