//! Locating the artifact a build produced.

pub mod artifact;
pub mod detect;

pub use artifact::{ArtifactResolver, ResolveError};
pub use detect::{AlwaysInteresting, DetectError, ExecutableJarDetector, InterestingFileDetector};
