/// Name of the staged artifact inside the application layer.
pub const APPLICATION_ZIP: &str = "application.zip";

/// Environment key for the build command.
pub const BUILD_COMMAND_KEY: &str = "BP_BUILD_COMMAND";

/// Environment key for the build arguments, split on whitespace.
pub const BUILD_ARGUMENTS_KEY: &str = "BP_BUILD_ARGUMENTS";

/// Environment key for the built-artifact glob, relative to the application.
pub const BUILT_ARTIFACT_KEY: &str = "BP_BUILT_ARTIFACT";

/// Environment key for the module whose `target/` holds the artifact.
pub const BUILT_MODULE_KEY: &str = "BP_BUILT_MODULE";

pub const DEFAULT_BUILT_ARTIFACT: &str = "target/*.[jw]ar";

/// Plan entry name used for cached build-system dependencies.
pub const BUILD_DEPENDENCIES_ENTRY: &str = "build-dependencies";
