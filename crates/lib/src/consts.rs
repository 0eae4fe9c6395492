pub const APP_NAME: &str = "condock";

/// Definition file used by `build` when none is given.
pub const DEFAULT_CONFIG: &str = "environment.yaml";

/// Directory scanned by `generate-images` when none is given.
pub const DEFAULT_DIRNAME: &str = "environments/";

pub const DEFAULT_TAG: &str = "latest";

/// Extension matched when scanning a directory for definitions.
pub const DEFINITION_EXTENSION: &str = "yaml";

pub const DEFAULT_CONTEXT_DIR: &str = ".";

pub const DEFAULT_OUTPUT_DIR: &str = "dockerfiles";

/// Prefix of every generated build file name.
pub const DOCKERFILE_PREFIX: &str = "Dockerfile-";

pub const DEFAULT_DOCKER_HOST: &str = "unix:///var/run/docker.sock";

/// Seconds the engine client waits for a response before giving up.
///
/// Builds can run for a long time, so this is effectively unbounded.
pub const ENGINE_TIMEOUT_SECS: u64 = 60 * 60 * 24;

pub const ENV_CONTEXT_DIR: &str = "CONDOCK_CONTEXT";
pub const ENV_OUTPUT_DIR: &str = "CONDOCK_OUTPUT_DIR";
pub const ENV_DOCKER_HOST: &str = "DOCKER_HOST";
pub const ENV_IGNORE_ENGINE_ERRORS: &str = "CONDOCK_IGNORE_ENGINE_ERRORS";
