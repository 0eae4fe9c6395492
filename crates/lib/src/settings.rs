//! Runtime settings.
//!
//! Everything the driver would otherwise take from ambient state lives here:
//! the build context, where Dockerfiles are written, which engine to talk to,
//! and whether engine-reported errors fail the build. Values come from
//! defaults, then environment variables; the CLI applies its flags on top.

use std::path::{Path, PathBuf};

use crate::consts::{
  DEFAULT_CONTEXT_DIR, DEFAULT_DOCKER_HOST, DEFAULT_OUTPUT_DIR, ENV_CONTEXT_DIR, ENV_DOCKER_HOST,
  ENV_IGNORE_ENGINE_ERRORS, ENV_OUTPUT_DIR,
};
use crate::dockerfile::dockerfile_name;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
  /// Directory sent to the engine as the build context
  pub context_dir: PathBuf,
  /// Where generated Dockerfiles go; relative paths resolve against `context_dir`
  pub output_dir: PathBuf,
  /// Engine address, e.g. `unix:///var/run/docker.sock`
  pub docker_host: String,
  /// Turn engine-reported errors into a failed build
  pub fail_on_engine_error: bool,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      context_dir: PathBuf::from(DEFAULT_CONTEXT_DIR),
      output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
      docker_host: DEFAULT_DOCKER_HOST.to_string(),
      fail_on_engine_error: true,
    }
  }
}

impl Settings {
  /// Defaults overridden by `CONDOCK_CONTEXT`, `CONDOCK_OUTPUT_DIR`,
  /// `DOCKER_HOST` and `CONDOCK_IGNORE_ENGINE_ERRORS`.
  pub fn from_env() -> Self {
    let defaults = Self::default();

    Self {
      context_dir: non_empty_var(ENV_CONTEXT_DIR)
        .map(PathBuf::from)
        .unwrap_or(defaults.context_dir),
      output_dir: non_empty_var(ENV_OUTPUT_DIR)
        .map(PathBuf::from)
        .unwrap_or(defaults.output_dir),
      docker_host: non_empty_var(ENV_DOCKER_HOST).unwrap_or(defaults.docker_host),
      fail_on_engine_error: !non_empty_var(ENV_IGNORE_ENGINE_ERRORS)
        .map(|v| is_truthy(&v))
        .unwrap_or(false),
    }
  }

  /// Directory generated Dockerfiles are written to.
  pub fn dockerfiles_dir(&self) -> PathBuf {
    if self.context_dir == Path::new(DEFAULT_CONTEXT_DIR) {
      self.output_dir.clone()
    } else {
      self.context_dir.join(&self.output_dir)
    }
  }

  /// Path of the Dockerfile generated for `kernel_name`.
  pub fn dockerfile_path(&self, kernel_name: &str) -> PathBuf {
    self.dockerfiles_dir().join(dockerfile_name(kernel_name))
  }
}

fn non_empty_var(key: &str) -> Option<String> {
  std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn is_truthy(value: &str) -> bool {
  matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
