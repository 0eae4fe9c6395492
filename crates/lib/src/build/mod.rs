//! Building a single environment image.
//!
//! [`build`] runs one environment file through the whole pipeline:
//! - loads the definition and resolves its name
//! - regenerates the Dockerfile, unless one was supplied
//! - stops there in template-only mode
//! - otherwise submits the build and relays the engine log until it closes
//!
//! Errors reported by the engine inside the log are turned into
//! [`BuildError::EngineReported`] unless `Settings::fail_on_engine_error` is off.

pub mod console;
pub mod log;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::consts::DEFAULT_TAG;
use crate::definition::{self, DefinitionError};
use crate::dockerfile::{self, GenerateError, TemplateVars};
use crate::engine::context::{external_dockerfile_name, slash_path};
use crate::engine::{BuildEngine, BuildRequest, EngineError};
use crate::settings::Settings;

pub use console::Console;
pub use log::{BuildLogRecord, BuildOutcome, relay_log};

/// Errors that can occur while building an environment image.
#[derive(Debug, Error)]
pub enum BuildError {
  #[error(transparent)]
  Definition(#[from] DefinitionError),

  #[error(transparent)]
  Generate(#[from] GenerateError),

  #[error(transparent)]
  Engine(#[from] EngineError),

  #[error("failed to create output directory {}: {source}", path.display())]
  CreateOutputDir { path: PathBuf, source: std::io::Error },

  #[error("failed to resolve path {}: {source}", path.display())]
  ResolvePath { path: PathBuf, source: std::io::Error },

  #[error("{} is outside the build context {}", path.display(), context.display())]
  OutsideContext { path: PathBuf, context: PathBuf },

  #[error("failed to list environment files in {}: {message}", dir.display())]
  Discover { dir: PathBuf, message: String },

  #[error("failed to write output: {0}")]
  Output(#[source] std::io::Error),

  #[error("build of {image_tag} failed: {message}")]
  EngineReported { image_tag: String, message: String },
}

/// What to build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
  /// Environment definition file
  pub config: PathBuf,
  /// Only write the Dockerfile, never contact the engine
  pub template_only: bool,
  /// Image tag, combined with the environment name
  pub tag: String,
  /// Use this Dockerfile as-is instead of generating one
  pub dockerfile: Option<PathBuf>,
}

impl BuildOptions {
  pub fn new(config: impl Into<PathBuf>) -> Self {
    Self {
      config: config.into(),
      template_only: false,
      tag: DEFAULT_TAG.to_string(),
      dockerfile: None,
    }
  }
}

/// Result of a single build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
  /// Environment name from the definition
  pub kernel_name: String,
  /// Tag the image was (or would be) built as
  pub image_tag: String,
  /// Dockerfile used for the build
  pub dockerfile: PathBuf,
  /// Rendered Dockerfile content, when it was generated by this build
  pub rendered: Option<String>,
  /// Engine outcome; `None` in template-only mode
  pub outcome: Option<BuildOutcome>,
}

/// Image tag for an environment: `{name}:{tag}`.
pub fn image_tag(kernel_name: &str, tag: &str) -> String {
  format!("{}:{}", kernel_name, tag)
}

/// Build one environment image.
///
/// # Errors
///
/// Returns an error if the definition cannot be loaded or has no name, the
/// Dockerfile cannot be written, the engine cannot be reached, or (with
/// `fail_on_engine_error`) the engine reported an error during the build.
pub async fn build<E, O, L>(
  engine: &E,
  settings: &Settings,
  options: &BuildOptions,
  console: &mut Console<O, L>,
) -> Result<BuildReport, BuildError>
where
  E: BuildEngine,
  O: Write,
  L: Write,
{
  let definition = definition::load(&options.config)?;
  let kernel_name = definition.name()?.to_string();

  let output_dir = settings.dockerfiles_dir();
  fs::create_dir_all(&output_dir).map_err(|e| BuildError::CreateOutputDir {
    path: output_dir.clone(),
    source: e,
  })?;

  let (dockerfile, rendered) = match &options.dockerfile {
    Some(path) => {
      debug!(path = %path.display(), "using supplied dockerfile");
      (path.clone(), None)
    }
    None => {
      let path = settings.dockerfile_path(&kernel_name);
      let vars = TemplateVars {
        src: copy_source(&settings.context_dir, &options.config),
        kernel_name: kernel_name.clone(),
      };
      let rendered = dockerfile::generate(&path, &vars)?;
      (path, Some(rendered))
    }
  };

  let image_tag = image_tag(&kernel_name, &options.tag);

  console
    .line(&format!("building Dockerfile {} ....", dockerfile.display()))
    .map_err(BuildError::Output)?;

  let mut report = BuildReport {
    kernel_name,
    image_tag,
    dockerfile,
    rendered,
    outcome: None,
  };

  if options.template_only {
    console
      .line(&format!("Generated {}", report.dockerfile.display()))
      .map_err(BuildError::Output)?;
    return Ok(report);
  }

  let (dockerfile, external_dockerfile) = match context_relative(&settings.context_dir, &report.dockerfile) {
    Ok(relative) => (relative, None),
    Err(BuildError::OutsideContext { .. }) => {
      let name = external_dockerfile_name();
      debug!(path = %report.dockerfile.display(), name = %name, "dockerfile is outside the context, embedding it");
      (name, Some(report.dockerfile.clone()))
    }
    Err(e) => return Err(e),
  };

  let request = BuildRequest {
    image_tag: report.image_tag.clone(),
    context_dir: settings.context_dir.clone(),
    dockerfile,
    external_dockerfile,
  };

  info!(tag = %request.image_tag, context = %request.context_dir.display(), "building image");

  let records = engine.build_image(&request).await?;
  let outcome = relay_log(records, console).await?;

  if let BuildOutcome::Failed { message } = &outcome {
    if settings.fail_on_engine_error {
      return Err(BuildError::EngineReported {
        image_tag: report.image_tag,
        message: message.clone(),
      });
    }
    warn!(tag = %report.image_tag, error = %message, "engine reported an error, continuing");
  }

  report.outcome = Some(outcome);
  Ok(report)
}

/// Path of `path` inside `context_dir`, `/`-separated.
pub(crate) fn context_relative(context_dir: &Path, path: &Path) -> Result<String, BuildError> {
  let context = dunce::canonicalize(context_dir).map_err(|e| BuildError::ResolvePath {
    path: context_dir.to_path_buf(),
    source: e,
  })?;
  let full = dunce::canonicalize(path).map_err(|e| BuildError::ResolvePath {
    path: path.to_path_buf(),
    source: e,
  })?;

  let relative = full.strip_prefix(&context).map_err(|_| BuildError::OutsideContext {
    path: path.to_path_buf(),
    context: context_dir.to_path_buf(),
  })?;

  Ok(slash_path(relative))
}

/// The `COPY` source for a definition: its path inside the context, or the
/// path as given when it cannot be placed there.
fn copy_source(context_dir: &Path, config: &Path) -> String {
  context_relative(context_dir, config).unwrap_or_else(|_| config.display().to_string())
}
