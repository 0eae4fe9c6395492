//! Building every environment file in a directory.

use std::io::Write;
use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};
use tracing::{info, warn};

use crate::build::{BuildError, BuildOptions, BuildReport, Console, build};
use crate::consts::{DEFAULT_DIRNAME, DEFAULT_TAG, DEFINITION_EXTENSION};
use crate::engine::BuildEngine;
use crate::settings::Settings;

/// Separator printed after each environment.
const DONE_SEPARATOR: &str = "Done...\n";

const DISCOVER_OPTIONS: MatchOptions = MatchOptions {
  case_sensitive: true,
  require_literal_separator: true,
  require_literal_leading_dot: true,
};

/// What to build in a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOptions {
  /// Directory scanned for `*.yaml` definitions (not recursive)
  pub dirname: PathBuf,
  pub tag: String,
  pub template_only: bool,
}

impl Default for BatchOptions {
  fn default() -> Self {
    Self {
      dirname: PathBuf::from(DEFAULT_DIRNAME),
      tag: DEFAULT_TAG.to_string(),
      template_only: false,
    }
  }
}

/// List the definition files directly inside `dir`, in lexicographic order.
///
/// Hidden files are skipped. A missing directory yields an empty list.
pub fn discover(dir: &Path) -> Result<Vec<PathBuf>, BuildError> {
  if !dir.is_dir() {
    warn!(dir = %dir.display(), "environment directory not found");
    return Ok(Vec::new());
  }

  let base = dir.to_string_lossy();
  let base = base.trim_end_matches(['/', '\\']);
  let pattern = format!("{}/*.{}", Pattern::escape(base), DEFINITION_EXTENSION);

  let paths = glob::glob_with(&pattern, DISCOVER_OPTIONS).map_err(|e| BuildError::Discover {
    dir: dir.to_path_buf(),
    message: e.to_string(),
  })?;

  let mut files = Vec::new();
  for entry in paths {
    let path = entry.map_err(|e| BuildError::Discover {
      dir: dir.to_path_buf(),
      message: e.to_string(),
    })?;
    if path.is_file() {
      files.push(path);
    }
  }
  files.sort();

  Ok(files)
}

/// Build every definition in `options.dirname`, one after another.
///
/// Dockerfiles are always regenerated. The first failure aborts the batch.
pub async fn generate_all<E, O, L>(
  engine: &E,
  settings: &Settings,
  options: &BatchOptions,
  console: &mut Console<O, L>,
) -> Result<Vec<BuildReport>, BuildError>
where
  E: BuildEngine,
  O: Write,
  L: Write,
{
  let files = discover(&options.dirname)?;
  info!(dir = %options.dirname.display(), count = files.len(), "found environment files");

  let mut reports = Vec::with_capacity(files.len());
  for config in files {
    let build_options = BuildOptions {
      config,
      template_only: options.template_only,
      tag: options.tag.clone(),
      dockerfile: None,
    };

    let report = build(engine, settings, &build_options, console).await?;
    console.line(DONE_SEPARATOR).map_err(BuildError::Output)?;
    reports.push(report);
  }

  Ok(reports)
}
