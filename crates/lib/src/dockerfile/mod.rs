//! Dockerfile generation.
//!
//! Rendering is literal placeholder substitution into [`DOCKERFILE_TEMPLATE`].
//! The rendered file:
//! - starts from a pinned `jupyter/minimal-notebook` image
//! - copies the environment file to `/tmp/environment.yaml` and creates it with conda
//! - installs `ipykernel` without upgrading existing packages and registers the kernel
//! - cleans conda caches and static/bytecode/source-map files, then fixes permissions

mod template;

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::consts::DOCKERFILE_PREFIX;

pub use template::{DOCKERFILE_TEMPLATE, KERNEL_NAME_PLACEHOLDER, SRC_PLACEHOLDER};

/// Errors that can occur while writing a Dockerfile.
#[derive(Debug, Error)]
pub enum GenerateError {
  #[error("failed to create directory {}: {source}", path.display())]
  CreateDir { path: PathBuf, source: std::io::Error },

  #[error("failed to write file {}: {source}", path.display())]
  WriteFile { path: PathBuf, source: std::io::Error },
}

/// Values substituted into the template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateVars {
  /// Path of the environment file inside the build context
  pub src: String,
  /// Environment name, also used as kernel id and display name
  pub kernel_name: String,
}

/// File name of the Dockerfile generated for `kernel_name`.
pub fn dockerfile_name(kernel_name: &str) -> String {
  format!("{}{}", DOCKERFILE_PREFIX, kernel_name)
}

/// Render the Dockerfile template.
pub fn render(vars: &TemplateVars) -> String {
  DOCKERFILE_TEMPLATE
    .replace(SRC_PLACEHOLDER, &vars.src)
    .replace(KERNEL_NAME_PLACEHOLDER, &vars.kernel_name)
}

/// Render the template and write it to `output`.
///
/// Parent directories are created as needed and an existing file is
/// overwritten. Returns the rendered text.
pub fn generate(output: &Path, vars: &TemplateVars) -> Result<String, GenerateError> {
  let rendered = render(vars);

  if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
    fs::create_dir_all(parent).map_err(|e| GenerateError::CreateDir {
      path: parent.to_path_buf(),
      source: e,
    })?;
  }

  fs::write(output, &rendered).map_err(|e| GenerateError::WriteFile {
    path: output.to_path_buf(),
    source: e,
  })?;

  debug!(path = %output.display(), kernel = %vars.kernel_name, "wrote dockerfile");

  Ok(rendered)
}
