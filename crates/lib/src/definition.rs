//! Loading conda environment definition files.
//!
//! A definition is an arbitrary YAML mapping. The only key interpreted here is
//! `name`, which becomes both the image family name and the kernel name. The
//! rest of the document is opaque: it reaches the image only through the file
//! copied into the build context.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while loading or reading a definition.
#[derive(Debug, Error)]
pub enum DefinitionError {
  #[error("environment file not found: {}", path.display())]
  NotFound { path: PathBuf },

  #[error("failed to read environment file {}: {source}", path.display())]
  Read { path: PathBuf, source: std::io::Error },

  #[error("failed to parse environment file {}: {message}", path.display())]
  Parse { path: PathBuf, message: String },

  #[error("environment file {} has no `{field}` field", path.display())]
  MissingField { path: PathBuf, field: &'static str },

  #[error("field `{field}` in {} must be a string", path.display())]
  InvalidField { path: PathBuf, field: &'static str },
}

/// A parsed environment definition and the file it came from.
#[derive(Debug, Clone)]
pub struct EnvironmentDefinition {
  path: PathBuf,
  document: Mapping,
}

impl EnvironmentDefinition {
  /// Parse a definition from YAML text.
  ///
  /// `path` is only used for error messages and [`EnvironmentDefinition::path`].
  pub fn parse(path: &Path, content: &str) -> Result<Self, DefinitionError> {
    if content.trim().is_empty() {
      return Ok(Self {
        path: path.to_path_buf(),
        document: Mapping::new(),
      });
    }

    let value: Value = serde_yaml::from_str(content).map_err(|e| DefinitionError::Parse {
      path: path.to_path_buf(),
      message: e.to_string(),
    })?;

    let document = match value {
      Value::Mapping(mapping) => mapping,
      Value::Null => Mapping::new(),
      _ => {
        return Err(DefinitionError::Parse {
          path: path.to_path_buf(),
          message: "expected a mapping at the top level".to_string(),
        });
      }
    };

    Ok(Self {
      path: path.to_path_buf(),
      document,
    })
  }

  /// Path the definition was loaded from, as given by the caller.
  pub fn path(&self) -> &Path {
    &self.path
  }

  /// The full parsed document.
  pub fn document(&self) -> &Mapping {
    &self.document
  }

  /// The environment name.
  ///
  /// # Errors
  ///
  /// Returns [`DefinitionError::MissingField`] when there is no `name` key and
  /// [`DefinitionError::InvalidField`] when its value is not a string.
  pub fn name(&self) -> Result<&str, DefinitionError> {
    match self.document.get("name") {
      Some(Value::String(name)) => Ok(name.as_str()),
      Some(_) => Err(DefinitionError::InvalidField {
        path: self.path.clone(),
        field: "name",
      }),
      None => Err(DefinitionError::MissingField {
        path: self.path.clone(),
        field: "name",
      }),
    }
  }
}

/// Read and parse the definition file at `path`.
pub fn load(path: &Path) -> Result<EnvironmentDefinition, DefinitionError> {
  let content = fs::read_to_string(path).map_err(|e| match e.kind() {
    ErrorKind::NotFound => DefinitionError::NotFound {
      path: path.to_path_buf(),
    },
    _ => DefinitionError::Read {
      path: path.to_path_buf(),
      source: e,
    },
  })?;

  debug!(path = %path.display(), bytes = content.len(), "loaded environment file");

  EnvironmentDefinition::parse(path, &content)
}
