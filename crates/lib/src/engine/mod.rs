//! The build engine seam.
//!
//! The driver only needs one operation from an engine: submit a build and hand
//! back its log records as a lazy stream of JSON values in wire shape. The
//! Docker daemon is the production engine; tests substitute a fake.

pub mod context;
pub mod docker;

use std::path::PathBuf;

use futures_util::stream::LocalBoxStream;
use thiserror::Error;

pub use docker::DockerEngine;

/// Lazy stream of raw build log records.
pub type LogStream<'a> = LocalBoxStream<'a, Result<serde_json::Value, EngineError>>;

/// Errors raised while talking to the build engine.
#[derive(Debug, Error)]
pub enum EngineError {
  /// The configured engine address is not usable.
  #[error("unsupported engine host '{0}': expected unix://<path> or an absolute socket path")]
  InvalidHost(String),

  /// I/O failure while preparing or sending the request.
  #[error("engine i/o error: {0}")]
  Io(#[from] std::io::Error),

  /// The Docker client failed to reach or talk to the daemon.
  #[error("docker engine error: {0}")]
  Docker(#[from] bollard::errors::Error),
}

/// One image build submitted to an engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
  /// Tag applied to the built image, `{name}:{tag}`
  pub image_tag: String,
  /// Directory sent to the engine as the build context
  pub context_dir: PathBuf,
  /// Dockerfile name inside the context archive, `/`-separated
  pub dockerfile: String,
  /// Dockerfile living outside the context; its content is added to the
  /// archive under `dockerfile`
  pub external_dockerfile: Option<PathBuf>,
}

/// Something that can build images from a context directory.
#[allow(async_fn_in_trait)]
pub trait BuildEngine {
  /// Submit `request` and return the engine's log records.
  ///
  /// Records are yielded as the engine emits them; the stream ends when the
  /// engine closes it.
  async fn build_image(&self, request: &BuildRequest) -> Result<LogStream<'_>, EngineError>;
}
