//! Docker Engine implementation of [`BuildEngine`].

use std::cell::OnceCell;

use bollard::Docker;
use bollard::errors::Error as DockerError;
use bollard::image::BuildImageOptions;
use bollard::models::BuildInfo;
use futures_util::StreamExt;
use serde_json::{Map, Value, json};
use tracing::{debug, info};

use crate::consts::ENGINE_TIMEOUT_SECS;
use crate::engine::context::archive_context;
use crate::engine::{BuildEngine, BuildRequest, EngineError, LogStream};

/// Where the Docker daemon listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DockerHost {
  /// A Unix domain socket path.
  Unix(String),
  /// A Windows named pipe.
  NamedPipe(String),
}

impl DockerHost {
  /// Parse a `DOCKER_HOST`-style address.
  ///
  /// Accepts `unix://<path>`, `npipe://<path>` and bare absolute socket paths.
  pub fn parse(host: &str) -> Result<Self, EngineError> {
    if let Some(path) = host.strip_prefix("unix://") {
      if path.is_empty() {
        return Err(EngineError::InvalidHost(host.to_string()));
      }
      return Ok(DockerHost::Unix(path.to_string()));
    }
    if let Some(path) = host.strip_prefix("npipe://") {
      return Ok(DockerHost::NamedPipe(path.to_string()));
    }
    if host.starts_with('/') {
      return Ok(DockerHost::Unix(host.to_string()));
    }
    Err(EngineError::InvalidHost(host.to_string()))
  }
}

/// Builds images through the Docker Engine API.
///
/// The client is created on the first build, so an engine that is never
/// asked to build never touches the daemon.
pub struct DockerEngine {
  host: String,
  client: OnceCell<Docker>,
}

impl DockerEngine {
  pub fn new(host: impl Into<String>) -> Self {
    Self {
      host: host.into(),
      client: OnceCell::new(),
    }
  }

  pub fn host(&self) -> &str {
    &self.host
  }

  fn client(&self) -> Result<&Docker, EngineError> {
    if let Some(client) = self.client.get() {
      return Ok(client);
    }

    let client = match DockerHost::parse(&self.host)? {
      #[cfg(unix)]
      DockerHost::Unix(path) => Docker::connect_with_unix(&path, ENGINE_TIMEOUT_SECS, bollard::API_DEFAULT_VERSION)?,
      #[cfg(windows)]
      DockerHost::NamedPipe(path) => {
        Docker::connect_with_named_pipe(&path, ENGINE_TIMEOUT_SECS, bollard::API_DEFAULT_VERSION)?
      }
      #[allow(unreachable_patterns)]
      _ => return Err(EngineError::InvalidHost(self.host.clone())),
    };

    debug!(host = %self.host, "created docker client");
    Ok(self.client.get_or_init(|| client))
  }
}

impl BuildEngine for DockerEngine {
  async fn build_image(&self, request: &BuildRequest) -> Result<LogStream<'_>, EngineError> {
    let client = self.client()?;
    let archive = archive_context(
      request.context_dir.clone(),
      request.dockerfile.clone(),
      request.external_dockerfile.clone(),
    )
    .await?;

    let options = BuildImageOptions {
      dockerfile: request.dockerfile.clone(),
      t: request.image_tag.clone(),
      rm: true,
      ..Default::default()
    };

    info!(tag = %request.image_tag, dockerfile = %request.dockerfile, "submitting build");

    let stream = client.build_image(options, None, Some(archive.into())).map(record_from);

    Ok(stream.boxed_local())
  }
}

/// Turn one item of the client's build stream back into the engine's JSON record.
///
/// Keys come out in the order the daemon writes them. Errors the daemon reports
/// inside the stream become `{"error": ...}` records; every other client error
/// is a transport failure.
pub(crate) fn record_from(item: Result<BuildInfo, DockerError>) -> Result<Value, EngineError> {
  let info = match item {
    Ok(info) => info,
    Err(DockerError::DockerStreamError { error }) => return Ok(json!({ "error": error })),
    Err(e) => return Err(EngineError::Docker(e)),
  };

  let mut record = Map::new();
  if let Some(stream) = info.stream {
    record.insert("stream".into(), json!(stream));
  }
  if let Some(status) = info.status {
    record.insert("status".into(), json!(status));
  }
  if let Some(detail) = info.progress_detail {
    let mut fields = Map::new();
    if let Some(current) = detail.current {
      fields.insert("current".into(), json!(current));
    }
    if let Some(total) = detail.total {
      fields.insert("total".into(), json!(total));
    }
    record.insert("progressDetail".into(), Value::Object(fields));
  }
  if let Some(progress) = info.progress {
    record.insert("progress".into(), json!(progress));
  }
  if let Some(id) = info.id {
    record.insert("id".into(), json!(id));
  }
  if let Some(detail) = info.error_detail {
    let mut fields = Map::new();
    if let Some(code) = detail.code {
      fields.insert("code".into(), json!(code));
    }
    if let Some(message) = detail.message {
      fields.insert("message".into(), json!(message));
    }
    record.insert("errorDetail".into(), Value::Object(fields));
  }
  if let Some(error) = info.error {
    record.insert("error".into(), json!(error));
  }
  if let Some(aux) = info.aux {
    let mut fields = Map::new();
    if let Some(id) = aux.id {
      fields.insert("ID".into(), json!(id));
    }
    record.insert("aux".into(), Value::Object(fields));
  }

  Ok(Value::Object(record))
}
