//! Test utilities for condock-lib.

use std::cell::RefCell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use futures_util::StreamExt;
use futures_util::stream;
use serde_json::Value;
use tempfile::TempDir;

use crate::engine::{BuildEngine, BuildRequest, EngineError, LogStream};
use crate::settings::Settings;

/// A build engine that records every request and replays canned records.
pub struct FakeEngine {
  records: Vec<Value>,
  reachable: bool,
  requests: RefCell<Vec<BuildRequest>>,
}

impl FakeEngine {
  /// Engine that answers every build with `records`.
  pub fn new(records: Vec<Value>) -> Self {
    Self {
      records,
      reachable: true,
      requests: RefCell::new(Vec::new()),
    }
  }

  /// Engine that refuses every connection.
  pub fn unreachable() -> Self {
    Self {
      reachable: false,
      ..Self::new(Vec::new())
    }
  }

  /// Requests received so far, in order.
  pub fn requests(&self) -> Vec<BuildRequest> {
    self.requests.borrow().clone()
  }

  pub fn call_count(&self) -> usize {
    self.requests.borrow().len()
  }
}

impl BuildEngine for FakeEngine {
  async fn build_image(&self, request: &BuildRequest) -> Result<LogStream<'_>, EngineError> {
    self.requests.borrow_mut().push(request.clone());

    if !self.reachable {
      return Err(EngineError::Io(io::Error::from(io::ErrorKind::ConnectionRefused)));
    }

    Ok(stream::iter(self.records.clone().into_iter().map(Ok)).boxed_local())
  }
}

/// A temporary build context.
pub struct Workspace {
  temp: TempDir,
}

impl Workspace {
  pub fn new() -> Self {
    Self {
      temp: TempDir::new().unwrap(),
    }
  }

  pub fn root(&self) -> &Path {
    self.temp.path()
  }

  /// Absolute path of `relative` inside the workspace.
  pub fn path(&self, relative: &str) -> PathBuf {
    self.temp.path().join(relative)
  }

  /// Write a file relative to the workspace, creating parents. Returns its absolute path.
  pub fn write(&self, relative: &str, content: &str) -> PathBuf {
    let path = self.path(relative);
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
  }

  /// Settings using this workspace as the build context.
  pub fn settings(&self) -> Settings {
    Settings {
      context_dir: self.root().to_path_buf(),
      ..Settings::default()
    }
  }
}
