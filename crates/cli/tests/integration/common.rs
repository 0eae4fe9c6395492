//! Shared test helpers for CLI integration tests.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Socket that no daemon listens on, so a build that reaches the engine fails fast.
pub const DEAD_SOCKET: &str = "unix:///nonexistent/condock-test/docker.sock";

/// Get path to a fixture file.
pub fn fixture_path(name: &str) -> PathBuf {
  PathBuf::from(env!("CARGO_MANIFEST_DIR"))
    .join("tests")
    .join("fixtures")
    .join(name)
}

/// Read fixture content.
pub fn fixture_content(name: &str) -> String {
  std::fs::read_to_string(fixture_path(name)).unwrap_or_else(|e| panic!("Failed to load fixture {}: {}", name, e))
}

/// Isolated test environment.
///
/// Each test gets its own temporary directory that doubles as the working
/// directory and the build context.
pub struct TestEnv {
  pub temp: TempDir,
}

impl TestEnv {
  /// Create an empty test environment.
  pub fn empty() -> Self {
    Self {
      temp: TempDir::new().unwrap(),
    }
  }

  /// Create with a fixture copied to `relative_path`.
  pub fn with_fixture(name: &str, relative_path: &str) -> Self {
    let env = Self::empty();
    env.write_file(relative_path, &fixture_content(name));
    env
  }

  pub fn root(&self) -> &Path {
    self.temp.path()
  }

  pub fn path(&self, relative_path: &str) -> PathBuf {
    self.temp.path().join(relative_path)
  }

  /// Write a file relative to the temp directory.
  pub fn write_file(&self, relative_path: &str, content: &str) {
    let path = self.path(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
  }

  /// Read a file relative to the temp directory.
  pub fn read_file(&self, relative_path: &str) -> String {
    std::fs::read_to_string(self.path(relative_path)).unwrap()
  }

  /// Get a pre-configured Command for the condock binary.
  ///
  /// Runs inside the temp directory with a dead engine socket and without
  /// any inherited condock configuration.
  pub fn condock_cmd(&self) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("condock");
    cmd.current_dir(self.root());
    cmd.env_remove("CONDOCK_CONTEXT");
    cmd.env_remove("CONDOCK_OUTPUT_DIR");
    cmd.env_remove("CONDOCK_IGNORE_ENGINE_ERRORS");
    cmd.env("DOCKER_HOST", DEAD_SOCKET);
    cmd
  }
}
