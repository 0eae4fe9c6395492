//! Build context archiving.
//!
//! The Docker build API takes the context as a tar stream. The archive is
//! built in memory from the context directory, skipping entries matched by
//! `.dockerignore`. The Dockerfile itself is always included, since the
//! engine cannot build without it. A Dockerfile from outside the context is
//! embedded under a generated name.

use std::collections::hash_map::RandomState;
use std::fs;
use std::hash::{BuildHasher, Hasher};
use std::io;
use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::engine::EngineError;

const DOCKERIGNORE: &str = ".dockerignore";

/// Prefix of the archive name given to a Dockerfile embedded from outside the context.
pub const EXTERNAL_DOCKERFILE_PREFIX: &str = ".dockerfile.";

const MATCH_OPTIONS: MatchOptions = MatchOptions {
  case_sensitive: true,
  require_literal_separator: true,
  require_literal_leading_dot: false,
};

/// Exclusion patterns read from a `.dockerignore` file.
#[derive(Debug, Default)]
pub struct IgnoreRules {
  patterns: Vec<Pattern>,
}

impl IgnoreRules {
  /// Parse `.dockerignore` content.
  ///
  /// Blank lines and `#` comments are skipped. Exception rules (`!pattern`)
  /// are not supported and are ignored with a warning.
  pub fn parse(content: &str) -> Self {
    let mut patterns = Vec::new();

    for line in content.lines() {
      let line = line.trim();
      if line.is_empty() || line.starts_with('#') {
        continue;
      }
      if line.starts_with('!') {
        warn!(rule = %line, "exception rules in .dockerignore are not supported, skipping");
        continue;
      }

      let rule = line.trim_start_matches("./").trim_start_matches('/').trim_end_matches('/');
      match Pattern::new(rule) {
        Ok(pattern) => patterns.push(pattern),
        Err(e) => warn!(rule = %line, error = %e, "invalid .dockerignore pattern, skipping"),
      }
    }

    Self { patterns }
  }

  /// Load rules from `<context_dir>/.dockerignore`, if present.
  pub fn load(context_dir: &Path) -> Result<Self, EngineError> {
    let path = context_dir.join(DOCKERIGNORE);
    match fs::read_to_string(&path) {
      Ok(content) => Ok(Self::parse(&content)),
      Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
      Err(e) => Err(e.into()),
    }
  }

  /// Whether `relative` (a `/`-separated context path) or any of its parent
  /// directories is excluded.
  pub fn is_ignored(&self, relative: &str) -> bool {
    let mut prefix = String::new();
    for component in relative.split('/') {
      if !prefix.is_empty() {
        prefix.push('/');
      }
      prefix.push_str(component);

      if self.patterns.iter().any(|p| p.matches_with(&prefix, MATCH_OPTIONS)) {
        return true;
      }
    }
    false
  }
}

/// Archive `context_dir` as an uncompressed tar.
///
/// `dockerfile` is the Dockerfile path relative to the context; it is added
/// even when an ignore rule matches it. With `external` set, that file's
/// content is stored as `dockerfile` instead.
pub fn archive(context_dir: &Path, dockerfile: &str, external: Option<&Path>) -> Result<Vec<u8>, EngineError> {
  let rules = IgnoreRules::load(context_dir)?;

  let mut builder = tar::Builder::new(Vec::new());
  builder.follow_symlinks(false);

  let mut entries = 0usize;
  let mut has_dockerfile = false;

  if let Some(path) = external {
    let content = fs::read(path)?;
    let mut header = tar::Header::new_gnu();
    header.set_size(content.len() as u64);
    header.set_mode(0o644);
    header.set_cksum();
    builder.append_data(&mut header, dockerfile, content.as_slice())?;
    debug!(path = %path.display(), name = %dockerfile, "embedded external dockerfile");
    entries += 1;
    has_dockerfile = true;
  }

  let mut walker = WalkDir::new(context_dir)
    .min_depth(1)
    .follow_links(false)
    .sort_by_file_name()
    .into_iter();

  while let Some(entry) = walker.next() {
    let entry = entry.map_err(|e| EngineError::Io(io::Error::other(e)))?;
    let relative = slash_path(entry.path().strip_prefix(context_dir).unwrap_or(entry.path()));

    if relative != dockerfile && rules.is_ignored(&relative) {
      if entry.file_type().is_dir() {
        walker.skip_current_dir();
      }
      continue;
    }

    builder.append_path_with_name(entry.path(), &relative)?;
    entries += 1;
    has_dockerfile |= relative == dockerfile;
  }

  if !has_dockerfile {
    let path = context_dir.join(dockerfile);
    builder.append_path_with_name(&path, dockerfile)?;
    entries += 1;
  }

  let archive = builder.into_inner()?;
  debug!(context = %context_dir.display(), entries, bytes = archive.len(), "archived build context");

  Ok(archive)
}

/// Archive the context on the blocking pool.
pub async fn archive_context(
  context_dir: PathBuf,
  dockerfile: String,
  external: Option<PathBuf>,
) -> Result<Vec<u8>, EngineError> {
  tokio::task::spawn_blocking(move || archive(&context_dir, &dockerfile, external.as_deref()))
    .await
    .map_err(|e| EngineError::Io(io::Error::other(e)))?
}

/// A fresh archive name for a Dockerfile embedded from outside the context.
pub fn external_dockerfile_name() -> String {
  let token = RandomState::new().build_hasher().finish();
  format!("{}{:016x}", EXTERNAL_DOCKERFILE_PREFIX, token)
}

/// Join the components of `path` with `/`, as the engine expects.
pub(crate) fn slash_path(path: &Path) -> String {
  path
    .components()
    .map(|c| c.as_os_str().to_string_lossy())
    .collect::<Vec<_>>()
    .join("/")
}
