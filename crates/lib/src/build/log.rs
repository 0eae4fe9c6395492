//! Build log records and the relay loop.

use std::io::{self, Write};

use futures_util::StreamExt;
use serde::Serialize;
use serde_json::Value;
use serde_json::ser::{Formatter, Serializer};
use tracing::debug;

use crate::build::BuildError;
use crate::build::console::Console;
use crate::engine::LogStream;

/// One message emitted by the engine during a build.
#[derive(Debug, Clone, PartialEq)]
pub enum BuildLogRecord {
  /// Progress text (`{"stream": ...}`).
  Stream(String),
  /// A failure reported by the engine (`{"error": ...}`).
  Error(String),
  /// Anything else, kept as the raw JSON value.
  Other(Value),
}

impl BuildLogRecord {
  /// Classify a decoded record by its keys. `stream` wins over `error` when
  /// both are present; a non-string value is kept as its JSON text.
  pub fn from_value(value: Value) -> Self {
    if let Some(text) = value.get("stream") {
      return BuildLogRecord::Stream(value_text(text));
    }
    if let Some(message) = value.get("error") {
      return BuildLogRecord::Error(value_text(message));
    }
    BuildLogRecord::Other(value)
  }

  /// Decode a single JSON line from the engine.
  pub fn parse(line: &str) -> Result<Self, serde_json::Error> {
    serde_json::from_str(line).map(Self::from_value)
  }

  /// The text relayed to the user for this record.
  ///
  /// Stream and error text is passed through untouched; other records are
  /// rendered as one line of JSON in `", "` / `": "` style, keys in wire order.
  pub fn relay_text(&self) -> String {
    match self {
      BuildLogRecord::Stream(text) | BuildLogRecord::Error(text) => text.clone(),
      BuildLogRecord::Other(value) => format!("{}\n", spaced_json(value)),
    }
  }
}

fn value_text(value: &Value) -> String {
  match value {
    Value::String(text) => text.clone(),
    other => spaced_json(other),
  }
}

/// JSON with a space after every separator and non-ASCII escaped as `\uXXXX`.
fn spaced_json(value: &Value) -> String {
  let mut buf = Vec::new();
  let mut serializer = Serializer::with_formatter(&mut buf, SpacedFormatter);
  match value.serialize(&mut serializer) {
    Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
    Err(_) => value.to_string(),
  }
}

struct SpacedFormatter;

impl Formatter for SpacedFormatter {
  fn begin_array_value<W: ?Sized + Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
    if first { Ok(()) } else { writer.write_all(b", ") }
  }

  fn begin_object_key<W: ?Sized + Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
    if first { Ok(()) } else { writer.write_all(b", ") }
  }

  fn begin_object_value<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
    writer.write_all(b": ")
  }

  fn write_string_fragment<W: ?Sized + Write>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()> {
    for c in fragment.chars() {
      if c.is_ascii() {
        writer.write_all(&[c as u8])?;
      } else {
        for unit in c.encode_utf16(&mut [0u16; 2]) {
          write!(writer, "\\u{:04x}", unit)?;
        }
      }
    }
    Ok(())
  }
}

/// Terminal status of a build, derived from its log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
  Succeeded,
  /// The engine reported at least one error; `message` is the first one.
  Failed { message: String },
}

impl BuildOutcome {
  pub fn is_success(&self) -> bool {
    matches!(self, BuildOutcome::Succeeded)
  }
}

/// Relay every record from `records` to the console, in order.
///
/// The stream is drained even after an error record; the first error seen
/// decides the outcome. Transport errors abort the relay immediately.
pub async fn relay_log<O: Write, L: Write>(
  mut records: LogStream<'_>,
  console: &mut Console<O, L>,
) -> Result<BuildOutcome, BuildError> {
  let mut first_error: Option<String> = None;
  let mut count = 0usize;

  while let Some(item) = records.next().await {
    let record = BuildLogRecord::from_value(item?);
    count += 1;

    console.relay(&record.relay_text()).map_err(BuildError::Output)?;

    if let BuildLogRecord::Error(message) = record {
      if first_error.is_none() {
        first_error = Some(message.trim_end().to_string());
      }
    }
  }

  debug!(records = count, failed = first_error.is_some(), "build log closed");

  Ok(match first_error {
    Some(message) => BuildOutcome::Failed { message },
    None => BuildOutcome::Succeeded,
  })
}
