//! Where build progress and relayed engine output are written.

use std::io::{self, Stderr, Stdout, Write};

/// A pair of writers: `out` for progress lines, `log` for relayed engine output.
pub struct Console<O: Write, L: Write> {
  out: O,
  log: L,
}

impl Console<Stdout, Stderr> {
  /// Progress on stdout, engine output on stderr.
  pub fn stdio() -> Self {
    Self::new(io::stdout(), io::stderr())
  }
}

impl<O: Write, L: Write> Console<O, L> {
  pub fn new(out: O, log: L) -> Self {
    Self { out, log }
  }

  /// Write a progress line, terminated with a newline.
  pub fn line(&mut self, message: &str) -> io::Result<()> {
    writeln!(self.out, "{}", message)?;
    self.out.flush()
  }

  /// Relay engine text exactly as given.
  pub fn relay(&mut self, text: &str) -> io::Result<()> {
    self.log.write_all(text.as_bytes())?;
    self.log.flush()
  }

  pub fn out(&self) -> &O {
    &self.out
  }

  pub fn log(&self) -> &L {
    &self.log
  }
}

impl Console<Vec<u8>, Vec<u8>> {
  /// A console that captures everything in memory.
  pub fn buffered() -> Self {
    Self::new(Vec::new(), Vec::new())
  }

  pub fn out_text(&self) -> String {
    String::from_utf8_lossy(&self.out).into_owned()
  }

  pub fn log_text(&self) -> String {
    String::from_utf8_lossy(&self.log).into_owned()
  }
}
