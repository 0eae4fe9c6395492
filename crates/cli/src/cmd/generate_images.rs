//! Implementation of the `condock generate-images` command.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};

use condock_lib::batch::{BatchOptions, generate_all};
use condock_lib::build::Console;
use condock_lib::engine::DockerEngine;
use condock_lib::settings::Settings;

use super::build::print_outcome;
use crate::output::{format_duration, print_info, print_warning};

/// Execute the generate-images command.
///
/// Builds every `*.yaml` file directly inside `dirname`, stopping at the first
/// failure.
pub fn cmd_generate_images(settings: &Settings, dirname: PathBuf, tag: String, template: bool) -> Result<()> {
  let rt = super::runtime()?;
  let engine = DockerEngine::new(settings.docker_host.clone());
  let mut console = Console::stdio();

  let options = BatchOptions {
    dirname,
    tag,
    template_only: template,
  };

  let started = Instant::now();
  let reports = rt
    .block_on(generate_all(&engine, settings, &options, &mut console))
    .with_context(|| format!("Failed to build images from {}", options.dirname.display()))?;

  if reports.is_empty() {
    print_warning(&format!("No environment files found in {}", options.dirname.display()));
    return Ok(());
  }

  for report in &reports {
    print_outcome(report, None);
  }

  print_info(&format!(
    "Processed {} environment(s) in {}",
    reports.len(),
    format_duration(started.elapsed())
  ));

  Ok(())
}
