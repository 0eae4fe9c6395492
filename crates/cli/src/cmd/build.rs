//! Implementation of the `condock build` command.
//!
//! Renders the Dockerfile for one environment file and, unless `--template`
//! is given, builds it with the Docker daemon while streaming the build log.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use condock_lib::build::{BuildOptions, BuildOutcome, BuildReport, Console, build};
use condock_lib::engine::DockerEngine;
use condock_lib::settings::Settings;

use crate::output::{format_duration, print_success, print_warning};

/// Execute the build command.
///
/// # Errors
///
/// Fails if the environment file cannot be loaded, the Dockerfile cannot be
/// written, the daemon cannot be reached, or the daemon reports a build error
/// (unless `--ignore-engine-errors` is set).
pub fn cmd_build(settings: &Settings, options: BuildOptions) -> Result<()> {
  let rt = super::runtime()?;
  let engine = DockerEngine::new(settings.docker_host.clone());
  let mut console = Console::stdio();

  let started = Instant::now();
  let report = rt
    .block_on(build(&engine, settings, &options, &mut console))
    .with_context(|| format!("Failed to build {}", options.config.display()))?;

  print_outcome(&report, Some(started.elapsed()));

  Ok(())
}

/// Print a one-line summary for a finished engine build.
pub(crate) fn print_outcome(report: &BuildReport, elapsed: Option<Duration>) {
  match &report.outcome {
    Some(BuildOutcome::Succeeded) => match elapsed {
      Some(elapsed) => print_success(&format!("Built {} in {}", report.image_tag, format_duration(elapsed))),
      None => print_success(&format!("Built {}", report.image_tag)),
    },
    Some(BuildOutcome::Failed { message }) => {
      print_warning(&format!("Build of {} reported an error: {}", report.image_tag, message));
    }
    None => {}
  }
}
