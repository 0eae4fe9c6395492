mod cmd;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use condock_lib::build::BuildOptions;
use condock_lib::consts::{DEFAULT_CONFIG, DEFAULT_DIRNAME, DEFAULT_TAG};
use condock_lib::settings::Settings;

/// condock - build Jupyter kernel images from conda environment files
#[derive(Parser)]
#[command(name = "condock")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Build context directory (default: current directory, or $CONDOCK_CONTEXT)
  #[arg(long, global = true, value_name = "DIR")]
  context: Option<PathBuf>,

  /// Directory for generated Dockerfiles, relative to the context (default: dockerfiles)
  #[arg(long, global = true, value_name = "DIR")]
  output_dir: Option<PathBuf>,

  /// Docker daemon socket (default: $DOCKER_HOST or unix:///var/run/docker.sock)
  #[arg(long, global = true, value_name = "URL")]
  docker_host: Option<String>,

  /// Do not fail when the engine reports a build error
  #[arg(long, global = true)]
  ignore_engine_errors: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Build an image from a single conda environment file
  Build {
    /// Conda environment file
    #[arg(long, default_value = DEFAULT_CONFIG)]
    config: PathBuf,

    /// Generate the Dockerfile only, no building
    #[arg(long)]
    template: bool,

    /// Image tag
    #[arg(long, default_value = DEFAULT_TAG)]
    tag: String,

    /// Use your own Dockerfile instead of generating one
    #[arg(long)]
    dockerfile: Option<PathBuf>,
  },

  /// Build images for every environment file in a directory
  GenerateImages {
    /// Directory of yaml files
    #[arg(long, default_value = DEFAULT_DIRNAME)]
    dirname: PathBuf,

    /// Image tag
    #[arg(long, default_value = DEFAULT_TAG)]
    tag: String,

    /// Generate Dockerfiles only, no building
    #[arg(long)]
    template: bool,
  },
}

impl Cli {
  /// Environment-derived settings with command-line overrides applied.
  fn settings(&self) -> Settings {
    let mut settings = Settings::from_env();

    if let Some(context) = &self.context {
      settings.context_dir = context.clone();
    }
    if let Some(output_dir) = &self.output_dir {
      settings.output_dir = output_dir.clone();
    }
    if let Some(host) = &self.docker_host {
      settings.docker_host = host.clone();
    }
    if self.ignore_engine_errors {
      settings.fail_on_engine_error = false;
    }

    settings
  }
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  let default_filter = if cli.verbose { "debug" } else { "warn" };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let settings = cli.settings();
  debug!(?settings, "resolved settings");

  match cli.command {
    Commands::Build {
      config,
      template,
      tag,
      dockerfile,
    } => cmd::cmd_build(
      &settings,
      BuildOptions {
        config,
        template_only: template,
        tag,
        dockerfile,
      },
    ),
    Commands::GenerateImages { dirname, tag, template } => cmd::cmd_generate_images(&settings, dirname, tag, template),
  }
}
