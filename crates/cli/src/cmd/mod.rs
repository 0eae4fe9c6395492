mod build;
mod generate_images;

pub use build::cmd_build;
pub use generate_images::cmd_generate_images;

use anyhow::{Context, Result};
use tokio::runtime::Runtime;

/// Builds run one at a time, so a current-thread runtime is enough.
fn runtime() -> Result<Runtime> {
  tokio::runtime::Builder::new_current_thread()
    .enable_all()
    .build()
    .context("Failed to create async runtime")
}
