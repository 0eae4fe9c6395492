//! condock-lib: render conda environments into Docker images
//!
//! This crate provides everything behind the `condock` binary:
//! - `definition`: loading environment files and resolving their name
//! - `dockerfile`: rendering the fixed Dockerfile template
//! - `engine`: the build engine seam and its Docker implementation
//! - `build`: driving a single build and relaying its log
//! - `batch`: building every environment file in a directory

pub mod batch;
pub mod build;
pub mod consts;
pub mod definition;
pub mod dockerfile;
pub mod engine;
pub mod settings;
pub mod util;
