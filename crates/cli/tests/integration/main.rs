//! Integration tests for the condock binary.

mod build_tests;
mod common;
mod generate_tests;
