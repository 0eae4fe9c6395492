//! Shared utilities.
//!
//! Currently only test helpers: a scripted build engine and a throwaway
//! build context.

#[cfg(test)]
pub mod testutil;
