//! Go runtime installer library
//!
//! This library provides the fetch, extract and install routines used by the
//! `atl-install-go` CLI.

pub mod commands;
pub mod core;
pub mod error;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_support;
