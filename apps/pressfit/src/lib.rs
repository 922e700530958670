//! # pressfit
//!
//! Command-line front end for `pressfit-core`: argument parsing, TOML
//! configuration and output formatting. All calculation and audit logic
//! lives in the core crate.

pub mod cli;
pub mod config;
