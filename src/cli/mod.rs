// file: src/cli/mod.rs
// version: 1.0.0
// guid: ee0c135b-4adf-4c91-9be6-43d88f6798a2

//! Command line interface for the Debian install agent

pub mod args;
pub mod commands;

pub use args::Cli;
pub use commands::*;
