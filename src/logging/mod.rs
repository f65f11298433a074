// file: src/logging/mod.rs
// version: 1.0.0
// guid: 388682e4-9112-4132-850b-37fd8e15b0ef

//! Logging setup for the install agent

pub mod logger;

pub use logger::{init_logger, DEFAULT_LOG_FILE};
