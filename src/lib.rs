// file: src/lib.rs
// version: 1.0.0
// guid: 3171e7d7-6f2e-4ba8-9d41-0c2a8a9e6d15

//! # Debian Install Agent
//!
//! Guided Debian installation pipeline. Partitions a target disk, bootstraps
//! a base system with debootstrap, configures locale, users and networking
//! inside the target, installs GRUB, and reports coarse progress milestones
//! while it runs.
//!
//! The pipeline shells out to standard system tools through a [`executor::CommandRunner`]
//! seam, so embedders can script or audit every external command.

pub mod cli;
pub mod config;
pub mod error;
pub mod executor;
pub mod installer;
pub mod logging;
pub mod reporter;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{InstallError, Result};

/// Version information for the agent
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
