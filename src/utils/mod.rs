// file: src/utils/mod.rs
// version: 1.0.0
// guid: 90698158-f35d-4a8e-9c23-d0e8b71a04cf

//! Utility modules for host inspection and input validation

pub mod probe;
pub mod system;
pub mod validation;

pub use probe::SystemProbe;
pub use system::SystemUtils;
