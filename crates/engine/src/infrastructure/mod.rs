//! Infrastructure implementations.
//!
//! Contains port trait implementations for external dependencies.

pub mod app_settings;
pub mod clock;
pub mod importers;
pub mod memory;
pub mod ports;
