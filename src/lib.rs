//! LabShield firmware library.
//!
//! Exposes the pure-logic modules for integration testing and host
//! tooling. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod channels;
pub mod config;
pub mod protocol;
pub mod scheduler;

pub mod error;
pub mod pins;

pub mod adapters;
pub mod drivers;

pub use error::{Error, Result};
