//! Application core: command handling over the acquisition channels.
//!
//! Everything here is pure logic. Hardware is reached only through the
//! port traits in [`ports`], so the whole layer runs under host tests.

pub mod context;
pub mod dispatch;
pub mod ports;
