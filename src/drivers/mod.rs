//! Button and LED drivers.

pub mod blinker;
pub mod button;
