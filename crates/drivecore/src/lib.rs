//! Shared hardware-facing types for the drive crates
//!
//! This crate provides:
//! - The `ActuatorGroup` interface the motion controllers drive
//! - Brake modes and rotation units
//! - The `Clock` used to pace control loops

pub mod actuator;
pub mod clock;

pub use actuator::*;
pub use clock::*;
