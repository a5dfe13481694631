//! Control primitives for closed-loop drivetrain motion
//!
//! This crate provides:
//! - PID controllers with anti-windup and settle detection
//! - Slew (acceleration) limiting for commanded velocities

pub mod error;
pub mod pid;
pub mod slew;

pub use error::ConfigError;
pub use pid::*;
pub use slew::*;
