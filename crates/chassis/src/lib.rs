//! Closed-loop drivetrain motion
//!
//! This crate provides:
//! - `Geometry`: drivetrain dimensions and inch/degree conversion
//! - Kinematic decomposition of straight, turn, strafe and diagonal moves
//! - The shared control loop and its single-task background scheduler
//! - `Tank` and `HDrive` drivetrains behind the `MotionController` trait
//!
//! ```no_run
//! use chassis::{Geometry, HDrive, MotionController};
//! # fn groups() -> (mechanics::SimulatedGroup, mechanics::SimulatedGroup, mechanics::SimulatedGroup) { unimplemented!() }
//! # fn main() -> Result<(), chassis::DriveError> {
//! let (left, right, center) = groups();
//! let geometry = Geometry::h_drive(12.0, 1.625, 1.625, 1.0)?;
//! let mut drive = HDrive::new(geometry, left, right, center)?;
//! drive.straight(24.0, 50.0)?;
//! drive.strafe_async(-6.0, 40.0)?;
//! drive.wait_until_settled();
//! # Ok(())
//! # }
//! ```

pub mod base;
pub mod controller;
pub mod error;
pub mod geometry;
pub mod hdrive;
pub mod kinematics;
pub mod motion;
pub mod rig;
pub mod tank;
pub mod task;

pub use base::{DriveBase, DriveSettings};
pub use controller::MotionController;
pub use error::DriveError;
pub use geometry::Geometry;
pub use hdrive::HDrive;
pub use kinematics::{Axis, Offsets};
pub use motion::MotionOutcome;
pub use tank::Tank;
pub use task::StopHandle;

pub use control::PidConfig;
pub use drivecore::{ActuatorGroup, BrakeMode, RotationUnit};
