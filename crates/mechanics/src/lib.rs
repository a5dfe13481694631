//! Simulated drivetrain hardware
//!
//! Provides stand-ins for real motor groups so motion controllers can be run
//! and tested off the robot:
//! - `SimulatedGroup`: a wheel group implementing `drivecore::ActuatorGroup`
//! - `FrictionModel`: coasting losses
//! - `SimWorld` / `SimClock`: advance every group in lock-step with the control loop

pub mod friction;
pub mod wheel;
pub mod world;

pub use friction::FrictionModel;
pub use wheel::{SimulatedGroup, WheelConfig};
pub use world::{SimClock, SimWorld};
