//! Actuator group interface
//!
//! An actuator group is a set of physically ganged motors driven as one logical
//! wheel. The motion controllers only ever talk to hardware through this trait.

use serde::{Deserialize, Serialize};

/// Behaviour applied to a stopped actuator group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrakeMode {
    /// Motors spin freely
    Coast,
    /// Motors actively resist rotation
    #[default]
    Brake,
    /// Motors actively hold their position
    Hold,
}

/// Angular unit used when reading a rotation sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationUnit {
    #[default]
    Degrees,
    Radians,
    Revolutions,
}

impl RotationUnit {
    /// Convert a value in degrees into this unit
    pub fn from_degrees(self, degrees: f64) -> f64 {
        match self {
            RotationUnit::Degrees => degrees,
            RotationUnit::Radians => degrees.to_radians(),
            RotationUnit::Revolutions => degrees / 360.0,
        }
    }

    /// Convert a value in this unit into degrees
    pub fn to_degrees(self, value: f64) -> f64 {
        match self {
            RotationUnit::Degrees => value,
            RotationUnit::Radians => value.to_degrees(),
            RotationUnit::Revolutions => value * 360.0,
        }
    }
}

/// One physical wheel group (left side, right side or center)
///
/// Velocities are signed percentages of free speed in `[-100, 100]`.
/// Positions are cumulative and only change on `reset_position`.
/// Implementations own their error handling; the controllers assume reads
/// and writes succeed.
pub trait ActuatorGroup {
    /// Spin the group at a signed velocity
    fn spin(&mut self, velocity: f64);

    /// Stop the group using the given brake mode
    fn stop(&mut self, mode: BrakeMode);

    /// Accumulated rotation since the last reset
    fn position(&self, unit: RotationUnit) -> f64;

    /// Zero the accumulated rotation
    fn reset_position(&mut self);
}

impl<T: ActuatorGroup + ?Sized> ActuatorGroup for Box<T> {
    fn spin(&mut self, velocity: f64) {
        (**self).spin(velocity)
    }

    fn stop(&mut self, mode: BrakeMode) {
        (**self).stop(mode)
    }

    fn position(&self, unit: RotationUnit) -> f64 {
        (**self).position(unit)
    }

    fn reset_position(&mut self) {
        (**self).reset_position()
    }
}

/// Owned, thread-transferable actuator group handle
pub type BoxedGroup = Box<dyn ActuatorGroup + Send>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_conversions() {
        assert!((RotationUnit::Revolutions.from_degrees(720.0) - 2.0).abs() < 1e-12);
        assert!((RotationUnit::Radians.from_degrees(180.0) - std::f64::consts::PI).abs() < 1e-12);
        assert!((RotationUnit::Revolutions.to_degrees(0.5) - 180.0).abs() < 1e-12);
        assert_eq!(RotationUnit::Degrees.to_degrees(42.0), 42.0);
    }

    #[test]
    fn test_default_brake_is_brake() {
        assert_eq!(BrakeMode::default(), BrakeMode::Brake);
    }

    #[test]
    fn test_boxed_group_forwards() {
        struct Counter {
            degrees: f64,
        }

        impl ActuatorGroup for Counter {
            fn spin(&mut self, velocity: f64) {
                self.degrees += velocity;
            }
            fn stop(&mut self, _mode: BrakeMode) {}
            fn position(&self, unit: RotationUnit) -> f64 {
                unit.from_degrees(self.degrees)
            }
            fn reset_position(&mut self) {
                self.degrees = 0.0;
            }
        }

        let mut group: BoxedGroup = Box::new(Counter { degrees: 0.0 });
        group.spin(360.0);
        assert!((group.position(RotationUnit::Revolutions) - 1.0).abs() < 1e-12);
        group.reset_position();
        assert_eq!(group.position(RotationUnit::Degrees), 0.0);
    }
}
