//! Physical drivetrain constants and unit conversion
//!
//! All distances are in inches and all angles in degrees. Wheel targets come
//! out in encoder degrees of the driven group.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::error::DriveError;

/// Immutable drivetrain dimensions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    /// Distance between the left and right wheel centers
    pub track_width: f64,
    /// Radius of the side wheels
    pub wheel_radius: f64,
    /// Radius of the strafing wheel, H-drives only
    pub center_wheel_radius: Option<f64>,
    /// Motor rotations per wheel rotation on the sides
    pub gear_ratio: f64,
}

impl Geometry {
    /// Geometry of a two-sided tank drivetrain
    pub fn tank(track_width: f64, wheel_radius: f64, gear_ratio: f64) -> Result<Self, DriveError> {
        let geometry = Self {
            track_width,
            wheel_radius,
            center_wheel_radius: None,
            gear_ratio,
        };
        geometry.validate()?;
        Ok(geometry)
    }

    /// Geometry of an H-drive with a center strafing wheel
    pub fn h_drive(
        track_width: f64,
        wheel_radius: f64,
        center_wheel_radius: f64,
        gear_ratio: f64,
    ) -> Result<Self, DriveError> {
        let geometry = Self {
            track_width,
            wheel_radius,
            center_wheel_radius: Some(center_wheel_radius),
            gear_ratio,
        };
        geometry.validate()?;
        Ok(geometry)
    }

    /// Every constant must be finite and strictly positive
    pub fn validate(&self) -> Result<(), DriveError> {
        let mut fields = vec![
            ("track width", self.track_width),
            ("wheel radius", self.wheel_radius),
            ("gear ratio", self.gear_ratio),
        ];
        if let Some(radius) = self.center_wheel_radius {
            fields.push(("center wheel radius", radius));
        }
        for (name, value) in fields {
            if !value.is_finite() || value <= 0.0 {
                return Err(DriveError::Geometry(format!(
                    "{name} must be finite and positive, got {value}"
                )));
            }
        }
        Ok(())
    }

    pub fn wheel_circumference(&self) -> f64 {
        2.0 * PI * self.wheel_radius
    }

    pub fn center_wheel_circumference(&self) -> Option<f64> {
        self.center_wheel_radius.map(|radius| 2.0 * PI * radius)
    }

    /// Side encoder travel for a straight move of `distance` inches
    pub fn straight_degrees(&self, distance: f64) -> f64 {
        distance / self.wheel_circumference() * self.gear_ratio * 360.0
    }

    /// Per-side encoder travel for an in-place turn of `angle` degrees.
    ///
    /// Positive angles turn clockwise: the left side drives forward.
    pub fn turn_degrees(&self, angle: f64) -> f64 {
        let arc = angle.to_radians() * self.track_width / 2.0;
        self.straight_degrees(arc)
    }

    /// Center encoder travel for a sideways move of `distance` inches
    ///
    /// The center wheel is direct drive; the side gear ratio does not apply.
    pub fn strafe_degrees(&self, distance: f64) -> Option<f64> {
        self.center_wheel_circumference()
            .map(|circumference| distance / circumference * 360.0)
    }
}
