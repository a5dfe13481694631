//! Kinematic decomposition
//!
//! Each motion axis reads a single displacement out of the wheel encoders and
//! maps a single control output back onto the wheel groups:
//!
//! | axis     | measured          | left | right | center |
//! |----------|-------------------|------|-------|--------|
//! | straight | (left + right)/2  |  +v  |  +v   |   0    |
//! | turn     | (left - right)/2  |  +v  |  -v   |   0    |
//! | strafe   | center            |   0  |   0   |  +v    |

use serde::{Deserialize, Serialize};

use crate::rig::{Mix, Positions};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Straight,
    Turn,
    Strafe,
}

impl Axis {
    /// Axis displacement in encoder degrees
    pub fn measure(self, positions: &Positions) -> f64 {
        match self {
            Axis::Straight => (positions.left + positions.right) / 2.0,
            Axis::Turn => (positions.left - positions.right) / 2.0,
            Axis::Strafe => positions.center,
        }
    }

    /// The share of a group command that moves this axis, inverse of `mix`
    pub fn project(self, mix: &Mix) -> f64 {
        match self {
            Axis::Straight => (mix.left + mix.right) / 2.0,
            Axis::Turn => (mix.left - mix.right) / 2.0,
            Axis::Strafe => mix.center,
        }
    }

    /// Per-group velocities for an axis output
    pub fn mix(self, output: f64) -> Mix {
        match self {
            Axis::Straight => Mix { left: output, right: output, center: 0.0 },
            Axis::Turn => Mix { left: output, right: -output, center: 0.0 },
            Axis::Strafe => Mix { left: 0.0, right: 0.0, center: output },
        }
    }
}

/// Steady-state corrections, in the units of each command (inches or degrees)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Offsets {
    pub straight: f64,
    pub turn: f64,
    pub strafe: f64,
}

/// Extend a request by `offset` in its direction of travel; zero stays zero
pub fn apply_offset(value: f64, offset: f64) -> f64 {
    if value == 0.0 {
        0.0
    } else {
        value + offset * value.signum()
    }
}

/// Split one speed cap across two concurrent axes so both finish together
///
/// The axis with the longer travel keeps `max_speed`; the other is scaled by
/// its share of that travel.
pub fn proportional_caps(first: f64, second: f64, max_speed: f64) -> (f64, f64) {
    let longest = first.abs().max(second.abs());
    if longest == 0.0 {
        return (max_speed, max_speed);
    }
    (
        max_speed * first.abs() / longest,
        max_speed * second.abs() / longest,
    )
}
