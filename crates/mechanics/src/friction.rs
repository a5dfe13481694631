//! Wheel friction models
//!
//! Friction acts on a simulated wheel group while it coasts. Values are
//! decelerations in deg/s² so they can be integrated straight into the wheel's
//! angular velocity.

use serde::{Deserialize, Serialize};

/// Friction model for a coasting wheel group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrictionModel {
    /// No friction
    None,
    /// Coulomb (dry) friction: constant deceleration opposing motion
    Coulomb {
        /// Deceleration magnitude (deg/s²)
        deceleration: f64,
    },
    /// Viscous friction (proportional to velocity)
    Viscous {
        /// Damping coefficient (1/s)
        damping: f64,
    },
    /// Combined Coulomb + viscous friction
    Combined {
        deceleration: f64,
        damping: f64,
    },
}

impl Default for FrictionModel {
    fn default() -> Self {
        FrictionModel::Viscous { damping: 4.0 }
    }
}

impl FrictionModel {
    /// Compute the deceleration acting on a wheel spinning at `velocity` deg/s
    ///
    /// Uses a small velocity threshold for Coulomb friction so the wheel comes
    /// to rest instead of chattering around zero.
    pub fn compute(&self, velocity: f64) -> f64 {
        const STICTION_THRESHOLD: f64 = 0.001;

        let coulomb = |deceleration: f64| {
            if velocity.abs() < STICTION_THRESHOLD {
                0.0
            } else {
                -deceleration * velocity.signum()
            }
        };

        match self {
            FrictionModel::None => 0.0,
            FrictionModel::Coulomb { deceleration } => coulomb(*deceleration),
            FrictionModel::Viscous { damping } => -damping * velocity,
            FrictionModel::Combined { deceleration, damping } => {
                coulomb(*deceleration) - damping * velocity
            }
        }
    }

    /// Apply friction to `velocity` over `dt` seconds without reversing its direction
    pub fn decay(&self, velocity: f64, dt: f64) -> f64 {
        let next = velocity + self.compute(velocity) * dt;
        if next.signum() != velocity.signum() {
            0.0
        } else {
            next
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_keeps_velocity() {
        assert_eq!(FrictionModel::None.decay(120.0, 0.01), 120.0);
    }

    #[test]
    fn test_viscous_opposes_motion() {
        let friction = FrictionModel::Viscous { damping: 2.0 };
        assert!(friction.compute(100.0) < 0.0);
        assert!(friction.compute(-100.0) > 0.0);
        assert!((friction.decay(100.0, 0.1) - 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_coulomb_never_reverses() {
        let friction = FrictionModel::Coulomb { deceleration: 500.0 };
        assert_eq!(friction.decay(3.0, 0.1), 0.0);
        assert_eq!(friction.decay(-3.0, 0.1), 0.0);
        assert_eq!(friction.compute(0.0), 0.0);
    }

    #[test]
    fn test_combined_sums_terms() {
        let friction = FrictionModel::Combined { deceleration: 10.0, damping: 1.0 };
        assert!((friction.compute(50.0) - (-60.0)).abs() < 1e-9);
    }
}
