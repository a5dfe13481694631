//! Two-sided drivetrain

use std::sync::Arc;

use drivecore::{ActuatorGroup, Clock};

use crate::base::DriveBase;
use crate::controller::MotionController;
use crate::error::DriveError;
use crate::geometry::Geometry;
use crate::kinematics::Offsets;
use crate::rig::Rig;

/// Tank drivetrain: left and right groups, straight moves and point turns
pub struct Tank {
    base: DriveBase,
}

impl Tank {
    pub fn new<L, R>(geometry: Geometry, left: L, right: R) -> Result<Self, DriveError>
    where
        L: ActuatorGroup + Send + 'static,
        R: ActuatorGroup + Send + 'static,
    {
        let rig = Rig::new(Box::new(left), Box::new(right), None);
        Ok(Self {
            base: DriveBase::new(geometry, rig)?,
        })
    }

    /// Pace motion loops with `clock` instead of the wall clock
    pub fn with_clock<C: Clock + 'static>(mut self, clock: C) -> Self {
        self.base.set_clock(Arc::new(clock));
        self
    }

    /// Corrections added to every straight distance (inches) and turn angle (degrees)
    pub fn set_offset(&mut self, straight: f64, turn: f64) -> Result<(), DriveError> {
        self.base.set_offsets(Offsets {
            straight,
            turn,
            strafe: 0.0,
        })
    }
}

impl MotionController for Tank {
    fn drive(&self) -> &DriveBase {
        &self.base
    }

    fn drive_mut(&mut self) -> &mut DriveBase {
        &mut self.base
    }
}
