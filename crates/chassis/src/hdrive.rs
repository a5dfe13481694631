//! H-drive: a tank drivetrain plus a center wheel that strafes sideways

use std::sync::Arc;

use control::PidConfig;
use drivecore::{ActuatorGroup, Clock, RotationUnit};

use crate::base::DriveBase;
use crate::controller::MotionController;
use crate::error::DriveError;
use crate::geometry::Geometry;
use crate::kinematics::{Axis, Offsets};
use crate::motion::MotionOutcome;
use crate::rig::{Mix, Rig, Side};

pub struct HDrive {
    base: DriveBase,
}

impl HDrive {
    /// Build an H-drive. `geometry` must carry a center wheel radius.
    pub fn new<L, R, C>(geometry: Geometry, left: L, right: R, center: C) -> Result<Self, DriveError>
    where
        L: ActuatorGroup + Send + 'static,
        R: ActuatorGroup + Send + 'static,
        C: ActuatorGroup + Send + 'static,
    {
        if geometry.center_wheel_radius.is_none() {
            return Err(DriveError::Geometry(
                "an H-drive needs a center wheel radius".to_string(),
            ));
        }
        let rig = Rig::new(Box::new(left), Box::new(right), Some(Box::new(center)));
        Ok(Self {
            base: DriveBase::new(geometry, rig)?,
        })
    }

    /// Pace motion loops with `clock` instead of the wall clock
    pub fn with_clock<T: Clock + 'static>(mut self, clock: T) -> Self {
        self.base.set_clock(Arc::new(clock));
        self
    }

    pub fn set_strafe_pid(&mut self, config: PidConfig) -> Result<(), DriveError> {
        self.base.set_pid(Axis::Strafe, config)
    }

    /// Sideways move; positive distances go right
    pub fn strafe(&mut self, distance: f64, max_speed: f64) -> Result<MotionOutcome, DriveError> {
        let plan = self.base.strafe_plan(distance, max_speed)?;
        Ok(self.base.run_blocking(plan))
    }

    pub fn strafe_async(&mut self, distance: f64, max_speed: f64) -> Result<(), DriveError> {
        let plan = self.base.strafe_plan(distance, max_speed)?;
        self.base.run_async(plan)
    }

    /// Forward and sideways at once, both axes finishing together
    pub fn diagonal(
        &mut self,
        forward: f64,
        sideways: f64,
        max_speed: f64,
    ) -> Result<MotionOutcome, DriveError> {
        let plan = self.base.diagonal_plan(forward, sideways, max_speed)?;
        Ok(self.base.run_blocking(plan))
    }

    pub fn diagonal_async(&mut self, forward: f64, sideways: f64, max_speed: f64) -> Result<(), DriveError> {
        let plan = self.base.diagonal_plan(forward, sideways, max_speed)?;
        self.base.run_async(plan)
    }

    /// Open-loop command to every group
    pub fn spin(&mut self, left: f64, right: f64, center: f64) {
        self.base.spin(Mix { left, right, center });
    }

    /// Open-loop command with both sides at the same velocity
    pub fn spin_sides_center(&mut self, sides: f64, center: f64) {
        self.spin(sides, sides, center);
    }

    pub fn center_encoder(&self, unit: RotationUnit) -> f64 {
        self.base.encoder(Side::Center, unit)
    }

    /// Corrections added to straight and strafe distances (inches) and turn angles (degrees)
    pub fn set_offset(&mut self, straight: f64, turn: f64, strafe: f64) -> Result<(), DriveError> {
        self.base.set_offsets(Offsets { straight, turn, strafe })
    }
}

impl MotionController for HDrive {
    fn drive(&self) -> &DriveBase {
        &self.base
    }

    fn drive_mut(&mut self) -> &mut DriveBase {
        &mut self.base
    }
}
