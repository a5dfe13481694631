use control::PidConfig;
use drivecore::{BrakeMode, RotationUnit};
use std::time::Duration;

use crate::base::DriveBase;
use crate::error::DriveError;
use crate::kinematics::Axis;
use crate::motion::MotionOutcome;
use crate::rig::{Mix, Side};
use crate::task::StopHandle;

/// Motion commands every drivetrain supports
///
/// Distances are in inches, angles in degrees (positive clockwise) and speeds
/// in percent of free speed. Blocking commands return how the motion ended;
/// `_async` commands return once the motion is running in the background.
pub trait MotionController {
    fn drive(&self) -> &DriveBase;

    fn drive_mut(&mut self) -> &mut DriveBase;

    fn straight(&mut self, distance: f64, max_speed: f64) -> Result<MotionOutcome, DriveError> {
        let plan = self.drive().straight_plan(distance, max_speed)?;
        Ok(self.drive_mut().run_blocking(plan))
    }

    fn straight_async(&mut self, distance: f64, max_speed: f64) -> Result<(), DriveError> {
        let plan = self.drive().straight_plan(distance, max_speed)?;
        self.drive_mut().run_async(plan)
    }

    fn turn(&mut self, angle: f64, max_speed: f64) -> Result<MotionOutcome, DriveError> {
        let plan = self.drive().turn_plan(angle, max_speed)?;
        Ok(self.drive_mut().run_blocking(plan))
    }

    fn turn_async(&mut self, angle: f64, max_speed: f64) -> Result<(), DriveError> {
        let plan = self.drive().turn_plan(angle, max_speed)?;
        self.drive_mut().run_async(plan)
    }

    /// Open-loop command to both sides
    fn spin_sides(&mut self, left: f64, right: f64) {
        self.drive_mut().spin(Mix { left, right, center: 0.0 });
    }

    fn stop(&mut self) {
        self.drive_mut().stop();
    }

    /// Blocks until the background motion ends and reports how it ended
    fn wait_until_settled(&mut self) -> MotionOutcome {
        self.drive_mut().wait()
    }

    /// Lets another thread cancel the motion in flight, blocking commands included
    fn stop_handle(&self) -> StopHandle {
        self.drive().stop_handle()
    }

    fn is_moving(&self) -> bool {
        self.drive().is_moving()
    }

    fn reset_encoders(&mut self) -> Result<(), DriveError> {
        self.drive_mut().reset_encoders()
    }

    fn left_encoder(&self, unit: RotationUnit) -> f64 {
        self.drive().encoder(Side::Left, unit)
    }

    fn right_encoder(&self, unit: RotationUnit) -> f64 {
        self.drive().encoder(Side::Right, unit)
    }

    fn set_straight_pid(&mut self, config: PidConfig) -> Result<(), DriveError> {
        self.drive_mut().set_pid(Axis::Straight, config)
    }

    fn set_turn_pid(&mut self, config: PidConfig) -> Result<(), DriveError> {
        self.drive_mut().set_pid(Axis::Turn, config)
    }

    fn set_brake_type(&mut self, brake: BrakeMode) {
        self.drive_mut().set_brake(brake);
    }

    /// Largest velocity change per loop iteration; `f64::INFINITY` removes the limit
    fn set_max_acceleration(&mut self, max_acceleration: f64) -> Result<(), DriveError> {
        self.drive_mut().set_max_acceleration(max_acceleration)
    }

    /// Watchdog for every later motion; `None` lets an unreachable target run until stopped
    fn set_timeout(&mut self, timeout: Option<Duration>) {
        self.drive_mut().set_timeout(timeout);
    }
}
