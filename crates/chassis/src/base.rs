//! State shared by every drivetrain strategy
//!
//! `DriveBase` owns the wheel groups, the stored configuration and the motion
//! scheduler. It turns validated requests into `MotionPlan`s and runs them
//! inline or in the background.

use std::sync::Arc;
use std::time::Duration;

use control::{PidConfig, SlewLimiter};
use drivecore::{BrakeMode, Clock, RotationUnit, SystemClock};
use log::{debug, info};

use crate::error::DriveError;
use crate::geometry::Geometry;
use crate::kinematics::{apply_offset, proportional_caps, Axis, Offsets};
use crate::motion::{AxisLoop, MotionOutcome, MotionPlan};
use crate::rig::{self, Mix, Rig, SharedRig, Side};
use crate::task::{Scheduler, StopHandle};

/// Velocity commands are percentages of free speed
const MAX_SPEED: f64 = 100.0;

/// Configuration captured by every new motion
#[derive(Debug, Clone, PartialEq)]
pub struct DriveSettings {
    pub straight: PidConfig,
    pub turn: PidConfig,
    pub strafe: PidConfig,
    pub offsets: Offsets,
    pub brake: BrakeMode,
    /// Largest velocity change per loop iteration (percent); infinite when unlimited
    pub max_acceleration: f64,
    pub timeout: Option<Duration>,
}

impl Default for DriveSettings {
    fn default() -> Self {
        let gains = PidConfig::p(0.3).with_error_range(2.0);
        Self {
            straight: gains.clone(),
            turn: gains.clone(),
            strafe: gains,
            offsets: Offsets::default(),
            brake: BrakeMode::default(),
            max_acceleration: f64::INFINITY,
            timeout: None,
        }
    }
}

pub struct DriveBase {
    geometry: Geometry,
    rig: SharedRig,
    clock: Arc<dyn Clock>,
    scheduler: Scheduler,
    settings: DriveSettings,
    halted: bool,
}

impl DriveBase {
    pub fn new(geometry: Geometry, rig: Rig) -> Result<Self, DriveError> {
        geometry.validate()?;
        Ok(Self {
            geometry,
            rig: rig.into_shared(),
            clock: Arc::new(SystemClock::new()),
            scheduler: Scheduler::new(),
            settings: DriveSettings::default(),
            halted: false,
        })
    }

    /// Replace the time source used by later motions
    pub fn set_clock(&mut self, clock: Arc<dyn Clock>) {
        self.clock = clock;
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn settings(&self) -> &DriveSettings {
        &self.settings
    }

    pub fn has_center(&self) -> bool {
        rig::lock(&self.rig).has_center()
    }

    pub fn set_pid(&mut self, axis: Axis, config: PidConfig) -> Result<(), DriveError> {
        config.validate()?;
        debug!("{:?} gains set to {:?}", axis, config);
        match axis {
            Axis::Straight => self.settings.straight = config,
            Axis::Turn => self.settings.turn = config,
            Axis::Strafe => self.settings.strafe = config,
        }
        Ok(())
    }

    pub fn set_offsets(&mut self, offsets: Offsets) -> Result<(), DriveError> {
        for (name, value) in [
            ("straight", offsets.straight),
            ("turn", offsets.turn),
            ("strafe", offsets.strafe),
        ] {
            if !value.is_finite() {
                return Err(DriveError::InvalidRequest(format!(
                    "{name} offset must be finite, got {value}"
                )));
            }
        }
        self.settings.offsets = offsets;
        Ok(())
    }

    pub fn set_brake(&mut self, brake: BrakeMode) {
        self.settings.brake = brake;
    }

    /// `f64::INFINITY` removes the limit
    pub fn set_max_acceleration(&mut self, max_acceleration: f64) -> Result<(), DriveError> {
        SlewLimiter::new(max_acceleration)?;
        self.settings.max_acceleration = max_acceleration;
        Ok(())
    }

    pub fn set_timeout(&mut self, timeout: Option<Duration>) {
        self.settings.timeout = timeout;
    }

    pub fn straight_plan(&self, distance: f64, max_speed: f64) -> Result<MotionPlan, DriveError> {
        let distance = finite("distance", distance)?;
        let max_speed = speed(max_speed)?;
        let inches = apply_offset(distance, self.settings.offsets.straight);
        let travel = self.geometry.straight_degrees(inches);
        Ok(self.plan("straight").with_axis(self.axis(Axis::Straight, travel, max_speed)?))
    }

    /// Positive angles turn clockwise
    pub fn turn_plan(&self, angle: f64, max_speed: f64) -> Result<MotionPlan, DriveError> {
        let angle = finite("angle", angle)?;
        let max_speed = speed(max_speed)?;
        let degrees = apply_offset(angle, self.settings.offsets.turn);
        let travel = self.geometry.turn_degrees(degrees);
        Ok(self.plan("turn").with_axis(self.axis(Axis::Turn, travel, max_speed)?))
    }

    /// Positive distances strafe right
    pub fn strafe_plan(&self, distance: f64, max_speed: f64) -> Result<MotionPlan, DriveError> {
        let distance = finite("distance", distance)?;
        let max_speed = speed(max_speed)?;
        let travel = self.strafe_travel(distance)?;
        Ok(self.plan("strafe").with_axis(self.axis(Axis::Strafe, travel, max_speed)?))
    }

    /// Straight and strafe together, with caps scaled so both axes arrive at once
    pub fn diagonal_plan(
        &self,
        forward: f64,
        sideways: f64,
        max_speed: f64,
    ) -> Result<MotionPlan, DriveError> {
        let forward = finite("forward distance", forward)?;
        let sideways = finite("sideways distance", sideways)?;
        let max_speed = speed(max_speed)?;

        let straight_travel = self
            .geometry
            .straight_degrees(apply_offset(forward, self.settings.offsets.straight));
        let strafe_travel = self.strafe_travel(sideways)?;

        // Share the cap by distance on the ground, not by encoder degrees
        let (straight_cap, strafe_cap) = proportional_caps(forward, sideways, max_speed);
        Ok(self
            .plan("diagonal")
            .with_axis(self.axis(Axis::Straight, straight_travel, straight_cap)?)
            .with_axis(self.axis(Axis::Strafe, strafe_travel, strafe_cap)?))
    }

    fn strafe_travel(&self, distance: f64) -> Result<f64, DriveError> {
        if !self.has_center() {
            return Err(DriveError::MissingCenterGroup);
        }
        let inches = apply_offset(distance, self.settings.offsets.strafe);
        self.geometry
            .strafe_degrees(inches)
            .ok_or_else(|| DriveError::Geometry("center wheel radius is not set".to_string()))
    }

    fn plan(&self, name: &'static str) -> MotionPlan {
        MotionPlan::new(name, self.settings.brake, self.settings.timeout)
    }

    fn axis(&self, axis: Axis, travel: f64, max_speed: f64) -> Result<AxisLoop, DriveError> {
        let config = match axis {
            Axis::Straight => &self.settings.straight,
            Axis::Turn => &self.settings.turn,
            Axis::Strafe => &self.settings.strafe,
        };
        let slew = SlewLimiter::new(self.settings.max_acceleration)?;
        Ok(AxisLoop::new(axis, config.clone(), travel, max_speed, slew))
    }

    /// Run a plan on the calling thread
    pub fn run_blocking(&mut self, plan: MotionPlan) -> MotionOutcome {
        if plan.is_trivial() {
            debug!("{} has nothing to do", plan.name());
            return self.scheduler.run_blocking(|_| MotionOutcome::Settled);
        }
        self.halted = false;
        let rig = Arc::clone(&self.rig);
        let clock = Arc::clone(&self.clock);
        self.scheduler
            .run_blocking(move |cancel| plan.run(&rig, clock.as_ref(), cancel))
    }

    /// Run a plan in the background, replacing any motion in flight
    pub fn run_async(&mut self, plan: MotionPlan) -> Result<(), DriveError> {
        if plan.is_trivial() {
            debug!("{} has nothing to do", plan.name());
            self.scheduler.run_blocking(|_| MotionOutcome::Settled);
            return Ok(());
        }
        self.halted = false;
        let rig = Arc::clone(&self.rig);
        let clock = Arc::clone(&self.clock);
        let name = plan.name();
        self.scheduler
            .run_async(name, move |cancel| plan.run(&rig, clock.as_ref(), cancel))
    }

    /// Open-loop velocity command, after stopping any motion in flight
    pub fn spin(&mut self, mix: Mix) {
        self.scheduler.stop();
        self.halted = false;
        rig::lock(&self.rig).spin(mix);
    }

    /// Cancel the motion in flight and stop every group with the configured brake
    pub fn stop(&mut self) {
        let cancelled = self.scheduler.stop();
        if self.halted && cancelled.is_none() {
            return;
        }
        rig::lock(&self.rig).stop(self.settings.brake);
        self.halted = true;
        info!("drivetrain stopped ({:?})", self.settings.brake);
    }

    /// Block until the background motion exits.
    ///
    /// With nothing in flight, reports how the last motion ended (`Stopped`
    /// if it was cancelled), or `Settled` before the first motion.
    pub fn wait(&mut self) -> MotionOutcome {
        self.scheduler.wait()
    }

    /// Handle another thread can use to cancel the motion in flight,
    /// including a blocking one
    pub fn stop_handle(&self) -> StopHandle {
        self.scheduler.stop_handle()
    }

    pub fn is_moving(&self) -> bool {
        self.scheduler.is_busy()
    }

    pub fn reset_encoders(&mut self) -> Result<(), DriveError> {
        if self.scheduler.is_busy() {
            return Err(DriveError::MotionInFlight);
        }
        rig::lock(&self.rig).reset_positions();
        debug!("encoders reset");
        Ok(())
    }

    pub fn encoder(&self, side: Side, unit: RotationUnit) -> f64 {
        rig::lock(&self.rig).position(side, unit)
    }
}

fn finite(name: &str, value: f64) -> Result<f64, DriveError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(DriveError::InvalidRequest(format!(
            "{name} must be finite, got {value}"
        )))
    }
}

/// Speed caps are taken by magnitude and saturate at 100 %
fn speed(max_speed: f64) -> Result<f64, DriveError> {
    if !max_speed.is_finite() || max_speed == 0.0 {
        return Err(DriveError::InvalidRequest(format!(
            "max speed must be finite and non-zero, got {max_speed}"
        )));
    }
    Ok(max_speed.abs().min(MAX_SPEED))
}
