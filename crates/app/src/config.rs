//! Robot description loaded from JSON

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use chassis::{DriveError, Geometry, HDrive, MotionController, Offsets};
use control::PidConfig;
use drivecore::BrakeMode;
use mechanics::WheelConfig;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Everything needed to build and tune a simulated H-drive.
///
/// Missing fields fall back to the defaults, so a file only needs to list
/// what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RobotConfig {
    pub geometry: Geometry,
    pub straight_pid: PidConfig,
    pub turn_pid: PidConfig,
    pub strafe_pid: PidConfig,
    pub offsets: Offsets,
    pub brake: BrakeMode,
    /// Largest velocity change per loop iteration (percent); absent means unlimited
    pub max_acceleration: Option<f64>,
    pub timeout_ms: Option<u64>,
    /// Plant used for all three wheel groups
    pub wheel: WheelConfig,
    /// Pace the simulation on the wall clock instead of running it flat out
    pub realtime: bool,
    pub log_level: String,
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            // 12.5 in front / 12.75 in back track, 3.25 in wheels, direct drive
            geometry: Geometry {
                track_width: 12.625,
                wheel_radius: 1.625,
                center_wheel_radius: Some(1.625),
                gear_ratio: 1.0,
            },
            straight_pid: PidConfig::pid(0.3, 0.05, 0.002)
                .with_max_integral(10.0)
                .with_error_range(2.0),
            turn_pid: PidConfig::p(0.35).with_error_range(2.0),
            strafe_pid: PidConfig::p(0.3).with_error_range(2.0),
            offsets: Offsets::default(),
            brake: BrakeMode::Brake,
            max_acceleration: None,
            timeout_ms: Some(10_000),
            wheel: WheelConfig::default(),
            realtime: false,
            log_level: "info".to_string(),
        }
    }
}

impl RobotConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Push gains, offsets and limits into a drivetrain
    pub fn apply(&self, drive: &mut HDrive) -> Result<(), DriveError> {
        drive.set_straight_pid(self.straight_pid.clone())?;
        drive.set_turn_pid(self.turn_pid.clone())?;
        drive.set_strafe_pid(self.strafe_pid.clone())?;
        drive.set_offset(self.offsets.straight, self.offsets.turn, self.offsets.strafe)?;
        drive.set_brake_type(self.brake);
        drive.set_max_acceleration(self.max_acceleration.unwrap_or(f64::INFINITY))?;
        drive.set_timeout(self.timeout());
        Ok(())
    }
}
