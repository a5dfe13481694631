//! Demo autonomous routine

use chassis::{HDrive, MotionController, MotionOutcome, RotationUnit};
use log::{info, warn};
use mechanics::{SimClock, SimWorld, SimulatedGroup};

use crate::config::RobotConfig;
use crate::error::AppError;

/// Build an H-drive whose three groups are simulated wheels sharing one world
pub fn build_drive(config: &RobotConfig) -> Result<HDrive, AppError> {
    let world = SimWorld::new();
    let left = world.add(SimulatedGroup::new(config.wheel.clone()));
    let right = world.add(SimulatedGroup::new(config.wheel.clone()));
    let center = world.add(SimulatedGroup::new(config.wheel.clone()));

    let clock = if config.realtime {
        SimClock::realtime(world)
    } else {
        SimClock::new(world)
    };
    let mut drive = HDrive::new(config.geometry, left, right, center)?.with_clock(clock);
    config.apply(&mut drive)?;
    Ok(drive)
}

/// Drive a square-ish path using every kind of motion, then come back to the start
pub fn run(drive: &mut HDrive) -> Result<Vec<MotionOutcome>, AppError> {
    let mut outcomes = Vec::new();

    outcomes.push(drive.straight(24.0, 60.0)?);
    report(drive, "straight");

    outcomes.push(drive.turn(90.0, 50.0)?);
    report(drive, "turn");

    outcomes.push(drive.strafe(12.0, 60.0)?);
    report(drive, "strafe");

    outcomes.push(drive.diagonal(12.0, -12.0, 60.0)?);
    report(drive, "diagonal");

    outcomes.push(drive.turn(-90.0, 50.0)?);
    report(drive, "turn back");

    drive.straight_async(-24.0, 60.0)?;
    info!("reversing in the background");
    outcomes.push(drive.wait_until_settled());
    report(drive, "reverse");

    drive.stop();
    drive.reset_encoders()?;

    for (step, outcome) in outcomes.iter().enumerate() {
        if *outcome != MotionOutcome::Settled {
            warn!("step {} ended {:?}", step + 1, outcome);
        }
    }
    Ok(outcomes)
}

fn report(drive: &HDrive, step: &str) {
    info!(
        "{step}: left {:.1} deg, right {:.1} deg, center {:.1} deg",
        drive.left_encoder(RotationUnit::Degrees),
        drive.right_encoder(RotationUnit::Degrees),
        drive.center_encoder(RotationUnit::Degrees),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_settles_with_defaults() {
        let config = RobotConfig::default();
        let mut drive = build_drive(&config).unwrap();

        let outcomes = run(&mut drive).unwrap();

        assert_eq!(outcomes.len(), 6);
        assert!(outcomes.iter().all(|o| *o == MotionOutcome::Settled), "{outcomes:?}");
        assert_eq!(drive.left_encoder(RotationUnit::Degrees), 0.0);
    }

    #[test]
    fn test_invalid_gains_are_rejected() {
        let mut config = RobotConfig::default();
        config.strafe_pid.sample_period_ms = 0;
        assert!(matches!(build_drive(&config), Err(AppError::Drive(_))));
    }
}
