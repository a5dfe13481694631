//! The wheel groups owned by a drivetrain
//!
//! A `Rig` is shared between the foreground drivetrain and at most one motion
//! task. Whoever holds the lock is the only writer of velocity commands.

use std::ops::AddAssign;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use drivecore::{BoxedGroup, BrakeMode, RotationUnit};

pub type SharedRig = Arc<Mutex<Rig>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
    Center,
}

/// Encoder readings of every group, in degrees
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Positions {
    pub left: f64,
    pub right: f64,
    pub center: f64,
}

/// Velocity command for every group, in percent
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Mix {
    pub left: f64,
    pub right: f64,
    pub center: f64,
}

impl AddAssign for Mix {
    fn add_assign(&mut self, other: Mix) {
        self.left += other.left;
        self.right += other.right;
        self.center += other.center;
    }
}

pub struct Rig {
    left: BoxedGroup,
    right: BoxedGroup,
    center: Option<BoxedGroup>,
    commanded: Mix,
}

impl Rig {
    pub fn new(left: BoxedGroup, right: BoxedGroup, center: Option<BoxedGroup>) -> Self {
        Self {
            left,
            right,
            center,
            commanded: Mix::default(),
        }
    }

    pub fn into_shared(self) -> SharedRig {
        Arc::new(Mutex::new(self))
    }

    pub fn has_center(&self) -> bool {
        self.center.is_some()
    }

    /// Read one group. A missing center group reads as zero.
    pub fn position(&self, side: Side, unit: RotationUnit) -> f64 {
        match side {
            Side::Left => self.left.position(unit),
            Side::Right => self.right.position(unit),
            Side::Center => self
                .center
                .as_ref()
                .map_or(0.0, |group| group.position(unit)),
        }
    }

    pub fn positions(&self) -> Positions {
        Positions {
            left: self.position(Side::Left, RotationUnit::Degrees),
            right: self.position(Side::Right, RotationUnit::Degrees),
            center: self.position(Side::Center, RotationUnit::Degrees),
        }
    }

    /// Command every group at once, clamped to ±100 %
    pub fn spin(&mut self, mix: Mix) {
        let mut commanded = Mix {
            left: clamp_velocity(mix.left),
            right: clamp_velocity(mix.right),
            center: 0.0,
        };
        self.left.spin(commanded.left);
        self.right.spin(commanded.right);
        if let Some(center) = self.center.as_mut() {
            commanded.center = clamp_velocity(mix.center);
            center.spin(commanded.center);
        }
        self.commanded = commanded;
    }

    /// Velocities of the last `spin`; zero once stopped
    pub fn commanded(&self) -> Mix {
        self.commanded
    }

    pub fn stop(&mut self, mode: BrakeMode) {
        self.commanded = Mix::default();
        self.left.stop(mode);
        self.right.stop(mode);
        if let Some(center) = self.center.as_mut() {
            center.stop(mode);
        }
    }

    pub fn reset_positions(&mut self) {
        self.left.reset_position();
        self.right.reset_position();
        if let Some(center) = self.center.as_mut() {
            center.reset_position();
        }
    }
}

pub(crate) fn lock(rig: &SharedRig) -> MutexGuard<'_, Rig> {
    rig.lock().unwrap_or_else(PoisonError::into_inner)
}

fn clamp_velocity(velocity: f64) -> f64 {
    if velocity.is_nan() {
        0.0
    } else {
        velocity.clamp(-100.0, 100.0)
    }
}
