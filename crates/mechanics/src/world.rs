//! Simulation world and clock
//!
//! `SimClock` implements `drivecore::Clock` by stepping every registered wheel
//! group for the requested period. By default it returns immediately, so a
//! control loop that would take seconds on a robot finishes in microseconds.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use drivecore::Clock;
use log::trace;

use crate::wheel::SimulatedGroup;

/// Fixed-timestep integration substep (s)
const MAX_SUBSTEP: f64 = 1e-3;

/// The set of simulated groups advanced together
#[derive(Debug, Clone, Default)]
pub struct SimWorld {
    groups: Arc<Mutex<Vec<SimulatedGroup>>>,
    elapsed: Arc<Mutex<Duration>>,
}

impl SimWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a group and return a handle sharing its state
    pub fn add(&self, group: SimulatedGroup) -> SimulatedGroup {
        lock(&self.groups).push(group.clone());
        group
    }

    /// Advance all groups, splitting long periods into substeps
    pub fn step(&self, period: Duration) {
        let total = period.as_secs_f64();
        let substeps = (total / MAX_SUBSTEP - 1e-6).ceil().max(1.0) as usize;
        let dt = total / substeps as f64;

        let groups = lock(&self.groups);
        for _ in 0..substeps {
            for group in groups.iter() {
                group.step(dt);
            }
        }
        drop(groups);

        let mut elapsed = lock(&self.elapsed);
        *elapsed += period;
        trace!("sim world advanced to {:.3}s", elapsed.as_secs_f64());
    }

    /// Simulated time since the world was created
    pub fn elapsed(&self) -> Duration {
        *lock(&self.elapsed)
    }
}

/// Clock that drives a `SimWorld`
#[derive(Debug, Clone)]
pub struct SimClock {
    world: SimWorld,
    realtime: bool,
}

impl SimClock {
    /// Step the world and return immediately
    pub fn new(world: SimWorld) -> Self {
        Self { world, realtime: false }
    }

    /// Step the world and also wait the period on the wall clock
    pub fn realtime(world: SimWorld) -> Self {
        Self { world, realtime: true }
    }

    pub fn world(&self) -> &SimWorld {
        &self.world
    }
}

impl Clock for SimClock {
    fn sleep(&self, period: Duration) {
        self.world.step(period);
        if self.realtime {
            std::thread::sleep(period);
        }
    }

    fn now(&self) -> Duration {
        self.world.elapsed()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wheel::WheelConfig;
    use drivecore::ActuatorGroup;

    #[test]
    fn test_clock_steps_registered_groups() {
        let world = SimWorld::new();
        let mut group = world.add(SimulatedGroup::new(WheelConfig::default()));
        let idle = world.add(SimulatedGroup::new(WheelConfig::default()));
        let clock = SimClock::new(world);

        group.spin(100.0);
        for _ in 0..100 {
            clock.sleep(Duration::from_millis(10));
        }

        assert!(group.true_position() > 0.0);
        assert_eq!(idle.true_position(), 0.0);
        assert_eq!(clock.now(), Duration::from_secs(1));
    }

    #[test]
    fn test_substeps_match_fine_stepping() {
        let coarse_world = SimWorld::new();
        let mut coarse = coarse_world.add(SimulatedGroup::new(WheelConfig::default()));
        let mut fine = SimulatedGroup::new(WheelConfig::default());

        coarse.spin(40.0);
        fine.spin(40.0);
        coarse_world.step(Duration::from_millis(20));
        for _ in 0..20 {
            fine.step(0.001);
        }

        assert!((coarse.true_position() - fine.true_position()).abs() < 1e-9);
    }
}
