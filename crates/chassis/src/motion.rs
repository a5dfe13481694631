//! The common control loop shared by every motion command
//!
//! A `MotionPlan` is a snapshot of everything one command needs: the active
//! axes with their own PID state, speed caps and acceleration limiters, plus
//! the brake mode and watchdog taken from the drivetrain when the command was
//! issued. Configuration changes made while a plan runs never reach it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use control::{PidConfig, PidController, SlewLimiter};
use drivecore::{BrakeMode, Clock};
use log::{debug, info, trace, warn};

use crate::kinematics::Axis;
use crate::rig::{self, Mix, Positions, SharedRig};

/// How a motion ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionOutcome {
    /// Every active axis settled on its target
    Settled,
    /// Cancelled by `stop` or preempted by a newer command
    Stopped,
    /// The watchdog expired before the axes settled
    TimedOut,
}

/// One PID-controlled axis of a motion
#[derive(Debug, Clone)]
pub struct AxisLoop {
    axis: Axis,
    pid: PidController,
    travel: f64,
    max_speed: f64,
    slew: SlewLimiter,
}

impl AxisLoop {
    /// `travel` is the requested displacement in encoder degrees, relative to
    /// wherever the axis is when the loop starts.
    pub fn new(axis: Axis, config: PidConfig, travel: f64, max_speed: f64, slew: SlewLimiter) -> Self {
        Self {
            axis,
            pid: PidController::new(config),
            travel,
            max_speed: max_speed.abs(),
            slew,
        }
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn travel(&self) -> f64 {
        self.travel
    }

    pub fn max_speed(&self) -> f64 {
        self.max_speed
    }

    /// Arm the loop from the current readings. The limiter ramps from
    /// whatever the groups were last told, not from rest.
    fn begin(&mut self, positions: &Positions, commanded: &Mix) {
        self.pid.reset();
        self.slew.reset_to(self.axis.project(commanded));
        self.pid.set_target(self.axis.measure(positions) + self.travel);
    }

    fn step(&mut self, positions: &Positions, dt: f64) -> f64 {
        let output = self.pid.compute_with_dt(self.axis.measure(positions), dt);
        let capped = output.max(-self.max_speed).min(self.max_speed);
        self.slew.limit(capped)
    }

    fn period(&self) -> Duration {
        Duration::from_millis(self.pid.config().sample_period_ms.max(1))
    }
}

/// Everything a single motion command needs to run to completion
#[derive(Debug, Clone)]
pub struct MotionPlan {
    name: &'static str,
    axes: Vec<AxisLoop>,
    brake: BrakeMode,
    timeout: Option<Duration>,
}

impl MotionPlan {
    pub fn new(name: &'static str, brake: BrakeMode, timeout: Option<Duration>) -> Self {
        Self {
            name,
            axes: Vec::new(),
            brake,
            timeout,
        }
    }

    pub fn with_axis(mut self, axis: AxisLoop) -> Self {
        self.axes.push(axis);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn axes(&self) -> &[AxisLoop] {
        &self.axes
    }

    pub fn brake(&self) -> BrakeMode {
        self.brake
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// A plan with nothing to move finishes without touching the groups
    pub fn is_trivial(&self) -> bool {
        self.axes.iter().all(|axis| axis.travel == 0.0)
    }

    /// Sampling period: the fastest of the active axes
    pub fn period(&self) -> Duration {
        self.axes
            .iter()
            .map(AxisLoop::period)
            .min()
            .unwrap_or(Duration::from_millis(10))
    }

    /// Run the loop until every axis settles, `cancel` is raised or the watchdog expires.
    ///
    /// The rig lock is held only while sampling and commanding; the clock
    /// sleep between iterations happens unlocked. Groups are stopped with the
    /// plan's brake mode before returning.
    ///
    /// Every axis integrates over the time that actually passed between
    /// samples, whatever its own configured period.
    pub fn run(mut self, rig: &SharedRig, clock: &dyn Clock, cancel: &AtomicBool) -> MotionOutcome {
        let period = self.period();
        let started = clock.now();
        let mut sampled_at = started.saturating_sub(period);

        {
            let rig = rig::lock(rig);
            let positions = rig.positions();
            let commanded = rig.commanded();
            for axis in &mut self.axes {
                axis.begin(&positions, &commanded);
            }
        }
        info!(
            "{} started: {}",
            self.name,
            self.axes
                .iter()
                .map(|a| format!("{:?} {:.1} deg @ {:.0}%", a.axis, a.travel, a.max_speed))
                .collect::<Vec<_>>()
                .join(", ")
        );

        let mut iterations: u64 = 0;
        let outcome = loop {
            if cancel.load(Ordering::SeqCst) {
                break MotionOutcome::Stopped;
            }

            let now = clock.now();
            let elapsed = now.saturating_sub(sampled_at);
            let dt = if elapsed.is_zero() { period } else { elapsed }.as_secs_f64();
            sampled_at = now;

            let settled = {
                let mut rig = rig::lock(rig);
                let positions = rig.positions();
                let mut mix = Mix::default();
                let mut settled = true;
                for axis in &mut self.axes {
                    let velocity = axis.step(&positions, dt);
                    mix += axis.axis.mix(velocity);
                    settled &= axis.pid.is_settled();
                    trace!(
                        "{} {:?}: error {:.2} deg, velocity {:.2}%",
                        self.name,
                        axis.axis,
                        axis.pid.error(),
                        velocity
                    );
                }
                rig.spin(mix);
                settled
            };
            iterations += 1;

            if settled {
                debug!("{} settled after {} iterations", self.name, iterations);
                break MotionOutcome::Settled;
            }

            if let Some(limit) = self.timeout {
                if clock.now().saturating_sub(started) >= limit {
                    warn!("{} timed out after {:?}", self.name, limit);
                    break MotionOutcome::TimedOut;
                }
            }

            clock.sleep(period);
        };

        rig::lock(rig).stop(self.brake);
        info!("{} finished: {:?}", self.name, outcome);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rig::Rig;
    use drivecore::{ActuatorGroup, RotationUnit};
    use std::sync::{Arc, Mutex};

    /// Ideal group: position follows commanded velocity exactly, one degree per
    /// percent per step.
    #[derive(Clone, Default)]
    struct IdealGroup {
        state: Arc<Mutex<(f64, f64, Vec<f64>, Vec<BrakeMode>)>>,
    }

    impl IdealGroup {
        fn advance(&self) {
            let mut state = self.state.lock().unwrap();
            state.0 += state.1;
        }
        fn commands(&self) -> Vec<f64> {
            self.state.lock().unwrap().2.clone()
        }
        fn brakes(&self) -> Vec<BrakeMode> {
            self.state.lock().unwrap().3.clone()
        }
    }

    impl ActuatorGroup for IdealGroup {
        fn spin(&mut self, velocity: f64) {
            let mut state = self.state.lock().unwrap();
            state.1 = velocity;
            state.2.push(velocity);
        }
        fn stop(&mut self, mode: BrakeMode) {
            let mut state = self.state.lock().unwrap();
            state.1 = 0.0;
            state.3.push(mode);
        }
        fn position(&self, unit: RotationUnit) -> f64 {
            unit.from_degrees(self.state.lock().unwrap().0)
        }
        fn reset_position(&mut self) {
            self.state.lock().unwrap().0 = 0.0;
        }
    }

    struct StepClock {
        groups: Vec<IdealGroup>,
        ticks: Mutex<u32>,
    }

    impl Clock for StepClock {
        fn sleep(&self, _period: Duration) {
            for group in &self.groups {
                group.advance();
            }
            *self.ticks.lock().unwrap() += 1;
        }
        fn now(&self) -> Duration {
            Duration::from_millis(10 * *self.ticks.lock().unwrap() as u64)
        }
    }

    fn ideal_rig() -> (SharedRig, StepClock, [IdealGroup; 3]) {
        let groups = [IdealGroup::default(), IdealGroup::default(), IdealGroup::default()];
        let rig = Rig::new(
            Box::new(groups[0].clone()),
            Box::new(groups[1].clone()),
            Some(Box::new(groups[2].clone())),
        )
        .into_shared();
        let clock = StepClock {
            groups: groups.to_vec(),
            ticks: Mutex::new(0),
        };
        (rig, clock, groups)
    }

    fn p_axis(axis: Axis, travel: f64, max_speed: f64) -> AxisLoop {
        let config = PidConfig::p(0.5).with_error_range(0.5);
        AxisLoop::new(axis, config, travel, max_speed, SlewLimiter::unlimited())
    }

    #[test]
    fn test_straight_plan_converges_and_brakes() {
        let (rig, clock, [left, right, center]) = ideal_rig();
        let plan = MotionPlan::new("straight", BrakeMode::Hold, None)
            .with_axis(p_axis(Axis::Straight, 200.0, 50.0));

        let outcome = plan.run(&rig, &clock, &AtomicBool::new(false));

        assert_eq!(outcome, MotionOutcome::Settled);
        assert!((left.position(RotationUnit::Degrees) - 200.0).abs() <= 0.5);
        assert!((right.position(RotationUnit::Degrees) - 200.0).abs() <= 0.5);
        assert!(left.commands().iter().all(|v| v.abs() <= 50.0));
        assert!(center.commands().iter().all(|&v| v == 0.0));
        assert_eq!(left.brakes(), vec![BrakeMode::Hold]);
    }

    #[test]
    fn test_targets_are_relative_to_start() {
        let (rig, clock, [mut left, mut right, _]) = ideal_rig();
        left.spin(1.0);
        right.spin(1.0);
        clock.sleep(Duration::from_millis(10));
        assert_eq!(left.position(RotationUnit::Degrees), 1.0);

        let plan = MotionPlan::new("straight", BrakeMode::Brake, None)
            .with_axis(p_axis(Axis::Straight, 10.0, 100.0));
        plan.run(&rig, &clock, &AtomicBool::new(false));

        assert!((left.position(RotationUnit::Degrees) - 11.0).abs() <= 0.5);
    }

    #[test]
    fn test_cancelled_plan_stops_without_moving() {
        let (rig, clock, [left, _, _]) = ideal_rig();
        let plan = MotionPlan::new("turn", BrakeMode::Coast, None)
            .with_axis(p_axis(Axis::Turn, 90.0, 50.0));

        let outcome = plan.run(&rig, &clock, &AtomicBool::new(true));

        assert_eq!(outcome, MotionOutcome::Stopped);
        assert!(left.commands().is_empty());
        assert_eq!(left.brakes(), vec![BrakeMode::Coast]);
    }

    #[test]
    fn test_watchdog_ends_unreachable_move() {
        let (rig, clock, _) = ideal_rig();
        // Zero gain never moves the axis
        let axis = AxisLoop::new(Axis::Strafe, PidConfig::p(0.0), 100.0, 50.0, SlewLimiter::unlimited());
        let plan = MotionPlan::new("strafe", BrakeMode::Brake, Some(Duration::from_millis(200)))
            .with_axis(axis);

        let outcome = plan.run(&rig, &clock, &AtomicBool::new(false));

        assert_eq!(outcome, MotionOutcome::TimedOut);
        assert_eq!(clock.now(), Duration::from_millis(200));
    }

    #[test]
    fn test_slew_bounds_consecutive_commands() {
        let (rig, clock, [left, _, _]) = ideal_rig();
        let axis = AxisLoop::new(
            Axis::Straight,
            PidConfig::p(1.0).with_error_range(0.5),
            300.0,
            80.0,
            SlewLimiter::new(5.0).unwrap(),
        );
        MotionPlan::new("straight", BrakeMode::Brake, None)
            .with_axis(axis)
            .run(&rig, &clock, &AtomicBool::new(false));

        let mut prev = 0.0;
        for v in left.commands() {
            assert!((v - prev).abs() <= 5.0 + 1e-9, "jump from {} to {}", prev, v);
            prev = v;
        }
    }

    #[test]
    fn test_period_uses_fastest_axis() {
        let slow = AxisLoop::new(Axis::Straight, PidConfig::p(1.0).with_sample_period_ms(50), 1.0, 10.0, SlewLimiter::unlimited());
        let fast = AxisLoop::new(Axis::Strafe, PidConfig::p(1.0).with_sample_period_ms(20), 1.0, 10.0, SlewLimiter::unlimited());
        let plan = MotionPlan::new("diagonal", BrakeMode::Brake, None)
            .with_axis(slow)
            .with_axis(fast);
        assert_eq!(plan.period(), Duration::from_millis(20));
    }

    #[test]
    fn test_zero_travel_is_trivial() {
        let plan = MotionPlan::new("straight", BrakeMode::Brake, None)
            .with_axis(p_axis(Axis::Straight, 0.0, 50.0));
        assert!(plan.is_trivial());
    }

    /// Clock whose time passes but whose groups never move
    fn frozen_clock() -> StepClock {
        StepClock {
            groups: Vec::new(),
            ticks: Mutex::new(0),
        }
    }

    #[test]
    fn test_slow_axis_integrates_real_elapsed_time() {
        let (rig, _, [left, _, _]) = ideal_rig();
        let clock = frozen_clock();
        let slow = AxisLoop::new(
            Axis::Straight,
            PidConfig::pi(0.0, 0.01).with_sample_period_ms(50),
            100.0,
            100.0,
            SlewLimiter::unlimited(),
        );
        let fast = AxisLoop::new(
            Axis::Strafe,
            PidConfig::p(0.0).with_sample_period_ms(10),
            100.0,
            100.0,
            SlewLimiter::unlimited(),
        );
        let plan = MotionPlan::new("diagonal", BrakeMode::Brake, Some(Duration::from_secs(1)))
            .with_axis(slow)
            .with_axis(fast);

        assert_eq!(plan.run(&rig, &clock, &AtomicBool::new(false)), MotionOutcome::TimedOut);

        // 101 samples 10 ms apart with a constant error of 100
        let output = left.commands().last().copied().unwrap();
        assert!((output - 1.01).abs() < 1e-6, "integral term was {}", output);
    }

    #[test]
    fn test_limiter_ramps_from_commanded_velocity() {
        let (rig, _, [left, _, _]) = ideal_rig();
        rig::lock(&rig).spin(Mix { left: 80.0, right: 80.0, center: 0.0 });

        let axis = AxisLoop::new(
            Axis::Straight,
            PidConfig::p(1.0),
            300.0,
            50.0,
            SlewLimiter::new(5.0).unwrap(),
        );
        MotionPlan::new("straight", BrakeMode::Brake, Some(Duration::from_millis(50)))
            .with_axis(axis)
            .run(&rig, &frozen_clock(), &AtomicBool::new(false));

        assert_eq!(left.commands()[..4], [80.0, 75.0, 70.0, 65.0]);
        assert_eq!(rig::lock(&rig).commanded(), Mix::default());
    }
}
