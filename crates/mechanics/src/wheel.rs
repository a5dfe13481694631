//! Simulated wheel group
//!
//! A first-order model of a velocity-controlled motor group driving one wheel:
//! - Spin commands are tracked with a configurable response time constant
//! - Coasting wheels slow down through a `FrictionModel`
//! - Brake and hold stop the wheel, hold also pins its position
//! - The encoder is quantised to whole ticks, with optional uniform noise

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use drivecore::{ActuatorGroup, BrakeMode, RotationUnit};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::friction::FrictionModel;

/// Physical parameters of a simulated wheel group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WheelConfig {
    /// Wheel speed at 100 % command (rpm)
    pub free_speed_rpm: f64,
    /// First-order response time constant (s)
    pub time_constant: f64,
    /// Friction while coasting
    pub friction: FrictionModel,
    /// Encoder resolution
    pub ticks_per_rev: u32,
    /// Peak uniform noise added to every encoder read (degrees)
    pub encoder_noise: f64,
    /// Seed for the encoder noise generator
    pub seed: u64,
}

impl Default for WheelConfig {
    fn default() -> Self {
        Self {
            free_speed_rpm: 200.0,
            time_constant: 0.05,
            friction: FrictionModel::default(),
            ticks_per_rev: 900,
            encoder_noise: 0.0,
            seed: 0,
        }
    }
}

impl WheelConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set free speed (builder pattern)
    pub fn with_free_speed_rpm(mut self, rpm: f64) -> Self {
        self.free_speed_rpm = rpm;
        self
    }

    pub fn with_time_constant(mut self, time_constant: f64) -> Self {
        self.time_constant = time_constant;
        self
    }

    pub fn with_friction(mut self, friction: FrictionModel) -> Self {
        self.friction = friction;
        self
    }

    pub fn with_ticks_per_rev(mut self, ticks: u32) -> Self {
        self.ticks_per_rev = ticks;
        self
    }

    /// Add uniform encoder noise of up to `noise` degrees, seeded for reproducibility
    pub fn with_encoder_noise(mut self, noise: f64, seed: u64) -> Self {
        self.encoder_noise = noise;
        self.seed = seed;
        self
    }

    /// Free speed in deg/s
    pub fn free_speed_dps(&self) -> f64 {
        self.free_speed_rpm * 360.0 / 60.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Command {
    Spin(f64),
    Stopped(BrakeMode),
}

#[derive(Debug)]
struct WheelState {
    config: WheelConfig,
    command: Command,
    /// Angular velocity (deg/s)
    velocity: f64,
    /// True accumulated rotation (deg)
    position: f64,
    /// Rotation at the last encoder reset (deg)
    zero: f64,
    hold_position: Option<f64>,
    jammed: bool,
    commands: Vec<f64>,
    brakes: Vec<BrakeMode>,
    rng: StdRng,
}

impl WheelState {
    fn step(&mut self, dt: f64) {
        if self.jammed {
            self.velocity = 0.0;
            return;
        }

        let tau = self.config.time_constant.max(1e-6);
        match self.command {
            Command::Spin(percent) => {
                let target = percent / 100.0 * self.config.free_speed_dps();
                let alpha = 1.0 - (-dt / tau).exp();
                self.velocity += (target - self.velocity) * alpha;
            }
            Command::Stopped(BrakeMode::Coast) => {
                self.velocity = self.config.friction.decay(self.velocity, dt);
            }
            Command::Stopped(BrakeMode::Brake) => {
                let alpha = 1.0 - (-dt * 4.0 / tau).exp();
                self.velocity -= self.velocity * alpha;
            }
            Command::Stopped(BrakeMode::Hold) => {
                self.velocity = 0.0;
                if let Some(hold) = self.hold_position {
                    self.position = hold;
                }
            }
        }

        self.position += self.velocity * dt;
    }

    fn encoder_degrees(&mut self) -> f64 {
        let relative = self.position - self.zero;
        let per_tick = 360.0 / self.config.ticks_per_rev.max(1) as f64;
        let quantised = (relative / per_tick).round() * per_tick;
        let noise = self.config.encoder_noise;
        if noise > 0.0 {
            quantised + self.rng.gen_range(-noise..=noise)
        } else {
            quantised
        }
    }
}

/// Cloneable handle to one simulated wheel group
///
/// Clones share state: hand one clone to the drivetrain and keep another to
/// step the plant and inspect what was commanded.
#[derive(Debug, Clone)]
pub struct SimulatedGroup {
    state: Arc<Mutex<WheelState>>,
}

impl SimulatedGroup {
    pub fn new(config: WheelConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        Self {
            state: Arc::new(Mutex::new(WheelState {
                config,
                command: Command::Stopped(BrakeMode::Coast),
                velocity: 0.0,
                position: 0.0,
                zero: 0.0,
                hold_position: None,
                jammed: false,
                commands: Vec::new(),
                brakes: Vec::new(),
                rng,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, WheelState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Advance the plant by `dt` seconds
    pub fn step(&self, dt: f64) {
        self.lock().step(dt);
    }

    /// Current angular velocity (deg/s)
    pub fn velocity(&self) -> f64 {
        self.lock().velocity
    }

    /// Noise-free rotation since the last reset (deg)
    pub fn true_position(&self) -> f64 {
        let state = self.lock();
        state.position - state.zero
    }

    /// Every velocity passed to `spin`, oldest first
    pub fn commands(&self) -> Vec<f64> {
        self.lock().commands.clone()
    }

    /// Most recent velocity passed to `spin`
    pub fn last_command(&self) -> Option<f64> {
        self.lock().commands.last().copied()
    }

    /// Every brake mode passed to `stop`, oldest first
    pub fn brakes(&self) -> Vec<BrakeMode> {
        self.lock().brakes.clone()
    }

    /// True when the last instruction was a stop rather than a spin
    pub fn is_stopped(&self) -> bool {
        matches!(self.lock().command, Command::Stopped(_))
    }

    pub fn clear_history(&self) {
        let mut state = self.lock();
        state.commands.clear();
        state.brakes.clear();
    }

    /// Block the wheel so it can no longer turn
    pub fn jam(&self) {
        self.lock().jammed = true;
    }

    pub fn unjam(&self) {
        self.lock().jammed = false;
    }
}

impl ActuatorGroup for SimulatedGroup {
    fn spin(&mut self, velocity: f64) {
        let mut state = self.lock();
        let velocity = velocity.clamp(-100.0, 100.0);
        state.command = Command::Spin(velocity);
        state.hold_position = None;
        state.commands.push(velocity);
    }

    fn stop(&mut self, mode: BrakeMode) {
        let mut state = self.lock();
        state.command = Command::Stopped(mode);
        state.hold_position = match mode {
            BrakeMode::Hold => Some(state.position),
            _ => None,
        };
        state.brakes.push(mode);
    }

    fn position(&self, unit: RotationUnit) -> f64 {
        unit.from_degrees(self.lock().encoder_degrees())
    }

    fn reset_position(&mut self) {
        let mut state = self.lock();
        state.zero = state.position;
    }
}
