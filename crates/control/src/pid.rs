//! PID (Proportional-Integral-Derivative) Controller
//!
//! A single-axis feedback controller with anti-windup and settle detection.
//! It knows nothing about wheels; callers feed it a measurement each sampling
//! period and read back an unbounded control output.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Configuration for a PID controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PidConfig {
    /// Proportional gain
    pub kp: f64,
    /// Integral gain
    pub ki: f64,
    /// Derivative gain
    pub kd: f64,
    /// Constant output added in the direction of the error (static friction compensation)
    pub bias: f64,
    /// Maximum integral accumulator magnitude (anti-windup)
    pub max_integral: f64,
    /// Acceptable error band: |error| <= error_range counts as in range
    pub error_range: f64,
    /// Consecutive in-range samples required before reporting settled
    pub settle_samples: u32,
    /// Sampling delay between evaluations, in milliseconds
    pub sample_period_ms: u64,
}

impl Default for PidConfig {
    fn default() -> Self {
        Self {
            kp: 0.0,
            ki: 0.0,
            kd: 0.0,
            bias: 0.0,
            max_integral: f64::MAX,
            error_range: 1.0,
            settle_samples: 1,
            sample_period_ms: 10,
        }
    }
}

impl PidConfig {
    /// Create a P-only controller
    pub fn p(kp: f64) -> Self {
        Self { kp, ..Default::default() }
    }

    /// Create a PI controller
    pub fn pi(kp: f64, ki: f64) -> Self {
        Self { kp, ki, ..Default::default() }
    }

    /// Create a PID controller
    pub fn pid(kp: f64, ki: f64, kd: f64) -> Self {
        Self { kp, ki, kd, ..Default::default() }
    }

    /// Set integral anti-windup limit
    pub fn with_max_integral(mut self, max_integral: f64) -> Self {
        self.max_integral = max_integral;
        self
    }

    /// Set the settled error band
    pub fn with_error_range(mut self, error_range: f64) -> Self {
        self.error_range = error_range;
        self
    }

    /// Set how many consecutive in-range samples mean settled
    pub fn with_settle_samples(mut self, samples: u32) -> Self {
        self.settle_samples = samples;
        self
    }

    /// Set the sampling delay in milliseconds
    pub fn with_sample_period_ms(mut self, period_ms: u64) -> Self {
        self.sample_period_ms = period_ms;
        self
    }

    /// Set the constant output bias
    pub fn with_bias(mut self, bias: f64) -> Self {
        self.bias = bias;
        self
    }

    /// Sampling delay in seconds
    pub fn dt(&self) -> f64 {
        self.sample_period_ms as f64 / 1000.0
    }

    /// Reject configurations that would feed non-finite values into a control loop
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, gain) in [("kp", self.kp), ("ki", self.ki), ("kd", self.kd), ("bias", self.bias)] {
            if !gain.is_finite() {
                return Err(ConfigError::NonFiniteGain { name, value: gain });
            }
        }
        if !self.error_range.is_finite() || self.error_range < 0.0 {
            return Err(ConfigError::InvalidErrorRange(self.error_range));
        }
        if self.max_integral.is_nan() || self.max_integral <= 0.0 {
            return Err(ConfigError::InvalidIntegralLimit(self.max_integral));
        }
        if self.settle_samples == 0 {
            return Err(ConfigError::ZeroSettleSamples);
        }
        if self.sample_period_ms == 0 {
            return Err(ConfigError::ZeroSamplePeriod);
        }
        Ok(())
    }
}

/// PID Controller with state
#[derive(Debug, Clone)]
pub struct PidController {
    config: PidConfig,
    target: f64,
    integral: f64,
    prev_error: Option<f64>,
    error: f64,
    in_range: u32,
}

impl PidController {
    /// Create a new controller with the given configuration
    pub fn new(config: PidConfig) -> Self {
        Self {
            config,
            target: 0.0,
            integral: 0.0,
            prev_error: None,
            error: 0.0,
            in_range: 0,
        }
    }

    /// Set the target the next `compute` calls converge on
    pub fn set_target(&mut self, target: f64) {
        self.target = target;
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    /// Clear integral, derivative and settle history
    ///
    /// Called at the start of every motion so windup from one move never
    /// leaks into the next.
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.prev_error = None;
        self.error = 0.0;
        self.in_range = 0;
    }

    /// Evaluate the controller for one nominal sampling period and return the control output
    pub fn compute(&mut self, current: f64) -> f64 {
        self.compute_with_dt(current, self.config.dt())
    }

    /// Evaluate the controller over `dt` seconds of elapsed time
    ///
    /// Use this when the caller samples at a different rate than the
    /// configured `sample_period_ms`.
    pub fn compute_with_dt(&mut self, current: f64, dt: f64) -> f64 {
        let error = self.target - current;

        let limit = self.config.max_integral;
        self.integral = (self.integral + error * dt).max(-limit).min(limit);

        // No derivative on the first sample after a reset
        let derivative = match self.prev_error {
            Some(prev) if dt > 0.0 => (error - prev) / dt,
            _ => 0.0,
        };
        self.prev_error = Some(error);
        self.error = error;

        if error.abs() <= self.config.error_range {
            self.in_range = self.in_range.saturating_add(1);
        } else {
            self.in_range = 0;
        }

        let mut output =
            self.config.kp * error + self.config.ki * self.integral + self.config.kd * derivative;
        if error != 0.0 {
            output += self.config.bias * error.signum();
        }
        output
    }

    /// True once the error stayed inside the band for `settle_samples` evaluations
    pub fn is_settled(&self) -> bool {
        self.in_range >= self.config.settle_samples.max(1)
    }

    /// Error seen by the most recent `compute`
    pub fn error(&self) -> f64 {
        self.error
    }

    /// Get the current integral accumulator value
    pub fn integral(&self) -> f64 {
        self.integral
    }

    /// Get a reference to the configuration
    pub fn config(&self) -> &PidConfig {
        &self.config
    }

    /// Update the configuration
    pub fn set_config(&mut self, config: PidConfig) {
        self.config = config;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_p_only_proportional_output() {
        let mut ctrl = PidController::new(PidConfig::p(2.0));
        ctrl.set_target(10.0);

        // error = 6, P output should be 12
        let output = ctrl.compute(4.0);
        assert_abs_diff_eq!(output, 12.0, epsilon = 1e-9);
    }

    #[test]
    fn test_pi_eliminates_steady_state_error() {
        let mut ctrl = PidController::new(PidConfig::pi(1.0, 5.0));
        ctrl.set_target(10.0);

        // Integrating plant: measurement += output * dt
        let mut measurement = 0.0;
        let dt = ctrl.config().dt();
        for _ in 0..500 {
            let output = ctrl.compute(measurement);
            measurement += output * dt;
        }

        assert!((measurement - 10.0).abs() < 1.0, "Expected ~10.0, got {}", measurement);
    }

    #[test]
    fn test_anti_windup() {
        let config = PidConfig::pi(1.0, 10.0).with_max_integral(5.0);
        let mut ctrl = PidController::new(config);
        ctrl.set_target(100.0);

        for _ in 0..100 {
            ctrl.compute(0.0);
        }

        assert!(ctrl.integral().abs() <= 5.0);
    }

    #[test]
    fn test_first_sample_has_no_derivative_kick() {
        let mut ctrl = PidController::new(PidConfig::pid(0.0, 0.0, 1.0));
        ctrl.set_target(100.0);

        let first = ctrl.compute(0.0);
        assert_abs_diff_eq!(first, 0.0, epsilon = 1e-9);

        // error 100 -> 90 over 10 ms
        let second = ctrl.compute(10.0);
        assert_abs_diff_eq!(second, -1000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_elapsed_time_overrides_configured_period() {
        // Configured for 50 ms but sampled every 10 ms
        let config = PidConfig::pid(0.0, 1.0, 1.0).with_sample_period_ms(50);
        let mut ctrl = PidController::new(config);
        ctrl.set_target(100.0);

        for _ in 0..100 {
            ctrl.compute_with_dt(0.0, 0.01);
        }
        assert_abs_diff_eq!(ctrl.integral(), 100.0, epsilon = 1e-9);

        // error 100 -> 90 over 10 ms
        let output = ctrl.compute_with_dt(10.0, 0.01);
        assert_abs_diff_eq!(output, ctrl.integral() - 1000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_reset_clears_state() {
        let mut ctrl = PidController::new(PidConfig::pi(1.0, 1.0));
        ctrl.set_target(10.0);

        for _ in 0..10 {
            ctrl.compute(0.0);
        }
        assert!(ctrl.integral() > 0.0);

        ctrl.reset();
        assert_abs_diff_eq!(ctrl.integral(), 0.0);
        assert!(!ctrl.is_settled());
    }

    #[test]
    fn test_settles_after_single_sample_by_default() {
        let mut ctrl = PidController::new(PidConfig::p(1.0).with_error_range(0.5));
        ctrl.set_target(10.0);

        ctrl.compute(5.0);
        assert!(!ctrl.is_settled());
        ctrl.compute(9.6);
        assert!(ctrl.is_settled());
    }

    #[test]
    fn test_settle_requires_consecutive_samples() {
        let config = PidConfig::p(1.0).with_error_range(1.0).with_settle_samples(3);
        let mut ctrl = PidController::new(config);
        ctrl.set_target(0.0);

        ctrl.compute(0.5);
        ctrl.compute(0.2);
        assert!(!ctrl.is_settled());

        // Leaving the band restarts the count
        ctrl.compute(4.0);
        ctrl.compute(0.1);
        ctrl.compute(0.1);
        assert!(!ctrl.is_settled());
        ctrl.compute(0.0);
        assert!(ctrl.is_settled());
    }

    #[test]
    fn test_bias_follows_error_sign() {
        let mut ctrl = PidController::new(PidConfig::p(0.0).with_bias(3.0));
        ctrl.set_target(0.0);

        assert_abs_diff_eq!(ctrl.compute(-2.0), 3.0);
        assert_abs_diff_eq!(ctrl.compute(2.0), -3.0);
        assert_abs_diff_eq!(ctrl.compute(0.0), 0.0);
    }

    #[test]
    fn test_non_finite_target_propagates() {
        let mut ctrl = PidController::new(PidConfig::p(1.0));
        ctrl.set_target(f64::NAN);
        assert!(ctrl.compute(0.0).is_nan());
    }

    #[test]
    fn test_validate_rejects_bad_configs() {
        assert!(PidConfig::pid(0.15, 0.6, 0.015).validate().is_ok());
        assert!(matches!(
            PidConfig::p(f64::NAN).validate(),
            Err(ConfigError::NonFiniteGain { name: "kp", .. })
        ));
        assert!(matches!(
            PidConfig::p(1.0).with_error_range(-1.0).validate(),
            Err(ConfigError::InvalidErrorRange(_))
        ));
        assert!(matches!(
            PidConfig::p(1.0).with_settle_samples(0).validate(),
            Err(ConfigError::ZeroSettleSamples)
        ));
        assert!(matches!(
            PidConfig::p(1.0).with_sample_period_ms(0).validate(),
            Err(ConfigError::ZeroSamplePeriod)
        ));
        assert!(matches!(
            PidConfig::p(1.0).with_max_integral(0.0).validate(),
            Err(ConfigError::InvalidIntegralLimit(_))
        ));
    }

    #[test]
    fn test_config_json_fills_defaults() {
        let config: PidConfig = serde_json::from_str(r#"{"kp": 0.15, "ki": 0.6}"#).unwrap();
        assert_eq!(config.kp, 0.15);
        assert_eq!(config.settle_samples, 1);
        assert_eq!(config.sample_period_ms, 10);
    }
}
