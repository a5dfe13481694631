//! Acceleration limiting
//!
//! Bounds how far a commanded velocity may move between two consecutive loop
//! iterations, ramping the output towards the requested value.

use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlewLimiter {
    max_step: f64,
    last: f64,
}

impl SlewLimiter {
    /// Create a limiter allowing at most `max_step` change per iteration.
    ///
    /// `f64::INFINITY` means unlimited.
    pub fn new(max_step: f64) -> Result<Self, ConfigError> {
        if max_step.is_nan() || max_step <= 0.0 {
            return Err(ConfigError::InvalidAcceleration(max_step));
        }
        Ok(Self { max_step, last: 0.0 })
    }

    /// A limiter that passes every value through
    pub fn unlimited() -> Self {
        Self {
            max_step: f64::INFINITY,
            last: 0.0,
        }
    }

    pub fn is_limited(&self) -> bool {
        self.max_step.is_finite()
    }

    pub fn max_step(&self) -> f64 {
        self.max_step
    }

    /// Clamp `desired` to within `max_step` of the previous output
    pub fn limit(&mut self, desired: f64) -> f64 {
        let output = if self.is_limited() {
            desired
                .max(self.last - self.max_step)
                .min(self.last + self.max_step)
        } else {
            desired
        };
        self.last = output;
        output
    }

    /// Last value returned by `limit`
    pub fn last(&self) -> f64 {
        self.last
    }

    /// Restart ramping from rest
    pub fn reset(&mut self) {
        self.last = 0.0;
    }

    /// Restart ramping from a velocity already being commanded
    pub fn reset_to(&mut self, value: f64) {
        self.last = if value.is_finite() { value } else { 0.0 };
    }
}

impl Default for SlewLimiter {
    fn default() -> Self {
        Self::unlimited()
    }
}
