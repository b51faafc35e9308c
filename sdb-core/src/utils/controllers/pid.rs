//! Discrete PID feedback controller for the steering loop.

/// Immutable controller gains.
///
/// Gains are per-tick multipliers; the fixed control period is absorbed into
/// the integral and derivative gains during tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PidGains {
    /// Proportional gain.
    pub kp: f32,
    /// Integral gain.
    pub ki: f32,
    /// Derivative gain.
    pub kd: f32,
    /// Integral zone: the integrator only accumulates while |error| is within
    /// this band and is cleared outside it. Zero or negative disables gating.
    pub izone: f32,
    /// Constant offset added to every output.
    pub bias: f32,
}

/// A simple discrete PID controller.
///
/// The controller never clamps its output; callers clamp to the actuator's
/// valid range.
pub struct PidController {
    gains: PidGains,
    integral: f32,
    prev_error: f32,
}

impl PidController {
    pub fn new(gains: PidGains) -> Self {
        Self {
            gains,
            integral: 0.0,
            prev_error: 0.0,
        }
    }

    /// Compute the control output for the current error.
    ///
    /// The integral term persists across calls until [`reset`](Self::reset).
    pub fn calculate(
        &mut self,
        error: f32,
    ) -> f32 {
        if self.gains.izone > 0.0 && error.abs() > self.gains.izone {
            self.integral = 0.0;
        } else {
            self.integral += error;
        }
        let derivative = error - self.prev_error;
        self.prev_error = error;

        self.gains.kp * error
            + self.gains.ki * self.integral
            + self.gains.kd * derivative
            + self.gains.bias
    }

    /// Reset integrator and derivative history.
    ///
    /// Must be called when closed-loop control resumes after a discontinuity,
    /// otherwise a stale integrator produces an output spike.
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.prev_error = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gains(kp: f32, ki: f32, kd: f32) -> PidGains {
        PidGains {
            kp,
            ki,
            kd,
            izone: 0.0,
            bias: 0.0,
        }
    }

    #[test]
    fn proportional_only_zero_error_is_zero() {
        let mut pid = PidController::new(gains(0.5, 0.0, 0.0));
        assert_eq!(pid.calculate(0.0), 0.0);
        assert_eq!(pid.calculate(0.0), 0.0);
    }

    #[test]
    fn integral_accumulates_under_constant_error() {
        let mut pid = PidController::new(gains(0.0, 0.1, 0.0));
        let mut previous = 0.0;
        for _ in 0..5 {
            let output = pid.calculate(2.0);
            assert!(output > previous, "{} should exceed {}", output, previous);
            previous = output;
        }
    }

    #[test]
    fn derivative_responds_to_error_change() {
        let mut pid = PidController::new(gains(0.0, 0.0, 1.0));
        assert_eq!(pid.calculate(1.0), 1.0);
        assert_eq!(pid.calculate(1.0), 0.0);
        assert_eq!(pid.calculate(0.0), -1.0);
    }

    #[test]
    fn izone_clears_integrator_outside_band() {
        let mut pid = PidController::new(PidGains {
            kp: 0.0,
            ki: 1.0,
            kd: 0.0,
            izone: 1.0,
            bias: 0.0,
        });
        pid.calculate(0.5);
        pid.calculate(0.5);
        // Large error clears the wind-up, small error starts fresh.
        pid.calculate(5.0);
        assert_eq!(pid.calculate(0.5), 0.5);
    }

    #[test]
    fn bias_offsets_every_output() {
        let mut pid = PidController::new(PidGains {
            kp: 1.0,
            ki: 0.0,
            kd: 0.0,
            izone: 0.0,
            bias: 0.25,
        });
        assert_eq!(pid.calculate(0.0), 0.25);
        assert_eq!(pid.calculate(1.0), 1.25);
    }

    #[test]
    fn reset_clears_memory() {
        let mut pid = PidController::new(gains(0.0, 1.0, 1.0));
        pid.calculate(3.0);
        pid.calculate(3.0);
        pid.reset();
        // Same first-call output as a fresh controller.
        assert_eq!(pid.calculate(3.0), 3.0 + 3.0);
    }
}
