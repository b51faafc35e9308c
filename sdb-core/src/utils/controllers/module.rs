//! Per-module swerve control.
//!
//! A [`SwerveModule`] turns one module's desired state into concrete steering
//! and drive commands each control-loop tick: optimize the requested state,
//! hold the latched heading through the low-speed dead-band, close the
//! steering loop with PID, and drive either open-loop or with a velocity
//! setpoint plus feedforward.

use crate::utils::math::angle;
use crate::utils::math::state::{ModulePosition, ModuleState};

use super::driver::{DriveActuator, HeadingSensor, SteerActuator};
use super::feedforward::{FeedforwardGains, MotorFeedforward};
use super::pid::{PidController, PidGains};

/// Identity and mounting constants of one module, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModuleConstants {
    /// Module index used in logs (0 = front-left, counting clockwise).
    pub module_id: u8,
    /// Heading-sensor mounting offset (degrees), applied by the sensor
    /// implementation.
    pub heading_offset: f32,
    /// Hardware channel of the drive motor.
    pub drive_id: u8,
    /// Hardware channel of the steering motor.
    pub steer_id: u8,
}

/// Per-module tuning, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModuleConfig {
    /// Maximum attainable drive speed (m/s); scales open-loop percent output.
    pub max_speed: f32,
    /// Fraction of `max_speed` below which the latched heading is held so the
    /// module does not chatter while parked.
    pub speed_deadband: f32,
    /// Steering feedback gains.
    pub steer_gains: PidGains,
    /// Drive feedforward constants.
    pub drive_feedforward: FeedforwardGains,
}

/// Errors from one module's sensor or actuators.
#[derive(Debug)]
pub enum ModuleError<HE, SE, DE> {
    Heading(HE),
    Steer(SE),
    Drive(DE),
    /// The heading sensor returned NaN or infinity.
    NonFiniteHeading,
}

/// One independently-steerable swerve module.
pub struct SwerveModule<H, S, D> {
    constants: ModuleConstants,
    config: ModuleConfig,
    heading_sensor: H,
    steer: S,
    drive: D,
    steer_pid: PidController,
    feedforward: MotorFeedforward,
    last_heading: f32,
}

impl<H, S, D> SwerveModule<H, S, D>
where
    H: HeadingSensor,
    S: SteerActuator,
    D: DriveActuator,
{
    /// Create a module over the injected hardware.
    ///
    /// Reads the heading once to seed the latched heading, so the first
    /// dead-band tick holds the module where it actually points.
    pub fn new(
        constants: ModuleConstants,
        config: ModuleConfig,
        heading_sensor: H,
        steer: S,
        drive: D,
    ) -> Result<Self, ModuleError<H::Error, S::Error, D::Error>> {
        let mut module = Self {
            constants,
            config,
            heading_sensor,
            steer,
            drive,
            steer_pid: PidController::new(config.steer_gains),
            feedforward: MotorFeedforward::new(config.drive_feedforward),
            last_heading: 0.0,
        };
        module.last_heading = module.read_heading()?;
        Ok(module)
    }

    /// Issue this tick's steering and drive commands for a desired state.
    ///
    /// Called once per control period by the external loop. Issues exactly one
    /// steering command followed by one drive command and returns immediately;
    /// it does not wait for motion to complete.
    pub fn set_desired_state(
        &mut self,
        desired: ModuleState,
        open_loop: bool,
    ) -> Result<(), ModuleError<H::Error, S::Error, D::Error>> {
        let current = self.read_heading()?;
        let optimized = desired.optimize(current);

        // Near-zero speed: hold the latched heading instead of chasing the
        // degenerate angle of a zero-length velocity vector.
        let heading = if optimized.speed.abs() <= self.config.max_speed * self.config.speed_deadband
        {
            self.last_heading
        } else {
            optimized.heading
        };
        self.last_heading = heading;

        let error = angle::normalize_degrees(current - heading);
        let steer_output = self.steer_pid.calculate(error).clamp(-1.0, 1.0);
        self.steer
            .set_percent_output(steer_output)
            .map_err(ModuleError::Steer)?;

        if open_loop {
            let percent = (optimized.speed / self.config.max_speed).clamp(-1.0, 1.0);
            self.drive
                .set_percent_output(percent)
                .map_err(ModuleError::Drive)?;
        } else {
            let feedforward = self.feedforward.calculate(optimized.speed);
            self.drive
                .set_velocity_setpoint(optimized.speed, feedforward)
                .map_err(ModuleError::Drive)?;
        }

        tracing::trace!(
            module = self.constants.module_id,
            speed = optimized.speed,
            heading,
            steer_output,
            "module state applied"
        );
        Ok(())
    }

    /// Measured speed and heading.
    pub fn state(&mut self) -> Result<ModuleState, ModuleError<H::Error, S::Error, D::Error>> {
        let heading = self.read_heading()?;
        let speed = self.drive.velocity().map_err(ModuleError::Drive)?;
        Ok(ModuleState { speed, heading })
    }

    /// Accumulated drive distance and heading.
    pub fn position(
        &mut self,
    ) -> Result<ModulePosition, ModuleError<H::Error, S::Error, D::Error>> {
        let heading = self.read_heading()?;
        let distance = self.drive.distance().map_err(ModuleError::Drive)?;
        Ok(ModulePosition { distance, heading })
    }

    /// Zero both outputs.
    pub fn stop(&mut self) -> Result<(), ModuleError<H::Error, S::Error, D::Error>> {
        self.steer.set_percent_output(0.0).map_err(ModuleError::Steer)?;
        self.drive.set_percent_output(0.0).map_err(ModuleError::Drive)
    }

    /// Clear steering feedback memory; call when control resumes after the
    /// drivetrain was disabled.
    pub fn reset(&mut self) {
        self.steer_pid.reset();
    }

    /// The heading most recently sent to the steering actuator.
    pub fn last_heading(&self) -> f32 {
        self.last_heading
    }

    pub fn constants(&self) -> &ModuleConstants {
        &self.constants
    }

    /// Read, reject non-finite values, and wrap the sensed heading.
    fn read_heading(&mut self) -> Result<f32, ModuleError<H::Error, S::Error, D::Error>> {
        let raw = self
            .heading_sensor
            .heading_degrees()
            .map_err(ModuleError::Heading)?;
        if !raw.is_finite() {
            return Err(ModuleError::NonFiniteHeading);
        }
        Ok(angle::normalize_degrees(raw))
    }
}
