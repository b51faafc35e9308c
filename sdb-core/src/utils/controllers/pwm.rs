//! PCA9685-backed percent-output motors.
//!
//! One [`PwmMotor`] drives a single H-bridge channel pair on a shared PCA9685:
//! the phase channel selects direction from the command's sign, the enable
//! channel carries the duty cycle from its magnitude. This hardware variant
//! has no firmware velocity loop, so the closed-loop entry points report
//! [`PwmMotorError::ClosedLoopUnsupported`].

use core::cell::RefCell;
use core::fmt::Debug;

use embedded_hal::i2c::I2c;
use embedded_hal_bus::i2c::RefCellDevice;
use pwm_pca9685::{Channel, Error as PwmError, Pca9685};

use super::driver::{DriveActuator, DriveFeedback, SteerActuator};

const MAX_DUTY: u16 = 4095;

/// Errors from a PCA9685-backed motor.
#[derive(Debug)]
pub enum PwmMotorError<E: Debug> {
    Pwm(PwmError<E>),
    /// The command needs a firmware velocity loop this hardware lacks.
    ClosedLoopUnsupported,
}

/// Shared PCA9685 device over a shared I2C bus.
pub type SharedPwm<'a, I2C> = RefCell<Pca9685<RefCellDevice<'a, I2C>>>;

/// Configure and enable the PWM driver (prescale to 60Hz).
pub fn configure_pwm<I2C, E>(pwm: &SharedPwm<'_, I2C>) -> Result<(), PwmMotorError<E>>
where
    I2C: I2c<Error = E>,
    E: Debug,
{
    let mut pwm = pwm.borrow_mut();
    pwm.enable().map_err(PwmMotorError::Pwm)?;
    tracing::info!("PWM enabled");
    pwm.set_prescale(100).map_err(PwmMotorError::Pwm)?;
    tracing::info!("PWM prescale set to 60Hz");
    Ok(())
}

/// A single motor on a shared PCA9685, addressed as a (phase, enable) channel
/// pair.
pub struct PwmMotor<'a, I2C: 'static> {
    pwm: &'a SharedPwm<'a, I2C>,
    phase_channel: Channel,
    enable_channel: Channel,
}

impl<'a, I2C, E> PwmMotor<'a, I2C>
where
    I2C: I2c<Error = E>,
    E: Debug,
{
    pub fn new(
        pwm: &'a SharedPwm<'a, I2C>,
        phase_channel: Channel,
        enable_channel: Channel,
    ) -> Self {
        Self {
            pwm,
            phase_channel,
            enable_channel,
        }
    }

    /// Write direction and duty for a normalized output.
    fn apply(
        &mut self,
        output: f32,
    ) -> Result<(), PwmMotorError<E>> {
        let duty = output.abs().min(1.0);
        let forward = output >= 0.0;

        let mut pwm = self.pwm.borrow_mut();
        pwm.set_channel_on_off(self.phase_channel, 0, if forward { 0 } else { MAX_DUTY })
            .map_err(PwmMotorError::Pwm)?;
        pwm.set_channel_on_off(self.enable_channel, 0, (duty * MAX_DUTY as f32) as u16)
            .map_err(PwmMotorError::Pwm)?;
        Ok(())
    }
}

impl<'a, I2C, E> SteerActuator for PwmMotor<'a, I2C>
where
    I2C: I2c<Error = E>,
    E: Debug,
{
    type Error = PwmMotorError<E>;

    fn set_percent_output(
        &mut self,
        output: f32,
    ) -> Result<(), Self::Error> {
        self.apply(output)
    }
}

impl<'a, I2C, E> DriveFeedback for PwmMotor<'a, I2C>
where
    I2C: I2c<Error = E>,
    E: Debug,
{
    type Error = PwmMotorError<E>;

    fn velocity(&mut self) -> Result<f32, Self::Error> {
        Err(PwmMotorError::ClosedLoopUnsupported)
    }

    fn distance(&mut self) -> Result<f32, Self::Error> {
        Err(PwmMotorError::ClosedLoopUnsupported)
    }
}

impl<'a, I2C, E> DriveActuator for PwmMotor<'a, I2C>
where
    I2C: I2c<Error = E>,
    E: Debug,
{
    fn set_percent_output(
        &mut self,
        output: f32,
    ) -> Result<(), Self::Error> {
        self.apply(output)
    }

    fn set_velocity_setpoint(
        &mut self,
        _velocity: f32,
        _feedforward_volts: f32,
    ) -> Result<(), Self::Error> {
        Err(PwmMotorError::ClosedLoopUnsupported)
    }
}
