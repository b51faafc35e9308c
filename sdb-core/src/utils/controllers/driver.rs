//! Abstract sensor/actuator capability interfaces.
//!
//! Hardware is injected into the controllers through these seams, so vendor
//! devices and simulated or mocked replacements are interchangeable.

/// Absolute steering-heading sensor.
///
/// Implementations return degrees, already offset-corrected for the module's
/// mounting position.
pub trait HeadingSensor {
    type Error;

    /// Read the current heading (degrees).
    fn heading_degrees(&mut self) -> Result<f32, Self::Error>;
}

/// Drive-side measurements from the motor's integrated encoder.
pub trait DriveFeedback {
    type Error;

    /// Read the current wheel speed (m/s).
    fn velocity(&mut self) -> Result<f32, Self::Error>;

    /// Read the accumulated drive distance (m).
    fn distance(&mut self) -> Result<f32, Self::Error>;
}

/// Steering motor commanded by normalized percent output.
pub trait SteerActuator {
    type Error;

    /// Command a percent output in `[-1, 1]`.
    fn set_percent_output(
        &mut self,
        output: f32,
    ) -> Result<(), Self::Error>;
}

/// Drive motor supporting open-loop percent output and a closed-loop velocity
/// setpoint tracked by the actuator's own firmware.
///
/// Closed-loop hardware always exposes its integrated encoder, hence the
/// [`DriveFeedback`] supertrait; percent-only variants report an unsupported
/// error from the closed-loop entry points.
pub trait DriveActuator: DriveFeedback {
    /// Command a percent output in `[-1, 1]`.
    fn set_percent_output(
        &mut self,
        output: f32,
    ) -> Result<(), Self::Error>;

    /// Command a velocity setpoint (m/s) with a feedforward contribution (V)
    /// applied by the actuator's internal velocity controller.
    fn set_velocity_setpoint(
        &mut self,
        velocity: f32,
        feedforward_volts: f32,
    ) -> Result<(), Self::Error>;
}
