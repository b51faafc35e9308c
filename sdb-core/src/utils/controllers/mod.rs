//! Drivetrain controllers and the drive-command surface.
//!
//! - `driver`: abstract sensor/actuator capability traits
//! - `module`: per-module swerve control
//! - `pid` / `feedforward`: steering feedback and drive feedforward
//! - `pwm`: PCA9685 percent-output motor variant
//!
//! Desired chassis motion arrives as [`DriveCommand`] messages on
//! [`DRIVE_CHANNEL`]; a [`DriveController`] owns the robot's drivetrain
//! topology and executes each command.

pub mod driver;
pub mod feedforward;
pub mod module;
pub mod pid;
pub mod pwm;

use core::fmt::Debug;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use serde::{Deserialize, Serialize};

use crate::utils::math::kinematics::{DifferentialKinematics, WheelSpeedPair};
use crate::utils::math::state::ModuleState;

use driver::{DriveActuator, HeadingSensor, SteerActuator};
use feedforward::{FeedforwardGains, MotorFeedforward};
use module::{ModuleError, SwerveModule};

/// Channel used to receive drive commands (`DriveCommand` messages).
pub static DRIVE_CHANNEL: embassy_sync::channel::Channel<
    CriticalSectionRawMutex,
    DriveCommand,
    16,
> = embassy_sync::channel::Channel::new();

/// Drive command variants for chassis motion and drivetrain management.
///
/// Serialized as JSON with tag `"dc"`.
#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
#[serde(tag = "dc", rename_all = "snake_case")]
pub enum DriveCommand {
    // Motion Control Variants
    /// Per-module swerve state targets, front-left first, clockwise.
    S { m: [ModuleState; 4], ol: bool },
    /// Tank drive from linear velocity (m/s) and turn rate (rad/s).
    T { v: f32, w: f32, ol: bool },
    /// Tank drive from linear velocity (m/s) and path curvature (1/m).
    C { v: f32, k: f32, ol: bool },

    // Drivetrain Management Variants
    /// Read and log the measured drivetrain state.
    ReadState,
    /// Resume control after the drivetrain was disabled.
    Enable,
    /// Stop all actuators.
    Disable,
}

/// Measured drivetrain state returned by `ReadState`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StateReport {
    Modules([ModuleState; 4]),
    Wheels(WheelSpeedPair),
}

/// Errors from executing a drive command.
#[derive(Debug)]
pub enum DriveError<HE, SE, DE> {
    Module(ModuleError<HE, SE, DE>),
    Wheel(DE),
}

/// Four swerve modules driven as one chassis.
pub struct SwerveDrive<H, S, D> {
    modules: [SwerveModule<H, S, D>; 4],
}

impl<H, S, D> SwerveDrive<H, S, D>
where
    H: HeadingSensor,
    S: SteerActuator,
    D: DriveActuator,
{
    pub fn new(modules: [SwerveModule<H, S, D>; 4]) -> Self {
        Self { modules }
    }

    /// Fan a set of per-module targets out to the modules, in module order.
    pub fn set_desired_states(
        &mut self,
        states: [ModuleState; 4],
        open_loop: bool,
    ) -> Result<(), ModuleError<H::Error, S::Error, D::Error>> {
        for (module, state) in self.modules.iter_mut().zip(states) {
            module.set_desired_state(state, open_loop)?;
        }
        Ok(())
    }

    /// Measured state of every module.
    pub fn states(
        &mut self,
    ) -> Result<[ModuleState; 4], ModuleError<H::Error, S::Error, D::Error>> {
        let [m0, m1, m2, m3] = &mut self.modules;
        Ok([m0.state()?, m1.state()?, m2.state()?, m3.state()?])
    }

    /// Clear every module's steering feedback memory.
    pub fn reset(&mut self) {
        for module in &mut self.modules {
            module.reset();
        }
    }

    /// Zero every module's outputs.
    pub fn stop(&mut self) -> Result<(), ModuleError<H::Error, S::Error, D::Error>> {
        for module in &mut self.modules {
            module.stop()?;
        }
        Ok(())
    }
}

/// Differential (tank) drivetrain: kinematics applied to a left and right
/// drive actuator.
pub struct TankDrive<D> {
    kinematics: DifferentialKinematics,
    left: D,
    right: D,
    feedforward: MotorFeedforward,
    max_speed: f32,
}

impl<D> TankDrive<D>
where
    D: DriveActuator,
{
    pub fn new(
        track_width: f32,
        max_speed: f32,
        feedforward: FeedforwardGains,
        left: D,
        right: D,
    ) -> Self {
        Self {
            kinematics: DifferentialKinematics::new(track_width),
            left,
            right,
            feedforward: MotorFeedforward::new(feedforward),
            max_speed,
        }
    }

    /// Drive from a linear velocity (m/s) and turn rate (rad/s).
    pub fn drive(
        &mut self,
        linear_velocity: f32,
        angular_velocity: f32,
        open_loop: bool,
    ) -> Result<(), D::Error> {
        let speeds = self
            .kinematics
            .to_wheel_speeds(linear_velocity, angular_velocity);
        self.apply(speeds, open_loop)
    }

    /// Drive from a linear velocity (m/s) and path curvature (1/m).
    pub fn drive_curvature(
        &mut self,
        linear_velocity: f32,
        curvature: f32,
        open_loop: bool,
    ) -> Result<(), D::Error> {
        let speeds = self
            .kinematics
            .to_wheel_speeds_curvature(linear_velocity, curvature);
        self.apply(speeds, open_loop)
    }

    /// Clamp to the actuators' range and issue both wheel commands.
    fn apply(
        &mut self,
        speeds: WheelSpeedPair,
        open_loop: bool,
    ) -> Result<(), D::Error> {
        if open_loop {
            self.left
                .set_percent_output((speeds.left / self.max_speed).clamp(-1.0, 1.0))?;
            self.right
                .set_percent_output((speeds.right / self.max_speed).clamp(-1.0, 1.0))?;
        } else {
            let left_ff = self.feedforward.calculate(speeds.left);
            self.left.set_velocity_setpoint(speeds.left, left_ff)?;
            let right_ff = self.feedforward.calculate(speeds.right);
            self.right.set_velocity_setpoint(speeds.right, right_ff)?;
        }
        Ok(())
    }

    /// Measured wheel speeds.
    pub fn wheel_speeds(&mut self) -> Result<WheelSpeedPair, D::Error> {
        Ok(WheelSpeedPair {
            left: self.left.velocity()?,
            right: self.right.velocity()?,
        })
    }

    /// Zero both outputs.
    pub fn stop(&mut self) -> Result<(), D::Error> {
        self.left.set_percent_output(0.0)?;
        self.right.set_percent_output(0.0)
    }
}

/// The drivetrain topology a robot is built with.
pub enum Drivetrain<H, S, D> {
    Swerve(SwerveDrive<H, S, D>),
    Tank(TankDrive<D>),
}

/// Owns the drivetrain and executes `DriveCommand`s from `DRIVE_CHANNEL`.
pub struct DriveController<H, S, D> {
    pub drivetrain: Option<Drivetrain<H, S, D>>,
}

impl<H, S, D> DriveController<H, S, D>
where
    H: HeadingSensor,
    S: SteerActuator,
    D: DriveActuator,
    H::Error: Debug,
    S::Error: Debug,
    D::Error: Debug,
{
    pub fn new(drivetrain: Option<Drivetrain<H, S, D>>) -> Self {
        Self { drivetrain }
    }

    /// Execute a single drive command against the owned drivetrain.
    ///
    /// Commands for the other topology are logged and dropped. Returns
    /// measured state for `ReadState`, `None` otherwise.
    pub fn execute_command(
        &mut self,
        command: DriveCommand,
    ) -> Result<Option<StateReport>, DriveError<H::Error, S::Error, D::Error>> {
        let Some(drivetrain) = self.drivetrain.as_mut() else {
            tracing::warn!(
                "drive command received but drivetrain not initialized: {:?}",
                command
            );
            return Ok(None);
        };

        match (drivetrain, command) {
            (Drivetrain::Swerve(swerve), DriveCommand::S { m, ol }) => {
                swerve.set_desired_states(m, ol).map_err(DriveError::Module)?;
                Ok(None)
            }
            (Drivetrain::Tank(tank), DriveCommand::T { v, w, ol }) => {
                tank.drive(v, w, ol).map_err(DriveError::Wheel)?;
                Ok(None)
            }
            (Drivetrain::Tank(tank), DriveCommand::C { v, k, ol }) => {
                tank.drive_curvature(v, k, ol).map_err(DriveError::Wheel)?;
                Ok(None)
            }
            (Drivetrain::Swerve(swerve), DriveCommand::ReadState) => Ok(Some(
                StateReport::Modules(swerve.states().map_err(DriveError::Module)?),
            )),
            (Drivetrain::Tank(tank), DriveCommand::ReadState) => Ok(Some(StateReport::Wheels(
                tank.wheel_speeds().map_err(DriveError::Wheel)?,
            ))),
            (Drivetrain::Swerve(swerve), DriveCommand::Enable) => {
                swerve.reset();
                Ok(None)
            }
            (Drivetrain::Tank(_), DriveCommand::Enable) => Ok(None),
            (Drivetrain::Swerve(swerve), DriveCommand::Disable) => {
                swerve.stop().map_err(DriveError::Module)?;
                Ok(None)
            }
            (Drivetrain::Tank(tank), DriveCommand::Disable) => {
                tank.stop().map_err(DriveError::Wheel)?;
                Ok(None)
            }
            (_, command) => {
                tracing::warn!("drive command does not match drivetrain topology: {:?}", command);
                Ok(None)
            }
        }
    }

    /// Receive and execute drive commands forever.
    pub async fn drive_ch(&mut self) -> ! {
        loop {
            let command = DRIVE_CHANNEL.receiver().receive().await;
            tracing::info!("received drive command: {:?}", command);
            match self.execute_command(command) {
                Ok(Some(StateReport::Modules(states))) => {
                    tracing::info!(?states, "module states read");
                }
                Ok(Some(StateReport::Wheels(speeds))) => {
                    tracing::info!(?speeds, "wheel speeds read");
                }
                Ok(None) => tracing::info!("drive command executed"),
                Err(error) => tracing::error!(?error, "drive command failed"),
            }
        }
    }
}
