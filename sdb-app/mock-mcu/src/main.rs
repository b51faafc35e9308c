//! Host simulation of the Swerve-Drive Bot control loop.
//!
//! Runs the drivetrain controller under an embassy executor against simulated
//! module hardware: a scripted teleop arc (or a one-shot JSON command) is fed
//! onto `DRIVE_CHANNEL` at the control period while the drive task consumes
//! and executes it.

use core::cell::RefCell;
use std::convert::Infallible;
use std::rc::Rc;

use clap::Parser;
use embassy_executor::{Executor, Spawner};
use sdb_core::mk_static;
use sdb_core::utils::controllers::driver::{
    DriveActuator, DriveFeedback, HeadingSensor, SteerActuator,
};
use sdb_core::utils::controllers::feedforward::FeedforwardGains;
use sdb_core::utils::controllers::module::{ModuleConfig, ModuleConstants, SwerveModule};
use sdb_core::utils::controllers::pid::PidGains;
use sdb_core::utils::controllers::{
    DriveCommand, DriveController, Drivetrain, SwerveDrive, TankDrive, DRIVE_CHANNEL,
};
use sdb_core::utils::math::angle::normalize_degrees;
use sdb_core::utils::math::state::ModuleState;
use sdb_core::utils::{Duration, Ticker};
use tracing::{error, info};

const MAX_SPEED: f32 = 4.5;
const TRACK_WIDTH: f32 = 0.6;

#[derive(Parser)]
#[clap(version = "1.0")]
struct Opts {
    /// Control period in milliseconds
    #[clap(long, default_value_t = 20)]
    period_ms: u64,
    /// Simulate a differential (tank) drivetrain instead of swerve
    #[clap(long)]
    tank: bool,
    /// One-shot JSON drive command executed before the scripted demo,
    /// e.g. '{"dc":"t","v":1.0,"w":0.5,"ol":false}'
    #[clap(long)]
    command: Option<String>,
}

/// Simulated state of one module's hardware; clones share the same state.
#[derive(Debug, Default)]
struct SimState {
    heading: f32,
    velocity: f32,
    distance: f32,
    steer_output: f32,
}

#[derive(Clone, Default)]
struct SimIo(Rc<RefCell<SimState>>);

impl HeadingSensor for SimIo {
    type Error = Infallible;

    fn heading_degrees(&mut self) -> Result<f32, Self::Error> {
        // Crude first-order steering plant: each read advances the module
        // toward wherever the last output pushed it.
        let mut sim = self.0.borrow_mut();
        sim.heading = normalize_degrees(sim.heading + sim.steer_output * 15.0);
        Ok(sim.heading)
    }
}

impl SteerActuator for SimIo {
    type Error = Infallible;

    fn set_percent_output(&mut self, output: f32) -> Result<(), Self::Error> {
        self.0.borrow_mut().steer_output = output;
        Ok(())
    }
}

impl DriveFeedback for SimIo {
    type Error = Infallible;

    fn velocity(&mut self) -> Result<f32, Self::Error> {
        Ok(self.0.borrow().velocity)
    }

    fn distance(&mut self) -> Result<f32, Self::Error> {
        Ok(self.0.borrow().distance)
    }
}

impl DriveActuator for SimIo {
    fn set_percent_output(&mut self, output: f32) -> Result<(), Self::Error> {
        let mut sim = self.0.borrow_mut();
        sim.velocity = output * MAX_SPEED;
        sim.distance += sim.velocity * 0.02;
        Ok(())
    }

    fn set_velocity_setpoint(
        &mut self,
        velocity: f32,
        _feedforward_volts: f32,
    ) -> Result<(), Self::Error> {
        // The simulated firmware loop tracks its setpoint perfectly.
        let mut sim = self.0.borrow_mut();
        sim.velocity = velocity;
        sim.distance += velocity * 0.02;
        Ok(())
    }
}

fn module_constants(module_id: u8) -> ModuleConstants {
    ModuleConstants {
        module_id,
        heading_offset: 0.0,
        drive_id: 2 * module_id,
        steer_id: 2 * module_id + 1,
    }
}

fn module_config() -> ModuleConfig {
    ModuleConfig {
        max_speed: MAX_SPEED,
        speed_deadband: 0.01,
        steer_gains: PidGains {
            kp: 0.01,
            ki: 0.0,
            kd: 0.0005,
            izone: 0.0,
            bias: 0.0,
        },
        drive_feedforward: drive_feedforward(),
    }
}

fn drive_feedforward() -> FeedforwardGains {
    FeedforwardGains {
        ks: 0.32,
        kv: 1.51,
        ka: 0.27,
    }
}

#[embassy_executor::task]
async fn drive_task(mut ctrl: DriveController<SimIo, SimIo, SimIo>) -> ! {
    ctrl.drive_ch().await
}

#[embassy_executor::task]
async fn script_task(period_ms: u64, tank: bool, command: Option<String>) {
    let mut ticker = Ticker::every(Duration::from_millis(period_ms));

    DRIVE_CHANNEL.send(DriveCommand::Enable).await;

    if let Some(json) = command {
        match serde_json::from_str::<DriveCommand>(&json) {
            Ok(cmd) => DRIVE_CHANNEL.send(cmd).await,
            Err(err) => error!(?err, "error deserializing DriveCommand"),
        }
        ticker.next().await;
    }

    // Scripted teleop arc: ramp the speed up while sweeping the heading
    // (swerve) or easing off the turn rate (tank).
    for tick in 0..100u32 {
        let t = tick as f32 / 100.0;
        let cmd = if tank {
            DriveCommand::T {
                v: 2.0 * t,
                w: 1.0 - t,
                ol: false,
            }
        } else {
            let state = ModuleState::new(2.0 * t, 90.0 * t);
            DriveCommand::S { m: [state; 4], ol: false }
        };
        DRIVE_CHANNEL.send(cmd).await;
        ticker.next().await;
    }

    DRIVE_CHANNEL.send(DriveCommand::ReadState).await;
    DRIVE_CHANNEL.send(DriveCommand::Disable).await;
    info!("demo script complete");
}

#[embassy_executor::task]
async fn main_task(spawner: Spawner) {
    let opts: Opts = Opts::parse();

    let drivetrain = if opts.tank {
        Drivetrain::Tank(TankDrive::new(
            TRACK_WIDTH,
            MAX_SPEED,
            drive_feedforward(),
            SimIo::default(),
            SimIo::default(),
        ))
    } else {
        let modules = [0u8, 1, 2, 3].map(|i| {
            let io = SimIo::default();
            SwerveModule::new(
                module_constants(i),
                module_config(),
                io.clone(),
                io.clone(),
                io,
            )
            .unwrap()
        });
        Drivetrain::Swerve(SwerveDrive::new(modules))
    };

    let ctrl = DriveController::new(Some(drivetrain));
    spawner.spawn(drive_task(ctrl)).unwrap();
    spawner.spawn(script_task(opts.period_ms, opts.tank, opts.command)).unwrap();
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
    let executor = mk_static!(Executor, Executor::new());
    executor.run(|spawner| {
        spawner.spawn(main_task(spawner)).unwrap();
    });
}
