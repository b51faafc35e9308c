//! Utility re-exports and helper macros for the Swerve-Drive Bot.
//!
//! This module re-exports the drivetrain controllers, timing, and kinematics:
//!
//! - `controllers`: per-module and whole-drivetrain control plus hardware seams
//! - `math`: angle wrapping, module-state optimization, and differential
//!   kinematics
//!
//! The `mk_static!` macro simplifies static initialization in no-std contexts.

pub mod controllers;
pub mod math;

pub use controllers::{DriveController, DRIVE_CHANNEL};
pub use embassy_time::*;
pub use math::kinematics::DifferentialKinematics as dk;

#[macro_export]
/// Initialize a no-std static cell and write the given value into it.
///
/// This macro creates a `static_cell::StaticCell` for type `$t` and initializes
/// it with `$val`, returning a mutable reference to the stored value.
macro_rules! mk_static {
    ($t:ty, $val:expr) => {{
        static STATIC_CELL: static_cell::StaticCell<$t> = static_cell::StaticCell::new();
        STATIC_CELL.uninit().write($val)
    }};
}
