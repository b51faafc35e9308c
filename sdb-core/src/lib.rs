//! Drivetrain controllers and kinematics for the Swerve-Drive Bot on no-std
//! embedded platforms.
//!
//! For a runnable host simulation, see the `mock-mcu` application.
#![no_std]

pub mod utils;
