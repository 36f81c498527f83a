//! Hardware driver implementations
//!
//! Concrete implementations of the `ember-core` traits on top of
//! `embedded-hal` 1.0:
//!
//! - PWM laser with an enable line
//! - GPIO cooling fan
//! - Lid interlock switch
//! - Step/direction two-axis gantry with home switches

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
#[macro_use]
extern crate std;

pub mod fan;
pub mod gantry;
pub mod laser;
pub mod lid;

#[cfg(test)]
mod mock;

pub use fan::GpioFan;
pub use gantry::{AxisConfig, Gantry, StepDirAxis};
pub use laser::PwmLaser;
pub use lid::LidSwitch;
