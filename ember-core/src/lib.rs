//! Board-agnostic session logic for the engraving head
//!
//! This crate contains everything between the byte rings and the hardware
//! that does not depend on a specific board:
//!
//! - Hardware abstraction traits (laser, fan, gantry, lid, clock, link)
//! - Session state and command dispatch
//! - Request/acknowledge reliability layer
//! - Burn execution, halt action and pixel timeout
//! - Configuration types and the `engraver.toml` parser

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
#[macro_use]
extern crate std;

#[macro_use]
mod fmt;

pub mod burn;
pub mod config;
pub mod engraver;
pub mod reliability;
pub mod safety;
pub mod serial;
pub mod session;
pub mod traits;

#[cfg(test)]
mod testing;

pub use config::{EngraverConfig, IntensityPreset, LinkConfig, SafetyConfig};
pub use engraver::{Engraver, Head};
pub use reliability::{AttemptBudget, Outcome};
pub use safety::HaltReason;
pub use serial::SerialLink;
pub use session::{InitState, SessionState};
