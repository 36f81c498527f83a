//! Ember Host Link Protocol
//!
//! This crate defines the serial protocol between the host (the machine
//! rasterising the picture) and the engraving head. It is split along the
//! receive path:
//!
//! - [`transport`]: single-producer/single-consumer byte rings shared with
//!   the byte-arrival context
//! - [`detector`]: frame boundary detection run on every received byte
//! - [`codec`]: frame <-> [`Packet`] conversion with escaping and checksums
//! - [`burn`]: the bit-packed position/intensity payload of a Burn command
//!
//! # Frame Format
//!
//! ```text
//! ┌─────┬───────────┬─────────┬─────────────────┬──────────┬─────┐
//! │ STX │ [ACK|NAK] │ COMMAND │ PAYLOAD         │ CHECKSUM │ ETX │
//! │ 1B  │ 0-1B      │ 1B      │ 0-4B (escaped)  │ 0-1B     │ 1B  │
//! └─────┴───────────┴─────────┴─────────────────┴──────────┴─────┘
//! ```
//!
//! Any payload or checksum byte equal to STX, ETX or ESC is preceded by ESC.
//! The checksum is only present when the payload is non-empty.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
#[macro_use]
extern crate std;

pub mod burn;
pub mod codec;
pub mod command;
pub mod detector;
pub mod packet;
pub mod transport;

pub use burn::{BurnCommand, IntensityLevel};
pub use codec::{Codec, DecodeError, EncodeError};
pub use command::{AckKind, CommandId, CommandTable, Direction, Endpoint};
pub use detector::{FrameDetector, Observation};
pub use packet::{checksum, Packet};
pub use transport::{RxChannel, RxConsumer, RxProducer, TransportError, TxChannel, TxConsumer, TxProducer};

/// Start of frame marker
pub const STX: u8 = 0x02;

/// End of frame marker
pub const ETX: u8 = 0x03;

/// Escape marker, precedes any payload byte equal to STX, ETX or ESC
pub const ESC: u8 = 0x1B;

/// Acknowledge sentinel
pub const ACK: u8 = 0x06;

/// Negative acknowledge sentinel
pub const NAK: u8 = 0x15;

/// Largest payload carried by any command
pub const MAX_PAYLOAD_LEN: usize = 4;

/// Smallest valid frame (STX + COMMAND + ETX)
pub const MIN_FRAME_LEN: usize = 3;

/// Largest possible frame on the wire
///
/// STX + ACK/NAK + COMMAND + fully escaped payload + escaped checksum + ETX
pub const MAX_FRAME_LEN: usize = 1 + 1 + 1 + 2 * MAX_PAYLOAD_LEN + 2 + 1;

/// Returns true if `byte` must be escaped inside a frame body
pub const fn needs_escape(byte: u8) -> bool {
    matches!(byte, STX | ETX | ESC)
}
