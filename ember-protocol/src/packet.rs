//! Logical packets
//!
//! Payload bytes are stored in reverse transmission order: the byte sent
//! first on the wire lives at the highest index. Index 0 is therefore the
//! least significant byte of a multi-byte little-endian value such as the
//! burn word.

use heapless::Vec;

use crate::command::{AckKind, CommandId};
use crate::MAX_PAYLOAD_LEN;

/// Modular checksum of a payload
///
/// `256 - (sum mod 256)`, wrapping so that an all-zero payload yields 0.
pub fn checksum(payload: &[u8]) -> u8 {
    let sum = payload.iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
    0u8.wrapping_sub(sum)
}

/// A decoded frame
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Packet {
    /// New command or reply
    pub ack: AckKind,
    /// Command the frame carries or replies to
    ///
    /// `None` only for a bare reply, which is what a device sends when a
    /// frame fails before its command byte could be read.
    pub command: Option<CommandId>,
    /// Payload in stored (reverse transmission) order
    pub payload: Vec<u8, MAX_PAYLOAD_LEN>,
}

impl Packet {
    /// Create a new command with a payload in stored order
    ///
    /// Payloads longer than [`MAX_PAYLOAD_LEN`] are truncated; the codec
    /// rejects any length that does not match the command table.
    pub fn command(command: CommandId, stored_payload: &[u8]) -> Self {
        let len = stored_payload.len().min(MAX_PAYLOAD_LEN);
        let mut payload = Vec::new();
        // Cannot fail, length is clamped to capacity
        let _ = payload.extend_from_slice(&stored_payload[..len]);
        Self {
            ack: AckKind::NewCommand,
            command: Some(command),
            payload,
        }
    }

    /// Create a new command without payload
    pub fn empty(command: CommandId) -> Self {
        Self {
            ack: AckKind::NewCommand,
            command: Some(command),
            payload: Vec::new(),
        }
    }

    /// Positive reply to `command`
    pub fn ack(command: CommandId) -> Self {
        Self::reply(AckKind::Ack, Some(command))
    }

    /// Negative reply, bare when the command is unknown
    pub fn nak(command: Option<CommandId>) -> Self {
        Self::reply(AckKind::Nak, command)
    }

    fn reply(ack: AckKind, command: Option<CommandId>) -> Self {
        Self {
            ack,
            command,
            payload: Vec::new(),
        }
    }

    /// Returns true if this is an Ack for `command`
    pub fn acknowledges(&self, command: CommandId) -> bool {
        self.ack == AckKind::Ack && self.command == Some(command)
    }

    /// Returns true if this is a Nak for `command`
    pub fn rejects(&self, command: CommandId) -> bool {
        self.ack == AckKind::Nak && self.command == Some(command)
    }

    /// Checksum of the payload, `None` when the payload is empty
    pub fn checksum(&self) -> Option<u8> {
        if self.payload.is_empty() {
            None
        } else {
            Some(checksum(&self.payload))
        }
    }
}
