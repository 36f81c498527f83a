//! Command identifiers and the direction-aware payload table
//!
//! Commands are divided by direction:
//! - Host → Device: Burn, Start, End, Init
//! - Device → Host: PixelReady, Emergency, Init (initialization complete)
//!
//! Init exists in both directions with the same id.

use crate::{ACK, NAK};

// Command ids on the wire
const CMD_BURN: u8 = 0x42;
const CMD_START: u8 = 0x53;
const CMD_END: u8 = 0x45;
const CMD_INIT: u8 = 0x49;
const CMD_PIXEL_READY: u8 = 0x52;
const CMD_EMERGENCY: u8 = 0x58;

/// Command carried by a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandId {
    /// Burn one pixel (4-byte packed position + intensity)
    Burn,
    /// Begin a picture
    Start,
    /// Finish a picture
    End,
    /// Link initialization, sent by either side
    Init,
    /// Device is ready for the next pixel
    PixelReady,
    /// Device stopped burning because of a fault
    Emergency,
}

impl CommandId {
    /// Parse a command from its wire byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            CMD_BURN => Some(CommandId::Burn),
            CMD_START => Some(CommandId::Start),
            CMD_END => Some(CommandId::End),
            CMD_INIT => Some(CommandId::Init),
            CMD_PIXEL_READY => Some(CommandId::PixelReady),
            CMD_EMERGENCY => Some(CommandId::Emergency),
            _ => None,
        }
    }

    /// Convert to wire byte
    pub fn to_byte(self) -> u8 {
        match self {
            CommandId::Burn => CMD_BURN,
            CommandId::Start => CMD_START,
            CommandId::End => CMD_END,
            CommandId::Init => CMD_INIT,
            CommandId::PixelReady => CMD_PIXEL_READY,
            CommandId::Emergency => CMD_EMERGENCY,
        }
    }
}

/// Whether a frame is a new command or a reply to one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AckKind {
    /// A fresh command expecting a reply
    NewCommand,
    /// Positive reply
    Ack,
    /// Negative reply, the sender should retransmit
    Nak,
}

impl AckKind {
    /// Parse the optional sentinel byte following STX
    ///
    /// Returns `None` for any byte that is not ACK or NAK, meaning the frame
    /// is a new command and the byte is its command id.
    pub fn from_sentinel(byte: u8) -> Option<Self> {
        match byte {
            ACK => Some(AckKind::Ack),
            NAK => Some(AckKind::Nak),
            _ => None,
        }
    }

    /// Sentinel byte emitted after STX, if any
    pub fn sentinel(self) -> Option<u8> {
        match self {
            AckKind::NewCommand => None,
            AckKind::Ack => Some(ACK),
            AckKind::Nak => Some(NAK),
        }
    }

    /// Returns true for Ack and Nak
    pub fn is_reply(self) -> bool {
        !matches!(self, AckKind::NewCommand)
    }
}

/// Direction a command travels in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    HostToDevice,
    DeviceToHost,
}

/// Which side of the link a codec runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Endpoint {
    /// The engraving head
    Device,
    /// The host driving the picture
    Host,
}

impl Endpoint {
    /// Direction of new commands this endpoint receives
    pub fn inbound(self) -> Direction {
        match self {
            Endpoint::Device => Direction::HostToDevice,
            Endpoint::Host => Direction::DeviceToHost,
        }
    }

    /// Direction of new commands this endpoint sends
    pub fn outbound(self) -> Direction {
        match self {
            Endpoint::Device => Direction::DeviceToHost,
            Endpoint::Host => Direction::HostToDevice,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct CommandSpec {
    id: CommandId,
    direction: Direction,
    payload_len: usize,
}

const STANDARD_COMMANDS: [CommandSpec; 7] = [
    CommandSpec { id: CommandId::Burn, direction: Direction::HostToDevice, payload_len: 4 },
    CommandSpec { id: CommandId::Start, direction: Direction::HostToDevice, payload_len: 0 },
    CommandSpec { id: CommandId::End, direction: Direction::HostToDevice, payload_len: 0 },
    CommandSpec { id: CommandId::Init, direction: Direction::HostToDevice, payload_len: 0 },
    CommandSpec { id: CommandId::PixelReady, direction: Direction::DeviceToHost, payload_len: 0 },
    CommandSpec { id: CommandId::Emergency, direction: Direction::DeviceToHost, payload_len: 0 },
    CommandSpec { id: CommandId::Init, direction: Direction::DeviceToHost, payload_len: 0 },
];

/// Payload sizes keyed by (direction, command)
///
/// Replies (Ack/Nak) never carry a payload; the table only decides whether
/// a command id is valid for the direction it was replied to.
#[derive(Debug, Clone, Copy)]
pub struct CommandTable {
    entries: &'static [CommandSpec],
}

impl Default for CommandTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl CommandTable {
    /// The command set spoken by the engraving head and its host
    pub const fn standard() -> Self {
        Self {
            entries: &STANDARD_COMMANDS,
        }
    }

    /// Payload length of a new command travelling in `direction`
    ///
    /// Returns `None` if the command is not valid in that direction.
    pub fn payload_len(&self, direction: Direction, command: CommandId) -> Option<usize> {
        self.entries
            .iter()
            .find(|spec| spec.id == command && spec.direction == direction)
            .map(|spec| spec.payload_len)
    }

    /// Returns true if `command` is valid in `direction`
    pub fn contains(&self, direction: Direction, command: CommandId) -> bool {
        self.payload_len(direction, command).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{needs_escape, ESC, ETX, STX};

    const ALL: [CommandId; 6] = [
        CommandId::Burn,
        CommandId::Start,
        CommandId::End,
        CommandId::Init,
        CommandId::PixelReady,
        CommandId::Emergency,
    ];

    #[test]
    fn test_command_byte_roundtrip() {
        for cmd in ALL {
            assert_eq!(CommandId::from_byte(cmd.to_byte()), Some(cmd));
        }
    }

    #[test]
    fn test_command_bytes_never_collide_with_markers() {
        for cmd in ALL {
            let byte = cmd.to_byte();
            assert!(!needs_escape(byte));
            assert_ne!(byte, ACK);
            assert_ne!(byte, NAK);
        }
        assert!(CommandId::from_byte(STX).is_none());
        assert!(CommandId::from_byte(ETX).is_none());
        assert!(CommandId::from_byte(ESC).is_none());
    }

    #[test]
    fn test_direction_aware_lookup() {
        let table = CommandTable::standard();
        assert_eq!(table.payload_len(Direction::HostToDevice, CommandId::Burn), Some(4));
        assert_eq!(table.payload_len(Direction::HostToDevice, CommandId::Start), Some(0));
        assert_eq!(table.payload_len(Direction::DeviceToHost, CommandId::Burn), None);
        assert_eq!(table.payload_len(Direction::HostToDevice, CommandId::PixelReady), None);
        assert!(table.contains(Direction::HostToDevice, CommandId::Init));
        assert!(table.contains(Direction::DeviceToHost, CommandId::Init));
    }

    #[test]
    fn test_sentinels() {
        assert_eq!(AckKind::from_sentinel(ACK), Some(AckKind::Ack));
        assert_eq!(AckKind::from_sentinel(NAK), Some(AckKind::Nak));
        assert_eq!(AckKind::from_sentinel(0x42), None);
        assert_eq!(AckKind::NewCommand.sentinel(), None);
        assert!(AckKind::Nak.is_reply());
        assert!(!AckKind::NewCommand.is_reply());
    }

    #[test]
    fn test_endpoint_directions_mirror() {
        assert_eq!(Endpoint::Device.inbound(), Endpoint::Host.outbound());
        assert_eq!(Endpoint::Device.outbound(), Endpoint::Host.inbound());
    }
}
