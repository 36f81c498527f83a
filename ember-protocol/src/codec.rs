//! Frame encoding and decoding
//!
//! A [`Codec`] is bound to one side of the link. Both sides share the same
//! [`CommandTable`]; the endpoint decides which half of the table applies:
//! new commands are looked up in the direction they travel, replies in the
//! direction of the command they answer.

use heapless::Vec;

use crate::command::{AckKind, CommandId, CommandTable, Direction, Endpoint};
use crate::packet::{checksum, Packet};
use crate::{ESC, ETX, MAX_FRAME_LEN, MAX_PAYLOAD_LEN, MIN_FRAME_LEN, STX};

/// Errors that can occur while decoding a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeError {
    /// Frame too short, or STX/ETX missing or misplaced
    Framing {
        /// Command, if it was read before the error
        command: Option<CommandId>,
    },
    /// Command byte is not valid for this direction
    UnknownCommand {
        /// Raw command byte
        byte: u8,
    },
    /// Checksum does not match the decoded payload
    Checksum {
        command: CommandId,
        expected: u8,
        received: u8,
    },
}

impl DecodeError {
    /// Command to name in the Nak reply
    ///
    /// `None` means a bare Nak: the command byte was never read or is not a
    /// valid command.
    pub fn command(&self) -> Option<CommandId> {
        match self {
            DecodeError::Framing { command } => *command,
            DecodeError::UnknownCommand { .. } => None,
            DecodeError::Checksum { command, .. } => Some(*command),
        }
    }
}

/// Errors that can occur while encoding a packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EncodeError {
    /// New commands must name a command
    MissingCommand,
    /// Command not valid in the direction it would travel
    UnknownCommand(CommandId),
    /// Payload length does not match the command table
    PayloadLength { expected: usize, actual: usize },
    /// Buffer too small for the encoded frame
    BufferTooSmall,
}

/// Packet codec for one endpoint of the link
#[derive(Debug, Clone, Copy)]
pub struct Codec {
    endpoint: Endpoint,
    table: CommandTable,
}

impl Codec {
    /// Create a codec with an explicit command table
    pub const fn new(endpoint: Endpoint, table: CommandTable) -> Self {
        Self { endpoint, table }
    }

    /// Codec used by the engraving head
    pub const fn device() -> Self {
        Self::new(Endpoint::Device, CommandTable::standard())
    }

    /// Codec used by the host (and by test doubles of it)
    pub const fn host() -> Self {
        Self::new(Endpoint::Host, CommandTable::standard())
    }

    /// Direction a received frame's command is looked up in
    fn receive_direction(&self, ack: AckKind) -> Direction {
        if ack.is_reply() {
            self.endpoint.outbound()
        } else {
            self.endpoint.inbound()
        }
    }

    /// Direction a sent frame's command is looked up in
    fn send_direction(&self, ack: AckKind) -> Direction {
        if ack.is_reply() {
            self.endpoint.inbound()
        } else {
            self.endpoint.outbound()
        }
    }

    /// Decode a complete raw frame (STX through ETX)
    pub fn decode(&self, frame: &[u8]) -> Result<Packet, DecodeError> {
        if frame.len() < MIN_FRAME_LEN || frame[0] != STX {
            return Err(DecodeError::Framing { command: None });
        }

        let mut reader = Reader { frame, pos: 1 };

        let ack = match AckKind::from_sentinel(frame[1]) {
            Some(kind) => {
                reader.pos += 1;
                kind
            }
            None => AckKind::NewCommand,
        };

        let raw = reader
            .next()
            .ok_or(DecodeError::Framing { command: None })?;

        // Bare reply: sentinel immediately followed by the terminator
        if ack.is_reply() && raw == ETX && reader.at_end() {
            return Ok(Packet {
                ack,
                command: None,
                payload: Vec::new(),
            });
        }

        let command = CommandId::from_byte(raw).ok_or(DecodeError::UnknownCommand { byte: raw })?;
        let payload_len = self
            .table
            .payload_len(self.receive_direction(ack), command)
            .ok_or(DecodeError::UnknownCommand { byte: raw })?;

        let framing = DecodeError::Framing {
            command: Some(command),
        };

        let mut payload: Vec<u8, MAX_PAYLOAD_LEN> = Vec::new();
        if !ack.is_reply() && payload_len > 0 {
            payload.resize(payload_len, 0).map_err(|_| framing)?;

            // First byte on the wire is stored at the highest index
            for slot in payload.iter_mut().rev() {
                *slot = reader.next_unescaped().ok_or(framing)?;
            }

            let received = reader.next_unescaped().ok_or(framing)?;
            let expected = checksum(&payload);
            if received != expected {
                return Err(DecodeError::Checksum {
                    command,
                    expected,
                    received,
                });
            }
        }

        match reader.next() {
            Some(ETX) if reader.at_end() => Ok(Packet {
                ack,
                command: Some(command),
                payload,
            }),
            _ => Err(framing),
        }
    }

    /// Encode a packet into a byte buffer
    ///
    /// Returns the number of bytes written.
    pub fn encode(&self, packet: &Packet, buffer: &mut [u8]) -> Result<usize, EncodeError> {
        let mut writer = Writer { buffer, pos: 0 };
        writer.push(STX)?;

        match packet.ack.sentinel() {
            Some(sentinel) => {
                writer.push(sentinel)?;
                if let Some(command) = packet.command {
                    if !self.table.contains(self.send_direction(packet.ack), command) {
                        return Err(EncodeError::UnknownCommand(command));
                    }
                    writer.push(command.to_byte())?;
                }
            }
            None => {
                let command = packet.command.ok_or(EncodeError::MissingCommand)?;
                let expected = self
                    .table
                    .payload_len(self.send_direction(packet.ack), command)
                    .ok_or(EncodeError::UnknownCommand(command))?;
                if packet.payload.len() != expected {
                    return Err(EncodeError::PayloadLength {
                        expected,
                        actual: packet.payload.len(),
                    });
                }

                writer.push(command.to_byte())?;

                if !packet.payload.is_empty() {
                    for &byte in packet.payload.iter().rev() {
                        writer.push_escaped(byte)?;
                    }
                    writer.push_escaped(checksum(&packet.payload))?;
                }
            }
        }

        writer.push(ETX)?;
        Ok(writer.pos)
    }

    /// Encode a packet into a heapless Vec
    pub fn encode_to_vec(&self, packet: &Packet) -> Result<Vec<u8, MAX_FRAME_LEN>, EncodeError> {
        let mut buffer = [0u8; MAX_FRAME_LEN];
        let len = self.encode(packet, &mut buffer)?;
        let mut vec = Vec::new();
        vec.extend_from_slice(&buffer[..len])
            .map_err(|_| EncodeError::BufferTooSmall)?;
        Ok(vec)
    }
}

struct Reader<'a> {
    frame: &'a [u8],
    pos: usize,
}

impl Reader<'_> {
    fn next(&mut self) -> Option<u8> {
        let byte = *self.frame.get(self.pos)?;
        self.pos += 1;
        Some(byte)
    }

    /// Read one body byte, dropping a single leading ESC
    fn next_unescaped(&mut self) -> Option<u8> {
        match self.next()? {
            ESC => self.next(),
            byte => Some(byte),
        }
    }

    fn at_end(&self) -> bool {
        self.pos == self.frame.len()
    }
}

struct Writer<'a> {
    buffer: &'a mut [u8],
    pos: usize,
}

impl Writer<'_> {
    fn push(&mut self, byte: u8) -> Result<(), EncodeError> {
        let slot = self
            .buffer
            .get_mut(self.pos)
            .ok_or(EncodeError::BufferTooSmall)?;
        *slot = byte;
        self.pos += 1;
        Ok(())
    }

    fn push_escaped(&mut self, byte: u8) -> Result<(), EncodeError> {
        if crate::needs_escape(byte) {
            self.push(ESC)?;
        }
        self.push(byte)
    }
}
