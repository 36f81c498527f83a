//! Framed serial link

/// Errors from the outbound side of the link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError {
    /// Transmit ring has no room for the frame
    TxFull,
}

/// Frame-level access to the serial link
///
/// Inbound frames are delimited by the byte-arrival context; this trait
/// only moves complete raw frames in and out.
pub trait PacketLink {
    /// Returns true if a complete inbound frame is waiting
    fn frame_ready(&self) -> bool;

    /// Copy the next inbound frame into `buf`
    ///
    /// Returns the number of bytes written, 0 if nothing usable was found.
    fn read_frame(&mut self, buf: &mut [u8]) -> usize;

    /// Queue a raw frame for transmission
    fn send(&mut self, frame: &[u8]) -> Result<(), LinkError>;
}
