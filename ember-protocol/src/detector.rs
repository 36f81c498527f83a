//! Frame boundary detection
//!
//! Runs once per received byte in the byte-arrival context. An ETX ends the
//! frame only when the run of ESC bytes directly before it has even length
//! (zero included); an odd run means the ETX itself was escaped.

use crate::{ESC, ETX, STX};

/// What the detector made of one byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Observation {
    /// No frame in progress, byte is line noise
    Outside,
    /// Byte belongs to the frame in progress
    Accumulate,
    /// Byte is the terminating ETX of the frame in progress
    FrameEnd,
}

/// Frame-in-progress latch plus the current ESC run length
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameDetector {
    in_frame: bool,
    esc_run: usize,
}

impl FrameDetector {
    /// Create an idle detector
    pub const fn new() -> Self {
        Self {
            in_frame: false,
            esc_run: 0,
        }
    }

    /// Returns true while a frame has started but not ended
    pub fn in_frame(&self) -> bool {
        self.in_frame
    }

    /// Drop any frame in progress
    pub fn reset(&mut self) {
        self.in_frame = false;
        self.esc_run = 0;
    }

    /// Feed one byte
    pub fn observe(&mut self, byte: u8) -> Observation {
        if !self.in_frame {
            if byte == STX {
                self.in_frame = true;
                self.esc_run = 0;
                return Observation::Accumulate;
            }
            return Observation::Outside;
        }

        // STX inside a frame is plain data, no resynchronization
        match byte {
            ETX if self.esc_run % 2 == 0 => {
                self.reset();
                Observation::FrameEnd
            }
            ESC => {
                self.esc_run += 1;
                Observation::Accumulate
            }
            _ => {
                self.esc_run = 0;
                Observation::Accumulate
            }
        }
    }
}
