//! Burn command payload
//!
//! The four stored payload bytes form a little-endian u32 word:
//!
//! ```text
//!  31  29 28  27 26            14 13             1   0
//! ┌──────┬──────┬────────────────┬────────────────┬───┐
//! │ rsvd │ int  │   horizontal   │    vertical    │ r │
//! └──────┴──────┴────────────────┴────────────────┴───┘
//! ```

const VERTICAL_MASK: u32 = 0x0000_3FFE;
const VERTICAL_SHIFT: u32 = 1;
const HORIZONTAL_MASK: u32 = 0x07FF_C000;
const HORIZONTAL_SHIFT: u32 = 14;
const INTENSITY_MASK: u32 = 0x1800_0000;
const INTENSITY_SHIFT: u32 = 27;

/// Burn payload length in bytes
pub const BURN_PAYLOAD_LEN: usize = 4;

/// Laser intensity step selected by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IntensityLevel {
    Low,
    Medium,
    High,
    Max,
}

impl IntensityLevel {
    /// Parse from the low two bits of `bits`
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0 => IntensityLevel::Low,
            1 => IntensityLevel::Medium,
            2 => IntensityLevel::High,
            _ => IntensityLevel::Max,
        }
    }

    /// Two-bit field value
    pub fn bits(self) -> u8 {
        match self {
            IntensityLevel::Low => 0,
            IntensityLevel::Medium => 1,
            IntensityLevel::High => 2,
            IntensityLevel::Max => 3,
        }
    }

    /// Index into a four-entry preset table
    pub fn index(self) -> usize {
        self.bits() as usize
    }
}

/// A decoded Burn command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BurnCommand {
    /// Vertical position, 13 bits
    pub vertical: u16,
    /// Horizontal position, 13 bits
    pub horizontal: u16,
    /// Intensity step
    pub intensity: IntensityLevel,
}

impl BurnCommand {
    /// Largest value either position field can hold
    pub const MAX_POSITION: u16 = 0x1FFF;

    /// Split a packed burn word
    pub fn from_word(word: u32) -> Self {
        Self {
            vertical: ((word & VERTICAL_MASK) >> VERTICAL_SHIFT) as u16,
            horizontal: ((word & HORIZONTAL_MASK) >> HORIZONTAL_SHIFT) as u16,
            intensity: IntensityLevel::from_bits(((word & INTENSITY_MASK) >> INTENSITY_SHIFT) as u8),
        }
    }

    /// Decode from a payload in stored order
    ///
    /// Returns `None` unless the payload is exactly four bytes.
    pub fn from_payload(payload: &[u8]) -> Option<Self> {
        let bytes: [u8; BURN_PAYLOAD_LEN] = payload.try_into().ok()?;
        Some(Self::from_word(u32::from_le_bytes(bytes)))
    }

    /// Pack into a burn word, reserved bits cleared
    ///
    /// Positions wider than 13 bits are truncated.
    pub fn to_word(&self) -> u32 {
        ((u32::from(self.vertical) << VERTICAL_SHIFT) & VERTICAL_MASK)
            | ((u32::from(self.horizontal) << HORIZONTAL_SHIFT) & HORIZONTAL_MASK)
            | ((u32::from(self.intensity.bits()) << INTENSITY_SHIFT) & INTENSITY_MASK)
    }

    /// Payload in stored order
    pub fn to_payload(&self) -> [u8; BURN_PAYLOAD_LEN] {
        self.to_word().to_le_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_reference_vector() {
        let burn = BurnCommand::from_payload(&[0x0E, 0x00, 0x02, 0x08]).unwrap();
        assert_eq!(burn.vertical, 7);
        assert_eq!(burn.horizontal, 8);
        assert_eq!(burn.intensity, IntensityLevel::Medium);
    }

    #[test]
    fn test_decode_horizontal_high_bits() {
        // 0x0280_000E: horizontal field holds 0xA00, intensity bits are clear
        let burn = BurnCommand::from_payload(&[0x0E, 0x00, 0x80, 0x02]).unwrap();
        assert_eq!(burn.vertical, 7);
        assert_eq!(burn.horizontal, 2560);
        assert_eq!(burn.intensity, IntensityLevel::Low);
    }

    #[test]
    fn test_reserved_bits_ignored() {
        let word = 0xE000_0001 | BurnCommand::from_word(0x0802_000E).to_word();
        let burn = BurnCommand::from_word(word);
        assert_eq!((burn.vertical, burn.horizontal), (7, 8));
        assert_eq!(burn.intensity, IntensityLevel::Medium);
    }

    #[test]
    fn test_wrong_length_rejected() {
        assert!(BurnCommand::from_payload(&[0x0E, 0x00, 0x02]).is_none());
        assert!(BurnCommand::from_payload(&[]).is_none());
    }

    #[test]
    fn test_pack_matches_masks() {
        let burn = BurnCommand {
            vertical: BurnCommand::MAX_POSITION,
            horizontal: BurnCommand::MAX_POSITION,
            intensity: IntensityLevel::Max,
        };
        assert_eq!(burn.to_word(), 0x1FFF_FFFE);
        assert_eq!(BurnCommand::from_payload(&burn.to_payload()), Some(burn));
    }

    #[test]
    fn test_intensity_from_bits() {
        assert_eq!(IntensityLevel::from_bits(0), IntensityLevel::Low);
        assert_eq!(IntensityLevel::from_bits(3), IntensityLevel::Max);
        assert_eq!(IntensityLevel::from_bits(0b110), IntensityLevel::High);
        assert_eq!(IntensityLevel::High.index(), 2);
    }
}
