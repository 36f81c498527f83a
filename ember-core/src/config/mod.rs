//! Configuration types
//!
//! Board-agnostic settings for link timing, safety timing and the laser
//! intensity presets. Loaded from `engraver.toml` by [`parse_config`].

pub mod toml;

pub use self::toml::{parse_config, ParseError};

use ember_protocol::IntensityLevel;

/// Number of intensity presets selectable by a Burn command
pub const PRESET_COUNT: usize = 4;

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Baud rate of zero
    InvalidBaudrate,
    /// Ack window of zero would never see a reply
    ZeroAckTimeout,
    /// Poll interval of zero would never advance time
    ZeroPollInterval,
    /// Ready-for-pixel request needs at least one attempt
    ZeroPixelAttempts,
    /// Pixel timeout shorter than one ack window
    PixelTimeoutTooShort,
    /// Lid poll interval of zero
    ZeroLidPoll,
    /// Preset duty above 1000 permille
    DutyOutOfRange { level: u8 },
}

/// Serial link timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkConfig {
    /// UART baud rate
    pub baudrate: u32,
    /// How long to wait for an Ack after each transmission
    pub ack_timeout_ms: u32,
    /// Sleep between receive polls while idle or waiting for a reply
    pub poll_interval_ms: u32,
    /// Transmissions of the ready-for-pixel request before giving up
    pub pixel_attempts: u8,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            baudrate: 115_200,
            ack_timeout_ms: 100,
            poll_interval_ms: 1,
            pixel_attempts: 5,
        }
    }
}

/// Safety timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SafetyConfig {
    /// Max time between an acknowledged pixel request and the next Burn
    pub pixel_timeout_ms: u32,
    /// Lid poll interval while waiting on the operator
    pub lid_poll_ms: u32,
    /// Delay after arming the laser for the first pixel
    pub laser_settle_ms: u32,
    /// Broadcast an emergency stop after a motor fault
    pub notify_host_on_fault: bool,
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            pixel_timeout_ms: 5_000,
            lid_poll_ms: 10,
            laser_settle_ms: 1,
            notify_host_on_fault: true,
        }
    }
}

/// One laser pulse setting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IntensityPreset {
    /// PWM duty, 0..=1000
    pub duty_permille: u16,
    /// Pulse length
    pub duration_ms: u32,
}

const DEFAULT_PRESETS: [IntensityPreset; PRESET_COUNT] = [
    IntensityPreset { duty_permille: 250, duration_ms: 2 },
    IntensityPreset { duty_permille: 500, duration_ms: 3 },
    IntensityPreset { duty_permille: 750, duration_ms: 4 },
    IntensityPreset { duty_permille: 1000, duration_ms: 5 },
];

/// Complete engraver configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EngraverConfig {
    pub link: LinkConfig,
    pub safety: SafetyConfig,
    /// Indexed by [`IntensityLevel::index`]
    pub presets: [IntensityPreset; PRESET_COUNT],
}

impl Default for EngraverConfig {
    fn default() -> Self {
        Self {
            link: LinkConfig::default(),
            safety: SafetyConfig::default(),
            presets: DEFAULT_PRESETS,
        }
    }
}

impl EngraverConfig {
    /// Preset for an intensity level
    pub fn preset(&self, level: IntensityLevel) -> IntensityPreset {
        self.presets[level.index()]
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.link.baudrate == 0 {
            return Err(ConfigError::InvalidBaudrate);
        }
        if self.link.ack_timeout_ms == 0 {
            return Err(ConfigError::ZeroAckTimeout);
        }
        if self.link.poll_interval_ms == 0 {
            return Err(ConfigError::ZeroPollInterval);
        }
        if self.link.pixel_attempts == 0 {
            return Err(ConfigError::ZeroPixelAttempts);
        }
        if self.safety.pixel_timeout_ms < self.link.ack_timeout_ms {
            return Err(ConfigError::PixelTimeoutTooShort);
        }
        if self.safety.lid_poll_ms == 0 {
            return Err(ConfigError::ZeroLidPoll);
        }
        for (level, preset) in self.presets.iter().enumerate() {
            if preset.duty_permille > 1000 {
                return Err(ConfigError::DutyOutOfRange { level: level as u8 });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert_eq!(EngraverConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_preset_lookup() {
        let config = EngraverConfig::default();
        assert_eq!(config.preset(IntensityLevel::Low).duty_permille, 250);
        assert_eq!(config.preset(IntensityLevel::Max).duration_ms, 5);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = EngraverConfig::default();
        config.link.pixel_attempts = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroPixelAttempts));

        let mut config = EngraverConfig::default();
        config.presets[2].duty_permille = 1001;
        assert_eq!(config.validate(), Err(ConfigError::DutyOutOfRange { level: 2 }));

        let mut config = EngraverConfig::default();
        config.safety.pixel_timeout_ms = 10;
        assert_eq!(config.validate(), Err(ConfigError::PixelTimeoutTooShort));
    }
}
