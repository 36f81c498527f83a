//! Minimal TOML parser for `engraver.toml`
//!
//! Handles only the subset the engraver needs, not full TOML.
//!
//! Supported:
//! - `[section]` and `[section.N]` headers
//! - `key = value` pairs (integer, boolean)
//! - Comments (`# ...`), full-line and trailing
//!
//! Keys that are not recognised are rejected so typos do not silently fall
//! back to defaults.

use super::{ConfigError, EngraverConfig, PRESET_COUNT};

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Unknown or malformed section header
    InvalidSection,
    /// Key not valid in its section
    UnknownKey,
    /// Line is not a `key = value` pair
    InvalidLine,
    /// Value could not be parsed for its key
    InvalidValue,
    /// Values parsed but failed validation
    Invalid(ConfigError),
}

impl From<ConfigError> for ParseError {
    fn from(e: ConfigError) -> Self {
        ParseError::Invalid(e)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Link,
    Safety,
    Intensity(usize),
}

/// Parse and validate configuration
///
/// Missing sections and keys keep their defaults.
pub fn parse_config(input: &str) -> Result<EngraverConfig, ParseError> {
    let mut config = EngraverConfig::default();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = strip_comment(line).trim();
        if line.is_empty() {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            section = parse_section_header(&line[1..line.len() - 1])?;
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(ParseError::InvalidLine)?;
        apply_value(&mut config, section, key, value)?;
    }

    config.validate()?;
    Ok(config)
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    }
}

fn parse_section_header(header: &str) -> Result<Section, ParseError> {
    match header.trim() {
        "link" => Ok(Section::Link),
        "safety" => Ok(Section::Safety),
        other => {
            let index = other
                .strip_prefix("intensity.")
                .ok_or(ParseError::InvalidSection)?;
            let index: usize = index.parse().map_err(|_| ParseError::InvalidSection)?;
            if index < PRESET_COUNT {
                Ok(Section::Intensity(index))
            } else {
                Err(ParseError::InvalidSection)
            }
        }
    }
}

fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    let (key, value) = (key.trim(), value.trim());
    if key.is_empty() || value.is_empty() {
        return None;
    }
    Some((key, value))
}

/// Unsigned integer, `_` digit separators allowed
fn parse_int<T: TryFrom<u64>>(value: &str) -> Result<T, ParseError> {
    let mut acc: u64 = 0;
    let mut digits = 0;
    for c in value.chars() {
        match c {
            '_' if digits > 0 => {}
            '0'..='9' => {
                acc = acc
                    .checked_mul(10)
                    .and_then(|a| a.checked_add(u64::from(c as u8 - b'0')))
                    .ok_or(ParseError::InvalidValue)?;
                digits += 1;
            }
            _ => return Err(ParseError::InvalidValue),
        }
    }
    if digits == 0 {
        return Err(ParseError::InvalidValue);
    }
    T::try_from(acc).map_err(|_| ParseError::InvalidValue)
}

fn parse_bool(value: &str) -> Result<bool, ParseError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ParseError::InvalidValue),
    }
}

fn apply_value(
    config: &mut EngraverConfig,
    section: Section,
    key: &str,
    value: &str,
) -> Result<(), ParseError> {
    match (section, key) {
        (Section::Link, "baudrate") => config.link.baudrate = parse_int(value)?,
        (Section::Link, "ack_timeout_ms") => config.link.ack_timeout_ms = parse_int(value)?,
        (Section::Link, "poll_interval_ms") => config.link.poll_interval_ms = parse_int(value)?,
        (Section::Link, "pixel_attempts") => config.link.pixel_attempts = parse_int(value)?,
        (Section::Safety, "pixel_timeout_ms") => config.safety.pixel_timeout_ms = parse_int(value)?,
        (Section::Safety, "lid_poll_ms") => config.safety.lid_poll_ms = parse_int(value)?,
        (Section::Safety, "laser_settle_ms") => config.safety.laser_settle_ms = parse_int(value)?,
        (Section::Safety, "notify_host_on_fault") => {
            config.safety.notify_host_on_fault = parse_bool(value)?
        }
        (Section::Intensity(i), "duty_permille") => config.presets[i].duty_permille = parse_int(value)?,
        (Section::Intensity(i), "duration_ms") => config.presets[i].duration_ms = parse_int(value)?,
        _ => return Err(ParseError::UnknownKey),
    }
    Ok(())
}
