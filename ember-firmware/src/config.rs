//! Boot-time configuration

use defmt::*;
use ember_core::config::parse_config;
use ember_core::EngraverConfig;

/// Parse the embedded engraver.toml, falling back to defaults
///
/// The build script runs the same parser over the same file, so the
/// fallback only guards against a build that skipped that check.
pub fn load(source: &str) -> EngraverConfig {
    match parse_config(source) {
        Ok(config) => {
            info!(
                "Config: {} baud, ack window {} ms, pixel timeout {} ms",
                config.link.baudrate, config.link.ack_timeout_ms, config.safety.pixel_timeout_ms
            );
            config
        }
        Err(e) => {
            warn!("engraver.toml rejected ({}), using defaults", e);
            EngraverConfig::default()
        }
    }
}
