//! Build script for ember-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates engraver.toml at compile time, with the `toml` crate for
//!   readable diagnostics and with the boot-time parser so that anything
//!   the firmware would reject fails the build

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Keys accepted in each section, with their upper bound
const LINK_KEYS: &[(&str, i64)] = &[
    ("baudrate", u32::MAX as i64),
    ("ack_timeout_ms", u32::MAX as i64),
    ("poll_interval_ms", u32::MAX as i64),
    ("pixel_attempts", u8::MAX as i64),
];
const SAFETY_KEYS: &[(&str, i64)] = &[
    ("pixel_timeout_ms", u32::MAX as i64),
    ("lid_poll_ms", u32::MAX as i64),
    ("laser_settle_ms", u32::MAX as i64),
];
const INTENSITY_KEYS: &[(&str, i64)] = &[("duty_permille", 1000), ("duration_ms", u32::MAX as i64)];

const PRESET_COUNT: usize = 4;

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate engraver.toml at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=engraver.toml");

    let config_path = Path::new("engraver.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: engraver.toml not found!                                 ║\n\
            ║                                                                  ║\n\
            ║  The firmware embeds engraver.toml at build time.                ║\n\
            ║  Please create one in the ember-firmware directory.              ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read engraver.toml                             ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in engraver.toml                     ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();
    validate_sections(&config, &mut errors);

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid engraver.toml                                    ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    validate_with_boot_parser(&config_content);

    println!("cargo:warning=engraver.toml validated successfully");
}

/// Run the firmware's own parser over the file
///
/// It accepts only a subset of TOML (decimal integers, `[section]`
/// headers, no inline tables), so valid TOML can still be rejected here.
fn validate_with_boot_parser(content: &str) {
    if let Err(e) = ember_core::config::parse_config(content) {
        let error_msg = format!("{:?}", e);
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: engraver.toml rejected by the firmware config parser     ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ║                                                                  ║\n\
            ║  Use plain decimal integers and one [section] header per table.  ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            format_error_lines(&error_msg)
        );
    }
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn validate_sections(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(root) = config.as_table() else {
        errors.push("top level must be a table".to_string());
        return;
    };

    for (name, value) in root {
        match name.as_str() {
            "link" => validate_table("link", value, LINK_KEYS, &[], errors),
            "safety" => validate_table("safety", value, SAFETY_KEYS, &["notify_host_on_fault"], errors),
            "intensity" => validate_presets(value, errors),
            other => errors.push(format!("unknown section [{}]", other)),
        }
    }
}

fn validate_presets(value: &toml::Value, errors: &mut Vec<String>) {
    let Some(presets) = value.as_table() else {
        errors.push("[intensity] must hold [intensity.N] tables".to_string());
        return;
    };

    for (index, preset) in presets {
        let name = format!("intensity.{}", index);
        match index.parse::<usize>() {
            Ok(i) if i < PRESET_COUNT => validate_table(&name, preset, INTENSITY_KEYS, &[], errors),
            _ => errors.push(format!("[{}] is not a level 0..{}", name, PRESET_COUNT - 1)),
        }
    }
}

/// Check a section's keys: integers within bounds, booleans where listed
fn validate_table(
    name: &str,
    value: &toml::Value,
    int_keys: &[(&str, i64)],
    bool_keys: &[&str],
    errors: &mut Vec<String>,
) {
    let Some(table) = value.as_table() else {
        errors.push(format!("[{}] must be a table", name));
        return;
    };

    for (key, value) in table {
        if let Some((_, max)) = int_keys.iter().find(|(k, _)| k == key) {
            match value.as_integer() {
                Some(n) if (0..=*max).contains(&n) => {}
                Some(n) => errors.push(format!("[{}] {} = {} is out of range 0..={}", name, key, n, max)),
                None => errors.push(format!("[{}] {} must be an integer", name, key)),
            }
        } else if bool_keys.contains(&key.as_str()) {
            if value.as_bool().is_none() {
                errors.push(format!("[{}] {} must be true or false", name, key));
            }
        } else {
            errors.push(format!("[{}] unknown key '{}'", name, key));
        }
    }
}
