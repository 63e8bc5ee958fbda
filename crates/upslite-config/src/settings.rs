//! Per-subsystem settings

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Fuel gauge location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GaugeSettings {
    /// I2C adapter index (`/dev/i2c-<bus>`)
    #[serde(default = "default_bus")]
    pub bus: u8,

    /// CW2015 device address
    #[serde(default = "default_address")]
    pub address: u16,

    /// BCM pin wired to the external power indicator
    #[serde(default = "default_charge_pin")]
    pub charge_pin: u8,
}

fn default_bus() -> u8 {
    1
}

fn default_address() -> u16 {
    0x62
}

fn default_charge_pin() -> u8 {
    4
}

impl Default for GaugeSettings {
    fn default() -> Self {
        Self {
            bus: default_bus(),
            address: default_address(),
            charge_pin: default_charge_pin(),
        }
    }
}

/// Status display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplaySettings {
    /// Display width in pixels
    #[serde(default = "default_width")]
    pub width: u32,

    /// Display height in pixels
    #[serde(default = "default_height")]
    pub height: u32,

    /// Where to publish the rendered view as JSON
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_file: Option<PathBuf>,
}

// Waveshare 2.13" e-paper
fn default_width() -> u32 {
    250
}

fn default_height() -> u32 {
    122
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            status_file: None,
        }
    }
}

/// Power-off behaviour
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerSettings {
    /// Command run to power the system off, program first
    #[serde(default = "default_command")]
    pub command: Vec<String>,
}

fn default_command() -> Vec<String> {
    vec!["shutdown".into(), "-h".into(), "now".into()]
}

impl Default for PowerSettings {
    fn default() -> Self {
        Self {
            command: default_command(),
        }
    }
}
