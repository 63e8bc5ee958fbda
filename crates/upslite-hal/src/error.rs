//! HAL error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HalError {
    #[error("I2C bus {bus} unavailable: {reason}")]
    BusUnavailable { bus: u8, reason: String },

    #[error("Failed to read register 0x{register:02x}: {reason}")]
    BusRead { register: u8, reason: String },

    #[error("Failed to write register 0x{register:02x}: {reason}")]
    BusWrite { register: u8, reason: String },

    #[error("GPIO {pin} unavailable: {reason}")]
    Gpio { pin: u8, reason: String },

    #[error("Shutdown failed: {0}")]
    Shutdown(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
