//! Bus and pin abstractions
//!
//! The fuel gauge driver only needs SMBus word transfers and one digital input, so the
//! traits here are kept to exactly that. Backends live in [`crate::rpi`] (real hardware)
//! and [`crate::mock`] (desktop development and tests).

use crate::Result;

/// An open SMBus session on one I2C adapter.
///
/// Word transfers follow SMBus conventions: the low byte travels first on the wire, so a
/// device that sends its most significant byte first comes back byte-swapped.
pub trait SmbusDevice: Send {
    /// SMBus "read word data" from `register` of the device at `address`.
    fn read_word(&mut self, address: u16, register: u8) -> Result<u16>;

    /// SMBus "write word data" of `value` to `register` of the device at `address`.
    fn write_word(&mut self, address: u16, register: u8, value: u16) -> Result<()>;
}

/// A GPIO line already configured as a digital input.
pub trait InputLine: Send {
    /// Sample the current level of the line.
    fn is_high(&self) -> Result<bool>;
}

/// Opens bus sessions and input lines.
///
/// Injected once into the battery indicator so the choice between real hardware and the
/// mock backend is made by whoever builds the plugin.
pub trait BusFactory {
    /// Open the I2C adapter with the given index (`/dev/i2c-<bus>`).
    fn open_bus(&self, bus: u8) -> Result<Box<dyn SmbusDevice>>;

    /// Configure the BCM-numbered pin as an input and hand it over.
    fn input_pin(&self, bcm: u8) -> Result<Box<dyn InputLine>>;
}
