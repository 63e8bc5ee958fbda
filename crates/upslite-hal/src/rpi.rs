//! Raspberry Pi backend
//!
//! Uses rppal for `/dev/i2c-*` SMBus transfers and for the BCM GPIO lines.

use crate::bus::{BusFactory, InputLine, SmbusDevice};
use crate::{HalError, Result};
use rppal::gpio::{Gpio, InputPin};
use rppal::i2c::I2c;

/// Real hardware
#[derive(Debug, Clone, Copy, Default)]
pub struct RpiBackend;

impl BusFactory for RpiBackend {
    fn open_bus(&self, bus: u8) -> Result<Box<dyn SmbusDevice>> {
        let i2c = I2c::with_bus(bus).map_err(|e| HalError::BusUnavailable {
            bus,
            reason: e.to_string(),
        })?;

        Ok(Box::new(RpiBus {
            i2c,
            slave_address: None,
        }))
    }

    fn input_pin(&self, bcm: u8) -> Result<Box<dyn InputLine>> {
        let gpio_err = |e: rppal::gpio::Error| HalError::Gpio {
            pin: bcm,
            reason: e.to_string(),
        };

        let pin = Gpio::new().map_err(gpio_err)?.get(bcm).map_err(gpio_err)?;
        tracing::debug!("Configured GPIO {} as input", bcm);

        Ok(Box::new(RpiPin {
            pin: pin.into_input(),
        }))
    }
}

/// SMBus session on a Raspberry Pi I2C adapter
pub struct RpiBus {
    i2c: I2c,
    slave_address: Option<u16>,
}

impl RpiBus {
    /// Point the adapter at `address` unless it already is
    fn select(&mut self, address: u16) -> std::result::Result<(), rppal::i2c::Error> {
        if self.slave_address != Some(address) {
            self.i2c.set_slave_address(address)?;
            self.slave_address = Some(address);
        }
        Ok(())
    }
}

impl SmbusDevice for RpiBus {
    fn read_word(&mut self, address: u16, register: u8) -> Result<u16> {
        let read_err = |e: rppal::i2c::Error| HalError::BusRead {
            register,
            reason: e.to_string(),
        };

        self.select(address).map_err(read_err)?;
        self.i2c.smbus_read_word(register).map_err(read_err)
    }

    fn write_word(&mut self, address: u16, register: u8, value: u16) -> Result<()> {
        let write_err = |e: rppal::i2c::Error| HalError::BusWrite {
            register,
            reason: e.to_string(),
        };

        self.select(address).map_err(write_err)?;
        self.i2c
            .smbus_write_word(register, value)
            .map_err(write_err)
    }
}

/// BCM GPIO line configured as input
pub struct RpiPin {
    pin: InputPin,
}

impl InputLine for RpiPin {
    fn is_high(&self) -> Result<bool> {
        Ok(self.pin.is_high())
    }
}
