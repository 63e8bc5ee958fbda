//! CW2015 fuel gauge driver
//!
//! The UPS Lite v1.3 carries a CellWise CW2015 single-cell fuel gauge. Only three
//! registers are used:
//!
//! | register | address | contents                                      |
//! |----------|---------|-----------------------------------------------|
//! | VCELL    | 0x02    | cell voltage, 14 bits, 305 uV per LSB         |
//! | SOC      | 0x04    | state of charge, high byte %, low byte 1/256 % |
//! | MODE     | 0x0A    | sleep / quick-start control                   |
//!
//! The chip returns the most significant byte first while SMBus word reads assume the
//! least significant byte first, so every word read is byte-swapped before scaling.

use crate::bus::{BusFactory, InputLine, SmbusDevice};
use crate::{HalError, Result};
use std::fmt;

/// CW2015 I2C device address
pub const CW2015_ADDRESS: u16 = 0x62;

/// MODE register value that triggers a quick-start of the fuel gauge estimate
pub const MODE_QUICK_START: u16 = 0x30;

/// Volts per VCELL LSB, scaled by 1000
const VCELL_MV_PER_LSB: f32 = 0.305;

/// CW2015 registers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Register {
    Vcell = 0x02,
    Soc = 0x04,
    Mode = 0x0A,
}

impl Register {
    pub fn addr(self) -> u8 {
        self as u8
    }
}

/// Direction of current through the cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChargeState {
    Charging,
    Discharging,
}

impl ChargeState {
    /// Single-character marker shown next to the percentage
    pub fn symbol(self) -> char {
        match self {
            ChargeState::Charging => '+',
            ChargeState::Discharging => '-',
        }
    }
}

impl fmt::Display for ChargeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Where to find the gauge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GaugeConfig {
    /// I2C adapter index, 1 is `/dev/i2c-1` on the Raspberry Pi header
    pub bus: u8,
    pub address: u16,
    /// BCM number of the external power indicator pin
    pub charge_pin: u8,
}

impl Default for GaugeConfig {
    fn default() -> Self {
        Self {
            bus: 1,
            address: CW2015_ADDRESS,
            charge_pin: 4,
        }
    }
}

/// Convert a word as returned by an SMBus read into the chip's byte order.
///
/// Packs big-endian and unpacks little-endian, i.e. swaps the two bytes.
pub fn swap_word(raw: u16) -> u16 {
    u16::from_le_bytes(raw.to_be_bytes())
}

/// Scale a byte-corrected VCELL word to volts
pub fn volts_from_vcell(word: u16) -> f32 {
    word as f32 * VCELL_MV_PER_LSB / 1000.0
}

/// Scale a byte-corrected SOC word to percent
pub fn percent_from_soc(word: u16) -> f32 {
    word as f32 / 256.0
}

/// CW2015 driver owning its bus session
pub struct FuelGauge {
    bus: Box<dyn SmbusDevice>,
    address: u16,
    charge_pin_number: u8,
    charge_pin: Option<Box<dyn InputLine>>,
}

impl FuelGauge {
    /// Open the bus and configure the charge indicator pin.
    ///
    /// Failing to open the bus is an error. Failing to set up the pin is only logged:
    /// the gauge still works and [`FuelGauge::charge_state`] reports the fault.
    pub fn open(factory: &dyn BusFactory, config: &GaugeConfig) -> Result<Self> {
        let bus = factory.open_bus(config.bus)?;
        tracing::info!(
            "Opened I2C bus {} for CW2015 at 0x{:02x}",
            config.bus,
            config.address
        );

        let charge_pin = match factory.input_pin(config.charge_pin) {
            Ok(pin) => Some(pin),
            Err(e) => {
                tracing::warn!("Charge indicator unavailable: {}", e);
                None
            }
        };

        Ok(Self::with_parts(bus, config, charge_pin))
    }

    /// Build a gauge from an already opened bus and pin
    pub fn with_parts(
        bus: Box<dyn SmbusDevice>,
        config: &GaugeConfig,
        charge_pin: Option<Box<dyn InputLine>>,
    ) -> Self {
        Self {
            bus,
            address: config.address,
            charge_pin_number: config.charge_pin,
            charge_pin,
        }
    }

    /// Read a register and put it in host order
    fn read_register(&mut self, register: Register) -> Result<u16> {
        let raw = self.bus.read_word(self.address, register.addr())?;
        Ok(swap_word(raw))
    }

    /// Cell voltage in volts
    pub fn voltage(&mut self) -> Result<f32> {
        self.read_register(Register::Vcell).map(volts_from_vcell)
    }

    /// State of charge in percent
    pub fn capacity(&mut self) -> Result<f32> {
        self.read_register(Register::Soc).map(percent_from_soc)
    }

    /// Sample the external power indicator
    pub fn charge_state(&self) -> Result<ChargeState> {
        let pin = self.charge_pin.as_ref().ok_or_else(|| HalError::Gpio {
            pin: self.charge_pin_number,
            reason: "not configured".into(),
        })?;

        Ok(if pin.is_high()? {
            ChargeState::Charging
        } else {
            ChargeState::Discharging
        })
    }

    /// Wake the gauge and make it recompute its estimate now instead of at the next cycle
    pub fn quick_start(&mut self) -> Result<()> {
        self.bus
            .write_word(self.address, Register::Mode.addr(), MODE_QUICK_START)
    }

    /// Whether the charge indicator pin was set up
    pub fn has_charge_pin(&self) -> bool {
        self.charge_pin.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockBackend, MockState};

    #[test]
    fn test_register_addresses() {
        assert_eq!(Register::Vcell.addr(), 0x02);
        assert_eq!(Register::Soc.addr(), 0x04);
        assert_eq!(Register::Mode.addr(), 0x0A);
    }

    #[test]
    fn test_swap_word() {
        assert_eq!(swap_word(0x1234), 0x3412);
        assert_eq!(swap_word(0x00ff), 0xff00);
        for raw in [0u16, 1, 0x0102, 0x8000, 0xfffe, u16::MAX] {
            assert_eq!(swap_word(swap_word(raw)), raw);
        }
    }

    #[test]
    fn test_scaling() {
        // 0x3200 = 50 in the high byte
        assert_eq!(percent_from_soc(0x3200), 50.0);
        assert_eq!(percent_from_soc(0x0780), 7.5);
        assert_eq!(volts_from_vcell(0), 0.0);
        assert!((volts_from_vcell(13115) - 4.000075).abs() < 1e-4);
    }

    #[test]
    fn test_default_config() {
        let config = GaugeConfig::default();
        assert_eq!(config.bus, 1);
        assert_eq!(config.address, 0x62);
        assert_eq!(config.charge_pin, 4);
    }

    #[test]
    fn test_reads_are_swapped_and_scaled() {
        let backend = MockBackend::new();
        backend.set_register(Register::Soc, swap_word(0x2a80));
        backend.set_register(Register::Vcell, swap_word(12000));

        let mut gauge = FuelGauge::open(&backend, &GaugeConfig::default()).unwrap();
        assert_eq!(gauge.capacity().unwrap(), 0x2a80 as f32 / 256.0);
        assert_eq!(gauge.voltage().unwrap(), 12000.0 * 0.305 / 1000.0);
    }

    #[test]
    fn test_quick_start_writes_mode_register() {
        let backend = MockBackend::new();
        let mut gauge = FuelGauge::open(&backend, &GaugeConfig::default()).unwrap();

        gauge.quick_start().unwrap();

        let writes = backend.writes();
        assert_eq!(writes, vec![(CW2015_ADDRESS, 0x0A, 0x30)]);
    }

    #[test]
    fn test_missing_pin_is_gpio_fault() {
        let state = MockState {
            gpio_fault: true,
            ..MockState::default()
        };
        let backend = MockBackend::with_state(state);
        let gauge = FuelGauge::open(&backend, &GaugeConfig::default()).unwrap();

        assert!(!gauge.has_charge_pin());
        assert!(matches!(
            gauge.charge_state(),
            Err(HalError::Gpio { pin: 4, .. })
        ));
    }

    #[test]
    fn test_charge_symbols() {
        assert_eq!(ChargeState::Charging.symbol(), '+');
        assert_eq!(ChargeState::Discharging.symbol(), '-');
        assert_eq!(ChargeState::Charging.to_string(), "+");
    }
}
