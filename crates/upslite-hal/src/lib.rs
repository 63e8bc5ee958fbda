//! Hardware Abstraction Layer (HAL) for the UPS Lite v1.3
//!
//! This crate drives the CW2015 fuel gauge found on the UPS Lite board and samples the
//! external power indicator wired to a Raspberry Pi GPIO line.
//!
//! # Hardware
//!
//! - CW2015 fuel gauge on I2C bus 1, device address 0x62
//! - External power indicator on BCM pin 4 (requires the bridge described in the UPS-Lite repo)
//!
//! # Example
//!
//! ```no_run
//! # #[cfg(feature = "rpi")]
//! # fn main() -> Result<(), upslite_hal::HalError> {
//! use upslite_hal::{FuelGauge, GaugeConfig, RpiBackend};
//!
//! let mut gauge = FuelGauge::open(&RpiBackend, &GaugeConfig::default())?;
//! gauge.quick_start()?;
//! println!("{:.2}V {:.1}%", gauge.voltage()?, gauge.capacity()?);
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "rpi"))]
//! # fn main() {}
//! ```

pub mod bus;
pub mod error;
pub mod fuel_gauge;
pub mod mock;
pub mod power;
#[cfg(feature = "rpi")]
pub mod rpi;

pub use bus::{BusFactory, InputLine, SmbusDevice};
pub use error::HalError;
pub use fuel_gauge::{
    CW2015_ADDRESS, ChargeState, FuelGauge, GaugeConfig, MODE_QUICK_START, Register, swap_word,
};
pub use power::{ShutdownAction, SystemPower};
#[cfg(feature = "rpi")]
pub use rpi::RpiBackend;

/// HAL Result type
pub type Result<T> = std::result::Result<T, HalError>;
