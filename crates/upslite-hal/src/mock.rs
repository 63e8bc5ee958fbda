//! Mock implementations for testing without real hardware
//!
//! This module provides a mock CW2015 register file, a mock charge indicator pin and a
//! mock power controller, allowing development and testing on desktop systems without
//! a UPS Lite attached.
//!
//! # Usage
//!
//! ```no_run
//! use upslite_hal::mock::MockBackend;
//! use upslite_hal::{FuelGauge, GaugeConfig};
//!
//! let backend = MockBackend::new();
//! backend.set_capacity(42.5);
//! backend.set_charging(true);
//!
//! let mut gauge = FuelGauge::open(&backend, &GaugeConfig::default()).unwrap();
//! assert_eq!(gauge.capacity().unwrap(), 42.5);
//! ```

use crate::bus::{BusFactory, InputLine, SmbusDevice};
use crate::fuel_gauge::{Register, swap_word};
use crate::power::ShutdownAction;
use crate::{HalError, Result};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

/// Environment variable selecting the mock backend, optionally holding a start capacity
pub const MOCK_DEVICE_ENV: &str = "UPSLITE_MOCK_DEVICE";

/// Shared mock state for synchronized access
#[derive(Debug, Clone)]
pub struct MockState {
    /// Register contents as an SMBus word read returns them (chip byte order)
    pub registers: HashMap<u8, u16>,
    /// Level of the charge indicator pin
    pub charging: bool,
    /// Opening the bus fails
    pub open_fault: bool,
    /// Every word read fails
    pub read_fault: bool,
    /// Every word write fails
    pub write_fault: bool,
    /// Configuring the charge pin fails
    pub gpio_fault: bool,
    /// Sampling the charge pin fails
    pub sample_fault: bool,
    /// Log of successful writes as (address, register, value)
    pub writes: Vec<(u16, u8, u16)>,
    /// Number of read attempts
    pub reads: usize,
}

impl MockState {
    pub fn new() -> Self {
        let mut registers = HashMap::new();
        registers.insert(Register::Vcell.addr(), swap_word(encode_volts(3.8)));
        registers.insert(Register::Soc.addr(), swap_word(encode_percent(85.0)));
        registers.insert(Register::Mode.addr(), 0);

        Self {
            registers,
            charging: false,
            open_fault: false,
            read_fault: false,
            write_fault: false,
            gpio_fault: false,
            sample_fault: false,
            writes: Vec::new(),
            reads: 0,
        }
    }
}

impl Default for MockState {
    fn default() -> Self {
        Self::new()
    }
}

fn encode_volts(volts: f32) -> u16 {
    (volts * 1000.0 / 0.305).round().clamp(0.0, u16::MAX as f32) as u16
}

fn encode_percent(percent: f32) -> u16 {
    (percent * 256.0).round().clamp(0.0, u16::MAX as f32) as u16
}

/// Mock bus factory handing out buses and pins backed by one shared state
#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    state: Arc<RwLock<MockState>>,
}

impl MockBackend {
    /// Create a backend with a discharging cell at 85%
    pub fn new() -> Self {
        Self::with_state(MockState::new())
    }

    pub fn with_state(state: MockState) -> Self {
        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }

    /// Create from environment variable, using its value as start capacity when numeric
    pub fn from_env() -> Self {
        let backend = Self::new();
        if let Some(capacity) = std::env::var(MOCK_DEVICE_ENV)
            .ok()
            .and_then(|s| s.trim().parse::<f32>().ok())
        {
            backend.set_capacity(capacity);
        }
        backend
    }

    /// Get shared state for manipulation in tests
    pub fn state(&self) -> Arc<RwLock<MockState>> {
        Arc::clone(&self.state)
    }

    fn update(&self, f: impl FnOnce(&mut MockState)) {
        if let Ok(mut state) = self.state.write() {
            f(&mut state);
        }
    }

    /// Store a raw word exactly as the bus will return it
    pub fn set_register(&self, register: Register, raw: u16) {
        self.update(|s| {
            s.registers.insert(register.addr(), raw);
        });
    }

    /// Simulate a state of charge
    pub fn set_capacity(&self, percent: f32) {
        self.set_register(Register::Soc, swap_word(encode_percent(percent)));
    }

    /// Simulate a cell voltage
    pub fn set_voltage(&self, volts: f32) {
        self.set_register(Register::Vcell, swap_word(encode_volts(volts)));
    }

    /// Simulate external power
    pub fn set_charging(&self, charging: bool) {
        self.update(|s| s.charging = charging);
    }

    pub fn set_read_fault(&self, fault: bool) {
        self.update(|s| s.read_fault = fault);
    }

    pub fn set_write_fault(&self, fault: bool) {
        self.update(|s| s.write_fault = fault);
    }

    pub fn set_sample_fault(&self, fault: bool) {
        self.update(|s| s.sample_fault = fault);
    }

    /// Successful writes so far
    pub fn writes(&self) -> Vec<(u16, u8, u16)> {
        self.state
            .read()
            .map(|s| s.writes.clone())
            .unwrap_or_default()
    }

    /// Read attempts so far
    pub fn reads(&self) -> usize {
        self.state.read().map(|s| s.reads).unwrap_or(0)
    }
}

impl BusFactory for MockBackend {
    fn open_bus(&self, bus: u8) -> Result<Box<dyn SmbusDevice>> {
        let fault = self.state.read().map(|s| s.open_fault).unwrap_or(true);
        if fault {
            return Err(HalError::BusUnavailable {
                bus,
                reason: "mock bus configured to fail".into(),
            });
        }
        tracing::debug!("[MOCK] Opened I2C bus {}", bus);
        Ok(Box::new(MockBus {
            state: self.state(),
        }))
    }

    fn input_pin(&self, bcm: u8) -> Result<Box<dyn InputLine>> {
        let fault = self.state.read().map(|s| s.gpio_fault).unwrap_or(true);
        if fault {
            return Err(HalError::Gpio {
                pin: bcm,
                reason: "mock pin configured to fail".into(),
            });
        }
        Ok(Box::new(MockPin {
            pin: bcm,
            state: self.state(),
        }))
    }
}

/// Mock SMBus session
pub struct MockBus {
    state: Arc<RwLock<MockState>>,
}

impl SmbusDevice for MockBus {
    fn read_word(&mut self, _address: u16, register: u8) -> Result<u16> {
        let mut state = self.state.write().map_err(|_| HalError::BusRead {
            register,
            reason: "mock state poisoned".into(),
        })?;
        state.reads += 1;

        if state.read_fault {
            return Err(HalError::BusRead {
                register,
                reason: "simulated read fault".into(),
            });
        }

        state
            .registers
            .get(&register)
            .copied()
            .ok_or_else(|| HalError::BusRead {
                register,
                reason: "no such register".into(),
            })
    }

    fn write_word(&mut self, address: u16, register: u8, value: u16) -> Result<()> {
        let mut state = self.state.write().map_err(|_| HalError::BusWrite {
            register,
            reason: "mock state poisoned".into(),
        })?;

        if state.write_fault {
            return Err(HalError::BusWrite {
                register,
                reason: "simulated write fault".into(),
            });
        }

        state.writes.push((address, register, value));
        tracing::debug!("[MOCK] Wrote 0x{:04x} to register 0x{:02x}", value, register);
        Ok(())
    }
}

/// Mock charge indicator pin
pub struct MockPin {
    pin: u8,
    state: Arc<RwLock<MockState>>,
}

impl InputLine for MockPin {
    fn is_high(&self) -> Result<bool> {
        let state = self.state.read().map_err(|_| HalError::Gpio {
            pin: self.pin,
            reason: "mock state poisoned".into(),
        })?;

        if state.sample_fault {
            return Err(HalError::Gpio {
                pin: self.pin,
                reason: "simulated sample fault".into(),
            });
        }

        Ok(state.charging)
    }
}

/// Mock power controller counting shutdown requests
#[derive(Debug, Default)]
pub struct MockPower {
    shutdowns: AtomicUsize,
    fail: bool,
}

impl MockPower {
    pub fn new() -> Self {
        Self::default()
    }

    /// A controller whose shutdown always fails
    pub fn failing() -> Self {
        Self {
            shutdowns: AtomicUsize::new(0),
            fail: true,
        }
    }

    /// Number of shutdown requests received
    pub fn shutdowns(&self) -> usize {
        self.shutdowns.load(Ordering::SeqCst)
    }
}

impl ShutdownAction for MockPower {
    fn shutdown(&self) -> Result<()> {
        self.shutdowns.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(HalError::Shutdown("mock power configured to fail".into()));
        }
        tracing::info!("[MOCK] Shutdown requested");
        Ok(())
    }
}
