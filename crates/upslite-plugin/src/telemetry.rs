//! One tick worth of battery readings

use upslite_hal::{ChargeState, FuelGauge, HalError};

/// Battery readings taken during a single update tick. Never cached across ticks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetrySample {
    /// Cell voltage in volts
    pub voltage: f32,
    /// State of charge in percent
    pub capacity: f32,
    pub charge: ChargeState,
}

impl TelemetrySample {
    /// Read all three values from the gauge.
    ///
    /// Faults are shown as zero volts, zero percent and discharging. A zero reading is
    /// indistinguishable from a failed one on the display; the fault itself is logged.
    pub fn read(gauge: &mut FuelGauge) -> Self {
        let voltage = or_zero(gauge.voltage(), "voltage");
        let capacity = or_zero(gauge.capacity(), "capacity");
        let charge = gauge.charge_state().unwrap_or_else(|e| {
            tracing::debug!("Charge state unavailable, assuming discharging: {}", e);
            ChargeState::Discharging
        });

        Self {
            voltage,
            capacity,
            charge,
        }
    }

    /// What is shown when there is no gauge at all
    pub fn unavailable() -> Self {
        Self {
            voltage: 0.0,
            capacity: 0.0,
            charge: ChargeState::Discharging,
        }
    }

    /// Whole percent, right-aligned to two columns, followed by the charge symbol.
    ///
    /// The percentage is truncated, not rounded: 7.8% charging reads `" 7%+"`.
    pub fn display_text(&self) -> String {
        format!("{:2}%{}", self.capacity.trunc() as i64, self.charge.symbol())
    }

    /// Whether the battery is at or below `threshold` percent
    pub fn is_exhausted(&self, threshold: f32) -> bool {
        self.capacity <= threshold
    }
}

fn or_zero(reading: Result<f32, HalError>, what: &str) -> f32 {
    match reading {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!("Battery {} unavailable, showing 0: {}", what, e);
            0.0
        }
    }
}
