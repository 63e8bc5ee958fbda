//! UPS Lite v1.3 battery indicator
//!
//! Shows the CW2015 state of charge next to a `+`/`-` external power marker and shuts the
//! system down once the charge reaches the configured threshold.

use crate::plugin::{Plugin, PluginMetadata};
use crate::view::{Color, Font, LabeledValue, STATUS_KEY, View};
use crate::{PluginError, TelemetrySample};
use std::sync::Arc;
use upslite_config::UpsLiteConfig;
use upslite_hal::{BusFactory, FuelGauge, GaugeConfig, ShutdownAction};

/// View element owned by this plugin
pub const ELEMENT_KEY: &str = "ups";

/// Element value until the first tick
pub const INITIAL_TEXT: &str = "0%/0V";

/// Status line shown right before powering off
pub const EXHAUSTED_STATUS: &str = "Battery exhausted, bye ...";

const METADATA: PluginMetadata = PluginMetadata {
    name: "ups_lite",
    version: "1.0.1",
    author: "evilsocket@gmail.com & LouD",
    license: "GPL3",
    description: "A plugin that will add a voltage indicator for the UPS Lite v1.3",
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginState {
    Active,
    Unloaded,
}

/// Outcome of one update tick
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub sample: TelemetrySample,
    /// Text written to the view element
    pub text: String,
    /// Whether shutdown was requested this tick
    pub shutdown: bool,
}

pub struct UpsLite {
    factory: Box<dyn BusFactory>,
    gauge_config: GaugeConfig,
    threshold: f32,
    power: Arc<dyn ShutdownAction>,
    gauge: Option<FuelGauge>,
    state: PluginState,
}

impl UpsLite {
    /// `threshold` is the shutdown percentage, fixed for the plugin's lifetime
    pub fn new(
        factory: Box<dyn BusFactory>,
        power: Arc<dyn ShutdownAction>,
        gauge_config: GaugeConfig,
        threshold: f32,
    ) -> Self {
        Self {
            factory,
            gauge_config,
            threshold,
            power,
            gauge: None,
            state: PluginState::Active,
        }
    }

    pub fn from_config(
        factory: Box<dyn BusFactory>,
        power: Arc<dyn ShutdownAction>,
        config: &UpsLiteConfig,
    ) -> Self {
        let gauge_config = GaugeConfig {
            bus: config.gauge.bus,
            address: config.gauge.address,
            charge_pin: config.gauge.charge_pin,
        };
        Self::new(factory, power, gauge_config, config.shutdown)
    }

    pub fn state(&self) -> PluginState {
        self.state
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Whether the fuel gauge bus is open
    pub fn has_gauge(&self) -> bool {
        self.gauge.is_some()
    }

    /// Run one update: quick-start, read, display, and shut down if exhausted.
    ///
    /// Read faults show as zero and, like a missing gauge, count as an empty battery.
    /// Only a quick-start fault is returned. A failed redraw or power-off request is
    /// logged and the tick still reports the shutdown, so the next tick retries.
    /// Returns `None` once unloaded.
    pub fn tick(&mut self, ui: &View) -> Result<Option<Tick>, PluginError> {
        if self.state == PluginState::Unloaded {
            tracing::debug!("[ups_lite] Ignoring update after unload");
            return Ok(None);
        }

        let sample = match self.gauge.as_mut() {
            Some(gauge) => {
                gauge.quick_start()?;
                TelemetrySample::read(gauge)
            }
            None => TelemetrySample::unavailable(),
        };

        let text = sample.display_text();
        ui.set(ELEMENT_KEY, &text);

        let shutdown = sample.is_exhausted(self.threshold);
        if shutdown {
            tracing::info!(
                "[ups_lite] Empty battery ({:.2}Volt {}% <= {}%): shutting down",
                sample.voltage,
                sample.capacity,
                self.threshold
            );
            if let Err(e) = ui.update(true, &[(STATUS_KEY, EXHAUSTED_STATUS)]) {
                tracing::warn!("[ups_lite] Failed to show shutdown status: {}", e);
            }
            if let Err(e) = self.power.shutdown() {
                tracing::error!("[ups_lite] Shutdown request failed: {}", e);
            }
        }

        Ok(Some(Tick {
            sample,
            text,
            shutdown,
        }))
    }
}

impl Plugin for UpsLite {
    fn metadata(&self) -> PluginMetadata {
        METADATA
    }

    fn on_loaded(&mut self) {
        if self.state != PluginState::Active || self.gauge.is_some() {
            return;
        }

        match FuelGauge::open(self.factory.as_ref(), &self.gauge_config) {
            Ok(gauge) => {
                if gauge.has_charge_pin() {
                    tracing::info!("[ups_lite] Plugin loaded");
                } else {
                    tracing::info!("[ups_lite] Plugin loaded, charge indicator unavailable");
                }
                self.gauge = Some(gauge);
            }
            Err(e) => {
                tracing::error!("[ups_lite] Fuel gauge unavailable, reporting empty readings: {}", e);
            }
        }
    }

    fn on_ui_setup(&mut self, ui: &View) {
        let position = (ui.width() / 2 + 15, 0);
        let element = LabeledValue::new("", INITIAL_TEXT, position)
            .with_fonts(Font::Bold, Font::Medium)
            .with_color(Color::Black);
        ui.add_element(ELEMENT_KEY, element);
    }

    fn on_ui_update(&mut self, ui: &View) -> Result<(), PluginError> {
        self.tick(ui).map(|_| ())
    }

    fn on_unload(&mut self, ui: &View) {
        let mut view = ui.lock();
        view.remove_element(ELEMENT_KEY);
        self.gauge = None;
        self.state = PluginState::Unloaded;
        tracing::info!("[ups_lite] Plugin unloaded");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NullRenderer;
    use upslite_hal::mock::{MockBackend, MockPower, MockState};

    fn plugin(backend: &MockBackend, power: &Arc<MockPower>, threshold: f32) -> UpsLite {
        UpsLite::new(
            Box::new(backend.clone()),
            power.clone(),
            GaugeConfig::default(),
            threshold,
        )
    }

    fn view() -> View {
        View::new(250, 122, Box::new(NullRenderer))
    }

    #[test]
    fn test_metadata() {
        let p = plugin(&MockBackend::new(), &Arc::new(MockPower::new()), 2.0);
        let meta = p.metadata();
        assert_eq!(meta.name, "ups_lite");
        assert_eq!(meta.version, "1.0.1");
    }

    #[test]
    fn test_setup_places_element() {
        let view = view();
        let mut p = plugin(&MockBackend::new(), &Arc::new(MockPower::new()), 2.0);
        p.on_ui_setup(&view);

        let snapshot = view.snapshot();
        let element = &snapshot.elements[ELEMENT_KEY];
        assert_eq!(element.position, (140, 0));
        assert_eq!(element.value, "0%/0V");
        assert_eq!(element.label, "");
        assert_eq!(element.label_font, Font::Bold);
        assert_eq!(element.text_font, Font::Medium);
        assert_eq!(element.color, Color::Black);
    }

    #[test]
    fn test_load_failure_reports_zero_and_shuts_down() {
        let backend = MockBackend::with_state(MockState {
            open_fault: true,
            ..MockState::default()
        });
        let power = Arc::new(MockPower::new());
        let view = view();
        let mut p = plugin(&backend, &power, 2.0);

        p.on_loaded();
        p.on_ui_setup(&view);
        assert!(!p.has_gauge());

        let tick = p.tick(&view).unwrap().unwrap();
        assert_eq!(tick.text, " 0%-");
        assert!(tick.shutdown);
        assert_eq!(power.shutdowns(), 1);
        assert_eq!(view.status(), EXHAUSTED_STATUS);
        // no bus, nothing to quick-start
        assert!(backend.writes().is_empty());
    }

    #[test]
    fn test_missing_gauge_respects_zero_threshold() {
        let backend = MockBackend::with_state(MockState {
            open_fault: true,
            ..MockState::default()
        });
        let power = Arc::new(MockPower::new());
        let view = view();
        let mut p = plugin(&backend, &power, 0.0);
        p.on_loaded();
        p.on_ui_setup(&view);

        // 0% <= 0% still qualifies
        assert!(p.tick(&view).unwrap().unwrap().shutdown);
        assert_eq!(power.shutdowns(), 1);
    }

    #[test]
    fn test_load_without_charge_pin_keeps_gauge() {
        let backend = MockBackend::with_state(MockState {
            gpio_fault: true,
            ..MockState::default()
        });
        let view = view();
        let mut p = plugin(&backend, &Arc::new(MockPower::new()), 2.0);
        p.on_loaded();
        p.on_ui_setup(&view);
        assert!(p.has_gauge());

        // charge reads fall back to discharging
        let tick = p.tick(&view).unwrap().unwrap();
        assert_eq!(tick.text, "85%-");
    }

    #[test]
    fn test_quick_start_precedes_reads() {
        let backend = MockBackend::new();
        let view = view();
        let mut p = plugin(&backend, &Arc::new(MockPower::new()), 2.0);
        p.on_loaded();
        p.on_ui_setup(&view);

        p.tick(&view).unwrap();
        assert_eq!(backend.writes().len(), 1);
        assert_eq!(backend.reads(), 2);
    }
}
