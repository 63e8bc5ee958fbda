//! UPS Lite battery indicator plugin
//!
//! Adds a battery element to the host status view, refreshes it from the CW2015 fuel gauge
//! on every host update tick and powers the system off once the battery is exhausted.
//!
//! The host owns the tick cadence. This crate only provides the lifecycle hooks
//! ([`Plugin`]), the view model they draw into ([`View`]) and the plugin itself
//! ([`UpsLite`]).
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use upslite_config::UpsLiteConfig;
//! use upslite_hal::mock::{MockBackend, MockPower};
//! use upslite_plugin::{NullRenderer, Plugin, UpsLite, View};
//!
//! let backend = MockBackend::new();
//! backend.set_capacity(42.0);
//!
//! let view = View::new(250, 122, Box::new(NullRenderer));
//! let mut plugin = UpsLite::from_config(
//!     Box::new(backend),
//!     Arc::new(MockPower::new()),
//!     &UpsLiteConfig::default(),
//! );
//!
//! plugin.on_loaded();
//! plugin.on_ui_setup(&view);
//! plugin.on_ui_update(&view).unwrap();
//! assert_eq!(view.get("ups").as_deref(), Some("42%-"));
//! ```

pub mod error;
pub mod plugin;
pub mod telemetry;
pub mod ups_lite;
pub mod view;

pub use error::PluginError;
pub use plugin::{Plugin, PluginMetadata};
pub use telemetry::TelemetrySample;
pub use ups_lite::{ELEMENT_KEY, EXHAUSTED_STATUS, PluginState, Tick, UpsLite};
pub use view::{
    Color, Font, LabeledValue, NullRenderer, RecordingRenderer, Renderer, View, ViewSnapshot,
    ViewState,
};
