//! Plugin host
//!
//! Drives the plugin lifecycle against one view: load, UI setup, periodic update ticks
//! and unload on exit. Everything runs on the caller's thread, one hook at a time.

use anyhow::Result;
use std::time::Duration;
use tokio::signal::unix::{SignalKind, signal};
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, error, info, warn};
use upslite_plugin::{Plugin, View};

pub struct Host {
    view: View,
    tick_interval: Duration,
    plugins: Vec<Box<dyn Plugin>>,
}

impl Host {
    pub fn new(view: View, tick_interval: Duration) -> Self {
        Self {
            view,
            tick_interval,
            plugins: Vec::new(),
        }
    }

    pub fn register(&mut self, plugin: Box<dyn Plugin>) {
        let meta = plugin.metadata();
        info!("Registered plugin {} v{} ({})", meta.name, meta.version, meta.license);
        self.plugins.push(plugin);
    }

    /// Load every plugin and let it set up its view elements
    pub fn load(&mut self) {
        for plugin in &mut self.plugins {
            debug!("Loading plugin {}", plugin.metadata().name);
            plugin.on_loaded();
        }

        for plugin in &mut self.plugins {
            plugin.on_ui_setup(&self.view);
        }

        self.redraw(true);
    }

    /// One update tick. Returns the number of plugins whose update failed.
    pub fn tick(&mut self) -> usize {
        let mut failures = 0;
        for plugin in &mut self.plugins {
            if let Err(e) = plugin.on_ui_update(&self.view) {
                error!("Plugin {} update failed: {}", plugin.metadata().name, e);
                failures += 1;
            }
        }

        self.redraw(false);
        failures
    }

    /// Unload every plugin in reverse registration order
    pub fn unload(&mut self) {
        for plugin in self.plugins.iter_mut().rev() {
            debug!("Unloading plugin {}", plugin.metadata().name);
            plugin.on_unload(&self.view);
        }

        self.redraw(true);
    }

    fn redraw(&self, force: bool) {
        if let Err(e) = self.view.update(force, &[]) {
            warn!("Failed to redraw view: {}", e);
        }
    }

    /// Load, tick until SIGINT/SIGTERM, then unload
    pub async fn run(&mut self) -> Result<()> {
        self.load();

        let mut ticker = interval(self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut sigterm = signal(SignalKind::terminate())?;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.tick();
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Received interrupt");
                    break;
                }
                _ = sigterm.recv() => {
                    info!("Received shutdown signal");
                    break;
                }
            }
        }

        self.unload();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use upslite_plugin::{LabeledValue, PluginError, PluginMetadata, RecordingRenderer};

    /// Records the hooks it sees
    struct RecorderPlugin {
        calls: Calls,
        fail_updates: bool,
    }

    impl Plugin for RecorderPlugin {
        fn metadata(&self) -> PluginMetadata {
            PluginMetadata {
                name: "recorder",
                version: "0.0.1",
                author: "tests",
                license: "GPL3",
                description: "records lifecycle calls",
            }
        }

        fn on_loaded(&mut self) {
            self.calls.lock().unwrap().push("loaded");
        }

        fn on_ui_setup(&mut self, ui: &View) {
            self.calls.lock().unwrap().push("setup");
            ui.add_element("recorder", LabeledValue::new("P", "0", (0, 0)));
        }

        fn on_ui_update(&mut self, ui: &View) -> Result<(), PluginError> {
            self.calls.lock().unwrap().push("update");
            if self.fail_updates {
                return Err(PluginError::Render("recorder failure".into()));
            }
            ui.set("recorder", "1");
            Ok(())
        }

        fn on_unload(&mut self, ui: &View) {
            self.calls.lock().unwrap().push("unload");
            ui.lock().remove_element("recorder");
        }
    }

    type Calls = Arc<Mutex<Vec<&'static str>>>;

    fn host_with_recorder(fail_updates: bool) -> (Host, RecordingRenderer, Calls) {
        let renderer = RecordingRenderer::new();
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut host = Host::new(
            View::new(250, 122, Box::new(renderer.clone())),
            Duration::from_secs(1),
        );
        host.register(Box::new(RecorderPlugin {
            calls: Arc::clone(&calls),
            fail_updates,
        }));
        (host, renderer, calls)
    }

    #[test]
    fn test_lifecycle_order() {
        let (mut host, renderer, calls) = host_with_recorder(false);

        host.load();
        assert_eq!(host.tick(), 0);
        host.unload();

        assert_eq!(
            *calls.lock().unwrap(),
            vec!["loaded", "setup", "update", "unload"]
        );
        assert!(host.view.get("recorder").is_none());
        // setup (forced), update (dirty), unload (forced)
        assert_eq!(renderer.frames().len(), 3);
    }

    #[test]
    fn test_failed_update_is_counted_not_fatal() {
        let (mut host, _, calls) = host_with_recorder(true);

        host.load();
        assert_eq!(host.tick(), 1);
        assert_eq!(host.tick(), 1);

        let updates = calls.lock().unwrap().iter().filter(|c| **c == "update").count();
        assert_eq!(updates, 2);
    }
}
