//! Host plugin lifecycle

use crate::{PluginError, View};

/// Descriptive plugin information shown by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PluginMetadata {
    pub name: &'static str,
    pub version: &'static str,
    pub author: &'static str,
    pub license: &'static str,
    pub description: &'static str,
}

/// Lifecycle hooks invoked by the host, always sequentially from one thread.
///
/// Every hook has a no-op default so a plugin only implements what it uses.
pub trait Plugin {
    fn metadata(&self) -> PluginMetadata;

    /// The plugin has been loaded and enabled
    fn on_loaded(&mut self) {}

    /// The view exists and elements may be added to it
    fn on_ui_setup(&mut self, _ui: &View) {}

    /// Periodic update tick, before the view is redrawn
    fn on_ui_update(&mut self, _ui: &View) -> Result<(), PluginError> {
        Ok(())
    }

    /// The plugin is being disabled or the host is exiting
    fn on_unload(&mut self, _ui: &View) {}
}
