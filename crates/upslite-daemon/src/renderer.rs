//! Status output for headless hosts

use std::fs;
use std::path::PathBuf;
use upslite_plugin::{PluginError, Renderer, ViewSnapshot};

/// Logs every frame and optionally publishes it as JSON
pub struct StatusRenderer {
    status_file: Option<PathBuf>,
}

impl StatusRenderer {
    pub fn new(status_file: Option<PathBuf>) -> Self {
        Self { status_file }
    }

    fn publish(&self, frame: &ViewSnapshot) -> std::io::Result<()> {
        let Some(path) = &self.status_file else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Readers never see a half-written file
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(frame).map_err(std::io::Error::other)?;
        fs::write(&tmp, json)?;
        fs::rename(&tmp, path)
    }
}

impl Renderer for StatusRenderer {
    fn render(&mut self, frame: &ViewSnapshot) -> Result<(), PluginError> {
        tracing::debug!("View: {}", frame.line());
        self.publish(frame)
            .map_err(|e| PluginError::Render(format!("status file: {}", e)))
    }
}
