//! Host status view
//!
//! A minimal model of the host's display: a map of labeled text elements plus a status
//! line, guarded by a single lock. Drawing is delegated to a [`Renderer`].

use crate::PluginError;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Key of the status line in [`View::update`] data
pub const STATUS_KEY: &str = "status";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Font {
    Bold,
    Medium,
    Small,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Black,
    White,
}

/// A label followed by a text value at a fixed position
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabeledValue {
    pub label: String,
    pub value: String,
    pub position: (u32, u32),
    pub label_font: Font,
    pub text_font: Font,
    pub color: Color,
}

impl LabeledValue {
    pub fn new(label: &str, value: &str, position: (u32, u32)) -> Self {
        Self {
            label: label.to_string(),
            value: value.to_string(),
            position,
            label_font: Font::Bold,
            text_font: Font::Medium,
            color: Color::Black,
        }
    }

    pub fn with_fonts(mut self, label_font: Font, text_font: Font) -> Self {
        self.label_font = label_font;
        self.text_font = text_font;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }
}

/// Mutable part of the view
#[derive(Debug, Default)]
pub struct ViewState {
    elements: BTreeMap<String, LabeledValue>,
    status: String,
    dirty: bool,
}

impl ViewState {
    pub fn add_element(&mut self, key: &str, element: LabeledValue) {
        self.elements.insert(key.to_string(), element);
        self.dirty = true;
    }

    pub fn remove_element(&mut self, key: &str) -> Option<LabeledValue> {
        let removed = self.elements.remove(key);
        if removed.is_some() {
            self.dirty = true;
        }
        removed
    }

    pub fn element(&self, key: &str) -> Option<&LabeledValue> {
        self.elements.get(key)
    }

    /// Set the value of `key`, or the status line for [`STATUS_KEY`].
    ///
    /// Returns false when no such element exists.
    pub fn set(&mut self, key: &str, value: &str) -> bool {
        if key == STATUS_KEY {
            if self.status != value {
                self.status = value.to_string();
                self.dirty = true;
            }
            return true;
        }

        match self.elements.get_mut(key) {
            Some(element) => {
                if element.value != value {
                    element.value = value.to_string();
                    self.dirty = true;
                }
                true
            }
            None => false,
        }
    }

    pub fn status(&self) -> &str {
        &self.status
    }
}

/// Serialisable copy of the view at one moment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewSnapshot {
    pub width: u32,
    pub height: u32,
    pub status: String,
    pub elements: BTreeMap<String, LabeledValue>,
}

impl ViewSnapshot {
    /// One-line text rendering, elements in key order then the status
    pub fn line(&self) -> String {
        let mut parts: Vec<String> = self
            .elements
            .iter()
            .map(|(key, e)| format!("{}: {}{}", key, e.label, e.value))
            .collect();
        if !self.status.is_empty() {
            parts.push(self.status.clone());
        }
        parts.join(" | ")
    }
}

/// Draws snapshots somewhere
pub trait Renderer: Send {
    fn render(&mut self, frame: &ViewSnapshot) -> Result<(), PluginError>;
}

/// Discards every frame
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn render(&mut self, _frame: &ViewSnapshot) -> Result<(), PluginError> {
        Ok(())
    }
}

/// Keeps every frame, for tests and headless hosts
#[derive(Debug, Default, Clone)]
pub struct RecordingRenderer {
    frames: Arc<Mutex<Vec<ViewSnapshot>>>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames rendered so far
    pub fn frames(&self) -> Vec<ViewSnapshot> {
        self.frames
            .lock()
            .map(|f| f.clone())
            .unwrap_or_default()
    }
}

impl Renderer for RecordingRenderer {
    fn render(&mut self, frame: &ViewSnapshot) -> Result<(), PluginError> {
        self.frames
            .lock()
            .map_err(|e| PluginError::Render(e.to_string()))?
            .push(frame.clone());
        Ok(())
    }
}

/// The host view shared by all plugins
pub struct View {
    width: u32,
    height: u32,
    state: Mutex<ViewState>,
    renderer: Mutex<Box<dyn Renderer>>,
}

impl View {
    pub fn new(width: u32, height: u32, renderer: Box<dyn Renderer>) -> Self {
        Self {
            width,
            height,
            state: Mutex::new(ViewState::default()),
            renderer: Mutex::new(renderer),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Exclusive access to the view state, released when the guard drops
    pub fn lock(&self) -> MutexGuard<'_, ViewState> {
        // A panicking plugin must not take the display down with it
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add_element(&self, key: &str, element: LabeledValue) {
        self.lock().add_element(key, element);
    }

    pub fn remove_element(&self, key: &str) -> Option<LabeledValue> {
        self.lock().remove_element(key)
    }

    /// Set an element value; unknown keys are ignored with a debug log
    pub fn set(&self, key: &str, value: &str) {
        if !self.lock().set(key, value) {
            tracing::debug!("Ignoring update of unknown view element {}", key);
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.lock().element(key).map(|e| e.value.clone())
    }

    pub fn status(&self) -> String {
        self.lock().status().to_string()
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        let state = self.lock();
        ViewSnapshot {
            width: self.width,
            height: self.height,
            status: state.status.clone(),
            elements: state.elements.clone(),
        }
    }

    /// Apply `new_data` and redraw when something changed or `force` is set.
    ///
    /// Returns whether a frame was rendered.
    pub fn update(&self, force: bool, new_data: &[(&str, &str)]) -> Result<bool, PluginError> {
        let frame = {
            let mut state = self.lock();
            for (key, value) in new_data {
                state.set(key, value);
            }
            if !force && !state.dirty {
                return Ok(false);
            }
            state.dirty = false;
            ViewSnapshot {
                width: self.width,
                height: self.height,
                status: state.status.clone(),
                elements: state.elements.clone(),
            }
        };

        self.renderer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .render(&frame)?;
        Ok(true)
    }
}
