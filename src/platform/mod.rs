//! Platform abstraction layer
//!
//! Narrow interfaces the simulation talks through:
//! - `PlayField`: measured size of the play-field container
//! - `TargetView`: visual toggle for the rendered target
//! - `KeyValueStore`: local storage (LocalStorage on web)

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use glam::Vec2;

#[cfg(target_arch = "wasm32")]
pub mod web;

/// Container geometry query
pub trait PlayField {
    /// Current measured size of the container. May be zero before layout.
    fn size(&self) -> Vec2;
}

/// Rendering sink for the target element
pub trait TargetView {
    fn set_visible(&mut self, visible: bool);
    fn set_position(&mut self, pos: Vec2);
    fn set_size(&mut self, size: f32);
}

/// String key/value storage
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> Option<String>;
    /// Returns false if the write was rejected (quota, private mode...)
    fn set_item(&mut self, key: &str, value: &str) -> bool;
}

/// Play field with a fixed size, shareable so tests can resize it mid-session
#[derive(Debug, Clone, Default)]
pub struct FixedField {
    size: Rc<RefCell<Vec2>>,
}

impl FixedField {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: Rc::new(RefCell::new(Vec2::new(width, height))),
        }
    }

    pub fn resize(&self, width: f32, height: f32) {
        *self.size.borrow_mut() = Vec2::new(width, height);
    }
}

impl PlayField for FixedField {
    fn size(&self) -> Vec2 {
        *self.size.borrow()
    }
}

/// View that ignores every update (headless runs)
#[derive(Debug, Clone, Copy, Default)]
pub struct NullView;

impl TargetView for NullView {
    fn set_visible(&mut self, _visible: bool) {}
    fn set_position(&mut self, _pos: Vec2) {}
    fn set_size(&mut self, _size: f32) {}
}

/// Snapshot of what a view has been told so far
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    pub visible: bool,
    pub position: Vec2,
    pub size: f32,
    /// Number of hidden -> visible transitions
    pub shows: u32,
}

/// View that records its latest state behind a shared handle
#[derive(Debug, Clone, Default)]
pub struct RecordingView {
    state: Rc<RefCell<ViewState>>,
}

impl RecordingView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> ViewState {
        self.state.borrow().clone()
    }
}

impl TargetView for RecordingView {
    fn set_visible(&mut self, visible: bool) {
        let mut state = self.state.borrow_mut();
        if visible && !state.visible {
            state.shows += 1;
        }
        state.visible = visible;
    }

    fn set_position(&mut self, pos: Vec2) {
        self.state.borrow_mut().position = pos;
    }

    fn set_size(&mut self, size: f32) {
        self.state.borrow_mut().size = size;
    }
}

/// In-memory storage (native builds and tests)
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    items: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.get(key).cloned()
    }

    fn set_item(&mut self, key: &str, value: &str) -> bool {
        self.items.insert(key.to_string(), value.to_string());
        true
    }
}
