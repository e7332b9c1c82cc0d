//! Browser implementations of the platform traits

use glam::Vec2;
use web_sys::HtmlElement;

use super::{KeyValueStore, PlayField, TargetView};
use crate::consts::{PLAY_FIELD_HEIGHT, PLAY_FIELD_WIDTH};

/// Apply inline styles, logging any the browser rejects
pub fn set_styles(element: &HtmlElement, styles: &[(&str, &str)]) {
    let style = element.style();
    for (name, value) in styles {
        if let Err(e) = style.set_property(name, value) {
            log::warn!("Failed to set style {}: {:?}", name, e);
        }
    }
}

/// The play-field container element
pub struct DomField {
    element: HtmlElement,
}

impl DomField {
    /// Takes over the element's layout: positioned box of the play-field size
    pub fn new(element: HtmlElement) -> Self {
        let width = format!("{}px", PLAY_FIELD_WIDTH);
        let height = format!("{}px", PLAY_FIELD_HEIGHT);
        set_styles(
            &element,
            &[
                ("position", "relative"),
                ("box-sizing", "border-box"),
                ("width", width.as_str()),
                ("max-width", "100%"),
                ("height", height.as_str()),
                ("margin", "0 auto"),
                ("overflow", "hidden"),
                ("border", "2px solid #444"),
                ("background", "#f4f4f4"),
            ],
        );
        Self { element }
    }
}

impl PlayField for DomField {
    fn size(&self) -> Vec2 {
        Vec2::new(
            self.element.offset_width() as f32,
            self.element.offset_height() as f32,
        )
    }
}

/// The target element, positioned absolutely inside the container
pub struct DomTarget {
    element: HtmlElement,
}

impl DomTarget {
    /// Starts hidden; position and size are driven by the target controller
    pub fn new(element: HtmlElement) -> Self {
        set_styles(
            &element,
            &[
                ("position", "absolute"),
                ("box-sizing", "border-box"),
                ("border-radius", "50%"),
                ("background", "radial-gradient(circle, #e53935 30%, #b71c1c 100%)"),
                ("cursor", "crosshair"),
                ("opacity", "0"),
                ("pointer-events", "none"),
            ],
        );
        Self { element }
    }

    fn set_style(&self, name: &str, value: &str) {
        set_styles(&self.element, &[(name, value)]);
    }
}

impl TargetView for DomTarget {
    fn set_visible(&mut self, visible: bool) {
        self.set_style("opacity", if visible { "1" } else { "0" });
        self.set_style("pointer-events", if visible { "auto" } else { "none" });
    }

    fn set_position(&mut self, pos: Vec2) {
        self.set_style("left", &format!("{}px", pos.x));
        self.set_style("top", &format!("{}px", pos.y));
    }

    fn set_size(&mut self, size: f32) {
        let px = format!("{}px", size);
        self.set_style("width", &px);
        self.set_style("height", &px);
    }
}

/// window.localStorage
pub struct LocalStorage {
    storage: Option<web_sys::Storage>,
}

impl LocalStorage {
    pub fn new() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();
        if storage.is_none() {
            log::warn!("LocalStorage unavailable - settings will not persist");
        }
        Self { storage }
    }
}

impl Default for LocalStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for LocalStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.storage.as_ref()?.get_item(key).ok()?
    }

    fn set_item(&mut self, key: &str, value: &str) -> bool {
        match &self.storage {
            Some(storage) => storage.set_item(key, value).is_ok(),
            None => false,
        }
    }
}
