//! WebAssembly support for canvas-bridge.
//!
//! DOM elements act as gesture surfaces, so a connector can be bound
//! straight to the page's canvas.

use wasm_bindgen::prelude::*;

use crate::{Rect, Surface};

/// Initialize the bridge WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages
    console_error_panic_hook::set_once();
}

#[allow(clippy::cast_possible_truncation)]
impl Surface for web_sys::Element {
    fn bounding_client_rect(&self) -> Rect {
        let bound = self.get_bounding_client_rect();
        Rect::new(
            bound.left() as f32,
            bound.top() as f32,
            bound.width() as f32,
            bound.height() as f32,
        )
    }
}

impl Surface for web_sys::HtmlCanvasElement {
    fn bounding_client_rect(&self) -> Rect {
        let element: &web_sys::Element = self.as_ref();
        element.bounding_client_rect()
    }
}
