mod background;
mod chrome;
mod controls;
mod dom;
mod input;
mod overlay;
mod persisted_store;
mod runtime;
mod scheduler;

use wasm_bindgen::prelude::*;

pub use dom::{viewport_size, DomProbe};
pub use overlay::{CanvasPainter, OverlayLayer, OVERLAY_ID};
pub use scheduler::IntervalScheduler;

/// Entry point of the content script injected into every page.
#[wasm_bindgen(js_name = startContentScript)]
pub fn start_content_script() {
    runtime::start();
}

/// Entry point of the extension's background service worker.
#[wasm_bindgen(js_name = startBackground)]
pub fn start_background() {
    background::start();
}
