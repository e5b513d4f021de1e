use gloo::events::EventListener;
use gloo::timers::callback::Timeout;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, HtmlElement};

pub const TOGGLE_ID: &str = "pool-guideline-toggle";
pub const HINT_ID: &str = "pool-guideline-hint";

const TOGGLE_LABEL_MANUAL: &str = "Guidelines: manual";
const TOGGLE_LABEL_AUTO: &str = "Guidelines: auto";
const TOGGLE_COLOR_MANUAL: &str = "rgba(0, 160, 0, 0.85)";
const TOGGLE_COLOR_AUTO: &str = "rgba(40, 40, 40, 0.85)";

fn append_fixed(document: &Document, tag: &str, id: &str) -> Result<HtmlElement, JsValue> {
    let element = document.create_element(tag)?.dyn_into::<HtmlElement>()?;
    element.set_id(id);
    let style = element.style();
    style.set_property("position", "fixed")?;
    style.set_property("z-index", "10000")?;
    style.set_property("padding", "6px 12px")?;
    style.set_property("border-radius", "6px")?;
    style.set_property("color", "#fff")?;
    style.set_property("font", "13px sans-serif")?;
    document
        .body()
        .ok_or_else(|| JsValue::from_str("missing body"))?
        .append_child(&element)?;
    Ok(element)
}

/// Always-visible button flipping manual mode.
pub struct ToggleButton {
    element: HtmlElement,
    _click: EventListener,
}

impl ToggleButton {
    pub fn create<F>(document: &Document, manual_mode: bool, on_click: F) -> Result<Self, JsValue>
    where
        F: Fn() + 'static,
    {
        let element = append_fixed(document, "button", TOGGLE_ID)?;
        let style = element.style();
        style.set_property("right", "20px")?;
        style.set_property("bottom", "20px")?;
        style.set_property("border", "none")?;
        style.set_property("cursor", "pointer")?;
        style.set_property("pointer-events", "auto")?;
        let click = EventListener::new(&element, "click", move |_event| on_click());
        let toggle = Self {
            element,
            _click: click,
        };
        toggle.update(manual_mode);
        Ok(toggle)
    }

    pub fn update(&self, manual_mode: bool) {
        let (label, color) = if manual_mode {
            (TOGGLE_LABEL_MANUAL, TOGGLE_COLOR_MANUAL)
        } else {
            (TOGGLE_LABEL_AUTO, TOGGLE_COLOR_AUTO)
        };
        self.element.set_text_content(Some(label));
        let _ = self.element.style().set_property("background", color);
    }
}

/// Shows `text` near the top of the viewport and removes it after `dismiss_after_ms`.
pub fn show_hint(document: &Document, text: &str, dismiss_after_ms: u32) -> Result<(), JsValue> {
    let element = append_fixed(document, "div", HINT_ID)?;
    let style = element.style();
    style.set_property("top", "20px")?;
    style.set_property("left", "50%")?;
    style.set_property("transform", "translateX(-50%)")?;
    style.set_property("background", "rgba(0, 0, 0, 0.8)")?;
    style.set_property("pointer-events", "none")?;
    element.set_text_content(Some(text));
    Timeout::new(dismiss_after_ms, move || element.remove()).forget();
    Ok(())
}
