use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlCanvasElement, HtmlElement, Window};

use crate::overlay::OVERLAY_ID;
use pool_guideline_core::detect::{is_rendered, CandidateInfo, SurfaceCandidate};
use pool_guideline_core::{SurfaceKind, SurfaceProbe, TableGeometry};

pub fn viewport_size(window: &Window) -> (f64, f64) {
    let width = window
        .inner_width()
        .ok()
        .and_then(|value| value.as_f64())
        .unwrap_or(0.0);
    let height = window
        .inner_height()
        .ok()
        .and_then(|value| value.as_f64())
        .unwrap_or(0.0);
    (width, height)
}

fn bounds_of(element: &Element) -> TableGeometry {
    let rect = element.get_bounding_client_rect();
    TableGeometry::new(rect.left(), rect.top(), rect.width(), rect.height())
}

/// Live page DOM as seen by surface detection. Elements inside the overlay layer are
/// never candidates.
pub struct DomProbe {
    window: Window,
    document: Document,
}

impl DomProbe {
    pub fn new() -> Option<Self> {
        let window = web_sys::window()?;
        let document = window.document()?;
        Some(Self { window, document })
    }

    fn is_visible(&self, element: &HtmlElement) -> bool {
        let Ok(Some(style)) = self.window.get_computed_style(element) else {
            return false;
        };
        let display = style.get_property_value("display").unwrap_or_default();
        let visibility = style.get_property_value("visibility").unwrap_or_default();
        is_rendered(
            &display,
            &visibility,
            f64::from(element.offset_width()),
            f64::from(element.offset_height()),
        )
    }

    fn describe(&self, element: &Element, kind: SurfaceKind) -> Option<CandidateInfo> {
        let html = element.dyn_ref::<HtmlElement>()?;
        let (width, height) = match kind {
            SurfaceKind::Canvas => {
                let canvas = element.dyn_ref::<HtmlCanvasElement>()?;
                (f64::from(canvas.width()), f64::from(canvas.height()))
            }
            SurfaceKind::Container => (
                f64::from(html.offset_width()),
                f64::from(html.offset_height()),
            ),
        };
        Some(CandidateInfo {
            kind,
            width,
            height,
            visible: self.is_visible(html),
            bounds: bounds_of(element),
        })
    }
}

fn inside_overlay(element: &Element) -> bool {
    matches!(element.closest(&format!("#{OVERLAY_ID}")), Ok(Some(_)))
}

impl SurfaceProbe for DomProbe {
    type Handle = Element;

    fn query(&self, selector: &str, kind: SurfaceKind) -> Vec<SurfaceCandidate<Element>> {
        let Ok(nodes) = self.document.query_selector_all(selector) else {
            return Vec::new();
        };
        (0..nodes.length())
            .filter_map(|index| nodes.item(index))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .filter(|element| !inside_overlay(element))
            .filter_map(|element| {
                let info = self.describe(&element, kind)?;
                Some(SurfaceCandidate {
                    handle: element,
                    info,
                })
            })
            .collect()
    }

    fn measure(&self, handle: &Element) -> Option<TableGeometry> {
        handle.is_connected().then(|| bounds_of(handle))
    }
}
