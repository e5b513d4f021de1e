use std::f64::consts::TAU;

use js_sys::Array;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlElement};

use pool_guideline_core::aim::DASH_PATTERN;
use pool_guideline_core::{Painter, Point, StrokeStyle};

pub const OVERLAY_ID: &str = "pool-guideline-overlay";
const OVERLAY_Z_INDEX: &str = "9999";

/// Full-viewport, click-through drawing layer above the page.
pub struct OverlayLayer {
    container: HtmlElement,
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
}

impl OverlayLayer {
    pub fn create(document: &Document, width: f64, height: f64) -> Result<Self, JsValue> {
        let container = document.create_element("div")?.dyn_into::<HtmlElement>()?;
        container.set_id(OVERLAY_ID);
        let style = container.style();
        style.set_property("position", "fixed")?;
        style.set_property("top", "0")?;
        style.set_property("left", "0")?;
        style.set_property("width", "100%")?;
        style.set_property("height", "100%")?;
        style.set_property("pointer-events", "none")?;
        style.set_property("z-index", OVERLAY_Z_INDEX)?;

        let canvas = document
            .create_element("canvas")?
            .dyn_into::<HtmlCanvasElement>()?;
        let canvas_style = canvas.style();
        canvas_style.set_property("display", "block")?;
        canvas_style.set_property("width", "100%")?;
        canvas_style.set_property("height", "100%")?;
        let context = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;

        container.append_child(&canvas)?;
        document
            .body()
            .ok_or_else(|| JsValue::from_str("missing body"))?
            .append_child(&container)?;

        let layer = Self {
            container,
            canvas,
            context,
        };
        layer.resize(width, height);
        Ok(layer)
    }

    pub fn show(&self) {
        let _ = self.container.style().set_property("display", "block");
    }

    pub fn hide(&self) {
        let _ = self.container.style().set_property("display", "none");
    }

    /// Resizing the bitmap also wipes it.
    pub fn resize(&self, width: f64, height: f64) {
        self.canvas.set_width(width.max(0.0).round() as u32);
        self.canvas.set_height(height.max(0.0).round() as u32);
    }

    pub fn painter(&self) -> CanvasPainter<'_> {
        CanvasPainter::new(&self.canvas, &self.context)
    }
}

pub struct CanvasPainter<'a> {
    canvas: &'a HtmlCanvasElement,
    context: &'a CanvasRenderingContext2d,
}

impl<'a> CanvasPainter<'a> {
    pub fn new(canvas: &'a HtmlCanvasElement, context: &'a CanvasRenderingContext2d) -> Self {
        Self { canvas, context }
    }

    fn set_dash(&self, dashed: bool) {
        let segments = Array::new();
        if dashed {
            for length in DASH_PATTERN {
                segments.push(&JsValue::from_f64(length));
            }
        }
        let _ = self.context.set_line_dash(&segments);
    }
}

impl Painter for CanvasPainter<'_> {
    fn clear(&mut self) {
        self.context.clear_rect(
            0.0,
            0.0,
            f64::from(self.canvas.width()),
            f64::from(self.canvas.height()),
        );
    }

    fn set_style(&mut self, style: &StrokeStyle) {
        self.context.set_stroke_style_str(&style.color);
        self.context.set_global_alpha(style.opacity);
        self.context.set_line_width(style.width);
    }

    fn stroke_line(&mut self, from: Point, to: Point, dashed: bool) {
        self.set_dash(dashed);
        self.context.begin_path();
        self.context.move_to(from.x, from.y);
        self.context.line_to(to.x, to.y);
        self.context.stroke();
    }

    fn stroke_circle(&mut self, center: Point, radius: f64) {
        self.set_dash(false);
        self.context.begin_path();
        if self.context.arc(center.x, center.y, radius, 0.0, TAU).is_ok() {
            self.context.stroke();
        }
    }
}
