use gloo::events::EventListener;
use wasm_bindgen::JsCast;
use web_sys::{Event, KeyboardEvent, MouseEvent, Window};

use crate::dom::viewport_size;
use pool_guideline_core::SessionEvent;

/// Page-lifetime keyboard, pointer and resize subscriptions feeding a session.
pub struct InputListeners {
    _listeners: Vec<EventListener>,
}

impl InputListeners {
    pub fn attach<F>(window: &Window, dispatch: F) -> Self
    where
        F: Fn(SessionEvent) + Clone + 'static,
    {
        let on_key_down = dispatch.clone();
        let key_down = EventListener::new(window, "keydown", move |event: &Event| {
            let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
                return;
            };
            // Auto-repeat would otherwise count as a second reset press.
            if event.repeat() {
                return;
            }
            on_key_down(SessionEvent::KeyDown { key: event.key() });
        });

        let on_key_up = dispatch.clone();
        let key_up = EventListener::new(window, "keyup", move |event: &Event| {
            if let Some(event) = event.dyn_ref::<KeyboardEvent>() {
                on_key_up(SessionEvent::KeyUp { key: event.key() });
            }
        });

        let on_pointer = dispatch.clone();
        let pointer = EventListener::new(window, "pointermove", move |event: &Event| {
            if let Some(event) = event.dyn_ref::<MouseEvent>() {
                on_pointer(SessionEvent::PointerMove {
                    x: f64::from(event.client_x()),
                    y: f64::from(event.client_y()),
                });
            }
        });

        let resized = window.clone();
        let resize = EventListener::new(window, "resize", move |_event: &Event| {
            let (width, height) = viewport_size(&resized);
            dispatch(SessionEvent::ViewportResized { width, height });
        });

        Self {
            _listeners: vec![key_down, key_up, pointer, resize],
        }
    }
}
