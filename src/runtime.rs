use std::cell::RefCell;

use gloo::console;
use serde_json::Value;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element};

use crate::chrome::{self, IncomingMessage};
use crate::controls::{self, ToggleButton};
use crate::dom::{viewport_size, DomProbe};
use crate::input::InputListeners;
use crate::overlay::OverlayLayer;
use crate::scheduler::IntervalScheduler;
use pool_guideline_core::detect::DETECT_POLL_INTERVAL_MS;
use pool_guideline_core::{
    decode_request, detect_surface, encode_request, encode_response, Effect, HeuristicDetector,
    OverlaySession, Painter, Request, Scheduler, SessionEvent, Settings, SettingsPatch,
    SurfaceProbe, TaskToken, Tick,
};

thread_local! {
    static CONTENT: RefCell<Option<ContentRuntime>> = RefCell::new(None);
}

/// Browser side of one page instance: the session plus the DOM objects its effects
/// act on.
struct ContentRuntime {
    session: OverlaySession,
    document: Document,
    layer: Option<OverlayLayer>,
    toggle: Option<ToggleButton>,
    surface: Option<Element>,
    scheduler: IntervalScheduler,
    detection: Option<TaskToken>,
    _input: InputListeners,
}

fn with_runtime<R>(f: impl FnOnce(&mut ContentRuntime) -> R) -> Option<R> {
    CONTENT.with(|slot| slot.borrow_mut().as_mut().map(f))
}

pub(crate) fn start() {
    let Some(window) = web_sys::window() else {
        return;
    };
    let Some(document) = window.document() else {
        return;
    };
    let hostname = window.location().hostname().unwrap_or_default();
    let (width, height) = viewport_size(&window);
    let input = InputListeners::attach(&window, dispatch);
    CONTENT.with(|slot| {
        *slot.borrow_mut() = Some(ContentRuntime {
            session: OverlaySession::new(&hostname, width, height),
            document,
            layer: None,
            toggle: None,
            surface: None,
            scheduler: IntervalScheduler::default(),
            detection: None,
            _input: input,
        });
    });
    if let Err(err) = chrome::on_message(handle_message) {
        console::warn!("pool guideline: message hook unavailable", chrome::js_err(err));
    }
    spawn_local(load_settings());
}

async fn load_settings() {
    let request = encode_request(&Request::GetSettings);
    let settings = match chrome::send_message(&request).await {
        Ok(reply) => reply
            .get("settings")
            .map(Settings::from_value)
            .unwrap_or_default(),
        Err(err) => {
            console::warn!(
                "pool guideline: settings unavailable, using defaults",
                chrome::js_err(err)
            );
            Settings::default()
        }
    };
    dispatch(SessionEvent::SettingsLoaded(settings));
    let Some((hostname, eligible)) =
        with_runtime(|rt| (rt.session.hostname().to_string(), rt.session.is_eligible()))
    else {
        return;
    };
    console::log!("pool guideline: settings loaded", hostname, eligible);
}

pub(crate) fn dispatch(event: SessionEvent) {
    let now = js_sys::Date::now();
    let effects = with_runtime(|rt| rt.session.handle(event, now)).unwrap_or_default();
    run_effects(effects);
}

fn handle_message(incoming: IncomingMessage) -> bool {
    let request = match decode_request(&incoming.message) {
        Ok(request) => request,
        Err(err) => {
            console::warn!("pool guideline: ignored message", err.to_string());
            return false;
        }
    };
    console::log!("pool guideline: message", request.action());
    let now = js_sys::Date::now();
    let Some((response, effects)) = with_runtime(|rt| rt.session.respond(request, now)) else {
        return false;
    };
    incoming.reply(&encode_response(&response));
    run_effects(effects);
    false
}

fn run_effects(effects: Vec<Effect>) {
    for effect in effects {
        apply_effect(effect);
    }
}

fn apply_effect(effect: Effect) {
    match effect {
        Effect::StartDetection => start_detection(),
        Effect::RemeasureSurface => {
            let bounds = with_runtime(|rt| {
                let surface = rt.surface.as_ref()?;
                DomProbe::new()?.measure(surface)
            })
            .flatten();
            if let Some(bounds) = bounds {
                dispatch(SessionEvent::SurfaceResized { bounds });
            }
        }
        Effect::PersistSettings(patch) => persist(patch),
        Effect::CreateLayer { width, height } => {
            with_runtime(|rt| match OverlayLayer::create(&rt.document, width, height) {
                Ok(layer) => {
                    console::log!("pool guideline: overlay created", width, height);
                    rt.layer = Some(layer);
                }
                Err(err) => console::warn!("pool guideline: overlay failed", chrome::js_err(err)),
            });
        }
        Effect::ShowLayer => {
            with_runtime(|rt| rt.layer.as_ref().map(OverlayLayer::show));
        }
        Effect::HideLayer => {
            with_runtime(|rt| rt.layer.as_ref().map(OverlayLayer::hide));
        }
        Effect::ResizeLayer { width, height } => {
            with_runtime(|rt| rt.layer.as_ref().map(|layer| layer.resize(width, height)));
        }
        Effect::Paint(frame) => {
            with_runtime(|rt| rt.layer.as_ref().map(|layer| frame.paint(&mut layer.painter())));
        }
        Effect::Clear => {
            with_runtime(|rt| rt.layer.as_ref().map(|layer| layer.painter().clear()));
        }
        Effect::CreateToggle { manual_mode } => {
            with_runtime(|rt| {
                let created = ToggleButton::create(&rt.document, manual_mode, || {
                    dispatch(SessionEvent::ToggleClicked)
                });
                match created {
                    Ok(toggle) => rt.toggle = Some(toggle),
                    Err(err) => {
                        console::warn!("pool guideline: toggle failed", chrome::js_err(err))
                    }
                }
            });
        }
        Effect::UpdateToggle { manual_mode } => {
            with_runtime(|rt| rt.toggle.as_ref().map(|toggle| toggle.update(manual_mode)));
        }
        Effect::ShowHint {
            text,
            dismiss_after_ms,
        } => {
            with_runtime(|rt| {
                if let Err(err) = controls::show_hint(&rt.document, &text, dismiss_after_ms) {
                    console::warn!("pool guideline: hint failed", chrome::js_err(err));
                }
            });
        }
    }
}

fn start_detection() {
    let polling = with_runtime(|rt| rt.detection.is_some_and(|t| rt.scheduler.is_active(t)));
    if polling.unwrap_or(false) {
        return;
    }
    console::log!("pool guideline: detection started");
    let tick: Tick = Box::new(|| {
        let Some(probe) = DomProbe::new() else {
            return false;
        };
        let Some(found) = detect_surface(&HeuristicDetector, &probe) else {
            return false;
        };
        let bounds = found.bounds;
        console::log!(
            "pool guideline: surface detected",
            format!("{:?}", found.kind),
            bounds.x,
            bounds.y,
            bounds.width,
            bounds.height
        );
        with_runtime(|rt| rt.surface = Some(found.handle));
        dispatch(SessionEvent::SurfaceDetected { bounds });
        true
    });
    with_runtime(|rt| {
        if let Some(stale) = rt.detection.take() {
            rt.scheduler.cancel(stale);
        }
        rt.detection = Some(rt.scheduler.start(DETECT_POLL_INTERVAL_MS, tick));
    });
}

fn persist(patch: SettingsPatch) {
    let message: Value = encode_request(&Request::UpdateSettings { settings: patch });
    spawn_local(async move {
        if let Err(err) = chrome::send_message(&message).await {
            console::warn!("pool guideline: settings write failed", chrome::js_err(err));
        }
    });
}
