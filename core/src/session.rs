use crate::activation::{matches_key, ActivationState, RenderState, Transition};
use crate::aim::{build_frame, Frame, StrokeStyle};
use crate::balls::{BallTracker, TrackerMode, RESET_KEY};
use crate::geometry::{Point, TableGeometry};
use crate::protocol::{Request, Response};
use crate::settings::{Settings, SettingsPatch};
use crate::site::SiteMatcher;
use crate::table::{Pocket, PocketLayout, TableModel};

pub const HINT_DISMISS_MS: u32 = 5000;

pub fn hint_text(activation_key: &str) -> String {
    format!(
        "Pool guidelines: hold {activation_key} and move the pointer to aim. \
         Press {RESET_KEY} twice to move the cue ball to the pointer."
    )
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DetectionPhase {
    Waiting,
    Polling,
    Found,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayerState {
    Absent,
    Visible,
    Hidden,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent {
    SettingsLoaded(Settings),
    SettingsPatched(SettingsPatch),
    SurfaceDetected { bounds: TableGeometry },
    SurfaceResized { bounds: TableGeometry },
    ViewportResized { width: f64, height: f64 },
    KeyDown { key: String },
    KeyUp { key: String },
    PointerMove { x: f64, y: f64 },
    ToggleClicked,
}

/// Work the host environment must carry out, in order.
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    StartDetection,
    CreateLayer { width: f64, height: f64 },
    ShowLayer,
    HideLayer,
    ResizeLayer { width: f64, height: f64 },
    /// Re-read the detected surface's bounds and report them as `SurfaceResized`.
    RemeasureSurface,
    Paint(Frame),
    Clear,
    CreateToggle { manual_mode: bool },
    UpdateToggle { manual_mode: bool },
    ShowHint { text: String, dismiss_after_ms: u32 },
    PersistSettings(SettingsPatch),
}

/// Owned context of one page instance: every piece of overlay state lives here and
/// changes only through [`OverlaySession::handle`] and [`OverlaySession::respond`].
pub struct OverlaySession {
    hostname: String,
    settings: Option<Settings>,
    pending: SettingsPatch,
    matcher: SiteMatcher,
    detection: DetectionPhase,
    surface: Option<TableGeometry>,
    table: Option<TableModel>,
    tracker: BallTracker,
    activation: ActivationState,
    viewport: (f64, f64),
    pointer: Option<Point>,
    layer: LayerState,
    toggle_created: bool,
    hint_shown: bool,
}

impl OverlaySession {
    pub fn new(hostname: &str, viewport_width: f64, viewport_height: f64) -> Self {
        Self {
            hostname: hostname.to_string(),
            settings: None,
            pending: SettingsPatch::default(),
            matcher: SiteMatcher::default(),
            detection: DetectionPhase::Waiting,
            surface: None,
            table: None,
            tracker: BallTracker::new(),
            activation: ActivationState::default(),
            viewport: (viewport_width, viewport_height),
            pointer: None,
            layer: LayerState::Absent,
            toggle_created: false,
            hint_shown: false,
        }
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn settings(&self) -> Option<&Settings> {
        self.settings.as_ref()
    }

    pub fn detection_phase(&self) -> DetectionPhase {
        self.detection
    }

    pub fn surface(&self) -> Option<TableGeometry> {
        self.surface
    }

    pub fn table(&self) -> Option<&TableModel> {
        self.table.as_ref()
    }

    pub fn pockets(&self) -> &[Pocket] {
        self.table.as_ref().map(TableModel::pockets).unwrap_or(&[])
    }

    pub fn tracker(&self) -> &BallTracker {
        &self.tracker
    }

    pub fn render_state(&self) -> RenderState {
        self.activation.render_state()
    }

    pub fn layer_state(&self) -> LayerState {
        self.layer
    }

    pub fn manual_active(&self) -> bool {
        self.activation.toggle_on()
    }

    pub fn is_eligible(&self) -> bool {
        match self.settings.as_ref() {
            Some(settings) => settings.allow_any_website || self.matcher.matches(&self.hostname),
            None => false,
        }
    }

    pub fn handle(&mut self, event: SessionEvent, now_ms: f64) -> Vec<Effect> {
        let mut effects = Vec::new();
        match event {
            SessionEvent::SettingsLoaded(mut settings) => {
                settings.apply(&std::mem::take(&mut self.pending));
                self.apply_settings(settings, &mut effects);
            }
            SessionEvent::SettingsPatched(patch) => self.apply_patch(&patch, &mut effects),
            SessionEvent::SurfaceDetected { bounds } => {
                self.detection = DetectionPhase::Found;
                self.update_surface(bounds, &mut effects);
            }
            SessionEvent::SurfaceResized { bounds } => {
                if self.surface.is_some() {
                    self.update_surface(bounds, &mut effects);
                }
            }
            SessionEvent::ViewportResized { width, height } => {
                self.resize_viewport(width, height, &mut effects)
            }
            SessionEvent::KeyDown { key } => self.key_down(&key, now_ms, &mut effects),
            SessionEvent::KeyUp { key } => self.key_up(&key, &mut effects),
            SessionEvent::PointerMove { x, y } => {
                self.pointer = Some(Point::new(x, y));
                if self.activation.is_armed() {
                    effects.push(self.redraw());
                }
            }
            SessionEvent::ToggleClicked => self.toggle_manual_mode(&mut effects),
        }
        effects
    }

    /// Answers a message addressed to this instance.
    pub fn respond(&mut self, request: Request, now_ms: f64) -> (Response, Vec<Effect>) {
        match request {
            Request::GetSettings => (
                Response::Settings {
                    settings: self.settings.clone().unwrap_or_default(),
                },
                Vec::new(),
            ),
            Request::ToggleEnabled => {
                let enabled = !self.settings.as_ref().map(|s| s.enabled).unwrap_or(true);
                let patch = SettingsPatch::enabled(enabled);
                let mut effects = vec![Effect::PersistSettings(patch.clone())];
                effects.extend(self.handle(SessionEvent::SettingsPatched(patch), now_ms));
                (Response::Enabled { enabled }, effects)
            }
            Request::UpdateSettings { settings } => {
                let effects = self.handle(SessionEvent::SettingsPatched(settings), now_ms);
                (Response::Success { success: true }, effects)
            }
            Request::GetDetectionStatus => (
                Response::DetectionStatus {
                    pool_game_detected: self.detection == DetectionPhase::Found,
                    manual_mode: self.manual_active(),
                },
                Vec::new(),
            ),
            Request::ToggleManualMode => {
                let mut effects = Vec::new();
                self.toggle_manual_mode(&mut effects);
                let manual_mode = self
                    .settings
                    .as_ref()
                    .map(|s| s.manual_mode)
                    .unwrap_or(false);
                (Response::ManualMode { manual_mode }, effects)
            }
        }
    }

    fn apply_patch(&mut self, patch: &SettingsPatch, effects: &mut Vec<Effect>) {
        let Some(current) = self.settings.as_ref() else {
            self.pending.merge(patch);
            return;
        };
        let mut next = current.clone();
        next.apply(patch);
        self.apply_settings(next, effects);
    }

    fn apply_settings(&mut self, next: Settings, effects: &mut Vec<Effect>) {
        let previous = self.settings.replace(next.clone());
        let sites_changed = previous
            .as_ref()
            .map(|prev| prev.active_sites != next.active_sites)
            .unwrap_or(true);
        if sites_changed {
            self.matcher = SiteMatcher::new(&next.active_sites);
        }
        let key_changed = previous
            .as_ref()
            .map(|prev| prev.activation_key != next.activation_key)
            .unwrap_or(false);
        if key_changed && self.activation.key_up() == Transition::Disarmed {
            effects.push(Effect::Clear);
        }

        let eligible = self.is_eligible();
        if eligible && self.detection == DetectionPhase::Waiting {
            self.detection = DetectionPhase::Polling;
            effects.push(Effect::StartDetection);
        }
        if next.allow_any_website && !self.toggle_created {
            self.toggle_created = true;
            effects.push(Effect::CreateToggle {
                manual_mode: next.manual_mode,
            });
        }

        let want_manual = next.manual_mode && eligible;
        if want_manual != self.activation.toggle_on() {
            if want_manual {
                self.enter_manual(&next, effects);
            } else {
                self.exit_manual(effects);
            }
            return;
        }
        if self.activation.is_armed() {
            effects.push(self.redraw());
        }
    }

    fn toggle_manual_mode(&mut self, effects: &mut Vec<Effect>) {
        let Some(settings) = self.settings.as_ref() else {
            return;
        };
        let patch = SettingsPatch::manual_mode(!settings.manual_mode);
        effects.push(Effect::PersistSettings(patch.clone()));
        self.apply_patch(&patch, effects);
    }

    fn enter_manual(&mut self, settings: &Settings, effects: &mut Vec<Effect>) {
        let (width, height) = self.viewport;
        self.tracker.disarm();
        self.table = Some(TableModel::new(
            TableGeometry::centered_in_viewport(width, height),
            PocketLayout::Dense,
        ));
        self.show_layer(effects);
        if self.toggle_created {
            effects.push(Effect::UpdateToggle { manual_mode: true });
        }
        if !self.hint_shown {
            self.hint_shown = true;
            effects.push(Effect::ShowHint {
                text: hint_text(&settings.activation_key),
                dismiss_after_ms: HINT_DISMISS_MS,
            });
        }
        self.activation.set_toggle(true);
        effects.push(self.redraw());
    }

    fn exit_manual(&mut self, effects: &mut Vec<Effect>) {
        self.activation.set_toggle(false);
        self.tracker.disarm();
        self.table = self
            .surface
            .map(|bounds| TableModel::new(bounds, PocketLayout::Standard));
        if self.toggle_created {
            effects.push(Effect::UpdateToggle { manual_mode: false });
        }
        if self.activation.is_armed() {
            effects.push(self.redraw());
        } else {
            effects.push(Effect::Clear);
        }
        if self.surface.is_none() {
            self.hide_layer(effects);
        }
    }

    fn update_surface(&mut self, bounds: TableGeometry, effects: &mut Vec<Effect>) {
        self.surface = Some(bounds);
        if self.activation.toggle_on() {
            return;
        }
        match self.table.as_mut() {
            Some(table) => {
                table.rebuild(bounds);
            }
            None => self.table = Some(TableModel::new(bounds, PocketLayout::Standard)),
        }
        self.show_layer(effects);
        if self.activation.is_armed() {
            effects.push(self.redraw());
        }
    }

    fn resize_viewport(&mut self, width: f64, height: f64, effects: &mut Vec<Effect>) {
        self.viewport = (width, height);
        if self.layer != LayerState::Absent {
            effects.push(Effect::ResizeLayer { width, height });
        }
        if self.activation.toggle_on() {
            if let Some(table) = self.table.as_mut() {
                table.rebuild(TableGeometry::centered_in_viewport(width, height));
            }
            // Keep the detected bounds current for when manual mode is left.
            if self.surface.is_some() {
                effects.push(Effect::RemeasureSurface);
            }
        } else if self.surface.is_some() {
            // The repaint follows the SurfaceResized report.
            effects.push(Effect::RemeasureSurface);
            return;
        }
        if self.activation.is_armed() {
            effects.push(self.redraw());
        }
    }

    fn key_down(&mut self, key: &str, now_ms: f64, effects: &mut Vec<Effect>) {
        let Some(settings) = self.settings.as_ref() else {
            return;
        };
        if key == RESET_KEY && self.activation.toggle_on() {
            if self.tracker.press_reset(now_ms, self.pointer) {
                effects.push(self.redraw());
            }
            return;
        }
        if !matches_key(key, &settings.activation_key) || self.table.is_none() {
            return;
        }
        if self.activation.key_down() == Transition::Armed {
            effects.push(self.redraw());
        }
    }

    fn key_up(&mut self, key: &str, effects: &mut Vec<Effect>) {
        let Some(settings) = self.settings.as_ref() else {
            return;
        };
        if !matches_key(key, &settings.activation_key) {
            return;
        }
        if self.activation.key_up() == Transition::Disarmed {
            effects.push(Effect::Clear);
        }
    }

    fn show_layer(&mut self, effects: &mut Vec<Effect>) {
        match self.layer {
            LayerState::Absent => {
                let (width, height) = self.viewport;
                effects.push(Effect::CreateLayer { width, height });
            }
            LayerState::Hidden => effects.push(Effect::ShowLayer),
            LayerState::Visible => {}
        }
        self.layer = LayerState::Visible;
    }

    fn hide_layer(&mut self, effects: &mut Vec<Effect>) {
        if self.layer == LayerState::Visible {
            self.layer = LayerState::Hidden;
            effects.push(Effect::HideLayer);
        }
    }

    /// Full clear-and-repaint from current state.
    fn redraw(&mut self) -> Effect {
        let Some(settings) = self.settings.as_ref() else {
            return Effect::Clear;
        };
        if !settings.enabled || !self.activation.is_armed() {
            return Effect::Clear;
        }
        let (Some(table), Some(pointer)) = (self.table.as_ref(), self.pointer) else {
            return Effect::Clear;
        };
        let mode = if self.activation.toggle_on() {
            TrackerMode::Manual
        } else {
            TrackerMode::Automatic
        };
        let balls = self
            .tracker
            .update(pointer.x, pointer.y, table.geometry(), mode);
        Effect::Paint(build_frame(
            table.pockets(),
            &balls,
            StrokeStyle::from_settings(settings),
            settings.show_ball_markers,
        ))
    }
}
