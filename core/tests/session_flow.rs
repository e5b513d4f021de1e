use pool_guideline_core::aim::DrawOp;
use pool_guideline_core::session::hint_text;
use pool_guideline_core::{
    DetectionPhase, Effect, Frame, LayerState, OverlaySession, Point, RecordingPainter,
    RenderState, Request, Response, SessionEvent, Settings, SettingsPatch, TableGeometry,
};

const SURFACE: TableGeometry = TableGeometry::new(100.0, 50.0, 800.0, 600.0);

fn assert_point(actual: Point, expected: Point) {
    assert!(
        (actual.x - expected.x).abs() < 1e-9 && (actual.y - expected.y).abs() < 1e-9,
        "{actual:?} != {expected:?}"
    );
}

fn loaded(hostname: &str, settings: Settings) -> OverlaySession {
    let mut session = OverlaySession::new(hostname, 1000.0, 800.0);
    session.handle(SessionEvent::SettingsLoaded(settings), 0.0);
    session
}

fn detected(hostname: &str) -> OverlaySession {
    let mut session = loaded(hostname, Settings::default());
    session.handle(SessionEvent::SurfaceDetected { bounds: SURFACE }, 0.0);
    session
}

fn key_down(key: &str) -> SessionEvent {
    SessionEvent::KeyDown {
        key: key.to_string(),
    }
}

fn key_up(key: &str) -> SessionEvent {
    SessionEvent::KeyUp {
        key: key.to_string(),
    }
}

fn paint(effects: &[Effect]) -> &Frame {
    match effects.last() {
        Some(Effect::Paint(frame)) => frame,
        other => panic!("expected a paint, got {other:?}"),
    }
}

fn manual_settings() -> Settings {
    Settings {
        allow_any_website: true,
        ..Settings::default()
    }
}

#[test]
fn eligible_site_starts_detection() {
    let mut session = OverlaySession::new("discord.com", 1000.0, 800.0);
    let effects = session.handle(SessionEvent::SettingsLoaded(Settings::default()), 0.0);
    assert_eq!(effects, vec![Effect::StartDetection]);
    assert_eq!(session.detection_phase(), DetectionPhase::Polling);
}

#[test]
fn ineligible_site_stays_inert() {
    let mut session = OverlaySession::new("example.com", 1000.0, 800.0);
    let effects = session.handle(SessionEvent::SettingsLoaded(Settings::default()), 0.0);
    assert!(effects.is_empty());
    assert_eq!(session.detection_phase(), DetectionPhase::Waiting);
    assert!(session.handle(key_down("Shift"), 0.0).is_empty());
    assert!(session
        .handle(SessionEvent::PointerMove { x: 5.0, y: 5.0 }, 0.0)
        .is_empty());
}

#[test]
fn wildcard_site_is_eligible() {
    let session = loaded("foo-pool-game.net", Settings::default());
    assert!(session.is_eligible());
    assert_eq!(session.detection_phase(), DetectionPhase::Polling);
}

#[test]
fn detection_creates_layer_and_pockets() {
    let mut session = loaded("discord.com", Settings::default());
    let effects = session.handle(SessionEvent::SurfaceDetected { bounds: SURFACE }, 0.0);
    assert_eq!(
        effects,
        vec![Effect::CreateLayer {
            width: 1000.0,
            height: 800.0,
        }]
    );
    assert_eq!(session.detection_phase(), DetectionPhase::Found);
    assert_eq!(session.layer_state(), LayerState::Visible);
    assert_eq!(session.pockets().len(), 6);
    assert_point(session.pockets()[0], Point::new(140.0, 80.0));
}

#[test]
fn holding_the_key_draws_guidelines() {
    let mut session = detected("discord.com");
    // Arming before any pointer position is known leaves the surface clear.
    assert_eq!(session.handle(key_down("Shift"), 0.0), vec![Effect::Clear]);
    assert_eq!(session.render_state(), RenderState::Armed);

    let effects = session.handle(SessionEvent::PointerMove { x: 500.0, y: 300.0 }, 0.0);
    let frame = paint(&effects);
    assert_eq!(frame.ops.len(), 6 * 2 + 2);
    assert_eq!(frame.style.color, "#00FF00");
    let DrawOp::DashedLine { from, to } = frame.ops[13] else {
        panic!("expected the dashed pocket path last");
    };
    assert_point(from, Point::new(500.0, 300.0));
    assert_point(to, Point::new(140.0, 80.0));
    let DrawOp::Line { from: cue, .. } = frame.ops[12] else {
        panic!("expected the cue line");
    };
    assert_point(cue, Point::new(500.0, 500.0));

    assert_eq!(session.handle(key_up("Shift"), 0.0), vec![Effect::Clear]);
    assert_eq!(session.render_state(), RenderState::Idle);
    assert!(session
        .handle(SessionEvent::PointerMove { x: 10.0, y: 10.0 }, 0.0)
        .is_empty());
}

#[test]
fn other_keys_and_repeats_are_ignored() {
    let mut session = detected("discord.com");
    session.handle(SessionEvent::PointerMove { x: 500.0, y: 300.0 }, 0.0);
    assert!(session.handle(key_down("Control"), 0.0).is_empty());
    assert_eq!(session.handle(key_down("Shift"), 0.0).len(), 1);
    assert!(session.handle(key_down("Shift"), 10.0).is_empty());
    assert!(session.handle(key_up("Control"), 0.0).is_empty());
    assert_eq!(session.render_state(), RenderState::Armed);
}

#[test]
fn repainting_a_frame_is_idempotent() {
    let mut session = detected("discord.com");
    session.handle(SessionEvent::PointerMove { x: 420.0, y: 310.0 }, 0.0);
    let effects = session.handle(key_down("Shift"), 0.0);
    let frame = paint(&effects);

    let mut painter = RecordingPainter::default();
    frame.paint(&mut painter);
    let once = painter.strokes.clone();
    frame.paint(&mut painter);
    assert_eq!(painter.strokes, once);
    assert_eq!(painter.clears, 2);
    assert_eq!(painter.style.as_ref(), Some(&frame.style));
}

#[test]
fn disabling_clears_and_suppresses_drawing() {
    let mut session = detected("discord.com");
    session.handle(key_down("Shift"), 0.0);
    session.handle(SessionEvent::PointerMove { x: 500.0, y: 300.0 }, 0.0);

    let effects = session.handle(SessionEvent::SettingsPatched(SettingsPatch::enabled(false)), 0.0);
    assert_eq!(effects, vec![Effect::Clear]);
    let effects = session.handle(SessionEvent::PointerMove { x: 510.0, y: 300.0 }, 0.0);
    assert_eq!(effects, vec![Effect::Clear]);

    let effects = session.handle(SessionEvent::SettingsPatched(SettingsPatch::enabled(true)), 0.0);
    paint(&effects);
}

#[test]
fn style_changes_apply_while_armed() {
    let mut session = detected("discord.com");
    session.handle(key_down("Shift"), 0.0);
    session.handle(SessionEvent::PointerMove { x: 500.0, y: 300.0 }, 0.0);
    let patch = SettingsPatch {
        guideline_color: Some("#FF0000".to_string()),
        guideline_width: Some(4.0),
        ..SettingsPatch::default()
    };
    let effects = session.handle(SessionEvent::SettingsPatched(patch), 0.0);
    let frame = paint(&effects);
    assert_eq!(frame.style.color, "#FF0000");
    assert_eq!(frame.style.width, 4.0);
}

#[test]
fn changing_the_activation_key_releases_a_held_key() {
    let mut session = detected("discord.com");
    session.handle(key_down("Shift"), 0.0);
    let patch = SettingsPatch {
        activation_key: Some("Control".to_string()),
        ..SettingsPatch::default()
    };
    let effects = session.handle(SessionEvent::SettingsPatched(patch), 0.0);
    assert_eq!(effects, vec![Effect::Clear]);
    assert_eq!(session.render_state(), RenderState::Idle);
    assert_eq!(session.handle(key_down("Control"), 0.0), vec![Effect::Clear]);
}

#[test]
fn patches_before_load_are_kept() {
    let mut session = OverlaySession::new("discord.com", 1000.0, 800.0);
    let patch = SettingsPatch {
        guideline_width: Some(5.0),
        ..SettingsPatch::default()
    };
    assert!(session
        .handle(SessionEvent::SettingsPatched(patch), 0.0)
        .is_empty());
    session.handle(SessionEvent::SettingsLoaded(Settings::default()), 0.0);
    assert_eq!(session.settings().map(|s| s.guideline_width), Some(5.0));
}

#[test]
fn viewport_resize_remeasures_detected_surface() {
    let mut session = detected("discord.com");
    session.handle(key_down("Shift"), 0.0);
    session.handle(SessionEvent::PointerMove { x: 500.0, y: 300.0 }, 0.0);

    let effects = session.handle(
        SessionEvent::ViewportResized {
            width: 600.0,
            height: 500.0,
        },
        0.0,
    );
    assert_eq!(
        effects,
        vec![
            Effect::ResizeLayer {
                width: 600.0,
                height: 500.0,
            },
            Effect::RemeasureSurface,
        ]
    );

    let resized = TableGeometry::new(0.0, 0.0, 400.0, 300.0);
    let effects = session.handle(SessionEvent::SurfaceResized { bounds: resized }, 0.0);
    paint(&effects);
    assert_eq!(session.surface(), Some(resized));
    assert_point(session.pockets()[0], Point::new(20.0, 15.0));
    assert_point(session.pockets()[5], Point::new(380.0, 285.0));
}

#[test]
fn detection_status_reflects_session() {
    let mut session = loaded("discord.com", Settings::default());
    let (response, effects) = session.respond(Request::GetDetectionStatus, 0.0);
    assert!(effects.is_empty());
    assert_eq!(
        response,
        Response::DetectionStatus {
            pool_game_detected: false,
            manual_mode: false,
        }
    );
    session.handle(SessionEvent::SurfaceDetected { bounds: SURFACE }, 0.0);
    let (response, _) = session.respond(Request::GetDetectionStatus, 0.0);
    assert_eq!(
        response,
        Response::DetectionStatus {
            pool_game_detected: true,
            manual_mode: false,
        }
    );
}

#[test]
fn update_settings_request_applies_patch() {
    let mut session = loaded("discord.com", Settings::default());
    let (response, _) = session.respond(
        Request::UpdateSettings {
            settings: SettingsPatch {
                guideline_opacity: Some(3.0),
                ..SettingsPatch::default()
            },
        },
        0.0,
    );
    assert_eq!(response, Response::Success { success: true });
    assert_eq!(session.settings().map(|s| s.guideline_opacity), Some(1.0));
}

#[test]
fn toggle_enabled_request_persists_new_value() {
    let mut session = loaded("discord.com", Settings::default());
    let (response, effects) = session.respond(Request::ToggleEnabled, 0.0);
    assert_eq!(response, Response::Enabled { enabled: false });
    assert_eq!(
        effects.first(),
        Some(&Effect::PersistSettings(SettingsPatch::enabled(false)))
    );
}

#[test]
fn allow_any_creates_toggle_affordance() {
    let mut session = OverlaySession::new("example.com", 1000.0, 800.0);
    let effects = session.handle(SessionEvent::SettingsLoaded(manual_settings()), 0.0);
    assert_eq!(
        effects,
        vec![
            Effect::StartDetection,
            Effect::CreateToggle { manual_mode: false },
        ]
    );
}

#[test]
fn manual_mode_uses_synthetic_table_and_sticky_cue() {
    let mut session = loaded("example.com", manual_settings());
    let effects = session.handle(SessionEvent::ToggleClicked, 0.0);
    assert_eq!(
        effects,
        vec![
            Effect::PersistSettings(SettingsPatch::manual_mode(true)),
            Effect::CreateLayer {
                width: 1000.0,
                height: 800.0,
            },
            Effect::UpdateToggle { manual_mode: true },
            Effect::ShowHint {
                text: hint_text("Shift"),
                dismiss_after_ms: 5000,
            },
            Effect::Clear,
        ]
    );
    assert!(session.manual_active());
    assert_eq!(session.render_state(), RenderState::Armed);
    assert_eq!(
        session.table().map(|t| *t.geometry()),
        Some(TableGeometry::new(100.0, 80.0, 800.0, 640.0))
    );
    assert_eq!(session.pockets().len(), 10);

    let effects = session.handle(SessionEvent::PointerMove { x: 600.0, y: 400.0 }, 0.0);
    paint(&effects);
    assert_eq!(session.tracker().manual_cue(), Some(Point::new(500.0, 400.0)));

    session.handle(SessionEvent::PointerMove { x: 700.0, y: 300.0 }, 0.0);
    assert_eq!(session.tracker().manual_cue(), Some(Point::new(500.0, 400.0)));

    assert!(session.handle(key_down("Escape"), 1000.0).is_empty());
    assert_eq!(session.tracker().manual_cue(), Some(Point::new(500.0, 400.0)));
    let effects = session.handle(key_down("Escape"), 1300.0);
    let frame = paint(&effects);
    assert_eq!(session.tracker().manual_cue(), Some(Point::new(600.0, 300.0)));
    assert!(frame.ops.contains(&DrawOp::Line {
        from: Point::new(600.0, 300.0),
        to: pool_guideline_core::hit_point(
            &pool_guideline_core::Ball {
                x: 700.0,
                y: 300.0,
                radius: 640.0 * 0.02,
            },
            session.pockets()[0],
        )
        .unwrap(),
    }));
}

#[test]
fn slow_escape_presses_do_not_reset() {
    let mut session = loaded("example.com", manual_settings());
    session.handle(SessionEvent::ToggleClicked, 0.0);
    session.handle(SessionEvent::PointerMove { x: 600.0, y: 400.0 }, 0.0);
    session.handle(SessionEvent::PointerMove { x: 300.0, y: 200.0 }, 0.0);
    session.handle(key_down("Escape"), 0.0);
    assert!(session.handle(key_down("Escape"), 900.0).is_empty());
    assert_eq!(session.tracker().manual_cue(), Some(Point::new(500.0, 400.0)));
}

#[test]
fn hint_is_shown_once() {
    let mut session = loaded("example.com", manual_settings());
    session.handle(SessionEvent::ToggleClicked, 0.0);
    session.handle(SessionEvent::ToggleClicked, 0.0);
    let effects = session.handle(SessionEvent::ToggleClicked, 0.0);
    assert!(!effects
        .iter()
        .any(|effect| matches!(effect, Effect::ShowHint { .. })));
}

#[test]
fn leaving_manual_mode_without_surface_hides_layer() {
    let mut session = loaded("example.com", manual_settings());
    session.handle(SessionEvent::ToggleClicked, 0.0);
    let effects = session.handle(SessionEvent::ToggleClicked, 0.0);
    assert_eq!(
        effects,
        vec![
            Effect::PersistSettings(SettingsPatch::manual_mode(false)),
            Effect::UpdateToggle { manual_mode: false },
            Effect::Clear,
            Effect::HideLayer,
        ]
    );
    assert!(!session.manual_active());
    assert_eq!(session.layer_state(), LayerState::Hidden);
    assert!(session.table().is_none());

    let effects = session.handle(SessionEvent::ToggleClicked, 0.0);
    assert!(effects.contains(&Effect::ShowLayer));
}

#[test]
fn leaving_manual_mode_restores_detected_table() {
    let mut session = loaded("example.com", manual_settings());
    session.handle(SessionEvent::SurfaceDetected { bounds: SURFACE }, 0.0);
    session.handle(SessionEvent::ToggleClicked, 0.0);
    assert_eq!(session.pockets().len(), 10);
    session.handle(SessionEvent::ToggleClicked, 0.0);
    assert_eq!(session.pockets().len(), 6);
    assert_eq!(session.layer_state(), LayerState::Visible);
    assert_point(session.pockets()[0], Point::new(140.0, 80.0));
}

#[test]
fn manual_mode_follows_viewport_resize() {
    let mut session = loaded("example.com", manual_settings());
    session.handle(SessionEvent::ToggleClicked, 0.0);
    session.handle(SessionEvent::PointerMove { x: 300.0, y: 300.0 }, 0.0);
    let effects = session.handle(
        SessionEvent::ViewportResized {
            width: 500.0,
            height: 400.0,
        },
        0.0,
    );
    assert_eq!(
        effects[0],
        Effect::ResizeLayer {
            width: 500.0,
            height: 400.0,
        }
    );
    paint(&effects);
    assert_eq!(
        session.table().map(|t| *t.geometry()),
        Some(TableGeometry::new(50.0, 40.0, 400.0, 320.0))
    );
}

#[test]
fn resize_during_manual_mode_refreshes_detected_surface() {
    let mut session = loaded("example.com", manual_settings());
    session.handle(SessionEvent::SurfaceDetected { bounds: SURFACE }, 0.0);
    session.handle(SessionEvent::ToggleClicked, 0.0);
    let effects = session.handle(
        SessionEvent::ViewportResized {
            width: 500.0,
            height: 400.0,
        },
        0.0,
    );
    assert!(effects.contains(&Effect::RemeasureSurface));

    let resized = TableGeometry::new(0.0, 0.0, 400.0, 300.0);
    let effects = session.handle(SessionEvent::SurfaceResized { bounds: resized }, 0.0);
    assert!(effects.is_empty());
    assert_eq!(session.pockets().len(), 10);

    session.handle(SessionEvent::ToggleClicked, 0.0);
    assert_eq!(session.surface(), Some(resized));
    assert_eq!(session.pockets().len(), 6);
    assert_point(session.pockets()[0], Point::new(20.0, 15.0));
}

#[test]
fn reset_uses_pointer_seen_while_disabled() {
    let mut session = loaded("example.com", manual_settings());
    session.handle(SessionEvent::ToggleClicked, 0.0);
    session.handle(SessionEvent::PointerMove { x: 600.0, y: 400.0 }, 0.0);
    assert_eq!(session.tracker().manual_cue(), Some(Point::new(500.0, 400.0)));

    session.handle(SessionEvent::SettingsPatched(SettingsPatch::enabled(false)), 0.0);
    session.handle(SessionEvent::PointerMove { x: 200.0, y: 200.0 }, 0.0);
    session.handle(key_down("Escape"), 1000.0);
    let effects = session.handle(key_down("Escape"), 1200.0);
    assert_eq!(effects, vec![Effect::Clear]);
    assert_eq!(session.tracker().manual_cue(), Some(Point::new(100.0, 200.0)));
}

#[test]
fn manual_mode_needs_an_eligible_page() {
    let settings = Settings {
        manual_mode: true,
        ..Settings::default()
    };
    let session = loaded("example.com", settings);
    assert!(!session.manual_active());
    assert_eq!(session.render_state(), RenderState::Idle);
}

#[test]
fn persisted_manual_mode_resumes_on_load() {
    let settings = Settings {
        manual_mode: true,
        ..manual_settings()
    };
    let mut session = OverlaySession::new("example.com", 1000.0, 800.0);
    let effects = session.handle(SessionEvent::SettingsLoaded(settings), 0.0);
    assert!(effects.contains(&Effect::CreateToggle { manual_mode: true }));
    assert!(session.manual_active());
    let (response, _) = session.respond(Request::GetDetectionStatus, 0.0);
    assert_eq!(
        response,
        Response::DetectionStatus {
            pool_game_detected: false,
            manual_mode: true,
        }
    );
}
