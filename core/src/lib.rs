pub mod activation;
pub mod aim;
pub mod balls;
pub mod codec;
pub mod coordinator;
pub mod detect;
pub mod geometry;
pub mod protocol;
pub mod scheduler;
pub mod session;
pub mod settings;
pub mod site;
pub mod store;
pub mod table;

pub use activation::{matches_key, ActivationState, RenderState, Transition};
pub use aim::{build_frame, hit_point, DrawOp, Frame, Painter, RecordingPainter, StrokeStyle};
pub use balls::{Ball, BallPair, BallTracker, TrackerMode};
pub use codec::{decode, encode};
pub use coordinator::{Broadcast, Coordinator, CoordinatorError, InstanceId};
pub use detect::{
    detect_surface, DetectStrategy, Detection, HeuristicDetector, SelectorDetector, SurfaceKind,
    SurfaceProbe,
};
pub use geometry::{Point, TableGeometry};
pub use protocol::{
    decode_request, encode_request, encode_response, ProtocolError, Request, Response,
};
pub use scheduler::{ManualScheduler, Scheduler, TaskToken, Tick};
pub use session::{DetectionPhase, Effect, LayerState, OverlaySession, SessionEvent};
pub use settings::{Settings, SettingsPatch};
pub use site::{is_eligible, SiteMatcher, SitePattern};
pub use store::{MemoryStore, SettingsStore, StoreError};
pub use table::{Pocket, PocketLayout, TableModel};
