use crate::geometry::TableGeometry;

pub const DETECT_POLL_INTERVAL_MS: u32 = 1000;
pub const MIN_SURFACE_WIDTH: f64 = 300.0;
pub const MIN_SURFACE_HEIGHT: f64 = 200.0;

pub const CANVAS_SELECTOR: &str = "canvas";
pub const GAME_CONTAINER_SELECTOR: &str =
    ".game-container, #game, [id*=\"game\"], [class*=\"game\"]";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SurfaceKind {
    /// Drawable surface; sized by its intrinsic bitmap size.
    Canvas,
    /// Generic game container; sized by its rendered box.
    Container,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CandidateInfo {
    pub kind: SurfaceKind,
    pub width: f64,
    pub height: f64,
    pub visible: bool,
    pub bounds: TableGeometry,
}

#[derive(Clone, Debug)]
pub struct SurfaceCandidate<H> {
    pub handle: H,
    pub info: CandidateInfo,
}

#[derive(Clone, Debug)]
pub struct Detection<H> {
    pub handle: H,
    pub kind: SurfaceKind,
    pub bounds: TableGeometry,
}

/// Page access needed by detection. Implemented over the DOM in the browser and by
/// fixtures in tests.
pub trait SurfaceProbe {
    type Handle: Clone;

    fn query(&self, selector: &str, kind: SurfaceKind) -> Vec<SurfaceCandidate<Self::Handle>>;

    /// Current bounding box of a previously detected surface.
    fn measure(&self, handle: &Self::Handle) -> Option<TableGeometry>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DetectPass {
    pub selector: String,
    pub kind: SurfaceKind,
}

impl DetectPass {
    pub fn new(selector: &str, kind: SurfaceKind) -> Self {
        Self {
            selector: selector.to_string(),
            kind,
        }
    }
}

pub trait DetectStrategy {
    /// Ordered queries; the first accepted candidate of the first pass that has one wins.
    fn passes(&self) -> Vec<DetectPass>;

    fn accepts(&self, info: &CandidateInfo) -> bool {
        info.visible && info.width > MIN_SURFACE_WIDTH && info.height > MIN_SURFACE_HEIGHT
    }
}

/// Canvases first, then elements whose id or class mentions a game.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeuristicDetector;

impl DetectStrategy for HeuristicDetector {
    fn passes(&self) -> Vec<DetectPass> {
        vec![
            DetectPass::new(CANVAS_SELECTOR, SurfaceKind::Canvas),
            DetectPass::new(GAME_CONTAINER_SELECTOR, SurfaceKind::Container),
        ]
    }
}

/// Explicit selector allow-list, each matched element treated as a container.
#[derive(Clone, Debug, Default)]
pub struct SelectorDetector {
    selectors: Vec<String>,
}

impl SelectorDetector {
    pub fn new<S: AsRef<str>>(selectors: &[S]) -> Self {
        Self {
            selectors: selectors
                .iter()
                .map(|s| s.as_ref().trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }
}

impl DetectStrategy for SelectorDetector {
    fn passes(&self) -> Vec<DetectPass> {
        self.selectors
            .iter()
            .map(|selector| DetectPass::new(selector, SurfaceKind::Container))
            .collect()
    }
}

pub fn detect_surface<P: SurfaceProbe>(
    strategy: &dyn DetectStrategy,
    probe: &P,
) -> Option<Detection<P::Handle>> {
    for pass in strategy.passes() {
        let found = probe
            .query(&pass.selector, pass.kind)
            .into_iter()
            .find(|candidate| strategy.accepts(&candidate.info));
        if let Some(candidate) = found {
            return Some(Detection {
                handle: candidate.handle,
                kind: candidate.info.kind,
                bounds: candidate.info.bounds,
            });
        }
    }
    None
}

/// Visibility rule shared by every probe: shown, not hidden, and laid out with a size.
pub fn is_rendered(display: &str, visibility: &str, offset_width: f64, offset_height: f64) -> bool {
    display != "none" && visibility != "hidden" && offset_width > 0.0 && offset_height > 0.0
}
