use crate::geometry::{Point, TableGeometry};

pub const BALL_RADIUS_RATIO: f64 = 0.02;
pub const AUTO_CUE_FRACTION_X: f64 = 0.5;
pub const AUTO_CUE_FRACTION_Y: f64 = 0.75;
pub const MANUAL_CUE_OFFSET_X: f64 = -100.0;
pub const MANUAL_CUE_OFFSET_Y: f64 = 0.0;
pub const RESET_KEY: &str = "Escape";
pub const RESET_DOUBLE_PRESS_MS: f64 = 500.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ball {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
}

impl Ball {
    pub fn center(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TrackerMode {
    #[default]
    Automatic,
    Manual,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BallPair {
    pub cue: Ball,
    pub target: Ball,
}

pub fn ball_radius(geometry: &TableGeometry) -> f64 {
    geometry.width.min(geometry.height) * BALL_RADIUS_RATIO
}

fn manual_seed(pointer: Point) -> Point {
    Point::new(pointer.x + MANUAL_CUE_OFFSET_X, pointer.y + MANUAL_CUE_OFFSET_Y)
}

/// Tracks the cue (reference) ball and the pointer-driven target ball.
///
/// In manual mode the cue is seeded from the pointer on the first update after
/// [`BallTracker::disarm`] and then stays put until a double press of [`RESET_KEY`].
#[derive(Clone, Debug, Default)]
pub struct BallTracker {
    manual_cue: Option<Point>,
    last_reset_press_ms: Option<f64>,
}

impl BallTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(
        &mut self,
        pointer_x: f64,
        pointer_y: f64,
        geometry: &TableGeometry,
        mode: TrackerMode,
    ) -> BallPair {
        let pointer = Point::new(pointer_x, pointer_y);
        let radius = ball_radius(geometry);
        let cue = match mode {
            TrackerMode::Automatic => {
                geometry.at_fraction(AUTO_CUE_FRACTION_X, AUTO_CUE_FRACTION_Y)
            }
            TrackerMode::Manual => *self.manual_cue.get_or_insert_with(|| manual_seed(pointer)),
        };
        BallPair {
            cue: Ball {
                x: cue.x,
                y: cue.y,
                radius,
            },
            target: Ball {
                x: pointer.x,
                y: pointer.y,
                radius,
            },
        }
    }

    /// Registers a press of the reset key. Returns true when the press completed a
    /// double press and the cue was re-seeded from `pointer`.
    pub fn press_reset(&mut self, now_ms: f64, pointer: Option<Point>) -> bool {
        let is_double = self
            .last_reset_press_ms
            .map(|last| now_ms - last <= RESET_DOUBLE_PRESS_MS)
            .unwrap_or(false);
        if !is_double {
            self.last_reset_press_ms = Some(now_ms);
            return false;
        }
        self.last_reset_press_ms = None;
        self.manual_cue = pointer.map(manual_seed);
        true
    }

    /// Forgets the sticky cue so the next manual update seeds it again.
    pub fn disarm(&mut self) {
        self.manual_cue = None;
        self.last_reset_press_ms = None;
    }

    pub fn manual_cue(&self) -> Option<Point> {
        self.manual_cue
    }
}
