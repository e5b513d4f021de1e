pub const SYNTHETIC_TABLE_RATIO: f64 = 0.8;
pub const MIN_DIRECTION_LENGTH: f64 = 1.0e-9;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Unit vector from `from` towards `to`, or `None` when the points coincide.
pub fn direction(from: Point, to: Point) -> Option<(f64, f64)> {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let length = (dx * dx + dy * dy).sqrt();
    if !length.is_finite() || length < MIN_DIRECTION_LENGTH {
        return None;
    }
    Some((dx / length, dy / length))
}

/// Play-surface rectangle in viewport coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TableGeometry {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl TableGeometry {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Table assumed when no surface is detected: 80% of the viewport, centered.
    pub fn centered_in_viewport(viewport_width: f64, viewport_height: f64) -> Self {
        let viewport_width = viewport_width.max(0.0);
        let viewport_height = viewport_height.max(0.0);
        let width = viewport_width * SYNTHETIC_TABLE_RATIO;
        let height = viewport_height * SYNTHETIC_TABLE_RATIO;
        Self {
            x: (viewport_width - width) * 0.5,
            y: (viewport_height - height) * 0.5,
            width,
            height,
        }
    }

    pub fn at_fraction(&self, fx: f64, fy: f64) -> Point {
        Point::new(self.x + self.width * fx, self.y + self.height * fy)
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }

    pub fn is_usable(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.width > 0.0
            && self.height > 0.0
    }
}
