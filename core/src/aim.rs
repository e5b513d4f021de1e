use crate::balls::{Ball, BallPair};
use crate::geometry::{direction, Point};
use crate::settings::Settings;
use crate::table::Pocket;

pub const POCKET_MARKER_RADIUS: f64 = 5.0;
pub const DASH_PATTERN: [f64; 2] = [5.0, 3.0];
pub const HIT_DISTANCE_IN_RADII: f64 = 2.0;

#[derive(Clone, Debug, PartialEq)]
pub struct StrokeStyle {
    pub color: String,
    pub opacity: f64,
    pub width: f64,
}

impl StrokeStyle {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            color: settings.guideline_color.clone(),
            opacity: settings.guideline_opacity,
            width: settings.guideline_width,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DrawOp {
    Line { from: Point, to: Point },
    DashedLine { from: Point, to: Point },
    Circle { center: Point, radius: f64 },
}

impl DrawOp {
    fn is_finite(&self) -> bool {
        match self {
            DrawOp::Line { from, to } | DrawOp::DashedLine { from, to } => {
                from.is_finite() && to.is_finite()
            }
            DrawOp::Circle { center, radius } => center.is_finite() && radius.is_finite(),
        }
    }
}

/// One complete overlay picture. Painting always starts from a cleared surface, so
/// painting the same frame twice leaves the same result as painting it once.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    pub style: StrokeStyle,
    pub ops: Vec<DrawOp>,
}

impl Frame {
    pub fn paint<P: Painter + ?Sized>(&self, painter: &mut P) {
        painter.clear();
        painter.set_style(&self.style);
        for op in &self.ops {
            match *op {
                DrawOp::Line { from, to } => painter.stroke_line(from, to, false),
                DrawOp::DashedLine { from, to } => painter.stroke_line(from, to, true),
                DrawOp::Circle { center, radius } => painter.stroke_circle(center, radius),
            }
        }
    }
}

pub trait Painter {
    fn clear(&mut self);
    fn set_style(&mut self, style: &StrokeStyle);
    fn stroke_line(&mut self, from: Point, to: Point, dashed: bool);
    fn stroke_circle(&mut self, center: Point, radius: f64);
}

/// Where the cue ball must touch the target to send it straight at `pocket`.
pub fn hit_point(target: &Ball, pocket: Pocket) -> Option<Point> {
    let (nx, ny) = direction(target.center(), pocket)?;
    let distance = target.radius * HIT_DISTANCE_IN_RADII;
    Some(Point::new(target.x - nx * distance, target.y - ny * distance))
}

pub fn build_frame(
    pockets: &[Pocket],
    balls: &BallPair,
    style: StrokeStyle,
    show_ball_markers: bool,
) -> Frame {
    let target = balls.target.center();
    let mut ops = Vec::with_capacity(pockets.len() * 2 + 4);
    for pocket in pockets {
        ops.push(DrawOp::Line {
            from: *pocket,
            to: target,
        });
        ops.push(DrawOp::Circle {
            center: *pocket,
            radius: POCKET_MARKER_RADIUS,
        });
    }
    // Only the first pocket of the layout gets a projected path.
    if let Some(pocket) = pockets.first() {
        if let Some(hit) = hit_point(&balls.target, *pocket) {
            ops.push(DrawOp::Line {
                from: balls.cue.center(),
                to: hit,
            });
            ops.push(DrawOp::DashedLine {
                from: target,
                to: *pocket,
            });
        }
    }
    if show_ball_markers {
        for ball in [&balls.cue, &balls.target] {
            ops.push(DrawOp::Circle {
                center: ball.center(),
                radius: ball.radius,
            });
        }
    }
    ops.retain(DrawOp::is_finite);
    Frame { style, ops }
}

/// In-memory painter: `strokes` holds what is currently visible on the surface.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecordingPainter {
    pub style: Option<StrokeStyle>,
    pub strokes: Vec<DrawOp>,
    pub clears: usize,
}

impl Painter for RecordingPainter {
    fn clear(&mut self) {
        self.strokes.clear();
        self.clears += 1;
    }

    fn set_style(&mut self, style: &StrokeStyle) {
        self.style = Some(style.clone());
    }

    fn stroke_line(&mut self, from: Point, to: Point, dashed: bool) {
        if dashed {
            self.strokes.push(DrawOp::DashedLine { from, to });
        } else {
            self.strokes.push(DrawOp::Line { from, to });
        }
    }

    fn stroke_circle(&mut self, center: Point, radius: f64) {
        self.strokes.push(DrawOp::Circle { center, radius });
    }
}
