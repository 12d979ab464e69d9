//! Recursive Koch polygon drawing.
//!
//! A regular polygon is drawn with a turtle cursor, replacing every side with
//! a Koch curve of the requested depth. The cursor is abstracted behind
//! [`Pen`], so drawing logic can be exercised against any implementation;
//! [`Turtle`] records the resulting line segments for rendering.

mod render;

use std::f64::consts::PI;

use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};

pub use render::render_svg;

/// A point in world coordinates (origin bottom-left, y up).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    /// Horizontal position.
    pub x: f64,
    /// Vertical position.
    pub y: f64,
}

impl Point {
    /// Construct a point.
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// A straight stroke drawn while the pen was down.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Segment {
    /// Start of the stroke.
    pub from: Point,
    /// End of the stroke.
    pub to: Point,
}

/// Turtle-style drawing cursor.
pub trait Pen {
    /// Move along the current heading, drawing if the pen is down.
    fn forward(&mut self, distance: f64);
    /// Turn counter-clockwise by `degrees`.
    fn left(&mut self, degrees: f64);
    /// Turn clockwise by `degrees`.
    fn right(&mut self, degrees: f64) {
        self.left(-degrees);
    }
    /// Stop drawing on subsequent moves.
    fn pen_up(&mut self);
    /// Resume drawing on subsequent moves.
    fn pen_down(&mut self);
    /// Move straight to `point`, drawing if the pen is down.
    fn goto(&mut self, point: Point);
}

/// A [`Pen`] that records the segments it draws.
#[derive(Debug, Clone)]
pub struct Turtle {
    position: Point,
    heading: f64,
    pen_down: bool,
    segments: Vec<Segment>,
}

impl Default for Turtle {
    fn default() -> Self {
        Self::new()
    }
}

impl Turtle {
    /// A turtle at the origin, heading east, pen down.
    #[must_use]
    pub fn new() -> Self {
        Self {
            position: Point::default(),
            heading: 0.0,
            pen_down: true,
            segments: Vec::new(),
        }
    }

    /// Current position.
    #[must_use]
    pub fn position(&self) -> Point {
        self.position
    }

    /// Current heading in degrees, normalized to `[0, 360)`.
    #[must_use]
    pub fn heading(&self) -> f64 {
        self.heading.rem_euclid(360.0)
    }

    /// Everything drawn so far.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Consume the turtle, keeping only its drawing.
    #[must_use]
    pub fn into_segments(self) -> Vec<Segment> {
        self.segments
    }

    fn move_to(&mut self, to: Point) {
        if self.pen_down {
            self.segments.push(Segment {
                from: self.position,
                to,
            });
        }
        self.position = to;
    }
}

impl Pen for Turtle {
    fn forward(&mut self, distance: f64) {
        let rad = self.heading.to_radians();
        let to = Point::new(
            self.position.x + distance * rad.cos(),
            self.position.y + distance * rad.sin(),
        );
        self.move_to(to);
    }

    fn left(&mut self, degrees: f64) {
        self.heading += degrees;
    }

    fn pen_up(&mut self) {
        self.pen_down = false;
    }

    fn pen_down(&mut self) {
        self.pen_down = true;
    }

    fn goto(&mut self, point: Point) {
        self.move_to(point);
    }
}

/// Drawing surface dimensions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Multiplier lifting the polygon relative to the canvas center.
    pub vertical_offset: f64,
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            vertical_offset: 2.5,
        }
    }
}

impl Canvas {
    /// Center of the canvas in world coordinates.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(f64::from(self.width) / 2.0, f64::from(self.height) / 2.0)
    }
}

/// What to draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatternSpec {
    /// Number of polygon sides, at least 3.
    pub sides: u32,
    /// Length of each side before Koch subdivision.
    pub side_length: f64,
    /// Koch recursion depth; 0 draws the plain polygon.
    pub depth: u32,
}

/// Upper bounds on what a single run may draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternLimits {
    /// Deepest Koch recursion accepted.
    pub max_depth: u32,
    /// Largest [`segment_count`] accepted.
    pub max_segments: u64,
}

impl Default for PatternLimits {
    fn default() -> Self {
        Self {
            max_depth: 7,
            max_segments: 1_000_000,
        }
    }
}

impl PatternSpec {
    /// Check the parameters against `limits`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPattern`] if there are fewer than three sides,
    /// the side length is not a positive number, `depth` exceeds
    /// `limits.max_depth`, or the pattern would draw more than
    /// `limits.max_segments` segments.
    pub fn validate(&self, limits: &PatternLimits) -> Result<()> {
        if self.sides < 3 {
            return Err(Error::invalid_pattern(format!(
                "a polygon needs at least 3 sides, got {}",
                self.sides
            )));
        }
        if !(self.side_length.is_finite() && self.side_length > 0.0) {
            return Err(Error::invalid_pattern(format!(
                "side length must be positive, got {}",
                self.side_length
            )));
        }
        if self.depth > limits.max_depth {
            return Err(Error::invalid_pattern(format!(
                "recursion depth {} exceeds the maximum of {}",
                self.depth, limits.max_depth
            )));
        }
        let segments = self.segment_count();
        if segments > limits.max_segments {
            return Err(Error::invalid_pattern(format!(
                "{} sides at depth {} draw {segments} segments, more than the limit of {}",
                self.sides, self.depth, limits.max_segments
            )));
        }
        Ok(())
    }

    /// Circumradius of the base polygon.
    #[must_use]
    pub fn radius(&self) -> f64 {
        self.side_length / (2.0 * (PI / f64::from(self.sides)).sin())
    }

    /// Number of forward strokes [`draw_polygon`] issues.
    #[must_use]
    pub fn segment_count(&self) -> u64 {
        segment_count(self.sides, self.depth)
    }
}

/// `sides * 4^depth`, saturating.
#[must_use]
pub fn segment_count(sides: u32, depth: u32) -> u64 {
    4u64.checked_pow(depth)
        .and_then(|per_side| per_side.checked_mul(u64::from(sides)))
        .unwrap_or(u64::MAX)
}

/// Draw one Koch edge of the given length along the current heading.
pub fn koch_edge<P: Pen + ?Sized>(pen: &mut P, length: f64, depth: u32) {
    if depth == 0 {
        pen.forward(length);
        return;
    }

    let third = length / 3.0;
    koch_edge(pen, third, depth - 1);
    pen.left(60.0);
    koch_edge(pen, third, depth - 1);
    pen.right(120.0);
    koch_edge(pen, third, depth - 1);
    pen.left(60.0);
    koch_edge(pen, third, depth - 1);
}

/// Where [`draw_polygon`] puts the pen down.
///
/// The bottom-left vertex of the polygon centered on the canvas, lifted by
/// `radius * (vertical_offset - 1)`.
#[must_use]
pub fn start_point(spec: &PatternSpec, canvas: &Canvas) -> Point {
    let radius = spec.radius();
    let angle = PI + PI / f64::from(spec.sides);
    let center = canvas.center();
    Point::new(
        center.x + radius * angle.cos(),
        center.y + radius * angle.sin() + radius * (canvas.vertical_offset - 1.0),
    )
}

/// Draw the Koch polygon described by `spec`.
///
/// The caller is expected to have validated `spec`.
pub fn draw_polygon<P: Pen + ?Sized>(pen: &mut P, spec: &PatternSpec, canvas: &Canvas) {
    let exterior = 360.0 / f64::from(spec.sides);
    let start = start_point(spec, canvas);

    debug!(
        sides = spec.sides,
        depth = spec.depth,
        x = start.x,
        y = start.y,
        "Drawing polygon"
    );

    pen.pen_up();
    pen.goto(start);
    pen.pen_down();

    for _ in 0..spec.sides {
        koch_edge(pen, spec.side_length, spec.depth);
        pen.right(exterior);
    }
}

/// Validate `spec`, draw it with a fresh [`Turtle`] and return the segments.
///
/// # Errors
///
/// Returns an error if `spec` is outside `limits`.
pub fn trace_pattern(
    spec: &PatternSpec,
    canvas: &Canvas,
    limits: &PatternLimits,
) -> Result<Vec<Segment>> {
    spec.validate(limits)?;
    let mut turtle = Turtle::new();
    draw_polygon(&mut turtle, spec, canvas);
    Ok(turtle.into_segments())
}
