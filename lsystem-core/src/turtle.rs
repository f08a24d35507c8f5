//! Turtle Interpreter - Instruction String to Line Segments
//!
//! Conventions: degrees, 0° points along +X, 90° along +Y. The turtle
//! starts at the origin facing 90°. Symbols outside `F f + - | [ ]` are
//! ignored.

use serde::{Deserialize, Serialize};

use crate::error::RenderError;

/// Decimal digits kept on recorded segment endpoints.
pub const COORD_PRECISION: i32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// One drawn stroke.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

impl Segment {
    pub const fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    pub fn points(&self) -> [Point; 2] {
        [self.start, self.end]
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurtleState {
    pub x: f64,
    pub y: f64,
    /// Degrees.
    pub heading: f64,
}

impl Default for TurtleState {
    fn default() -> Self {
        Self { x: 0.0, y: 0.0, heading: 90.0 }
    }
}

impl TurtleState {
    fn advance(&mut self, step: f64) {
        let rad = self.heading.to_radians();
        self.x += step * rad.cos();
        self.y += step * rad.sin();
    }

    fn position(&self) -> Point {
        Point::new(round_coord(self.x), round_coord(self.y))
    }
}

fn round_coord(v: f64) -> f64 {
    let scale = 10f64.powi(COORD_PRECISION);
    // `+ 0.0` folds -0.0 into 0.0.
    (v * scale).round() / scale + 0.0
}

fn finite_position(state: &TurtleState, position: usize) -> Result<Point, RenderError> {
    let p = state.position();
    if p.x.is_finite() && p.y.is_finite() {
        Ok(p)
    } else {
        Err(RenderError::NonFiniteCoordinate { position })
    }
}

/// Interpret `instructions` into segments in drawing order.
pub fn interpret(instructions: &str, angle: f64, step: f64) -> Result<Vec<Segment>, RenderError> {
    let mut state = TurtleState::default();
    let mut stack: Vec<TurtleState> = Vec::new();
    let mut segments = Vec::new();

    for (position, symbol) in instructions.chars().enumerate() {
        match symbol {
            'F' => {
                let start = state.position();
                state.advance(step);
                let end = finite_position(&state, position)?;
                segments.push(Segment::new(start, end));
            }
            'f' => {
                state.advance(step);
                finite_position(&state, position)?;
            }
            '+' => state.heading += angle,
            '-' => state.heading -= angle,
            '|' => state.heading += 180.0,
            '[' => stack.push(state),
            ']' => {
                state = stack
                    .pop()
                    .ok_or(RenderError::UnbalancedBracket { position })?;
            }
            _ => {}
        }
    }

    Ok(segments)
}
