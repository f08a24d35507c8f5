//! Bounds and Canvas Fitting
//!
//! `transform_segments` is a one-shot fit: running it again on its own
//! output re-fits against the new bounds, so it is not a projection.

use crate::error::RenderError;
use crate::turtle::{Point, Segment};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.min_x + self.width() / 2.0,
            self.min_y + self.height() / 2.0,
        )
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }
}

/// Minimal box around every endpoint, or `None` for no segments.
pub fn compute_bounds(segments: &[Segment]) -> Option<BoundingBox> {
    let first = segments.first()?.start;
    let init = BoundingBox {
        min_x: first.x,
        min_y: first.y,
        max_x: first.x,
        max_y: first.y,
    };
    Some(
        segments
            .iter()
            .flat_map(Segment::points)
            .fold(init, |b, p| BoundingBox {
                min_x: b.min_x.min(p.x),
                min_y: b.min_y.min(p.y),
                max_x: b.max_x.max(p.x),
                max_y: b.max_y.max(p.y),
            }),
    )
}

/// Check canvas dimensions and padding without touching any segments.
pub fn validate_canvas(width: f64, height: f64, padding: f64) -> Result<(), RenderError> {
    if !(width.is_finite() && width > 0.0) {
        return Err(RenderError::InvalidCanvasDimensions(format!(
            "width must be positive, got {}",
            width
        )));
    }
    if !(height.is_finite() && height > 0.0) {
        return Err(RenderError::InvalidCanvasDimensions(format!(
            "height must be positive, got {}",
            height
        )));
    }
    if !(padding.is_finite() && padding >= 0.0) {
        return Err(RenderError::InvalidCanvasDimensions(format!(
            "padding must be non-negative, got {}",
            padding
        )));
    }
    if 2.0 * padding >= width || 2.0 * padding >= height {
        return Err(RenderError::PaddingTooLarge { padding, width, height });
    }
    Ok(())
}

/// Scale uniformly and centre `segments` inside the padded canvas.
pub fn transform_segments(
    segments: &[Segment],
    width: f64,
    height: f64,
    padding: f64,
) -> Result<Vec<Segment>, RenderError> {
    validate_canvas(width, height, padding)?;

    let bounds = match compute_bounds(segments) {
        Some(b) => b,
        None => return Ok(Vec::new()),
    };

    let (bw, bh) = (bounds.width(), bounds.height());
    if !(bw.is_finite() && bh.is_finite()) {
        return Err(RenderError::UnfittableDrawing(format!(
            "bounds {:?} span more than f64 can represent",
            bounds
        )));
    }

    let avail_w = width - 2.0 * padding;
    let avail_h = height - 2.0 * padding;

    let scale = match (bw == 0.0, bh == 0.0) {
        (true, true) => 1.0,
        (true, false) => avail_h / bh,
        (false, true) => avail_w / bw,
        (false, false) => (avail_w / bw).min(avail_h / bh),
    };

    let center = bounds.center();
    let target = Point::new(padding + avail_w / 2.0, padding + avail_h / 2.0);
    let fit = |p: Point| {
        Point::new(
            (p.x - center.x) * scale + target.x,
            (p.y - center.y) * scale + target.y,
        )
    };

    Ok(segments
        .iter()
        .map(|s| Segment::new(fit(s.start), fit(s.end)))
        .collect())
}
