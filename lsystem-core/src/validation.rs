//! Request Validation - Fail Before Expanding
//!
//! Each rule inspects a [`RenderRequest`] in isolation. The validator runs
//! them in a fixed order and stops at the first violation, so canvas
//! problems are reported before any grammar work happens.

use tracing::debug;

use crate::bounds::validate_canvas;
use crate::error::RenderError;
use crate::grammar::MAX_ITERATIONS;
use crate::pipeline::RenderRequest;
use crate::render::svg::check_stroke;
use crate::render::{OutputFormat, Rgb, MAX_CANVAS_SIDE};

pub trait ValidationRule: Send + Sync {
    fn name(&self) -> &'static str;
    fn check(&self, request: &RenderRequest) -> Result<(), RenderError>;
}

// --- Concrete Rules ---

pub struct CanvasRule;

impl ValidationRule for CanvasRule {
    fn name(&self) -> &'static str { "canvas" }

    fn check(&self, request: &RenderRequest) -> Result<(), RenderError> {
        let canvas = &request.canvas;
        for (label, side) in [("width", canvas.width), ("height", canvas.height)] {
            if side == 0 || side > MAX_CANVAS_SIDE {
                return Err(RenderError::InvalidCanvasDimensions(format!(
                    "{} must be in 1..={}, got {}",
                    label, MAX_CANVAS_SIDE, side
                )));
            }
        }
        validate_canvas(f64::from(canvas.width), f64::from(canvas.height), canvas.padding)
    }
}

pub struct IterationRule;

impl ValidationRule for IterationRule {
    fn name(&self) -> &'static str { "iterations" }

    fn check(&self, request: &RenderRequest) -> Result<(), RenderError> {
        if request.iterations > MAX_ITERATIONS {
            return Err(RenderError::IterationOutOfRange {
                requested: i64::from(request.iterations),
                max: MAX_ITERATIONS,
            });
        }
        Ok(())
    }
}

pub struct TurtleRule;

impl ValidationRule for TurtleRule {
    fn name(&self) -> &'static str { "turtle" }

    fn check(&self, request: &RenderRequest) -> Result<(), RenderError> {
        if !request.angle.is_finite() {
            return Err(RenderError::InvalidTurtleParameters(format!(
                "angle must be finite, got {}",
                request.angle
            )));
        }
        if !(request.step.is_finite() && request.step > 0.0) {
            return Err(RenderError::InvalidTurtleParameters(format!(
                "step must be a positive number, got {}",
                request.step
            )));
        }
        Ok(())
    }
}

pub struct StrokeRule;

impl ValidationRule for StrokeRule {
    fn name(&self) -> &'static str { "stroke" }

    fn check(&self, request: &RenderRequest) -> Result<(), RenderError> {
        let canvas = &request.canvas;
        check_stroke(&canvas.stroke)?;
        if !(canvas.stroke_width.is_finite() && canvas.stroke_width > 0.0) {
            return Err(RenderError::InvalidStroke(format!(
                "stroke width must be positive, got {}",
                canvas.stroke_width
            )));
        }
        if request.format == OutputFormat::Png {
            Rgb::parse_hex(&canvas.stroke)?;
            Rgb::parse_hex(&canvas.background)?;
        }
        Ok(())
    }
}

/// Runs the rules in order.
pub struct Validator {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl Validator {
    pub fn new() -> Self {
        Self {
            rules: vec![
                Box::new(CanvasRule),
                Box::new(IterationRule),
                Box::new(TurtleRule),
                Box::new(StrokeRule),
            ],
        }
    }

    pub fn validate(&self, request: &RenderRequest) -> Result<(), RenderError> {
        for rule in &self.rules {
            rule.check(request).map_err(|e| {
                debug!(rule = rule.name(), error = %e, "validation rejected request");
                e
            })?;
        }
        Ok(())
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Grammar;
    use crate::render::CanvasConfig;

    fn request() -> RenderRequest {
        RenderRequest {
            label: "test".to_string(),
            grammar: Grammar::from_pairs("F", [("F", "FF")]).unwrap(),
            iterations: 2,
            angle: 25.0,
            step: 1.0,
            canvas: CanvasConfig::new(200, 100),
            format: OutputFormat::Svg,
        }
    }

    #[test]
    fn test_valid_request_passes() {
        assert!(Validator::new().validate(&request()).is_ok());
    }

    #[test]
    fn test_canvas_rule() {
        let mut r = request();
        r.canvas.width = 0;
        assert!(matches!(CanvasRule.check(&r), Err(RenderError::InvalidCanvasDimensions(_))));
        r.canvas.width = MAX_CANVAS_SIDE + 1;
        assert!(CanvasRule.check(&r).is_err());
        r.canvas.width = 200;
        r.canvas.padding = 50.0;
        assert!(matches!(CanvasRule.check(&r), Err(RenderError::PaddingTooLarge { .. })));
    }

    #[test]
    fn test_canvas_checked_before_iterations() {
        let mut r = request();
        r.iterations = MAX_ITERATIONS + 5;
        r.canvas.padding = -1.0;
        let err = Validator::new().validate(&r).unwrap_err();
        assert!(matches!(err, RenderError::InvalidCanvasDimensions(_)));
    }

    #[test]
    fn test_iteration_rule() {
        let mut r = request();
        r.iterations = MAX_ITERATIONS + 1;
        assert!(matches!(
            IterationRule.check(&r),
            Err(RenderError::IterationOutOfRange { .. })
        ));
    }

    #[test]
    fn test_turtle_rule() {
        let mut r = request();
        r.step = 0.0;
        assert!(TurtleRule.check(&r).is_err());
        r.step = 1.0;
        r.angle = f64::INFINITY;
        assert!(TurtleRule.check(&r).is_err());
        r.angle = -400.0;
        assert!(TurtleRule.check(&r).is_ok());
    }

    #[test]
    fn test_stroke_rule_depends_on_format() {
        let mut r = request();
        r.canvas.stroke = "forestgreen".to_string();
        assert!(StrokeRule.check(&r).is_ok());
        r.format = OutputFormat::Png;
        assert!(matches!(StrokeRule.check(&r), Err(RenderError::InvalidStroke(_))));
        r.canvas.stroke = "#123".to_string();
        r.canvas.background = "white".to_string();
        assert!(StrokeRule.check(&r).is_err());
    }
}
