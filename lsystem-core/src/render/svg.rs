//! Canonical SVG writer.
//!
//! Root and line attributes are emitted in alphabetical order, every
//! numeric line attribute with exactly four decimals.

use std::fmt::Write;

use crate::error::RenderError;
use crate::render::CanvasConfig;
use crate::turtle::Segment;

const SVG_NS: &str = "http://www.w3.org/2000/svg";

/// Format with exactly four decimals; -0.0000 becomes 0.0000.
pub fn fmt4(value: f64) -> String {
    let s = format!("{:.4}", value);
    if s == "-0.0000" {
        "0.0000".to_string()
    } else {
        s
    }
}

/// Reject stroke values that would break out of the attribute.
pub fn check_stroke(stroke: &str) -> Result<(), RenderError> {
    if stroke.trim().is_empty() {
        return Err(RenderError::InvalidStroke("stroke colour must be non-empty".into()));
    }
    if stroke.chars().any(|c| matches!(c, '"' | '<' | '>' | '&') || c.is_control()) {
        return Err(RenderError::InvalidStroke(format!(
            "stroke colour {:?} contains markup characters",
            stroke
        )));
    }
    Ok(())
}

/// Serialize already-fitted segments.
pub fn write_svg(fitted: &[Segment], canvas: &CanvasConfig) -> Result<String, RenderError> {
    check_stroke(&canvas.stroke)?;
    if !(canvas.stroke_width.is_finite() && canvas.stroke_width > 0.0) {
        return Err(RenderError::InvalidStroke(format!(
            "stroke width must be positive, got {}",
            canvas.stroke_width
        )));
    }

    let stroke_width = fmt4(canvas.stroke_width);
    // ~120 bytes per line element.
    let mut out = String::with_capacity(96 + fitted.len() * 120);
    let _ = writeln!(
        out,
        r#"<svg height="{}" width="{}" xmlns="{}">"#,
        canvas.height, canvas.width, SVG_NS
    );
    for seg in fitted {
        let _ = writeln!(
            out,
            r#"  <line stroke="{}" stroke-width="{}" x1="{}" x2="{}" y1="{}" y2="{}" />"#,
            canvas.stroke,
            stroke_width,
            fmt4(seg.start.x),
            fmt4(seg.end.x),
            fmt4(seg.start.y),
            fmt4(seg.end.y),
        );
    }
    out.push_str("</svg>\n");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::render_svg;
    use crate::turtle::Point;

    fn seg(x0: f64, y0: f64, x1: f64, y1: f64) -> Segment {
        Segment::new(Point::new(x0, y0), Point::new(x1, y1))
    }

    #[test]
    fn test_fmt4() {
        assert_eq!(fmt4(1.0), "1.0000");
        assert_eq!(fmt4(37.5), "37.5000");
        assert_eq!(fmt4(-0.00001), "0.0000");
        assert_eq!(fmt4(-2.25), "-2.2500");
        assert_eq!(fmt4(0.123456), "0.1235");
    }

    #[test]
    fn test_empty_svg_is_well_formed() {
        let svg = write_svg(&[], &CanvasConfig::new(123, 45)).unwrap();
        assert_eq!(
            svg,
            "<svg height=\"45\" width=\"123\" xmlns=\"http://www.w3.org/2000/svg\">\n</svg>\n"
        );
    }

    #[test]
    fn test_line_element_layout() {
        let canvas = CanvasConfig::new(100, 50);
        let svg = write_svg(&[seg(37.5, 0.0, 62.5, 50.0)], &canvas).unwrap();
        let lines: Vec<&str> = svg.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[1],
            r##"  <line stroke="#228B22" stroke-width="1.0000" x1="37.5000" x2="62.5000" y1="0.0000" y2="50.0000" />"##
        );
        assert!(svg.ends_with("</svg>\n"));
    }

    #[test]
    fn test_segment_order_in_output() {
        let canvas = CanvasConfig::new(10, 10);
        let svg = write_svg(&[seg(1.0, 1.0, 2.0, 2.0), seg(3.0, 3.0, 4.0, 4.0)], &canvas).unwrap();
        let first = svg.find(r#"x1="1.0000""#).unwrap();
        let second = svg.find(r#"x1="3.0000""#).unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_every_coordinate_has_four_decimals() {
        let mut canvas = CanvasConfig::new(321, 123);
        canvas.padding = 7.0;
        let raw = [seg(0.0, 0.0, 0.3, 1.7), seg(0.3, 1.7, -2.9, 0.1)];
        let svg = render_svg(&raw, &canvas).unwrap();
        for attr in ["x1=\"", "x2=\"", "y1=\"", "y2=\"", "stroke-width=\""] {
            for chunk in svg.split(attr).skip(1) {
                let value = &chunk[..chunk.find('"').unwrap()];
                let (_, decimals) = value.split_once('.').unwrap();
                assert_eq!(decimals.len(), 4, "{}{}", attr, value);
            }
        }
    }

    #[test]
    fn test_svg_deterministic() {
        let raw = [seg(0.0, 0.0, 1.0, 3.0), seg(1.0, 3.0, 2.0, 0.5)];
        let canvas = CanvasConfig::default();
        assert_eq!(render_svg(&raw, &canvas).unwrap(), render_svg(&raw, &canvas).unwrap());
    }

    #[test]
    fn test_stroke_validation() {
        let mut canvas = CanvasConfig::new(10, 10);
        canvas.stroke = "red\" onload=\"x".into();
        assert!(matches!(write_svg(&[], &canvas), Err(RenderError::InvalidStroke(_))));
        canvas.stroke = "  ".into();
        assert!(write_svg(&[], &canvas).is_err());
        canvas.stroke = "forestgreen".into();
        assert!(write_svg(&[], &canvas).is_ok());
        canvas.stroke_width = 0.0;
        assert!(write_svg(&[], &canvas).is_err());
    }
}
