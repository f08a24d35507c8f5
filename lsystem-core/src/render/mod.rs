//! Canonical Serialization - SVG and PNG
//!
//! Both encodings fit raw turtle segments onto the canvas with
//! [`transform_segments`] first, then emit with fixed ordering and fixed
//! precision so identical input yields identical bytes.

pub mod encoder;
pub mod raster;
pub mod svg;

#[cfg(feature = "png-crate")]
pub mod delegated;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::bounds::transform_segments;
use crate::error::RenderError;
use crate::turtle::{Point, Segment};

pub use self::encoder::{BuiltinPngEncoder, RasterEncoder};
pub use self::raster::Raster;

/// Largest accepted canvas side, in pixels.
pub const MAX_CANVAS_SIDE: u32 = 16_384;

/// Canvas geometry and presentation attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasConfig {
    pub width: u32,
    pub height: u32,
    #[serde(default = "default_padding")]
    pub padding: f64,
    #[serde(default = "default_stroke")]
    pub stroke: String,
    #[serde(default = "default_stroke_width")]
    pub stroke_width: f64,
    #[serde(default = "default_background")]
    pub background: String,
    /// Mirror fitted Y so Y-up drawings read upright in image space.
    #[serde(default)]
    pub flip_y: bool,
}

fn default_padding() -> f64 { 20.0 }
fn default_stroke() -> String { "#228B22".to_string() }
fn default_stroke_width() -> f64 { 1.0 }
fn default_background() -> String { "#ffffff".to_string() }

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            padding: default_padding(),
            stroke: default_stroke(),
            stroke_width: default_stroke_width(),
            background: default_background(),
            flip_y: false,
        }
    }
}

impl CanvasConfig {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height, ..Self::default() }
    }

    /// Fit raw segments onto this canvas, applying `flip_y` last.
    pub fn fit(&self, segments: &[Segment]) -> Result<Vec<Segment>, RenderError> {
        let height = f64::from(self.height);
        let mut fitted =
            transform_segments(segments, f64::from(self.width), height, self.padding)?;
        if self.flip_y {
            let mirror = |p: Point| Point::new(p.x, height - p.y);
            for s in &mut fitted {
                *s = Segment::new(mirror(s.start), mirror(s.end));
            }
        }
        Ok(fitted)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Svg,
    Png,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Svg => "svg",
            OutputFormat::Png => "png",
        }
    }

    /// Guess from a file extension, case-insensitively.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "svg" => Some(OutputFormat::Svg),
            "png" => Some(OutputFormat::Png),
            _ => None,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_extension(s)
            .ok_or_else(|| format!("unknown output format {:?} (expected svg or png)", s))
    }
}

/// 8-bit RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    pub const BLACK: Rgb = Rgb([0, 0, 0]);
    pub const WHITE: Rgb = Rgb([255, 255, 255]);

    /// Parse `#rrggbb` or `#rgb`.
    pub fn parse_hex(value: &str) -> Result<Self, RenderError> {
        let invalid = || {
            RenderError::InvalidStroke(format!(
                "colour {:?} must be #rrggbb or #rgb for raster output",
                value
            ))
        };
        let hex = value.strip_prefix('#').ok_or_else(invalid)?;
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
        match hex.len() {
            6 => Ok(Rgb([channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?])),
            3 => {
                let mut out = [0u8; 3];
                for (slot, i) in out.iter_mut().zip(0..3) {
                    *slot = channel(&hex[i..i + 1])? * 17;
                }
                Ok(Rgb(out))
            }
            _ => Err(invalid()),
        }
    }
}

/// Render raw segments as canonical SVG bytes.
pub fn render_svg(segments: &[Segment], canvas: &CanvasConfig) -> Result<String, RenderError> {
    let fitted = canvas.fit(segments)?;
    svg::write_svg(&fitted, canvas)
}

/// Rasterize raw segments and encode them with `encoder`.
pub fn render_png(
    segments: &[Segment],
    canvas: &CanvasConfig,
    encoder: &dyn RasterEncoder,
) -> Result<Vec<u8>, RenderError> {
    let fitted = canvas.fit(segments)?;
    let raster = Raster::draw(&fitted, canvas)?;
    encoder.encode(&raster)
}

/// Render in the requested format.
pub fn render(
    segments: &[Segment],
    canvas: &CanvasConfig,
    format: OutputFormat,
    encoder: &dyn RasterEncoder,
) -> Result<Vec<u8>, RenderError> {
    match format {
        OutputFormat::Svg => render_svg(segments, canvas).map(String::into_bytes),
        OutputFormat::Png => render_png(segments, canvas, encoder),
    }
}
