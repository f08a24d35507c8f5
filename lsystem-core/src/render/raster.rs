//! RGB8 pixel buffer with integer line drawing.

use crate::error::RenderError;
use crate::render::{CanvasConfig, Rgb, MAX_CANVAS_SIDE};
use crate::turtle::{Point, Segment};

/// Row-major RGB8 image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Raster {
    pub fn new(width: u32, height: u32, background: Rgb) -> Result<Self, RenderError> {
        if width == 0 || height == 0 || width > MAX_CANVAS_SIDE || height > MAX_CANVAS_SIDE {
            return Err(RenderError::InvalidCanvasDimensions(format!(
                "raster size {}x{} outside 1..={}",
                width, height, MAX_CANVAS_SIDE
            )));
        }
        let count = width as usize * height as usize;
        let mut pixels = Vec::with_capacity(count * 3);
        for _ in 0..count {
            pixels.extend_from_slice(&background.0);
        }
        Ok(Self { width, height, pixels })
    }

    /// Rasterize fitted segments using the canvas colours.
    pub fn draw(fitted: &[Segment], canvas: &CanvasConfig) -> Result<Self, RenderError> {
        let stroke = Rgb::parse_hex(&canvas.stroke)?;
        let background = Rgb::parse_hex(&canvas.background)?;
        let mut raster = Self::new(canvas.width, canvas.height, background)?;
        for seg in fitted {
            let (x0, y0) = raster.to_pixel(seg.start);
            let (x1, y1) = raster.to_pixel(seg.end);
            raster.draw_line(x0, y0, x1, y1, stroke);
        }
        Ok(raster)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 3;
        Some(Rgb([self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]]))
    }

    /// Nearest pixel, clamped into the image.
    pub fn to_pixel(&self, p: Point) -> (i64, i64) {
        let clamp = |v: f64, limit: u32| -> i64 {
            let max = i64::from(limit) - 1;
            if v.is_nan() {
                return 0;
            }
            (v.round().clamp(0.0, max as f64)) as i64
        };
        (clamp(p.x, self.width), clamp(p.y, self.height))
    }

    /// Writes outside the image are dropped.
    pub fn set_pixel(&mut self, x: i64, y: i64, color: Rgb) {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return;
        }
        let i = (y as usize * self.width as usize + x as usize) * 3;
        self.pixels[i..i + 3].copy_from_slice(&color.0);
    }

    /// Bresenham line, both endpoints inclusive.
    pub fn draw_line(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, color: Rgb) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let (mut x, mut y) = (x0, y0);

        loop {
            self.set_pixel(x, y, color);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Scanlines prefixed with filter byte 0, as PNG expects.
    pub fn filtered_scanlines(&self) -> Vec<u8> {
        let stride = self.width as usize * 3;
        let mut raw = Vec::with_capacity((stride + 1) * self.height as usize);
        for row in self.pixels.chunks_exact(stride) {
            raw.push(0);
            raw.extend_from_slice(row);
        }
        raw
    }
}
