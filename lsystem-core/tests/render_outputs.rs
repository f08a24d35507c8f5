//! Output format tests: decoded PNG pixels and SVG structure.

use std::io::Cursor;

use lsystem_core::{
    render::Rgb, CanvasConfig, Grammar, OutputFormat, PresetOverrides, RenderPipeline,
    RenderRequest,
};

const STROKE: Rgb = Rgb([0x22, 0x8b, 0x22]);

fn request(axiom: &str, canvas: CanvasConfig, format: OutputFormat) -> RenderRequest {
    RenderRequest {
        label: "corner".to_string(),
        grammar: Grammar::from_pairs(axiom, [("X", "X")]).unwrap(),
        iterations: 0,
        angle: 90.0,
        step: 1.0,
        canvas,
        format,
    }
}

struct Decoded {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Decoded {
    fn pixel(&self, x: u32, y: u32) -> Rgb {
        let i = (y as usize * self.width as usize + x as usize) * 3;
        Rgb([self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]])
    }
}

fn decode(bytes: &[u8]) -> Decoded {
    let decoder = png::Decoder::new(Cursor::new(bytes));
    let mut reader = decoder.read_info().unwrap();
    let mut pixels = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut pixels).unwrap();
    assert_eq!(info.color_type, png::ColorType::Rgb);
    assert_eq!(info.bit_depth, png::BitDepth::Eight);
    pixels.truncate(info.buffer_size());
    Decoded { width: info.width, height: info.height, pixels }
}

fn corner_canvas(flip_y: bool) -> CanvasConfig {
    CanvasConfig { padding: 10.0, flip_y, ..CanvasConfig::new(40, 40) }
}

#[test]
fn test_png_decodes_with_requested_size() {
    let pipeline = RenderPipeline::default();
    let request = pipeline
        .request_for_preset(
            "weed",
            &PresetOverrides::default(),
            CanvasConfig::new(321, 123),
            OutputFormat::Png,
        )
        .unwrap();
    let image = pipeline.render(&request).unwrap();
    let decoded = decode(&image.bytes);
    assert_eq!((decoded.width, decoded.height), (321, 123));
    assert!(decoded.pixels.chunks(3).any(|p| p == STROKE.0));
}

#[test]
fn test_png_pixels_follow_fitted_geometry() {
    // "F+F" draws up then left: fitted to (30,10)-(30,30) and (30,30)-(10,30).
    let pipeline = RenderPipeline::default();
    let image = pipeline
        .render(&request("F+F", corner_canvas(false), OutputFormat::Png))
        .unwrap();
    let decoded = decode(&image.bytes);

    assert_eq!(decoded.pixel(30, 10), STROKE);
    assert_eq!(decoded.pixel(30, 20), STROKE);
    assert_eq!(decoded.pixel(10, 30), STROKE);
    assert_eq!(decoded.pixel(10, 10), Rgb::WHITE);
    assert_eq!(decoded.pixel(0, 0), Rgb::WHITE);
}

#[test]
fn test_flip_y_mirrors_raster() {
    let pipeline = RenderPipeline::default();
    let image = pipeline
        .render(&request("F+F", corner_canvas(true), OutputFormat::Png))
        .unwrap();
    let decoded = decode(&image.bytes);

    assert_eq!(decoded.pixel(10, 10), STROKE);
    assert_eq!(decoded.pixel(10, 30), Rgb::WHITE);
}

#[test]
fn test_empty_drawing_is_blank_valid_png() {
    let pipeline = RenderPipeline::default();
    let mut canvas = CanvasConfig::new(16, 8);
    canvas.padding = 2.0;
    canvas.background = "#000".to_string();
    let image = pipeline
        .render(&request("+-[]", canvas, OutputFormat::Png))
        .unwrap();
    assert_eq!(image.manifest.segment_count, 0);

    let decoded = decode(&image.bytes);
    assert_eq!((decoded.width, decoded.height), (16, 8));
    assert!(decoded.pixels.iter().all(|&b| b == 0));
}

#[test]
fn test_empty_drawing_svg_has_no_lines() {
    let pipeline = RenderPipeline::default();
    let image = pipeline
        .render(&request("f", CanvasConfig::default(), OutputFormat::Svg))
        .unwrap();
    let svg = String::from_utf8(image.bytes).unwrap();
    assert_eq!(
        svg,
        "<svg height=\"600\" width=\"800\" xmlns=\"http://www.w3.org/2000/svg\">\n</svg>\n"
    );
}

#[test]
fn test_svg_custom_size_and_stroke() {
    let pipeline = RenderPipeline::default();
    let mut canvas = corner_canvas(false);
    canvas.width = 60;
    canvas.stroke = "#abcdef".to_string();
    canvas.stroke_width = 2.5;
    let image = pipeline
        .render(&request("F+F", canvas, OutputFormat::Svg))
        .unwrap();
    let svg = String::from_utf8(image.bytes).unwrap();
    let lines: Vec<&str> = svg.lines().collect();

    assert_eq!(
        lines[0],
        r#"<svg height="40" width="60" xmlns="http://www.w3.org/2000/svg">"#
    );
    // Bounds (-1,0)..(0,1) scale by 20 and centre at (30,20).
    assert_eq!(
        lines[1],
        r##"  <line stroke="#abcdef" stroke-width="2.5000" x1="40.0000" x2="40.0000" y1="10.0000" y2="30.0000" />"##
    );
    assert_eq!(
        lines[2],
        r##"  <line stroke="#abcdef" stroke-width="2.5000" x1="40.0000" x2="20.0000" y1="30.0000" y2="30.0000" />"##
    );
    assert_eq!(lines[3], "</svg>");
    assert!(svg.ends_with("</svg>\n"));
}

#[test]
fn test_negative_coordinates_fit_inside_canvas() {
    // Heading 270 walks into negative y; fitting must still land in bounds.
    let pipeline = RenderPipeline::default();
    let mut req = request("++FF-F", CanvasConfig::new(100, 100), OutputFormat::Svg);
    req.canvas.padding = 5.0;
    let image = pipeline.render(&req).unwrap();
    let svg = String::from_utf8(image.bytes).unwrap();

    for line in svg.lines().filter(|l| l.contains("<line")) {
        for attr in ["x1=\"", "x2=\"", "y1=\"", "y2=\""] {
            let start = line.find(attr).unwrap() + attr.len();
            let end = start + line[start..].find('"').unwrap();
            let v: f64 = line[start..end].parse().unwrap();
            assert!((5.0..=95.0).contains(&v), "{} out of padded area in {}", v, line);
        }
    }
}

#[test]
fn test_svg_and_png_share_segment_digest() {
    let pipeline = RenderPipeline::default();
    let svg = pipeline
        .render(&request("F+F-F", CanvasConfig::default(), OutputFormat::Svg))
        .unwrap();
    let png = pipeline
        .render(&request("F+F-F", CanvasConfig::default(), OutputFormat::Png))
        .unwrap();
    assert_eq!(svg.manifest.segments_digest, png.manifest.segments_digest);
    assert_ne!(svg.manifest.output_hash, png.manifest.output_hash);
}
