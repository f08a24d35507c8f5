//! L-System Core - Deterministic Plant Renderer
//!
//! Grammar expansion, turtle interpretation, canvas fitting and canonical
//! SVG/PNG serialization.
//!
//! # Guarantees
//! 1. Same request, same bytes
//! 2. Validation runs before any expansion
//! 3. Errors name the stage that raised them
//! 4. Outputs are written whole or not at all

pub mod error;
pub mod grammar;
pub mod turtle;
pub mod bounds;
pub mod render;
pub mod presets;
pub mod validation;
pub mod hashing;
pub mod pipeline;
pub mod output;

pub use error::{RenderError, Stage};
pub use grammar::{expand, Grammar, MAX_ITERATIONS, MAX_OUTPUT_LENGTH};
pub use turtle::{interpret, Point, Segment, TurtleState};
pub use bounds::{compute_bounds, transform_segments, BoundingBox};
pub use render::{render_png, render_svg, BuiltinPngEncoder, CanvasConfig, OutputFormat, RasterEncoder};
pub use presets::{Preset, PresetRegistry};
pub use validation::{ValidationRule, Validator};
pub use hashing::{canonical_json, compute_job_hash, segments_digest, sha256_hex};
pub use pipeline::{PresetOverrides, RenderManifest, RenderPipeline, RenderRequest, RenderedImage};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const MIN_PRESET_ENGINE_VERSION: &str = "0.1.0";
