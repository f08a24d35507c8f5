//! Render Pipeline - Single Entry Point
//!
//! `render` always validates first. Expansion, interpretation and encoding
//! only run for requests that passed every rule.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::error::RenderError;
use crate::grammar::{expand, Grammar, MAX_ITERATIONS};
use crate::hashing::{compute_job_hash, segments_digest, sha256_hex};
use crate::presets::{Preset, PresetRegistry};
use crate::render::{self, BuiltinPngEncoder, CanvasConfig, OutputFormat, RasterEncoder};
use crate::turtle::interpret;
use crate::validation::Validator;
use crate::ENGINE_VERSION;

#[cfg(feature = "test-hooks")]
use std::sync::atomic::{AtomicU32, Ordering};

#[cfg(feature = "test-hooks")]
static VALIDATION_CALL_COUNT: AtomicU32 = AtomicU32::new(0);

#[cfg(feature = "test-hooks")]
pub fn get_validation_call_count() -> u32 {
    VALIDATION_CALL_COUNT.load(Ordering::SeqCst)
}

#[cfg(feature = "test-hooks")]
pub fn reset_validation_call_count() {
    VALIDATION_CALL_COUNT.store(0, Ordering::SeqCst);
}

/// Everything needed to produce one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
    /// Preset name or a caller-chosen tag; used for file naming and hashing.
    pub label: String,
    pub grammar: Grammar,
    pub iterations: u32,
    pub angle: f64,
    pub step: f64,
    pub canvas: CanvasConfig,
    pub format: OutputFormat,
}

/// Optional per-render overrides applied on top of a preset.
#[derive(Debug, Clone, Default)]
pub struct PresetOverrides {
    pub iterations: Option<i64>,
    pub angle: Option<f64>,
    pub step: Option<f64>,
}

/// Signed iteration count from an outer layer, checked into range.
pub fn checked_iterations(requested: i64) -> Result<u32, RenderError> {
    u32::try_from(requested)
        .ok()
        .filter(|n| *n <= MAX_ITERATIONS)
        .ok_or(RenderError::IterationOutOfRange { requested, max: MAX_ITERATIONS })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderManifest {
    pub id: String,
    pub label: String,
    pub engine_version: String,
    pub created_at: DateTime<Utc>,
    pub format: OutputFormat,
    pub size: [u32; 2],
    pub encoder: String,
    pub instruction_length: usize,
    pub segment_count: usize,
    pub job_hash: String,
    pub segments_digest: String,
    pub output_hash: String,
}

/// Complete payload plus its manifest. Never partially filled.
#[derive(Debug, Clone)]
pub struct RenderedImage {
    pub manifest: RenderManifest,
    pub bytes: Vec<u8>,
}

impl RenderedImage {
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.manifest.label, self.manifest.format.extension())
    }
}

/// The render pipeline - single entry point for all render operations
pub struct RenderPipeline {
    registry: PresetRegistry,
    validator: Validator,
    encoder: Box<dyn RasterEncoder>,
}

impl RenderPipeline {
    pub fn new(registry: PresetRegistry) -> Self {
        Self {
            registry,
            validator: Validator::new(),
            encoder: Box::new(BuiltinPngEncoder),
        }
    }

    /// Swap the raster encoder. The built-in encoder is the default.
    pub fn with_encoder(mut self, encoder: Box<dyn RasterEncoder>) -> Self {
        self.encoder = encoder;
        self
    }

    pub fn encoder_name(&self) -> &'static str {
        self.encoder.name()
    }

    /// List all available presets
    pub fn list_presets(&self) -> Vec<&Preset> {
        self.registry.list()
    }

    pub fn get_preset(&self, name: &str) -> Option<&Preset> {
        self.registry.get(name)
    }

    /// Build a request from a named preset.
    pub fn request_for_preset(
        &self,
        name: &str,
        overrides: &PresetOverrides,
        canvas: CanvasConfig,
        format: OutputFormat,
    ) -> Result<RenderRequest, RenderError> {
        let preset = self.registry.require(name)?;
        self.check_engine_version(preset)?;

        let iterations = match overrides.iterations {
            Some(n) => checked_iterations(n)?,
            None => preset.iterations,
        };

        Ok(RenderRequest {
            label: preset.name.clone(),
            grammar: preset.grammar.clone(),
            iterations,
            angle: overrides.angle.unwrap_or(preset.angle),
            step: overrides.step.unwrap_or(preset.step),
            canvas,
            format,
        })
    }

    /// Validate a request without rendering
    ///
    /// This is the ONLY validation entry point.
    pub fn validate_request(&self, request: &RenderRequest) -> Result<(), RenderError> {
        #[cfg(feature = "test-hooks")]
        VALIDATION_CALL_COUNT.fetch_add(1, Ordering::SeqCst);

        self.validator.validate(request)
    }

    /// Render a request to bytes.
    ///
    /// Always calls validate_request first. No bypass.
    #[instrument(skip_all, fields(label = %request.label, format = %request.format))]
    pub fn render(&self, request: &RenderRequest) -> Result<RenderedImage, RenderError> {
        self.validate_request(request)?;

        let instructions = expand(&request.grammar, request.iterations)?;
        debug!(symbols = instructions.chars().count(), "expanded grammar");

        let segments = interpret(&instructions, request.angle, request.step)?;
        debug!(segments = segments.len(), "interpreted instructions");

        let bytes = render::render(&segments, &request.canvas, request.format, self.encoder.as_ref())?;

        let manifest = RenderManifest {
            id: Uuid::new_v4().to_string(),
            label: request.label.clone(),
            engine_version: ENGINE_VERSION.to_string(),
            created_at: Utc::now(),
            format: request.format,
            size: [request.canvas.width, request.canvas.height],
            encoder: match request.format {
                OutputFormat::Svg => "svg".to_string(),
                OutputFormat::Png => self.encoder.name().to_string(),
            },
            instruction_length: instructions.chars().count(),
            segment_count: segments.len(),
            job_hash: compute_job_hash(&request.label, request, ENGINE_VERSION)?,
            segments_digest: segments_digest(&segments)?,
            output_hash: sha256_hex(&bytes),
        };

        info!(
            segments = manifest.segment_count,
            bytes = bytes.len(),
            "render complete"
        );
        Ok(RenderedImage { manifest, bytes })
    }

    fn check_engine_version(&self, preset: &Preset) -> Result<(), RenderError> {
        let engine_ver = semver::Version::parse(ENGINE_VERSION)
            .map_err(|_| RenderError::Encoding("invalid engine version".into()))?;
        let min_ver = semver::Version::parse(&preset.engine_min_version).map_err(|_| {
            RenderError::InvalidGrammar(format!(
                "preset {} has invalid engineMinVersion {:?}",
                preset.name, preset.engine_min_version
            ))
        })?;

        if engine_ver < min_ver {
            return Err(RenderError::EngineVersionMismatch(
                preset.name.clone(),
                preset.engine_min_version.clone(),
                ENGINE_VERSION.to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for RenderPipeline {
    fn default() -> Self {
        Self::new(PresetRegistry::default())
    }
}
