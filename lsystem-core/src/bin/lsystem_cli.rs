//! L-System CLI
//!
//! Commands: list, render
//! Diagnostics go to stderr; `list --json` and the render summary go to stdout.
//! Exit codes: 0 success, 1 bad input, 2 environment or encoder failure.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

use lsystem_core::{
    output::{prepare_destination, write_output},
    pipeline::checked_iterations,
    CanvasConfig, Grammar, OutputFormat, PresetOverrides, PresetRegistry, RenderError,
    RenderPipeline, RenderRequest,
};

// Turtle settings for --axiom renders without a preset to inherit from.
const CUSTOM_ITERATIONS: i64 = 4;
const CUSTOM_ANGLE: f64 = 25.0;
const CUSTOM_STEP: f64 = 5.0;

#[derive(Parser)]
#[command(name = "lsystem-cli")]
#[command(about = "Render L-system plants to SVG or PNG")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory of extra preset JSON files, overlaid on the built-ins
    #[arg(long, global = true)]
    presets_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List available presets
    List {
        /// Print presets as JSON
        #[arg(long)]
        json: bool,
    },

    /// Render a preset or a custom grammar
    Render(RenderArgs),
}

#[derive(clap::Args)]
struct RenderArgs {
    /// Preset name; omit when passing --axiom
    preset: Option<String>,

    /// Custom axiom; replaces the preset grammar
    #[arg(long)]
    axiom: Option<String>,

    /// Production rule as SYMBOL=REPLACEMENT, repeatable
    #[arg(long = "rule")]
    rules: Vec<String>,

    #[arg(short, long, allow_hyphen_values = true)]
    iterations: Option<i64>,

    /// Turn angle in degrees
    #[arg(short, long, allow_hyphen_values = true)]
    angle: Option<f64>,

    /// Forward step length
    #[arg(short, long)]
    step: Option<f64>,

    #[arg(long, default_value_t = 800)]
    width: u32,

    #[arg(long, default_value_t = 600)]
    height: u32,

    #[arg(long, default_value_t = 20.0, allow_hyphen_values = true)]
    padding: f64,

    #[arg(long, default_value = "#228B22")]
    stroke: String,

    #[arg(long, default_value_t = 1.0)]
    stroke_width: f64,

    #[arg(long, default_value = "#ffffff")]
    background: String,

    /// Mirror the drawing vertically after fitting
    #[arg(long)]
    flip_y: bool,

    /// svg or png; defaults to the output extension, then svg
    #[arg(short, long)]
    format: Option<OutputFormat>,

    /// Output file; defaults to <label>.<format>
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also write a JSON manifest with the base64 payload
    #[arg(long)]
    manifest: Option<PathBuf>,

    /// Encode PNG through the `png` crate instead of the built-in encoder
    #[cfg(feature = "png-crate")]
    #[arg(long)]
    png_crate: bool,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("lsystem_core=info,lsystem_cli=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn report(err: &RenderError) -> ExitCode {
    eprintln!("error: [{}] {}", err.stage(), err);
    if err.is_user_error() {
        ExitCode::from(1)
    } else {
        ExitCode::from(2)
    }
}

/// Help and version requests succeed; every other usage error is bad input.
fn parse_failure_code(err: &clap::Error) -> u8 {
    if err.use_stderr() {
        1
    } else {
        0
    }
}

fn main() -> ExitCode {
    init_tracing();
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(parse_failure_code(&e));
        }
    };

    let registry = match &cli.presets_dir {
        Some(dir) => match PresetRegistry::load_from_dir(dir) {
            Ok(r) => r,
            Err(e) => return report(&e),
        },
        None => PresetRegistry::with_builtins(),
    };
    let pipeline = RenderPipeline::new(registry);

    let result = match cli.command {
        Commands::List { json } => list(&pipeline, json),
        Commands::Render(args) => {
            #[cfg(feature = "png-crate")]
            let pipeline = if args.png_crate {
                pipeline.with_encoder(Box::new(lsystem_core::render::delegated::DelegatedPngEncoder))
            } else {
                pipeline
            };
            render(&pipeline, args)
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report(&e),
    }
}

fn list(pipeline: &RenderPipeline, json: bool) -> Result<(), RenderError> {
    let presets = pipeline.list_presets();
    if json {
        let entries: Vec<_> = presets
            .iter()
            .map(|p| {
                serde_json::json!({
                    "name": p.name,
                    "description": p.description,
                    "axiom": p.grammar.axiom(),
                    "angle": p.angle,
                    "step": p.step,
                    "iterations": p.iterations,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    for p in presets {
        println!(
            "{:<8} iterations={:<2} angle={:<5} {}",
            p.name, p.iterations, p.angle, p.description
        );
    }
    Ok(())
}

fn resolve_format(args: &RenderArgs) -> OutputFormat {
    args.format
        .or_else(|| {
            args.output
                .as_deref()
                .and_then(Path::extension)
                .and_then(|e| e.to_str())
                .and_then(OutputFormat::from_extension)
        })
        .unwrap_or(OutputFormat::Svg)
}

fn build_request(
    pipeline: &RenderPipeline,
    args: &RenderArgs,
    canvas: CanvasConfig,
    format: OutputFormat,
) -> Result<RenderRequest, RenderError> {
    let overrides = PresetOverrides {
        iterations: args.iterations,
        angle: args.angle,
        step: args.step,
    };

    if let Some(axiom) = &args.axiom {
        let rules = args
            .rules
            .iter()
            .map(|r| Grammar::parse_rule(r))
            .collect::<Result<Vec<_>, _>>()?;
        let grammar = Grammar::from_pairs(
            axiom.clone(),
            rules.into_iter().map(|(symbol, r)| (symbol.to_string(), r)),
        )?;
        // A preset named alongside --axiom still supplies the turtle settings.
        let (label, iterations, angle, step) = match &args.preset {
            Some(name) => {
                let base = pipeline.request_for_preset(name, &overrides, canvas.clone(), format)?;
                (base.label, base.iterations, base.angle, base.step)
            }
            None => (
                "custom".to_string(),
                checked_iterations(args.iterations.unwrap_or(CUSTOM_ITERATIONS))?,
                args.angle.unwrap_or(CUSTOM_ANGLE),
                args.step.unwrap_or(CUSTOM_STEP),
            ),
        };
        return Ok(RenderRequest {
            label,
            grammar,
            iterations,
            angle,
            step,
            canvas,
            format,
        });
    }

    if !args.rules.is_empty() {
        return Err(RenderError::InvalidGrammar(
            "--rule requires --axiom".to_string(),
        ));
    }
    let name = args.preset.as_deref().ok_or_else(|| {
        RenderError::InvalidGrammar("pass a preset name or --axiom".to_string())
    })?;
    pipeline.request_for_preset(name, &overrides, canvas, format)
}

fn render(pipeline: &RenderPipeline, args: RenderArgs) -> Result<(), RenderError> {
    let format = resolve_format(&args);
    let canvas = CanvasConfig {
        width: args.width,
        height: args.height,
        padding: args.padding,
        stroke: args.stroke.clone(),
        stroke_width: args.stroke_width,
        background: args.background.clone(),
        flip_y: args.flip_y,
    };

    let request = build_request(pipeline, &args, canvas, format)?;
    pipeline.validate_request(&request)?;

    let destination = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("{}.{}", request.label, format.extension())));
    prepare_destination(&destination)?;
    if let Some(manifest_path) = &args.manifest {
        prepare_destination(manifest_path)?;
    }

    let image = pipeline.render(&request)?;
    write_output(&destination, &image.bytes)?;

    if let Some(manifest_path) = &args.manifest {
        let document = serde_json::json!({
            "manifest": image.manifest,
            "payload": BASE64.encode(&image.bytes),
        });
        write_output(manifest_path, serde_json::to_string_pretty(&document)?.as_bytes())?;
    }

    info!(path = %destination.display(), "wrote output");
    println!(
        "{} ({} segments, {} bytes, sha256 {})",
        destination.display(),
        image.manifest.segment_count,
        image.bytes.len(),
        image.manifest.output_hash
    );
    Ok(())
}
