//! sketchform CLI: detect a drawn shape on a canvas capture, or print a
//! canonical formation.

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut};
use log::{info, warn};
use nalgebra::Point2;
use serde::Serialize;

use sketchform::core::ShapeLabel;
use sketchform::detect::detect_formation;
use sketchform::formation::{
    generate_formation, observation_viewpoint, plan_dispatch, DispatchPlan, FormationShape,
    GreedyAssignment, Viewpoint, Waypoint,
};
use sketchform::vision::{
    BackgroundQuality, ChangeDetector, DetectionMode, DimensionMismatch, ShapeDetection, VertexVote,
};
use sketchform::PipelineConfig;

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "sketchform")]
#[command(about = "Detect a hand-drawn shape and turn it into an agent formation")]
#[command(version)]
struct Cli {
    /// Log debug messages.
    #[arg(long, global = true)]
    verbose: bool,

    /// Emit logs as JSON (requires the `tracing` feature).
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect the drawn shape on a canvas image.
    Analyze(AnalyzeArgs),

    /// Print the points of a canonical formation.
    Formation(FormationArgs),
}

#[derive(Debug, Clone, Args)]
struct AnalyzeArgs {
    /// Canvas capture with the drawing.
    #[arg(long)]
    canvas: PathBuf,

    /// Capture of the clean canvas; without it dark pixels are treated as ink.
    #[arg(long)]
    background: Option<PathBuf>,

    /// Pipeline configuration (JSON).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Larger side of the normalized formation (overrides the config).
    #[arg(long)]
    target_size: Option<f64>,

    /// Keep normalized points in the drawing's own offset instead of
    /// centering them at the origin.
    #[arg(long)]
    no_center: bool,

    /// Current agent positions as a JSON array of `[x, y]` pairs.
    #[arg(long)]
    agents: Option<PathBuf>,

    /// Write the report here instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Directory for mask.png and overlay.png.
    #[arg(long)]
    debug_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
struct FormationArgs {
    /// triangle, square, pentagon, hexagon, circle or line (others fall back
    /// to circle).
    #[arg(long)]
    shape: String,

    /// Number of points.
    #[arg(long)]
    count: usize,

    /// Formation size.
    #[arg(long, default_value_t = 20.0)]
    size: f64,
}

#[derive(Serialize)]
struct ShapeSummary {
    vertex_count: usize,
    candidates: usize,
    area: f64,
    perimeter: f64,
    aspect_ratio: f64,
    circularity: f64,
    epsilon_factor: f64,
    votes: Vec<VertexVote>,
}

impl From<&ShapeDetection> for ShapeSummary {
    fn from(d: &ShapeDetection) -> Self {
        Self {
            vertex_count: d.features.vertex_count,
            candidates: d.candidate_count,
            area: d.features.area,
            perimeter: d.features.perimeter,
            aspect_ratio: d.features.aspect_ratio,
            circularity: d.features.circularity(),
            epsilon_factor: d.polygon.epsilon_factor,
            votes: d.polygon.votes.clone(),
        }
    }
}

#[derive(Serialize)]
struct AnalyzeReport {
    canvas: String,
    mode: DetectionMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    background_quality: Option<BackgroundQuality>,
    #[serde(skip_serializing_if = "Option::is_none")]
    background_resized: Option<DimensionMismatch>,
    success: bool,
    /// Shape label, or a failure tag when `success` is false.
    label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    shape: Option<ShapeSummary>,
    vertices: Vec<Point2<i32>>,
    normalized: Vec<Point2<f64>>,
    waypoints: Vec<Waypoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dispatch: Option<DispatchPlan>,
    #[serde(skip_serializing_if = "Option::is_none")]
    viewpoint: Option<Viewpoint>,
}

#[derive(Serialize)]
struct FormationReport {
    shape: FormationShape,
    size: f64,
    points: Vec<Point2<f64>>,
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_json);

    match cli.command {
        Commands::Analyze(args) => run_analyze(&args),
        Commands::Formation(args) => run_formation(&args),
    }
}

#[cfg(feature = "tracing")]
fn init_logging(_verbose: bool, json: bool) {
    sketchform::core::init_tracing(json);
    let _ = tracing_log::LogTracer::init();
}

#[cfg(not(feature = "tracing"))]
fn init_logging(verbose: bool, json: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    let _ = sketchform::core::init_with_level(level);
    if json {
        warn!("--log-json needs the `tracing` feature; using plain logs");
    }
}

fn load_rgb(path: &Path) -> CliResult<RgbImage> {
    let img = image::open(path)
        .map_err(|e| format!("failed to load {}: {e}", path.display()))?
        .to_rgb8();
    Ok(img)
}

fn load_config(args: &AnalyzeArgs) -> CliResult<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(size) = args.target_size {
        config.normalize.target_size = size;
    }
    if args.no_center {
        config.normalize.center_at_origin = false;
    }
    Ok(config)
}

fn load_agents(path: &Path) -> CliResult<Vec<Point2<f64>>> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
    Ok(serde_json::from_str(&raw)?)
}

fn run_analyze(args: &AnalyzeArgs) -> CliResult<()> {
    let config = load_config(args)?;
    let canvas = load_rgb(&args.canvas)?;
    info!(
        "canvas {} ({}x{})",
        args.canvas.display(),
        canvas.width(),
        canvas.height()
    );

    let mut change = ChangeDetector::new(config.change.clone());
    let background_quality = match &args.background {
        Some(path) => Some(change.capture_background(load_rgb(path)?)),
        None => None,
    };
    let agents = args.agents.as_deref().map(load_agents).transpose()?;

    let (detection, result) = detect_formation(&change, &canvas, &config);

    let mut report = AnalyzeReport {
        canvas: args.canvas.display().to_string(),
        mode: detection.mode,
        background_quality,
        background_resized: detection.background_resized,
        success: false,
        label: ShapeLabel::Unknown.to_string(),
        error: None,
        shape: None,
        vertices: Vec::new(),
        normalized: Vec::new(),
        waypoints: Vec::new(),
        dispatch: None,
        viewpoint: None,
    };

    let mut found_shape = None;
    match result {
        Ok(found) => {
            let screen: Vec<Point2<f64>> =
                found.shape.vertices().iter().map(|p| p.cast::<f64>()).collect();
            report.success = true;
            report.label = found.formation.label.to_string();
            report.shape = Some(ShapeSummary::from(&found.shape));
            report.vertices = found.shape.vertices().to_vec();
            report.waypoints = config.flight_area.waypoints(&screen);
            report.viewpoint = observation_viewpoint(&found.formation.points, config.altitude);
            report.dispatch = agents.as_ref().map(|agents| {
                plan_dispatch(
                    agents,
                    &found.formation.points,
                    config.altitude,
                    &GreedyAssignment,
                )
            });
            report.normalized = found.formation.points;
            found_shape = Some(found.shape);
        }
        Err(e) => match e.failure_tag() {
            Some(tag) => {
                warn!("shape detection failed: {e}");
                report.label = tag;
                report.error = Some(e.to_string());
            }
            None => return Err(e.into()),
        },
    }

    if let Some(dir) = &args.debug_dir {
        std::fs::create_dir_all(dir)?;
        let mask_path = dir.join("mask.png");
        detection.mask.as_image().save(&mask_path)?;
        info!("mask written to {}", mask_path.display());
        if let Some(shape) = &found_shape {
            let overlay_path = dir.join("overlay.png");
            draw_overlay(&canvas, shape).save(&overlay_path)?;
            info!("overlay written to {}", overlay_path.display());
        }
    }

    write_json(&report, args.output.as_deref())
}

fn run_formation(args: &FormationArgs) -> CliResult<()> {
    let shape = FormationShape::from_name(&args.shape);
    let points = generate_formation(shape, args.count, args.size)?;
    write_json(
        &FormationReport {
            shape,
            size: args.size,
            points,
        },
        None,
    )
}

fn write_json<T: Serialize>(value: &T, path: Option<&Path>) -> CliResult<()> {
    let json = serde_json::to_string_pretty(value)?;
    match path {
        Some(path) => {
            std::fs::write(path, &json)?;
            info!("report written to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

/// Canvas with the contour (green), polygon (red) and vertices (blue).
fn draw_overlay(canvas: &RgbImage, shape: &ShapeDetection) -> RgbImage {
    let mut out = canvas.clone();
    draw_closed(&mut out, &shape.contour.points, Rgb([0, 200, 0]));
    draw_closed(&mut out, shape.vertices(), Rgb([220, 0, 0]));
    for v in shape.vertices() {
        draw_filled_circle_mut(&mut out, (v.x, v.y), 4, Rgb([0, 0, 255]));
    }
    out
}

fn draw_closed(img: &mut RgbImage, points: &[Point2<i32>], color: Rgb<u8>) {
    let n = points.len();
    if n < 2 {
        return;
    }
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        draw_line_segment_mut(
            img,
            (a.x as f32, a.y as f32),
            (b.x as f32, b.y as f32),
            color,
        );
    }
}
