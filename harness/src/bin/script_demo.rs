//! End-to-end pipeline demonstration over a synthetic clip.
//!
//! Runs ROI seeding, tracking, calibration and decimation against the
//! synthetic video source and prints the emitted script actions.

use clap::Parser;

use harness::{CentroidTracker, MotionProfile, PassthroughProjector, ScriptedUi, SyntheticVideo};
use pipeline::config::{Direction, GeneratorParams, Hyperparameters, Settings};
use pipeline::{MotionScript, ScriptGenerator};
use shared::KeyQueue;
use std::io::Write;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Motion-script generation demo on a synthetic clip",
    long_about = "Generates a synthetic video with a blob moving along the \
        selected motion profile, tracks it through the full pipeline and \
        prints the resulting script actions."
)]
struct Args {
    #[arg(
        short,
        long,
        default_value = "sine_y",
        help = "Motion pattern: stationary, sine_x, sine_y, circle"
    )]
    motion: String,

    #[arg(
        short,
        long,
        default_value_t = 40.0,
        help = "Motion amplitude in pixels"
    )]
    amplitude: f64,

    #[arg(
        short,
        long,
        default_value_t = 60.0,
        help = "Motion period in frames"
    )]
    period: f64,

    #[arg(short, long, default_value_t = 300, help = "Clip length in frames")]
    frames: u64,

    #[arg(long, default_value_t = 30.0, help = "Clip frame rate")]
    fps: f64,

    #[arg(
        long,
        default_value_t = 0,
        help = "Frames to skip between tracker updates"
    )]
    skip_frames: u32,

    #[arg(long, help = "Track only the primary feature")]
    primary_only: bool,

    #[arg(
        long,
        default_value_t = 10,
        help = "Calibrated script position of the lowest tracked point"
    )]
    calibrate_min: i64,

    #[arg(
        long,
        default_value_t = 90,
        help = "Calibrated script position of the highest tracked point"
    )]
    calibrate_max: i64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let motion = MotionProfile::by_name(&args.motion, args.amplitude, args.period)
        .ok_or_else(|| format!("Unknown motion type: {}", args.motion))?;

    let mut video = SyntheticVideo::new(args.frames, motion);
    video.fps = args.fps;
    if args.primary_only {
        video.secondary_center = None;
    }

    println!("Motion-script generation demo");
    println!("=============================");
    println!("Motion type: {}", args.motion);
    println!("Frames: {} at {} fps", args.frames, args.fps);

    let mut settings = Settings::default();
    settings.skip_frames = args.skip_frames;
    settings.tracking_direction = match args.motion.as_str() {
        "sine_x" => Direction::X,
        _ => Direction::Y,
    };
    let params = GeneratorParams::new(
        "synthetic",
        &settings,
        &Hyperparameters::default(),
        pipeline::config::ProjectionConfig::default(),
    )
    .with_secondary(!args.primary_only);

    let keys = Arc::new(KeyQueue::new());
    let mut ui = ScriptedUi::new(keys.clone());
    ui.set_min_max(args.calibrate_min, args.calibrate_max);
    ui.push_roi(video.primary_bbox_at(0));
    if let Some(secondary) = video.secondary_bbox() {
        ui.push_roi(secondary);
    }

    let projector = PassthroughProjector;
    let generator = ScriptGenerator::new(params, &video, &projector, keys);
    let mut script = MotionScript::new();
    let mut progress = |frame_num: u64| {
        if frame_num % 30 == 0 {
            print!(".");
            let _ = std::io::stdout().flush();
        }
    };

    let report = generator.run_with_progress(
        &mut ui,
        &CentroidTracker::factory(None),
        &mut script,
        Some(&mut progress),
    )?;
    println!();

    println!("Status: {}", report.status);
    println!("Success: {}", report.success);
    println!("Actions: {}", report.actions_emitted);
    for action in script.actions() {
        println!("  {:>8} ms -> {:>3}", action.timestamp_ms, action.position);
    }

    Ok(())
}
