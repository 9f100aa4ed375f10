use std::io::BufReader;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info};

use traffic_counter::{frame, Config, Counting, Mode, TrafficCounter};

/// Counts objects crossing a reference line in a replayed detections dump
#[derive(Parser, Debug)]
#[command(name = "traffic-counter")]
struct Args {
    /// Path to the JSON configuration file
    #[arg(short, long, value_name = "PATH")]
    conf: PathBuf,

    /// Detections dump, one `<timestamp>:<json rects>` line per frame
    #[arg(short, long, value_name = "PATH")]
    input: PathBuf,

    /// Direction in which vehicles are moving (`vertical` or `horizontal`), overrides the config
    #[arg(short, long)]
    mode: Option<Mode>,

    /// Cross-axis coordinate dividing the two lanes, overrides the config
    #[arg(long)]
    lane_point: Option<i32>,

    #[arg(long, default_value_t = 1280)]
    width: u32,

    #[arg(long, default_value_t = 720)]
    height: u32,

    /// Source name used in the log output
    #[arg(long, default_value = "default")]
    source: String,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut config = Config::from_file(&args.conf)
        .with_context(|| format!("loading config {}", args.conf.display()))?;

    if let Some(mode) = args.mode {
        config.mode = mode;
    }

    if args.lane_point.is_some() {
        config.lane_point = args.lane_point;
    }

    let file = std::fs::File::open(&args.input)
        .with_context(|| format!("opening detections {}", args.input.display()))?;
    let frames = frame::read_frames(BufReader::new(file), (args.width, args.height))
        .with_context(|| format!("reading detections {}", args.input.display()))?;

    info!(
        "[{}] replaying {} frames, mode {:?}",
        args.source,
        frames.len(),
        config.mode
    );

    let mut counter = TrafficCounter::new(config);

    for frame in &frames {
        let update = counter.update(frame, &args.source);

        for obj in &update.objects {
            debug!(
                "[{}] {:.3} vehicle-{} ({}, {}){}",
                args.source,
                frame.timestamp,
                obj.id,
                obj.centroid.x,
                obj.centroid.y,
                if obj.counted { " counted" } else { "" }
            );
        }
    }

    if let Some(scene) = counter.scene(&args.source) {
        info!(
            "[{}] reference line at {}, {} objects live",
            args.source,
            scene.counter().line(),
            scene.tracker().len()
        );
    }

    for (label, count) in counter.counts(&args.source) {
        println!("{}: {}", label, count);
    }

    Ok(())
}
