use std::{fs::File, io::BufWriter, path::PathBuf};

use anyhow::Context;
use clap::Parser;
use log::{error, info};
use regionwalk::{
    render::render_path,
    util::{load_image, save_jpeg, DEFAULT_QUALITY},
    OutOfBounds, Region, Walker,
};

/// Walk across an image from a seed region, always stepping to the neighboring region with the
/// closest mean color, and keep only the pixels that were walked over.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Source image (png/jpg/etc)
    image: PathBuf,

    /// Left edge of the seed region
    #[arg(allow_negative_numbers = true)]
    x1: i64,

    /// Right edge of the seed region (exclusive)
    #[arg(allow_negative_numbers = true)]
    x2: i64,

    /// Top edge of the seed region
    #[arg(allow_negative_numbers = true)]
    y1: i64,

    /// Bottom edge of the seed region (exclusive)
    #[arg(allow_negative_numbers = true)]
    y2: i64,

    /// Number of steps to walk
    steps: usize,

    /// Where to write the rendered JPEG
    #[arg(long, default_value = "out.jpeg")]
    output: PathBuf,

    /// JPEG quality
    #[arg(long, default_value_t = DEFAULT_QUALITY, value_parser = clap::value_parser!(u8).range(1..=100))]
    quality: u8,

    /// What to do with a neighbor that sticks out of the image: "stop" looking at the remaining
    /// neighbors or "skip" just that one
    #[arg(long, default_value_t = OutOfBounds::Stop)]
    bounds: OutOfBounds,

    /// Also write the walked regions as JSON to this file
    #[arg(long)]
    report: Option<PathBuf>,
}

fn run(args: Args) -> Result<(), anyhow::Error> {
    let img = load_image(&args.image)?;
    info!(
        "loaded {} ({}x{})",
        args.image.display(),
        img.width(),
        img.height()
    );

    let seed = Region::new(args.x1, args.x2, args.y1, args.y2);
    let walk = Walker::new(seed, args.steps)
        .with_bounds(args.bounds)
        .finish(&img);
    info!(
        "walked {} regions from {} ({}, {} shrink(s))",
        walk.regions.len(),
        seed,
        walk.state,
        walk.shrinks
    );

    if let Some(report) = &args.report {
        let file = File::create(report)
            .with_context(|| format!("Failed to create report: {}", report.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &walk)
            .with_context(|| format!("Failed to write report: {}", report.display()))?;
        info!("wrote report to {}", report.display());
    }

    let canvas = render_path(&img, &walk.regions);
    save_jpeg(&canvas, &args.output, args.quality)?;
    info!("wrote {}", args.output.display());

    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}
