use std::{
    fs::File,
    io::{BufReader, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "scrollyte", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluate a scene over a scroll range and print transforms as JSON lines.
    Sweep(SweepArgs),
    /// Preload the scene's frame sequence and blit one frame to a PNG.
    Frame(FrameArgs),
}

#[derive(Parser, Debug)]
struct SweepArgs {
    /// Input scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// First scroll offset of the sweep; defaults to the trigger start.
    #[arg(long)]
    from: Option<f64>,

    /// Last scroll offset of the sweep; defaults to the trigger end.
    #[arg(long)]
    to: Option<f64>,

    /// Scroll step between samples.
    #[arg(long, default_value_t = 16.0)]
    step: f64,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Scrubber progress in [0, 1] selecting the frame.
    #[arg(long, default_value_t = 0.0)]
    progress: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Surface CSS width in pixels.
    #[arg(long, default_value_t = 1280)]
    width: u32,

    /// Surface CSS height in pixels.
    #[arg(long, default_value_t = 720)]
    height: u32,

    /// Device scale factor.
    #[arg(long, default_value_t = 1.0)]
    scale: f64,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Sweep(args) => cmd_sweep(args),
        Command::Frame(args) => cmd_frame(args),
    }
}

fn read_scene_json(path: &Path) -> anyhow::Result<scrollyte::Scene> {
    let f = File::open(path).with_context(|| format!("open scene '{}'", path.display()))?;
    let r = BufReader::new(f);
    let scene: scrollyte::Scene = serde_json::from_reader(r).with_context(|| "parse scene JSON")?;
    Ok(scene)
}

fn cmd_sweep(args: SweepArgs) -> anyhow::Result<()> {
    let scene = read_scene_json(&args.in_path)?;
    scene.validate()?;

    if !(args.step > 0.0) {
        anyhow::bail!("--step must be > 0");
    }

    let mut pipeline = scrollyte::ScrollPipeline::new(scene.handoff.clone())?;
    let parked = scrollyte::ScrollSample::new(0.0, 0.0, scene.viewport_w, scene.viewport_h);
    pipeline.end_anchor_established(scene.end_anchor, parked)?;

    let range = pipeline
        .trigger()
        .context("trigger range was not derived")?;
    let from = args.from.unwrap_or(range.start);
    let to = args.to.unwrap_or(range.end);
    if from > to {
        anyhow::bail!("--from must be <= --to");
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    let mut scroll_y = from;
    while scroll_y <= to {
        let sample = scrollyte::ScrollSample::new(0.0, scroll_y, scene.viewport_w, scene.viewport_h);
        // Scene anchors are document-space; hand the pipeline what a host
        // would report for them at this scroll position.
        let anchors = scrollyte::AnchorPair {
            start: scene.start_anchor.to_viewport(sample),
            end: scene.end_anchor.to_viewport(sample),
        };
        let frame = pipeline.tick(sample, Some(&anchors));

        let mut line = serde_json::to_value(frame.transform)?;
        if let Some(obj) = line.as_object_mut() {
            obj.insert("scroll_y".to_string(), serde_json::json!(scroll_y));
        }
        serde_json::to_writer(&mut out, &line)?;
        writeln!(out)?;

        scroll_y += args.step;
    }

    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let scene = read_scene_json(&args.in_path)?;
    scene.validate()?;

    let assets_root = args.in_path.parent().unwrap_or_else(|| Path::new("."));
    let sequence = scrollyte::FrameSequence::load_from_dir(assets_root, &scene.sequence)?;
    let progress = sequence.progress();
    eprintln!(
        "loaded {}/{} frames ({} failed, {:.0}% settled)",
        progress.loaded,
        progress.total,
        progress.failed,
        progress.fraction() * 100.0
    );

    let mut scrubber = scrollyte::Scrubber::new(scene.sequence.background_rgba);
    scrubber.set_viewport(args.width, args.height, args.scale)?;
    let index = scrubber.draw(&sequence, args.progress.clamp(0.0, 1.0))?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    let surface = scrubber.surface();
    image::save_buffer_with_format(
        &args.out,
        surface.data(),
        surface.width(),
        surface.height(),
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote frame {} to {}", index, args.out.display());
    Ok(())
}
