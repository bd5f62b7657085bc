use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use knitline::{
    AlignMode, NeedleRange, PluginManifest, PluginRegistry, SIMULATOR_PLUGIN_NAME, Session,
    SimulatorPlugin, TransformOp,
};

#[derive(Parser, Debug)]
#[command(name = "knitline", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the needle-bed preview as a PNG.
    Preview(PreviewArgs),
    /// Run a knitting job headless using the selected plugin.
    Knit(KnitArgs),
}

#[derive(Parser, Debug)]
struct PreviewArgs {
    /// Input pattern image (PNG, JPEG, BMP, GIF, TIFF, ...).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// First needle of the active span.
    #[arg(long, default_value_t = 80)]
    start: u16,

    /// Last needle of the active span.
    #[arg(long, default_value_t = 119)]
    stop: u16,

    /// Pattern alignment over the span.
    #[arg(long, value_enum, default_value_t = AlignChoice::Center)]
    align: AlignChoice,

    /// Zoom level (clamped to 1..=5).
    #[arg(long, default_value_t = 3)]
    zoom: i32,

    /// Rotate a quarter turn counter-clockwise before rendering.
    #[arg(long)]
    rotate_left: bool,

    /// Rotate a quarter turn clockwise before rendering.
    #[arg(long)]
    rotate_right: bool,

    /// Mirror horizontally before rendering.
    #[arg(long)]
    mirror: bool,

    /// Flip vertically before rendering.
    #[arg(long)]
    flip: bool,

    /// Invert colors (alpha preserved) before rendering.
    #[arg(long)]
    invert: bool,

    /// Tile the pattern VxH times before rendering, e.g. `2x3`.
    #[arg(long, value_name = "VxH")]
    repeat: Option<String>,
}

#[derive(Parser, Debug)]
struct KnitArgs {
    /// Input pattern image.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Plugin directory to discover (optional; the simulator is always
    /// available).
    #[arg(long)]
    plugins: Option<PathBuf>,

    /// Plugin to knit with.
    #[arg(long, default_value = SIMULATOR_PLUGIN_NAME)]
    plugin: String,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum AlignChoice {
    Left,
    Center,
    Right,
}

impl From<AlignChoice> for AlignMode {
    fn from(value: AlignChoice) -> Self {
        match value {
            AlignChoice::Left => AlignMode::Left,
            AlignChoice::Center => AlignMode::Center,
            AlignChoice::Right => AlignMode::Right,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Preview(args) => cmd_preview(args),
        Command::Knit(args) => cmd_knit(args),
    }
}

fn base_registry() -> PluginRegistry {
    let mut registry = PluginRegistry::new();
    registry.register(
        SIMULATOR_PLUGIN_NAME,
        Box::new(|| Arc::new(SimulatorPlugin::new())),
    );
    registry
}

fn cmd_preview(args: PreviewArgs) -> anyhow::Result<()> {
    let mut session = Session::new(base_registry());
    session.set_needle_range(NeedleRange::new(args.start, args.stop)?);
    session.set_alignment(args.align.into());
    session.set_zoom(args.zoom);
    session.load_pattern(&args.in_path)?;

    for op in requested_transforms(&args)? {
        session.apply_transform(op)?;
    }

    let frame = session.render_preview()?;
    let img = image::RgbaImage::from_raw(frame.width, frame.height, frame.data)
        .context("preview frame buffer mismatch")?;
    img.save(&args.out)
        .with_context(|| format!("write preview '{}'", args.out.display()))?;

    let dims = session
        .pattern()
        .map(|p| p.dimensions())
        .context("no pattern after load")?;
    println!(
        "preview {}x{} (pattern {}x{}) -> {}",
        frame.width,
        frame.height,
        dims.width,
        dims.height,
        args.out.display()
    );
    Ok(())
}

fn requested_transforms(args: &PreviewArgs) -> anyhow::Result<Vec<TransformOp>> {
    let mut ops = Vec::new();
    if args.rotate_left {
        ops.push(TransformOp::RotateLeft);
    }
    if args.rotate_right {
        ops.push(TransformOp::RotateRight);
    }
    if args.mirror {
        ops.push(TransformOp::Mirror);
    }
    if args.flip {
        ops.push(TransformOp::Flip);
    }
    if args.invert {
        ops.push(TransformOp::Invert);
    }
    if let Some(spec) = &args.repeat {
        let (v, h) = spec
            .split_once('x')
            .with_context(|| format!("repeat spec '{spec}' must look like 2x3"))?;
        ops.push(TransformOp::Repeat {
            vertical: v.parse().with_context(|| format!("bad vertical count '{v}'"))?,
            horizontal: h
                .parse()
                .with_context(|| format!("bad horizontal count '{h}'"))?,
        });
    }
    Ok(ops)
}

fn cmd_knit(args: KnitArgs) -> anyhow::Result<()> {
    let mut registry = base_registry();
    registry.admit(&PluginManifest {
        name: SIMULATOR_PLUGIN_NAME.to_string(),
        disabled: false,
    })?;
    if let Some(dir) = &args.plugins {
        registry.discover(&[dir.clone()])?;
    }

    let mut session = Session::new(registry);
    session.load_pattern(&args.in_path)?;
    session.enable_plugin(&args.plugin)?;
    session.start_knitting()?;

    let outcome = loop {
        session.pump_events(|prompt| {
            println!("[{:?}] {} -> yes", prompt.kind, prompt.message);
            true
        })?;
        report(&session);
        if let Some(outcome) = session.finish_knitting()? {
            session.pump_events(|_| true)?;
            report(&session);
            break outcome;
        }
        std::thread::sleep(Duration::from_millis(20));
    };

    println!("job finished: {outcome:?}");
    Ok(())
}

fn report(session: &Session) {
    let progress = session.progress();
    if progress.total_rows() > 0 {
        println!(
            "row {}/{} {}",
            progress.current_row(),
            progress.total_rows(),
            session.status().unwrap_or_default()
        );
    } else if let Some(status) = session.status() {
        println!("{status}");
    }
}
