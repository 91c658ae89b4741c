use clap::{Parser, ValueEnum};
use glyphcast::batch::{ASCII_VIDEO_MP4, BatchOrchestrator, FrameCoverage};
use glyphcast::config::VisualStyle;
use glyphcast::error::Error;
use glyphcast::frames::MediaKind;
use glyphcast::render::FontPainter;
use std::fs;
use std::path::PathBuf;

mod settings;

/// Command line arguments structure.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// What to convert
    #[arg(value_enum, required = true)]
    action: Action,
    /// Image, GIF or video to process
    #[arg(required = true)]
    input: PathBuf,
    /// Output folder
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Output height in pixels, width follows the source aspect ratio
    #[arg(long)]
    height: Option<u32>,
    /// Glyph size in pixels
    #[arg(short, long)]
    font_size: Option<u32>,
    /// Spacing added to the glyph size between samples, may be negative
    #[arg(short, long, allow_hyphen_values = true)]
    distance: Option<i32>,
    /// Glyph colour as #rrggbb
    #[arg(short, long)]
    color: Option<String>,
    /// Draw on a transparent background instead of black
    #[arg(long, default_value_t = false)]
    transparent: bool,
    /// Glyph ramp: default, compact, blocks, or literal glyphs darkest first
    #[arg(short, long)]
    ramp: Option<String>,
    /// Resampling filter used when scaling the source
    #[arg(long, value_enum)]
    filter: Option<Filter>,
    /// TrueType font used to draw glyphs
    #[arg(long)]
    font: Option<PathBuf>,
    /// Frames rendered concurrently
    #[arg(short, long)]
    jobs: Option<usize>,
    /// Frames per text file
    #[arg(long)]
    frames_per_file: Option<usize>,
    /// Keep the rendered frames but skip assembling the video
    #[arg(long, default_value_t = false)]
    no_encode: bool,
    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
#[clap(rename_all = "kebab-case")]
enum Action {
    /// Image or GIF to a PNG
    Image,
    /// Image or GIF to a text file
    ImageText,
    /// Video to rendered frames and an MP4
    Video,
    /// Video to windowed text files
    VideoText,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
enum Filter {
    Nearest,
    Bilinear,
}

const DEFAULT_IMAGE_OUTPUT: &str = "output";
const DEFAULT_VIDEO_OUTPUT: &str = "output_video";
const DEFAULT_TEXT_OUTPUT: &str = "output_txt";
const IMAGE_TEXT_FILE: &str = "ascii_art.txt";

fn main() -> Result<(), Error> {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(args.log_level.parse().unwrap_or(log::LevelFilter::Info))
        .init();

    match args.action {
        Action::Image => image(&args),
        Action::ImageText => image_text(&args),
        Action::Video => video(&args),
        Action::VideoText => video_text(&args),
    }
}

fn output_folder(args: &Args, default: &str) -> Result<PathBuf, Error> {
    let folder = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(default));
    fs::create_dir_all(&folder).map_err(|e| Error::Write {
        path: folder.clone(),
        source: e,
    })?;
    Ok(folder)
}

fn load_painter(args: &Args, style: &VisualStyle) -> Result<FontPainter, Error> {
    FontPainter::load(args.font.as_deref(), style.font_size, style.color)
}

fn report_coverage(coverage: FrameCoverage) {
    if let FrameCoverage::FirstFrameOnly { total_frames } = coverage {
        log::info!("GIF frame processed successfully (1 of {total_frames})");
    }
}

fn image(args: &Args) -> Result<(), Error> {
    let options = settings::image_options(args)?;
    let folder = output_folder(args, DEFAULT_IMAGE_OUTPUT)?;
    let painter = load_painter(args, &options.style)?;
    let mut orchestrator = BatchOrchestrator::new();

    log::info!("Converting {} to ASCII art...", args.input.display());
    if MediaKind::from_path(&args.input) == MediaKind::Gif {
        let outcome = orchestrator.gif_to_ascii(&args.input, &folder, &options, &painter)?;
        report_coverage(outcome.coverage);
    } else {
        orchestrator.image_to_ascii(&args.input, &folder, &options, &painter)?;
    }
    log::info!("Conversion completed!");
    Ok(())
}

fn image_text(args: &Args) -> Result<(), Error> {
    let options = settings::text_options(args)?;
    let folder = output_folder(args, DEFAULT_TEXT_OUTPUT)?;
    let output = folder.join(IMAGE_TEXT_FILE);
    let mut orchestrator = BatchOrchestrator::new();
    if MediaKind::from_path(&args.input) == MediaKind::Gif {
        let outcome = orchestrator.gif_to_text(&args.input, &output, &options)?;
        report_coverage(outcome.coverage);
    } else {
        orchestrator.image_to_text(&args.input, &output, &options)?;
    }
    log::info!("Text conversion completed!");
    Ok(())
}

fn video(args: &Args) -> Result<(), Error> {
    let options = settings::frame_options(args)?;
    let folder = output_folder(args, DEFAULT_VIDEO_OUTPUT)?;
    let painter = load_painter(args, &options.style)?;
    let mut orchestrator = BatchOrchestrator::new();

    log::info!("Converting {} to ASCII art video...", args.input.display());
    let report = orchestrator.video_to_ascii(&args.input, &folder, &options, &painter)?;
    log::info!("Processed {} frames", report.frames_rendered);

    if args.no_encode {
        return Ok(());
    }
    orchestrator.create_mp4(&args.input, &folder, &folder.join(ASCII_VIDEO_MP4))?;
    log::info!("Video conversion completed!");
    Ok(())
}

fn video_text(args: &Args) -> Result<(), Error> {
    let options = settings::text_options(args)?;
    let folder = output_folder(args, DEFAULT_TEXT_OUTPUT)?;
    log::info!("Converting {} to ASCII text...", args.input.display());
    let report = BatchOrchestrator::new().video_to_text(&args.input, &folder, &options)?;
    log::info!(
        "Text conversion completed! {} frames in {} files",
        report.frames_rendered,
        report.outputs.len()
    );
    Ok(())
}
