use crate::{Args, Filter};
use glyphcast::config::{
    Background, FrameOptions, ImageOptions, TextOptions, VisualStyle, parse_hex_color,
};
use glyphcast::error::Error;
use glyphcast::pipeline::ResizeFilter;
use glyphcast::ramp::RampPreset;

impl From<Filter> for ResizeFilter {
    fn from(filter: Filter) -> Self {
        match filter {
            Filter::Nearest => ResizeFilter::Nearest,
            Filter::Bilinear => ResizeFilter::Bilinear,
        }
    }
}

/// Overrides only what was passed on the command line.
fn apply_style(args: &Args, style: &mut VisualStyle) -> Result<(), Error> {
    if let Some(height) = args.height {
        style.output_height = height;
    }
    if let Some(size) = args.font_size {
        style.font_size = size;
    }
    if let Some(distance) = args.distance {
        style.spacing = distance;
    }
    if let Some(color) = &args.color {
        style.color = parse_hex_color(color)?;
    }
    if args.transparent {
        style.background = Background::Transparent;
    }
    if let Some(ramp) = &args.ramp {
        style.ramp = RampPreset::parse(ramp).ramp()?;
    }
    if let Some(filter) = args.filter {
        style.filter = filter.into();
    }
    Ok(())
}

pub fn image_options(args: &Args) -> Result<ImageOptions, Error> {
    let mut options = ImageOptions::default();
    apply_style(args, &mut options.style)?;
    Ok(options)
}

pub fn frame_options(args: &Args) -> Result<FrameOptions, Error> {
    let mut options = FrameOptions::default();
    apply_style(args, &mut options.style)?;
    if let Some(jobs) = args.jobs {
        options.jobs = jobs;
    }
    Ok(options)
}

pub fn text_options(args: &Args) -> Result<TextOptions, Error> {
    let mut options = TextOptions::default();
    if let Some(height) = args.height {
        options.output_height = height;
    }
    if let Some(size) = args.font_size {
        options.font_size = size;
    }
    if let Some(distance) = args.distance {
        options.spacing = distance;
    }
    if let Some(ramp) = &args.ramp {
        options.ramp = RampPreset::parse(ramp).ramp()?;
    }
    if let Some(filter) = args.filter {
        options.filter = filter.into();
    }
    if let Some(jobs) = args.jobs {
        options.jobs = jobs;
    }
    if let Some(frames_per_file) = args.frames_per_file {
        options.frames_per_file = frames_per_file;
    }
    Ok(options)
}
