//! Per-call-site conversion options.
//!
//! Each entry point has its own defaults, and they differ (an image is
//! drawn with 12px glyphs, a video frame with 8px glyphs, text is sampled every
//! 8 pixels).
use crate::{error::Error, pipeline::ResizeFilter, ramp::BrightnessRamp};
use image::Rgba;

/// Default foreground colour of drawn glyphs.
pub const DEFAULT_COLOR: Rgba<u8> = Rgba([0x00, 0xff, 0x22, 0xff]);
/// Solid background behind single-image renderings.
pub const ASCII_BLACK: Rgba<u8> = Rgba([0x00, 0x00, 0x00, 0xff]);

pub const IMAGE_FONT_SIZE: u32 = 12;
pub const IMAGE_SPACING: i32 = -3;
pub const IMAGE_OUTPUT_HEIGHT: u32 = 700;

pub const FRAME_FONT_SIZE: u32 = 8;
pub const FRAME_SPACING: i32 = -3;
pub const FRAME_OUTPUT_HEIGHT: u32 = 700;

pub const TEXT_FONT_SIZE: u32 = 7;
pub const TEXT_SPACING: i32 = 1;
pub const TEXT_OUTPUT_HEIGHT: u32 = 100;
pub const TEXT_FRAMES_PER_FILE: usize = 100;

/// Canvas fill behind the glyphs in visual mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Background {
    Solid(Rgba<u8>),
    Transparent,
}

impl Background {
    pub fn fill(&self) -> Rgba<u8> {
        match self {
            Background::Solid(color) => *color,
            Background::Transparent => Rgba([0, 0, 0, 0]),
        }
    }
}

/// Glyph geometry and colours for visual mode.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualStyle {
    /// Glyph size in pixels.
    pub font_size: u32,
    /// Added to `font_size` to get the sampling stride. May be negative.
    pub spacing: i32,
    pub output_height: u32,
    pub color: Rgba<u8>,
    pub background: Background,
    pub ramp: BrightnessRamp,
    pub filter: ResizeFilter,
}

/// Options for converting a single image (or a GIF's first frame) to a PNG.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageOptions {
    pub style: VisualStyle,
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            style: VisualStyle {
                font_size: IMAGE_FONT_SIZE,
                spacing: IMAGE_SPACING,
                output_height: IMAGE_OUTPUT_HEIGHT,
                color: DEFAULT_COLOR,
                background: Background::Solid(ASCII_BLACK),
                ramp: BrightnessRamp::default(),
                filter: ResizeFilter::default(),
            },
        }
    }
}

/// Options for converting extracted video frames to PNGs.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameOptions {
    pub style: VisualStyle,
    /// Frames rendered concurrently. `1` renders strictly one frame at a time.
    pub jobs: usize,
}

impl Default for FrameOptions {
    fn default() -> Self {
        Self {
            style: VisualStyle {
                font_size: FRAME_FONT_SIZE,
                spacing: FRAME_SPACING,
                output_height: FRAME_OUTPUT_HEIGHT,
                color: DEFAULT_COLOR,
                background: Background::Transparent,
                ramp: BrightnessRamp::default(),
                filter: ResizeFilter::default(),
            },
            jobs: 1,
        }
    }
}

/// Options for text output, both single images and video frame batches.
#[derive(Debug, Clone, PartialEq)]
pub struct TextOptions {
    pub font_size: u32,
    pub spacing: i32,
    pub output_height: u32,
    /// Frames per `ascii_frames_K.txt` window.
    pub frames_per_file: usize,
    pub jobs: usize,
    pub ramp: BrightnessRamp,
    pub filter: ResizeFilter,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            font_size: TEXT_FONT_SIZE,
            spacing: TEXT_SPACING,
            output_height: TEXT_OUTPUT_HEIGHT,
            frames_per_file: TEXT_FRAMES_PER_FILE,
            jobs: 1,
            ramp: BrightnessRamp::default(),
            filter: ResizeFilter::default(),
        }
    }
}

/// Parses `#rrggbb` or `#rrggbbaa` (the leading `#` is optional).
pub fn parse_hex_color(input: &str) -> Result<Rgba<u8>, Error> {
    let hex = input.trim().trim_start_matches('#');
    let invalid = || Error::Config(format!("invalid colour '{input}', expected #rrggbb"));
    if !matches!(hex.len(), 6 | 8) || !hex.is_ascii() {
        return Err(invalid());
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
    let alpha = if hex.len() == 8 { channel(6)? } else { 0xff };
    Ok(Rgba([channel(0)?, channel(2)?, channel(4)?, alpha]))
}
