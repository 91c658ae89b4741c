use std::path::Path;

use image::{DynamicImage, RgbaImage};

use crate::{
    config::{Background, TextOptions, VisualStyle},
    error::Error,
    pipeline::ImagePipeline,
    ramp::BrightnessRamp,
    sampler::{PixelSample, SampleGrid, samples},
};

/// Output of one [`FrameRenderer::render`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderedFrame {
    /// Output-sized canvas with glyphs drawn at their sample coordinates.
    Canvas(RgbaImage),
    /// Rows of glyphs, each row terminated by `\n`.
    Text(String),
}

impl RenderedFrame {
    pub fn into_canvas(self) -> Option<RgbaImage> {
        match self {
            RenderedFrame::Canvas(canvas) => Some(canvas),
            RenderedFrame::Text(_) => None,
        }
    }

    pub fn into_text(self) -> Option<String> {
        match self {
            RenderedFrame::Text(text) => Some(text),
            RenderedFrame::Canvas(_) => None,
        }
    }
}

/// Draws a single glyph onto a canvas.
///
/// `(x, y)` is the sample coordinate; the glyph's baseline sits on row `y`.
pub trait GlyphPainter: Sync {
    fn paint(&self, canvas: &mut RgbaImage, x: u32, y: u32, glyph: char);
}

pub enum RenderMode<'p> {
    Visual {
        background: Background,
        painter: &'p dyn GlyphPainter,
    },
    Text,
}

/// Samples a decoded image on a regular grid and maps each sample to a glyph.
pub struct FrameRenderer<'p> {
    /// Scales the source to the output size before sampling.
    pub pipeline: ImagePipeline,
    /// Brightness quantization used for every sample.
    pub ramp: BrightnessRamp,
    glyph_size: u32,
    spacing: i32,
    mode: RenderMode<'p>,
}

impl<'p> FrameRenderer<'p> {
    pub fn visual(style: &VisualStyle, painter: &'p dyn GlyphPainter) -> Self {
        Self {
            pipeline: ImagePipeline::new(style.output_height, style.filter),
            ramp: style.ramp.clone(),
            glyph_size: style.font_size,
            spacing: style.spacing,
            mode: RenderMode::Visual {
                background: style.background,
                painter,
            },
        }
    }

    pub fn text(options: &TextOptions) -> Self {
        Self {
            pipeline: ImagePipeline::new(options.output_height, options.filter),
            ramp: options.ramp.clone(),
            glyph_size: options.font_size,
            spacing: options.spacing,
            mode: RenderMode::Text,
        }
    }

    pub fn grid(&self, width: u32, height: u32) -> SampleGrid {
        SampleGrid::for_glyphs(width, height, self.glyph_size, self.spacing)
    }

    pub fn render(&self, img: &DynamicImage, source: &Path) -> Result<RenderedFrame, Error> {
        let buffer = self.pipeline.resize(img, source)?;
        Ok(match &self.mode {
            RenderMode::Visual {
                background,
                painter,
            } => RenderedFrame::Canvas(self.draw_canvas(&buffer, *background, *painter)),
            RenderMode::Text => RenderedFrame::Text(self.to_ascii(&buffer)),
        })
    }

    /// Renders `img` and returns the canvas; fails for a text renderer.
    pub fn render_canvas(&self, img: &DynamicImage, source: &Path) -> Result<RgbaImage, Error> {
        self.render(img, source)?
            .into_canvas()
            .ok_or_else(|| Error::Config("text renderer cannot produce a canvas".into()))
    }

    /// Renders `img` and returns the glyph rows; fails for a visual renderer.
    pub fn render_text(&self, img: &DynamicImage, source: &Path) -> Result<String, Error> {
        self.render(img, source)?
            .into_text()
            .ok_or_else(|| Error::Config("visual renderer cannot produce text".into()))
    }

    /// Draws the glyph of every opaque sample onto a fresh canvas the size of `buffer`.
    ///
    /// Transparent samples and samples mapping to a space are not drawn.
    pub fn draw_canvas(
        &self,
        buffer: &RgbaImage,
        background: Background,
        painter: &dyn GlyphPainter,
    ) -> RgbaImage {
        let (width, height) = buffer.dimensions();
        let mut canvas = RgbaImage::from_pixel(width, height, background.fill());
        let grid = self.grid(width, height);

        for sample in samples(buffer, &grid).filter(|s| !s.is_transparent()) {
            let glyph = self.ramp.glyph_for(sample.brightness());
            if glyph != ' ' {
                painter.paint(&mut canvas, sample.x, sample.y, glyph);
            }
        }

        canvas
    }

    /// Row-major glyph grid of `buffer`; transparent samples become spaces.
    pub fn to_ascii(&self, buffer: &RgbaImage) -> String {
        let grid = self.grid(buffer.width(), buffer.height());
        let capacity = (grid.columns() as usize + 1) * grid.rows() as usize;
        let mut output = String::with_capacity(capacity);

        for y in grid.row_starts() {
            output.extend(grid.columns_at(y).map(|(x, y)| {
                let sample = PixelSample::read(buffer, x, y);
                if sample.is_transparent() {
                    ' '
                } else {
                    self.ramp.glyph_for(sample.brightness())
                }
            }));
            output.push('\n');
        }

        output
    }
}

#[cfg(feature = "render")]
pub use font::FontPainter;

#[cfg(feature = "render")]
mod font {
    use std::path::{Path, PathBuf};

    use ab_glyph::{Font, FontVec, PxScale, ScaleFont};
    use image::{Rgba, RgbaImage};

    use super::GlyphPainter;
    use crate::error::Error;

    /// Monospace fonts tried, in order, when no font path is given.
    pub const SYSTEM_MONOSPACE_FONTS: &[&str] = &[
        "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
        "/usr/share/fonts/TTF/DejaVuSansMono.ttf",
        "/usr/share/fonts/dejavu/DejaVuSansMono.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationMono-Regular.ttf",
        "/Library/Fonts/Courier New.ttf",
        "/System/Library/Fonts/Supplemental/Courier New.ttf",
        "C:\\Windows\\Fonts\\consola.ttf",
    ];

    /// Draws glyphs with an `ab_glyph` font in a fixed colour and pixel size.
    pub struct FontPainter {
        font: FontVec,
        scale: PxScale,
        color: Rgba<u8>,
        ascent: f32,
    }

    impl FontPainter {
        /// Loads `path`, or the first installed font of [`SYSTEM_MONOSPACE_FONTS`].
        pub fn load(path: Option<&Path>, font_size: u32, color: Rgba<u8>) -> Result<Self, Error> {
            let path = match path {
                Some(path) => path.to_path_buf(),
                None => SYSTEM_MONOSPACE_FONTS
                    .iter()
                    .map(PathBuf::from)
                    .find(|candidate| candidate.is_file())
                    .ok_or_else(|| {
                        Error::Font("no monospace font found, pass one explicitly".into())
                    })?,
            };
            let data = std::fs::read(&path)
                .map_err(|e| Error::Font(format!("{}: {e}", path.display())))?;
            log::debug!("Loaded font {}", path.display());
            Self::from_bytes(data, font_size, color)
        }

        pub fn from_bytes(data: Vec<u8>, font_size: u32, color: Rgba<u8>) -> Result<Self, Error> {
            let font = FontVec::try_from_vec(data).map_err(|e| Error::Font(format!("{e}")))?;
            let scale = PxScale::from(font_size as f32);
            let ascent = font.as_scaled(scale).ascent();
            Ok(Self {
                font,
                scale,
                color,
                ascent,
            })
        }
    }

    impl GlyphPainter for FontPainter {
        fn paint(&self, canvas: &mut RgbaImage, x: u32, y: u32, glyph: char) {
            let mut buf = [0u8; 4];
            // draw_text_mut places the top of the line at y; shift up so the baseline lands on y
            imageproc::drawing::draw_text_mut(
                canvas,
                self.color,
                x as i32,
                y as i32 - self.ascent.round() as i32,
                self.scale,
                &self.font,
                glyph.encode_utf8(&mut buf),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ImageOptions, TextOptions};
    use image::Rgba;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingPainter {
        calls: Mutex<Vec<(u32, u32, char)>>,
    }

    impl GlyphPainter for RecordingPainter {
        fn paint(&self, canvas: &mut RgbaImage, x: u32, y: u32, glyph: char) {
            canvas.put_pixel(x, y, Rgba([1, 2, 3, 255]));
            self.calls.lock().unwrap().push((x, y, glyph));
        }
    }

    fn unit_text_options(height: u32) -> TextOptions {
        TextOptions {
            font_size: 1,
            spacing: 0,
            output_height: height,
            ..TextOptions::default()
        }
    }

    #[test]
    fn white_square_renders_brightest_glyph_everywhere() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(2, 2, Rgba([255; 4])));
        let renderer = FrameRenderer::text(&unit_text_options(2));
        let frame = renderer.render(&img, Path::new("white.png")).unwrap();
        assert_eq!(frame, RenderedFrame::Text("$$\n$$\n".to_string()));
    }

    #[test]
    fn text_rows_follow_the_sampling_stride() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(20, 10, Rgba([0, 0, 0, 255])));
        let options = TextOptions {
            output_height: 10,
            ..TextOptions::default()
        };
        let text = FrameRenderer::text(&options)
            .render(&img, Path::new("black.png"))
            .unwrap()
            .into_text()
            .unwrap();
        // stride 8 over 20x10 -> 3 columns, 2 rows
        assert_eq!(text, "   \n   \n");
    }

    #[test]
    fn transparent_samples_are_spaces_in_text() {
        let mut buffer = RgbaImage::from_pixel(2, 1, Rgba([255, 255, 255, 255]));
        buffer.put_pixel(1, 0, Rgba([255, 255, 255, 0]));
        let renderer = FrameRenderer::text(&unit_text_options(1));
        assert_eq!(renderer.to_ascii(&buffer), "$ \n");
    }

    #[test]
    fn text_rendering_is_idempotent() {
        let buffer =
            RgbaImage::from_fn(16, 16, |x, y| Rgba([(x * 16) as u8, (y * 16) as u8, 90, 255]));
        let renderer = FrameRenderer::text(&unit_text_options(16));
        assert_eq!(renderer.to_ascii(&buffer), renderer.to_ascii(&buffer));
    }

    #[test]
    fn visual_mode_skips_transparent_and_blank_glyphs() {
        let mut buffer = RgbaImage::from_pixel(3, 1, Rgba([255, 255, 255, 255]));
        buffer.put_pixel(1, 0, Rgba([255, 255, 255, 0]));
        buffer.put_pixel(2, 0, Rgba([0, 0, 0, 255]));

        let painter = RecordingPainter::default();
        let mut style = ImageOptions::default().style;
        style.font_size = 1;
        style.spacing = 0;
        let renderer = FrameRenderer::visual(&style, &painter);
        let canvas = renderer.draw_canvas(&buffer, style.background, &painter);

        assert_eq!(*painter.calls.lock().unwrap(), vec![(0, 0, '$')]);
        assert_eq!(canvas.dimensions(), (3, 1));
        assert_eq!(*canvas.get_pixel(1, 0), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn visual_canvas_matches_output_size() {
        let grey = RgbaImage::from_pixel(40, 20, Rgba([200, 200, 200, 255]));
        let img = DynamicImage::ImageRgba8(grey);
        let painter = RecordingPainter::default();
        let mut style = ImageOptions::default().style;
        style.output_height = 10;
        style.background = Background::Transparent;
        let canvas = FrameRenderer::visual(&style, &painter)
            .render(&img, Path::new("grey.png"))
            .unwrap()
            .into_canvas()
            .unwrap();
        assert_eq!(canvas.dimensions(), (20, 10));
        // stride 9 -> 3 columns x 2 rows, brightness 200 -> 'J'
        let calls = painter.calls.lock().unwrap();
        assert_eq!(calls.len(), 6);
        assert!(calls.iter().all(|&(_, _, g)| g == 'J'));
        assert_eq!(canvas.get_pixel(5, 5)[3], 0);
    }
}
