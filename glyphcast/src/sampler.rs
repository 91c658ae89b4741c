use image::RgbaImage;

/// Regular grid of sample coordinates over `[0, width) x [0, height)`.
///
/// The grid is `Copy` and every call to [`SampleGrid::points`] starts over, so
/// it can be walked as many times as needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleGrid {
    pub width: u32,
    pub height: u32,
    step: u32,
}

impl SampleGrid {
    /// `step` below 1 is clamped to 1; a non-positive stride would never advance.
    pub fn new(width: u32, height: u32, step: i64) -> Self {
        let step = step.clamp(1, u32::MAX as i64) as u32;
        Self {
            width,
            height,
            step,
        }
    }

    /// Grid derived from the glyph size and the spacing offset between glyphs.
    pub fn for_glyphs(width: u32, height: u32, glyph_size: u32, spacing: i32) -> Self {
        Self::new(width, height, glyph_size as i64 + spacing as i64)
    }

    pub fn step(&self) -> u32 {
        self.step
    }

    pub fn columns(&self) -> u32 {
        self.width.div_ceil(self.step)
    }

    pub fn rows(&self) -> u32 {
        self.height.div_ceil(self.step)
    }

    pub fn len(&self) -> usize {
        self.columns() as usize * self.rows() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Row-major sample coordinates.
    pub fn points(&self) -> impl Iterator<Item = (u32, u32)> + use<> {
        let SampleGrid {
            width,
            height,
            step,
        } = *self;
        (0..height)
            .step_by(step as usize)
            .flat_map(move |y| (0..width).step_by(step as usize).map(move |x| (x, y)))
    }

    /// `y` of every sampled row, top to bottom.
    pub fn row_starts(&self) -> impl Iterator<Item = u32> + use<> {
        (0..self.height).step_by(self.step as usize)
    }

    /// Sample coordinates of the row at `y`, left to right.
    pub fn columns_at(&self, y: u32) -> impl Iterator<Item = (u32, u32)> + use<> {
        (0..self.width)
            .step_by(self.step as usize)
            .map(move |x| (x, y))
    }
}

/// One grid cell's pixel data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelSample {
    pub x: u32,
    pub y: u32,
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub alpha: u8,
}

impl PixelSample {
    pub fn read(buffer: &RgbaImage, x: u32, y: u32) -> Self {
        let [r, g, b, alpha] = buffer.get_pixel(x, y).0;
        Self {
            x,
            y,
            r,
            g,
            b,
            alpha,
        }
    }

    /// Plain average of the colour channels, not luma-weighted.
    pub fn brightness(&self) -> f64 {
        (self.r as f64 + self.g as f64 + self.b as f64) / 3.0
    }

    pub fn is_transparent(&self) -> bool {
        self.alpha == 0
    }
}

/// Reads every grid point of `buffer`.
///
/// The grid must fit inside the buffer, which holds whenever the buffer was
/// resized to the grid's output dimensions.
pub fn samples<'a>(
    buffer: &'a RgbaImage,
    grid: &SampleGrid,
) -> impl Iterator<Item = PixelSample> + use<'a> {
    grid.points().map(move |(x, y)| PixelSample::read(buffer, x, y))
}
