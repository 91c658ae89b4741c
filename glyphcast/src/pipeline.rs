use crate::error::*;
use fast_image_resize as fir;
use image::{DynamicImage, RgbaImage};
use std::path::Path;

/// Resampling used when drawing the source onto the output-sized buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResizeFilter {
    #[default]
    Nearest,
    Bilinear,
}

impl ResizeFilter {
    fn alg(self) -> fir::ResizeAlg {
        match self {
            ResizeFilter::Nearest => fir::ResizeAlg::Nearest,
            ResizeFilter::Bilinear => fir::ResizeAlg::Convolution(fir::FilterType::Bilinear),
        }
    }
}

/// Computes `(floor(output_height * aspect), output_height)` for a source of
/// `src_width x src_height`.
///
/// A zero-height source has no aspect ratio and is rejected before any sampling.
pub fn output_dimensions(
    src_width: u32,
    src_height: u32,
    output_height: u32,
    source: &Path,
) -> Result<(u32, u32), Error> {
    if src_height == 0 {
        return Err(Error::ZeroDimension {
            path: source.to_path_buf(),
        });
    }
    let aspect_ratio = src_width as f64 / src_height as f64;
    let output_width = (output_height as f64 * aspect_ratio).floor() as u32;
    Ok((output_width, output_height))
}

/// Scales decoded images to the ASCII output size.
#[derive(Debug, Clone, Copy)]
pub struct ImagePipeline {
    /// The single tunable output dimension; width follows the source aspect ratio.
    pub output_height: u32,
    pub filter: ResizeFilter,
}

impl ImagePipeline {
    pub fn new(output_height: u32, filter: ResizeFilter) -> Self {
        Self {
            output_height,
            filter,
        }
    }

    /// Returns an RGBA buffer of the output size for `img`.
    pub fn resize(&self, img: &DynamicImage, source: &Path) -> Result<RgbaImage, Error> {
        let (width, height) = (img.width(), img.height());
        let (dst_w, dst_h) = output_dimensions(width, height, self.output_height, source)?;
        if width == 0 || dst_w == 0 || dst_h == 0 {
            return Ok(RgbaImage::new(dst_w, dst_h));
        }

        let src_image = fir::images::Image::from_vec_u8(
            width,
            height,
            img.to_rgba8().into_raw(),
            fir::PixelType::U8x4,
        )
        .map_err(|err| Error::decode(source, format!("{ERROR_RESIZE}: {err:?}")))?;

        let mut dst_image = fir::images::Image::new(dst_w, dst_h, fir::PixelType::U8x4);

        let mut resizer = fir::Resizer::new();
        resizer
            .resize(
                &src_image,
                &mut dst_image,
                &fir::ResizeOptions::new().resize_alg(self.filter.alg()),
            )
            .map_err(|err| Error::decode(source, format!("{ERROR_RESIZE}: {err:?}")))?;

        RgbaImage::from_raw(dst_w, dst_h, dst_image.into_vec())
            .ok_or_else(|| Error::decode(source, ERROR_RESIZE))
    }
}
