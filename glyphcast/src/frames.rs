use crate::error::*;
use image::{DynamicImage, ImageReader};
use std::{
    fs::{self, File},
    path::{Path, PathBuf},
};

/// What kind of source a path points at, judged by its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Gif,
    Video,
}

impl MediaKind {
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(std::ffi::OsStr::to_str)
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("png") | Some("bmp") | Some("ico") | Some("tif") | Some("tiff") | Some("jpg")
            | Some("jpeg") | Some("webp") => MediaKind::Image,
            Some("gif") => MediaKind::Gif,
            // Unknown extension, treat as video
            _ => MediaKind::Video,
        }
    }
}

/// First frame of a GIF plus the number of frames the file holds.
#[derive(Debug)]
pub struct GifFirstFrame {
    pub image: DynamicImage,
    pub total_frames: usize,
}

/// Decodes a still image.
pub fn open_image(path: &Path) -> Result<DynamicImage, Error> {
    ImageReader::open(path)
        .map_err(|e| Error::decode(path, e))?
        .with_guessed_format()
        .map_err(|e| Error::decode(path, e))?
        .decode()
        .map_err(|e| Error::decode(path, e))
}

/// Decodes frame `index` of an extracted frame sequence.
pub fn decode_frame(index: usize, path: &Path) -> Result<DynamicImage, Error> {
    open_image(path).map_err(|e| e.at_frame(index))
}

/// Composes the first frame of a GIF and counts every frame the file holds.
///
/// Only the first frame is ever rendered; the count lets callers report what was left out.
pub fn open_gif_first_frame(path: &Path) -> Result<GifFirstFrame, Error> {
    let file = File::open(path).map_err(|e| Error::decode(path, e))?;
    let mut options = gif::DecodeOptions::new();
    // gif_dispose composes from indexed frames
    options.set_color_output(gif::ColorOutput::Indexed);
    let mut decoder = options
        .read_info(file)
        .map_err(|e| Error::decode(path, format!("{ERROR_READING_GIF_HEADER}: {e}")))?;

    let mut screen = gif_dispose::Screen::new_decoder(&decoder);
    let first = decoder
        .read_next_frame()
        .map_err(|e| Error::decode(path, e))?
        .ok_or_else(|| Error::decode(path, "GIF contains no frames"))?;
    screen
        .blit_frame(first)
        .map_err(|e| Error::decode(path, format!("{e:?}")))?;

    let (buf, width, height) = screen.pixels_rgba().to_contiguous_buf();
    let image = image::RgbaImage::from_fn(width as u32, height as u32, |x, y| {
        let rgba = buf.as_ref()[y as usize * width + x as usize];
        image::Rgba([rgba.r, rgba.g, rgba.b, rgba.a])
    });

    let mut total_frames = 1;
    loop {
        match decoder.read_next_frame() {
            Ok(Some(_)) => total_frames += 1,
            Ok(None) => break,
            Err(e) => {
                // the damaged frame still counts as one that was not rendered
                total_frames += 1;
                log::warn!(
                    "{} frame {total_frames} is unreadable, stopped counting: {e}",
                    path.display()
                );
                break;
            }
        }
    }

    Ok(GifFirstFrame {
        image: DynamicImage::ImageRgba8(image),
        total_frames,
    })
}

/// Lists the `.png` frames of `folder`, sorted lexicographically by file name.
///
/// With fixed-width zero-padded names this is temporal order.
pub fn list_frames(folder: &Path) -> Result<Vec<PathBuf>, Error> {
    let entries = fs::read_dir(folder).map_err(|e| Error::decode(folder, e))?;
    let mut frames = Vec::new();
    for entry in entries {
        let path = match entry {
            Ok(entry) => entry.path(),
            Err(e) => {
                log::warn!("Skipping unreadable entry in {}: {e}", folder.display());
                continue;
            }
        };
        if path.is_file() && path.extension().is_some_and(|ext| ext == "png") {
            frames.push(path);
        }
    }
    frames.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn classifies_sources_by_extension() {
        assert_eq!(MediaKind::from_path(Path::new("a.PNG")), MediaKind::Image);
        assert_eq!(MediaKind::from_path(Path::new("a.gif")), MediaKind::Gif);
        assert_eq!(MediaKind::from_path(Path::new("a.mp4")), MediaKind::Video);
        assert_eq!(MediaKind::from_path(Path::new("clip")), MediaKind::Video);
    }

    #[test]
    fn frames_are_listed_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["frame_010.png", "frame_002.png", "frame_001.png", "notes.txt"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        let names: Vec<_> = list_frames(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["frame_001.png", "frame_002.png", "frame_010.png"]);
    }

    #[test]
    fn missing_frame_is_a_decode_error_with_index() {
        let err = decode_frame(4, Path::new("/nonexistent/frame_005.png")).unwrap_err();
        assert!(matches!(err, Error::Decode { frame: Some(4), .. }));
    }

    #[test]
    fn corrupt_image_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        fs::write(&path, b"definitely not a png").unwrap();
        assert!(matches!(open_image(&path), Err(Error::Decode { frame: None, .. })));
    }

    fn write_gif(path: &Path, pixels: &[Rgba<u8>]) {
        let file = File::create(path).unwrap();
        let mut encoder = image::codecs::gif::GifEncoder::new(file);
        let frames = pixels
            .iter()
            .map(|&px| image::Frame::new(RgbaImage::from_pixel(4, 2, px)));
        encoder.encode_frames(frames).unwrap();
    }

    #[test]
    fn damaged_later_frame_still_counts_as_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("damaged.gif");
        write_gif(&path, &[Rgba([255, 255, 255, 255]), Rgba([0, 0, 0, 255])]);
        // cut into the second frame's image data
        let bytes = fs::read(&path).unwrap();
        fs::write(&path, &bytes[..bytes.len() - 5]).unwrap();

        let gif = open_gif_first_frame(&path).unwrap();
        assert_eq!(gif.total_frames, 2);
        assert_eq!(gif.image.width(), 4);
    }

    #[test]
    fn gif_reports_ignored_frames() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("anim.gif");
        write_gif(&path, &[Rgba([255, 255, 255, 255]), Rgba([0, 0, 0, 255])]);
        let gif = open_gif_first_frame(&path).unwrap();
        assert_eq!(gif.total_frames, 2);
        assert_eq!(gif.image.width(), 4);
        // palette quantization may shift the colour slightly
        let first = gif.image.to_rgba8();
        assert!(first.get_pixel(0, 0)[0] > 200);
        assert_eq!(first.get_pixel(0, 0)[3], 255);
    }
}
