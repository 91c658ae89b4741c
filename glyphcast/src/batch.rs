use std::{
    fs, io,
    path::{Path, PathBuf},
};

use image::{ImageError, RgbaImage};
use rayon::prelude::*;

use crate::{
    config::{FrameOptions, ImageOptions, TextOptions},
    error::Error,
    frames::{decode_frame, list_frames, open_gif_first_frame, open_image},
    render::{FrameRenderer, GlyphPainter},
    video::{encode_video, extract_frames, probe_video},
};

/// Rasterized single image, written into the output folder.
pub const ASCII_ART_PNG: &str = "ascii_art.png";
/// Subfolder of rendered video frames.
pub const ASCII_FRAMES_DIR: &str = "ascii_frames";
/// Subfolder the extracted source frames are written to.
pub const TEMP_FRAMES_DIR: &str = "temp_frames";
/// Reassembled video.
pub const ASCII_VIDEO_MP4: &str = "ascii_art_video.mp4";
/// Frames are reported in visual mode every this many frames.
pub const PROGRESS_INTERVAL: usize = 10;
/// Separator between frame blocks inside one text window.
pub const FRAME_SEPARATOR: &str = "\n\n";

/// Name of text window `index`.
pub fn text_window_name(index: usize) -> String {
    format!("ascii_frames_{index}.txt")
}

/// Where a run currently is. `Failed` can follow any other state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Extracting,
    Rendering,
    Writing,
    Done,
    Failed,
}

/// Summary of a finished run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub frames_rendered: usize,
    /// Every artifact written, in write order.
    pub outputs: Vec<PathBuf>,
}

/// How much of a multi-frame source made it into the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameCoverage {
    Complete,
    /// Animated GIFs are rendered from their first frame only.
    FirstFrameOnly { total_frames: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GifOutcome {
    pub output: PathBuf,
    pub coverage: FrameCoverage,
}

/// Drives the frame renderer over single images and frame sequences.
///
/// Frames are emitted strictly in input order. Counters are reset by every
/// entry point, so one orchestrator can serve several runs one after another.
#[derive(Debug)]
pub struct BatchOrchestrator {
    state: RunState,
    processed: usize,
    window_index: usize,
}

impl Default for BatchOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchOrchestrator {
    pub fn new() -> Self {
        Self {
            state: RunState::Idle,
            processed: 0,
            window_index: 0,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Renders one image to `output_folder/ascii_art.png`.
    pub fn image_to_ascii(
        &mut self,
        image_path: &Path,
        output_folder: &Path,
        options: &ImageOptions,
        painter: &dyn GlyphPainter,
    ) -> Result<PathBuf, Error> {
        self.begin();
        let result = self.render_image(image_path, output_folder, options, painter, None);
        self.finish(result)
    }

    /// Renders the first frame of a GIF to `output_folder/ascii_art.png`.
    pub fn gif_to_ascii(
        &mut self,
        gif_path: &Path,
        output_folder: &Path,
        options: &ImageOptions,
        painter: &dyn GlyphPainter,
    ) -> Result<GifOutcome, Error> {
        self.begin();
        log::info!("Processing GIF (first frame only)");
        let result = open_gif_first_frame(gif_path).and_then(|gif| {
            let output =
                self.render_image(gif_path, output_folder, options, painter, Some(gif.image))?;
            Ok(GifOutcome {
                output,
                coverage: coverage_of(gif_path, gif.total_frames),
            })
        });
        self.finish(result)
    }

    /// Writes the text rendering of a GIF's first frame to `output_path`.
    pub fn gif_to_text(
        &mut self,
        gif_path: &Path,
        output_path: &Path,
        options: &TextOptions,
    ) -> Result<GifOutcome, Error> {
        self.begin();
        log::info!("Processing GIF (first frame only)");
        let result = open_gif_first_frame(gif_path).and_then(|gif| {
            let output = self.render_text(gif_path, output_path, options, Some(gif.image))?;
            Ok(GifOutcome {
                output,
                coverage: coverage_of(gif_path, gif.total_frames),
            })
        });
        self.finish(result)
    }

    /// Writes the text rendering of one image to `output_path`.
    pub fn image_to_text(
        &mut self,
        image_path: &Path,
        output_path: &Path,
        options: &TextOptions,
    ) -> Result<PathBuf, Error> {
        self.begin();
        let result = self.render_text(image_path, output_path, options, None);
        self.finish(result)
    }

    /// Renders each frame to `ascii_folder/ascii_<frame name>`.
    ///
    /// `frames` must already be in temporal order.
    pub fn frames_to_ascii(
        &mut self,
        frames: &[PathBuf],
        ascii_folder: &Path,
        options: &FrameOptions,
        painter: &dyn GlyphPainter,
    ) -> Result<RunReport, Error> {
        self.begin();
        let result = self.render_frames(frames, ascii_folder, options, painter);
        self.finish(result)
    }

    /// Renders each frame to text and writes windows of `frames_per_file` frames to
    /// `output_folder/ascii_frames_K.txt`.
    pub fn frames_to_text(
        &mut self,
        frames: &[PathBuf],
        output_folder: &Path,
        options: &TextOptions,
    ) -> Result<RunReport, Error> {
        self.begin();
        let result = self.write_text_windows(frames, output_folder, options);
        self.finish(result)
    }

    /// Extracts the frames of `video_path` and renders them into
    /// `output_folder/ascii_frames/`.
    pub fn video_to_ascii(
        &mut self,
        video_path: &Path,
        output_folder: &Path,
        options: &FrameOptions,
        painter: &dyn GlyphPainter,
    ) -> Result<RunReport, Error> {
        self.begin();
        let result = (|| -> Result<RunReport, Error> {
            let frames = self.extract(video_path, output_folder)?;
            let ascii_folder = output_folder.join(ASCII_FRAMES_DIR);
            fs::create_dir_all(&ascii_folder).map_err(|e| Error::write(&ascii_folder, e))?;
            log::info!("Processing frames to ASCII art...");
            self.render_frames(&frames, &ascii_folder, options, painter)
        })();
        self.finish(result)
    }

    /// Assembles the rendered frames of `output_folder/ascii_frames/` and the
    /// audio of `video_path` into `output_path`.
    pub fn create_mp4(
        &mut self,
        video_path: &Path,
        output_folder: &Path,
        output_path: &Path,
    ) -> Result<PathBuf, Error> {
        self.begin();
        self.transition(RunState::Writing);
        let result = encode_video(&output_folder.join(ASCII_FRAMES_DIR), video_path, output_path);
        self.finish(result)
    }

    /// Extracts the frames of `video_path` and writes them as text windows into `output_folder`.
    pub fn video_to_text(
        &mut self,
        video_path: &Path,
        output_folder: &Path,
        options: &TextOptions,
    ) -> Result<RunReport, Error> {
        self.begin();
        log::info!("Converting video to ASCII text...");
        let result = (|| -> Result<RunReport, Error> {
            let frames = self.extract(video_path, output_folder)?;
            self.write_text_windows(&frames, output_folder, options)
        })();
        self.finish(result)
    }

    fn begin(&mut self) {
        self.state = RunState::Idle;
        self.processed = 0;
        self.window_index = 0;
    }

    fn transition(&mut self, next: RunState) {
        if self.state != next {
            log::debug!("Run state {:?} -> {next:?}", self.state);
            self.state = next;
        }
    }

    fn finish<T>(&mut self, result: Result<T, Error>) -> Result<T, Error> {
        match &result {
            Ok(_) => self.transition(RunState::Done),
            Err(e) => {
                log::debug!("Run failed: {e}");
                self.transition(RunState::Failed);
            }
        }
        result
    }

    fn extract(&mut self, video_path: &Path, output_folder: &Path) -> Result<Vec<PathBuf>, Error> {
        self.transition(RunState::Extracting);
        let info = probe_video(video_path)?;
        log::info!(
            "Extracting frames from {} ({}x{}, {} fps)...",
            video_path.display(),
            info.width,
            info.height,
            info.fps.map_or("unknown".to_string(), |fps| format!("{fps:.3}"))
        );
        let frames_folder = output_folder.join(TEMP_FRAMES_DIR);
        let count = extract_frames(video_path, &frames_folder)?;
        log::info!("Extracted {count} frames");
        list_frames(&frames_folder)
    }

    fn render_image(
        &mut self,
        source: &Path,
        output_folder: &Path,
        options: &ImageOptions,
        painter: &dyn GlyphPainter,
        decoded: Option<image::DynamicImage>,
    ) -> Result<PathBuf, Error> {
        self.transition(RunState::Rendering);
        let img = match decoded {
            Some(img) => img,
            None => open_image(source)?,
        };
        let canvas = FrameRenderer::visual(&options.style, painter).render_canvas(&img, source)?;
        self.transition(RunState::Writing);
        let output_path = output_folder.join(ASCII_ART_PNG);
        write_png(&output_path, &canvas)?;
        self.processed = 1;
        log::info!("ASCII art saved to: {}", output_path.display());
        Ok(output_path)
    }

    fn render_text(
        &mut self,
        source: &Path,
        output_path: &Path,
        options: &TextOptions,
        decoded: Option<image::DynamicImage>,
    ) -> Result<PathBuf, Error> {
        self.transition(RunState::Rendering);
        let img = match decoded {
            Some(img) => img,
            None => open_image(source)?,
        };
        let text = FrameRenderer::text(options).render_text(&img, source)?;
        self.transition(RunState::Writing);
        write_text(output_path, &text)?;
        self.processed = 1;
        log::info!("ASCII text saved to: {}", output_path.display());
        Ok(output_path.to_path_buf())
    }

    fn render_frames(
        &mut self,
        frames: &[PathBuf],
        ascii_folder: &Path,
        options: &FrameOptions,
        painter: &dyn GlyphPainter,
    ) -> Result<RunReport, Error> {
        let renderer = FrameRenderer::visual(&options.style, painter);
        let total = frames.len();
        let mut report = RunReport::default();

        self.in_order(
            frames,
            options.jobs,
            |index, path| renderer.render_canvas(&decode_frame(index, path)?, path),
            |this, index, canvas| {
                let output_path = ascii_folder.join(ascii_frame_name(&frames[index]));
                write_png(&output_path, &canvas)?;
                report.outputs.push(output_path);
                if this.processed % PROGRESS_INTERVAL == 0 {
                    log::info!("Processed {}/{total} frames", this.processed);
                }
                Ok(())
            },
        )?;

        report.frames_rendered = self.processed;
        log::info!("All frames processed successfully");
        Ok(report)
    }

    fn write_text_windows(
        &mut self,
        frames: &[PathBuf],
        output_folder: &Path,
        options: &TextOptions,
    ) -> Result<RunReport, Error> {
        if options.frames_per_file == 0 {
            return Err(Error::Config("frames per file must be at least 1".into()));
        }
        let renderer = FrameRenderer::text(options);
        let mut window = Vec::with_capacity(options.frames_per_file.min(frames.len()));
        let mut report = RunReport::default();

        self.in_order(
            frames,
            options.jobs,
            |index, path| renderer.render_text(&decode_frame(index, path)?, path),
            |this, _, text| {
                window.push(text);
                if window.len() == options.frames_per_file {
                    report.outputs.push(this.flush_window(&mut window, output_folder)?);
                }
                Ok(())
            },
        )?;
        if !window.is_empty() {
            report
                .outputs
                .push(self.flush_window(&mut window, output_folder)?);
        }

        report.frames_rendered = self.processed;
        log::info!("ASCII text files saved to: {}", output_folder.display());
        Ok(report)
    }

    fn flush_window(
        &mut self,
        window: &mut Vec<String>,
        output_folder: &Path,
    ) -> Result<PathBuf, Error> {
        self.transition(RunState::Writing);
        let path = output_folder.join(text_window_name(self.window_index));
        write_text(&path, &window.join(FRAME_SEPARATOR))?;
        log::debug!("Wrote {} frames to {}", window.len(), path.display());
        window.clear();
        self.window_index += 1;
        Ok(path)
    }

    /// Renders `frames` in chunks of `jobs` and hands the results to `emit` in input order.
    ///
    /// At most `jobs` rendered frames are alive at once. The first failing frame
    /// aborts the run; frames emitted before it stay written.
    fn in_order<T: Send>(
        &mut self,
        frames: &[PathBuf],
        jobs: usize,
        render: impl Fn(usize, &Path) -> Result<T, Error> + Sync,
        mut emit: impl FnMut(&mut Self, usize, T) -> Result<(), Error>,
    ) -> Result<(), Error> {
        let jobs = jobs.max(1);
        let pool = if jobs > 1 {
            Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(jobs)
                    .build()
                    .map_err(|e| Error::Config(format!("cannot start {jobs} workers: {e}")))?,
            )
        } else {
            None
        };

        for (chunk_index, chunk) in frames.chunks(jobs).enumerate() {
            let base = chunk_index * jobs;
            self.transition(RunState::Rendering);
            let rendered: Vec<Result<T, Error>> = match &pool {
                Some(pool) => pool.install(|| {
                    chunk
                        .par_iter()
                        .enumerate()
                        .map(|(i, path)| render(base + i, path))
                        .collect()
                }),
                None => chunk
                    .iter()
                    .enumerate()
                    .map(|(i, path)| render(base + i, path))
                    .collect(),
            };

            for (i, frame) in rendered.into_iter().enumerate() {
                let frame = frame?;
                self.transition(RunState::Writing);
                self.processed += 1;
                emit(self, base + i, frame)?;
            }
        }
        Ok(())
    }
}

fn coverage_of(gif_path: &Path, total_frames: usize) -> FrameCoverage {
    if total_frames > 1 {
        log::warn!(
            "{} has {total_frames} frames, only the first was rendered",
            gif_path.display()
        );
        FrameCoverage::FirstFrameOnly { total_frames }
    } else {
        FrameCoverage::Complete
    }
}

fn ascii_frame_name(frame: &Path) -> String {
    let name = frame
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("ascii_{name}")
}

fn write_png(path: &Path, canvas: &RgbaImage) -> Result<(), Error> {
    canvas.save(path).map_err(|e| match e {
        ImageError::IoError(source) => Error::write(path, source),
        other => Error::write(path, io::Error::other(other)),
    })
}

fn write_text(path: &Path, text: &str) -> Result<(), Error> {
    fs::write(path, text).map_err(|e| Error::write(path, e))
}
