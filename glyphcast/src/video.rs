//! Frame extraction and video assembly through the `ffmpeg` / `ffprobe` binaries.
//!
//! Both must be on `PATH`. Codec work stays in ffmpeg; this module only builds
//! command lines and maps failures onto [`Error`].
use std::{
    ffi::OsString,
    fs,
    path::{Path, PathBuf},
    process::{Command, Stdio},
    str::FromStr,
};

use num::{Rational64, ToPrimitive};
use serde_json::Value;

use crate::{error::Error, frames::list_frames};

/// Name pattern of extracted source frames.
pub const FRAME_PATTERN: &str = "frame_%03d.png";
/// Name pattern of rendered frames fed back to the encoder.
pub const ASCII_FRAME_PATTERN: &str = "ascii_frame_%03d.png";
/// Frame rate of the assembled video, independent of the source.
pub const OUTPUT_FPS: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VideoInfo {
    pub width: u32,
    pub height: u32,
    pub fps: Option<f64>,
}

/// Queries `ffprobe` for the first video stream of `video_path`.
///
/// A file without a video stream is an [`Error::Extraction`].
pub fn probe_video(video_path: &Path) -> Result<VideoInfo, Error> {
    let output = Command::new("ffprobe")
        .args(["-v", "error", "-select_streams", "v:0"])
        .args(["-show_entries", "stream=width,height,r_frame_rate"])
        .args(["-of", "json"])
        .arg(video_path)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| Error::Extraction {
            path: video_path.to_path_buf(),
            reason: format!("cannot run ffprobe, is it installed? ({e})"),
        })?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    parse_probe(&stdout).ok_or_else(|| Error::Extraction {
        path: video_path.to_path_buf(),
        reason: format!(
            "no video stream found: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        ),
    })
}

fn parse_probe(json: &str) -> Option<VideoInfo> {
    let value: Value = serde_json::from_str(json).ok()?;
    let stream = &value["streams"][0];
    let width = stream["width"].as_u64()? as u32;
    let height = stream["height"].as_u64()? as u32;
    let fps = stream["r_frame_rate"]
        .as_str()
        .and_then(|rate| Rational64::from_str(rate).ok())
        .and_then(|rate| rate.to_f64());
    Some(VideoInfo { width, height, fps })
}

/// Splits `video_path` into `folder/frame_NNN.png` images and returns how many were written.
pub fn extract_frames(video_path: &Path, folder: &Path) -> Result<usize, Error> {
    let extraction_error = |reason: String| Error::Extraction {
        path: video_path.to_path_buf(),
        reason,
    };

    fs::create_dir_all(folder).map_err(|e| Error::write(folder, e))?;
    run_ffmpeg(extract_args(video_path, folder)).map_err(extraction_error)?;

    let frames = list_frames(folder)?.len();
    if frames == 0 {
        return Err(extraction_error("ffmpeg produced no frames".into()));
    }
    Ok(frames)
}

/// Assembles `ascii_frames_dir/ascii_frame_NNN.png` with the audio of `source_video`.
///
/// On failure the rendered frames stay where they are.
pub fn encode_video(
    ascii_frames_dir: &Path,
    source_video: &Path,
    output: &Path,
) -> Result<PathBuf, Error> {
    run_ffmpeg(encode_args(ascii_frames_dir, source_video, output)).map_err(|reason| {
        Error::Encoding {
            output: output.to_path_buf(),
            reason,
        }
    })?;
    log::info!("ASCII video saved to: {}", output.display());
    Ok(output.to_path_buf())
}

fn extract_args(video_path: &Path, folder: &Path) -> Vec<OsString> {
    let mut args = base_args();
    args.push("-i".into());
    args.push(video_path.into());
    args.push(folder.join(FRAME_PATTERN).into());
    args
}

fn encode_args(ascii_frames_dir: &Path, source_video: &Path, output: &Path) -> Vec<OsString> {
    let mut args = base_args();
    args.extend(["-r".into(), OUTPUT_FPS.to_string().into(), "-i".into()]);
    args.push(ascii_frames_dir.join(ASCII_FRAME_PATTERN).into());
    args.push("-i".into());
    args.push(source_video.into());
    args.extend(
        ["-c:v", "libx264", "-pix_fmt", "yuv420p", "-c:a", "aac", "-shortest"]
            .into_iter()
            .map(OsString::from),
    );
    args.push(output.into());
    args
}

fn base_args() -> Vec<OsString> {
    ["-y", "-hide_banner", "-loglevel", "error"]
        .into_iter()
        .map(OsString::from)
        .collect()
}

/// Runs ffmpeg to completion, returning its stderr on failure.
fn run_ffmpeg(args: Vec<OsString>) -> Result<(), String> {
    let command_line: Vec<_> = args.iter().map(|a| a.to_string_lossy()).collect();
    log::debug!("ffmpeg {}", command_line.join(" "));
    let output = Command::new("ffmpeg")
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| format!("cannot run ffmpeg, is it installed? ({e})"))?;

    if output.status.success() {
        Ok(())
    } else {
        Err(format!(
            "ffmpeg exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        ))
    }
}
