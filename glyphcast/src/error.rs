//! This module defines the `Error` type returned by every fallible operation in the crate,
//! as well as the message prefixes used when building its variants.
use std::{io, path::PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A source image or extracted frame could not be read or decoded.
    #[error("{} {}{}: {reason}", ERROR_DECODING_IMAGE, .path.display(), frame_suffix(.frame))]
    Decode {
        path: PathBuf,
        frame: Option<usize>,
        reason: String,
    },
    /// The source has no height, so its aspect ratio is undefined.
    #[error("{}: {}", ERROR_ZERO_DIMENSION, .path.display())]
    ZeroDimension { path: PathBuf },
    /// Frame extraction failed before any frame was rendered.
    #[error("{} from {}: {reason}", ERROR_EXTRACTING_FRAMES, .path.display())]
    Extraction { path: PathBuf, reason: String },
    /// Final video assembly failed. Rendered frames are left on disk.
    #[error("{} {}: {reason}", ERROR_ENCODING_VIDEO, .output.display())]
    Encoding { output: PathBuf, reason: String },
    /// Writing an artifact to the filesystem failed.
    #[error("{} {}: {source}", ERROR_WRITING_OUTPUT, .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Font error: {0}")]
    Font(String),
}

fn frame_suffix(frame: &Option<usize>) -> String {
    frame.map(|i| format!(" (frame {i})")).unwrap_or_default()
}

impl Error {
    pub(crate) fn decode(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Error::Decode {
            path: path.into(),
            frame: None,
            reason: reason.to_string(),
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Write {
            path: path.into(),
            source,
        }
    }

    /// Attaches a frame index to decode errors; other variants pass through.
    pub(crate) fn at_frame(self, index: usize) -> Self {
        match self {
            Error::Decode { path, reason, .. } => Error::Decode {
                path,
                frame: Some(index),
                reason,
            },
            other => other,
        }
    }
}

impl From<Error> for io::Error {
    fn from(error: Error) -> Self {
        io::Error::other(error.to_string())
    }
}

/// Error message for issues related to decoding an image.
pub const ERROR_DECODING_IMAGE: &str = "Error decoding image";
/// Error message for a source whose height is zero.
pub const ERROR_ZERO_DIMENSION: &str = "Source has zero height, aspect ratio is undefined";
/// Error message for issues related to extracting frames from a video.
pub const ERROR_EXTRACTING_FRAMES: &str = "Error extracting frames";
/// Error message for issues related to assembling the output video.
pub const ERROR_ENCODING_VIDEO: &str = "Error encoding video";
/// Error message for issues related to writing an artifact.
pub const ERROR_WRITING_OUTPUT: &str = "Error writing";
/// Error message for issues related to reading a GIF header.
pub const ERROR_READING_GIF_HEADER: &str = "Cannot read GIF header";
/// Error message for issues related to resizing an image.
pub const ERROR_RESIZE: &str = "Image resizing error";
