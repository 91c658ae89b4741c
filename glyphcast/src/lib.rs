//! Brightness-sampled ASCII art from still images, GIFs and video frames.
//!
//! A decoded image is scaled to the output size, sampled on a regular grid,
//! and every sample's plain RGB average is mapped to a glyph through a
//! [`ramp::BrightnessRamp`]. The result is either drawn onto a canvas or
//! emitted as rows of text. [`batch::BatchOrchestrator`] runs that over single
//! images and ordered frame sequences and writes the artifacts.
pub mod batch;
pub mod config;
pub mod error;
pub mod frames;
pub mod pipeline;
pub mod ramp;
pub mod render;
pub mod sampler;
pub mod video;
