#![deny(unreachable_patterns)]
//! Video composition and subtitle timing for vertical reels.
//!
//! This crate provides:
//! - Subtitle timeline building and SRT cue files
//! - Caption reflow and vertical layout
//! - Letterboxing of source images onto the 1080x1920 canvas
//! - Per-scene rendering and lossless concatenation through a
//!   [`MediaPipeline`] (FFmpeg in production)

pub mod assembler;
pub mod command;
pub mod error;
pub mod filters;
pub mod frames;
pub mod fs_utils;
pub mod layout;
pub mod pipeline;
pub mod probe;
pub mod reflow;
pub mod renderer;
pub mod subtitles;

pub use assembler::SequenceAssembler;
pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner};
pub use error::{MediaError, MediaResult};
pub use frames::{find_source_image, preprocess_frames, preprocess_image, FrameReport};
pub use layout::{compute_layout, vertical_start, CaptionLayout};
pub use pipeline::{FfmpegPipeline, MediaPipeline, SceneRenderJob};
pub use probe::probe_duration;
pub use reflow::{estimate_width, wrap_text};
pub use renderer::{RenderReport, RenderedClip, SceneRenderer, SkipReason, SkippedScene};
pub use subtitles::{parse_cue_file, read_cue_file, write_cue_file, SubtitleTimeline};
