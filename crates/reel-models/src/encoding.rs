//! Render settings for the vertical output canvas.

use serde::{Deserialize, Serialize};

/// Output canvas width (portrait)
pub const CANVAS_WIDTH: u32 = 1080;
/// Output canvas height (portrait)
pub const CANVAS_HEIGHT: u32 = 1920;

/// Default video codec (H.264)
pub const DEFAULT_VIDEO_CODEC: &str = "libx264";
/// Default audio codec
pub const DEFAULT_AUDIO_CODEC: &str = "aac";
/// Default audio bitrate
pub const DEFAULT_AUDIO_BITRATE: &str = "384k";
/// 4:2:0 chroma subsampling, playable everywhere
pub const DEFAULT_PIXEL_FORMAT: &str = "yuv420p";
/// Constant output frame rate
pub const DEFAULT_FRAME_RATE: u32 = 30;
/// Fade-in and fade-out length in seconds
pub const DEFAULT_FADE_SECS: f64 = 1.0;

/// Encoding settings for per-scene clips.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderSettings {
    pub width: u32,
    pub height: u32,
    #[serde(default = "default_video_codec")]
    pub video_codec: String,
    #[serde(default = "default_audio_codec")]
    pub audio_codec: String,
    #[serde(default = "default_audio_bitrate")]
    pub audio_bitrate: String,
    #[serde(default = "default_pixel_format")]
    pub pixel_format: String,
    #[serde(default = "default_frame_rate")]
    pub frame_rate: u32,
    #[serde(default = "default_fade_secs")]
    pub fade_secs: f64,
}

fn default_video_codec() -> String {
    DEFAULT_VIDEO_CODEC.to_string()
}
fn default_audio_codec() -> String {
    DEFAULT_AUDIO_CODEC.to_string()
}
fn default_audio_bitrate() -> String {
    DEFAULT_AUDIO_BITRATE.to_string()
}
fn default_pixel_format() -> String {
    DEFAULT_PIXEL_FORMAT.to_string()
}
fn default_frame_rate() -> u32 {
    DEFAULT_FRAME_RATE
}
fn default_fade_secs() -> f64 {
    DEFAULT_FADE_SECS
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: CANVAS_WIDTH,
            height: CANVAS_HEIGHT,
            video_codec: default_video_codec(),
            audio_codec: default_audio_codec(),
            audio_bitrate: default_audio_bitrate(),
            pixel_format: default_pixel_format(),
            frame_rate: default_frame_rate(),
            fade_secs: default_fade_secs(),
        }
    }
}

impl RenderSettings {
    /// Start of the fade-out for a clip of `duration` seconds.
    ///
    /// Clamped to zero: a clip shorter than the fade fades out from its
    /// first frame instead of getting a negative start time.
    pub fn fade_out_start(&self, duration: f64) -> f64 {
        (duration - self.fade_secs).max(0.0)
    }
}
