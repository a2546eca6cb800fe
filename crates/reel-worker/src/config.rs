//! Generator configuration.

use std::path::PathBuf;
use std::time::Duration;

use reel_models::{CaptionAlignment, CaptionStyle, ReelPaths, RenderSettings};

use crate::error::{WorkerError, WorkerResult};

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_DEEPGRAM_BASE_URL: &str = "https://api.deepgram.com/v1";

/// Everything a reel run needs, resolved once at startup.
#[derive(Debug, Clone)]
pub struct ReelConfig {
    pub openai_api_key: String,
    pub deepgram_api_key: String,
    pub openai_base_url: String,
    pub deepgram_base_url: String,
    /// Chat model for script generation
    pub llm_model: String,
    pub image_model: String,
    pub image_size: String,
    /// Deepgram voice model
    pub tts_model: String,
    pub work_dir: PathBuf,
    pub output: PathBuf,
    /// Maximum concurrent scene renders
    pub max_render_parallel: usize,
    /// Per FFmpeg/FFprobe invocation
    pub ffmpeg_timeout: Duration,
    /// Per HTTP request
    pub http_timeout: Duration,
    pub image_fetch_attempts: u32,
    pub image_fetch_delay: Duration,
    pub caption_style: CaptionStyle,
    pub render: RenderSettings,
}

impl ReelConfig {
    /// Create config from environment variables.
    pub fn from_env() -> WorkerResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup<F>(get: F) -> WorkerResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            get(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| WorkerError::config(format!("{} not set", key)))
        };
        let string_or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());
        let parse_or = |key: &str, default: u64| {
            get(key).and_then(|s| s.trim().parse().ok()).unwrap_or(default)
        };

        let alignment = match get("REEL_CAPTION_ALIGNMENT") {
            Some(value) => value
                .parse::<CaptionAlignment>()
                .map_err(|e| WorkerError::config(e.to_string()))?,
            None => CaptionAlignment::default(),
        };

        let mut caption_style = CaptionStyle::default()
            .with_alignment(alignment)
            .with_enabled(get("REEL_SUBTITLES").map(|v| is_truthy(&v)).unwrap_or(true));
        if let Some(size) = get("REEL_FONT_SIZE").and_then(|s| s.trim().parse().ok()) {
            caption_style = caption_style.with_font_size(size);
        }
        if let Some(font) = get("REEL_FONT_FILE").filter(|f| !f.trim().is_empty()) {
            caption_style = caption_style.with_font_file(font);
        }

        Ok(Self {
            openai_api_key: required("OPENAI_API_KEY")?,
            deepgram_api_key: required("DEEPGRAM_API_KEY")?,
            openai_base_url: string_or("OPENAI_BASE_URL", DEFAULT_OPENAI_BASE_URL),
            deepgram_base_url: string_or("DEEPGRAM_BASE_URL", DEFAULT_DEEPGRAM_BASE_URL),
            llm_model: string_or("REEL_LLM_MODEL", "gpt-4o-mini"),
            image_model: string_or("REEL_IMAGE_MODEL", "dall-e-3"),
            image_size: string_or("REEL_IMAGE_SIZE", "1024x1792"),
            tts_model: string_or("REEL_TTS_MODEL", "aura-asteria-en"),
            work_dir: PathBuf::from(string_or("REEL_WORK_DIR", "./reel_work")),
            output: PathBuf::from(string_or("REEL_OUTPUT", "output_video.mp4")),
            max_render_parallel: (parse_or("REEL_MAX_RENDER_PARALLEL", 2) as usize).max(1),
            ffmpeg_timeout: Duration::from_secs(parse_or("REEL_FFMPEG_TIMEOUT_SECS", 600)),
            http_timeout: Duration::from_secs(parse_or("REEL_HTTP_TIMEOUT_SECS", 120)),
            image_fetch_attempts: (parse_or("REEL_IMAGE_FETCH_RETRIES", 3) as u32).max(1),
            image_fetch_delay: Duration::from_millis(parse_or("REEL_IMAGE_FETCH_DELAY_MS", 1000)),
            caption_style,
            render: RenderSettings::default(),
        })
    }

    /// Directory layout for this run.
    pub fn paths(&self) -> ReelPaths {
        ReelPaths::under(&self.work_dir, &self.output)
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
