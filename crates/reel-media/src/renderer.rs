//! Per-scene clip rendering.
//!
//! Each scene needs its frame, its narration audio and a usable narration
//! duration. A scene missing any of them, or whose render fails, is
//! reported as skipped; it never aborts the other scenes.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use futures::future::join_all;
use reel_models::{CaptionStyle, ReelPaths, RenderSettings, TimedCaption};
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

use crate::error::MediaResult;
use crate::filters::build_scene_filter;
use crate::fs_utils::remove_files;
use crate::pipeline::{MediaPipeline, SceneRenderJob};
use crate::reflow::wrap_text;

/// A clip that rendered successfully.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedClip {
    pub scene_number: u32,
    pub path: PathBuf,
    pub duration: f64,
}

/// Why a scene produced no clip.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    MissingFrame(PathBuf),
    MissingAudio(PathBuf),
    NoDuration(String),
    RenderFailed(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingFrame(p) => write!(f, "frame missing: {}", p.display()),
            Self::MissingAudio(p) => write!(f, "audio missing: {}", p.display()),
            Self::NoDuration(e) => write!(f, "no narration duration: {}", e),
            Self::RenderFailed(e) => write!(f, "render failed: {}", e),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedScene {
    pub scene_number: u32,
    pub reason: SkipReason,
}

/// Outcome of rendering all scenes, both lists sorted by scene number.
#[derive(Debug, Clone, Default)]
pub struct RenderReport {
    pub clips: Vec<RenderedClip>,
    pub skipped: Vec<SkippedScene>,
}

impl RenderReport {
    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }
}

/// Builds and runs one render job per scene.
#[derive(Debug, Clone)]
pub struct SceneRenderer {
    paths: ReelPaths,
    style: CaptionStyle,
    settings: RenderSettings,
    max_parallel: usize,
}

impl SceneRenderer {
    pub fn new(paths: ReelPaths, style: CaptionStyle, settings: RenderSettings) -> Self {
        Self {
            paths,
            style,
            settings,
            max_parallel: 1,
        }
    }

    /// Allow up to `max_parallel` renders at once (at least one).
    pub fn with_max_parallel(mut self, max_parallel: usize) -> Self {
        self.max_parallel = max_parallel.max(1);
        self
    }

    /// Render every scene in `scene_numbers`.
    ///
    /// `captions` are matched to scenes by cue index; a scene without a
    /// caption is rendered without text.
    pub async fn render<P>(
        &self,
        pipeline: &P,
        scene_numbers: &[u32],
        captions: &[TimedCaption],
    ) -> MediaResult<RenderReport>
    where
        P: MediaPipeline + ?Sized,
    {
        tokio::fs::create_dir_all(&self.paths.clips_dir).await?;

        let by_scene: HashMap<u32, &str> =
            captions.iter().map(|c| (c.index, c.text.as_str())).collect();
        let semaphore = Arc::new(Semaphore::new(self.max_parallel));

        info!(
            scenes = scene_numbers.len(),
            max_parallel = self.max_parallel,
            "Rendering scene clips"
        );

        let futures: Vec<_> = scene_numbers
            .iter()
            .map(|&n| {
                let semaphore = Arc::clone(&semaphore);
                let caption = by_scene.get(&n).copied();
                async move {
                    // The semaphore is never closed
                    let _permit = semaphore.acquire().await.ok();
                    self.render_scene(pipeline, n, caption)
                        .await
                        .map_err(|reason| SkippedScene {
                            scene_number: n,
                            reason,
                        })
                }
            })
            .collect();

        let mut report = RenderReport::default();
        for result in join_all(futures).await {
            match result {
                Ok(clip) => report.clips.push(clip),
                Err(skipped) => report.skipped.push(skipped),
            }
        }
        report.clips.sort_by_key(|c| c.scene_number);
        report.skipped.sort_by_key(|s| s.scene_number);

        info!(
            rendered = report.clips.len(),
            skipped = report.skipped.len(),
            "Scene rendering finished"
        );
        Ok(report)
    }

    async fn render_scene<P>(
        &self,
        pipeline: &P,
        scene_number: u32,
        caption: Option<&str>,
    ) -> Result<RenderedClip, SkipReason>
    where
        P: MediaPipeline + ?Sized,
    {
        let frame = self.paths.frame_path(scene_number);
        if !frame.exists() {
            warn!(scene = scene_number, "Frame missing, skipping scene");
            return Err(SkipReason::MissingFrame(frame));
        }

        let audio = self.paths.audio_path(scene_number);
        if !audio.exists() {
            warn!(scene = scene_number, "Audio missing, skipping scene");
            return Err(SkipReason::MissingAudio(audio));
        }

        let duration = match pipeline.audio_duration(&audio).await {
            Ok(d) if d.is_finite() && d > 0.0 => d,
            Ok(d) => {
                warn!(scene = scene_number, duration = d, "Empty narration, skipping scene");
                return Err(SkipReason::NoDuration(format!("duration {}", d)));
            }
            Err(e) => {
                warn!(scene = scene_number, error = %e, "Could not probe narration, skipping scene");
                return Err(SkipReason::NoDuration(e.to_string()));
            }
        };

        let lines = caption
            .map(|text| wrap_text(text, self.style.max_text_width(), self.style.font_size))
            .unwrap_or_default();
        let filter = build_scene_filter(&lines, &self.style, &self.settings, duration);

        let job = SceneRenderJob {
            scene_number,
            frame,
            audio,
            duration,
            filter,
            output: self.paths.clip_path(scene_number),
        };

        if let Err(e) = pipeline.render_scene(&job).await {
            error!(
                scene = scene_number,
                error = %e,
                stderr = e.stderr().unwrap_or(""),
                "Scene render failed"
            );
            // a partial clip is never listed in the manifest
            remove_files([&job.output]).await;
            return Err(SkipReason::RenderFailed(e.to_string()));
        }

        Ok(RenderedClip {
            scene_number,
            path: job.output,
            duration,
        })
    }
}
