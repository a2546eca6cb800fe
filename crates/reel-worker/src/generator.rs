//! End-to-end reel generation.
//!
//! Stages run in order: scrape, script, images, narration + cue file,
//! frames, scene renders, assembly. Scrape, script and assembly failures
//! end the run; an image or narration failure only costs its scene.

use std::path::PathBuf;
use std::sync::Arc;

use reel_media::fs_utils::{ensure_dirs, remove_files};
use reel_media::{
    find_source_image, preprocess_frames, read_cue_file, write_cue_file, FfmpegPipeline,
    MediaPipeline, SceneRenderer, SequenceAssembler, SkippedScene, SubtitleTimeline,
};
use reel_models::{ReelPaths, Scene};
use tracing::Instrument;

use crate::config::ReelConfig;
use crate::error::{WorkerError, WorkerResult};
use crate::logging::RunLogger;
use crate::services::{
    ArticleScraper, DeepgramSpeechSynthesizer, HttpArticleScraper,
    HttpImageFetcher, ImageFetcher, ImageSynthesizer, OpenAiImageSynthesizer,
    OpenAiScriptGenerator, ScriptGenerator, SpeechSynthesizer,
};

/// The external services a run talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub scraper: Arc<dyn ArticleScraper>,
    pub script: Arc<dyn ScriptGenerator>,
    pub images: Arc<dyn ImageSynthesizer>,
    pub fetcher: Arc<dyn ImageFetcher>,
    pub speech: Arc<dyn SpeechSynthesizer>,
    pub media: Arc<dyn MediaPipeline>,
}

impl Collaborators {
    /// Production collaborators: OpenAI, Deepgram and FFmpeg.
    pub fn from_config(config: &ReelConfig) -> WorkerResult<Self> {
        let media: Arc<dyn MediaPipeline> = Arc::new(FfmpegPipeline::new(
            config.render.clone(),
            config.ffmpeg_timeout.as_secs(),
        ));

        Ok(Self {
            scraper: Arc::new(HttpArticleScraper::new(config.http_timeout)?),
            script: Arc::new(OpenAiScriptGenerator::new(
                &config.openai_api_key,
                &config.openai_base_url,
                &config.llm_model,
                config.http_timeout,
            )?),
            images: Arc::new(OpenAiImageSynthesizer::new(
                &config.openai_api_key,
                &config.openai_base_url,
                &config.image_model,
                &config.image_size,
                config.http_timeout,
            )?),
            fetcher: Arc::new(HttpImageFetcher::new(
                config.http_timeout,
                config.image_fetch_attempts,
                config.image_fetch_delay,
            )?),
            speech: Arc::new(DeepgramSpeechSynthesizer::new(
                &config.deepgram_api_key,
                &config.deepgram_base_url,
                &config.tts_model,
                config.http_timeout,
                Arc::clone(&media),
            )?),
            media,
        })
    }
}

/// Summary of a successful run.
#[derive(Debug, Clone)]
pub struct ReelOutcome {
    pub run_id: String,
    pub output: PathBuf,
    /// Scenes in the script
    pub scene_count: usize,
    /// Scenes present in the final video, ascending
    pub rendered: Vec<u32>,
    pub skipped: Vec<SkippedScene>,
    /// Cues written to the cue file
    pub caption_count: usize,
}

pub struct ReelGenerator {
    config: ReelConfig,
    paths: ReelPaths,
    services: Collaborators,
}

impl ReelGenerator {
    pub fn new(config: ReelConfig, services: Collaborators) -> Self {
        let paths = config.paths();
        Self {
            config,
            paths,
            services,
        }
    }

    pub fn paths(&self) -> &ReelPaths {
        &self.paths
    }

    /// Generate a reel for the article at `url`.
    pub async fn run(&self, url: &str) -> WorkerResult<ReelOutcome> {
        let log = RunLogger::new("run");
        let span = log.create_span();
        let result = self.run_stages(url, &log).instrument(span).await;
        if let Err(e) = &result {
            log.log_error(&format!("run failed: {}", e));
        }
        result
    }

    async fn run_stages(&self, url: &str, log: &RunLogger) -> WorkerResult<ReelOutcome> {
        log.log_start(url);
        ensure_dirs(self.paths.directories()).await?;

        let stage = log.stage("scrape");
        let article = self.services.scraper.scrape(url).await?;
        stage.log_completion(&format!("{} characters of article text", article.len()));

        let stage = log.stage("script");
        let scenes = self.services.script.generate(&article).await?;
        if scenes.is_empty() {
            return Err(WorkerError::script("no scenes generated"));
        }
        stage.log_completion(&format!("{} scenes", scenes.len()));

        self.prepare_images(&scenes, &log.stage("images")).await;

        let timeline = self.narrate(&scenes, &log.stage("narration")).await?;
        let caption_count = timeline.captions().len();

        let scene_numbers: Vec<u32> = scenes.iter().map(|s| s.scene_number).collect();

        let stage = log.stage("frames");
        let frames = preprocess_frames(
            &self.paths.raw_images_dir,
            &self.paths.frames_dir,
            &scene_numbers,
            self.config.render.width,
            self.config.render.height,
        )
        .await?;
        stage.log_completion(&format!(
            "{} new, {} reused, {} failed, {} without image",
            frames.processed,
            frames.skipped,
            frames.failed.len(),
            frames.missing.len()
        ));

        let stage = log.stage("render");
        let captions = read_cue_file(&self.paths.cue_file).await?;
        let report = SceneRenderer::new(
            self.paths.clone(),
            self.config.caption_style.clone(),
            self.config.render.clone(),
        )
        .with_max_parallel(self.config.max_render_parallel)
        .render(self.services.media.as_ref(), &scene_numbers, &captions)
        .await?;
        for skipped in &report.skipped {
            stage.log_warning(&format!("scene {} skipped: {}", skipped.scene_number, skipped.reason));
        }

        let stage = log.stage("assemble");
        let output = SequenceAssembler::new(self.paths.clone())
            .assemble(self.services.media.as_ref(), &report.clips)
            .await?;
        stage.log_completion(&output.display().to_string());

        log.log_completion(&format!(
            "{} of {} scenes in {}",
            report.clips.len(),
            scenes.len(),
            output.display()
        ));

        Ok(ReelOutcome {
            run_id: log.run_id().to_string(),
            output,
            scene_count: scenes.len(),
            rendered: report.clips.iter().map(|c| c.scene_number).collect(),
            skipped: report.skipped,
            caption_count,
        })
    }

    /// Generate and download one image per scene, reusing earlier downloads.
    async fn prepare_images(&self, scenes: &[Scene], log: &RunLogger) -> usize {
        let dir = &self.paths.raw_images_dir;
        let mut ready = 0;

        for scene in scenes {
            let n = scene.scene_number;
            if let Some(existing) = find_source_image(dir, n) {
                tracing::debug!(scene = n, "Reusing {}", existing.display());
                ready += 1;
                continue;
            }

            let result = async {
                let url = self.services.images.generate(&scene.image_prompt).await?;
                self.services.fetcher.fetch(&url, dir, n).await
            }
            .await;

            match result {
                Ok(_) => ready += 1,
                Err(e) => log.log_warning(&format!("scene {} has no image: {}", n, e)),
            }
        }

        log.log_completion(&format!("{} of {} images ready", ready, scenes.len()));
        ready
    }

    /// Narrate every scene and write the cue file.
    async fn narrate(&self, scenes: &[Scene], log: &RunLogger) -> WorkerResult<SubtitleTimeline> {
        let mut timeline = SubtitleTimeline::new();

        for scene in scenes {
            let n = scene.scene_number;
            let audio = self.paths.audio_path(n);

            let duration = match self.services.speech.synthesize(&scene.text, &audio).await {
                Ok(narration) => Some(narration.duration),
                Err(e) => {
                    log.log_warning(&format!("scene {} has no narration: {}", n, e));
                    // a leftover file from an earlier run must not be rendered
                    remove_files([&audio]).await;
                    None
                }
            };
            timeline.push(n, &scene.text, duration);
        }

        write_cue_file(&self.paths.cue_file, timeline.captions()).await?;
        log.log_completion(&format!(
            "{} captions, {:.3}s of narration",
            timeline.captions().len(),
            timeline.total_duration()
        ));
        Ok(timeline)
    }
}
