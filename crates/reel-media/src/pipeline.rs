//! Media engine abstraction.
//!
//! The renderer and assembler only talk to a [`MediaPipeline`]; the FFmpeg
//! implementation lives here, and tests substitute a recording fake.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use reel_models::RenderSettings;
use tracing::{debug, info};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::MediaResult;
use crate::probe::probe_duration;

/// Everything needed to render one scene clip.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneRenderJob {
    pub scene_number: u32,
    /// Letterboxed still
    pub frame: PathBuf,
    /// Narration audio
    pub audio: PathBuf,
    /// Clip length in seconds (the narration duration)
    pub duration: f64,
    /// Complete `-vf` value
    pub filter: String,
    pub output: PathBuf,
}

/// Operations the reel needs from a media engine.
#[async_trait]
pub trait MediaPipeline: Send + Sync {
    /// Duration of an audio file in seconds.
    async fn audio_duration(&self, path: &Path) -> MediaResult<f64>;

    /// Render a still + audio + filter into a clip at `job.output`.
    async fn render_scene(&self, job: &SceneRenderJob) -> MediaResult<()>;

    /// Concatenate the clips listed in `manifest` into `output` without
    /// re-encoding.
    async fn concat(&self, manifest: &Path, output: &Path) -> MediaResult<()>;
}

/// [`MediaPipeline`] backed by the `ffmpeg` and `ffprobe` binaries.
#[derive(Debug, Clone)]
pub struct FfmpegPipeline {
    settings: RenderSettings,
    timeout_secs: u64,
}

impl FfmpegPipeline {
    pub fn new(settings: RenderSettings, timeout_secs: u64) -> Self {
        Self {
            settings,
            timeout_secs,
        }
    }

    fn runner(&self) -> FfmpegRunner {
        FfmpegRunner::new().with_timeout(self.timeout_secs)
    }

    /// Render command for a scene job.
    pub fn render_command(&self, job: &SceneRenderJob) -> FfmpegCommand {
        let s = &self.settings;
        FfmpegCommand::new(&job.output)
            .looped_still(&job.frame, job.duration)
            .input(&job.audio)
            .video_filter(&job.filter)
            .video_codec(&s.video_codec)
            .audio_codec(&s.audio_codec)
            .audio_bitrate(&s.audio_bitrate)
            .pixel_format(&s.pixel_format)
            .shortest()
            .avoid_negative_ts()
            .frame_rate(s.frame_rate)
    }

    /// Stream-copy concat command.
    pub fn concat_command(&self, manifest: &Path, output: &Path) -> FfmpegCommand {
        FfmpegCommand::new(output).concat_list(manifest).codec_copy()
    }
}

#[async_trait]
impl MediaPipeline for FfmpegPipeline {
    async fn audio_duration(&self, path: &Path) -> MediaResult<f64> {
        probe_duration(path, Some(Duration::from_secs(self.timeout_secs))).await
    }

    async fn render_scene(&self, job: &SceneRenderJob) -> MediaResult<()> {
        debug!(
            scene = job.scene_number,
            duration = job.duration,
            "Rendering scene clip {}",
            job.output.display()
        );
        self.runner().run(&self.render_command(job)).await
    }

    async fn concat(&self, manifest: &Path, output: &Path) -> MediaResult<()> {
        info!("Concatenating clips from {} into {}", manifest.display(), output.display());
        self.runner().run(&self.concat_command(manifest, output)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job() -> SceneRenderJob {
        SceneRenderJob {
            scene_number: 2,
            frame: PathBuf::from("/w/images_processed/image2.jpg"),
            audio: PathBuf::from("/w/audios/scene2.mp3"),
            duration: 4.8,
            filter: "null,fade=t=in:st=0:d=1,fade=t=out:st=3.8:d=1".to_string(),
            output: PathBuf::from("/w/clips/temp_scene_2.mp4"),
        }
    }

    #[test]
    fn test_render_command_args() {
        let pipeline = FfmpegPipeline::new(RenderSettings::default(), 600);
        let args = pipeline.render_command(&job()).build_args();

        assert_eq!(
            args,
            vec![
                "-y",
                "-v",
                "error",
                "-loop",
                "1",
                "-t",
                "4.8",
                "-i",
                "/w/images_processed/image2.jpg",
                "-i",
                "/w/audios/scene2.mp3",
                "-vf",
                "null,fade=t=in:st=0:d=1,fade=t=out:st=3.8:d=1",
                "-c:v",
                "libx264",
                "-c:a",
                "aac",
                "-b:a",
                "384k",
                "-pix_fmt",
                "yuv420p",
                "-shortest",
                "-avoid_negative_ts",
                "make_zero",
                "-r",
                "30",
                "/w/clips/temp_scene_2.mp4",
            ]
        );
    }

    #[test]
    fn test_concat_command_args() {
        let pipeline = FfmpegPipeline::new(RenderSettings::default(), 600);
        let args = pipeline
            .concat_command(Path::new("/w/clips/concat_list.txt"), Path::new("/out/final.mp4"))
            .build_args();

        assert_eq!(
            args,
            vec![
                "-y",
                "-v",
                "error",
                "-f",
                "concat",
                "-safe",
                "0",
                "-i",
                "/w/clips/concat_list.txt",
                "-c",
                "copy",
                "/out/final.mp4",
            ]
        );
    }
}
