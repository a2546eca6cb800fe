//! External collaborators of the reel generator.
//!
//! Each collaborator sits behind a trait so the orchestrator can be driven
//! by fakes. A failure is an `Err`; the orchestrator decides whether it is
//! fatal (scrape, script) or only costs one scene (image, narration).

mod article;
mod image_fetch;
mod image_gen;
mod script;
mod tts;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use reel_models::Scene;

use crate::error::WorkerResult;

pub use article::{html_to_text, HttpArticleScraper};
pub use image_fetch::HttpImageFetcher;
pub use image_gen::OpenAiImageSynthesizer;
pub use script::{OpenAiScriptGenerator, SCRIPT_SYSTEM_PROMPT};
pub use tts::DeepgramSpeechSynthesizer;

/// Narration written to disk.
#[derive(Debug, Clone, PartialEq)]
pub struct Narration {
    pub path: PathBuf,
    /// Seconds
    pub duration: f64,
}

#[async_trait]
pub trait ArticleScraper: Send + Sync {
    /// Readable text of the article at `url`.
    async fn scrape(&self, url: &str) -> WorkerResult<String>;
}

#[async_trait]
pub trait ScriptGenerator: Send + Sync {
    /// Scenes for the article, validated and sorted by scene number.
    async fn generate(&self, article: &str) -> WorkerResult<Vec<Scene>>;
}

#[async_trait]
pub trait ImageSynthesizer: Send + Sync {
    /// Remote URL of an image generated for `prompt`.
    async fn generate(&self, prompt: &str) -> WorkerResult<String>;
}

#[async_trait]
pub trait ImageFetcher: Send + Sync {
    /// Download `url` into `dir` as the raw image of `scene_number`.
    async fn fetch(&self, url: &str, dir: &Path, scene_number: u32) -> WorkerResult<PathBuf>;
}

#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Narrate `text` into the audio file at `output`.
    async fn synthesize(&self, text: &str, output: &Path) -> WorkerResult<Narration>;
}
