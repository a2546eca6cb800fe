//! Narration through the Deepgram speak API.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reel_media::MediaPipeline;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tracing::info;

use super::{Narration, SpeechSynthesizer};
use crate::error::{WorkerError, WorkerResult};

/// [`SpeechSynthesizer`] writing Deepgram MP3 output and probing its length
/// through the media pipeline.
#[derive(Clone)]
pub struct DeepgramSpeechSynthesizer {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    media: Arc<dyn MediaPipeline>,
}

impl DeepgramSpeechSynthesizer {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
        media: Arc<dyn MediaPipeline>,
    ) -> WorkerResult<Self> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            media,
        })
    }
}

#[async_trait]
impl SpeechSynthesizer for DeepgramSpeechSynthesizer {
    async fn synthesize(&self, text: &str, output: &Path) -> WorkerResult<Narration> {
        if text.trim().is_empty() {
            return Err(WorkerError::speech("empty narration text"));
        }

        let response = self
            .client
            .post(format!("{}/speak", self.base_url))
            .query(&[("model", self.model.as_str())])
            .header("Authorization", format!("Token {}", self.api_key))
            .header(CONTENT_TYPE, "text/plain")
            .body(text.to_string())
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(WorkerError::speech(format!("API returned {}: {}", status, body)));
        }

        let audio = response.bytes().await?;
        if let Some(parent) = output.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(output, &audio).await?;

        let duration = self.media.audio_duration(output).await?;
        info!(duration, bytes = audio.len(), "Narration saved to {}", output.display());

        Ok(Narration {
            path: output.to_path_buf(),
            duration,
        })
    }
}
