//! Image synthesis through the OpenAI images API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::ImageSynthesizer;
use crate::error::{WorkerError, WorkerResult};

#[derive(Debug, Serialize)]
struct ImageRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u32,
    size: &'a str,
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    #[serde(default)]
    data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    url: Option<String>,
}

/// [`ImageSynthesizer`] backed by an OpenAI-compatible images endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiImageSynthesizer {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    size: String,
}

impl OpenAiImageSynthesizer {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
        size: impl Into<String>,
        timeout: Duration,
    ) -> WorkerResult<Self> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            size: size.into(),
        })
    }
}

#[async_trait]
impl ImageSynthesizer for OpenAiImageSynthesizer {
    async fn generate(&self, prompt: &str) -> WorkerResult<String> {
        if prompt.trim().is_empty() {
            return Err(WorkerError::image_generation("empty image prompt"));
        }

        info!(model = %self.model, size = %self.size, "Generating image");

        let response = self
            .client
            .post(format!("{}/images/generations", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&ImageRequest {
                model: &self.model,
                prompt,
                n: 1,
                size: &self.size,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(WorkerError::image_generation(format!(
                "API returned {}: {}",
                status, body
            )));
        }

        let body: ImageResponse = response.json().await?;
        body.data
            .into_iter()
            .next()
            .and_then(|d| d.url)
            .ok_or_else(|| WorkerError::image_generation("response has no image URL"))
    }
}
