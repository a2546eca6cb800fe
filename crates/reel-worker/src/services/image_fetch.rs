//! Downloading generated images into the raw image directory.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use reel_media::frames::RASTER_EXTENSIONS;
use reel_models::ReelPaths;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tracing::{debug, info};

use super::ImageFetcher;
use crate::error::{WorkerError, WorkerResult};
use crate::retry::{retry_async, RetryConfig};

/// File extension for an image `Content-Type`.
pub(crate) fn extension_for_content_type(content_type: &str) -> Option<&'static str> {
    let mime = content_type.split(';').next()?.trim().to_lowercase();
    match mime.as_str() {
        "image/jpeg" | "image/jpg" | "image/pjpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

/// Raster extension of the URL path, if it has one.
fn extension_from_url(url: &str) -> Option<String> {
    let path = url::Url::parse(url).ok()?.path().to_string();
    let ext = Path::new(&path).extension()?.to_str()?.to_lowercase();
    RASTER_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

/// [`ImageFetcher`] over HTTP with bounded retries.
#[derive(Debug, Clone)]
pub struct HttpImageFetcher {
    client: Client,
    retry: RetryConfig,
}

impl HttpImageFetcher {
    pub fn new(timeout: Duration, max_attempts: u32, delay: Duration) -> WorkerResult<Self> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            retry: RetryConfig::new("image_fetch")
                .with_max_attempts(max_attempts)
                .with_delay(delay),
        })
    }

    async fn download_once(&self, url: &str) -> WorkerResult<(Vec<u8>, Option<String>)> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(WorkerError::download(format!("{} returned HTTP {}", url, status)));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(WorkerError::download(format!("{} returned an empty body", url)));
        }
        Ok((bytes.to_vec(), content_type))
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str, dir: &Path, scene_number: u32) -> WorkerResult<PathBuf> {
        let (bytes, content_type) = retry_async(
            &self.retry,
            || self.download_once(url),
            WorkerError::is_retryable,
        )
        .await
        .into_result()?;

        let extension = content_type
            .as_deref()
            .and_then(extension_for_content_type)
            .map(str::to_string)
            .or_else(|| extension_from_url(url))
            .unwrap_or_else(|| "png".to_string());
        debug!(scene = scene_number, content_type = ?content_type, extension = %extension, "Image downloaded");

        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(format!("{}.{}", ReelPaths::raw_image_stem(scene_number), extension));
        tokio::fs::write(&path, &bytes).await?;

        info!(scene = scene_number, bytes = bytes.len(), "Saved image {}", path.display());
        Ok(path)
    }
}
