//! Worker error types.

use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Scrape failed: {0}")]
    Scrape(String),

    #[error("Script generation failed: {0}")]
    Script(String),

    #[error("Image generation failed: {0}")]
    ImageGeneration(String),

    #[error("Download failed: {0}")]
    Download(String),

    #[error("Speech synthesis failed: {0}")]
    Speech(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Media error: {0}")]
    Media(#[from] reel_media::MediaError),

    #[error("Model error: {0}")]
    Model(#[from] reel_models::ModelError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkerError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn scrape(msg: impl Into<String>) -> Self {
        Self::Scrape(msg.into())
    }

    pub fn script(msg: impl Into<String>) -> Self {
        Self::Script(msg.into())
    }

    pub fn image_generation(msg: impl Into<String>) -> Self {
        Self::ImageGeneration(msg.into())
    }

    pub fn download(msg: impl Into<String>) -> Self {
        Self::Download(msg.into())
    }

    pub fn speech(msg: impl Into<String>) -> Self {
        Self::Speech(msg.into())
    }

    /// Check if error is worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            WorkerError::Download(_) => true,
            WorkerError::Http(e) => {
                e.is_timeout()
                    || e.is_connect()
                    || e.status().map(|s| s.is_server_error()).unwrap_or(false)
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(WorkerError::download("status 503").is_retryable());
        assert!(!WorkerError::config("missing key").is_retryable());
        assert!(!WorkerError::Media(reel_media::MediaError::EmptyManifest).is_retryable());
    }
}
