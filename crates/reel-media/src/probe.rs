//! FFprobe duration lookup for narration audio.

use serde::Deserialize;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use crate::command::check_ffprobe;
use crate::error::{MediaError, MediaResult};

/// FFprobe JSON output format.
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: FfprobeFormat,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

/// Probe the duration of a media file in seconds.
pub async fn probe_duration(path: impl AsRef<Path>, timeout: Option<Duration>) -> MediaResult<f64> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(MediaError::FileNotFound(path.to_path_buf()));
    }

    check_ffprobe()?;

    let child = Command::new("ffprobe")
        .args(["-v", "quiet", "-print_format", "json", "-show_format"])
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()?;

    let output = match timeout {
        Some(limit) => tokio::time::timeout(limit, child.wait_with_output())
            .await
            .map_err(|_| MediaError::Timeout(limit.as_secs()))??,
        None => child.wait_with_output().await?,
    };

    if !output.status.success() {
        return Err(MediaError::FfprobeFailed {
            message: format!("FFprobe failed for {}", path.display()),
            stderr: Some(String::from_utf8_lossy(&output.stderr).to_string()),
        });
    }

    parse_duration(&output.stdout)
}

/// Extract `format.duration` from FFprobe JSON.
fn parse_duration(stdout: &[u8]) -> MediaResult<f64> {
    let probe: FfprobeOutput = serde_json::from_slice(stdout)?;

    probe
        .format
        .duration
        .as_deref()
        .and_then(|d| d.trim().parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d >= 0.0)
        .ok_or_else(|| MediaError::FfprobeFailed {
            message: "No duration in FFprobe output".to_string(),
            stderr: None,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration() {
        let json = br#"{"format":{"filename":"scene1.mp3","duration":"3.204000"}}"#;
        assert!((parse_duration(json).unwrap() - 3.204).abs() < 1e-9);
    }

    #[test]
    fn test_parse_duration_missing() {
        assert!(parse_duration(br#"{"format":{}}"#).is_err());
        assert!(parse_duration(br#"{"format":{"duration":"N/A"}}"#).is_err());
        assert!(parse_duration(b"not json").is_err());
    }

    #[tokio::test]
    async fn test_probe_missing_file() {
        let result = probe_duration("/nonexistent/scene9.mp3", None).await;
        assert!(matches!(result, Err(MediaError::FileNotFound(_))));
    }
}
