//! Subtitle timeline building and SRT cue files.
//!
//! Captions are laid end to end: each one starts where the previous one
//! ended, and the running clock only advances for scenes that actually
//! produced narration.

use std::path::Path;

use reel_models::timestamp::{format_cue_timestamp, parse_cue_timestamp};
use reel_models::TimedCaption;
use tracing::{debug, info, warn};

use crate::error::{MediaError, MediaResult};

/// Incrementally built, gap-free caption timeline.
#[derive(Debug, Clone, Default)]
pub struct SubtitleTimeline {
    captions: Vec<TimedCaption>,
    clock: f64,
}

impl SubtitleTimeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the narration of one scene.
    ///
    /// A scene without a usable duration (synthesis failed, or the audio
    /// is empty) is skipped: it gets no cue and does not move the clock.
    pub fn push(
        &mut self,
        scene_number: u32,
        text: &str,
        duration: Option<f64>,
    ) -> Option<&TimedCaption> {
        let duration = match duration {
            Some(d) if d.is_finite() && d > 0.0 => d,
            other => {
                warn!(
                    scene = scene_number,
                    duration = ?other,
                    "No narration duration, leaving scene out of the subtitles"
                );
                return None;
            }
        };

        let start = self.clock;
        let end = start + duration;
        self.clock = end;

        debug!(scene = scene_number, start, end, "Timed caption");
        self.captions.push(TimedCaption {
            index: scene_number,
            start,
            end,
            text: normalize_text(text),
        });
        self.captions.last()
    }

    pub fn captions(&self) -> &[TimedCaption] {
        &self.captions
    }

    /// End of the last caption.
    pub fn total_duration(&self) -> f64 {
        self.clock
    }

    pub fn is_empty(&self) -> bool {
        self.captions.is_empty()
    }

    /// Serialize to SRT.
    pub fn to_srt(&self) -> String {
        render_cues(&self.captions)
    }
}

/// Captions are single-line in the cue file; reflow happens at render time.
fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Serialize captions as `{index}\n{start} --> {end}\n{text}\n\n` blocks.
pub fn render_cues(captions: &[TimedCaption]) -> String {
    let mut out = String::new();
    for caption in captions {
        out.push_str(&format!(
            "{}\n{} --> {}\n{}\n\n",
            caption.index,
            format_cue_timestamp(caption.start),
            format_cue_timestamp(caption.end),
            normalize_text(&caption.text)
        ));
    }
    out
}

/// Write captions to a cue file, replacing any previous file.
pub async fn write_cue_file(path: impl AsRef<Path>, captions: &[TimedCaption]) -> MediaResult<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, render_cues(captions)).await?;
    info!("Cue file written: {} ({} captions)", path.display(), captions.len());
    Ok(())
}

/// Read and parse a cue file.
pub async fn read_cue_file(path: impl AsRef<Path>) -> MediaResult<Vec<TimedCaption>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(MediaError::FileNotFound(path.to_path_buf()));
    }
    let content = tokio::fs::read_to_string(path).await?;
    parse_cue_file(&content)
}

/// Parse SRT content. Multi-line caption text is joined with spaces.
pub fn parse_cue_file(content: &str) -> MediaResult<Vec<TimedCaption>> {
    let content = content.trim_start_matches('\u{feff}').replace("\r\n", "\n");

    let mut captions = Vec::new();
    let mut block: Vec<&str> = Vec::new();

    for line in content.lines().chain(std::iter::once("")) {
        if line.trim().is_empty() {
            if !block.is_empty() {
                captions.push(parse_block(&block)?);
                block.clear();
            }
        } else {
            block.push(line);
        }
    }

    Ok(captions)
}

fn parse_block(lines: &[&str]) -> MediaResult<TimedCaption> {
    let index: u32 = lines[0]
        .trim()
        .parse()
        .map_err(|_| MediaError::invalid_cue(format!("bad cue index '{}'", lines[0])))?;

    let timing = lines
        .get(1)
        .ok_or_else(|| MediaError::invalid_cue(format!("cue {} has no timing line", index)))?;
    let (start, end) = timing
        .split_once("-->")
        .ok_or_else(|| MediaError::invalid_cue(format!("cue {} timing '{}'", index, timing)))?;

    let start = parse_cue_timestamp(start)?;
    let end = parse_cue_timestamp(end)?;
    if end < start {
        return Err(MediaError::invalid_cue(format!("cue {} ends before it starts", index)));
    }

    Ok(TimedCaption {
        index,
        start,
        end,
        text: lines[2..].iter().map(|l| l.trim()).collect::<Vec<_>>().join(" "),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_scene_timeline() {
        let mut timeline = SubtitleTimeline::new();
        timeline.push(1, "Markets rallied today.", Some(3.2));
        timeline.push(2, "Analysts expect more gains.", Some(4.8));

        assert_eq!(
            timeline.to_srt(),
            "1\n00:00:00,000 --> 00:00:03,200\nMarkets rallied today.\n\n\
             2\n00:00:03,200 --> 00:00:08,000\nAnalysts expect more gains.\n\n"
        );
    }

    #[test]
    fn test_captions_are_contiguous() {
        let durations = [0.5, 2.25, 7.0, 0.001, 13.37];
        let mut timeline = SubtitleTimeline::new();
        for (i, d) in durations.iter().enumerate() {
            timeline.push(i as u32 + 1, "text", Some(*d));
        }

        let mut expected_start = 0.0;
        for (caption, d) in timeline.captions().iter().zip(durations) {
            assert_eq!(caption.start, expected_start);
            assert_eq!(caption.end, caption.start + d);
            assert!(caption.end > caption.start);
            expected_start = caption.end;
        }
        assert_eq!(timeline.total_duration(), expected_start);
    }

    #[test]
    fn test_scene_without_duration_is_skipped() {
        let mut timeline = SubtitleTimeline::new();
        timeline.push(1, "one", Some(2.0));
        assert!(timeline.push(2, "two", None).is_none());
        assert!(timeline.push(3, "three", Some(0.0)).is_none());
        timeline.push(4, "four", Some(1.5));

        let captions = timeline.captions();
        assert_eq!(captions.len(), 2);
        assert_eq!(captions[1].index, 4);
        assert_eq!(captions[1].start, 2.0);
        assert_eq!(captions[1].end, 3.5);
    }

    #[test]
    fn test_newlines_flattened_in_cue_text() {
        let mut timeline = SubtitleTimeline::new();
        timeline.push(1, "line one\nline  two ", Some(1.0));
        assert_eq!(timeline.captions()[0].text, "line one line two");
    }

    #[test]
    fn test_parse_round_trip() {
        let mut timeline = SubtitleTimeline::new();
        timeline.push(1, "Breaking: rates cut", Some(3.2));
        timeline.push(3, "It's official", Some(4.8));

        let parsed = parse_cue_file(&timeline.to_srt()).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].index, 1);
        assert_eq!(parsed[1].index, 3);
        assert_eq!(parsed[1].text, "It's official");
        assert!((parsed[1].start - 3.2).abs() < 1e-9);
        assert!((parsed[1].end - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_parse_multiline_and_crlf() {
        let srt = "\u{feff}1\r\n00:00:00,000 --> 00:00:01,500\r\nfirst\r\nsecond\r\n\r\n";
        let parsed = parse_cue_file(srt).unwrap();
        assert_eq!(parsed[0].text, "first second");
        assert!((parsed[0].end - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_parse_rejects_malformed_blocks() {
        assert!(parse_cue_file("x\n00:00:00,000 --> 00:00:01,000\nhi\n").is_err());
        assert!(parse_cue_file("1\nhi there\n").is_err());
        assert!(parse_cue_file("1\n00:00:02,000 --> 00:00:01,000\nhi\n").is_err());
        assert!(parse_cue_file("").unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_write_then_read_cue_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("subtitles.srt");

        let mut timeline = SubtitleTimeline::new();
        timeline.push(1, "hello", Some(1.25));
        write_cue_file(&path, timeline.captions()).await.unwrap();

        let captions = read_cue_file(&path).await.unwrap();
        assert_eq!(captions.len(), 1);
        assert_eq!(captions[0].text, "hello");
    }
}
