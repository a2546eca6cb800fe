//! Video filter graphs for scene clips.
//!
//! A scene filter is a chain of one `drawtext` per caption line (or the
//! `null` pass-through when there is nothing to draw) followed by a
//! fade-in and a fade-out.

use reel_models::{CaptionStyle, RenderSettings};

use crate::layout::compute_layout;

/// Escape text for use inside a single-quoted drawtext `text=` value.
pub fn escape_drawtext(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('\'', "'\\''")
        .replace(':', "\\:")
        .replace('%', "\\%")
}

fn escape_filter_path(path: &str) -> String {
    path.replace('\\', "\\\\").replace('\'', "\\'").replace(':', "\\:")
}

/// One drawtext filter drawing `line` at `y` for the first `duration` seconds.
pub fn drawtext_line(line: &str, y: i64, style: &CaptionStyle, duration: f64) -> String {
    let font = style
        .font_file
        .as_deref()
        .map(|f| format!("fontfile='{}':", escape_filter_path(f)))
        .unwrap_or_default();

    format!(
        "drawtext={}text='{}':fontcolor={}:fontsize={}:box=1:boxcolor={}:boxborderw={}:x={}:y={}:line_spacing={}:fix_bounds=true:enable='between(t,0,{})'",
        font,
        escape_drawtext(line),
        style.font_color,
        style.font_size,
        style.box_color,
        style.box_border,
        style.x_expression,
        y,
        style.line_spacing,
        duration
    )
}

/// Drawtext chain for wrapped caption lines, `None` when nothing is drawn.
pub fn build_caption_filter(
    lines: &[String],
    style: &CaptionStyle,
    canvas_height: u32,
    duration: f64,
) -> Option<String> {
    if !style.enabled || lines.is_empty() {
        return None;
    }

    let layout = compute_layout(lines.len(), style, canvas_height);
    Some(
        lines
            .iter()
            .zip(layout.line_offsets)
            .map(|(line, y)| drawtext_line(line, y, style, duration))
            .collect::<Vec<_>>()
            .join(","),
    )
}

/// Fade in at 0 and fade out ending at `duration`.
///
/// For clips shorter than the fade length the fade-out starts at 0.
pub fn fade_filters(duration: f64, settings: &RenderSettings) -> String {
    format!(
        "fade=t=in:st=0:d={fade},fade=t=out:st={start}:d={fade}",
        fade = settings.fade_secs,
        start = settings.fade_out_start(duration)
    )
}

/// Complete `-vf` value for a scene clip.
pub fn build_scene_filter(
    lines: &[String],
    style: &CaptionStyle,
    settings: &RenderSettings,
    duration: f64,
) -> String {
    let base = build_caption_filter(lines, style, settings.height, duration)
        .unwrap_or_else(|| "null".to_string());
    format!("{},{}", base, fade_filters(duration, settings))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_escape_drawtext() {
        assert_eq!(escape_drawtext("It's 5:00"), "It'\\''s 5\\:00");
        assert_eq!(escape_drawtext("100%"), "100\\%");
        assert_eq!(escape_drawtext("plain"), "plain");
    }

    #[test]
    fn test_no_captions_uses_null() {
        let filter = build_scene_filter(&[], &CaptionStyle::default(), &RenderSettings::default(), 3.2);
        assert_eq!(filter, "null,fade=t=in:st=0:d=1,fade=t=out:st=2.2:d=1");
    }

    #[test]
    fn test_disabled_captions_use_null() {
        let style = CaptionStyle::default().with_enabled(false);
        let filter = build_scene_filter(&lines(&["hello"]), &style, &RenderSettings::default(), 4.0);
        assert!(filter.starts_with("null,"));
        assert!(!filter.contains("drawtext"));
    }

    #[test]
    fn test_short_clip_fade_out_clamped() {
        let filter = fade_filters(0.6, &RenderSettings::default());
        assert_eq!(filter, "fade=t=in:st=0:d=1,fade=t=out:st=0:d=1");
    }

    #[test]
    fn test_drawtext_per_line_at_layout_offsets() {
        let filter = build_scene_filter(
            &lines(&["first", "second", "third"]),
            &CaptionStyle::default(),
            &RenderSettings::default(),
            5.0,
        );

        assert_eq!(filter.matches("drawtext=").count(), 3);
        assert!(filter.contains("text='first'"));
        assert!(filter.contains(":y=1640:"));
        assert!(filter.contains(":y=1710:"));
        assert!(filter.contains(":y=1780:"));
        assert!(filter.contains("enable='between(t,0,5)'"));
        assert!(filter.contains("x=(w-tw)/2"));
        assert!(filter.ends_with("fade=t=in:st=0:d=1,fade=t=out:st=4:d=1"));
    }

    #[test]
    fn test_drawtext_font_file() {
        let style = CaptionStyle::default().with_font_file("/fonts/Bold.ttf");
        let line = drawtext_line("hi", 100, &style, 2.0);
        assert!(line.starts_with("drawtext=fontfile='/fonts/Bold.ttf':text='hi'"));
        assert!(line.contains("fontcolor=white:fontsize=50:box=1:boxcolor=black@0.5:boxborderw=5"));
    }
}
