//! Timed captions and caption style policy.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::encoding::CANVAS_WIDTH;
use crate::error::ModelError;

/// A single timed subtitle entry.
///
/// `index` carries the scene number so captions can be matched to scenes
/// even when earlier scenes were skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedCaption {
    pub index: u32,
    /// Start offset in seconds
    pub start: f64,
    /// End offset in seconds
    pub end: f64,
    pub text: String,
}

impl TimedCaption {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Vertical placement of the caption block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CaptionAlignment {
    Top,
    Center,
    #[default]
    Bottom,
}

impl CaptionAlignment {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaptionAlignment::Top => "top",
            CaptionAlignment::Center => "center",
            CaptionAlignment::Bottom => "bottom",
        }
    }
}

impl fmt::Display for CaptionAlignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CaptionAlignment {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "top" => Ok(CaptionAlignment::Top),
            "center" => Ok(CaptionAlignment::Center),
            "bottom" => Ok(CaptionAlignment::Bottom),
            _ => Err(ModelError::UnknownAlignment(s.to_string())),
        }
    }
}

/// Caption style shared by the layout engine and the scene renderer.
///
/// Use the builder methods to override defaults:
/// ```
/// use reel_models::{CaptionAlignment, CaptionStyle};
/// let style = CaptionStyle::default()
///     .with_alignment(CaptionAlignment::Top)
///     .with_font_size(44);
/// assert_eq!(style.font_size, 44);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionStyle {
    /// Burn captions into the clips at all
    pub enabled: bool,
    pub font_size: u32,
    pub font_color: String,
    /// Optional TTF/OTF file for drawtext; engine default when unset
    pub font_file: Option<String>,
    pub line_spacing: u32,
    /// Top margin for `top`, extra bottom margin for `bottom`
    pub margin: u32,
    pub bottom_gap: u32,
    pub alignment: CaptionAlignment,
    /// Horizontal position expression (drawtext syntax)
    pub x_expression: String,
    pub box_color: String,
    pub box_border: u32,
    /// Horizontal padding subtracted from the canvas width before reflow
    pub side_padding: u32,
}

impl Default for CaptionStyle {
    fn default() -> Self {
        Self {
            enabled: true,
            font_size: 50,
            font_color: "white".to_string(),
            font_file: None,
            line_spacing: 20,
            margin: 30,
            bottom_gap: 60,
            alignment: CaptionAlignment::Bottom,
            x_expression: "(w-tw)/2".to_string(),
            box_color: "black@0.5".to_string(),
            box_border: 5,
            side_padding: 40,
        }
    }
}

impl CaptionStyle {
    pub fn with_alignment(mut self, alignment: CaptionAlignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn with_font_size(mut self, font_size: u32) -> Self {
        self.font_size = font_size;
        self
    }

    pub fn with_font_file(mut self, font_file: impl Into<String>) -> Self {
        self.font_file = Some(font_file.into());
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Nominal text width available on the canvas (1080 - 40 = 1040).
    pub fn max_text_width(&self) -> u32 {
        CANVAS_WIDTH.saturating_sub(self.side_padding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alignment_parse() {
        assert_eq!("top".parse::<CaptionAlignment>().unwrap(), CaptionAlignment::Top);
        assert_eq!(" Center ".parse::<CaptionAlignment>().unwrap(), CaptionAlignment::Center);
        assert_eq!("BOTTOM".parse::<CaptionAlignment>().unwrap(), CaptionAlignment::Bottom);
    }

    #[test]
    fn test_alignment_rejects_unknown_values() {
        let err = "middle".parse::<CaptionAlignment>().unwrap_err();
        assert_eq!(err, ModelError::UnknownAlignment("middle".to_string()));
        assert!("".parse::<CaptionAlignment>().is_err());
    }

    #[test]
    fn test_default_style_matches_vertical_canvas() {
        let style = CaptionStyle::default();
        assert_eq!(style.max_text_width(), 1040);
        assert_eq!(style.alignment, CaptionAlignment::Bottom);
        assert!(style.enabled);
    }
}
