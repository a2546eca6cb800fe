//! Vertical placement of wrapped captions.

use reel_models::{CaptionAlignment, CaptionStyle};

/// Vertical positions of a wrapped caption block, in pixels from the top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionLayout {
    pub line_count: usize,
    pub vertical_start: i64,
    /// y of each line, top to bottom
    pub line_offsets: Vec<i64>,
}

/// Height of `line_count` lines with `spacing` between consecutive lines.
pub fn block_height(line_count: usize, font_size: u32, spacing: u32) -> i64 {
    if line_count == 0 {
        return 0;
    }
    let n = line_count as i64;
    n * font_size as i64 + (n - 1) * spacing as i64
}

/// y of the first line for the style's alignment.
pub fn vertical_start(line_count: usize, style: &CaptionStyle, canvas_height: u32) -> i64 {
    let height = canvas_height as i64;
    let block = block_height(line_count, style.font_size, style.line_spacing);

    match style.alignment {
        CaptionAlignment::Top => style.margin as i64,
        CaptionAlignment::Center => (height - block).div_euclid(2),
        CaptionAlignment::Bottom => {
            height - block - style.margin as i64 - style.bottom_gap as i64
        }
    }
}

/// Full layout: start offset plus one offset per line.
pub fn compute_layout(line_count: usize, style: &CaptionStyle, canvas_height: u32) -> CaptionLayout {
    let vertical_start = vertical_start(line_count, style, canvas_height);
    let step = style.font_size as i64 + style.line_spacing as i64;

    CaptionLayout {
        line_count,
        vertical_start,
        line_offsets: (0..line_count as i64).map(|i| vertical_start + i * step).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style(alignment: CaptionAlignment) -> CaptionStyle {
        CaptionStyle::default().with_alignment(alignment)
    }

    #[test]
    fn test_bottom_three_lines() {
        // 1920 - (150 + 40) - 30 - 60
        let layout = compute_layout(3, &style(CaptionAlignment::Bottom), 1920);
        assert_eq!(layout.vertical_start, 1640);
        assert_eq!(layout.line_offsets, vec![1640, 1710, 1780]);
    }

    #[test]
    fn test_bottom_moves_up_as_lines_grow() {
        let s = style(CaptionAlignment::Bottom);
        let starts: Vec<i64> = (1..=6).map(|n| vertical_start(n, &s, 1920)).collect();
        assert!(starts.windows(2).all(|w| w[1] < w[0]));
    }

    #[test]
    fn test_top_is_constant() {
        let s = style(CaptionAlignment::Top);
        for n in 1..=6 {
            assert_eq!(vertical_start(n, &s, 1920), 30);
        }
    }

    #[test]
    fn test_center_floors() {
        let s = style(CaptionAlignment::Center);
        // (1920 - 50) / 2
        assert_eq!(vertical_start(1, &s, 1920), 935);
        // (1921 - 120) / 2 = 900.5
        assert_eq!(vertical_start(2, &s, 1921), 900);
    }

    #[test]
    fn test_block_height() {
        assert_eq!(block_height(0, 50, 20), 0);
        assert_eq!(block_height(1, 50, 20), 50);
        assert_eq!(block_height(3, 50, 20), 190);
    }

    #[test]
    fn test_unknown_alignment_is_rejected_not_defaulted() {
        assert!("middle".parse::<CaptionAlignment>().is_err());
    }
}
