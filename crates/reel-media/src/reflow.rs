//! Caption reflow using an approximate glyph-width model.
//!
//! No font metrics are loaded. Each character is assumed to be 0.6 em wide
//! and each word carries a 0.3 em trailing space; only 80% of the nominal
//! width is used so render-time overshoot never clips a line.

/// Share of the nominal width that text may occupy.
pub const EFFECTIVE_WIDTH_RATIO: f64 = 0.8;
/// Estimated character width as a fraction of the font size.
pub const CHAR_WIDTH_RATIO: f64 = 0.6;
/// Estimated space width as a fraction of the font size.
pub const SPACE_WIDTH_RATIO: f64 = 0.3;

/// Usable width for a nominal `max_width`.
pub fn effective_width(max_width: u32) -> f64 {
    max_width as f64 * EFFECTIVE_WIDTH_RATIO
}

/// Estimated width of a word including its trailing space.
pub fn estimate_width(word: &str, font_size: u32) -> f64 {
    let font_size = font_size as f64;
    word.chars().count() as f64 * CHAR_WIDTH_RATIO * font_size + SPACE_WIDTH_RATIO * font_size
}

/// Estimated width of a line of space-separated words.
pub fn estimate_line_width(line: &str, font_size: u32) -> f64 {
    line.split_whitespace().map(|w| estimate_width(w, font_size)).sum()
}

/// Greedily pack words into lines that fit within the effective width.
///
/// A single word wider than the effective width gets a line of its own; it
/// is never split.
pub fn wrap_text(text: &str, max_width: u32, font_size: u32) -> Vec<String> {
    let limit = effective_width(max_width);

    let mut lines = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut current_width = 0.0;

    for word in text.split_whitespace() {
        let word_width = estimate_width(word, font_size);

        if current_width + word_width <= limit {
            current.push(word);
            current_width += word_width;
        } else {
            if !current.is_empty() {
                lines.push(current.join(" "));
            }
            current = vec![word];
            current_width = word_width;
        }
    }

    if !current.is_empty() {
        lines.push(current.join(" "));
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    const FONT: u32 = 50;
    const WIDTH: u32 = 1040;

    fn forty_words() -> String {
        (0..40)
            .map(|i| ["storm", "coast", "residents", "evacuate", "tonight"][i % 5])
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn test_word_width_estimate() {
        // 5 chars * 30px + 15px
        assert!((estimate_width("storm", FONT) - 165.0).abs() < 1e-9);
        assert!((effective_width(WIDTH) - 832.0).abs() < 1e-9);
    }

    #[test]
    fn test_long_caption_wraps_within_effective_width() {
        let lines = wrap_text(&forty_words(), WIDTH, FONT);
        assert!(lines.len() >= 2);
        for line in &lines {
            assert!(estimate_line_width(line, FONT) <= 832.0, "line too wide: {}", line);
        }
    }

    #[test]
    fn test_wrapping_preserves_word_sequence() {
        let text = forty_words();
        let lines = wrap_text(&text, WIDTH, FONT);
        assert_eq!(lines.join(" "), text);
    }

    #[test]
    fn test_rewrapping_lines_is_idempotent() {
        let lines = wrap_text(&forty_words(), WIDTH, FONT);
        for line in &lines {
            assert_eq!(wrap_text(line, WIDTH, FONT), vec![line.clone()]);
        }
    }

    #[test]
    fn test_overlong_word_gets_its_own_line() {
        let long = "x".repeat(40); // 1215px > 832px
        let lines = wrap_text(&format!("a {} b", long), WIDTH, FONT);
        assert_eq!(lines, vec!["a".to_string(), long.clone(), "b".to_string()]);
        assert_eq!(wrap_text(&long, WIDTH, FONT), vec![long]);
    }

    #[test]
    fn test_empty_and_whitespace_text() {
        assert!(wrap_text("", WIDTH, FONT).is_empty());
        assert!(wrap_text("  \n\t ", WIDTH, FONT).is_empty());
    }

    #[test]
    fn test_width_counts_characters_not_bytes() {
        assert_eq!(estimate_width("café", FONT), estimate_width("cafe", FONT));
    }
}
