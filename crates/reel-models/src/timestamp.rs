//! Cue timestamp formatting and parsing.
//!
//! Cue files use the `HH:MM:SS,mmm` form. Formatting truncates to whole
//! milliseconds instead of rounding, so a caption never claims time the
//! narration has not reached yet.

use crate::error::{ModelError, ModelResult};

/// Absorbs binary representation error (3.2 is stored as 3.2000000000000002,
/// 0.3 * 1000 as 299.99999999999994) before truncating.
const MS_EPSILON: f64 = 1e-6;

/// Convert seconds to whole milliseconds, truncating.
pub fn seconds_to_millis(seconds: f64) -> u64 {
    if seconds <= 0.0 || !seconds.is_finite() {
        return 0;
    }
    (seconds * 1000.0 + MS_EPSILON).floor() as u64
}

/// Format seconds as `HH:MM:SS,mmm`.
///
/// # Examples
/// ```
/// use reel_models::timestamp::format_cue_timestamp;
/// assert_eq!(format_cue_timestamp(3.2), "00:00:03,200");
/// assert_eq!(format_cue_timestamp(3661.0009), "01:01:01,000");
/// ```
pub fn format_cue_timestamp(seconds: f64) -> String {
    let total_ms = seconds_to_millis(seconds);
    let ms = total_ms % 1000;
    let total_secs = total_ms / 1000;
    format!(
        "{:02}:{:02}:{:02},{:03}",
        total_secs / 3600,
        (total_secs % 3600) / 60,
        total_secs % 60,
        ms
    )
}

/// Parse an `HH:MM:SS,mmm` timestamp into seconds.
///
/// A `.` separator before the milliseconds is accepted as well.
pub fn parse_cue_timestamp(ts: &str) -> ModelResult<f64> {
    let ts = ts.trim();
    let invalid = || ModelError::InvalidTimestamp(ts.to_string());

    let (clock, millis) = ts
        .split_once(',')
        .or_else(|| ts.split_once('.'))
        .ok_or_else(invalid)?;

    let parts: Vec<&str> = clock.split(':').collect();
    if parts.len() != 3 || millis.is_empty() || millis.len() > 3 {
        return Err(invalid());
    }

    let mut fields = [0u64; 3];
    for (field, part) in fields.iter_mut().zip(&parts) {
        *field = part.parse().map_err(|_| invalid())?;
    }
    let [hours, minutes, seconds] = fields;
    if minutes >= 60 || seconds >= 60 {
        return Err(invalid());
    }

    // "5" after the comma means 500 ms, not 5 ms
    let ms: u64 = format!("{:0<3}", millis).parse().map_err(|_| invalid())?;

    let total_ms = ((hours * 60 + minutes) * 60 + seconds) * 1000 + ms;
    Ok(total_ms as f64 / 1000.0)
}
