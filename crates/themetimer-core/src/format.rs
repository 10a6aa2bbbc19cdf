//! Time formatting and parsing.
//!
//! Stateless helpers shared by the engine, the timer variants and the CLI.
//! All components are floor-truncated, never rounded, so a display never
//! shows a second that has not fully elapsed yet.
//!
//! ```text
//! 3_599_000  -> "59:59"
//! 3_600_000  -> "01:00:00"
//! 90_061_000 -> "25:01:01"   (hours are not wrapped)
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

const MS_PER_SECOND: u64 = 1000;
const MS_PER_MINUTE: u64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: u64 = 60 * MS_PER_MINUTE;

const ZERO_DISPLAY: &str = "00:00";

/// Rendering switches for [`format_time_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatOptions {
    /// Append centiseconds as `.CC`.
    #[serde(default)]
    pub show_milliseconds: bool,
    /// Always render `HH:MM:SS`, even below one hour.
    #[serde(default)]
    pub force_hours: bool,
    /// Render `1h 30m 5s` instead of a clock layout.
    #[serde(default)]
    pub compact: bool,
    /// Zero-pad the leading component.
    #[serde(default = "default_true")]
    pub show_leading_zero: bool,
}

fn default_true() -> bool {
    true
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            show_milliseconds: false,
            force_hours: false,
            compact: false,
            show_leading_zero: true,
        }
    }
}

/// Format milliseconds with the default options (`MM:SS` / `HH:MM:SS`).
pub fn format_time(ms: i64) -> String {
    format_time_with(ms, FormatOptions::default())
}

/// Format milliseconds. Negative input renders as `"00:00"`.
pub fn format_time_with(ms: i64, opts: FormatOptions) -> String {
    if ms < 0 {
        return ZERO_DISPLAY.to_string();
    }
    let ms = ms as u64;

    let hours = ms / MS_PER_HOUR;
    let minutes = (ms % MS_PER_HOUR) / MS_PER_MINUTE;
    let seconds = (ms % MS_PER_MINUTE) / MS_PER_SECOND;
    let centis = (ms % MS_PER_SECOND) / 10;

    if opts.compact {
        return format_compact(hours, minutes, seconds);
    }

    let lead = |v: u64| {
        if opts.show_leading_zero {
            format!("{v:02}")
        } else {
            v.to_string()
        }
    };

    let mut out = if hours > 0 || opts.force_hours {
        format!("{}:{minutes:02}:{seconds:02}", lead(hours))
    } else {
        format!("{}:{seconds:02}", lead(minutes))
    };

    if opts.show_milliseconds {
        out.push_str(&format!(".{centis:02}"));
    }
    out
}

/// Format a raw, possibly non-numeric value. Anything that does not parse
/// as a number renders as `"00:00"`.
pub fn format_time_lossy(raw: &str, opts: FormatOptions) -> String {
    let raw = raw.trim();
    if let Ok(ms) = raw.parse::<i64>() {
        return format_time_with(ms, opts);
    }
    match raw.parse::<f64>() {
        Ok(ms) if ms.is_finite() => format_time_with(ms.floor() as i64, opts),
        _ => ZERO_DISPLAY.to_string(),
    }
}

fn format_compact(hours: u64, minutes: u64, seconds: u64) -> String {
    let mut parts = Vec::with_capacity(3);
    if hours > 0 {
        parts.push(format!("{hours}h"));
    }
    if minutes > 0 {
        parts.push(format!("{minutes}m"));
    }
    if seconds > 0 || parts.is_empty() {
        parts.push(format!("{seconds}s"));
    }
    parts.join(" ")
}

/// Parse a time string into milliseconds.
///
/// Accepted layouts: `MM:SS`, `HH:MM:SS`, compact `1h 30m 5s` (any subset,
/// in that order) and bare integer seconds. An empty string is zero.
pub fn parse_time(input: &str) -> Result<u64, ValidationError> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(0);
    }

    if input.bytes().all(|b| b.is_ascii_digit()) {
        let secs = parse_number(input, input)?;
        return secs
            .checked_mul(MS_PER_SECOND)
            .ok_or_else(|| ValidationError::InvalidFormat(format!("'{input}' is too large")));
    }

    if input.contains(':') {
        return parse_clock(input);
    }

    parse_compact(input)
}

fn parse_clock(input: &str) -> Result<u64, ValidationError> {
    let parts: Vec<&str> = input.split(':').collect();
    let (hours, minutes, seconds) = match parts.as_slice() {
        [m, s] => (0, parse_number(m, input)?, parse_number(s, input)?),
        [h, m, s] => (
            parse_number(h, input)?,
            parse_number(m, input)?,
            parse_number(s, input)?,
        ),
        _ => {
            return Err(ValidationError::InvalidFormat(format!(
                "'{input}' is not MM:SS or HH:MM:SS"
            )))
        }
    };
    combine(hours, minutes, seconds, input)
}

fn parse_compact(input: &str) -> Result<u64, ValidationError> {
    let unrecognised = || {
        ValidationError::InvalidFormat(format!(
            "'{input}' is not a recognised time (try MM:SS, HH:MM:SS or 1h 30m 5s)"
        ))
    };

    let (mut hours, mut minutes, mut seconds) = (None, None, None);
    // Units must appear in h, m, s order, each at most once.
    let mut last_rank = 0;
    let mut digits = String::new();

    for c in input.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }
        if c.is_whitespace() {
            if digits.is_empty() {
                continue;
            }
            return Err(unrecognised());
        }
        let (slot, rank) = match c.to_ascii_lowercase() {
            'h' => (&mut hours, 1),
            'm' => (&mut minutes, 2),
            's' => (&mut seconds, 3),
            _ => return Err(unrecognised()),
        };
        if digits.is_empty() || rank <= last_rank {
            return Err(unrecognised());
        }
        *slot = Some(parse_number(&digits, input)?);
        last_rank = rank;
        digits.clear();
    }

    if !digits.is_empty() || last_rank == 0 {
        return Err(unrecognised());
    }

    combine(
        hours.unwrap_or(0),
        minutes.unwrap_or(0),
        seconds.unwrap_or(0),
        input,
    )
}

fn parse_number(part: &str, input: &str) -> Result<u64, ValidationError> {
    let part = part.trim();
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat(format!(
            "'{input}' contains a non-numeric component"
        )));
    }
    part.parse::<u64>()
        .map_err(|_| ValidationError::InvalidFormat(format!("'{input}' is too large")))
}

fn combine(hours: u64, minutes: u64, seconds: u64, input: &str) -> Result<u64, ValidationError> {
    if minutes >= 60 {
        return Err(ValidationError::InvalidFormat(format!(
            "minutes must be below 60 in '{input}'"
        )));
    }
    if seconds >= 60 {
        return Err(ValidationError::InvalidFormat(format!(
            "seconds must be below 60 in '{input}'"
        )));
    }
    hours
        .checked_mul(MS_PER_HOUR)
        .and_then(|h| h.checked_add(minutes * MS_PER_MINUTE + seconds * MS_PER_SECOND))
        .ok_or_else(|| ValidationError::InvalidFormat(format!("'{input}' is too large")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hour_boundary() {
        assert_eq!(format_time(3_599_000), "59:59");
        assert_eq!(format_time(3_600_000), "01:00:00");
        assert_eq!(format_time(3_601_000), "01:00:01");
    }

    #[test]
    fn negative_and_garbage_render_zero() {
        assert_eq!(format_time(-500), "00:00");
        assert_eq!(format_time_lossy("invalid", FormatOptions::default()), "00:00");
        assert_eq!(format_time_lossy("NaN", FormatOptions::default()), "00:00");
        assert_eq!(format_time_lossy("61000", FormatOptions::default()), "01:01");
    }

    #[test]
    fn components_are_truncated_not_rounded() {
        assert_eq!(format_time(59_999), "00:59");
        assert_eq!(format_time(999), "00:00");
    }

    #[test]
    fn hours_are_not_wrapped() {
        assert_eq!(format_time(25 * 3_600_000 + 61_000), "25:01:01");
    }

    #[test]
    fn option_switches() {
        let forced = FormatOptions {
            force_hours: true,
            ..Default::default()
        };
        assert_eq!(format_time_with(65_000, forced), "00:01:05");

        let millis = FormatOptions {
            show_milliseconds: true,
            ..Default::default()
        };
        assert_eq!(format_time_with(12_345, millis), "00:12.34");

        let bare = FormatOptions {
            show_leading_zero: false,
            ..Default::default()
        };
        assert_eq!(format_time_with(65_000, bare), "1:05");
        assert_eq!(format_time_with(3_665_000, bare), "1:01:05");

        let compact = FormatOptions {
            compact: true,
            ..Default::default()
        };
        assert_eq!(format_time_with(5_405_000, compact), "1h 30m 5s");
        assert_eq!(format_time_with(3_600_000, compact), "1h");
        assert_eq!(format_time_with(0, compact), "0s");
    }

    #[test]
    fn parse_layouts() {
        assert_eq!(parse_time("").unwrap(), 0);
        assert_eq!(parse_time("05:30").unwrap(), 330_000);
        assert_eq!(parse_time("01:00:01").unwrap(), 3_601_000);
        assert_eq!(parse_time("1h 30m 5s").unwrap(), 5_405_000);
        assert_eq!(parse_time("45m").unwrap(), 2_700_000);
        assert_eq!(parse_time("2h5s").unwrap(), 7_205_000);
        assert_eq!(parse_time("90").unwrap(), 90_000);
    }

    #[test]
    fn parse_rejects_out_of_range_components() {
        assert!(matches!(parse_time("05:60"), Err(ValidationError::InvalidFormat(_))));
        assert!(matches!(parse_time("60:00"), Err(ValidationError::InvalidFormat(_))));
        assert!(matches!(parse_time("01:75:00"), Err(ValidationError::InvalidFormat(_))));
        assert!(matches!(parse_time("90m"), Err(ValidationError::InvalidFormat(_))));
    }

    #[test]
    fn parse_rejects_unknown_layouts() {
        for bad in ["abc", "1:2:3:4", "5m 1h", "1x", "12 34", "h", ":30"] {
            assert!(parse_time(bad).is_err(), "expected '{bad}' to be rejected");
        }
    }
}
