use chrono::NaiveDateTime;

use crate::error::IngestError;

/// Accepted timestamp patterns, tried in order. Order matters: patterns with
/// fractional seconds come before their fraction-less prefixes, abbreviated
/// month names before full ones, so ambiguous inputs resolve the same way
/// every run.
const DATE_FORMATS: [&str; 8] = [
    "%Y-%m-%d %H:%M:%S",         // 2026-01-31 12:38:00
    "%b %d, %Y @ %H:%M:%S%.f",   // Jan 31, 2026 @ 12:38:00.504
    "%b %d, %Y @ %H:%M:%S",      // Jan 31, 2026 @ 12:38:00
    "%B %d, %Y @ %H:%M:%S%.f",   // January 31, 2026 @ 12:38:00.504
    "%B %d, %Y @ %H:%M:%S",      // January 31, 2026 @ 12:38:00
    "%d-%m-%Y %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
];

/// Parse a raw last-seen value into a naive local timestamp.
///
/// The input is trimmed and matched against each pattern in turn; the first
/// pattern that consumes the whole string wins. No timezone is attached.
pub fn parse_available_date(raw: &str) -> Result<NaiveDateTime, IngestError> {
    let trimmed = raw.trim();

    for format in DATE_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(parsed);
        }
    }

    Err(IngestError::InvalidDateFormat {
        value: raw.to_string(),
    })
}
