//! Timestamp handling.
//!
//! The backend exchanges ISO-8601-style local timestamps as strings
//! (`YYYY-MM-DDTHH:MM[:SS]`, space separator tolerated on input). Values are
//! passed through verbatim on the wire; parsing here is only for display
//! formatting, window validation and countdowns.

use chrono::{Duration, Local, NaiveDateTime};

use crate::error::{Error, Result};

/// Wire format produced by time inputs and sent to the backend.
pub const INPUT_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Parse a backend or form timestamp. Returns `None` rather than erroring
/// so unparseable values can be displayed verbatim.
pub fn parse_ts(value: &str) -> Option<NaiveDateTime> {
    let normalized = value.trim().replace(' ', "T");
    NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(&normalized, INPUT_FORMAT))
        .ok()
}

/// Format a timestamp for display; unparseable input comes back unchanged.
pub fn format_display(value: &str) -> String {
    parse_ts(value).map_or_else(
        || value.to_string(),
        |dt| dt.format("%d %b %Y, %I:%M %p").to_string(),
    )
}

/// Validate a booking/search/availability time window: both ends present,
/// parseable and ordered.
pub fn validate_window(start_ts: &str, end_ts: &str) -> Result<()> {
    if start_ts.trim().is_empty() || end_ts.trim().is_empty() {
        return Err(Error::Validation("Start and end time required".into()));
    }
    let start = parse_ts(start_ts)
        .ok_or_else(|| Error::Validation(format!("unparseable start time: {start_ts}")))?;
    let end = parse_ts(end_ts)
        .ok_or_else(|| Error::Validation(format!("unparseable end time: {end_ts}")))?;
    if start >= end {
        return Err(Error::Validation(
            "Start time must be before end time".into(),
        ));
    }
    Ok(())
}

/// Remaining time until `end_ts` as "3h 2m 1s", or "Time over" once the end
/// has passed. `None` when the end timestamp cannot be parsed.
pub fn countdown(end_ts: &str, now: NaiveDateTime) -> Option<String> {
    let end = parse_ts(end_ts)?;
    let diff = end - now;
    if diff <= Duration::zero() {
        return Some("Time over".to_string());
    }
    let total = diff.num_seconds();
    let h = total / 3600;
    let m = (total % 3600) / 60;
    let s = total % 60;
    Some(format!("{h}h {m}m {s}s"))
}

/// Current local wall-clock time, naive (matches the wire format).
pub fn now_local() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Default search window: now until `hours` from now, in input format.
pub fn default_window(hours: i64) -> (String, String) {
    let now = now_local();
    let later = now + Duration::hours(hours);
    (
        now.format(INPUT_FORMAT).to_string(),
        later.format(INPUT_FORMAT).to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minute_precision() {
        let dt = parse_ts("2024-01-01T10:00").unwrap();
        assert_eq!(dt.format("%H:%M").to_string(), "10:00");
    }

    #[test]
    fn parses_second_precision_and_space_separator() {
        assert!(parse_ts("2024-01-01 10:00:30").is_some());
        assert!(parse_ts("2024-01-01T10:00:30").is_some());
    }

    #[test]
    fn garbage_is_none() {
        assert!(parse_ts("not-a-date").is_none());
        assert!(parse_ts("").is_none());
    }

    #[test]
    fn display_falls_back_to_verbatim() {
        assert_eq!(format_display("soon"), "soon");
        let shown = format_display("2024-01-05T09:30");
        assert!(shown.contains("Jan"), "got: {shown}");
        assert!(shown.contains("2024"));
    }

    #[test]
    fn window_requires_order() {
        assert!(validate_window("2024-01-01T10:00", "2024-01-01T11:00").is_ok());
        assert!(validate_window("2024-01-01T11:00", "2024-01-01T10:00").is_err());
        assert!(validate_window("2024-01-01T10:00", "2024-01-01T10:00").is_err());
    }

    #[test]
    fn window_requires_both_ends() {
        assert!(validate_window("", "2024-01-01T11:00").is_err());
        assert!(validate_window("2024-01-01T10:00", "  ").is_err());
    }

    #[test]
    fn countdown_formats_remaining_time() {
        let now = parse_ts("2024-01-01T10:00:00").unwrap();
        assert_eq!(
            countdown("2024-01-01T13:02:01", now).unwrap(),
            "3h 2m 1s"
        );
    }

    #[test]
    fn countdown_after_end_is_time_over() {
        let now = parse_ts("2024-01-01T12:00").unwrap();
        assert_eq!(countdown("2024-01-01T10:00", now).unwrap(), "Time over");
        assert_eq!(countdown("2024-01-01T12:00", now).unwrap(), "Time over");
    }

    #[test]
    fn countdown_unparseable_end_is_none() {
        let now = parse_ts("2024-01-01T12:00").unwrap();
        assert!(countdown("whenever", now).is_none());
    }

    #[test]
    fn default_window_is_ordered() {
        let (start, end) = default_window(1);
        assert!(validate_window(&start, &end).is_ok());
    }
}
