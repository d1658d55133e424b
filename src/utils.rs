//! Shared helpers: second-granularity clock, DB timestamp codecs,
//! duration parsing/formatting and fixed-width table rendering.

use chrono::{DateTime, Duration, SecondsFormat, Timelike, Utc};

use crate::errors::{AppError, AppResult};

/// Current time truncated to whole seconds.
///
/// All persisted timestamps are second-granularity so that the stored
/// text form round-trips exactly and lexicographic comparison in SQL
/// matches chronological order.
pub fn now_secs() -> DateTime<Utc> {
    let now = Utc::now();
    now.with_nanosecond(0).unwrap_or(now)
}

/// Serialize a timestamp for storage (RFC 3339, UTC, whole seconds).
pub fn to_db_ts(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parse a stored timestamp back into UTC.
pub fn from_db_ts(raw: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| AppError::InvalidInput(format!("invalid timestamp '{}'", raw)))
}

/// Compute a session end time that can never violate `end > start`.
///
/// If the wall clock went backwards (retry, clock step) the end is
/// nudged to start + 1s instead of rejecting the checkout.
pub fn clamp_end_time(start: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    let floor = start + Duration::seconds(1);
    if now < floor { floor } else { now }
}

/// Format a duration the way the bot reports it: "2h 5m 31s",
/// dropping leading zero components. Rounded to whole seconds.
pub fn format_duration(d: Duration) -> String {
    let total = d.num_seconds().max(0);
    let h = total / 3600;
    let m = (total % 3600) / 60;
    let s = total % 60;

    if h > 0 {
        format!("{}h {}m {}s", h, m, s)
    } else if m > 0 {
        format!("{}m {}s", m, s)
    } else {
        format!("{}s", s)
    }
}

/// Parse a user-supplied duration.
///
/// Accepts component form ("2h", "1h30m", "45m", "1h2m3s") or a bare
/// number of minutes ("90"). Must come out strictly positive.
pub fn parse_duration(input: &str) -> AppResult<Duration> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(AppError::InvalidInput("empty duration".to_string()));
    }

    // Bare number -> minutes
    if let Ok(mins) = trimmed.parse::<i64>() {
        if mins <= 0 {
            return Err(AppError::InvalidInput(format!(
                "duration must be positive: '{}'",
                input
            )));
        }
        return Duration::try_minutes(mins).ok_or_else(|| {
            AppError::InvalidInput(format!("duration out of range: '{}'", input))
        });
    }

    let mut total_secs: i64 = 0;
    let mut value: i64 = 0;
    let mut has_digits = false;
    let mut has_unit = false;

    for c in trimmed.chars() {
        if c.is_ascii_digit() {
            value = value
                .checked_mul(10)
                .and_then(|v| v.checked_add((c as u8 - b'0') as i64))
                .ok_or_else(|| AppError::InvalidInput(format!("duration overflow: '{}'", input)))?;
            has_digits = true;
        } else {
            let factor = match c {
                'h' | 'H' => 3600,
                'm' | 'M' => 60,
                's' | 'S' => 1,
                c if c.is_whitespace() => continue,
                _ => {
                    return Err(AppError::InvalidInput(format!(
                        "unrecognized duration '{}' (use e.g. 1h30m, 45m, or minutes)",
                        input
                    )));
                }
            };
            if !has_digits {
                return Err(AppError::InvalidInput(format!(
                    "unrecognized duration '{}' (use e.g. 1h30m, 45m, or minutes)",
                    input
                )));
            }
            total_secs = value
                .checked_mul(factor)
                .and_then(|secs| total_secs.checked_add(secs))
                .ok_or_else(|| {
                    AppError::InvalidInput(format!("duration out of range: '{}'", input))
                })?;
            value = 0;
            has_digits = false;
            has_unit = true;
        }
    }

    if has_digits || !has_unit || total_secs <= 0 {
        return Err(AppError::InvalidInput(format!(
            "unrecognized duration '{}' (use e.g. 1h30m, 45m, or minutes)",
            input
        )));
    }

    Duration::try_seconds(total_secs)
        .ok_or_else(|| AppError::InvalidInput(format!("duration out of range: '{}'", input)))
}

/// Truncate with ellipsis; values shorter than `max_len` are returned as-is.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

/// Render a fixed-width text table, sizing each column to its widest cell.
pub fn format_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }
    }

    let mut out = String::new();
    for (i, header) in headers.iter().enumerate() {
        out.push_str(&format!("{:<width$}  ", header, width = widths[i]));
    }
    out.push('\n');
    for width in &widths {
        out.push_str(&"-".repeat(width + 2));
    }
    out.push('\n');
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                out.push_str(&format!("{:<width$}  ", cell, width = widths[i]));
            }
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn format_duration_drops_leading_zeros() {
        assert_eq!(format_duration(Duration::seconds(31)), "31s");
        assert_eq!(format_duration(Duration::seconds(125)), "2m 5s");
        assert_eq!(format_duration(Duration::seconds(7531)), "2h 5m 31s");
        assert_eq!(format_duration(Duration::seconds(0)), "0s");
    }

    #[test]
    fn format_duration_never_negative() {
        assert_eq!(format_duration(Duration::seconds(-5)), "0s");
    }

    #[test]
    fn parse_duration_component_forms() {
        assert_eq!(parse_duration("1h30m").unwrap(), Duration::minutes(90));
        assert_eq!(parse_duration("45m").unwrap(), Duration::minutes(45));
        assert_eq!(parse_duration("2h").unwrap(), Duration::hours(2));
        assert_eq!(parse_duration("1h2m3s").unwrap(), Duration::seconds(3723));
        assert_eq!(parse_duration(" 1h 15m ").unwrap(), Duration::minutes(75));
    }

    #[test]
    fn parse_duration_bare_minutes() {
        assert_eq!(parse_duration("90").unwrap(), Duration::minutes(90));
    }

    #[test]
    fn parse_duration_rejects_garbage() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("h").is_err());
        assert!(parse_duration("1x").is_err());
        assert!(parse_duration("-30").is_err());
        assert!(parse_duration("0").is_err());
        assert!(parse_duration("1h30").is_err()); // trailing number without unit
    }

    #[test]
    fn parse_duration_rejects_out_of_range_values() {
        // Bare minutes beyond what a Duration can represent.
        assert!(matches!(
            parse_duration("200000000000000"),
            Err(AppError::InvalidInput(_))
        ));
        // Component form whose seconds accumulation overflows i64.
        assert!(matches!(
            parse_duration("9000000000000000000h"),
            Err(AppError::InvalidInput(_))
        ));
        assert!(matches!(
            parse_duration("9223372036854775807s"),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn clamp_end_nudges_backwards_clock() {
        let start = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let earlier = Utc.with_ymd_and_hms(2025, 6, 1, 11, 59, 0).unwrap();
        assert_eq!(
            clamp_end_time(start, earlier),
            start + Duration::seconds(1)
        );

        let later = Utc.with_ymd_and_hms(2025, 6, 1, 12, 30, 0).unwrap();
        assert_eq!(clamp_end_time(start, later), later);
    }

    #[test]
    fn db_timestamp_round_trip() {
        let ts = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        assert_eq!(from_db_ts(&to_db_ts(&ts)).unwrap(), ts);
    }
}
