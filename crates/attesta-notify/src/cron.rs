//! Lightweight cron expression parser.
//! Supports: "MIN HOUR DOM MON DOW" (5-field, no seconds)
//! Wildcards: *, */N, N, comma lists — for the minute and hour fields;
//! day-of-month/month/day-of-week are accepted but only `*` is honored.
//! Example: "0 9 * * *" = every day at 9:00.

use chrono::{DateTime, Duration, TimeZone, Timelike};

/// Parse a simple cron expression and compute the next run time.
pub fn next_run_from_cron<Tz: TimeZone>(
    expression: &str,
    after: DateTime<Tz>,
) -> Option<DateTime<Tz>> {
    let parts: Vec<&str> = expression.split_whitespace().collect();
    if parts.len() != 5 {
        tracing::warn!(
            "invalid cron expression: '{}' (need 5 fields: MIN HOUR DOM MON DOW)",
            expression
        );
        return None;
    }

    let minutes = parse_field(parts[0], 0, 59)?;
    let hours = parse_field(parts[1], 0, 23)?;

    // Find next matching time after `after`, scanning up to 48 hours.
    let mut candidate = after + Duration::minutes(1);
    candidate = candidate.with_second(0).unwrap_or(candidate);

    for _ in 0..(48 * 60) {
        let m = candidate.minute();
        let h = candidate.hour();

        if minutes.contains(&m) && hours.contains(&h) {
            return Some(candidate);
        }
        candidate = candidate + Duration::minutes(1);
    }

    None
}

/// Parse a cron field into a list of matching values.
fn parse_field(field: &str, min: u32, max: u32) -> Option<Vec<u32>> {
    if field == "*" {
        return Some((min..=max).collect());
    }

    // */N — every N
    if let Some(step) = field.strip_prefix("*/") {
        let n: u32 = step.parse().ok()?;
        if n == 0 {
            return None;
        }
        return Some((min..=max).step_by(n as usize).collect());
    }

    // Comma-separated: "0,15,30,45"
    if field.contains(',') {
        let vals: Result<Vec<u32>, _> = field.split(',').map(|s| s.trim().parse()).collect();
        return vals
            .ok()
            .map(|v| v.into_iter().filter(|x| *x >= min && *x <= max).collect());
    }

    // Single number
    let n: u32 = field.parse().ok()?;
    if n >= min && n <= max {
        Some(vec![n])
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn daily_at_nine() {
        let after = Utc.with_ymd_and_hms(2026, 8, 5, 7, 15, 0).unwrap();
        let next = next_run_from_cron("0 9 * * *", after).unwrap();
        assert_eq!(next.hour(), 9);
        assert_eq!(next.minute(), 0);
    }

    #[test]
    fn past_todays_slot_rolls_to_tomorrow() {
        let after = Utc.with_ymd_and_hms(2026, 8, 5, 10, 0, 0).unwrap();
        let next = next_run_from_cron("0 9 * * *", after).unwrap();
        assert_eq!(next.date_naive().to_string(), "2026-08-06");
        assert_eq!(next.hour(), 9);
    }

    #[test]
    fn step_minutes() {
        let after = Utc.with_ymd_and_hms(2026, 8, 5, 10, 2, 0).unwrap();
        let next = next_run_from_cron("*/15 * * * *", after).unwrap();
        assert_eq!(next.minute(), 15);
    }

    #[test]
    fn comma_list() {
        let after = Utc.with_ymd_and_hms(2026, 8, 5, 10, 20, 0).unwrap();
        let next = next_run_from_cron("0,30 * * * *", after).unwrap();
        assert_eq!(next.minute(), 30);
    }

    #[test]
    fn invalid_expression() {
        let after = Utc::now();
        assert!(next_run_from_cron("bad", after).is_none());
        assert!(next_run_from_cron("61 9 * * *", after).is_none());
    }
}
