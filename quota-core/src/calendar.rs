//! Calendar utilities: ISO day arithmetic for the quota engine.
//!
//! Everything here is pure. Unparseable input falls back to a caller
//! supplied default instead of propagating an error.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};

/// Longest day range we will enumerate (inclusive), roughly one year.
const MAX_RANGE_DAYS: usize = 366;

/// Fallback slot start when a task carries no usable earliest time.
pub const DEFAULT_EARLIEST: &str = "22:00";

pub fn to_iso(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

/// Parse a `YYYY-MM-DD` day, falling back to `fallback` on bad input.
pub fn parse_day_or(s: &str, fallback: NaiveDate) -> NaiveDate {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").unwrap_or(fallback)
}

/// Signed whole-day difference `b - a`.
pub fn diff_days(a: NaiveDate, b: NaiveDate) -> i64 {
    (b - a).num_days()
}

/// Inclusive day range. Empty when `from > to`; truncated past a year.
pub fn list_days(from: NaiveDate, to: NaiveDate) -> Vec<NaiveDate> {
    if from > to {
        return Vec::new();
    }
    let mut out = Vec::new();
    let mut cur = from;
    while cur <= to && out.len() < MAX_RANGE_DAYS {
        out.push(cur);
        cur = match cur.succ_opt() {
            Some(d) => d,
            None => break,
        };
    }
    out
}

/// The last `n` days ending at `today`, oldest first.
pub fn last_n_days(n: u32, today: NaiveDate) -> Vec<NaiveDate> {
    if n == 0 {
        return Vec::new();
    }
    let from = today - chrono::Duration::days(i64::from(n) - 1);
    list_days(from, today)
}

/// Weekday as Monday=1 .. Sunday=7.
pub fn day_of_week(day: NaiveDate) -> u32 {
    day.weekday().number_from_monday()
}

/// Combine an `HH:mm` string with a day. Bad input falls back to 22:00.
pub fn parse_hhmm(hhmm: &str, day: NaiveDate) -> NaiveDateTime {
    let time = NaiveTime::parse_from_str(hhmm.trim(), "%H:%M")
        .ok()
        .or_else(|| NaiveTime::parse_from_str(DEFAULT_EARLIEST, "%H:%M").ok())
        .unwrap_or_default();
    day.and_time(time)
}

/// Render minutes as "1h 30m" / "1h" / "45m".
pub fn fmt_min_human(mins: u32) -> String {
    let h = mins / 60;
    let r = mins % 60;
    if h > 0 && r > 0 {
        format!("{h}h {r}m")
    } else if h > 0 {
        format!("{h}h")
    } else {
        format!("{r}m")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_diff_days_signed() {
        assert_eq!(diff_days(d("2026-03-01"), d("2026-03-04")), 3);
        assert_eq!(diff_days(d("2026-03-04"), d("2026-03-01")), -3);
        assert_eq!(diff_days(d("2026-03-01"), d("2026-03-01")), 0);
    }

    #[test]
    fn test_list_days_inclusive_and_inverted() {
        let days = list_days(d("2026-02-27"), d("2026-03-02"));
        assert_eq!(days.len(), 4); // 2026 is not a leap year
        assert_eq!(days[0], d("2026-02-27"));
        assert_eq!(days[3], d("2026-03-02"));

        assert!(list_days(d("2026-03-02"), d("2026-02-27")).is_empty());
    }

    #[test]
    fn test_list_days_truncates_long_ranges() {
        let days = list_days(d("2020-01-01"), d("2026-01-01"));
        assert_eq!(days.len(), 366);
    }

    #[test]
    fn test_last_n_days_window() {
        let days = last_n_days(7, d("2026-03-07"));
        assert_eq!(days.len(), 7);
        assert_eq!(days[0], d("2026-03-01"));
        assert_eq!(days[6], d("2026-03-07"));

        assert!(last_n_days(0, d("2026-03-07")).is_empty());
    }

    #[test]
    fn test_day_of_week_monday_based() {
        assert_eq!(day_of_week(d("2026-03-02")), 1); // Monday
        assert_eq!(day_of_week(d("2026-03-08")), 7); // Sunday
    }

    #[test]
    fn test_parse_day_fallback() {
        let fb = d("2026-01-01");
        assert_eq!(parse_day_or("2026-05-09", fb), d("2026-05-09"));
        assert_eq!(parse_day_or("not-a-day", fb), fb);
    }

    #[test]
    fn test_parse_hhmm_and_fallback() {
        let day = d("2026-03-01");
        assert_eq!(
            parse_hhmm("08:30", day),
            day.and_hms_opt(8, 30, 0).unwrap()
        );
        assert_eq!(
            parse_hhmm("garbage", day),
            day.and_hms_opt(22, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_fmt_min_human() {
        assert_eq!(fmt_min_human(90), "1h 30m");
        assert_eq!(fmt_min_human(60), "1h");
        assert_eq!(fmt_min_human(45), "45m");
        assert_eq!(fmt_min_human(0), "0m");
    }
}
