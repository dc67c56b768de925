//! Task activity predicate: does a task owe time on a given day?
//!
//! This is the single source of truth used by both the plan builder
//! and the analytics aggregator, so their required-minute totals can
//! never diverge.

use chrono::NaiveDate;

use crate::calendar::day_of_week;
use crate::task::Task;

/// True when `day` falls inside the task's window and matches its
/// weekly recurrence mask (empty mask = every day).
pub fn is_active_on_day(task: &Task, day: NaiveDate) -> bool {
    if !task.has_valid_window() {
        return false;
    }
    if day < task.start_date || day > task.due_date {
        return false;
    }
    let days = &task.rule.days_of_week;
    days.is_empty() || days.contains(&day_of_week(day))
}

/// Minutes owed on `day`: the daily quota on active days, else zero.
pub fn required_on_day(task: &Task, day: NaiveDate) -> u32 {
    if is_active_on_day(task, day) {
        task.daily_minutes
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn active_only_inside_window() {
        let t = Task::new("t", "x", d("2026-03-02")).with_window(d("2026-03-02"), d("2026-03-06"));
        assert!(!is_active_on_day(&t, d("2026-03-01")));
        assert!(is_active_on_day(&t, d("2026-03-02")));
        assert!(is_active_on_day(&t, d("2026-03-06")));
        assert!(!is_active_on_day(&t, d("2026-03-07")));
    }

    #[test]
    fn inverted_window_never_active() {
        let t = Task::new("t", "x", d("2026-03-02")).with_window(d("2026-03-06"), d("2026-03-02"));
        assert!(!is_active_on_day(&t, d("2026-03-04")));
        assert_eq!(required_on_day(&t, d("2026-03-04")), 0);
    }

    #[test]
    fn weekday_mask_filters_days() {
        // Mon + Wed only; 2026-03-02 is a Monday.
        let t = Task::new("t", "x", d("2026-03-02"))
            .with_window(d("2026-03-02"), d("2026-03-15"))
            .with_days_of_week(&[1, 3]);
        assert!(is_active_on_day(&t, d("2026-03-02"))); // Mon
        assert!(!is_active_on_day(&t, d("2026-03-03"))); // Tue
        assert!(is_active_on_day(&t, d("2026-03-04"))); // Wed
        assert!(!is_active_on_day(&t, d("2026-03-08"))); // Sun
    }

    #[test]
    fn empty_mask_means_every_day() {
        let t = Task::new("t", "x", d("2026-03-02")).with_window(d("2026-03-02"), d("2026-03-08"));
        for day in crate::calendar::list_days(d("2026-03-02"), d("2026-03-08")) {
            assert!(is_active_on_day(&t, day));
        }
    }

    #[test]
    fn required_is_quota_on_active_days() {
        let t = Task::new("t", "x", d("2026-03-02"))
            .with_window(d("2026-03-02"), d("2026-03-06"))
            .with_daily_minutes(45);
        assert_eq!(required_on_day(&t, d("2026-03-03")), 45);
        assert_eq!(required_on_day(&t, d("2026-03-09")), 0);
    }
}
