//! Daily plan builder: which tasks still owe time today, and when.
//!
//! Priority (deadline pressure + outstanding need + shared-visibility
//! bonus) decides how much urgency context each slot carries; the
//! returned list itself is ordered chronologically by slot start.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::accounting::done_today;
use crate::activity::is_active_on_day;
use crate::calendar::{diff_days, parse_hhmm};
use crate::task::{Task, Visibility};

/// One plan entry per task with outstanding need today. Slots are not
/// packed to avoid overlap; `start` is "earliest you may start", not a
/// conflict-free calendar assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct TodaySlot {
    pub task_id: String,
    pub title: String,
    pub need_min: u32,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub pressure_ratio: f64,
    pub due_in_days: i64,
    pub visibility: Visibility,
}

/// Linear fraction of the task window already elapsed, clamped to 0..1.
/// Zero while today still precedes the window.
pub fn deadline_ratio(today: NaiveDate, start: NaiveDate, due: NaiveDate) -> f64 {
    if today < start {
        return 0.0;
    }
    let total = diff_days(start, due).max(1);
    let spent = diff_days(start, today).clamp(0, total);
    (spent as f64 / total as f64).clamp(0.0, 1.0)
}

pub fn build_today_plan(tasks: &[Task], today: NaiveDate, now: DateTime<Utc>) -> Vec<TodaySlot> {
    struct Candidate<'a> {
        task: &'a Task,
        need: u32,
        ratio: f64,
        due_in: i64,
    }

    let mut todo: Vec<Candidate<'_>> = tasks
        .iter()
        .filter(|t| is_active_on_day(t, today))
        .filter_map(|t| {
            let need = t.daily_minutes.saturating_sub(done_today(t, today, now));
            if need == 0 {
                return None;
            }
            Some(Candidate {
                task: t,
                need,
                ratio: deadline_ratio(today, t.start_date, t.due_date),
                due_in: diff_days(today, t.due_date),
            })
        })
        .collect();

    let score = |c: &Candidate<'_>| {
        let bonus = if c.task.visibility != Visibility::Private {
            0.1
        } else {
            0.0
        };
        c.ratio + f64::from(c.need) / 100.0 + bonus
    };
    todo.sort_by(|a, b| score(b).total_cmp(&score(a)));

    let mut slots: Vec<TodaySlot> = todo
        .into_iter()
        .map(|c| {
            let start = parse_hhmm(&c.task.rule.earliest_hhmm, today);
            let end = start + chrono::Duration::minutes(i64::from(c.need));
            TodaySlot {
                task_id: c.task.id.clone(),
                title: c.task.title.clone(),
                need_min: c.need,
                start,
                end,
                pressure_ratio: c.ratio,
                due_in_days: c.due_in,
                visibility: c.task.visibility,
            }
        })
        .collect();

    // Visible order is chronological; priority already shaped the
    // urgency context carried by each slot.
    slots.sort_by_key(|s| s.start);
    slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn noon(day: &str) -> DateTime<Utc> {
        d(day).and_hms_opt(12, 0, 0).unwrap().and_utc()
    }

    #[test]
    fn ratio_is_zero_before_window_and_clamped() {
        assert_eq!(deadline_ratio(d("2026-03-01"), d("2026-03-05"), d("2026-03-10")), 0.0);
        assert_eq!(deadline_ratio(d("2026-03-10"), d("2026-03-05"), d("2026-03-10")), 1.0);
        assert_eq!(deadline_ratio(d("2026-03-20"), d("2026-03-05"), d("2026-03-10")), 1.0);
        let mid = deadline_ratio(d("2026-03-07"), d("2026-03-05"), d("2026-03-09"));
        assert!((mid - 0.5).abs() < 1e-9);
    }

    #[test]
    fn ratio_single_day_window() {
        // start == due: divisor floors at one day.
        assert_eq!(deadline_ratio(d("2026-03-05"), d("2026-03-05"), d("2026-03-05")), 0.0);
    }

    #[test]
    fn fresh_task_gets_full_need_slot() {
        let today = d("2026-03-05");
        let t = Task::new("t1", "exam prep", today)
            .with_window(today, today)
            .with_daily_minutes(60)
            .with_earliest("09:00");
        let plan = build_today_plan(&[t], today, noon("2026-03-05"));
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].need_min, 60);
        assert_eq!(plan[0].start, today.and_hms_opt(9, 0, 0).unwrap());
        assert_eq!(plan[0].end, today.and_hms_opt(10, 0, 0).unwrap());
    }

    #[test]
    fn live_timer_reduces_need() {
        let today = d("2026-03-05");
        let now = noon("2026-03-05");
        let mut t = Task::new("t1", "x", today)
            .with_window(today, today)
            .with_daily_minutes(60);
        t.running_from = Some(now - Duration::minutes(30));
        let plan = build_today_plan(&[t], today, now);
        assert_eq!(plan[0].need_min, 30);
    }

    #[test]
    fn met_quota_and_zero_quota_are_excluded() {
        let today = d("2026-03-05");
        let mut met = Task::new("t1", "met", today)
            .with_window(today, today)
            .with_daily_minutes(30);
        met.progress.insert(today, 30);
        let zero = Task::new("t2", "zero", today)
            .with_window(today, today)
            .with_daily_minutes(0);
        let plan = build_today_plan(&[met, zero], today, noon("2026-03-05"));
        assert!(plan.is_empty());
    }

    #[test]
    fn window_not_yet_begun_is_excluded() {
        let today = d("2026-03-01");
        let t = Task::new("t1", "later", today).with_window(d("2026-03-05"), d("2026-03-10"));
        assert!(build_today_plan(&[t], today, noon("2026-03-01")).is_empty());
    }

    #[test]
    fn output_is_sorted_by_start_time_not_priority() {
        let today = d("2026-03-05");
        // High pressure but late slot...
        let urgent = Task::new("t1", "urgent", today)
            .with_window(d("2026-02-25"), d("2026-03-05"))
            .with_daily_minutes(90)
            .with_earliest("20:00");
        // ...low pressure but early slot.
        let relaxed = Task::new("t2", "relaxed", today)
            .with_window(d("2026-03-05"), d("2026-03-20"))
            .with_daily_minutes(20)
            .with_earliest("08:00");
        let plan = build_today_plan(&[urgent, relaxed], today, noon("2026-03-05"));
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].task_id, "t2");
        assert_eq!(plan[1].task_id, "t1");
        assert!(plan[1].pressure_ratio > plan[0].pressure_ratio);
    }

    #[test]
    fn shared_visibility_breaks_score_ties() {
        let today = d("2026-03-05");
        let base = Task::new("", "", today)
            .with_window(today, d("2026-03-10"))
            .with_daily_minutes(30)
            .with_earliest("09:00");
        let mut private = base.clone();
        private.id = "p".into();
        let mut shared = base.clone();
        shared.id = "s".into();
        shared = shared.with_visibility(Visibility::Friends);

        // Same start time, so chronological re-sort preserves the
        // priority order between them.
        let plan = build_today_plan(&[private, shared], today, noon("2026-03-05"));
        assert_eq!(plan[0].task_id, "s");
    }
}
