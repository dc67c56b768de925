//! Progress accounting: persisted ledger entries plus the live timer.
//!
//! The live timer is consulted in exactly one place, `done_today`;
//! past days only ever read the persisted ledger.

use chrono::{DateTime, NaiveDate, Utc};

use crate::task::Task;

/// Minutes already persisted for `day`.
pub fn logged_on_day(task: &Task, day: NaiveDate) -> u32 {
    task.progress.get(&day).copied().unwrap_or(0)
}

/// Whole minutes accrued by a running timer within `today`.
///
/// Accrual is clamped to the current calendar day: a timer started
/// before midnight only counts from the start of today, and never past
/// `now` or the end of today. Floored, never negative.
pub fn live_minutes_today(task: &Task, today: NaiveDate, now: DateTime<Utc>) -> u32 {
    let Some(running_from) = task.running_from else {
        return 0;
    };
    let Some(day_start) = today.and_hms_opt(0, 0, 0) else {
        return 0;
    };
    let Some(day_end) = today.and_hms_opt(23, 59, 59) else {
        return 0;
    };
    let from = running_from.naive_utc().max(day_start);
    let to = now.naive_utc().min(day_end);
    if to <= from {
        return 0;
    }
    u32::try_from((to - from).num_minutes()).unwrap_or(0)
}

/// Effective minutes done today: persisted ledger plus live timer.
pub fn done_today(task: &Task, today: NaiveDate, now: DateTime<Utc>) -> u32 {
    logged_on_day(task, today) + live_minutes_today(task, today, now)
}

/// Tasks whose running timer has just carried them to today's quota.
/// The watchdog ticker uses this to raise a stop-the-timer alert.
pub fn tasks_over_quota<'a>(
    tasks: &'a [Task],
    today: NaiveDate,
    now: DateTime<Utc>,
) -> Vec<&'a Task> {
    tasks
        .iter()
        .filter(|t| t.running_from.is_some())
        .filter(|t| {
            let req = crate::activity::required_on_day(t, today);
            req > 0 && done_today(t, today, now) >= req
        })
        .collect()
}
