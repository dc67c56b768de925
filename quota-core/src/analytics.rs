//! Analytics aggregator: adherence, streak, deficits, deadline
//! pressure and catch-up suggestions over a rolling day window.

use chrono::{DateTime, NaiveDate, Utc};

use crate::accounting::{done_today, live_minutes_today, logged_on_day};
use crate::activity::{is_active_on_day, required_on_day};
use crate::calendar::{last_n_days, list_days};
use crate::plan::deadline_ratio;
use crate::task::Task;

/// A fully-met day needs done/required at or above this ratio.
pub const HIT_THRESHOLD: f64 = 1.0;

/// Suggested daily increases are rounded up to this step...
const SUGGESTION_STEP: u32 = 5;
/// ...and capped per day.
const SUGGESTION_CAP: u32 = 240;

/// Required/done/deficit for one day across all tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaySummary {
    pub day: NaiveDate,
    pub required: u32,
    pub done: u32,
    pub deficit: u32,
}

/// Per-task catch-up advice: spread the remaining shortfall evenly
/// over the remaining active days.
#[derive(Debug, Clone, PartialEq)]
pub struct CatchUpSuggestion {
    pub task_id: String,
    pub title: String,
    pub add_per_day: u32,
    pub days_left: u32,
    pub deficit: u32,
    pub due_date: NaiveDate,
    pub daily_minutes: u32,
    pub is_today: bool,
    pub today_req: u32,
    pub today_done: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsSummary {
    pub per_day: Vec<DaySummary>,
    /// Rounded percentage of required minutes done over the window;
    /// 100 when nothing was required.
    pub adherence: u32,
    /// Consecutive fully-met days ending at (or just before) today.
    pub streak: u32,
    pub deficit_total: u32,
    /// Average deadline pressure over tasks active today.
    pub pressure: f64,
    pub suggestions: Vec<CatchUpSuggestion>,
}

pub fn summarize_analytics(
    tasks: &[Task],
    today: NaiveDate,
    window_days: u32,
    now: DateTime<Utc>,
) -> AnalyticsSummary {
    let clean: Vec<&Task> = tasks.iter().filter(|t| t.has_valid_window()).collect();

    let per_day: Vec<DaySummary> = last_n_days(window_days, today)
        .into_iter()
        .map(|day| {
            let required: u32 = clean.iter().map(|t| required_on_day(t, day)).sum();
            let done: u32 = if day == today {
                clean.iter().map(|t| done_today(t, today, now)).sum()
            } else {
                clean.iter().map(|t| logged_on_day(t, day)).sum()
            };
            DaySummary {
                day,
                required,
                done,
                deficit: required.saturating_sub(done),
            }
        })
        .collect();

    let req_sum: u32 = per_day.iter().map(|d| d.required).sum();
    let done_sum: u32 = per_day.iter().map(|d| d.done).sum();
    let adherence = if req_sum > 0 {
        (f64::from(done_sum) / f64::from(req_sum) * 100.0).round() as u32
    } else {
        100
    };

    let streak = count_streak(&per_day);
    let deficit_total = per_day.iter().map(|d| d.deficit).sum();

    let today_active: Vec<&&Task> = clean.iter().filter(|t| is_active_on_day(t, today)).collect();
    let pressure = if today_active.is_empty() {
        0.0
    } else {
        today_active
            .iter()
            .map(|t| deadline_ratio(today, t.start_date, t.due_date))
            .sum::<f64>()
            / today_active.len() as f64
    };

    let suggestions = suggest_daily_catch_up(tasks, today, now);

    AnalyticsSummary {
        per_day,
        adherence,
        streak,
        deficit_total,
        pressure,
        suggestions,
    }
}

/// Walk days backward from today. Today is excluded while its quota is
/// still open; zero-requirement days are neutral gaps; the first unmet
/// required day breaks the streak.
fn count_streak(per_day: &[DaySummary]) -> u32 {
    let mut days = per_day.iter().rev();

    if let Some(today) = per_day.last() {
        if today.required > 0 && f64::from(today.done) / f64::from(today.required) < HIT_THRESHOLD
        {
            days.next();
        }
    }

    let mut streak = 0;
    for d in days {
        if d.required == 0 {
            continue;
        }
        if f64::from(d.done) / f64::from(d.required) >= HIT_THRESHOLD {
            streak += 1;
        } else {
            break;
        }
    }
    streak
}

pub fn suggest_daily_catch_up(
    tasks: &[Task],
    today: NaiveDate,
    now: DateTime<Utc>,
) -> Vec<CatchUpSuggestion> {
    let mut out = Vec::new();

    for t in tasks.iter().filter(|t| t.has_valid_window()) {
        let is_today = is_active_on_day(t, today);
        let today_req = required_on_day(t, today);
        let today_done = logged_on_day(t, today)
            + if is_today {
                live_minutes_today(t, today, now)
            } else {
                0
            };

        let from = today.max(t.start_date);
        let remaining: Vec<NaiveDate> = list_days(from, t.due_date)
            .into_iter()
            .filter(|&d| is_active_on_day(t, d))
            .collect();
        let days_left = remaining.len() as u32;
        if days_left == 0 || t.daily_minutes == 0 {
            continue;
        }

        let req_left = t.daily_minutes.saturating_mul(days_left);
        let done_left: u32 = remaining
            .iter()
            .map(|&d| {
                logged_on_day(t, d)
                    + if d == today {
                        live_minutes_today(t, today, now)
                    } else {
                        0
                    }
            })
            .sum();

        let deficit = req_left.saturating_sub(done_left);
        if deficit == 0 {
            continue;
        }

        let add_per_day =
            (deficit.div_ceil(days_left * SUGGESTION_STEP) * SUGGESTION_STEP).min(SUGGESTION_CAP);

        out.push(CatchUpSuggestion {
            task_id: t.id.clone(),
            title: t.title.clone(),
            add_per_day,
            days_left,
            deficit,
            due_date: t.due_date,
            daily_minutes: t.daily_minutes,
            is_today,
            today_req,
            today_done,
        });
    }

    // Tasks active today first, then largest deficit.
    out.sort_by(|a, b| {
        b.is_today
            .cmp(&a.is_today)
            .then_with(|| b.deficit.cmp(&a.deficit))
    });
    out
}
