//! quota-core: pure engine for daily time quotas.
//!
//! Given a set of deadline-bound tasks that each owe a fixed number of
//! minutes per active day, this crate decides which tasks still owe
//! time today (and when to slot them), accounts persisted progress
//! together with a live timer, and aggregates history into adherence,
//! streak, deficit and catch-up metrics. Everything is synchronous and
//! side-effect free; time comes from an injected [`Clock`].

pub mod accounting;
pub mod activity;
pub mod analytics;
pub mod calendar;
pub mod clock;
pub mod plan;
pub mod snapshot;
pub mod task;

pub use accounting::{done_today, live_minutes_today, logged_on_day, tasks_over_quota};
pub use activity::{is_active_on_day, required_on_day};
pub use analytics::{
    AnalyticsSummary, CatchUpSuggestion, DaySummary, HIT_THRESHOLD, suggest_daily_catch_up,
    summarize_analytics,
};
pub use clock::{Clock, FixedClock, SystemClock};
pub use plan::{TodaySlot, build_today_plan, deadline_ratio};
pub use snapshot::{DayBoundary, DaySnapshot, compute_day_snapshot, day_hit, missed_on_day};
pub use task::{RawTask, ScheduleRule, Task, TaskFilter, TaskStatus, Visibility};
