//! Task model for the daily quota engine.
//!
//! The engine never branches on field presence: `RawTask` is the
//! loosely-populated record as persisted (legacy field names, missing
//! rule, missing dates) and `Task::from_raw` is the one
//! canonicalization step that produces a fully-typed record.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::calendar::DEFAULT_EARLIEST;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Private,
    Friends,
    Public,
}

/// When a plan slot may start, and on which weekdays the task is active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRule {
    /// Earliest slot start, "HH:mm".
    pub earliest_hhmm: String,
    /// Weekdays (Monday=1..Sunday=7). Empty means every day in range.
    #[serde(default)]
    pub days_of_week: Vec<u32>,
}

impl Default for ScheduleRule {
    fn default() -> Self {
        Self {
            earliest_hhmm: DEFAULT_EARLIEST.to_string(),
            days_of_week: Vec::new(),
        }
    }
}

/// Fully-populated task record as seen by every engine computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub category: String,
    pub status: TaskStatus,

    /// Minutes owed on each active day.
    pub daily_minutes: u32,
    /// Inclusive window. A task with `start_date > due_date` is
    /// silently excluded from scheduling and analytics.
    pub start_date: NaiveDate,
    pub due_date: NaiveDate,

    /// Optional total-effort cap; gates the transition to done.
    pub estimate_total_min: Option<u32>,
    pub rule: ScheduleRule,
    pub visibility: Visibility,

    /// Minutes logged per calendar day.
    pub progress: BTreeMap<NaiveDate, u32>,
    /// Cumulative timed minutes across all days.
    pub actual_minutes: u32,
    /// Set while a live timer runs. At most one task system-wide.
    pub running_from: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Persisted shape before canonicalization. Tolerates records written
/// by older versions (e.g. `planned_minutes` instead of
/// `daily_minutes`, absent schedule rule or dates).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTask {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub daily_minutes: Option<u32>,
    #[serde(default)]
    pub planned_minutes: Option<u32>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub estimate_total_min: Option<u32>,
    #[serde(default)]
    pub rule: Option<ScheduleRule>,
    #[serde(default)]
    pub visibility: Option<Visibility>,
    #[serde(default)]
    pub progress: Option<BTreeMap<NaiveDate, u32>>,
    #[serde(default)]
    pub actual_minutes: Option<u32>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

/// Listing filter: free-text query, category, and status. Empty
/// fields match everything.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub query: Option<String>,
    pub category: Option<String>,
    pub status: Option<TaskStatus>,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        if let Some(q) = &self.query {
            let q = q.trim().to_lowercase();
            if !q.is_empty() && !task.title.to_lowercase().contains(&q) {
                return false;
            }
        }
        if let Some(cat) = &self.category
            && task.category != *cat
        {
            return false;
        }
        if let Some(status) = self.status
            && task.status != status
        {
            return false;
        }
        true
    }
}

impl Task {
    pub fn new(id: impl Into<String>, title: impl Into<String>, today: NaiveDate) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            category: "personal".to_string(),
            status: TaskStatus::Todo,
            daily_minutes: 60,
            start_date: today,
            due_date: today + Duration::days(7),
            estimate_total_min: None,
            rule: ScheduleRule::default(),
            visibility: Visibility::Private,
            progress: BTreeMap::new(),
            actual_minutes: 0,
            running_from: None,
            completed_at: None,
        }
    }

    /// Canonicalize a loosely-populated record. `today` supplies the
    /// default start date; a missing due date defaults to a week out.
    pub fn from_raw(raw: RawTask, fallback_id: impl Into<String>, today: NaiveDate) -> Self {
        let start_date = raw.start_date.unwrap_or(today);
        let due_date = raw.due_date.unwrap_or(start_date + Duration::days(7));
        Self {
            id: raw.id.unwrap_or_else(|| fallback_id.into()),
            title: raw.title.unwrap_or_else(|| "Untitled".to_string()),
            category: raw.category.unwrap_or_else(|| "personal".to_string()),
            status: raw.status.unwrap_or(TaskStatus::Todo),
            daily_minutes: raw.daily_minutes.or(raw.planned_minutes).unwrap_or(60),
            start_date,
            due_date,
            estimate_total_min: raw.estimate_total_min,
            rule: raw.rule.unwrap_or_default(),
            visibility: raw.visibility.unwrap_or(Visibility::Private),
            progress: raw.progress.unwrap_or_default(),
            actual_minutes: raw.actual_minutes.unwrap_or(0),
            // A timer never survives a reload.
            running_from: None,
            completed_at: raw.completed_at,
        }
    }

    /// Inverted windows are filtered, not errors.
    pub fn has_valid_window(&self) -> bool {
        self.start_date <= self.due_date
    }

    pub fn with_daily_minutes(mut self, minutes: u32) -> Self {
        self.daily_minutes = minutes;
        self
    }

    pub fn with_window(mut self, start: NaiveDate, due: NaiveDate) -> Self {
        self.start_date = start;
        self.due_date = due;
        self
    }

    pub fn with_days_of_week(mut self, days: &[u32]) -> Self {
        self.rule.days_of_week = days.to_vec();
        self
    }

    pub fn with_earliest(mut self, hhmm: impl Into<String>) -> Self {
        self.rule.earliest_hhmm = hhmm.into();
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_estimate_total(mut self, minutes: u32) -> Self {
        self.estimate_total_min = Some(minutes);
        self
    }
}
