//! Task collection with the single-writer mutation discipline.
//!
//! All mutations lock the collection for their whole read-modify-write
//! and persist before releasing, so the single-active-timer invariant
//! and the effective-done computation can never interleave.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::Mutex;
use tracing::debug;

use quota_core::{RawTask, Task, TaskStatus, required_on_day};

/// Result of asking for a live timer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    /// This task is already running; starting again is a no-op.
    AlreadyRunning,
    /// Another task holds the single live timer.
    Rejected { running_id: String },
    NotFound,
}

/// Result of toggling a task's done status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Done,
    Reopened,
    /// Precondition failed (timer running, quota or effort cap unmet).
    Blocked,
    NotFound,
}

pub struct TaskStore {
    path: PathBuf,
    inner: Mutex<Vec<Task>>,
}

impl TaskStore {
    /// Load the persisted collection, canonicalizing every record.
    /// A missing file is an empty store, not an error.
    pub fn open(path: impl Into<PathBuf>, today: NaiveDate) -> Result<Self> {
        let path = path.into();
        let tasks = if path.exists() {
            let s = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
            let raw: Vec<RawTask> =
                serde_json::from_str(&s).with_context(|| format!("parse {}", path.display()))?;
            raw.into_iter()
                .enumerate()
                .map(|(i, r)| Task::from_raw(r, format!("task-{i}"), today))
                .collect()
        } else {
            Vec::new()
        };
        debug!(count = tasks.len(), path = %path.display(), "task store loaded");
        Ok(Self {
            path,
            inner: Mutex::new(tasks),
        })
    }

    fn save_locked(&self, tasks: &[Task]) -> Result<()> {
        let json = serde_json::to_string_pretty(tasks)?;
        fs::write(&self.path, json).with_context(|| format!("write {}", self.path.display()))?;
        Ok(())
    }

    pub fn list(&self) -> Vec<Task> {
        self.inner.lock().clone()
    }

    pub fn get(&self, id: &str) -> Option<Task> {
        self.inner.lock().iter().find(|t| t.id == id).cloned()
    }

    pub fn add(&self, task: Task) -> Result<()> {
        let mut tasks = self.inner.lock();
        tasks.insert(0, task);
        self.save_locked(&tasks)
    }

    pub fn remove(&self, id: &str) -> Result<bool> {
        let mut tasks = self.inner.lock();
        let before = tasks.len();
        tasks.retain(|t| t.id != id);
        let removed = tasks.len() != before;
        if removed {
            self.save_locked(&tasks)?;
        }
        Ok(removed)
    }

    /// Apply an edit to a task. Edits are ignored once the task has
    /// left `todo`.
    pub fn update(&self, id: &str, edit: impl FnOnce(&mut Task)) -> Result<bool> {
        let mut tasks = self.inner.lock();
        let Some(task) = tasks.iter_mut().find(|t| t.id == id) else {
            return Ok(false);
        };
        if task.status != TaskStatus::Todo {
            return Ok(false);
        }
        edit(task);
        self.save_locked(&tasks)?;
        Ok(true)
    }

    /// Append minutes to a day's ledger entry.
    pub fn log_progress(&self, id: &str, day: NaiveDate, minutes: u32) -> Result<bool> {
        let mut tasks = self.inner.lock();
        let Some(task) = tasks.iter_mut().find(|t| t.id == id) else {
            return Ok(false);
        };
        let entry = task.progress.entry(day).or_insert(0);
        *entry = entry.saturating_add(minutes);
        self.save_locked(&tasks)?;
        Ok(true)
    }

    /// Start the live timer on a task. Rejected while any other task
    /// is running; idempotent when this task already runs.
    pub fn start_timer(&self, id: &str, now: DateTime<Utc>) -> Result<StartOutcome> {
        let mut tasks = self.inner.lock();

        if let Some(other) = tasks.iter().find(|t| t.running_from.is_some() && t.id != id) {
            return Ok(StartOutcome::Rejected {
                running_id: other.id.clone(),
            });
        }
        let Some(task) = tasks.iter_mut().find(|t| t.id == id) else {
            return Ok(StartOutcome::NotFound);
        };
        if task.running_from.is_some() {
            return Ok(StartOutcome::AlreadyRunning);
        }
        task.status = TaskStatus::InProgress;
        task.running_from = Some(now);
        self.save_locked(&tasks)?;
        Ok(StartOutcome::Started)
    }

    /// Stop the live timer, committing the rounded delta into today's
    /// ledger entry and the cumulative total atomically with clearing
    /// the mark. Returns the committed minutes, `None` when no timer
    /// was running (a no-op).
    pub fn stop_timer(
        &self,
        id: &str,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<Option<u32>> {
        let mut tasks = self.inner.lock();
        let Some(task) = tasks.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };
        let Some(from) = task.running_from else {
            return Ok(None);
        };

        let secs = (now - from).num_seconds().max(0);
        let delta = (secs as f64 / 60.0).round() as u32;

        let entry = task.progress.entry(today).or_insert(0);
        *entry = entry.saturating_add(delta);
        task.actual_minutes = task.actual_minutes.saturating_add(delta);
        task.running_from = None;
        task.status = TaskStatus::Todo;
        self.save_locked(&tasks)?;
        Ok(Some(delta))
    }

    /// Toggle between done and todo. The transition to done requires
    /// no running timer, today's quota met, and (when an effort cap is
    /// set) the cumulative total reached; otherwise it is a no-op.
    pub fn toggle_status(
        &self,
        id: &str,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<ToggleOutcome> {
        let mut tasks = self.inner.lock();
        let Some(task) = tasks.iter_mut().find(|t| t.id == id) else {
            return Ok(ToggleOutcome::NotFound);
        };

        if task.status == TaskStatus::Done {
            task.status = TaskStatus::Todo;
            task.completed_at = None;
            self.save_locked(&tasks)?;
            return Ok(ToggleOutcome::Reopened);
        }

        if task.running_from.is_some() {
            return Ok(ToggleOutcome::Blocked);
        }
        let required = required_on_day(task, today);
        let done = quota_core::logged_on_day(task, today);
        if required > 0 && done < required {
            return Ok(ToggleOutcome::Blocked);
        }
        if let Some(cap) = task.estimate_total_min
            && task.actual_minutes < cap
        {
            return Ok(ToggleOutcome::Blocked);
        }

        task.status = TaskStatus::Done;
        task.completed_at = Some(now);
        self.save_locked(&tasks)?;
        Ok(ToggleOutcome::Done)
    }
}
