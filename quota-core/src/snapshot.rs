//! Frozen daily outcomes.
//!
//! A snapshot is written once for a day after the wall clock has moved
//! past it, and is then the permanent record for that day. Historical
//! views must read the snapshot rather than recompute from the live
//! progress ledger, which may have been edited since.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::accounting::{done_today, logged_on_day};
use crate::activity::required_on_day;
use crate::analytics::HIT_THRESHOLD;
use crate::task::Task;

/// Frozen outcome of one elapsed day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DaySnapshot {
    /// Fraction of required minutes done, clamped to 0..1. Zero when
    /// nothing was required.
    pub pct: f64,
    /// True when the day carried no requirement at all.
    pub no_req: bool,
    /// True when a requirement existed and was fully met.
    pub hit: bool,
}

/// Compute the outcome for an elapsed day from the persisted ledger
/// only. The live timer never contributes: the day is over.
pub fn compute_day_snapshot(tasks: &[Task], day: NaiveDate) -> DaySnapshot {
    let valid = tasks.iter().filter(|t| t.has_valid_window());

    let mut required: u32 = 0;
    let mut done: u32 = 0;
    for t in valid {
        required += required_on_day(t, day);
        done += logged_on_day(t, day);
    }

    let no_req = required == 0;
    let pct = if no_req {
        0.0
    } else {
        (f64::from(done) / f64::from(required)).clamp(0.0, 1.0)
    };
    DaySnapshot {
        pct,
        no_req,
        hit: !no_req && pct >= HIT_THRESHOLD,
    }
}

/// True when any valid task had a positive requirement on `day` that
/// the persisted ledger left unmet. Drives the missed-day notice.
pub fn missed_on_day(tasks: &[Task], day: NaiveDate) -> bool {
    tasks.iter().filter(|t| t.has_valid_window()).any(|t| {
        let req = required_on_day(t, day);
        req > 0 && logged_on_day(t, day) < req
    })
}

/// Whether a calendar day counts as fully met, preferring the stored
/// snapshot for any day strictly before today. Today is recomputed
/// live (including the running timer); future days are never hit.
pub fn day_hit(
    day: NaiveDate,
    today: NaiveDate,
    now: DateTime<Utc>,
    tasks: &[Task],
    snapshot: Option<&DaySnapshot>,
) -> bool {
    if day < today {
        return snapshot.is_some_and(|s| s.hit);
    }
    if day > today {
        return false;
    }
    let valid: Vec<&Task> = tasks.iter().filter(|t| t.has_valid_window()).collect();
    let required: u32 = valid.iter().map(|t| required_on_day(t, day)).sum();
    if required == 0 {
        return false;
    }
    let done: u32 = valid.iter().map(|t| done_today(t, today, now)).sum();
    f64::from(done) / f64::from(required) >= HIT_THRESHOLD
}

/// Detects the wall clock crossing midnight. Feed it the sampled day
/// on every tick; it yields each elapsed day exactly once.
#[derive(Debug, Clone, Copy)]
pub struct DayBoundary {
    prev: NaiveDate,
}

impl DayBoundary {
    pub fn new(today: NaiveDate) -> Self {
        Self { prev: today }
    }

    /// Returns the day that just ended when `today` has advanced,
    /// otherwise `None`.
    pub fn observe(&mut self, today: NaiveDate) -> Option<NaiveDate> {
        if today == self.prev {
            return None;
        }
        let elapsed = self.prev;
        self.prev = today;
        Some(elapsed)
    }
}
