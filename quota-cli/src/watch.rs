//! Background ticker: day-boundary snapshotting plus the live-timer
//! quota watchdog. Both ticks are non-blocking and side-effect
//! bounded; all decisions come from the pure engine functions.

use std::collections::HashSet;
use std::time::Duration;

use anyhow::Result;
use tracing::{debug, info};

use quota_core::{
    Clock, DayBoundary, SystemClock, calendar, compute_day_snapshot, missed_on_day,
    tasks_over_quota,
};
use quota_store::{SnapshotStore, TaskStore};

use crate::config::WatchSection;

pub async fn run(tasks: &TaskStore, snapshots: &SnapshotStore, cfg: &WatchSection) -> Result<()> {
    let clock = SystemClock;
    let mut boundary = DayBoundary::new(clock.today());
    // One alert per task per day; cleared at the day boundary.
    let mut alerted: HashSet<String> = HashSet::new();

    let mut day_tick = tokio::time::interval(Duration::from_secs(cfg.day_tick_secs.max(1)));
    let mut quota_tick = tokio::time::interval(Duration::from_secs(cfg.quota_check_secs.max(1)));

    info!(
        day_tick_secs = cfg.day_tick_secs,
        quota_check_secs = cfg.quota_check_secs,
        "watch started"
    );
    println!("Watching. Ctrl-C to stop.");

    loop {
        tokio::select! {
            _ = day_tick.tick() => {
                if let Some(elapsed) = boundary.observe(clock.today()) {
                    alerted.clear();
                    freeze_day(tasks, snapshots, elapsed)?;
                }
            }
            _ = quota_tick.tick() => {
                check_quota(tasks, &clock, &mut alerted);
            }
            _ = tokio::signal::ctrl_c() => {
                info!("watch stopped");
                break;
            }
        }
    }
    Ok(())
}

/// Freeze the outcome of a day that just ended. Write-once: a second
/// observation of the same boundary leaves the first record intact.
fn freeze_day(
    tasks: &TaskStore,
    snapshots: &SnapshotStore,
    elapsed: chrono::NaiveDate,
) -> Result<()> {
    let all = tasks.list();
    let snap = compute_day_snapshot(&all, elapsed);
    if snapshots.record(elapsed, snap)? {
        info!(day = %elapsed, pct = snap.pct, hit = snap.hit, "day snapshot frozen");
    } else {
        debug!(day = %elapsed, "day snapshot already recorded");
    }

    if missed_on_day(&all, elapsed) {
        println!(
            "You missed {}'s quota. Push harder today to catch up.",
            calendar::to_iso(elapsed)
        );
    }
    Ok(())
}

fn check_quota(tasks: &TaskStore, clock: &impl Clock, alerted: &mut HashSet<String>) {
    let all = tasks.list();
    for t in tasks_over_quota(&all, clock.today(), clock.now()) {
        if alerted.insert(t.id.clone()) {
            info!(task = %t.id, "daily quota reached with timer running");
            println!(
                "Time's up for today: \"{}\" has reached its quota. Run `quota stop {}` to save.",
                t.title, t.id
            );
        }
    }
}
