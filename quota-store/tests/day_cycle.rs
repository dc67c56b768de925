//! End-to-end day cycle: timer, day boundary, frozen snapshot, and
//! history that stays fixed after later edits.

use chrono::{DateTime, NaiveDate, Utc};

use quota_core::{DayBoundary, Task, compute_day_snapshot, day_hit};
use quota_store::{SnapshotStore, TaskStore};

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn at(s: &str) -> DateTime<Utc> {
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .unwrap()
        .and_utc()
}

fn temp_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("quota-cycle-{}-{}.json", name, std::process::id()))
}

#[test]
fn timer_day_boundary_and_frozen_history() {
    let tasks_path = temp_path("tasks");
    let snaps_path = temp_path("snaps");
    let _ = std::fs::remove_file(&tasks_path);
    let _ = std::fs::remove_file(&snaps_path);

    let day1 = d("2026-03-01");
    let day2 = d("2026-03-02");

    let tasks = TaskStore::open(&tasks_path, day1).unwrap();
    let snapshots = SnapshotStore::open(&snaps_path).unwrap();

    let task = Task::new("t1", "exam prep", day1)
        .with_window(day1, d("2026-03-10"))
        .with_daily_minutes(60);
    tasks.add(task).unwrap();

    // Work a full hour on day 1 via the timer.
    tasks.start_timer("t1", at("2026-03-01 20:00:00")).unwrap();
    let delta = tasks
        .stop_timer("t1", day1, at("2026-03-01 21:00:00"))
        .unwrap();
    assert_eq!(delta, Some(60));

    // The ticker crosses midnight and freezes day 1.
    let mut boundary = DayBoundary::new(day1);
    let elapsed = boundary.observe(day2).unwrap();
    assert_eq!(elapsed, day1);

    let all = tasks.list();
    let snap = compute_day_snapshot(&all, elapsed);
    assert!(snap.hit);
    assert!(snapshots.record(elapsed, snap).unwrap());

    // Later the ledger is edited; the frozen record must not move.
    tasks
        .update("t1", |t| {
            t.progress.insert(day1, 0);
        })
        .unwrap();
    let mutated = tasks.list();
    let recomputed = compute_day_snapshot(&mutated, day1);
    assert!(!recomputed.hit);

    assert!(!snapshots.record(day1, recomputed).unwrap());
    let stored = snapshots.get(day1).unwrap();
    assert!(stored.hit);

    // Calendar-style reads prefer the snapshot for the past day.
    let now = at("2026-03-02 09:00:00");
    assert!(day_hit(day1, day2, now, &mutated, snapshots.get(day1).as_ref()));

    let _ = std::fs::remove_file(&tasks_path);
    let _ = std::fs::remove_file(&snaps_path);
}
