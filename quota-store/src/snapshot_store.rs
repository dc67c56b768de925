//! Append-only per-day snapshot records.
//!
//! Key is the calendar day, value is the frozen outcome. A day is
//! written at most once: later writes for the same day are ignored, so
//! a duplicated boundary tick can never contradict the first record.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use parking_lot::Mutex;
use tracing::debug;

use quota_core::DaySnapshot;

pub struct SnapshotStore {
    path: PathBuf,
    inner: Mutex<BTreeMap<NaiveDate, DaySnapshot>>,
}

impl SnapshotStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let snaps = if path.exists() {
            let s = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
            serde_json::from_str(&s).with_context(|| format!("parse {}", path.display()))?
        } else {
            BTreeMap::new()
        };
        debug!(count = snaps.len(), path = %path.display(), "snapshot store loaded");
        Ok(Self {
            path,
            inner: Mutex::new(snaps),
        })
    }

    /// Record the frozen outcome for `day`. Returns `true` when this
    /// call wrote the record, `false` when one already existed (the
    /// existing record stays authoritative).
    pub fn record(&self, day: NaiveDate, snapshot: DaySnapshot) -> Result<bool> {
        let mut snaps = self.inner.lock();
        if snaps.contains_key(&day) {
            return Ok(false);
        }
        snaps.insert(day, snapshot);
        let json = serde_json::to_string_pretty(&*snaps)?;
        fs::write(&self.path, json).with_context(|| format!("write {}", self.path.display()))?;
        Ok(true)
    }

    pub fn get(&self, day: NaiveDate) -> Option<DaySnapshot> {
        self.inner.lock().get(&day).copied()
    }

    pub fn all(&self) -> BTreeMap<NaiveDate, DaySnapshot> {
        self.inner.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn temp_store(name: &str) -> SnapshotStore {
        let path = std::env::temp_dir().join(format!(
            "quota-snap-test-{}-{}.json",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        SnapshotStore::open(path).unwrap()
    }

    #[test]
    fn record_is_write_once() {
        let store = temp_store("write-once");
        let day = d("2026-03-03");
        let first = DaySnapshot {
            pct: 1.0,
            no_req: false,
            hit: true,
        };
        assert!(store.record(day, first).unwrap());

        // A second write for the same day is dropped, even with a
        // different value (e.g. progress edited after the fact).
        let second = DaySnapshot {
            pct: 0.2,
            no_req: false,
            hit: false,
        };
        assert!(!store.record(day, second).unwrap());
        assert_eq!(store.get(day), Some(first));
    }

    #[test]
    fn snapshots_survive_reopen() {
        let path = std::env::temp_dir().join(format!(
            "quota-snap-test-reopen-{}.json",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        let day = d("2026-03-04");
        let snap = DaySnapshot {
            pct: 0.5,
            no_req: false,
            hit: false,
        };
        {
            let store = SnapshotStore::open(&path).unwrap();
            store.record(day, snap).unwrap();
        }
        let store = SnapshotStore::open(&path).unwrap();
        assert_eq!(store.get(day), Some(snap));
        assert!(!store.record(day, snap).unwrap());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn missing_day_reads_none() {
        let store = temp_store("missing");
        assert_eq!(store.get(d("2026-01-01")), None);
        assert!(store.all().is_empty());
    }
}
