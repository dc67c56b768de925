//! quota-store: persistence and serialized mutations for the quota
//! engine. Tasks and snapshots live as JSON files under `~/.quota`;
//! all writes go through a single lock per collection.

pub mod paths;
pub mod snapshot_store;
pub mod task_store;

pub use paths::{ensure_quota_home, quota_home, snapshots_path, tasks_path};
pub use snapshot_store::SnapshotStore;
pub use task_store::{StartOutcome, TaskStore, ToggleOutcome};
