//! Home-directory layout: everything lives under `~/.quota`.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

pub fn quota_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".quota"))
}

pub fn ensure_quota_home() -> Result<PathBuf> {
    let dir = quota_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn tasks_path() -> Result<PathBuf> {
    Ok(ensure_quota_home()?.join("tasks.json"))
}

pub fn snapshots_path() -> Result<PathBuf> {
    Ok(ensure_quota_home()?.join("snapshots.json"))
}
