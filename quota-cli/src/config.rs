use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use quota_store::ensure_quota_home;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub analytics: AnalyticsSection,
    pub watch: WatchSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsSection {
    /// Rolling window for adherence/streak/deficit metrics.
    pub window_days: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchSection {
    /// How often the ticker samples the current day.
    pub day_tick_secs: u64,
    /// How often the running timer is checked against today's quota.
    pub quota_check_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            analytics: AnalyticsSection::default(),
            watch: WatchSection::default(),
        }
    }
}

impl Default for AnalyticsSection {
    fn default() -> Self {
        Self { window_days: 14 }
    }
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            day_tick_secs: 15,
            quota_check_secs: 2,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_quota_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    Ok(toml::from_str(&s).context("parse config.toml")?)
}
