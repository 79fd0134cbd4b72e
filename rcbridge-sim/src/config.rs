//! Load simulation settings from file and environment.

use serde::Deserialize;
use std::path::PathBuf;

/// Simulation settings. File: `rcbridge-sim.toml` in the working directory.
/// Env overrides: RCBRIDGE_TICKS, RCBRIDGE_STORE_DIR, RCBRIDGE_DEGRADE_AT.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimConfig {
    /// Cooperative loop iterations to run (default 4000).
    #[serde(default = "default_ticks")]
    pub ticks: u64,
    /// Directory holding the endpoints' blob stores (default "rcbridge-state").
    #[serde(default = "default_store_dir")]
    pub store_dir: PathBuf,
    /// Tick at which the sender's estimator samples are forced low to
    /// demonstrate a coordinated hop (default 1000; 0 disables).
    #[serde(default = "default_degrade_at")]
    pub degrade_at: u64,
}

fn default_ticks() -> u64 {
    4000
}

fn default_store_dir() -> PathBuf {
    PathBuf::from("rcbridge-state")
}

fn default_degrade_at() -> u64 {
    1000
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            ticks: default_ticks(),
            store_dir: default_store_dir(),
            degrade_at: default_degrade_at(),
        }
    }
}

/// Load config: defaults, then the config file (if present), then env vars.
pub fn load() -> SimConfig {
    let mut config = load_file().unwrap_or_default();
    if let Ok(s) = std::env::var("RCBRIDGE_TICKS") {
        if let Ok(n) = s.parse::<u64>() {
            config.ticks = n;
        }
    }
    if let Ok(s) = std::env::var("RCBRIDGE_STORE_DIR") {
        config.store_dir = PathBuf::from(s);
    }
    if let Ok(s) = std::env::var("RCBRIDGE_DEGRADE_AT") {
        if let Ok(n) = s.parse::<u64>() {
            config.degrade_at = n;
        }
    }
    config
}

fn load_file() -> Option<SimConfig> {
    let text = std::fs::read_to_string("rcbridge-sim.toml").ok()?;
    match toml::from_str(&text) {
        Ok(config) => Some(config),
        Err(err) => {
            tracing::warn!("ignoring rcbridge-sim.toml: {err}");
            None
        }
    }
}
