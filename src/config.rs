// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Editor configuration.
//!
//! Settings are read from `config.toml` in the platform config directory
//! (or an explicit path). Anything missing falls back to its default, and
//! an unreadable file falls back entirely.

use crate::models::project::DEFAULT_DURATION;
use crate::playback::media_sync::SyncThresholds;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "config.toml";
const SESSION_FILE: &str = "session.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Timeline length of new projects, in seconds.
    pub default_duration: f64,
    pub playing_drift_threshold: f64,
    pub paused_drift_threshold: f64,
    pub restore_session: bool,
    pub session_file: Option<PathBuf>,
    pub playback_speeds: Vec<f64>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        let thresholds = SyncThresholds::default();
        Self {
            default_duration: DEFAULT_DURATION,
            playing_drift_threshold: thresholds.playing,
            paused_drift_threshold: thresholds.paused,
            restore_session: true,
            session_file: None,
            playback_speeds: vec![0.5, 1.0, 1.5, 2.0],
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "stagecraft", "stagecraft")
}

impl EditorConfig {
    /// Load from `path`, or from the default location when `None`.
    pub fn load(path: Option<&Path>) -> Self {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match project_dirs() {
                Some(dirs) => dirs.config_dir().join(CONFIG_FILE),
                None => return Self::default(),
            },
        };

        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(text) => match Self::parse(&text) {
                Ok(config) => {
                    log::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    log::warn!("Failed to parse config file, using defaults: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Failed to read config file, using defaults: {}", e);
                Self::default()
            }
        }
    }

    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn thresholds(&self) -> SyncThresholds {
        SyncThresholds {
            playing: self.playing_drift_threshold,
            paused: self.paused_drift_threshold,
        }
    }

    /// Where the session cache lives: the configured file, else the cache directory.
    pub fn session_path(&self) -> PathBuf {
        if let Some(path) = &self.session_file {
            return path.clone();
        }
        match project_dirs() {
            Some(dirs) => dirs.cache_dir().join(SESSION_FILE),
            None => std::env::temp_dir().join("stagecraft").join(SESSION_FILE),
        }
    }
}
