// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Stagecraft - a layer-based video composition editor
//!
//! Video, image and text layers are arranged on a fixed-ratio stage and
//! scheduled on a timeline. Projects round-trip through JSON or YAML.

mod app;
mod config;
mod error;
mod io;
mod models;
mod playback;
mod ui;
mod util;

use anyhow::Result;
use app::EditorApp;
use clap::Parser;
use config::EditorConfig;
use io::session::SessionCache;
use models::{project::EditorState, store::Store};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "stagecraft", version, about = "Layer-based video composition editor")]
struct Cli {
    /// Read settings from this file instead of the platform config directory
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the session cache location
    #[arg(long)]
    session_file: Option<PathBuf>,

    /// Start with an empty project, ignoring the session cache
    #[arg(long)]
    fresh: bool,

    /// Import a project file on startup
    #[arg(long)]
    project: Option<PathBuf>,
}

/// Restore the cached session when allowed, otherwise start empty.
fn initial_store(config: &EditorConfig, cache: &SessionCache, fresh: bool) -> Store {
    let restored = if fresh || !config.restore_session {
        None
    } else {
        cache.load()
    };

    let state = match restored {
        Some(mut state) => {
            // Playback and loading never survive a restart.
            state.is_playing = false;
            state.is_loading = false;
            state
        }
        None => EditorState::with_duration(config.default_duration),
    };
    Store::new(state)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut config = EditorConfig::load(cli.config.as_deref());
    if cli.session_file.is_some() {
        config.session_file = cli.session_file.clone();
    }

    let cache = SessionCache::new(config.session_path());
    let mut store = initial_store(&config, &cache, cli.fresh);
    log::info!(
        "Session cache at {} ({} layers restored)",
        cache.path().display(),
        store.state().layers.len()
    );
    let writer = cache.attach(&mut store);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1440.0, 900.0])
            .with_min_inner_size([960.0, 640.0])
            .with_title("Stagecraft"),
        ..Default::default()
    };

    let project = cli.project;
    eframe::run_native(
        "Stagecraft",
        options,
        Box::new(move |_cc| Ok(Box::new(EditorApp::new(store, config, project)))),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    writer.flush();
    Ok(())
}
