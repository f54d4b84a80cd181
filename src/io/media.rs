// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Media file loading and asset preloading.
//!
//! This module loads image files for display in egui, checks every asset a
//! project references before the project is hydrated, and provides the
//! virtual media player used as the handle behind video layers.

use crate::error::{EditorError, EditorResult};
use crate::models::layer::LayerType;
use crate::models::project::EditorState;
use crate::playback::media_sync::{MediaBackend, MediaHandle};
use std::path::Path;
use std::sync::mpsc::channel;

/// Decoded RGBA image ready to upload as a texture.
pub struct LoadedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Load an image file and convert it to RGBA8.
pub fn load_image(path: &Path) -> EditorResult<LoadedImage> {
    let img = image::open(path)?.to_rgba8();
    let (width, height) = img.dimensions();
    Ok(LoadedImage {
        width,
        height,
        pixels: img.into_raw(),
    })
}

/// Outcome of preloading a single asset. Both variants count as ready.
#[derive(Debug, Clone, PartialEq)]
pub enum AssetStatus {
    Loaded,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssetReport {
    pub url: String,
    pub status: AssetStatus,
}

/// Media URLs referenced by image and video layers, in layer order.
pub fn referenced_assets(state: &EditorState) -> Vec<(LayerType, String)> {
    state
        .layers
        .iter()
        .filter_map(|layer| {
            let url = match layer.layer_type {
                LayerType::Image => layer.options.image_url.as_deref(),
                LayerType::Video => layer.options.video_url.as_deref(),
                LayerType::Text => None,
            }?;
            (!url.is_empty()).then(|| (layer.layer_type, url.to_string()))
        })
        .collect()
}

fn check_asset(layer_type: LayerType, url: &str) -> EditorResult<()> {
    let path = Path::new(url.strip_prefix("file://").unwrap_or(url));
    match layer_type {
        LayerType::Image => load_image(path).map(|_| ()),
        _ => {
            let metadata = std::fs::metadata(path)?;
            if metadata.is_file() {
                Ok(())
            } else {
                Err(EditorError::Io(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("{} is not a file", path.display()),
                )))
            }
        }
    }
}

/// Check every referenced asset concurrently and wait for all of them.
///
/// A failed check never aborts the batch; it is reported and treated as ready.
pub fn preload_assets(state: &EditorState) -> Vec<AssetReport> {
    let assets = referenced_assets(state);
    let count = assets.len();
    let (sender, receiver) = channel();

    for (index, (layer_type, url)) in assets.into_iter().enumerate() {
        let sender = sender.clone();
        std::thread::spawn(move || {
            let status = match check_asset(layer_type, &url) {
                Ok(()) => AssetStatus::Loaded,
                Err(e) => {
                    log::warn!("Asset {} failed to load: {}", url, e);
                    AssetStatus::Failed(e.to_string())
                }
            };
            let _ = sender.send((index, AssetReport { url, status }));
        });
    }
    drop(sender);

    let mut reports: Vec<(usize, AssetReport)> = receiver.iter().take(count).collect();
    reports.sort_by_key(|(index, _)| *index);
    let reports: Vec<AssetReport> = reports.into_iter().map(|(_, r)| r).collect();
    log::info!(
        "Preloaded {} assets ({} failed)",
        reports.len(),
        reports.iter().filter(|r| r.status != AssetStatus::Loaded).count()
    );
    reports
}

/// Media handle without a decoder: keeps position, state and rate, and
/// advances its own position when the host tells it time has passed.
#[derive(Debug, Clone)]
pub struct VirtualPlayer {
    source: Option<String>,
    muted: bool,
    position: f64,
    paused: bool,
    rate: f64,
    released: bool,
    seeks: usize,
    commands: usize,
    source_changes: usize,
}

impl VirtualPlayer {
    pub fn new(source: Option<&str>, muted: bool) -> Self {
        Self {
            source: source.map(str::to_string),
            muted,
            position: 0.0,
            paused: true,
            rate: 1.0,
            released: false,
            seeks: 0,
            commands: 0,
            source_changes: 0,
        }
    }

    /// Move the playhead forward by `seconds` of wall time when playing.
    pub fn advance(&mut self, seconds: f64) {
        if !self.paused && !self.released {
            self.position += seconds * self.rate;
        }
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    pub fn seek_count(&self) -> usize {
        self.seeks
    }

    /// Number of state-changing calls received.
    pub fn command_count(&self) -> usize {
        self.commands
    }

    pub fn source_changes(&self) -> usize {
        self.source_changes
    }
}

impl MediaHandle for VirtualPlayer {
    fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    fn set_source(&mut self, url: &str) {
        self.commands += 1;
        self.source_changes += 1;
        self.source = Some(url.to_string());
        self.position = 0.0;
    }

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn position(&self) -> f64 {
        self.position
    }

    fn seek(&mut self, seconds: f64) {
        self.commands += 1;
        self.seeks += 1;
        self.position = seconds.max(0.0);
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn play(&mut self) {
        self.commands += 1;
        self.paused = false;
    }

    fn pause(&mut self) {
        self.commands += 1;
        self.paused = true;
    }

    fn rate(&self) -> f64 {
        self.rate
    }

    fn set_rate(&mut self, rate: f64) {
        self.commands += 1;
        self.rate = rate;
    }

    fn release(&mut self) {
        self.paused = true;
        self.released = true;
    }
}

#[derive(Debug, Default)]
pub struct VirtualBackend {
    opened: usize,
}

impl VirtualBackend {
    pub fn opened(&self) -> usize {
        self.opened
    }
}

impl MediaBackend for VirtualBackend {
    type Handle = VirtualPlayer;

    fn open(&mut self, url: Option<&str>, muted: bool) -> VirtualPlayer {
        self.opened += 1;
        VirtualPlayer::new(url, muted)
    }
}
