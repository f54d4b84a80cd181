// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Media synchronization.
//!
//! Each visible video layer owns one media handle, wrapped in a
//! [`MediaSyncController`]. On every frame the controller compares the
//! handle's own position with where the shared clock says it should be and
//! corrects it: loosely while playing (two clocks always disagree a little),
//! tightly while paused (scrubbing needs the right frame).
//!
//! The lifecycle is explicit: [`MediaSyncController::acquire`] binds a
//! handle, [`MediaSyncController::reconcile`] runs per tick and
//! [`MediaSyncController::release`] disposes of it.

use crate::models::layer::{Layer, LayerId, LayerType};
use crate::models::project::EditorState;
use std::collections::HashMap;

/// A playable media element the controller can steer.
pub trait MediaHandle {
    fn source(&self) -> Option<&str>;
    fn set_source(&mut self, url: &str);
    fn set_muted(&mut self, muted: bool);
    /// Playback position in seconds.
    fn position(&self) -> f64;
    fn seek(&mut self, seconds: f64);
    fn is_paused(&self) -> bool;
    fn play(&mut self);
    fn pause(&mut self);
    fn rate(&self) -> f64;
    fn set_rate(&mut self, rate: f64);
    fn release(&mut self);
}

/// Creates media handles for video URLs.
pub trait MediaBackend {
    type Handle: MediaHandle;

    fn open(&mut self, url: Option<&str>, muted: bool) -> Self::Handle;
}

/// Drift tolerances, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyncThresholds {
    pub playing: f64,
    pub paused: f64,
}

impl Default for SyncThresholds {
    fn default() -> Self {
        Self {
            playing: 0.5,
            paused: 0.1,
        }
    }
}

/// The parts of the editor state a controller reacts to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClockSnapshot {
    pub current_time: f64,
    pub is_playing: bool,
    pub playback_speed: f64,
}

impl From<&EditorState> for ClockSnapshot {
    fn from(state: &EditorState) -> Self {
        Self {
            current_time: state.current_time,
            is_playing: state.is_playing,
            playback_speed: state.playback_speed,
        }
    }
}

/// What a reconcile pass decided.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SyncOutcome {
    /// Cursor is outside the layer's window; handle parked at 0.
    Parked,
    /// Handle was within tolerance.
    InSync,
    /// Handle was moved to the given layer-relative time.
    Seeked(f64),
}

#[derive(Debug)]
pub struct MediaSyncController<H: MediaHandle> {
    layer_id: LayerId,
    handle: H,
    thresholds: SyncThresholds,
}

impl<H: MediaHandle> MediaSyncController<H> {
    /// Bind a fresh handle to the layer's video URL and mute flag.
    pub fn acquire<B>(backend: &mut B, layer: &Layer, thresholds: SyncThresholds) -> Self
    where
        B: MediaBackend<Handle = H>,
    {
        let handle = backend.open(layer.options.video_url.as_deref(), layer.options.is_muted());
        log::debug!("acquired media handle for layer {}", layer.id);
        Self {
            layer_id: layer.id.clone(),
            handle,
            thresholds,
        }
    }

    pub fn layer_id(&self) -> &str {
        &self.layer_id
    }

    pub fn handle(&self) -> &H {
        &self.handle
    }

    pub fn handle_mut(&mut self) -> &mut H {
        &mut self.handle
    }

    /// Re-point the handle only if the URL changed; mute is always applied.
    pub fn rebind(&mut self, layer: &Layer) {
        if let Some(url) = layer.options.video_url.as_deref() {
            if self.handle.source() != Some(url) {
                log::debug!("rebinding layer {} to {}", layer.id, url);
                self.handle.set_source(url);
            }
        }
        self.handle.set_muted(layer.options.is_muted());
    }

    /// Bring the handle in line with the clock. Re-running on unchanged input is a no-op.
    pub fn reconcile(&mut self, layer: &Layer, clock: ClockSnapshot) -> SyncOutcome {
        if self.handle.rate() != clock.playback_speed {
            self.handle.set_rate(clock.playback_speed);
        }

        let relative = clock.current_time - layer.timeline.start;
        if relative < 0.0 || relative > layer.timeline.duration() {
            if !self.handle.is_paused() {
                self.handle.pause();
            }
            if self.handle.position() != 0.0 {
                self.handle.seek(0.0);
            }
            return SyncOutcome::Parked;
        }

        let threshold = if clock.is_playing {
            if self.handle.is_paused() {
                self.handle.play();
            }
            self.thresholds.playing
        } else {
            if !self.handle.is_paused() {
                self.handle.pause();
            }
            self.thresholds.paused
        };

        let drift = (self.handle.position() - relative).abs();
        if drift > threshold {
            log::debug!(
                "layer {} drifted {:.3}s, seeking to {:.3}s",
                self.layer_id,
                drift,
                relative
            );
            self.handle.seek(relative);
            SyncOutcome::Seeked(relative)
        } else {
            SyncOutcome::InSync
        }
    }

    /// Dispose of the handle.
    pub fn release(mut self) {
        log::debug!("released media handle for layer {}", self.layer_id);
        self.handle.release();
    }
}

/// One controller per visible video layer.
pub struct MediaSync<B: MediaBackend> {
    backend: B,
    thresholds: SyncThresholds,
    controllers: HashMap<LayerId, MediaSyncController<B::Handle>>,
}

impl<B: MediaBackend> MediaSync<B> {
    pub fn new(backend: B, thresholds: SyncThresholds) -> Self {
        Self {
            backend,
            thresholds,
            controllers: HashMap::new(),
        }
    }

    pub fn controller(&self, layer_id: &str) -> Option<&MediaSyncController<B::Handle>> {
        self.controllers.get(layer_id)
    }

    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }

    /// Acquire, rebind and reconcile controllers for the visible video layers,
    /// releasing those whose layer left the set.
    pub fn reconcile_visible<'a>(
        &mut self,
        visible: impl IntoIterator<Item = &'a Layer>,
        clock: ClockSnapshot,
    ) {
        let videos: Vec<&Layer> = visible
            .into_iter()
            .filter(|l| l.layer_type == LayerType::Video)
            .collect();

        let stale: Vec<LayerId> = self
            .controllers
            .keys()
            .filter(|id| !videos.iter().any(|l| &l.id == *id))
            .cloned()
            .collect();
        for id in stale {
            if let Some(controller) = self.controllers.remove(&id) {
                controller.release();
            }
        }

        let thresholds = self.thresholds;
        for layer in videos {
            let backend = &mut self.backend;
            let controller = self
                .controllers
                .entry(layer.id.clone())
                .or_insert_with(|| MediaSyncController::acquire(backend, layer, thresholds));
            controller.rebind(layer);
            controller.reconcile(layer, clock);
        }
    }

    /// Apply a closure to every live handle, e.g. to advance simulated players.
    pub fn for_each_handle(&mut self, mut f: impl FnMut(&mut B::Handle)) {
        for controller in self.controllers.values_mut() {
            f(controller.handle_mut());
        }
    }

    pub fn release_all(&mut self) {
        for (_, controller) in self.controllers.drain() {
            controller.release();
        }
    }
}

impl<B: MediaBackend> std::fmt::Debug for MediaSync<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaSync")
            .field("thresholds", &self.thresholds)
            .field("controllers", &self.controllers.len())
            .finish()
    }
}

impl<B: MediaBackend> Drop for MediaSync<B> {
    fn drop(&mut self) {
        self.release_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::media::{VirtualBackend, VirtualPlayer};
    use crate::models::layer::{Geometry, LayerOptions, TimeRange};

    fn video_layer(id: &str, start: f64, end: f64) -> Layer {
        Layer {
            id: id.into(),
            layer_type: LayerType::Video,
            name: "Video Layer".into(),
            z_index: 1,
            timeline: TimeRange::new(start, end),
            geometry: Geometry {
                x: 0.1,
                y: 0.1,
                width: 0.3,
                height: 0.3,
            },
            options: LayerOptions::video("clip.mp4"),
        }
    }

    fn controller(layer: &Layer) -> MediaSyncController<VirtualPlayer> {
        MediaSyncController::acquire(&mut VirtualBackend::default(), layer, SyncThresholds::default())
    }

    fn clock(current_time: f64, is_playing: bool) -> ClockSnapshot {
        ClockSnapshot {
            current_time,
            is_playing,
            playback_speed: 1.0,
        }
    }

    #[test]
    fn test_large_drift_while_playing_seeks() {
        let layer = video_layer("v", 2.0, 10.0);
        let mut c = controller(&layer);
        c.handle_mut().seek(4.3);
        let seeks = c.handle().seek_count();

        let outcome = c.reconcile(&layer, clock(5.0, true));
        assert_eq!(outcome, SyncOutcome::Seeked(3.0));
        assert!(!c.handle().is_paused());
        assert!((c.handle().position() - 3.0).abs() < 1e-9);
        assert_eq!(c.handle().seek_count(), seeks + 1);
    }

    #[test]
    fn test_handle_ahead_of_window_is_pulled_back() {
        let layer = video_layer("v", 2.0, 10.0);
        let mut c = controller(&layer);
        c.handle_mut().seek(4.6);

        let outcome = c.reconcile(&layer, clock(5.0, true));
        assert_eq!(outcome, SyncOutcome::Seeked(3.0));
        assert!((c.handle().position() - 3.0).abs() < 1e-9);
        assert!(!c.handle().is_paused());
    }

    #[test]
    fn test_small_drift_while_playing_is_tolerated() {
        let layer = video_layer("v", 2.0, 10.0);
        let mut c = controller(&layer);
        c.handle_mut().seek(3.4);
        let seeks = c.handle().seek_count();

        let outcome = c.reconcile(&layer, clock(5.0, true));
        assert_eq!(outcome, SyncOutcome::InSync);
        assert_eq!(c.handle().seek_count(), seeks);
        assert!(!c.handle().is_paused());
    }

    #[test]
    fn test_paused_uses_tighter_threshold() {
        let layer = video_layer("v", 2.0, 10.0);
        let mut c = controller(&layer);
        c.handle_mut().seek(3.3);
        c.handle_mut().play();

        let outcome = c.reconcile(&layer, clock(5.0, false));
        assert_eq!(outcome, SyncOutcome::Seeked(3.0));
        assert!(c.handle().is_paused());
    }

    #[test]
    fn test_outside_window_parks_at_zero() {
        let layer = video_layer("v", 2.0, 10.0);
        let mut c = controller(&layer);
        c.handle_mut().seek(1.5);
        c.handle_mut().play();

        assert_eq!(c.reconcile(&layer, clock(11.0, true)), SyncOutcome::Parked);
        assert!(c.handle().is_paused());
        assert_eq!(c.handle().position(), 0.0);
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let layer = video_layer("v", 2.0, 10.0);
        let mut c = controller(&layer);
        c.reconcile(&layer, clock(5.0, false));
        let seeks = c.handle().seek_count();
        let commands = c.handle().command_count();

        for _ in 0..3 {
            assert_eq!(c.reconcile(&layer, clock(5.0, false)), SyncOutcome::InSync);
        }
        assert_eq!(c.handle().seek_count(), seeks);
        assert_eq!(c.handle().command_count(), commands);
    }

    #[test]
    fn test_speed_is_forwarded() {
        let layer = video_layer("v", 0.0, 10.0);
        let mut c = controller(&layer);
        let snapshot = ClockSnapshot {
            current_time: 1.0,
            is_playing: true,
            playback_speed: 1.5,
        };
        c.reconcile(&layer, snapshot);
        assert_eq!(c.handle().rate(), 1.5);
    }

    #[test]
    fn test_rebind_only_on_url_change() {
        let mut layer = video_layer("v", 0.0, 10.0);
        let mut c = controller(&layer);
        c.rebind(&layer);
        assert_eq!(c.handle().source_changes(), 0);

        layer.options.video_url = Some("other.mp4".into());
        layer.options.mute = Some(true);
        c.rebind(&layer);
        assert_eq!(c.handle().source(), Some("other.mp4"));
        assert_eq!(c.handle().source_changes(), 1);
        assert!(c.handle().is_muted());
    }

    #[test]
    fn test_registry_tracks_visible_videos() {
        let a = video_layer("a", 0.0, 10.0);
        let b = video_layer("b", 0.0, 10.0);
        let mut sync = MediaSync::new(VirtualBackend::default(), SyncThresholds::default());

        sync.reconcile_visible([&a, &b], clock(1.0, false));
        assert_eq!(sync.len(), 2);

        sync.reconcile_visible([&b], clock(1.0, false));
        assert_eq!(sync.len(), 1);
        assert!(sync.controller("a").is_none());
        assert!(sync.controller("b").is_some());
    }
}
