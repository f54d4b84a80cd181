// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! The project state store.
//!
//! All mutation goes through [`Action`]s applied by [`Store::dispatch`].
//! Transitions are synchronous and total: they never fail and never
//! validate beyond keeping the cursor inside the timeline. After each
//! dispatch every subscriber is notified with the new state, which is how
//! the session cache and renderers stay decoupled from the store.

use super::layer::{Layer, LayerChanges, LayerId, LayerOptions, LayerType, TimeRange};
use super::placement;
use super::project::{AspectRatio, EditorState};
use uuid::Uuid;

/// Named state transitions.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    AddLayer(Layer),
    UpdateLayer { id: LayerId, changes: LayerChanges },
    RemoveLayer(LayerId),
    SetSelectedLayer(Option<LayerId>),
    SetStageSize(AspectRatio),
    SetCurrentTime(f64),
    SetIsPlaying(bool),
    SetPlaybackSpeed(f64),
    SetLoading(bool),
    LoadState(Box<EditorState>),
}

impl Action {
    fn name(&self) -> &'static str {
        match self {
            Action::AddLayer(_) => "add-layer",
            Action::UpdateLayer { .. } => "update-layer",
            Action::RemoveLayer(_) => "remove-layer",
            Action::SetSelectedLayer(_) => "set-selected-layer",
            Action::SetStageSize(_) => "set-stage-size",
            Action::SetCurrentTime(_) => "set-current-time",
            Action::SetIsPlaying(_) => "set-is-playing",
            Action::SetPlaybackSpeed(_) => "set-playback-speed",
            Action::SetLoading(_) => "set-loading",
            Action::LoadState(_) => "load-state",
        }
    }

    fn touches_layers(&self) -> bool {
        matches!(
            self,
            Action::AddLayer(_)
                | Action::UpdateLayer { .. }
                | Action::RemoveLayer(_)
                | Action::LoadState(_)
        )
    }
}

/// Input for the add-layer transition; id, z-index, name and geometry are derived.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLayer {
    pub layer_type: LayerType,
    pub options: LayerOptions,
    pub start: f64,
    pub end: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&EditorState)>;

/// Single source of truth for the editing session.
pub struct Store {
    state: EditorState,
    /// Bumped whenever the layer collection may have changed.
    layers_revision: u64,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
}

impl Default for Store {
    fn default() -> Self {
        Self::new(EditorState::default())
    }
}

impl Store {
    pub fn new(state: EditorState) -> Self {
        Self {
            state,
            layers_revision: 0,
            subscribers: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn layers_revision(&self) -> u64 {
        self.layers_revision
    }

    pub fn selected_layer(&self) -> Option<&Layer> {
        self.state.selected_layer()
    }

    /// Register a callback run after every dispatch.
    pub fn subscribe(&mut self, subscriber: impl FnMut(&EditorState) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(subscriber)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.subscribers.retain(|(sid, _)| *sid != id);
    }

    /// Apply one transition and notify subscribers.
    pub fn dispatch(&mut self, action: Action) {
        self.reduce(action);
        self.notify();
    }

    /// Apply several transitions in order with a single notification.
    pub fn dispatch_all(&mut self, actions: impl IntoIterator<Item = Action>) {
        for action in actions {
            self.reduce(action);
        }
        self.notify();
    }

    fn reduce(&mut self, action: Action) {
        log::debug!("transition: {}", action.name());
        if action.touches_layers() {
            self.layers_revision += 1;
        }

        let state = &mut self.state;
        match action {
            Action::AddLayer(layer) => {
                log::info!("Added {:?} layer {}", layer.layer_type, layer.id);
                state.layers.push(layer);
            }
            Action::UpdateLayer { id, changes } => {
                if let Some(layer) = state.layers.iter_mut().find(|l| l.id == id) {
                    layer.apply(changes);
                }
            }
            Action::RemoveLayer(id) => {
                let before = state.layers.len();
                state.layers.retain(|l| l.id != id);
                if state.layers.len() != before {
                    log::info!("Removed layer {}, total: {}", id, state.layers.len());
                }
                if state.selected_layer_id.as_deref() == Some(id.as_str()) {
                    state.selected_layer_id = None;
                }
            }
            Action::SetSelectedLayer(id) => state.selected_layer_id = id,
            Action::SetStageSize(ratio) => state.stage.aspect_ratio = ratio,
            Action::SetCurrentTime(time) => {
                state.current_time = time.clamp(0.0, state.duration.max(0.0));
            }
            Action::SetIsPlaying(playing) => state.is_playing = playing,
            Action::SetPlaybackSpeed(speed) => state.playback_speed = speed,
            Action::SetLoading(loading) => state.is_loading = loading,
            Action::LoadState(new_state) => *state = *new_state,
        }
    }

    fn notify(&mut self) {
        let state = &self.state;
        for (_, subscriber) in self.subscribers.iter_mut() {
            subscriber(state);
        }
    }

    /// Add a layer with a fresh id, the next z-index and a default position.
    pub fn add_layer(&mut self, new_layer: NewLayer) -> LayerId {
        let NewLayer {
            layer_type,
            options,
            start,
            end,
        } = new_layer;
        let layers = &self.state.layers;
        let layer = Layer {
            id: Uuid::new_v4().to_string(),
            layer_type,
            name: placement::default_name(layer_type, &options),
            z_index: placement::next_z_index(layers),
            timeline: TimeRange::new(start, end),
            geometry: placement::place(layers, layer_type),
            options,
        };
        let id = layer.id.clone();
        self.dispatch(Action::AddLayer(layer));
        id
    }

    pub fn update_layer(&mut self, id: impl Into<LayerId>, changes: LayerChanges) {
        self.dispatch(Action::UpdateLayer {
            id: id.into(),
            changes,
        });
    }

    pub fn remove_layer(&mut self, id: impl Into<LayerId>) {
        self.dispatch(Action::RemoveLayer(id.into()));
    }

    pub fn set_selected_layer(&mut self, id: Option<LayerId>) {
        self.dispatch(Action::SetSelectedLayer(id));
    }

    pub fn set_stage_size(&mut self, ratio: AspectRatio) {
        self.dispatch(Action::SetStageSize(ratio));
    }

    pub fn set_current_time(&mut self, time: f64) {
        self.dispatch(Action::SetCurrentTime(time));
    }

    pub fn set_is_playing(&mut self, playing: bool) {
        self.dispatch(Action::SetIsPlaying(playing));
    }

    pub fn set_playback_speed(&mut self, speed: f64) {
        self.dispatch(Action::SetPlaybackSpeed(speed));
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.dispatch(Action::SetLoading(loading));
    }

    pub fn load_state(&mut self, state: EditorState) {
        self.dispatch(Action::LoadState(Box::new(state)));
    }

    /// User-driven cursor move: pauses first so the clock cannot overwrite it.
    pub fn scrub(&mut self, time: f64) {
        self.dispatch_all([Action::SetIsPlaying(false), Action::SetCurrentTime(time)]);
    }

    pub fn toggle_playing(&mut self) {
        let playing = self.state.is_playing;
        self.set_is_playing(!playing);
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("state", &self.state)
            .field("layers_revision", &self.layers_revision)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::layer::Geometry;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn new_image(start: f64, end: f64) -> NewLayer {
        NewLayer {
            layer_type: LayerType::Image,
            options: LayerOptions::image("a.png"),
            start,
            end,
        }
    }

    #[test]
    fn test_add_layer_assigns_defaults() {
        let mut store = Store::default();
        let first = store.add_layer(new_image(0.0, 5.0));
        let second = store.add_layer(new_image(1.0, 4.0));

        let a = store.state().layer(&first).unwrap();
        let b = store.state().layer(&second).unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(a.z_index, 1);
        assert_eq!(b.z_index, 2);
        assert_eq!(a.name, "Image Layer");
        assert_eq!((a.geometry.x, a.geometry.y), (0.1, 0.1));
        assert!((b.geometry.x - 0.15).abs() < 1e-9);
        assert_eq!(b.timeline, TimeRange::new(1.0, 4.0));
    }

    #[test]
    fn test_update_layer_is_shallow() {
        let mut store = Store::default();
        let id = store.add_layer(new_image(0.0, 5.0));
        let geometry = Geometry {
            x: 0.5,
            y: 0.5,
            width: 0.2,
            height: 0.2,
        };
        store.update_layer(id.clone(), LayerChanges::geometry(geometry));
        let layer = store.state().layer(&id).unwrap();
        assert_eq!(layer.geometry, geometry);
        assert_eq!(layer.options.image_url.as_deref(), Some("a.png"));
    }

    #[test]
    fn test_update_unknown_layer_is_noop() {
        let mut store = Store::default();
        store.add_layer(new_image(0.0, 5.0));
        let before = store.state().clone();
        store.update_layer("missing", LayerChanges::name("x"));
        assert_eq!(store.state(), &before);
    }

    #[test]
    fn test_remove_selected_layer_clears_selection() {
        let mut store = Store::default();
        let id = store.add_layer(new_image(0.0, 5.0));
        let other = store.add_layer(new_image(0.0, 5.0));
        store.set_selected_layer(Some(id.clone()));
        store.remove_layer(id.clone());
        assert!(store.state().selected_layer_id.is_none());
        assert!(store.state().layer(&id).is_none());

        store.set_selected_layer(Some(other.clone()));
        store.remove_layer(id);
        assert_eq!(store.state().selected_layer_id.as_deref(), Some(other.as_str()));
    }

    #[test]
    fn test_scrub_pauses_in_same_notification() {
        let mut store = Store::default();
        store.set_is_playing(true);

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        store.subscribe(move |s| sink.borrow_mut().push((s.is_playing, s.current_time)));

        store.scrub(4.0);
        assert_eq!(*seen.borrow(), vec![(false, 4.0)]);
    }

    #[test]
    fn test_current_time_is_clamped() {
        let mut store = Store::new(EditorState::with_duration(10.0));
        store.set_current_time(12.0);
        assert_eq!(store.state().current_time, 10.0);
        store.set_current_time(-1.0);
        assert_eq!(store.state().current_time, 0.0);
    }

    #[test]
    fn test_every_transition_notifies() {
        let mut store = Store::default();
        let count = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&count);
        let sub = store.subscribe(move |_| *counter.borrow_mut() += 1);

        store.set_loading(true);
        store.set_stage_size(AspectRatio::Square);
        store.set_playback_speed(2.0);
        assert_eq!(*count.borrow(), 3);

        store.unsubscribe(sub);
        store.set_loading(false);
        assert_eq!(*count.borrow(), 3);
    }

    #[test]
    fn test_load_state_replaces_everything() {
        let mut store = Store::default();
        store.add_layer(new_image(0.0, 5.0));
        let revision = store.layers_revision();

        let mut replacement = EditorState::with_duration(60.0);
        replacement.stage.aspect_ratio = AspectRatio::Portrait4x5;
        store.load_state(replacement.clone());

        assert_eq!(store.state(), &replacement);
        assert!(store.layers_revision() > revision);
    }
}
