// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Timeline track rows and the events a track widget reports back.

use crate::models::layer::{Layer, LayerChanges, LayerId, LayerType};
use crate::models::store::Store;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectKind {
    Video,
    Image,
    Text,
}

impl EffectKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Video => "Video",
            Self::Image => "Image",
            Self::Text => "Text",
        }
    }
}

impl From<LayerType> for EffectKind {
    fn from(layer_type: LayerType) -> Self {
        match layer_type {
            LayerType::Video => Self::Video,
            LayerType::Image => Self::Image,
            LayerType::Text => Self::Text,
        }
    }
}

/// One row per layer, holding a single action spanning the layer's window.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackAction {
    pub id: LayerId,
    pub start: f64,
    pub end: f64,
    pub effect: EffectKind,
    pub label: String,
    /// Media URL or text content, for tooltips.
    pub source: Option<String>,
}

impl From<&Layer> for TrackAction {
    fn from(layer: &Layer) -> Self {
        let options = &layer.options;
        Self {
            id: layer.id.clone(),
            start: layer.timeline.start,
            end: layer.timeline.end,
            effect: layer.layer_type.into(),
            label: layer.name.clone(),
            source: options
                .media_url()
                .or(options.text.as_deref())
                .map(str::to_string),
        }
    }
}

/// Rows in layer collection order.
pub fn track_rows(layers: &[Layer]) -> Vec<TrackAction> {
    layers.iter().map(TrackAction::from).collect()
}

/// Events emitted by a track widget.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackEvent {
    /// Pointer pressed anywhere over the tracks.
    PointerDown,
    CursorDragged { time: f64 },
    ActionMoved { id: LayerId, start: f64, end: f64 },
    ActionResized { id: LayerId, start: f64, end: f64 },
    ActionClicked { id: LayerId },
}

/// Commit a track event to the store.
pub fn apply_track_event(store: &mut Store, event: TrackEvent) {
    match event {
        TrackEvent::PointerDown => {
            if store.state().is_playing {
                store.set_is_playing(false);
            }
        }
        TrackEvent::CursorDragged { time } => store.scrub(time),
        TrackEvent::ActionMoved { id, start, end } | TrackEvent::ActionResized { id, start, end } => {
            store.update_layer(id, LayerChanges::timeline(start, end));
        }
        TrackEvent::ActionClicked { id } => store.set_selected_layer(Some(id)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::layer::{LayerOptions, LayerStyles, TimeRange};
    use crate::models::store::NewLayer;

    fn store_with_layers() -> (Store, LayerId, LayerId) {
        let mut store = Store::default();
        let video = store.add_layer(NewLayer {
            layer_type: LayerType::Video,
            options: LayerOptions::video("clip.mp4"),
            start: 0.0,
            end: 5.0,
        });
        let text = store.add_layer(NewLayer {
            layer_type: LayerType::Text,
            options: LayerOptions::text("Title", LayerStyles::text_defaults("#ffffff", 1.0, 30.0)),
            start: 2.0,
            end: 4.0,
        });
        (store, video, text)
    }

    #[test]
    fn test_rows_mirror_layers() {
        let (store, video, text) = store_with_layers();
        let rows = track_rows(&store.state().layers);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, video);
        assert_eq!(rows[0].effect, EffectKind::Video);
        assert_eq!(rows[0].source.as_deref(), Some("clip.mp4"));
        assert_eq!(rows[1].id, text);
        assert_eq!(rows[1].label, "Title");
        assert_eq!((rows[1].start, rows[1].end), (2.0, 4.0));
    }

    #[test]
    fn test_move_and_resize_update_timeline() {
        let (mut store, video, text) = store_with_layers();
        apply_track_event(&mut store, TrackEvent::ActionMoved { id: video.clone(), start: 1.0, end: 6.0 });
        apply_track_event(&mut store, TrackEvent::ActionResized { id: text.clone(), start: 2.0, end: 8.5 });
        assert_eq!(store.state().layer(&video).unwrap().timeline, TimeRange::new(1.0, 6.0));
        assert_eq!(store.state().layer(&text).unwrap().timeline, TimeRange::new(2.0, 8.5));
    }

    #[test]
    fn test_cursor_drag_pauses_then_seeks() {
        let (mut store, _, _) = store_with_layers();
        store.set_is_playing(true);
        apply_track_event(&mut store, TrackEvent::CursorDragged { time: 3.25 });
        assert!(!store.state().is_playing);
        assert_eq!(store.state().current_time, 3.25);
    }

    #[test]
    fn test_pointer_down_pauses_and_click_selects() {
        let (mut store, video, _) = store_with_layers();
        store.set_is_playing(true);
        apply_track_event(&mut store, TrackEvent::PointerDown);
        assert!(!store.state().is_playing);

        apply_track_event(&mut store, TrackEvent::ActionClicked { id: video.clone() });
        assert_eq!(store.state().selected_layer_id, Some(video));
    }
}
