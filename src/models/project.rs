// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Project state.
//!
//! This module defines the aggregate editor state that is persisted to the
//! session cache and written to project files: the layers, the stage, the
//! playback cursor and the current selection.

use super::layer::{Layer, LayerId};
use serde::{Deserialize, Serialize};

/// Timeline length of a fresh project, in seconds.
pub const DEFAULT_DURATION: f64 = 30.0;

/// Supported stage ratios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AspectRatio {
    #[default]
    Landscape16x9,
    Portrait9x16,
    Square,
    Portrait4x5,
}

impl AspectRatio {
    pub const ALL: [AspectRatio; 4] = [
        AspectRatio::Landscape16x9,
        AspectRatio::Portrait9x16,
        AspectRatio::Square,
        AspectRatio::Portrait4x5,
    ];

    /// Parse a `"w:h"` tag. Unknown tags fall back to 16:9.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "9:16" => Self::Portrait9x16,
            "1:1" => Self::Square,
            "4:5" => Self::Portrait4x5,
            "16:9" => Self::Landscape16x9,
            other => {
                log::warn!("Unknown aspect ratio {:?}, using 16:9", other);
                Self::Landscape16x9
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Landscape16x9 => "16:9",
            Self::Portrait9x16 => "9:16",
            Self::Square => "1:1",
            Self::Portrait4x5 => "4:5",
        }
    }
}

impl From<String> for AspectRatio {
    fn from(tag: String) -> Self {
        Self::from_tag(&tag)
    }
}

impl From<AspectRatio> for String {
    fn from(ratio: AspectRatio) -> Self {
        ratio.as_str().to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stage {
    pub aspect_ratio: AspectRatio,
}

fn default_duration() -> f64 {
    DEFAULT_DURATION
}

fn default_playback_speed() -> f64 {
    1.0
}

/// Complete editor state for serialization.
///
/// `layers` and `stage` are required in project files; everything else
/// falls back to defaults when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorState {
    /// Insertion order, not paint order.
    pub layers: Vec<Layer>,
    pub stage: Stage,
    #[serde(default)]
    pub current_time: f64,
    #[serde(default = "default_duration")]
    pub duration: f64,
    #[serde(default)]
    pub is_playing: bool,
    #[serde(default = "default_playback_speed")]
    pub playback_speed: f64,
    /// Weak reference; may name a layer that no longer exists.
    #[serde(default)]
    pub selected_layer_id: Option<LayerId>,
    #[serde(default)]
    pub is_loading: bool,
}

impl Default for EditorState {
    fn default() -> Self {
        Self::with_duration(DEFAULT_DURATION)
    }
}

impl EditorState {
    /// Create an empty project with the given timeline length.
    pub fn with_duration(duration: f64) -> Self {
        Self {
            layers: Vec::new(),
            stage: Stage::default(),
            current_time: 0.0,
            duration,
            is_playing: false,
            playback_speed: 1.0,
            selected_layer_id: None,
            is_loading: false,
        }
    }

    pub fn layer(&self, id: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    /// The selected layer, treating a dangling id as no selection.
    pub fn selected_layer(&self) -> Option<&Layer> {
        self.selected_layer_id
            .as_deref()
            .and_then(|id| self.layer(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aspect_ratio_tags() {
        for ratio in AspectRatio::ALL {
            assert_eq!(AspectRatio::from_tag(ratio.as_str()), ratio);
        }
        assert_eq!(AspectRatio::from_tag("21:9"), AspectRatio::Landscape16x9);
    }

    #[test]
    fn test_minimal_project_fills_defaults() {
        let json = r#"{"layers": [], "stage": {"aspectRatio": "9:16"}}"#;
        let state: EditorState = serde_json::from_str(json).unwrap();
        assert_eq!(state.stage.aspect_ratio, AspectRatio::Portrait9x16);
        assert_eq!(state.duration, DEFAULT_DURATION);
        assert_eq!(state.playback_speed, 1.0);
        assert!(state.selected_layer_id.is_none());
    }

    #[test]
    fn test_serialized_keys() {
        let json = serde_json::to_value(EditorState::default()).unwrap();
        assert_eq!(json["stage"]["aspectRatio"], "16:9");
        assert!(json["selectedLayerId"].is_null());
        assert_eq!(json["isPlaying"], false);
        assert_eq!(json["playbackSpeed"], 1.0);
    }

    #[test]
    fn test_dangling_selection_resolves_to_none() {
        let mut state = EditorState::default();
        state.selected_layer_id = Some("gone".into());
        assert!(state.selected_layer().is_none());
    }
}
