// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Layer data structures.
//!
//! A layer is one placed element on the stage: an image, a video or a
//! block of text. Geometry is stored normalized (0.0 to 1.0) relative to
//! the stage so that changing the stage ratio never rewrites layers.

use serde::{Deserialize, Serialize};

pub type LayerId = String;

/// Kind of layer; decides which options are meaningful and which renderer applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerType {
    Image,
    Video,
    Text,
}

/// Visibility window in seconds, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: f64,
    pub end: f64,
}

impl TimeRange {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// `start <= time <= end`. A reversed range contains nothing.
    pub fn contains(&self, time: f64) -> bool {
        self.start <= time && time <= self.end
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Position and size as fractions of the stage width/height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Border {
    pub color: String,
    pub width: f64,
    pub style: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Background {
    pub color: String,
    pub opacity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shadow {
    pub color: String,
    pub opacity: f64,
    pub blur: f64,
    pub spread: f64,
    pub x: f64,
    pub y: f64,
}

/// Visual style record. Text layers carry the full record; image and video
/// layers only pick one up once they are rotated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayerStyles {
    pub color: String,
    pub opacity: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    /// Degrees, clockwise.
    pub rotation: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border: Option<Border>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<Background>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow: Option<Shadow>,
}

impl Default for LayerStyles {
    fn default() -> Self {
        Self {
            color: "#000000".to_string(),
            opacity: 1.0,
            font_size: None,
            rotation: 0.0,
            border: None,
            background: None,
            shadow: None,
        }
    }
}

impl LayerStyles {
    /// Style given to freshly added text layers.
    pub fn text_defaults(color: impl Into<String>, opacity: f64, font_size: f64) -> Self {
        Self {
            color: color.into(),
            opacity,
            font_size: Some(font_size),
            rotation: 0.0,
            border: Some(Border {
                color: "#000000".to_string(),
                width: 0.0,
                style: "solid".to_string(),
            }),
            background: Some(Background {
                color: "#000000".to_string(),
                opacity: 0.0,
            }),
            shadow: Some(Shadow {
                color: "#000000".to_string(),
                opacity: 0.0,
                blur: 0.0,
                spread: 0.0,
                x: 0.0,
                y: 0.0,
            }),
        }
    }
}

/// Type-dependent payload. Fields that do not apply to a layer's type stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayerOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mute: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub styles: Option<LayerStyles>,
}

impl LayerOptions {
    pub fn video(url: impl Into<String>) -> Self {
        Self {
            video_url: Some(url.into()),
            mute: Some(false),
            volume: Some(1.0),
            speed: Some(1.0),
            ..Default::default()
        }
    }

    pub fn image(url: impl Into<String>) -> Self {
        Self {
            image_url: Some(url.into()),
            ..Default::default()
        }
    }

    pub fn text(content: impl Into<String>, styles: LayerStyles) -> Self {
        Self {
            text: Some(content.into()),
            styles: Some(styles),
            ..Default::default()
        }
    }

    pub fn rotation(&self) -> f64 {
        self.styles.as_ref().map_or(0.0, |s| s.rotation)
    }

    pub fn is_muted(&self) -> bool {
        self.mute.unwrap_or(false)
    }

    /// The media URL this layer references, if any.
    pub fn media_url(&self) -> Option<&str> {
        self.video_url.as_deref().or(self.image_url.as_deref())
    }
}

/// A placed media or text element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layer {
    pub id: LayerId,
    #[serde(rename = "type")]
    pub layer_type: LayerType,
    pub name: String,
    pub z_index: i64,
    pub timeline: TimeRange,
    pub geometry: Geometry,
    #[serde(default)]
    pub options: LayerOptions,
}

impl Layer {
    pub fn is_visible_at(&self, time: f64) -> bool {
        self.timeline.contains(time)
    }

    /// Shallow merge: each supplied field replaces the layer's field wholesale.
    pub fn apply(&mut self, changes: LayerChanges) {
        let LayerChanges {
            name,
            z_index,
            timeline,
            geometry,
            options,
        } = changes;
        if let Some(name) = name {
            self.name = name;
        }
        if let Some(z_index) = z_index {
            self.z_index = z_index;
        }
        if let Some(timeline) = timeline {
            self.timeline = timeline;
        }
        if let Some(geometry) = geometry {
            self.geometry = geometry;
        }
        if let Some(options) = options {
            self.options = options;
        }
    }
}

/// Partial update for a layer. `id` and `type` are immutable and not representable here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerChanges {
    pub name: Option<String>,
    pub z_index: Option<i64>,
    pub timeline: Option<TimeRange>,
    pub geometry: Option<Geometry>,
    pub options: Option<LayerOptions>,
}

impl LayerChanges {
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn timeline(start: f64, end: f64) -> Self {
        Self {
            timeline: Some(TimeRange::new(start, end)),
            ..Default::default()
        }
    }

    pub fn geometry(geometry: Geometry) -> Self {
        Self {
            geometry: Some(geometry),
            ..Default::default()
        }
    }

    pub fn options(options: LayerOptions) -> Self {
        Self {
            options: Some(options),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_layer() -> Layer {
        Layer {
            id: "a".into(),
            layer_type: LayerType::Video,
            name: "Video Layer".into(),
            z_index: 1,
            timeline: TimeRange::new(2.0, 10.0),
            geometry: Geometry {
                x: 0.1,
                y: 0.1,
                width: 0.3,
                height: 0.3,
            },
            options: LayerOptions::video("clip.mp4"),
        }
    }

    #[test]
    fn test_time_range_is_inclusive() {
        let range = TimeRange::new(2.0, 10.0);
        assert!(range.contains(2.0));
        assert!(range.contains(10.0));
        assert!(!range.contains(1.999));
        assert!(!range.contains(10.001));
    }

    #[test]
    fn test_reversed_range_is_empty() {
        let range = TimeRange::new(5.0, 3.0);
        assert!(!range.contains(4.0));
        assert!(!range.contains(5.0));
        assert!(!range.contains(3.0));
    }

    #[test]
    fn test_apply_replaces_nested_objects_wholesale() {
        let mut layer = sample_layer();
        let options = LayerOptions {
            mute: Some(true),
            ..Default::default()
        };
        layer.apply(LayerChanges::options(options));
        assert_eq!(layer.options.mute, Some(true));
        // Not a deep merge: the URL was not carried forward by the caller.
        assert_eq!(layer.options.video_url, None);
        assert_eq!(layer.name, "Video Layer");
    }

    #[test]
    fn test_serializes_with_camel_case_keys() {
        let json = serde_json::to_value(sample_layer()).unwrap();
        assert_eq!(json["type"], "video");
        assert_eq!(json["zIndex"], 1);
        assert_eq!(json["options"]["videoUrl"], "clip.mp4");
        assert!(json["options"].get("imageUrl").is_none());
    }

    #[test]
    fn test_styles_fill_missing_fields() {
        let styles: LayerStyles = serde_json::from_str(r#"{"rotation": 45}"#).unwrap();
        assert_eq!(styles.rotation, 45.0);
        assert_eq!(styles.opacity, 1.0);
        assert!(styles.border.is_none());
    }
}
