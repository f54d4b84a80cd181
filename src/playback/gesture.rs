// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Gesture-to-geometry translation.
//!
//! A manipulation widget reports the end of each drag, resize or rotate
//! gesture with the element's final on-screen state. Those pixel results
//! are converted here into normalized [`LayerChanges`] and committed to the
//! store. Mid-gesture feedback lives in [`TransientTransform`] and is never
//! committed.

use crate::models::layer::{Geometry, Layer, LayerChanges, LayerStyles};
use crate::models::store::Store;
use crate::util::geometry::{absolute_to_relative, relative_to_absolute, PixelRect};
use once_cell::sync::Lazy;
use regex::Regex;

static ROTATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"rotate\(\s*([-+]?\d*\.?\d+(?:[eE][-+]?\d+)?)deg\s*\)").expect("valid rotate regex")
});

/// Receiver for end-of-gesture events from a manipulation widget.
///
/// `bounds` and `container` are in the same pixel space (e.g. screen points).
pub trait GestureSink {
    fn on_drag_end(&mut self, layer_id: &str, bounds: PixelRect, container: PixelRect);
    fn on_resize_end(&mut self, layer_id: &str, bounds: PixelRect, container: PixelRect);
    /// `transform` is the element's final CSS-style transform, e.g. `rotate(12.5deg)`.
    fn on_rotate_end(&mut self, layer_id: &str, transform: &str);
}

/// Normalize `bounds` against the container's origin and size.
pub fn normalize_bounds(bounds: PixelRect, container: PixelRect) -> Geometry {
    let local = PixelRect::new(
        bounds.x - container.x,
        bounds.y - container.y,
        bounds.width,
        bounds.height,
    );
    absolute_to_relative(&local, container.width, container.height)
}

/// Position-only update; width and height carry over from the layer.
pub fn drag_changes(layer: &Layer, bounds: PixelRect, container: PixelRect) -> LayerChanges {
    let moved = normalize_bounds(bounds, container);
    LayerChanges::geometry(Geometry {
        x: moved.x,
        y: moved.y,
        ..layer.geometry
    })
}

pub fn resize_changes(bounds: PixelRect, container: PixelRect) -> LayerChanges {
    LayerChanges::geometry(normalize_bounds(bounds, container))
}

/// Degrees from the first `rotate(<n>deg)` in a transform string.
pub fn parse_rotation(transform: &str) -> Option<f64> {
    ROTATE_RE
        .captures(transform)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

pub fn rotation_transform(degrees: f64) -> String {
    format!("rotate({}deg)", degrees)
}

/// Style update carrying the new rotation; `None` if the transform has no rotation.
pub fn rotate_changes(layer: &Layer, transform: &str) -> Option<LayerChanges> {
    let rotation = parse_rotation(transform)?;
    let mut options = layer.options.clone();
    let styles = options.styles.take().unwrap_or_default();
    options.styles = Some(LayerStyles { rotation, ..styles });
    Some(LayerChanges::options(options))
}

/// Pixel layout of a layer inside a stage rectangle.
pub fn layout(geometry: &Geometry, stage: PixelRect) -> PixelRect {
    let rect = relative_to_absolute(geometry, stage.width, stage.height);
    PixelRect::new(stage.x + rect.x, stage.y + rect.y, rect.width, rect.height)
}

impl GestureSink for Store {
    fn on_drag_end(&mut self, layer_id: &str, bounds: PixelRect, container: PixelRect) {
        if let Some(layer) = self.state().layer(layer_id) {
            let changes = drag_changes(layer, bounds, container);
            self.update_layer(layer_id, changes);
        }
    }

    fn on_resize_end(&mut self, layer_id: &str, bounds: PixelRect, container: PixelRect) {
        if self.state().layer(layer_id).is_some() {
            self.update_layer(layer_id, resize_changes(bounds, container));
        }
    }

    fn on_rotate_end(&mut self, layer_id: &str, transform: &str) {
        let changes = self
            .state()
            .layer(layer_id)
            .and_then(|layer| rotate_changes(layer, transform));
        match changes {
            Some(changes) => self.update_layer(layer_id, changes),
            None => log::debug!("rotate end without rotation: {:?}", transform),
        }
    }
}

/// Which gesture is in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKind {
    Drag,
    Resize,
    Rotate,
}

/// Visual-only state of an element while a gesture is running.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransientTransform {
    pub kind: GestureKind,
    /// Element bounds when the gesture began.
    pub origin: PixelRect,
    pub offset: (f64, f64),
    pub size_delta: (f64, f64),
    pub rotation: f64,
}

impl TransientTransform {
    pub fn begin(kind: GestureKind, origin: PixelRect, rotation: f64) -> Self {
        Self {
            kind,
            origin,
            offset: (0.0, 0.0),
            size_delta: (0.0, 0.0),
            rotation,
        }
    }

    /// Accumulate one frame of pointer movement.
    pub fn apply_delta(&mut self, dx: f64, dy: f64) {
        match self.kind {
            GestureKind::Drag => {
                self.offset.0 += dx;
                self.offset.1 += dy;
            }
            GestureKind::Resize => {
                self.size_delta.0 += dx;
                self.size_delta.1 += dy;
            }
            GestureKind::Rotate => {}
        }
    }

    pub fn set_rotation(&mut self, degrees: f64) {
        self.rotation = degrees;
    }

    /// Current on-screen bounds; never smaller than one pixel.
    pub fn bounds(&self) -> PixelRect {
        PixelRect::new(
            self.origin.x + self.offset.0,
            self.origin.y + self.offset.1,
            (self.origin.width + self.size_delta.0).max(1.0),
            (self.origin.height + self.size_delta.1).max(1.0),
        )
    }

    pub fn transform(&self) -> String {
        rotation_transform(self.rotation)
    }

    /// Deliver the end-of-gesture event to `sink`.
    pub fn finish(&self, sink: &mut impl GestureSink, layer_id: &str, container: PixelRect) {
        match self.kind {
            GestureKind::Drag => sink.on_drag_end(layer_id, self.bounds(), container),
            GestureKind::Resize => sink.on_resize_end(layer_id, self.bounds(), container),
            GestureKind::Rotate => sink.on_rotate_end(layer_id, &self.transform()),
        }
    }
}
