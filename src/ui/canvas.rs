// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Stage canvas.
//!
//! The stage is laid out at its reference resolution, scaled to fit the
//! panel, and the visible layers are painted in z order. The selected
//! layer gets a body drag area, a resize handle at its bottom-right corner
//! and a rotation handle above its top edge.

use crate::io::media::load_image;
use crate::models::layer::{Layer, LayerId, LayerType};
use crate::models::project::EditorState;
use crate::playback::gesture::{layout, GestureKind, TransientTransform};
use crate::util::color::to_color32;
use crate::util::geometry::{fit_scale, stage_size, PixelRect};
use std::collections::HashMap;
use std::path::PathBuf;

const HANDLE_SIZE: f32 = 10.0;
const ROTATE_HANDLE_OFFSET: f32 = 24.0;

/// Result of canvas interaction.
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasAction {
    None,
    Select(LayerId),
    Deselect,
    /// A gesture finished; `container` is the stage rectangle in screen points.
    CommitGesture {
        layer_id: LayerId,
        transient: TransientTransform,
        container: PixelRect,
    },
}

/// A gesture in progress on one layer.
pub type ActiveGesture = Option<(LayerId, TransientTransform)>;

/// Image textures keyed by URL. Failed loads are remembered so they are not retried every frame.
#[derive(Default)]
pub struct TextureCache {
    entries: HashMap<String, Option<egui::TextureHandle>>,
}

impl TextureCache {
    pub fn get(&mut self, ctx: &egui::Context, url: &str) -> Option<&egui::TextureHandle> {
        self.entries
            .entry(url.to_string())
            .or_insert_with(|| load_texture(ctx, url))
            .as_ref()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

fn load_texture(ctx: &egui::Context, url: &str) -> Option<egui::TextureHandle> {
    if url.starts_with("http://") || url.starts_with("https://") {
        log::warn!("Remote image not fetched, drawing placeholder: {}", url);
        return None;
    }
    let path = PathBuf::from(url.strip_prefix("file://").unwrap_or(url));
    match load_image(&path) {
        Ok(image) => {
            let size = [image.width as usize, image.height as usize];
            let color_image = egui::ColorImage::from_rgba_unmultiplied(size, &image.pixels);
            Some(ctx.load_texture(url, color_image, egui::TextureOptions::LINEAR))
        }
        Err(e) => {
            log::warn!("Failed to load image {}: {}", url, e);
            None
        }
    }
}

fn to_rect(rect: PixelRect) -> egui::Rect {
    egui::Rect::from_min_size(
        egui::pos2(rect.x as f32, rect.y as f32),
        egui::vec2(rect.width as f32, rect.height as f32),
    )
}

fn to_pixel_rect(rect: egui::Rect) -> PixelRect {
    PixelRect::new(
        rect.min.x as f64,
        rect.min.y as f64,
        rect.width() as f64,
        rect.height() as f64,
    )
}

/// Rotate `point` about `center` by `degrees`, clockwise on screen.
fn rotate_about(point: egui::Pos2, center: egui::Pos2, degrees: f32) -> egui::Pos2 {
    let rot = egui::emath::Rot2::from_angle(degrees.to_radians());
    center + rot * (point - center)
}

fn rotated_corners(rect: egui::Rect, degrees: f32) -> Vec<egui::Pos2> {
    let center = rect.center();
    [rect.left_top(), rect.right_top(), rect.right_bottom(), rect.left_bottom()]
        .into_iter()
        .map(|p| rotate_about(p, center, degrees))
        .collect()
}

/// Display the stage and handle layer manipulation.
#[allow(clippy::too_many_arguments)]
pub fn show(
    ui: &mut egui::Ui,
    state: &EditorState,
    visible: &[&Layer],
    textures: &mut TextureCache,
    gesture: &mut ActiveGesture,
    media_position: &dyn Fn(&str) -> Option<f64>,
) -> CanvasAction {
    let mut action = CanvasAction::None;
    ui.style_mut().visuals.extreme_bg_color = egui::Color32::from_gray(40);

    let available = ui.available_rect_before_wrap();
    let (background, _) = ui.allocate_exact_size(available.size(), egui::Sense::hover());
    ui.painter().rect_filled(background, 0.0, egui::Color32::from_gray(24));

    let (stage_w, stage_h) = stage_size(state.stage.aspect_ratio);
    let scale = fit_scale(background.width() as f64, background.height() as f64);
    let stage_rect = egui::Rect::from_center_size(
        background.center(),
        egui::vec2((stage_w * scale) as f32, (stage_h * scale) as f32),
    );
    let container = to_pixel_rect(stage_rect);

    // Clicking empty stage clears the selection.
    let stage_response = ui.interact(stage_rect, ui.id().with("stage"), egui::Sense::click());
    if stage_response.clicked() {
        action = CanvasAction::Deselect;
    }

    ui.painter().rect_filled(stage_rect, 0.0, egui::Color32::BLACK);
    let painter = ui.painter_at(stage_rect);

    for layer in visible {
        let active = gesture.as_ref().filter(|(id, _)| *id == layer.id).map(|(_, t)| t);
        let (bounds, rotation) = match active {
            Some(t) => (to_rect(t.bounds()), t.rotation as f32),
            None => (
                to_rect(layout(&layer.geometry, container)),
                layer.options.rotation() as f32,
            ),
        };

        match layer.layer_type {
            LayerType::Image => paint_image(ui, &painter, textures, layer, bounds, rotation),
            LayerType::Video => {
                paint_video(&painter, layer, bounds, rotation, media_position(layer.id.as_str()))
            }
            LayerType::Text => paint_text(&painter, layer, bounds, rotation, scale as f32),
        }

        let response = ui.interact(
            bounds,
            ui.id().with(("layer", &layer.id)),
            egui::Sense::click_and_drag(),
        );
        if response.clicked() {
            action = CanvasAction::Select(layer.id.clone());
        }
        if response.drag_started() {
            let origin = to_pixel_rect(bounds);
            *gesture = Some((
                layer.id.clone(),
                TransientTransform::begin(GestureKind::Drag, origin, rotation as f64),
            ));
            action = CanvasAction::Select(layer.id.clone());
        }
        if let Some(next) = track_gesture(&response, gesture, &layer.id, GestureKind::Drag, container) {
            action = next;
        }
    }

    if let Some(selected) = state.selected_layer().filter(|l| visible.iter().any(|v| v.id == l.id)) {
        if let Some(next) = selection_handles(ui, selected, gesture, container) {
            action = next;
        }
    }

    let pointer_down = ui.input(|i| i.pointer.primary_down());
    if let Some((layer_id, transient)) = take_orphaned_gesture(gesture, visible, pointer_down) {
        log::debug!("committing gesture on {} without its widget", layer_id);
        action = CanvasAction::CommitGesture {
            layer_id,
            transient,
            container,
        };
    }

    action
}

/// A gesture whose widget can no longer report its end: the layer left the
/// visible set, or the pointer was released without a drag-stop.
fn take_orphaned_gesture(
    gesture: &mut ActiveGesture,
    visible: &[&Layer],
    pointer_down: bool,
) -> Option<(LayerId, TransientTransform)> {
    let (layer_id, _) = gesture.as_ref()?;
    let on_stage = visible.iter().any(|l| &l.id == layer_id);
    if on_stage && pointer_down {
        return None;
    }
    gesture.take()
}

/// Feed pointer movement into an active gesture of `kind` on `layer_id` and
/// report the commit when the pointer is released.
fn track_gesture(
    response: &egui::Response,
    gesture: &mut ActiveGesture,
    layer_id: &str,
    kind: GestureKind,
    container: PixelRect,
) -> Option<CanvasAction> {
    let (id, transient) = gesture.as_mut()?;
    if id.as_str() != layer_id || transient.kind != kind {
        return None;
    }

    if response.dragged() {
        match kind {
            GestureKind::Drag | GestureKind::Resize => {
                let delta = response.drag_delta();
                transient.apply_delta(delta.x as f64, delta.y as f64);
            }
            GestureKind::Rotate => {
                if let Some(pointer) = response.interact_pointer_pos() {
                    let (cx, cy) = transient.origin.center();
                    let angle = (pointer.y as f64 - cy).atan2(pointer.x as f64 - cx).to_degrees() + 90.0;
                    transient.set_rotation(angle);
                }
            }
        }
    }

    if response.drag_stopped() {
        let (layer_id, transient) = gesture.take()?;
        return Some(CanvasAction::CommitGesture {
            layer_id,
            transient,
            container,
        });
    }
    None
}

fn selection_handles(
    ui: &mut egui::Ui,
    layer: &Layer,
    gesture: &mut ActiveGesture,
    container: PixelRect,
) -> Option<CanvasAction> {
    let active = gesture.as_ref().filter(|(id, _)| *id == layer.id).map(|(_, t)| *t);
    let (bounds, rotation) = match active {
        Some(t) => (to_rect(t.bounds()), t.rotation as f32),
        None => (
            to_rect(layout(&layer.geometry, container)),
            layer.options.rotation() as f32,
        ),
    };
    let center = bounds.center();

    let outline = egui::Color32::from_rgb(59, 130, 246);
    let painter = ui.painter();
    painter.add(egui::Shape::closed_line(
        rotated_corners(bounds, rotation),
        egui::Stroke::new(1.5, outline),
    ));

    let resize_center = rotate_about(bounds.right_bottom(), center, rotation);
    let rotate_center = rotate_about(
        egui::pos2(center.x, bounds.top() - ROTATE_HANDLE_OFFSET),
        center,
        rotation,
    );
    painter.line_segment(
        [rotate_about(egui::pos2(center.x, bounds.top()), center, rotation), rotate_center],
        egui::Stroke::new(1.0, outline),
    );
    painter.rect_filled(
        egui::Rect::from_center_size(resize_center, egui::Vec2::splat(HANDLE_SIZE)),
        1.0,
        egui::Color32::WHITE,
    );
    painter.circle_filled(rotate_center, HANDLE_SIZE / 2.0, egui::Color32::WHITE);
    painter.circle_stroke(rotate_center, HANDLE_SIZE / 2.0, egui::Stroke::new(1.0, outline));

    let mut action = None;
    let handles = [
        (GestureKind::Resize, resize_center, "resize_handle", egui::CursorIcon::ResizeNwSe),
        (GestureKind::Rotate, rotate_center, "rotate_handle", egui::CursorIcon::Grab),
    ];
    for (kind, handle_center, name, cursor) in handles {
        let rect = egui::Rect::from_center_size(handle_center, egui::Vec2::splat(HANDLE_SIZE + 4.0));
        let response = ui
            .interact(rect, ui.id().with((name, &layer.id)), egui::Sense::drag())
            .on_hover_cursor(cursor);
        if response.drag_started() {
            *gesture = Some((
                layer.id.clone(),
                TransientTransform::begin(kind, to_pixel_rect(bounds), rotation as f64),
            ));
        }
        if let Some(next) = track_gesture(&response, gesture, &layer.id, kind, container) {
            action = Some(next);
        }
    }
    action
}

fn paint_placeholder(painter: &egui::Painter, bounds: egui::Rect, rotation: f32, label: &str, detail: &str) {
    painter.add(egui::Shape::convex_polygon(
        rotated_corners(bounds, rotation),
        egui::Color32::from_gray(55),
        egui::Stroke::new(1.0, egui::Color32::from_gray(90)),
    ));
    painter.text(
        bounds.center(),
        egui::Align2::CENTER_BOTTOM,
        label,
        egui::FontId::proportional(13.0),
        egui::Color32::from_gray(210),
    );
    painter.text(
        bounds.center(),
        egui::Align2::CENTER_TOP,
        detail,
        egui::FontId::monospace(11.0),
        egui::Color32::from_gray(150),
    );
}

fn paint_image(
    ui: &egui::Ui,
    painter: &egui::Painter,
    textures: &mut TextureCache,
    layer: &Layer,
    bounds: egui::Rect,
    rotation: f32,
) {
    let texture = layer
        .options
        .image_url
        .as_deref()
        .and_then(|url| textures.get(ui.ctx(), url));

    match texture {
        Some(texture) => {
            let opacity = layer.options.styles.as_ref().map_or(1.0, |s| s.opacity);
            let tint = egui::Color32::from_white_alpha((opacity.clamp(0.0, 1.0) * 255.0) as u8);
            egui::Image::from_texture(texture)
                .rotate(rotation.to_radians(), egui::Vec2::splat(0.5))
                .tint(tint)
                .paint_at(ui, bounds);
        }
        None => paint_placeholder(
            painter,
            bounds,
            rotation,
            &layer.name,
            layer.options.image_url.as_deref().unwrap_or("no image"),
        ),
    }
}

fn paint_video(painter: &egui::Painter, layer: &Layer, bounds: egui::Rect, rotation: f32, position: Option<f64>) {
    let mute = if layer.options.is_muted() { " 🔇" } else { "" };
    let detail = match position {
        Some(p) => format!("▶ {:.2}s{}", p, mute),
        None => format!("parked{}", mute),
    };
    paint_placeholder(painter, bounds, rotation, &layer.name, &detail);
}

fn paint_text(painter: &egui::Painter, layer: &Layer, bounds: egui::Rect, rotation: f32, scale: f32) {
    let styles = layer.options.styles.clone().unwrap_or_default();
    let content = layer.options.text.clone().unwrap_or_default();

    if let Some(background) = &styles.background {
        if background.opacity > 0.0 {
            painter.add(egui::Shape::convex_polygon(
                rotated_corners(bounds, rotation),
                to_color32(&background.color, background.opacity),
                egui::Stroke::NONE,
            ));
        }
    }
    if let Some(border) = &styles.border {
        if border.width > 0.0 {
            painter.add(egui::Shape::closed_line(
                rotated_corners(bounds, rotation),
                egui::Stroke::new(border.width as f32 * scale, to_color32(&border.color, 1.0)),
            ));
        }
    }

    // Font sizes are in stage pixels.
    let font_size = (styles.font_size.unwrap_or(30.0) as f32 * scale).max(1.0);
    let color = to_color32(&styles.color, styles.opacity);
    let galley = painter.layout(
        content,
        egui::FontId::proportional(font_size),
        color,
        bounds.width().max(1.0),
    );

    // Center the galley in the box, then rotate it about the box center.
    let center = bounds.center();
    let top_left = center - galley.size() / 2.0;
    let angle = rotation.to_radians();
    let pos = rotate_about(top_left, center, rotation);

    if let Some(shadow) = &styles.shadow {
        if shadow.opacity > 0.0 {
            let offset = egui::vec2(shadow.x as f32, shadow.y as f32) * scale;
            let mut shape = egui::epaint::TextShape::new(pos + offset, galley.clone(), color);
            shape.override_text_color = Some(to_color32(&shadow.color, shadow.opacity));
            shape.angle = angle;
            painter.add(shape);
        }
    }
    let mut shape = egui::epaint::TextShape::new(pos, galley, color);
    shape.angle = angle;
    painter.add(shape);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::layer::{Geometry, LayerOptions, TimeRange};
    use crate::models::store::{NewLayer, Store};

    fn layer(id: &str) -> Layer {
        Layer {
            id: id.to_string(),
            layer_type: LayerType::Image,
            name: id.to_string(),
            z_index: 1,
            timeline: TimeRange::new(0.0, 2.0),
            geometry: Geometry {
                x: 0.1,
                y: 0.1,
                width: 0.3,
                height: 0.3,
            },
            options: LayerOptions::image("a.png"),
        }
    }

    fn dragging(id: &str) -> ActiveGesture {
        let mut transient =
            TransientTransform::begin(GestureKind::Drag, PixelRect::new(0.0, 0.0, 100.0, 100.0), 0.0);
        transient.apply_delta(50.0, 25.0);
        Some((id.to_string(), transient))
    }

    #[test]
    fn test_gesture_kept_while_layer_on_stage_and_pointer_down() {
        let a = layer("a");
        let mut gesture = dragging("a");
        assert!(take_orphaned_gesture(&mut gesture, &[&a], true).is_none());
        assert!(gesture.is_some());
    }

    #[test]
    fn test_gesture_released_when_layer_leaves_stage() {
        let b = layer("b");
        let mut gesture = dragging("a");
        let (id, transient) = take_orphaned_gesture(&mut gesture, &[&b], true).unwrap();
        assert_eq!(id, "a");
        assert_eq!(transient.bounds(), PixelRect::new(50.0, 25.0, 100.0, 100.0));
        assert!(gesture.is_none());
    }

    #[test]
    fn test_gesture_released_when_pointer_up() {
        let a = layer("a");
        let mut gesture = dragging("a");
        assert!(take_orphaned_gesture(&mut gesture, &[&a], false).is_some());
        assert!(gesture.is_none());
        assert!(take_orphaned_gesture(&mut gesture, &[&a], false).is_none());
    }

    #[test]
    fn test_orphaned_drag_still_reaches_store() {
        let mut store = Store::default();
        let id = store.add_layer(NewLayer {
            layer_type: LayerType::Image,
            options: LayerOptions::image("a.png"),
            start: 0.0,
            end: 2.0,
        });
        let container = PixelRect::new(0.0, 0.0, 1000.0, 500.0);
        let origin = layout(&store.state().layer(&id).unwrap().geometry, container);
        let mut transient = TransientTransform::begin(GestureKind::Drag, origin, 0.0);
        transient.apply_delta(100.0, 50.0);
        let mut gesture: ActiveGesture = Some((id.clone(), transient));

        // Playback carried the cursor past the layer's window.
        store.set_current_time(3.0);
        let visible: Vec<&Layer> = Vec::new();
        let (layer_id, transient) = take_orphaned_gesture(&mut gesture, &visible, true).unwrap();
        transient.finish(&mut store, &layer_id, container);

        let g = store.state().layer(&id).unwrap().geometry;
        assert!((g.x - (origin.x + 100.0) / 1000.0).abs() < 1e-9);
        assert!((g.y - (origin.y + 50.0) / 500.0).abs() < 1e-9);
    }

    #[test]
    fn test_rect_conversion_roundtrip() {
        let rect = PixelRect::new(10.0, 20.0, 300.0, 150.0);
        assert_eq!(to_pixel_rect(to_rect(rect)), rect);
    }

    #[test]
    fn test_rotate_about_quarter_turn() {
        let p = rotate_about(egui::pos2(10.0, 0.0), egui::pos2(0.0, 0.0), 90.0);
        assert!((p.x - 0.0).abs() < 1e-4);
        assert!((p.y - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_unrotated_corners() {
        let rect = egui::Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(4.0, 2.0));
        let corners = rotated_corners(rect, 0.0);
        assert_eq!(corners[0], egui::pos2(0.0, 0.0));
        assert_eq!(corners[2], egui::pos2(4.0, 2.0));
    }
}
