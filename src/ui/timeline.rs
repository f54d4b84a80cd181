// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Timeline panel: transport controls, time ruler and one track per layer.
//!
//! Dragging an action only moves its on-screen bar; the new window is
//! reported once, when the pointer is released.

use crate::models::project::EditorState;
use crate::playback::tracks::{track_rows, EffectKind, TrackAction, TrackEvent};

const LABEL_WIDTH: f32 = 140.0;
const RULER_HEIGHT: f32 = 22.0;
const ROW_HEIGHT: f32 = 26.0;
const EDGE_GRAB: f32 = 6.0;
/// Shortest window a resize can produce, in seconds.
pub const MIN_ACTION_LENGTH: f64 = 0.1;

/// Result of timeline interaction.
#[derive(Debug, Clone, PartialEq)]
pub enum TimelineAction {
    Track(TrackEvent),
    SkipBack,
    TogglePlay,
    SkipForward,
    SetSpeed(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragMode {
    Move,
    ResizeStart,
    ResizeEnd,
}

/// An action bar being dragged.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionDrag {
    pub id: String,
    pub mode: DragMode,
    pub origin: (f64, f64),
    /// Accumulated pointer travel, in seconds.
    pub delta: f64,
}

impl ActionDrag {
    /// The window the bar would commit to right now.
    pub fn window(&self) -> (f64, f64) {
        drag_window(self.mode, self.origin.0, self.origin.1, self.delta)
    }

    fn finish(&self) -> TrackEvent {
        let (start, end) = self.window();
        match self.mode {
            DragMode::Move => TrackEvent::ActionMoved {
                id: self.id.clone(),
                start,
                end,
            },
            DragMode::ResizeStart | DragMode::ResizeEnd => TrackEvent::ActionResized {
                id: self.id.clone(),
                start,
                end,
            },
        }
    }
}

/// Window after shifting by `delta` seconds. Moves keep the length and stop at zero.
pub fn drag_window(mode: DragMode, start: f64, end: f64, delta: f64) -> (f64, f64) {
    match mode {
        DragMode::Move => {
            let shifted = (start + delta).max(0.0);
            (shifted, shifted + (end - start))
        }
        DragMode::ResizeStart => {
            let limit = (end - MIN_ACTION_LENGTH).max(0.0);
            ((start + delta).clamp(0.0, limit), end)
        }
        DragMode::ResizeEnd => (start, (end + delta).max(start + MIN_ACTION_LENGTH)),
    }
}

/// Time under horizontal position `x` of a track spanning `left..left + width`.
pub fn time_at(x: f32, left: f32, width: f32, duration: f64) -> f64 {
    if width <= 0.0 {
        return 0.0;
    }
    let fraction = ((x - left) / width).clamp(0.0, 1.0) as f64;
    fraction * duration.max(0.0)
}

/// Transport readout, e.g. `3.25s / 30s`.
pub fn time_readout(current_time: f64, duration: f64) -> String {
    format!("{:.2}s / {}s", current_time, duration)
}

fn effect_color(effect: EffectKind) -> egui::Color32 {
    match effect {
        EffectKind::Video => egui::Color32::from_rgb(59, 130, 246),
        EffectKind::Image => egui::Color32::from_rgb(34, 160, 94),
        EffectKind::Text => egui::Color32::from_rgb(168, 85, 247),
    }
}

/// Display the timeline panel.
pub fn show(
    ui: &mut egui::Ui,
    state: &EditorState,
    speeds: &[f64],
    drag: &mut Option<ActionDrag>,
) -> Vec<TimelineAction> {
    let mut actions = Vec::new();

    transport(ui, state, speeds, &mut actions);
    ui.separator();

    let rows = track_rows(&state.layers);
    let height = RULER_HEIGHT + ROW_HEIGHT * rows.len().max(1) as f32;

    egui::ScrollArea::vertical()
        .id_source("timeline_tracks")
        .auto_shrink([false, false])
        .show(ui, |ui| {
            let (area, _) = ui.allocate_exact_size(
                egui::vec2(ui.available_width(), height),
                egui::Sense::hover(),
            );

            // Any press over the tracks pauses playback first.
            let pressed_here = ui.input(|i| {
                i.pointer.primary_pressed()
                    && i.pointer.interact_pos().is_some_and(|p| area.contains(p))
            });
            if pressed_here {
                actions.push(TimelineAction::Track(TrackEvent::PointerDown));
            }

            let track_left = area.left() + LABEL_WIDTH;
            let track_width = (area.width() - LABEL_WIDTH).max(1.0);
            let to_x = |t: f64| {
                let duration = state.duration.max(f64::EPSILON);
                track_left + (t / duration) as f32 * track_width
            };

            ruler(ui, area, track_left, track_width, state, &mut actions);

            for (index, row) in rows.iter().enumerate() {
                let top = area.top() + RULER_HEIGHT + ROW_HEIGHT * index as f32;
                let row_rect = egui::Rect::from_min_size(
                    egui::pos2(area.left(), top),
                    egui::vec2(area.width(), ROW_HEIGHT),
                );
                let selected = state.selected_layer_id.as_deref() == Some(row.id.as_str());
                track_row(ui, row, row_rect, selected, &to_x, track_width, state.duration, drag, &mut actions);
            }

            if rows.is_empty() {
                ui.painter().text(
                    egui::pos2(track_left + 8.0, area.top() + RULER_HEIGHT + ROW_HEIGHT / 2.0),
                    egui::Align2::LEFT_CENTER,
                    "Add a layer to see it on the timeline",
                    egui::FontId::proportional(12.0),
                    egui::Color32::from_gray(130),
                );
            }

            // Playhead over everything.
            let x = to_x(state.current_time);
            ui.painter().line_segment(
                [egui::pos2(x, area.top()), egui::pos2(x, area.bottom())],
                egui::Stroke::new(2.0, egui::Color32::from_rgb(239, 68, 68)),
            );
        });

    actions
}

fn transport(ui: &mut egui::Ui, state: &EditorState, speeds: &[f64], actions: &mut Vec<TimelineAction>) {
    ui.horizontal(|ui| {
        if ui.button("⏮").on_hover_text("Skip to start").clicked() {
            actions.push(TimelineAction::SkipBack);
        }
        let play_label = if state.is_playing { "⏸" } else { "▶" };
        if ui.button(play_label).on_hover_text("Play/Pause").clicked() {
            actions.push(TimelineAction::TogglePlay);
        }
        if ui.button("⏭").on_hover_text("Skip to end").clicked() {
            actions.push(TimelineAction::SkipForward);
        }

        ui.separator();
        ui.label(egui::RichText::new(time_readout(state.current_time, state.duration)).monospace());

        ui.separator();
        ui.label("Speed:");
        let mut speed = state.playback_speed;
        egui::ComboBox::from_id_source("playback_speed")
            .selected_text(format!("{}x", speed))
            .width(64.0)
            .show_ui(ui, |ui| {
                for &option in speeds {
                    ui.selectable_value(&mut speed, option, format!("{}x", option));
                }
            });
        if speed != state.playback_speed {
            actions.push(TimelineAction::SetSpeed(speed));
        }
    });
}

fn ruler(
    ui: &mut egui::Ui,
    area: egui::Rect,
    track_left: f32,
    track_width: f32,
    state: &EditorState,
    actions: &mut Vec<TimelineAction>,
) {
    let rect = egui::Rect::from_min_size(
        egui::pos2(track_left, area.top()),
        egui::vec2(track_width, RULER_HEIGHT),
    );
    let response = ui.interact(rect, ui.id().with("ruler"), egui::Sense::click_and_drag());
    if response.clicked() || response.dragged() {
        if let Some(pos) = response.interact_pointer_pos() {
            let time = time_at(pos.x, track_left, track_width, state.duration);
            actions.push(TimelineAction::Track(TrackEvent::CursorDragged { time }));
        }
    }

    let painter = ui.painter();
    painter.rect_filled(rect, 0.0, egui::Color32::from_gray(35));

    // One tick per second, labelled every five.
    let duration = state.duration.max(0.0);
    let seconds = duration.floor() as u32;
    for second in 0..=seconds {
        let x = track_left + (second as f64 / duration.max(f64::EPSILON)) as f32 * track_width;
        let labelled = second % 5 == 0;
        let tick = if labelled { 10.0 } else { 5.0 };
        painter.line_segment(
            [egui::pos2(x, rect.bottom() - tick), egui::pos2(x, rect.bottom())],
            egui::Stroke::new(1.0, egui::Color32::from_gray(120)),
        );
        if labelled {
            painter.text(
                egui::pos2(x + 2.0, rect.top() + 1.0),
                egui::Align2::LEFT_TOP,
                format!("{}s", second),
                egui::FontId::monospace(10.0),
                egui::Color32::from_gray(170),
            );
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn track_row(
    ui: &mut egui::Ui,
    row: &TrackAction,
    row_rect: egui::Rect,
    selected: bool,
    to_x: &dyn Fn(f64) -> f32,
    track_width: f32,
    duration: f64,
    drag: &mut Option<ActionDrag>,
    actions: &mut Vec<TimelineAction>,
) {
    let painter = ui.painter();
    let background = if selected {
        egui::Color32::from_gray(50)
    } else {
        egui::Color32::from_gray(28)
    };
    painter.rect_filled(row_rect, 0.0, background);
    painter.text(
        egui::pos2(row_rect.left() + 6.0, row_rect.center().y),
        egui::Align2::LEFT_CENTER,
        format!("{} · {}", row.effect.label(), row.label),
        egui::FontId::proportional(12.0),
        egui::Color32::from_gray(200),
    );

    let (start, end) = match drag.as_ref() {
        Some(d) if d.id == row.id => d.window(),
        _ => (row.start, row.end),
    };
    let bar = egui::Rect::from_min_max(
        egui::pos2(to_x(start), row_rect.top() + 3.0),
        egui::pos2(to_x(end).max(to_x(start) + 2.0), row_rect.bottom() - 3.0),
    );

    let id = ui.id().with(("track_action", &row.id));
    let mut response = ui.interact(bar, id, egui::Sense::click_and_drag());
    if let Some(source) = &row.source {
        response = response.on_hover_text(source);
    }

    if response.drag_started() {
        let mode = match response.interact_pointer_pos() {
            Some(p) if p.x <= bar.left() + EDGE_GRAB => DragMode::ResizeStart,
            Some(p) if p.x >= bar.right() - EDGE_GRAB => DragMode::ResizeEnd,
            _ => DragMode::Move,
        };
        *drag = Some(ActionDrag {
            id: row.id.clone(),
            mode,
            origin: (row.start, row.end),
            delta: 0.0,
        });
    }

    if let Some(active) = drag.as_mut().filter(|d| d.id == row.id) {
        if response.dragged() {
            let seconds_per_pixel = duration.max(0.0) / track_width as f64;
            active.delta += response.drag_delta().x as f64 * seconds_per_pixel;
        }
        if response.drag_stopped() {
            actions.push(TimelineAction::Track(active.finish()));
            *drag = None;
        }
    }

    if response.clicked() {
        actions.push(TimelineAction::Track(TrackEvent::ActionClicked { id: row.id.clone() }));
    }

    if response.hovered() {
        let near_edge = response
            .hover_pos()
            .is_some_and(|p| p.x <= bar.left() + EDGE_GRAB || p.x >= bar.right() - EDGE_GRAB);
        let icon = if near_edge {
            egui::CursorIcon::ResizeHorizontal
        } else {
            egui::CursorIcon::Grab
        };
        ui.ctx().set_cursor_icon(icon);
    }

    let painter = ui.painter();
    let color = effect_color(row.effect);
    painter.rect_filled(bar, 4.0, color);
    if selected {
        painter.rect_stroke(bar, 4.0, egui::Stroke::new(2.0, egui::Color32::WHITE));
    }
    painter.with_clip_rect(bar).text(
        egui::pos2(bar.left() + 6.0, bar.center().y),
        egui::Align2::LEFT_CENTER,
        &row.label,
        egui::FontId::proportional(11.0),
        egui::Color32::WHITE,
    );
}
