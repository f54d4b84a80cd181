// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Add-layer dialog and error alert.

use crate::models::layer::{LayerOptions, LayerStyles, LayerType};
use crate::models::store::NewLayer;
use crate::util::color::rgb_to_hex;

/// Form state for the add-layer dialog.
#[derive(Debug, Clone, PartialEq)]
pub struct AddLayerForm {
    pub layer_type: LayerType,
    pub url: String,
    pub text: String,
    pub color: [u8; 3],
    pub opacity: f64,
    pub font_size: f64,
    pub start: f64,
    pub end: f64,
}

impl AddLayerForm {
    pub fn new(layer_type: LayerType) -> Self {
        Self {
            layer_type,
            url: String::new(),
            text: String::new(),
            color: [255, 255, 255],
            opacity: 1.0,
            font_size: 30.0,
            start: 0.0,
            end: 5.0,
        }
    }

    pub fn title(&self) -> &'static str {
        match self.layer_type {
            LayerType::Video => "Add Video Layer",
            LayerType::Image => "Add Image Layer",
            LayerType::Text => "Add Text Layer",
        }
    }

    /// Build the add-layer input; `None` while the required field is empty.
    pub fn submit(&self) -> Option<NewLayer> {
        let options = match self.layer_type {
            LayerType::Video => LayerOptions::video(required(&self.url)?),
            LayerType::Image => LayerOptions::image(required(&self.url)?),
            LayerType::Text => LayerOptions::text(
                required(&self.text)?,
                LayerStyles::text_defaults(rgb_to_hex(self.color), self.opacity, self.font_size),
            ),
        };
        Some(NewLayer {
            layer_type: self.layer_type,
            options,
            start: self.start,
            end: self.end,
        })
    }
}

fn required(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Outcome of one frame of the dialog.
#[derive(Debug, Clone, PartialEq)]
pub enum DialogResult {
    Open,
    Cancelled,
    Submitted(NewLayer),
}

/// Display the add-layer dialog.
pub fn add_layer_dialog(ctx: &egui::Context, form: &mut AddLayerForm) -> DialogResult {
    let mut result = DialogResult::Open;
    let mut open = true;

    egui::Window::new(form.title())
        .collapsible(false)
        .resizable(false)
        .open(&mut open)
        .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
        .show(ctx, |ui| {
            egui::Grid::new("add_layer_grid")
                .num_columns(2)
                .spacing([12.0, 6.0])
                .show(ui, |ui| {
                    match form.layer_type {
                        LayerType::Video | LayerType::Image => {
                            ui.label(if form.layer_type == LayerType::Video {
                                "Video URL"
                            } else {
                                "Image URL"
                            });
                            ui.horizontal(|ui| {
                                ui.add(
                                    egui::TextEdit::singleline(&mut form.url)
                                        .hint_text("https://example.com/media")
                                        .desired_width(260.0),
                                );
                                if ui.button("Browse...").clicked() {
                                    if let Some(path) = pick_media(form.layer_type) {
                                        form.url = path.to_string_lossy().to_string();
                                    }
                                }
                            });
                            ui.end_row();
                        }
                        LayerType::Text => {
                            ui.label("Text Content");
                            ui.add(
                                egui::TextEdit::singleline(&mut form.text)
                                    .hint_text("Hello World")
                                    .desired_width(260.0),
                            );
                            ui.end_row();

                            ui.label("Color");
                            ui.color_edit_button_srgb(&mut form.color);
                            ui.end_row();

                            ui.label("Opacity");
                            ui.add(egui::Slider::new(&mut form.opacity, 0.0..=1.0).step_by(0.1));
                            ui.end_row();

                            ui.label("Font Size (px)");
                            ui.add(egui::DragValue::new(&mut form.font_size).clamp_range(10.0..=200.0));
                            ui.end_row();
                        }
                    }

                    ui.label("Start Time (s)");
                    ui.add(
                        egui::DragValue::new(&mut form.start)
                            .speed(0.1)
                            .clamp_range(0.0..=f64::MAX),
                    );
                    ui.end_row();

                    ui.label("End Time (s)");
                    ui.add(
                        egui::DragValue::new(&mut form.end)
                            .speed(0.1)
                            .clamp_range(0.0..=f64::MAX),
                    );
                    ui.end_row();
                });

            ui.separator();
            ui.horizontal(|ui| {
                let submission = form.submit();
                if ui
                    .add_enabled(submission.is_some(), egui::Button::new("Add Layer"))
                    .clicked()
                {
                    if let Some(new_layer) = submission {
                        result = DialogResult::Submitted(new_layer);
                    }
                }
                if ui.button("Cancel").clicked() {
                    result = DialogResult::Cancelled;
                }
            });
        });

    if !open {
        result = DialogResult::Cancelled;
    }
    result
}

fn pick_media(layer_type: LayerType) -> Option<std::path::PathBuf> {
    let dialog = rfd::FileDialog::new();
    let dialog = match layer_type {
        LayerType::Video => dialog.add_filter("Videos", &["mp4", "webm", "mov", "mkv"]),
        _ => dialog.add_filter("Images", &["jpg", "jpeg", "png", "bmp", "gif", "webp"]),
    };
    dialog.pick_file()
}

/// Display a blocking error message. Clears `message` once dismissed.
pub fn error_alert(ctx: &egui::Context, message: &mut Option<String>) {
    let Some(text) = message.as_deref() else {
        return;
    };

    let mut dismissed = false;
    egui::Window::new("Error")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
        .show(ctx, |ui| {
            ui.label(egui::RichText::new(text).color(egui::Color32::from_rgb(255, 120, 120)));
            ui.add_space(8.0);
            if ui.button("OK").clicked() {
                dismissed = true;
            }
        });

    if dismissed {
        *message = None;
    }
}
