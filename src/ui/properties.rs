// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Layer properties panel.
//!
//! Widgets edit a draft copy of the selected layer; whatever differs from
//! the stored layer at the end of the frame becomes one update.

use crate::models::layer::{Layer, LayerChanges, LayerId, LayerStyles, LayerType};
use crate::util::color::{hex_to_rgb, rgb_to_hex};

/// Result of properties panel interaction.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertiesAction {
    None,
    Select(LayerId),
    Update { id: LayerId, changes: LayerChanges },
    Delete(LayerId),
}

/// The fields of `after` that differ from `before`.
pub fn changes_between(before: &Layer, after: &Layer) -> LayerChanges {
    LayerChanges {
        name: (after.name != before.name).then(|| after.name.clone()),
        z_index: (after.z_index != before.z_index).then_some(after.z_index),
        timeline: (after.timeline != before.timeline).then_some(after.timeline),
        geometry: (after.geometry != before.geometry).then_some(after.geometry),
        options: (after.options != before.options).then(|| after.options.clone()),
    }
}

/// Display the properties panel for `selected`, plus the layer list.
pub fn show(ui: &mut egui::Ui, layers: &[Layer], selected: Option<&Layer>) -> PropertiesAction {
    let mut action = PropertiesAction::None;

    ui.heading("Layers");
    egui::ScrollArea::vertical()
        .id_source("layer_list")
        .max_height(180.0)
        .show(ui, |ui| {
            if layers.is_empty() {
                ui.label(egui::RichText::new("No layers yet").weak());
            }
            for layer in layers {
                let is_selected = selected.is_some_and(|s| s.id == layer.id);
                let label = format!("{} {}", type_icon(layer.layer_type), layer.name);
                if ui.selectable_label(is_selected, label).clicked() {
                    action = PropertiesAction::Select(layer.id.clone());
                }
            }
        });

    ui.separator();

    let Some(layer) = selected else {
        ui.add_space(20.0);
        ui.vertical_centered(|ui| {
            ui.label(egui::RichText::new("Select a layer to edit properties").weak());
        });
        return action;
    };

    let mut draft = layer.clone();
    let mut delete = false;

    egui::ScrollArea::vertical()
        .id_source("layer_properties")
        .show(ui, |ui| {
            ui.strong("Layer Info");
            ui.label("Name");
            ui.text_edit_singleline(&mut draft.name);
            ui.horizontal(|ui| {
                ui.label("Z-index");
                ui.add(egui::DragValue::new(&mut draft.z_index));
            });

            ui.add_space(8.0);
            ui.strong("Timeline (s)");
            egui::Grid::new("timeline_grid").num_columns(2).show(ui, |ui| {
                ui.label("Start");
                ui.add(
                    egui::DragValue::new(&mut draft.timeline.start)
                        .speed(0.1)
                        .clamp_range(0.0..=f64::MAX),
                );
                ui.end_row();
                ui.label("End");
                ui.add(
                    egui::DragValue::new(&mut draft.timeline.end)
                        .speed(0.1)
                        .clamp_range(0.0..=f64::MAX),
                );
                ui.end_row();
            });

            ui.add_space(8.0);
            ui.strong("Geometry (Relative 0-1)");
            egui::Grid::new("geometry_grid").num_columns(4).show(ui, |ui| {
                geometry_field(ui, "X", &mut draft.geometry.x);
                geometry_field(ui, "Y", &mut draft.geometry.y);
                ui.end_row();
                geometry_field(ui, "Width", &mut draft.geometry.width);
                geometry_field(ui, "Height", &mut draft.geometry.height);
                ui.end_row();
            });

            ui.add_space(8.0);
            ui.strong("Properties");
            match draft.layer_type {
                LayerType::Video => video_properties(ui, &mut draft),
                LayerType::Image => {
                    if let Some(url) = &draft.options.image_url {
                        ui.label(egui::RichText::new(url).weak().small());
                    }
                    rotation_field(ui, &mut draft);
                }
                LayerType::Text => text_properties(ui, &mut draft),
            }

            ui.add_space(12.0);
            ui.separator();
            let delete_button = egui::Button::new(
                egui::RichText::new("Delete Layer").color(egui::Color32::WHITE),
            )
            .fill(egui::Color32::from_rgb(200, 40, 40));
            if ui.add_sized([ui.available_width(), 28.0], delete_button).clicked() {
                delete = true;
            }
        });

    if delete {
        return PropertiesAction::Delete(layer.id.clone());
    }

    let changes = changes_between(layer, &draft);
    if !changes.is_empty() {
        action = PropertiesAction::Update {
            id: layer.id.clone(),
            changes,
        };
    }
    action
}

fn type_icon(layer_type: LayerType) -> &'static str {
    match layer_type {
        LayerType::Video => "🎬",
        LayerType::Image => "🖼",
        LayerType::Text => "🔤",
    }
}

fn geometry_field(ui: &mut egui::Ui, label: &str, value: &mut f64) {
    ui.label(label);
    ui.add(egui::DragValue::new(value).speed(0.01).max_decimals(3));
}

fn rotation_field(ui: &mut egui::Ui, layer: &mut Layer) {
    let mut rotation = layer.options.rotation();
    ui.horizontal(|ui| {
        ui.label("Rotation (deg)");
        ui.add(egui::DragValue::new(&mut rotation).speed(1.0));
    });
    if rotation != layer.options.rotation() {
        let styles = layer.options.styles.get_or_insert_with(LayerStyles::default);
        styles.rotation = rotation;
    }
}

fn video_properties(ui: &mut egui::Ui, layer: &mut Layer) {
    let options = &mut layer.options;
    if let Some(url) = &options.video_url {
        ui.label(egui::RichText::new(url).weak().small());
    }

    let mut mute = options.is_muted();
    if ui.checkbox(&mut mute, "Mute").changed() {
        options.mute = Some(mute);
    }

    let mut volume = options.volume.unwrap_or(1.0);
    ui.label("Volume");
    if ui
        .add(egui::Slider::new(&mut volume, 0.0..=1.0).step_by(0.1))
        .changed()
    {
        options.volume = Some(volume);
    }

    rotation_field(ui, layer);
}

fn text_properties(ui: &mut egui::Ui, layer: &mut Layer) {
    let options = &mut layer.options;

    let mut content = options.text.clone().unwrap_or_default();
    ui.label("Content");
    if ui.text_edit_multiline(&mut content).changed() {
        options.text = Some(content);
    }

    let mut styles = options.styles.clone().unwrap_or_default();

    let mut rgb = hex_to_rgb(&styles.color).unwrap_or([255, 255, 255]);
    ui.horizontal(|ui| {
        ui.label("Color");
        if ui.color_edit_button_srgb(&mut rgb).changed() {
            styles.color = rgb_to_hex(rgb);
        }
    });

    ui.label("Opacity");
    ui.add(egui::Slider::new(&mut styles.opacity, 0.0..=1.0).step_by(0.1));

    let mut font_size = styles.font_size.unwrap_or(30.0);
    ui.horizontal(|ui| {
        ui.label("Font Size (px)");
        if ui
            .add(egui::DragValue::new(&mut font_size).clamp_range(10.0..=200.0))
            .changed()
        {
            styles.font_size = Some(font_size);
        }
    });

    ui.horizontal(|ui| {
        ui.label("Rotation (deg)");
        ui.add(egui::DragValue::new(&mut styles.rotation).speed(1.0));
    });

    if options.styles.as_ref() != Some(&styles) {
        options.styles = Some(styles);
    }
}
