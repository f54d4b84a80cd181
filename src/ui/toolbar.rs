// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Toolbar with add-layer buttons and the stage ratio selector.

use crate::models::{layer::LayerType, project::AspectRatio};

/// Result of toolbar interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarAction {
    None,
    OpenAddLayer(LayerType),
    SetAspectRatio(AspectRatio),
}

/// Display the toolbar.
pub fn show(ui: &mut egui::Ui, aspect_ratio: AspectRatio, is_loading: bool) -> ToolbarAction {
    let mut action = ToolbarAction::None;

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        ui.label("Add:");
        ui.add_enabled_ui(!is_loading, |ui| {
            if ui.button("🎬 Video").clicked() {
                action = ToolbarAction::OpenAddLayer(LayerType::Video);
            }
            if ui.button("🖼 Image").clicked() {
                action = ToolbarAction::OpenAddLayer(LayerType::Image);
            }
            if ui.button("🔤 Text").clicked() {
                action = ToolbarAction::OpenAddLayer(LayerType::Text);
            }
        });

        ui.separator();

        ui.label("Ratio:");
        let mut selected = aspect_ratio;
        egui::ComboBox::from_id_source("stage_ratio")
            .selected_text(selected.as_str())
            .show_ui(ui, |ui| {
                for ratio in AspectRatio::ALL {
                    ui.selectable_value(&mut selected, ratio, ratio.as_str());
                }
            });
        if selected != aspect_ratio {
            action = ToolbarAction::SetAspectRatio(selected);
        }

        if is_loading {
            ui.separator();
            ui.spinner();
            ui.label(egui::RichText::new("Loading assets...").italics().weak());
        }
    });

    action
}
