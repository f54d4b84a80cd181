// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! Each frame the shell advances the playback clock, reconciles media
//! handles against the visible layers, draws the panels and then applies
//! whatever the panels asked for to the store.

use crate::config::EditorConfig;
use crate::io::{
    import::{complete_import, ImportJob},
    media::VirtualBackend,
    serialization::{export_file_name, export_project},
};
use crate::models::layer::Layer;
use crate::models::store::Store;
use crate::playback::{
    clock::{PlaybackClock, TickHandle},
    media_sync::{ClockSnapshot, MediaHandle, MediaSync},
    tracks::apply_track_event,
    visibility::VisibleSet,
};
use crate::ui::{
    canvas::{self, ActiveGesture, CanvasAction, TextureCache},
    modals::{self, AddLayerForm, DialogResult},
    properties::{self, PropertiesAction},
    timeline::{self, ActionDrag, TimelineAction},
    toolbar::{self, ToolbarAction},
};
use std::path::PathBuf;
use std::time::{Instant, SystemTime};

/// Main application state.
pub struct EditorApp {
    store: Store,
    config: EditorConfig,

    clock: PlaybackClock,
    /// Next tick of the running clock, if any.
    tick: Option<TickHandle>,
    visible: VisibleSet,
    media: MediaSync<VirtualBackend>,

    /// Import running in the background
    import_job: Option<ImportJob>,
    /// Message for the blocking error window
    error_message: Option<String>,

    add_layer: Option<AddLayerForm>,
    canvas_gesture: ActiveGesture,
    timeline_drag: Option<ActionDrag>,
    textures: TextureCache,
}

impl EditorApp {
    pub fn new(mut store: Store, config: EditorConfig, project: Option<PathBuf>) -> Self {
        let import_job = project.map(|path| {
            log::info!("Importing {} on startup", path.display());
            ImportJob::start(path, &mut store)
        });

        Self {
            media: MediaSync::new(VirtualBackend::default(), config.thresholds()),
            store,
            config,
            clock: PlaybackClock::new(),
            tick: None,
            visible: VisibleSet::new(),
            import_job,
            error_message: None,
            add_layer: None,
            canvas_gesture: None,
            timeline_drag: None,
            textures: TextureCache::default(),
        }
    }

    fn import_project(&mut self) {
        if self.import_job.is_some() {
            return;
        }
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Projects", &["json", "yaml", "yml"])
            .pick_file()
        {
            self.store.set_is_playing(false);
            self.import_job = Some(ImportJob::start(path, &mut self.store));
        }
    }

    /// Export the current state; `extension` picks the format.
    fn export_project(&mut self, extension: &str) {
        let default_name = export_file_name(SystemTime::now());
        let default_name = match extension {
            "json" => default_name,
            _ => default_name.replace(".json", &format!(".{}", extension)),
        };

        let Some(path) = rfd::FileDialog::new()
            .add_filter(extension.to_uppercase(), &[extension])
            .set_file_name(default_name)
            .save_file()
        else {
            return;
        };

        match export_project(self.store.state(), &path) {
            Ok(()) => log::info!("Exported project to {}", path.display()),
            Err(e) => {
                log::error!("Failed to export project: {}", e);
                self.error_message = Some(format!("Failed to export project: {}", e));
            }
        }
    }

    fn poll_import(&mut self) {
        let Some(result) = self.import_job.as_ref().and_then(ImportJob::poll) else {
            return;
        };
        self.import_job = None;

        match complete_import(&mut self.store, result) {
            Ok(()) => {
                self.textures.clear();
                self.canvas_gesture = None;
                self.timeline_drag = None;
            }
            Err(e) => self.error_message = Some(format!("Failed to load project: {}", e)),
        }
    }

    /// Advance the clock and bring media handles in line with the store.
    fn advance_playback(&mut self, dt: f64) {
        let now = Instant::now();
        if let Some(handle) = self.clock.sync(self.store.state(), now) {
            self.tick = Some(handle);
        }
        if let Some(handle) = self.tick.take() {
            self.tick = self.clock.tick(handle, &mut self.store, now);
        }

        self.media.for_each_handle(|player| player.advance(dt));

        let state = self.store.state();
        let ids = self
            .visible
            .resolve(&state.layers, self.store.layers_revision(), state.current_time);
        let visible: Vec<&Layer> = ids.iter().filter_map(|id| state.layer(id)).collect();
        self.media.reconcile_visible(visible, ClockSnapshot::from(state));
    }

    fn handle_keyboard(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() || self.add_layer.is_some() {
            return;
        }

        if ctx.input(|i| i.key_pressed(egui::Key::Space)) {
            self.store.toggle_playing();
        }
        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            self.store.set_selected_layer(None);
        }
        if ctx.input(|i| i.key_pressed(egui::Key::Delete) || i.key_pressed(egui::Key::Backspace)) {
            if let Some(id) = self.store.selected_layer().map(|l| l.id.clone()) {
                self.store.remove_layer(id);
            }
        }
    }

    fn handle_toolbar(&mut self, action: ToolbarAction) {
        match action {
            ToolbarAction::OpenAddLayer(layer_type) => {
                self.add_layer = Some(AddLayerForm::new(layer_type));
            }
            ToolbarAction::SetAspectRatio(ratio) => self.store.set_stage_size(ratio),
            ToolbarAction::None => {}
        }
    }

    fn handle_properties(&mut self, action: PropertiesAction) {
        match action {
            PropertiesAction::Select(id) => self.store.set_selected_layer(Some(id)),
            PropertiesAction::Update { id, changes } => self.store.update_layer(id, changes),
            PropertiesAction::Delete(id) => self.store.remove_layer(id),
            PropertiesAction::None => {}
        }
    }

    fn handle_timeline(&mut self, actions: Vec<TimelineAction>) {
        for action in actions {
            match action {
                TimelineAction::Track(event) => apply_track_event(&mut self.store, event),
                TimelineAction::SkipBack => self.store.scrub(0.0),
                TimelineAction::TogglePlay => self.store.toggle_playing(),
                TimelineAction::SkipForward => {
                    let duration = self.store.state().duration;
                    self.store.scrub(duration);
                }
                TimelineAction::SetSpeed(speed) => self.store.set_playback_speed(speed),
            }
        }
    }

    fn handle_canvas(&mut self, action: CanvasAction) {
        match action {
            CanvasAction::Select(id) => {
                if self.store.state().selected_layer_id.as_deref() != Some(id.as_str()) {
                    self.store.set_selected_layer(Some(id));
                }
            }
            CanvasAction::Deselect => {
                if self.store.state().selected_layer_id.is_some() {
                    self.store.set_selected_layer(None);
                }
            }
            CanvasAction::CommitGesture {
                layer_id,
                transient,
                container,
            } => transient.finish(&mut self.store, &layer_id, container),
            CanvasAction::None => {}
        }
    }
}

impl eframe::App for EditorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_import();

        let dt = ctx.input(|i| i.stable_dt) as f64;
        self.advance_playback(dt);

        if self.store.state().is_playing || self.import_job.is_some() {
            ctx.request_repaint();
        }

        // Top menu bar
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui
                        .add_enabled(self.import_job.is_none(), egui::Button::new("Import Project..."))
                        .clicked()
                    {
                        self.import_project();
                        ui.close_menu();
                    }
                    ui.separator();
                    ui.menu_button("Export Project", |ui| {
                        if ui.button("Export as JSON...").clicked() {
                            self.export_project("json");
                            ui.close_menu();
                        }
                        if ui.button("Export as YAML...").clicked() {
                            self.export_project("yaml");
                            ui.close_menu();
                        }
                    });
                    ui.separator();
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });
            });
        });

        let toolbar_action = egui::TopBottomPanel::top("toolbar")
            .show(ctx, |ui| {
                let state = self.store.state();
                toolbar::show(ui, state.stage.aspect_ratio, state.is_loading)
            })
            .inner;
        self.handle_toolbar(toolbar_action);

        let timeline_actions = egui::TopBottomPanel::bottom("timeline")
            .resizable(true)
            .default_height(220.0)
            .show(ctx, |ui| {
                timeline::show(
                    ui,
                    self.store.state(),
                    &self.config.playback_speeds,
                    &mut self.timeline_drag,
                )
            })
            .inner;
        self.handle_timeline(timeline_actions);

        let properties_action = egui::SidePanel::right("properties")
            .default_width(260.0)
            .show(ctx, |ui| {
                let state = self.store.state();
                properties::show(ui, &state.layers, state.selected_layer())
            })
            .inner;
        self.handle_properties(properties_action);

        self.handle_keyboard(ctx);

        let canvas_action = egui::CentralPanel::default()
            .show(ctx, |ui| {
                let state = self.store.state();
                if state.is_loading {
                    ui.centered_and_justified(|ui| {
                        ui.vertical_centered(|ui| {
                            ui.add_space(20.0);
                            ui.spinner();
                            ui.add_space(10.0);
                            ui.label(
                                egui::RichText::new("Loading project and assets...")
                                    .size(16.0)
                                    .color(egui::Color32::from_gray(200)),
                            );
                        });
                    });
                    return CanvasAction::None;
                }

                let ids = self
                    .visible
                    .resolve(&state.layers, self.store.layers_revision(), state.current_time);
                let visible: Vec<&Layer> = ids.iter().filter_map(|id| state.layer(id)).collect();
                let media = &self.media;
                let position = |id: &str| media.controller(id).map(|c| c.handle().position());
                canvas::show(
                    ui,
                    state,
                    &visible,
                    &mut self.textures,
                    &mut self.canvas_gesture,
                    &position,
                )
            })
            .inner;
        self.handle_canvas(canvas_action);

        if let Some(form) = self.add_layer.as_mut() {
            match modals::add_layer_dialog(ctx, form) {
                DialogResult::Submitted(new_layer) => {
                    let id = self.store.add_layer(new_layer);
                    self.store.set_selected_layer(Some(id));
                    self.add_layer = None;
                }
                DialogResult::Cancelled => self.add_layer = None,
                DialogResult::Open => {}
            }
        }

        modals::error_alert(ctx, &mut self.error_message);
    }
}
