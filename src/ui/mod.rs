//! User interface for the flow builder.
//!
//! # Module Organization
//!
//! - `state` - Application state structures and the main [`FlowBuilderApp`]
//! - `canvas` - Canvas navigation, hit testing and pointer interaction
//! - `rendering` - Drawing the grid, edges and nodes
//! - `drawer_panel` - The node drawer: menus and the configuration form
//! - `gallery_view` - The flow gallery screen and delete confirmation
//! - `file_ops` - Import/export for native and WASM

mod canvas;
mod drawer_panel;
mod file_ops;
mod gallery_view;
mod rendering;
mod state;

pub use canvas::CanvasHit;
pub use file_ops::export_file_name;
pub use state::{
    CanvasState, DynStore, EditorSession, FileOperationResult, FlowBuilderApp, InteractionState,
    PendingConnection, APP_STATE_KEY,
};

use eframe::egui;

impl eframe::App for FlowBuilderApp {
    /// Persists the editor settings between restarts.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        match serde_json::to_string(&self.config) {
            Ok(json) => storage.set_string(APP_STATE_KEY, json),
            Err(err) => log::error!("failed to serialize settings: {err}"),
        }
    }

    /// Main update function called by egui for each frame.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let visuals = if self.config.dark_mode {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        };
        ctx.set_visuals(visuals);

        self.handle_pending_operations(ctx);
        self.handle_save_shortcut(ctx);

        if ctx.input(|i| i.viewport().close_requested()) {
            self.save_open_flow();
        }

        if self.session.is_some() {
            self.draw_editor_toolbar(ctx);
            self.draw_drawer_panel(ctx);
            egui::CentralPanel::default().show(ctx, |ui| {
                self.draw_canvas(ui);
            });
        } else {
            self.draw_gallery_toolbar(ctx);
            egui::CentralPanel::default().show(ctx, |ui| {
                self.draw_gallery(ui);
            });
            self.draw_delete_confirmation(ctx);
        }

        self.autosave_if_idle();
    }
}

impl FlowBuilderApp {
    /// Draws the canvas for the open flow and handles its interactions.
    pub fn draw_canvas(&mut self, ui: &mut egui::Ui) {
        let (response, painter) =
            ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());

        self.center_canvas_on_flow(response.rect);
        self.handle_canvas_panning(ui, &response);
        self.handle_canvas_zoom(ui, &response);
        self.handle_node_interaction(ui, &response);
        self.handle_canvas_shortcuts(ui, &response);

        self.render_flow_elements(&painter, response.rect);

        if self
            .session
            .as_ref()
            .is_some_and(|s| s.flow.graph.is_empty())
        {
            painter.text(
                response.rect.center(),
                egui::Align2::CENTER_CENTER,
                "Double-click the canvas or press \"+ Add node\" to start",
                egui::FontId::proportional(16.0),
                ui.visuals().weak_text_color(),
            );
        }
    }

    fn draw_editor_toolbar(&mut self, ctx: &egui::Context) {
        let mut back_to_gallery = false;
        egui::TopBottomPanel::top("editor_toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("⬅ Flows").clicked() {
                    back_to_gallery = true;
                }
                ui.separator();

                if let Some(session) = &mut self.session {
                    let name = ui.add(
                        egui::TextEdit::singleline(&mut session.flow.name).desired_width(200.0),
                    );
                    if name.changed() {
                        session.dirty = true;
                    }
                    if ui.button("+ Add node").clicked() {
                        session.drawer.close();
                        session.drawer.open();
                        session.drawer_anchor = None;
                    }
                }
                if ui.button("💾 Save").clicked() {
                    self.save_open_flow();
                }
                if ui.button("Export…").clicked() {
                    self.export_open_flow();
                }
                ui.separator();
                ui.checkbox(&mut self.config.show_grid, "Grid");
                ui.checkbox(&mut self.config.autosave, "Autosave");
                self.draw_theme_toggle(ui);
                ui.label(format!("{:.0}%", self.canvas.zoom_factor * 100.0));

                if let Some(session) = &self.session {
                    if session.dirty {
                        ui.label(egui::RichText::new("● unsaved").weak());
                    }
                }
                if let Some(status) = &self.status {
                    ui.label(egui::RichText::new(status).small());
                }
            });
        });

        if back_to_gallery {
            self.close_editor();
        }
    }

    fn draw_gallery_toolbar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("gallery_toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.strong("Flow Builder");
                ui.separator();
                self.draw_theme_toggle(ui);
                if let Some(status) = &self.status {
                    ui.label(egui::RichText::new(status).small());
                }
            });
        });
    }

    fn draw_theme_toggle(&mut self, ui: &mut egui::Ui) {
        let label = if self.config.dark_mode { "🌙" } else { "☀" };
        if ui.button(label).on_hover_text("Toggle theme").clicked() {
            self.config.dark_mode = !self.config.dark_mode;
        }
    }

    fn handle_save_shortcut(&mut self, ctx: &egui::Context) {
        if ctx.input(|i| i.modifiers.command && i.key_pressed(egui::Key::S)) {
            self.save_open_flow();
        }
    }

    /// Writes the open flow to the gallery if it has unsaved changes.
    pub fn save_open_flow(&mut self) {
        let Some(session) = &mut self.session else {
            return;
        };
        if !session.dirty {
            return;
        }
        match self.gallery.save_flow(&mut session.flow) {
            Ok(()) => {
                session.dirty = false;
                self.refresh_flow_list();
            }
            Err(err) => self.report_error("Could not save flow", err),
        }
    }

    /// Saves and leaves the editor for the gallery.
    pub fn close_editor(&mut self) {
        self.save_open_flow();
        self.session = None;
        self.interaction.cancel();
        self.refresh_flow_list();
    }

    fn autosave_if_idle(&mut self) {
        let idle = self.interaction.press_origin.is_none();
        if self.config.autosave && idle {
            self.save_open_flow();
        }
    }
}

#[cfg(test)]
mod tests;
