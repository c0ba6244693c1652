//! The gallery screen: saved flow cards, templates and the delete
//! confirmation dialog.

use super::state::{EditorSession, FlowBuilderApp, PendingFileOperation};
use crate::types::{Flow, FlowId};
use eframe::egui;

enum GalleryAction {
    Create,
    Open(FlowId),
    Duplicate(FlowId),
    RequestDelete(FlowId),
    UseTemplate(&'static str),
    Import,
}

impl FlowBuilderApp {
    /// Draws the gallery into the central panel.
    pub fn draw_gallery(&mut self, ui: &mut egui::Ui) {
        let mut actions = Vec::new();

        ui.horizontal(|ui| {
            ui.heading("Flows");
            ui.add_space(16.0);
            ui.add(
                egui::TextEdit::singleline(&mut self.gallery_screen.new_flow_name)
                    .hint_text("Untitled flow")
                    .desired_width(180.0),
            );
            if ui.button("+ New flow").clicked() {
                actions.push(GalleryAction::Create);
            }
            if ui.button("📂 Import…").clicked() {
                actions.push(GalleryAction::Import);
            }
        });
        ui.separator();

        egui::ScrollArea::vertical().show(ui, |ui| {
            if self.gallery_screen.flows.is_empty() {
                ui.label("No flows yet. Create one or start from a template below.");
            }
            for summary in &self.gallery_screen.flows {
                egui::Frame::group(ui.style()).show(ui, |ui| {
                    ui.set_width(ui.available_width());
                    ui.horizontal(|ui| {
                        ui.vertical(|ui| {
                            ui.label(egui::RichText::new(&summary.name).strong().size(16.0));
                            if !summary.description.is_empty() {
                                ui.label(&summary.description);
                            }
                            ui.label(
                                egui::RichText::new(format!(
                                    "{} nodes · edited {}",
                                    summary.node_count,
                                    summary.last_modified.format("%Y-%m-%d %H:%M")
                                ))
                                .small()
                                .weak(),
                            );
                        });
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui.button("🗑").on_hover_text("Delete").clicked() {
                                actions.push(GalleryAction::RequestDelete(summary.id));
                            }
                            if ui.button("Duplicate").clicked() {
                                actions.push(GalleryAction::Duplicate(summary.id));
                            }
                            if ui.button("Open").clicked() {
                                actions.push(GalleryAction::Open(summary.id));
                            }
                        });
                    });
                });
                ui.add_space(4.0);
            }

            ui.add_space(12.0);
            ui.heading("Templates");
            ui.separator();
            for template in self.gallery.templates() {
                egui::Frame::group(ui.style()).show(ui, |ui| {
                    ui.set_width(ui.available_width());
                    ui.horizontal(|ui| {
                        ui.vertical(|ui| {
                            ui.label(egui::RichText::new(template.category).small().weak());
                            ui.label(egui::RichText::new(template.name).strong());
                            ui.label(template.description);
                        });
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui.button("Use template").clicked() {
                                actions.push(GalleryAction::UseTemplate(template.id));
                            }
                        });
                    });
                });
                ui.add_space(4.0);
            }
        });

        for action in actions {
            self.apply_gallery_action(action);
        }
    }

    fn apply_gallery_action(&mut self, action: GalleryAction) {
        match action {
            GalleryAction::Create => {
                let name = match self.gallery_screen.new_flow_name.trim() {
                    "" => "Untitled flow".to_string(),
                    name => name.to_string(),
                };
                match self.gallery.create_new(name) {
                    Ok(flow) => {
                        self.gallery_screen.new_flow_name.clear();
                        self.open_in_editor(flow);
                    }
                    Err(err) => self.report_error("Could not create flow", err),
                }
            }
            GalleryAction::Open(id) => match self.gallery.open_flow(id) {
                Ok(flow) => self.open_in_editor(flow),
                Err(err) => self.report_error("Could not open flow", err),
            },
            GalleryAction::Duplicate(id) => match self.gallery.duplicate_flow(id) {
                Ok(copy) => self.report(format!("Created {}", copy.name)),
                Err(err) => self.report_error("Could not duplicate flow", err),
            },
            GalleryAction::RequestDelete(id) => match self.gallery.request_delete(id) {
                Ok(pending) => self.gallery_screen.pending_delete = Some(pending),
                Err(err) => self.report_error("Could not delete flow", err),
            },
            GalleryAction::UseTemplate(template_id) => match self.gallery.use_template(template_id) {
                Ok(flow) => self.open_in_editor(flow),
                Err(err) => self.report_error("Could not use template", err),
            },
            GalleryAction::Import => self.file.pending = Some(PendingFileOperation::Import),
        }
        self.refresh_flow_list();
    }

    /// Switches to the editor with `flow` open.
    pub fn open_in_editor(&mut self, flow: Flow) {
        log::info!("editing flow {} ({})", flow.name, flow.id);
        self.session = Some(EditorSession::new(flow));
        self.canvas.centered = false;
        self.interaction.cancel();
    }

    /// Shows the "are you sure" dialog for a pending delete.
    pub fn draw_delete_confirmation(&mut self, ctx: &egui::Context) {
        let Some(pending) = &self.gallery_screen.pending_delete else {
            return;
        };
        let mut confirmed = false;
        let mut cancelled = false;

        egui::Window::new("Delete flow?")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(format!(
                    "Delete \"{}\"? This cannot be undone.",
                    pending.name()
                ));
                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    if ui.button("Delete").clicked() {
                        confirmed = true;
                    }
                    if ui.button("Cancel").clicked() {
                        cancelled = true;
                    }
                });
            });

        if confirmed {
            if let Some(pending) = self.gallery_screen.pending_delete.take() {
                let name = pending.name().to_string();
                match self.gallery.confirm_delete(pending) {
                    Ok(()) => self.report(format!("Deleted {name}")),
                    Err(err) => self.report_error("Could not delete flow", err),
                }
                self.refresh_flow_list();
            }
        } else if cancelled {
            self.gallery_screen.pending_delete = None;
        }
    }
}
