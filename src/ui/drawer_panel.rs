//! The drawer side panel: category menus, node pickers and the node
//! configuration form.

use super::state::FlowBuilderApp;
use crate::binder::{apply_edit, FieldEdit, FieldValue, NodeForm};
use crate::drawer::DrawerView;
use crate::registry::{FieldWidget, NodeCategory};
use eframe::egui;

/// What the user asked the drawer to do this frame. Collected while the
/// panel is drawn and applied afterwards.
enum DrawerAction {
    Back,
    Close,
    ChooseMenu(NodeCategory),
    Pick(crate::registry::NodeKind),
    Edit(FieldEdit),
    DeleteNode(crate::types::NodeId),
}

impl FlowBuilderApp {
    /// Draws the drawer panel when it is open.
    pub fn draw_drawer_panel(&mut self, ctx: &egui::Context) {
        let Some(session) = &self.session else {
            return;
        };
        if !session.drawer.is_open() {
            return;
        }

        let mut actions = Vec::new();
        egui::SidePanel::right("drawer_panel")
            .resizable(true)
            .default_width(300.0)
            .min_width(240.0)
            .show(ctx, |ui| {
                self.draw_drawer_contents(ui, &mut actions);
            });

        for action in actions {
            self.apply_drawer_action(action);
        }
    }

    /// Draws the drawer's header and current view into `ui`.
    fn draw_drawer_contents(&self, ui: &mut egui::Ui, actions: &mut Vec<DrawerAction>) {
        let Some(session) = &self.session else {
            return;
        };
        let view = session.drawer.view();

        ui.horizontal(|ui| {
            if view != DrawerView::Main && ui.button("⬅ Back").clicked() {
                actions.push(DrawerAction::Back);
            }
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("✖").on_hover_text("Close").clicked() {
                    actions.push(DrawerAction::Close);
                }
            });
        });
        ui.label(
            egui::RichText::new(session.drawer.breadcrumb().join(" › "))
                .small()
                .weak(),
        );
        ui.separator();

        match view {
            DrawerView::Main => {
                ui.heading("Add node");
                for category in NodeCategory::ALL {
                    let text = format!("{}\n{}", category.title(), category.blurb());
                    if ui
                        .add_sized([ui.available_width(), 44.0], egui::Button::new(text))
                        .clicked()
                    {
                        actions.push(DrawerAction::ChooseMenu(category));
                    }
                }
            }
            DrawerView::Menu(category) => {
                ui.heading(category.title());
                ui.label(category.blurb());
                ui.add_space(4.0);
                for kind in category.kinds() {
                    if ui
                        .add_sized(
                            [ui.available_width(), 32.0],
                            egui::Button::new(kind.display_name()),
                        )
                        .clicked()
                    {
                        actions.push(DrawerAction::Pick(*kind));
                    }
                }
            }
            DrawerView::Configuring { node_id, .. } => {
                match NodeForm::read(&session.flow.graph, node_id) {
                    Some(form) => {
                        egui::ScrollArea::vertical().show(ui, |ui| {
                            draw_form(ui, &form, actions);
                            ui.add_space(12.0);
                            ui.separator();
                            if ui.button("🗑 Delete node").clicked() {
                                actions.push(DrawerAction::DeleteNode(node_id));
                            }
                        });
                    }
                    None => {
                        ui.label("This node no longer exists.");
                    }
                }
            }
        }
    }

    fn apply_drawer_action(&mut self, action: DrawerAction) {
        if let DrawerAction::DeleteNode(node_id) = action {
            self.on_delete_node(node_id);
            return;
        }
        let Some(session) = &mut self.session else {
            return;
        };
        match action {
            DrawerAction::Back => session.drawer.back(),
            DrawerAction::Close => session.drawer.close(),
            DrawerAction::ChooseMenu(category) => session.drawer.choose_menu(category),
            DrawerAction::Pick(kind) => {
                let anchor = session.drawer_anchor.take();
                if session
                    .drawer
                    .pick_kind(kind, &mut session.flow.graph, anchor)
                    .is_some()
                {
                    session.dirty = true;
                }
            }
            DrawerAction::Edit(edit) => {
                if let Some(node_id) = session.drawer.selected_node_id() {
                    if apply_edit(&mut session.flow.graph, node_id, edit) {
                        session.dirty = true;
                    }
                }
            }
            DrawerAction::DeleteNode(_) => {}
        }
        session.drawer.reconcile(&session.flow.graph);
    }
}

fn draw_form(ui: &mut egui::Ui, form: &NodeForm, actions: &mut Vec<DrawerAction>) {
    ui.heading(form.kind.display_name());
    ui.add_space(6.0);

    for field in &form.fields {
        let key = field.spec.key;
        ui.label(egui::RichText::new(field.spec.label).strong());

        match (&field.value, field.spec.widget) {
            (FieldValue::Text(current), widget) => {
                let mut buffer = current.clone();
                let editor = match widget {
                    FieldWidget::MultiLine => egui::TextEdit::multiline(&mut buffer).desired_rows(3),
                    FieldWidget::Code => egui::TextEdit::multiline(&mut buffer)
                        .code_editor()
                        .desired_rows(8),
                    _ => egui::TextEdit::singleline(&mut buffer),
                };
                let response = ui.add(editor.id_salt(key).desired_width(f32::INFINITY));
                if response.changed() {
                    actions.push(DrawerAction::Edit(FieldEdit::SetText { key, value: buffer }));
                }
            }
            (FieldValue::Number(current), _) => {
                let mut value = *current;
                if ui
                    .add(egui::DragValue::new(&mut value).range(0..=86_400).suffix(" s"))
                    .changed()
                {
                    actions.push(DrawerAction::Edit(FieldEdit::SetNumber { key, value }));
                }
            }
            (FieldValue::Choice { selected, choices }, _) => {
                let mut chosen = selected.clone();
                egui::ComboBox::from_id_salt(key)
                    .selected_text(chosen.clone())
                    .show_ui(ui, |ui| {
                        for choice in choices.iter() {
                            ui.selectable_value(&mut chosen, choice.to_string(), *choice);
                        }
                    });
                if chosen != *selected {
                    actions.push(DrawerAction::Edit(FieldEdit::SetText { key, value: chosen }));
                }
            }
            (FieldValue::Options(options), _) => {
                for (index, option) in options.iter().enumerate() {
                    let mut label = option.clone();
                    ui.horizontal(|ui| {
                        ui.label(format!("{}.", index + 1));
                        let response = ui.add(
                            egui::TextEdit::singleline(&mut label)
                                .id_salt((key, index))
                                .desired_width(f32::INFINITY),
                        );
                        if response.changed() {
                            actions.push(DrawerAction::Edit(FieldEdit::SetOption {
                                index,
                                value: label.clone(),
                            }));
                        }
                    });
                }
                if ui.button("+ Add option").clicked() {
                    actions.push(DrawerAction::Edit(FieldEdit::AppendOption));
                }
            }
        }
        ui.add_space(6.0);
    }
}
