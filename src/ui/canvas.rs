//! Canvas interaction and navigation functionality.
//!
//! This module handles canvas panning, zooming, node dragging, drag-to-connect
//! from output handles, node clicks and the per-node delete button, plus the
//! coordinate transformations between screen and world space.

use super::state::{FlowBuilderApp, PendingConnection};
use crate::constants::{
    CLICK_THRESHOLD, DELETE_BUTTON_SIZE, GRID_SIZE, HANDLE_RADIUS, HANDLE_SPACING, MAX_ZOOM,
    MIN_ZOOM, NODE_HEIGHT, NODE_WIDTH,
};
use crate::registry::INPUT_HANDLE;
use crate::types::{FlowNode, NodeId, Position};
use eframe::egui;

/// World-space size of a node. Nodes with many output handles grow taller
/// so that neighbouring handles stay [`HANDLE_SPACING`] apart.
pub fn node_size(node: &FlowNode) -> egui::Vec2 {
    let outputs = node.kind.output_handles(&node.data).len() as f32;
    egui::vec2(NODE_WIDTH, NODE_HEIGHT.max(HANDLE_SPACING * (outputs + 1.0)))
}

/// World-space rectangle of a node, centred on its position.
pub fn node_rect(node: &FlowNode) -> egui::Rect {
    egui::Rect::from_center_size(egui::pos2(node.position.x, node.position.y), node_size(node))
}

/// World-space centre of the node's input handle (left edge).
pub fn input_handle_pos(rect: egui::Rect) -> egui::Pos2 {
    rect.left_center()
}

/// World-space centre of output handle `index` out of `count`, spread evenly
/// down the node's right edge.
pub fn output_handle_pos(rect: egui::Rect, index: usize, count: usize) -> egui::Pos2 {
    let step = rect.height() / (count as f32 + 1.0);
    egui::pos2(rect.right(), rect.top() + step * (index as f32 + 1.0))
}

/// World-space rectangle of the node's delete button.
pub fn delete_button_rect(rect: egui::Rect) -> egui::Rect {
    let half = DELETE_BUTTON_SIZE / 2.0;
    egui::Rect::from_center_size(
        egui::pos2(rect.right() - half - 4.0, rect.top() + half + 4.0),
        egui::vec2(DELETE_BUTTON_SIZE, DELETE_BUTTON_SIZE),
    )
}

/// What a primary press landed on.
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasHit {
    /// A node's delete button
    DeleteButton(NodeId),
    /// An output handle of a node
    OutputHandle(NodeId, String),
    /// A node's body
    Node(NodeId),
}

impl FlowBuilderApp {
    /// Converts screen coordinates to world coordinates accounting for zoom and pan.
    pub fn screen_to_world(&self, screen_pos: egui::Pos2) -> egui::Pos2 {
        (screen_pos - self.canvas.offset) / self.canvas.zoom_factor
    }

    /// Where a node is drawn: at the drag preview while it is being dragged,
    /// otherwise at its stored position.
    pub fn displayed_node_rect(&self, node: &FlowNode) -> egui::Rect {
        match self.interaction.drag_preview {
            Some(preview) if self.interaction.dragging_node == Some(node.id) => {
                egui::Rect::from_center_size(egui::pos2(preview.x, preview.y), node_size(node))
            }
            _ => node_rect(node),
        }
    }

    /// Converts world coordinates to screen coordinates accounting for zoom and pan.
    pub fn world_to_screen(&self, world_pos: egui::Pos2) -> egui::Pos2 {
        world_pos * self.canvas.zoom_factor + self.canvas.offset
    }

    /// Snaps a position to the nearest grid point.
    pub fn snap_to_grid(&self, pos: egui::Pos2) -> egui::Pos2 {
        egui::pos2(
            (pos.x / GRID_SIZE).round() * GRID_SIZE,
            (pos.y / GRID_SIZE).round() * GRID_SIZE,
        )
    }

    /// Centres the view on the open flow's nodes the first time it is drawn.
    pub fn center_canvas_on_flow(&mut self, canvas_rect: egui::Rect) {
        if self.canvas.centered {
            return;
        }
        self.canvas.centered = true;
        let Some(session) = &self.session else {
            return;
        };
        let bounds = session
            .flow
            .graph
            .nodes()
            .iter()
            .map(node_rect)
            .reduce(|a, b| a.union(b));
        let focus = bounds.map(|r| r.center()).unwrap_or(egui::Pos2::ZERO);
        self.canvas.offset = canvas_rect.center() - focus * self.canvas.zoom_factor;
    }

    /// Handles middle-click or Cmd/Ctrl+left-click canvas panning.
    pub fn handle_canvas_panning(&mut self, ui: &mut egui::Ui, response: &egui::Response) {
        let should_pan = ui.input(|i| {
            i.pointer.middle_down() || (i.pointer.primary_down() && i.modifiers.command)
        });

        if should_pan {
            if let Some(current_pos) = response.interact_pointer_pos() {
                if !self.interaction.is_panning {
                    self.interaction.is_panning = true;
                    self.interaction.last_pan_pos = Some(current_pos);
                } else if let Some(last_pos) = self.interaction.last_pan_pos {
                    self.canvas.offset += current_pos - last_pos;
                    self.interaction.last_pan_pos = Some(current_pos);
                }
            }
        } else {
            self.interaction.is_panning = false;
            self.interaction.last_pan_pos = None;
        }
    }

    /// Handles scroll wheel zooming around the cursor.
    pub fn handle_canvas_zoom(&mut self, ui: &mut egui::Ui, response: &egui::Response) {
        let scroll_delta = ui.input(|i| i.smooth_scroll_delta.y);
        if scroll_delta == 0.0 {
            return;
        }
        let Some(mouse_pos) = ui
            .input(|i| i.pointer.hover_pos())
            .or_else(|| response.interact_pointer_pos())
        else {
            return;
        };
        if !response.rect.contains(mouse_pos) {
            return;
        }

        let anchor = self.screen_to_world(mouse_pos);
        let step = if scroll_delta > 0.0 { 0.025 } else { -0.025 };
        let old_zoom = self.canvas.zoom_factor;
        self.canvas.zoom_factor = (old_zoom + step).clamp(MIN_ZOOM, MAX_ZOOM);

        if (self.canvas.zoom_factor - old_zoom).abs() > f32::EPSILON {
            // keep the world point under the cursor fixed
            self.canvas.offset += mouse_pos - self.world_to_screen(anchor);
        }
    }

    /// Handles primary-button presses on the canvas: node dragging, node
    /// clicks, the delete button and drag-to-connect.
    ///
    /// A press is resolved on release. A press that never moved more than
    /// [`CLICK_THRESHOLD`] counts as a click.
    pub fn handle_node_interaction(&mut self, ui: &mut egui::Ui, response: &egui::Response) {
        if self.interaction.is_panning || self.session.is_none() {
            return;
        }
        let (primary_down, command) =
            ui.input(|i| (i.pointer.primary_down(), i.modifiers.command));

        if primary_down && !command {
            if let Some(current_pos) = response.interact_pointer_pos() {
                if self.interaction.press_origin.is_none() {
                    self.begin_press(current_pos);
                } else {
                    self.continue_press(current_pos, ui);
                }
            }
        } else if let Some(origin) = self.interaction.press_origin {
            let release_pos = ui
                .input(|i| i.pointer.interact_pos())
                .or_else(|| self.interaction.pending_connection.as_ref().map(|c| c.pointer))
                .unwrap_or(origin);
            self.finish_press(release_pos);
        }
    }

    /// Handles double clicks on empty canvas (open the drawer there) and the
    /// Escape and Delete keys.
    pub fn handle_canvas_shortcuts(&mut self, ui: &mut egui::Ui, response: &egui::Response) {
        if response.double_clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                let world = self.screen_to_world(pos);
                if self.hit_test(world).is_none() {
                    self.open_drawer_at(Some(Position::new(world.x, world.y)));
                }
            }
        }

        if ui.ctx().wants_keyboard_input() {
            return;
        }
        let (escape, delete) = ui.input(|i| {
            (
                i.key_pressed(egui::Key::Escape),
                i.key_pressed(egui::Key::Delete),
            )
        });
        if escape {
            let dragging = self.interaction.pending_connection.is_some()
                || self.interaction.dragging_node.is_some();
            if dragging {
                log::debug!("canvas drag cancelled");
                // press_origin stays set so the held button is not read as a new press
                self.interaction.pending_connection = None;
                self.interaction.dragging_node = None;
                self.interaction.drag_preview = None;
            } else if let Some(session) = &mut self.session {
                session.drawer.close();
            }
        }
        if delete {
            let selected = self
                .session
                .as_ref()
                .and_then(|s| s.drawer.selected_node_id());
            if let Some(node_id) = selected {
                self.on_delete_node(node_id);
            }
        }
    }

    /// Finds what is under a world position. Later nodes are drawn on top, so
    /// they win.
    pub fn hit_test(&self, world_pos: egui::Pos2) -> Option<CanvasHit> {
        let session = self.session.as_ref()?;
        let graph = &session.flow.graph;
        let handle_reach = HANDLE_RADIUS * 2.0;

        for node in graph.nodes().iter().rev() {
            let rect = node_rect(node);
            if delete_button_rect(rect).contains(world_pos) {
                return Some(CanvasHit::DeleteButton(node.id));
            }
            let handles = node.kind.output_handles(&node.data);
            let nearest = handles
                .iter()
                .enumerate()
                .map(|(index, handle)| {
                    let center = output_handle_pos(rect, index, handles.len());
                    (handle, center.distance(world_pos))
                })
                .filter(|(_, distance)| *distance <= handle_reach)
                .min_by(|a, b| a.1.total_cmp(&b.1));
            if let Some((handle, _)) = nearest {
                return Some(CanvasHit::OutputHandle(node.id, handle.clone()));
            }
            if rect.contains(world_pos) {
                return Some(CanvasHit::Node(node.id));
            }
        }
        None
    }

    /// Finds the node whose body or input handle is at the world position.
    pub fn find_node_at_position(&self, world_pos: egui::Pos2) -> Option<NodeId> {
        let session = self.session.as_ref()?;
        session
            .flow
            .graph
            .nodes()
            .iter()
            .rev()
            .find(|node| {
                let rect = node_rect(node);
                rect.contains(world_pos)
                    || input_handle_pos(rect).distance(world_pos) <= HANDLE_RADIUS * 2.0
            })
            .map(|node| node.id)
    }

    fn begin_press(&mut self, screen_pos: egui::Pos2) {
        let world = self.screen_to_world(screen_pos);
        self.interaction.press_origin = Some(screen_pos);
        self.interaction.moved_beyond_click = false;

        match self.hit_test(world) {
            Some(CanvasHit::OutputHandle(source, handle)) => {
                log::debug!("dragging connection from {source}:{handle}");
                self.interaction.pending_connection = Some(PendingConnection {
                    source,
                    handle,
                    pointer: screen_pos,
                });
            }
            Some(CanvasHit::Node(node_id)) => {
                if let Some(node) = self
                    .session
                    .as_ref()
                    .and_then(|s| s.flow.graph.node(node_id))
                {
                    let center = egui::pos2(node.position.x, node.position.y);
                    self.interaction.node_drag_offset = center - world;
                    self.interaction.dragging_node = Some(node_id);
                }
            }
            Some(CanvasHit::DeleteButton(_)) | None => {}
        }
    }

    fn continue_press(&mut self, screen_pos: egui::Pos2, ui: &egui::Ui) {
        if let Some(origin) = self.interaction.press_origin {
            let travelled = (self.screen_to_world(screen_pos) - self.screen_to_world(origin)).length();
            if travelled >= CLICK_THRESHOLD {
                self.interaction.moved_beyond_click = true;
            }
        }

        if let Some(connection) = &mut self.interaction.pending_connection {
            connection.pointer = screen_pos;
            return;
        }

        if self.interaction.dragging_node.is_some() && self.interaction.moved_beyond_click {
            let mut target = self.screen_to_world(screen_pos) + self.interaction.node_drag_offset;
            if ui.input(|i| i.modifiers.shift) {
                target = self.snap_to_grid(target);
            }
            // the graph only sees the final position, on release
            self.interaction.drag_preview = Some(Position::new(target.x, target.y));
        }
    }

    fn finish_press(&mut self, screen_pos: egui::Pos2) {
        let world = self.screen_to_world(screen_pos);
        let was_click = !self.interaction.moved_beyond_click;
        let origin_hit = self
            .interaction
            .press_origin
            .and_then(|origin| self.hit_test(self.screen_to_world(origin)));

        if let Some(connection) = self.interaction.pending_connection.take() {
            self.finalize_connection(connection, world);
        } else if let Some(node_id) = self.interaction.dragging_node {
            if was_click {
                self.on_node_click(node_id);
            } else if let Some(position) = self.interaction.drag_preview {
                self.commit_node_move(node_id, position);
            }
        } else if let Some(CanvasHit::DeleteButton(node_id)) = origin_hit {
            if was_click && self.hit_test(world) == Some(CanvasHit::DeleteButton(node_id)) {
                self.on_delete_node(node_id);
            }
        }

        self.interaction.cancel();
    }

    fn commit_node_move(&mut self, node_id: NodeId, position: Position) {
        if let Some(session) = &mut self.session {
            log::debug!("moved node {node_id} to ({}, {})", position.x, position.y);
            session.flow.graph.move_node(node_id, position);
            session.dirty = true;
        }
    }

    /// Creates the edge for a released connection drag. Releasing anywhere
    /// other than a node leaves the graph untouched.
    fn finalize_connection(&mut self, connection: PendingConnection, world_pos: egui::Pos2) {
        let Some(target) = self.find_node_at_position(world_pos) else {
            log::debug!("connection from {} dropped on empty canvas", connection.source);
            return;
        };
        let Some(session) = &mut self.session else {
            return;
        };
        if session
            .flow
            .graph
            .connect(connection.source, &connection.handle, target, INPUT_HANDLE)
            .is_some()
        {
            session.dirty = true;
        }
    }

    /// A node was clicked: configure it in the drawer.
    pub fn on_node_click(&mut self, node_id: NodeId) {
        if let Some(session) = &mut self.session {
            session.drawer.configure_existing(node_id, &session.flow.graph);
        }
    }

    /// A node's delete control was used: remove it with its edges and move
    /// the drawer off it if it was being configured.
    pub fn on_delete_node(&mut self, node_id: NodeId) {
        if let Some(session) = &mut self.session {
            if !session.flow.graph.contains_node(node_id) {
                return;
            }
            session.flow.graph.delete_node(node_id);
            session.drawer.reconcile(&session.flow.graph);
            session.dirty = true;
        }
    }

    /// Opens the drawer on its main menu. Nodes picked from it go to `anchor`,
    /// or next to the last node when `None`.
    pub fn open_drawer_at(&mut self, anchor: Option<Position>) {
        if let Some(session) = &mut self.session {
            session.drawer.close();
            session.drawer.open();
            session.drawer_anchor = anchor;
        }
    }
}
