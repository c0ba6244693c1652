//! Canvas rendering for the grid, edges and nodes.
//!
//! Elements are painted in layers: grid, then edges, then the connection
//! preview, then nodes. Node bodies are described by the kind's
//! [`NodeRenderer`](crate::registry::NodeRenderer); this module only lays
//! them out.

use super::canvas::{delete_button_rect, input_handle_pos, output_handle_pos};
use super::state::FlowBuilderApp;
use crate::constants::{GRID_SIZE, HANDLE_RADIUS};
use crate::graph::FlowGraph;
use crate::registry::NodeView;
use crate::types::{Edge, FlowNode};
use eframe::egui;
use eframe::epaint::{CubicBezierShape, StrokeKind};

const EDGE_COLOR: egui::Color32 = egui::Color32::from_rgb(140, 150, 170);
const PREVIEW_COLOR: egui::Color32 = egui::Color32::from_rgb(100, 150, 255);
const SELECTED_COLOR: egui::Color32 = egui::Color32::from_rgb(255, 200, 60);
const HEADER_HEIGHT: f32 = 24.0;

impl FlowBuilderApp {
    /// Renders every element of the open flow on the canvas.
    pub fn render_flow_elements(&self, painter: &egui::Painter, canvas_rect: egui::Rect) {
        if self.config.show_grid {
            self.draw_grid(painter, canvas_rect);
        }
        let Some(session) = &self.session else {
            return;
        };
        let graph = &session.flow.graph;

        for edge in graph.edges() {
            self.draw_edge(painter, graph, edge);
        }

        if let Some(connection) = &self.interaction.pending_connection {
            if let Some(node) = graph.node(connection.source) {
                let handles = node.kind.output_handles(&node.data);
                let index = handles
                    .iter()
                    .position(|h| *h == connection.handle)
                    .unwrap_or(0);
                let rect = self.displayed_node_rect(node);
                let from = self.world_to_screen(output_handle_pos(rect, index, handles.len()));
                self.draw_curve(painter, from, connection.pointer, PREVIEW_COLOR);
                painter.circle_filled(connection.pointer, 4.0, PREVIEW_COLOR);
            }
        }

        let selected = session.drawer.selected_node_id();
        for node in graph.nodes() {
            self.draw_node(painter, node, selected == Some(node.id));
        }
    }

    /// Draws a zoom-aware background grid every [`GRID_SIZE`] world units.
    pub fn draw_grid(&self, painter: &egui::Painter, canvas_rect: egui::Rect) {
        let screen_grid = GRID_SIZE * self.canvas.zoom_factor;
        if screen_grid < 4.0 {
            return;
        }
        let color = if self.config.dark_mode {
            egui::Color32::from_rgba_unmultiplied(128, 128, 128, 32)
        } else {
            egui::Color32::from_rgba_unmultiplied(60, 60, 60, 28)
        };
        let stroke = egui::Stroke::new(1.0, color);

        let top_left = self.screen_to_world(canvas_rect.min);
        let bottom_right = self.screen_to_world(canvas_rect.max);

        let mut x = (top_left.x / GRID_SIZE).floor() * GRID_SIZE;
        while x <= bottom_right.x {
            let sx = self.world_to_screen(egui::pos2(x, 0.0)).x;
            painter.line_segment(
                [egui::pos2(sx, canvas_rect.min.y), egui::pos2(sx, canvas_rect.max.y)],
                stroke,
            );
            x += GRID_SIZE;
        }

        let mut y = (top_left.y / GRID_SIZE).floor() * GRID_SIZE;
        while y <= bottom_right.y {
            let sy = self.world_to_screen(egui::pos2(0.0, y)).y;
            painter.line_segment(
                [egui::pos2(canvas_rect.min.x, sy), egui::pos2(canvas_rect.max.x, sy)],
                stroke,
            );
            y += GRID_SIZE;
        }
    }

    fn draw_edge(&self, painter: &egui::Painter, graph: &FlowGraph, edge: &Edge) {
        let (Some(source), Some(target)) = (graph.node(edge.source), graph.node(edge.target))
        else {
            return;
        };
        let handles = source.kind.output_handles(&source.data);
        // an edge whose option was relabelled away still renders from the first slot
        let index = handles
            .iter()
            .position(|h| *h == edge.source_handle)
            .unwrap_or(0);
        let from = self.world_to_screen(output_handle_pos(
            self.displayed_node_rect(source),
            index,
            handles.len().max(1),
        ));
        let to = self.world_to_screen(input_handle_pos(self.displayed_node_rect(target)));
        self.draw_curve(painter, from, to, EDGE_COLOR);
    }

    fn draw_curve(
        &self,
        painter: &egui::Painter,
        from: egui::Pos2,
        to: egui::Pos2,
        color: egui::Color32,
    ) {
        let bend = ((to.x - from.x).abs() * 0.5).max(40.0 * self.canvas.zoom_factor);
        let curve = CubicBezierShape::from_points_stroke(
            [
                from,
                from + egui::vec2(bend, 0.0),
                to - egui::vec2(bend, 0.0),
                to,
            ],
            false,
            egui::Color32::TRANSPARENT,
            egui::Stroke::new(2.0, color),
        );
        painter.add(curve);
    }

    /// Renders a single node: header with the kind's accent colour, summary
    /// lines, handles and the delete button.
    pub fn draw_node(&self, painter: &egui::Painter, node: &FlowNode, selected: bool) {
        let zoom = self.canvas.zoom_factor;
        let world_rect = self.displayed_node_rect(node);
        let rect = egui::Rect::from_min_max(
            self.world_to_screen(world_rect.min),
            self.world_to_screen(world_rect.max),
        );

        let view = NodeView {
            id: node.id,
            kind: node.kind,
            data: &node.data,
        };
        let renderer = node.kind.renderer();
        let accent = renderer.accent(&view);
        let (body, text_color) = if self.config.dark_mode {
            (egui::Color32::from_gray(42), egui::Color32::from_gray(220))
        } else {
            (egui::Color32::from_gray(248), egui::Color32::from_gray(30))
        };

        painter.rect_filled(rect, 6.0 * zoom, body);
        let header = egui::Rect::from_min_size(rect.min, egui::vec2(rect.width(), HEADER_HEIGHT * zoom));
        painter.rect_filled(
            header,
            egui::CornerRadius {
                nw: (6.0 * zoom) as u8,
                ne: (6.0 * zoom) as u8,
                sw: 0,
                se: 0,
            },
            accent,
        );

        let (stroke_color, stroke_width) = if selected {
            (SELECTED_COLOR, 3.0)
        } else if Some(node.id) == self.interaction.dragging_node {
            (accent, 2.5)
        } else {
            (egui::Color32::from_gray(90), 1.0)
        };
        painter.rect_stroke(
            rect,
            6.0 * zoom,
            egui::Stroke::new(stroke_width, stroke_color),
            StrokeKind::Outside,
        );

        let title_font = egui::FontId::proportional((13.0 * zoom).clamp(7.0, 40.0));
        painter.text(
            header.left_center() + egui::vec2(8.0 * zoom, 0.0),
            egui::Align2::LEFT_CENTER,
            node.label(),
            title_font,
            egui::Color32::WHITE,
        );

        let body_font = egui::FontId::proportional((11.0 * zoom).clamp(6.0, 32.0));
        let line_height = 14.0 * zoom;
        let mut line_pos = egui::pos2(rect.left() + 8.0 * zoom, header.bottom() + 6.0 * zoom);
        for line in renderer.summary(&view) {
            if line_pos.y + line_height > rect.bottom() {
                break;
            }
            painter.text(
                line_pos,
                egui::Align2::LEFT_TOP,
                line,
                body_font.clone(),
                text_color,
            );
            line_pos.y += line_height;
        }

        self.draw_handles(painter, node, world_rect, accent);
        self.draw_delete_button(painter, world_rect);
    }

    fn draw_handles(
        &self,
        painter: &egui::Painter,
        node: &FlowNode,
        world_rect: egui::Rect,
        accent: egui::Color32,
    ) {
        let radius = HANDLE_RADIUS * self.canvas.zoom_factor;
        let outline = egui::Stroke::new(1.5, egui::Color32::from_gray(30));

        if !node.kind.input_handles().is_empty() {
            let pos = self.world_to_screen(input_handle_pos(world_rect));
            painter.circle(pos, radius, egui::Color32::from_gray(200), outline);
        }

        let handles = node.kind.output_handles(&node.data);
        for index in 0..handles.len() {
            let pos = self.world_to_screen(output_handle_pos(world_rect, index, handles.len()));
            painter.circle(pos, radius, accent, outline);
        }
    }

    fn draw_delete_button(&self, painter: &egui::Painter, world_rect: egui::Rect) {
        let button = delete_button_rect(world_rect);
        let rect = egui::Rect::from_min_max(
            self.world_to_screen(button.min),
            self.world_to_screen(button.max),
        );
        painter.rect_filled(rect, 3.0, egui::Color32::from_rgba_unmultiplied(0, 0, 0, 60));
        painter.text(
            rect.center(),
            egui::Align2::CENTER_CENTER,
            "×",
            egui::FontId::proportional((12.0 * self.canvas.zoom_factor).clamp(6.0, 30.0)),
            egui::Color32::WHITE,
        );
    }
}
