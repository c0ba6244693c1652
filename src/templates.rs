//! Built-in flow templates offered by the gallery.
//!
//! Templates are canned graphs rebuilt from code on every request, so an
//! instantiated flow can be edited freely without any effect on the template.

use crate::error::{FlowError, Result};
use crate::graph::FlowGraph;
use crate::registry::{option_handle, NodeKind, INPUT_HANDLE, OUTPUT_HANDLE};
use crate::types::{NodeId, Position};
use serde::Serialize;
use serde_json::{json, Value};

/// Gallery metadata for a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TemplateInfo {
    /// Stable identifier, e.g. `template-sales`
    pub id: &'static str,
    /// Human-friendly display name
    pub name: &'static str,
    /// Category label shown on the gallery card
    pub category: &'static str,
    /// One-line description
    pub description: &'static str,
}

/// A template's content: a flow without id or modification time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowTemplate {
    /// Name given to flows created from this template
    pub name: String,
    /// Description given to flows created from this template
    pub description: String,
    /// Nodes and edges
    #[serde(flatten)]
    pub graph: FlowGraph,
}

/// Returns all templates in gallery order.
pub const fn all_templates() -> &'static [TemplateInfo] {
    const TEMPLATES: &[TemplateInfo] = &[
        TemplateInfo {
            id: "template-welcome",
            name: "WhatsApp Welcome",
            category: "Onboarding",
            description: "Greets new WhatsApp contacts with a single message.",
        },
        TemplateInfo {
            id: "template-sales",
            name: "Sales Qualifier",
            category: "Sales",
            description: "Asks what the lead needs and branches to a catalogue or an agent.",
        },
        TemplateInfo {
            id: "template-support",
            name: "Telegram Support Desk",
            category: "Support",
            description: "Routes Telegram users to a how-to video or a written answer.",
        },
    ];
    TEMPLATES
}

/// Metadata for `id`, if it names a built-in template.
pub fn template_info(id: &str) -> Option<&'static TemplateInfo> {
    all_templates().iter().find(|t| t.id == id)
}

/// Builds the template content for `id`.
///
/// # Errors
///
/// [`FlowError::UnknownTemplate`] when `id` is not a built-in template.
pub fn build_template(id: &str) -> Result<FlowTemplate> {
    let info = template_info(id).ok_or_else(|| FlowError::UnknownTemplate(id.to_string()))?;
    let graph = match info.id {
        "template-welcome" => build_welcome(),
        "template-sales" => build_sales(),
        "template-support" => build_support(),
        other => return Err(FlowError::UnknownTemplate(other.to_string())),
    };
    Ok(FlowTemplate {
        name: info.name.to_string(),
        description: info.description.to_string(),
        graph,
    })
}

fn add(graph: &mut FlowGraph, kind: NodeKind, (x, y): (f32, f32), data: Value) -> NodeId {
    let id = graph.add_node(kind, Position::new(x, y));
    if let Value::Object(map) = data {
        graph.update_node_data(id, map);
    }
    id
}

fn link(graph: &mut FlowGraph, source: NodeId, handle: &str, target: NodeId) {
    let _ = graph.connect(source, handle, target, INPUT_HANDLE);
}

fn build_welcome() -> FlowGraph {
    let mut graph = FlowGraph::new();

    let entry = add(
        &mut graph,
        NodeKind::Whatsapp,
        (80.0, 160.0),
        json!({"label": "WhatsApp entry", "message": "hi"}),
    );
    let greeting = add(
        &mut graph,
        NodeKind::Text,
        (340.0, 160.0),
        json!({
            "label": "Greeting",
            "content": "Welcome! Thanks for reaching out, we'll be with you shortly.",
        }),
    );

    link(&mut graph, entry, OUTPUT_HANDLE, greeting);
    graph
}

fn build_sales() -> FlowGraph {
    let mut graph = FlowGraph::new();

    let entry = add(
        &mut graph,
        NodeKind::Whatsapp,
        (60.0, 200.0),
        json!({"label": "Inbound lead"}),
    );
    let question = add(
        &mut graph,
        NodeKind::Options,
        (320.0, 200.0),
        json!({
            "label": "Qualify",
            "question": "What are you looking for today?",
            "options": ["See the catalogue", "Talk to sales"],
        }),
    );
    let catalogue = add(
        &mut graph,
        NodeKind::Media,
        (600.0, 100.0),
        json!({
            "label": "Catalogue",
            "mediaType": "document",
            "mediaUrl": "https://example.com/catalogue.pdf",
            "caption": "Here is our latest catalogue.",
        }),
    );
    let handoff = add(
        &mut graph,
        NodeKind::Text,
        (600.0, 300.0),
        json!({
            "label": "Hand-off",
            "content": "A member of our sales team will contact you shortly.",
            "delaySeconds": 2,
        }),
    );

    link(&mut graph, entry, OUTPUT_HANDLE, question);
    link(&mut graph, question, &option_handle(0), catalogue);
    link(&mut graph, question, &option_handle(1), handoff);
    graph
}

fn build_support() -> FlowGraph {
    let mut graph = FlowGraph::new();

    let entry = add(
        &mut graph,
        NodeKind::Telegram,
        (40.0, 220.0),
        json!({"label": "Support bot"}),
    );
    let hello = add(
        &mut graph,
        NodeKind::Text,
        (280.0, 220.0),
        json!({"label": "Hello", "content": "Hi! Let's get your problem sorted."}),
    );
    let triage = add(
        &mut graph,
        NodeKind::Options,
        (520.0, 220.0),
        json!({
            "label": "Triage",
            "question": "How would you like help?",
            "options": ["Watch a video", "Read the answer"],
        }),
    );
    let video = add(
        &mut graph,
        NodeKind::Media,
        (780.0, 120.0),
        json!({
            "label": "How-to video",
            "mediaType": "video",
            "mediaUrl": "https://example.com/setup.mp4",
            "caption": "Setup walkthrough",
        }),
    );
    let answer = add(
        &mut graph,
        NodeKind::Text,
        (780.0, 320.0),
        json!({
            "label": "Written answer",
            "content": "Open Settings, choose Devices and press Reset.",
        }),
    );

    link(&mut graph, entry, OUTPUT_HANDLE, hello);
    link(&mut graph, hello, OUTPUT_HANDLE, triage);
    link(&mut graph, triage, &option_handle(0), video);
    link(&mut graph, triage, &option_handle(1), answer);
    graph
}
