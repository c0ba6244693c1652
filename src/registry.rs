//! Node type registry.
//!
//! Declares every node kind the builder knows about together with its default
//! data shape, connection handles, configuration fields, the drawer category
//! that offers it and the renderer that draws it on the canvas.

use crate::error::FlowError;
use crate::types::{NodeData, NodeId};
use eframe::egui::Color32;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;

/// Name of the single input handle every node exposes.
pub const INPUT_HANDLE: &str = "in";
/// Name of the single output handle of non-branching nodes.
pub const OUTPUT_HANDLE: &str = "out";

/// Output handle name for the option at `index` of an options node.
pub fn option_handle(index: usize) -> String {
    format!("option-{index}")
}

/// The registered node kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    /// Sends a plain text message, optionally after a delay
    Text,
    /// Asks a question and branches on the chosen button
    Options,
    /// Sends an image, video, audio clip or document
    Media,
    /// WhatsApp channel entry point
    Whatsapp,
    /// Telegram channel entry point
    Telegram,
    /// Hands the conversation to an AI agent
    AiAgent,
    /// Performs an HTTP request
    HttpRequest,
    /// Runs a code snippet
    RunCode,
}

/// Drawer menu that offers a group of node kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeCategory {
    /// Messaging channels
    Channels,
    /// Conversation building blocks
    Flow,
    /// AI helpers
    Ai,
    /// Integration primitives
    Core,
}

impl NodeCategory {
    /// All categories in menu order.
    pub const ALL: [NodeCategory; 4] = [
        NodeCategory::Channels,
        NodeCategory::Flow,
        NodeCategory::Ai,
        NodeCategory::Core,
    ];

    /// Title shown on the drawer's main menu.
    pub fn title(self) -> &'static str {
        match self {
            NodeCategory::Channels => "Channels",
            NodeCategory::Flow => "Flow",
            NodeCategory::Ai => "AI",
            NodeCategory::Core => "Core",
        }
    }

    /// One-line description shown under the title.
    pub fn blurb(self) -> &'static str {
        match self {
            NodeCategory::Channels => "Where the conversation starts",
            NodeCategory::Flow => "Messages, buttons and media",
            NodeCategory::Ai => "Let an agent take over",
            NodeCategory::Core => "Requests and custom code",
        }
    }

    /// Kinds this category offers, in menu order.
    pub fn kinds(self) -> &'static [NodeKind] {
        match self {
            NodeCategory::Channels => &[NodeKind::Whatsapp, NodeKind::Telegram],
            NodeCategory::Flow => &[NodeKind::Text, NodeKind::Options, NodeKind::Media],
            NodeCategory::Ai => &[NodeKind::AiAgent],
            NodeCategory::Core => &[NodeKind::HttpRequest, NodeKind::RunCode],
        }
    }
}

/// Widget used to edit one configuration field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldWidget {
    /// Single-line text input
    SingleLine,
    /// Multi-line text area
    MultiLine,
    /// Monospace multi-line editor
    Code,
    /// Non-negative integer input
    Number,
    /// One value out of a fixed list
    Choice(&'static [&'static str]),
    /// Ordered, append-only list of strings
    OptionList,
}

/// Declaration of one configurable field of a node kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Key inside the node's data
    pub key: &'static str,
    /// Label shown next to the widget
    pub label: &'static str,
    /// How the field is edited
    pub widget: FieldWidget,
}

const fn field(key: &'static str, label: &'static str, widget: FieldWidget) -> FieldSpec {
    FieldSpec { key, label, widget }
}

const MEDIA_TYPES: &[&str] = &["image", "video", "audio", "document"];
const HTTP_METHODS: &[&str] = &["GET", "POST", "PUT", "PATCH", "DELETE"];
const CODE_LANGUAGES: &[&str] = &["javascript", "python"];

const TEXT_FIELDS: &[FieldSpec] = &[
    field("label", "Label", FieldWidget::SingleLine),
    field("content", "Message", FieldWidget::MultiLine),
    field("delaySeconds", "Delay (seconds)", FieldWidget::Number),
];
const OPTIONS_FIELDS: &[FieldSpec] = &[
    field("label", "Label", FieldWidget::SingleLine),
    field("question", "Question", FieldWidget::MultiLine),
    field("options", "Buttons", FieldWidget::OptionList),
];
const MEDIA_FIELDS: &[FieldSpec] = &[
    field("label", "Label", FieldWidget::SingleLine),
    field("mediaType", "Media type", FieldWidget::Choice(MEDIA_TYPES)),
    field("mediaUrl", "Media URL", FieldWidget::SingleLine),
    field("caption", "Caption", FieldWidget::MultiLine),
];
const WHATSAPP_FIELDS: &[FieldSpec] = &[
    field("label", "Label", FieldWidget::SingleLine),
    field("phoneNumberId", "Phone number ID", FieldWidget::SingleLine),
    field("message", "Welcome message", FieldWidget::MultiLine),
];
const TELEGRAM_FIELDS: &[FieldSpec] = &[
    field("label", "Label", FieldWidget::SingleLine),
    field("botToken", "Bot token", FieldWidget::SingleLine),
    field("chatId", "Chat ID", FieldWidget::SingleLine),
    field("message", "Welcome message", FieldWidget::MultiLine),
];
const AI_AGENT_FIELDS: &[FieldSpec] = &[
    field("label", "Label", FieldWidget::SingleLine),
    field("model", "Model", FieldWidget::SingleLine),
    field("prompt", "System prompt", FieldWidget::MultiLine),
];
const HTTP_REQUEST_FIELDS: &[FieldSpec] = &[
    field("label", "Label", FieldWidget::SingleLine),
    field("method", "Method", FieldWidget::Choice(HTTP_METHODS)),
    field("url", "URL", FieldWidget::SingleLine),
    field("body", "Body", FieldWidget::Code),
];
const RUN_CODE_FIELDS: &[FieldSpec] = &[
    field("label", "Label", FieldWidget::SingleLine),
    field("language", "Language", FieldWidget::Choice(CODE_LANGUAGES)),
    field("code", "Code", FieldWidget::Code),
];

impl NodeKind {
    /// Every registered kind.
    pub const ALL: [NodeKind; 8] = [
        NodeKind::Text,
        NodeKind::Options,
        NodeKind::Media,
        NodeKind::Whatsapp,
        NodeKind::Telegram,
        NodeKind::AiAgent,
        NodeKind::HttpRequest,
        NodeKind::RunCode,
    ];

    /// Wire name, as used in serialized flows.
    pub fn name(self) -> &'static str {
        match self {
            NodeKind::Text => "text",
            NodeKind::Options => "options",
            NodeKind::Media => "media",
            NodeKind::Whatsapp => "whatsapp",
            NodeKind::Telegram => "telegram",
            NodeKind::AiAgent => "ai-agent",
            NodeKind::HttpRequest => "http-request",
            NodeKind::RunCode => "run-code",
        }
    }

    /// Human-friendly name.
    pub fn display_name(self) -> &'static str {
        match self {
            NodeKind::Text => "Text",
            NodeKind::Options => "Options",
            NodeKind::Media => "Media",
            NodeKind::Whatsapp => "WhatsApp",
            NodeKind::Telegram => "Telegram",
            NodeKind::AiAgent => "AI Agent",
            NodeKind::HttpRequest => "HTTP Request",
            NodeKind::RunCode => "Run Code",
        }
    }

    /// The drawer menu that offers this kind. Also the menu "back" returns to
    /// from this kind's configuration view.
    pub fn category(self) -> NodeCategory {
        match self {
            NodeKind::Whatsapp | NodeKind::Telegram => NodeCategory::Channels,
            NodeKind::Text | NodeKind::Options | NodeKind::Media => NodeCategory::Flow,
            NodeKind::AiAgent => NodeCategory::Ai,
            NodeKind::HttpRequest | NodeKind::RunCode => NodeCategory::Core,
        }
    }

    /// Data every freshly created node of this kind starts with.
    pub fn default_data(self) -> NodeData {
        let value = match self {
            NodeKind::Text => json!({"label": "Text Message", "content": "", "delaySeconds": 0}),
            NodeKind::Options => json!({
                "label": "Options",
                "question": "",
                "options": ["Option 1", "Option 2"],
            }),
            NodeKind::Media => json!({
                "label": "Media",
                "mediaType": "image",
                "mediaUrl": "",
                "caption": "",
            }),
            NodeKind::Whatsapp => json!({"label": "WhatsApp", "phoneNumberId": "", "message": ""}),
            NodeKind::Telegram => json!({
                "label": "Telegram",
                "botToken": "",
                "chatId": "",
                "message": "",
            }),
            NodeKind::AiAgent => json!({"label": "AI Agent", "model": "", "prompt": ""}),
            NodeKind::HttpRequest => json!({
                "label": "HTTP Request",
                "method": "GET",
                "url": "",
                "body": "",
            }),
            NodeKind::RunCode => json!({"label": "Run Code", "language": "javascript", "code": ""}),
        };
        match value {
            Value::Object(map) => map,
            _ => NodeData::new(),
        }
    }

    /// Configuration fields in form order.
    pub fn fields(self) -> &'static [FieldSpec] {
        match self {
            NodeKind::Text => TEXT_FIELDS,
            NodeKind::Options => OPTIONS_FIELDS,
            NodeKind::Media => MEDIA_FIELDS,
            NodeKind::Whatsapp => WHATSAPP_FIELDS,
            NodeKind::Telegram => TELEGRAM_FIELDS,
            NodeKind::AiAgent => AI_AGENT_FIELDS,
            NodeKind::HttpRequest => HTTP_REQUEST_FIELDS,
            NodeKind::RunCode => RUN_CODE_FIELDS,
        }
    }

    /// Output handles of a node of this kind carrying `data`.
    ///
    /// Options nodes expose one handle per option; every other kind has one.
    pub fn output_handles(self, data: &NodeData) -> Vec<String> {
        match self {
            NodeKind::Options => {
                let count = data
                    .get("options")
                    .and_then(Value::as_array)
                    .map_or(0, Vec::len);
                (0..count).map(option_handle).collect()
            }
            _ => vec![OUTPUT_HANDLE.to_string()],
        }
    }

    /// Input handles of a node of this kind.
    pub fn input_handles(self) -> &'static [&'static str] {
        &[INPUT_HANDLE]
    }

    /// Renderer used to draw nodes of this kind.
    pub fn renderer(self) -> &'static dyn NodeRenderer {
        match self {
            NodeKind::Text => &TextRenderer,
            NodeKind::Options => &OptionsRenderer,
            NodeKind::Media => &MediaRenderer,
            NodeKind::Whatsapp | NodeKind::Telegram => &ChannelRenderer,
            NodeKind::AiAgent | NodeKind::HttpRequest | NodeKind::RunCode => &ToolRenderer,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for NodeKind {
    type Err = FlowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| FlowError::UnknownNodeKind(s.to_string()))
    }
}

/// Read-only view handed to renderers.
#[derive(Debug, Clone, Copy)]
pub struct NodeView<'a> {
    /// Node id
    pub id: NodeId,
    /// Node kind
    pub kind: NodeKind,
    /// Node data
    pub data: &'a NodeData,
}

impl NodeView<'_> {
    /// String value of `key`, or an empty string.
    pub fn text(&self, key: &str) -> &str {
        self.data.get(key).and_then(Value::as_str).unwrap_or("")
    }
}

/// Draws the body of a node on the canvas.
///
/// Renderers only read the node. Deleting and clicking are reported by the host
/// through its own callbacks, so a renderer never mutates the graph.
pub trait NodeRenderer: Sync {
    /// Fill colour of the node header.
    fn accent(&self, view: &NodeView<'_>) -> Color32;

    /// Short lines summarising the node's configuration.
    fn summary(&self, view: &NodeView<'_>) -> Vec<String>;
}

fn preview(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return "(empty)".to_string();
    }
    let mut out: String = trimmed.chars().take(max_chars).collect();
    if trimmed.chars().count() > max_chars {
        out.push('…');
    }
    out
}

struct TextRenderer;

impl NodeRenderer for TextRenderer {
    fn accent(&self, _view: &NodeView<'_>) -> Color32 {
        Color32::from_rgb(86, 156, 214)
    }

    fn summary(&self, view: &NodeView<'_>) -> Vec<String> {
        let mut lines = vec![preview(view.text("content"), 28)];
        if let Some(delay) = view.data.get("delaySeconds").and_then(Value::as_u64) {
            if delay > 0 {
                lines.push(format!("after {delay}s"));
            }
        }
        lines
    }
}

struct OptionsRenderer;

impl NodeRenderer for OptionsRenderer {
    fn accent(&self, _view: &NodeView<'_>) -> Color32 {
        Color32::from_rgb(197, 134, 192)
    }

    fn summary(&self, view: &NodeView<'_>) -> Vec<String> {
        let mut lines = vec![preview(view.text("question"), 28)];
        if let Some(options) = view.data.get("options").and_then(Value::as_array) {
            lines.extend(
                options
                    .iter()
                    .map(|o| format!("▸ {}", preview(o.as_str().unwrap_or(""), 20))),
            );
        }
        lines
    }
}

struct MediaRenderer;

impl NodeRenderer for MediaRenderer {
    fn accent(&self, _view: &NodeView<'_>) -> Color32 {
        Color32::from_rgb(206, 145, 120)
    }

    fn summary(&self, view: &NodeView<'_>) -> Vec<String> {
        vec![
            format!("{}: {}", view.text("mediaType"), preview(view.text("mediaUrl"), 20)),
            preview(view.text("caption"), 28),
        ]
    }
}

struct ChannelRenderer;

impl NodeRenderer for ChannelRenderer {
    fn accent(&self, view: &NodeView<'_>) -> Color32 {
        match view.kind {
            NodeKind::Telegram => Color32::from_rgb(42, 171, 238),
            _ => Color32::from_rgb(37, 211, 102),
        }
    }

    fn summary(&self, view: &NodeView<'_>) -> Vec<String> {
        vec![preview(view.text("message"), 28)]
    }
}

struct ToolRenderer;

impl NodeRenderer for ToolRenderer {
    fn accent(&self, _view: &NodeView<'_>) -> Color32 {
        Color32::from_rgb(160, 160, 160)
    }

    fn summary(&self, view: &NodeView<'_>) -> Vec<String> {
        match view.kind {
            NodeKind::HttpRequest => vec![format!(
                "{} {}",
                view.text("method"),
                preview(view.text("url"), 22)
            )],
            NodeKind::RunCode => vec![view.text("language").to_string()],
            _ => vec![preview(view.text("model"), 28)],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_round_trips_through_name() {
        for kind in NodeKind::ALL {
            assert_eq!(kind.name().parse::<NodeKind>().unwrap(), kind);
            let wire = serde_json::to_value(kind).unwrap();
            assert_eq!(wire, json!(kind.name()));
        }
    }

    #[test]
    fn test_unknown_kind_name_is_an_error() {
        let err = "fax".parse::<NodeKind>().unwrap_err();
        assert!(matches!(err, FlowError::UnknownNodeKind(name) if name == "fax"));
    }

    #[test]
    fn test_every_field_has_a_default() {
        for kind in NodeKind::ALL {
            let defaults = kind.default_data();
            assert!(defaults.contains_key("label"), "{kind} lacks a label");
            for field in kind.fields() {
                assert!(
                    defaults.contains_key(field.key),
                    "{kind} has no default for {}",
                    field.key
                );
            }
        }
    }

    #[test]
    fn test_every_kind_belongs_to_its_category_menu() {
        for kind in NodeKind::ALL {
            assert!(kind.category().kinds().contains(&kind));
        }
        let listed: usize = NodeCategory::ALL.iter().map(|c| c.kinds().len()).sum();
        assert_eq!(listed, NodeKind::ALL.len());
    }

    #[test]
    fn test_options_node_has_one_handle_per_option() {
        let mut data = NodeKind::Options.default_data();
        assert_eq!(
            NodeKind::Options.output_handles(&data),
            vec!["option-0".to_string(), "option-1".to_string()]
        );

        data.insert("options".into(), json!(["a", "b", "c"]));
        assert_eq!(NodeKind::Options.output_handles(&data).len(), 3);
        assert_eq!(
            NodeKind::Text.output_handles(&NodeKind::Text.default_data()),
            vec![OUTPUT_HANDLE.to_string()]
        );
    }

    #[test]
    fn test_renderer_summaries() {
        let mut data = NodeKind::Text.default_data();
        data.insert("content".into(), json!("Hola"));
        data.insert("delaySeconds".into(), json!(3));
        let view = NodeView {
            id: uuid::Uuid::new_v4(),
            kind: NodeKind::Text,
            data: &data,
        };
        assert_eq!(
            NodeKind::Text.renderer().summary(&view),
            vec!["Hola".to_string(), "after 3s".to_string()]
        );

        let options = NodeKind::Options.default_data();
        let view = NodeView {
            id: uuid::Uuid::new_v4(),
            kind: NodeKind::Options,
            data: &options,
        };
        let lines = NodeKind::Options.renderer().summary(&view);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "(empty)");
    }

    #[test]
    fn test_preview_truncates() {
        assert_eq!(preview("abcdef", 3), "abc…");
        assert_eq!(preview("  ", 3), "(empty)");
        assert_eq!(preview("ab", 3), "ab");
    }
}
