//! Node configuration binder.
//!
//! Data flows one way. [`NodeForm::read`] builds the form from the node's
//! current data in the graph; widgets report [`FieldEdit`]s; [`apply_edit`]
//! is the single reducer that turns an edit into a shallow data merge on the
//! graph. The form is rebuilt from the graph after every change, so the form
//! can never drift from what the graph holds.

use crate::graph::FlowGraph;
use crate::registry::{FieldSpec, FieldWidget, NodeKind};
use crate::types::{NodeData, NodeId};
use serde_json::{json, Value};

/// Current value of one form field, typed by its widget.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Free text (single-line, multi-line and code widgets)
    Text(String),
    /// Non-negative integer
    Number(u64),
    /// Selected entry of a fixed list
    Choice {
        /// Current selection
        selected: String,
        /// Allowed values
        choices: &'static [&'static str],
    },
    /// Ordered option labels
    Options(Vec<String>),
}

/// A field declaration paired with its current value.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundField {
    /// Declaration from the registry
    pub spec: FieldSpec,
    /// Value read from the node's data
    pub value: FieldValue,
}

/// The configuration form of one node, as read from the graph.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeForm {
    /// Node being configured
    pub node_id: NodeId,
    /// Its kind
    pub kind: NodeKind,
    /// Fields in display order
    pub fields: Vec<BoundField>,
}

/// A single change reported by a form widget.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldEdit {
    /// Replace a text or choice field
    SetText {
        /// Field key
        key: &'static str,
        /// New value
        value: String,
    },
    /// Replace a number field
    SetNumber {
        /// Field key
        key: &'static str,
        /// New value
        value: u64,
    },
    /// Relabel an existing option of an options node
    SetOption {
        /// Position in the option list
        index: usize,
        /// New label
        value: String,
    },
    /// Append a new option to an options node
    AppendOption,
}

const OPTIONS_KEY: &str = "options";

fn read_text(data: &NodeData, key: &str) -> String {
    match data.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn read_number(data: &NodeData, key: &str) -> u64 {
    match data.get(key) {
        Some(Value::Number(n)) => n.as_u64().unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

fn read_options(data: &NodeData) -> Vec<String> {
    data.get(OPTIONS_KEY)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .map(|v| v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string()))
                .collect()
        })
        .unwrap_or_default()
}

impl NodeForm {
    /// Builds the form for `node_id` from its current data.
    ///
    /// # Returns
    ///
    /// `None` when the node does not exist, which means there is nothing to
    /// configure.
    pub fn read(graph: &FlowGraph, node_id: NodeId) -> Option<NodeForm> {
        let node = graph.node(node_id)?;
        let fields = node
            .kind
            .fields()
            .iter()
            .map(|spec| {
                let value = match spec.widget {
                    FieldWidget::SingleLine | FieldWidget::MultiLine | FieldWidget::Code => {
                        FieldValue::Text(read_text(&node.data, spec.key))
                    }
                    FieldWidget::Number => FieldValue::Number(read_number(&node.data, spec.key)),
                    FieldWidget::Choice(choices) => FieldValue::Choice {
                        selected: read_text(&node.data, spec.key),
                        choices,
                    },
                    FieldWidget::OptionList => FieldValue::Options(read_options(&node.data)),
                };
                BoundField { spec: *spec, value }
            })
            .collect();

        Some(NodeForm {
            node_id,
            kind: node.kind,
            fields,
        })
    }

    /// The bound field for `key`, if the form has one.
    pub fn field(&self, key: &str) -> Option<&BoundField> {
        self.fields.iter().find(|f| f.spec.key == key)
    }
}

fn partial(key: &str, value: Value) -> NodeData {
    let mut data = NodeData::new();
    data.insert(key.to_string(), value);
    data
}

/// Applies one form edit to the node in the graph.
///
/// Edits that do not match a field declared for the node's kind, choice
/// values outside the allowed list and out-of-range option indexes are
/// ignored.
///
/// # Returns
///
/// `true` when the graph was changed.
pub fn apply_edit(graph: &mut FlowGraph, node_id: NodeId, edit: FieldEdit) -> bool {
    let Some(node) = graph.node(node_id) else {
        return false;
    };
    let widget_for = |key: &str| {
        node.kind
            .fields()
            .iter()
            .find(|f| f.key == key)
            .map(|f| f.widget)
    };

    let update = match edit {
        FieldEdit::SetText { key, value } => match widget_for(key) {
            Some(FieldWidget::SingleLine | FieldWidget::MultiLine | FieldWidget::Code) => {
                Some(partial(key, json!(value)))
            }
            Some(FieldWidget::Choice(choices)) if choices.contains(&value.as_str()) => {
                Some(partial(key, json!(value)))
            }
            _ => None,
        },
        FieldEdit::SetNumber { key, value } => match widget_for(key) {
            Some(FieldWidget::Number) => Some(partial(key, json!(value))),
            _ => None,
        },
        FieldEdit::SetOption { index, value } => match widget_for(OPTIONS_KEY) {
            Some(FieldWidget::OptionList) => {
                let mut options = read_options(&node.data);
                if index < options.len() {
                    options[index] = value;
                    Some(partial(OPTIONS_KEY, json!(options)))
                } else {
                    None
                }
            }
            _ => None,
        },
        FieldEdit::AppendOption => match widget_for(OPTIONS_KEY) {
            Some(FieldWidget::OptionList) => {
                let mut options = read_options(&node.data);
                options.push(format!("Option {}", options.len() + 1));
                Some(partial(OPTIONS_KEY, json!(options)))
            }
            _ => None,
        },
    };

    match update {
        Some(data) => {
            graph.update_node_data(node_id, data);
            true
        }
        None => {
            log::debug!("ignoring edit that does not fit node {node_id}");
            false
        }
    }
}
