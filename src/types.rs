//! Core data types for flows.
//!
//! This module defines the persisted shapes: nodes, edges, whole flows and the
//! lightweight metadata the gallery lists. Mutation rules live on
//! [`FlowGraph`](crate::graph::FlowGraph); the types here only carry data.

use crate::graph::FlowGraph;
use crate::registry::NodeKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Unique identifier for nodes within a flow.
pub type NodeId = Uuid;

/// Unique identifier for edges within a flow.
pub type EdgeId = Uuid;

/// Unique identifier for stored flows.
pub type FlowId = Uuid;

/// Type-specific payload of a node.
pub type NodeData = Map<String, Value>;

/// A point on the canvas, in world units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal coordinate
    pub x: f32,
    /// Vertical coordinate
    pub y: f32,
}

impl Position {
    /// Creates a position from its coordinates.
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Returns this position shifted by `(dx, dy)`.
    pub fn offset(self, (dx, dy): (f32, f32)) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// A single typed node of a flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowNode {
    /// Unique identifier for this node
    pub id: NodeId,
    /// Registered kind; fixed at creation
    #[serde(rename = "type")]
    pub kind: NodeKind,
    /// Position on the canvas
    pub position: Position,
    /// Kind-specific data record
    #[serde(default)]
    pub data: NodeData,
}

impl FlowNode {
    /// Creates a node of `kind` at `position` seeded with the kind's default data.
    pub fn new(kind: NodeKind, position: Position) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            position,
            data: kind.default_data(),
        }
    }

    /// Display label, falling back to the kind's name when the data has none.
    pub fn label(&self) -> &str {
        self.data
            .get("label")
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| self.kind.display_name())
    }

    /// Adds any default key the node's kind expects but the data lacks.
    ///
    /// Returns `true` when at least one key was added.
    pub fn fill_missing_defaults(&mut self) -> bool {
        let mut changed = false;
        for (key, value) in self.kind.default_data() {
            if !self.data.contains_key(&key) {
                self.data.insert(key, value);
                changed = true;
            }
        }
        changed
    }
}

/// A directed connection from an output handle to an input handle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    /// Unique identifier for this edge
    pub id: EdgeId,
    /// Node the edge leaves from
    pub source: NodeId,
    /// Output handle on the source node
    pub source_handle: String,
    /// Node the edge enters
    pub target: NodeId,
    /// Input handle on the target node
    pub target_handle: String,
}

impl Edge {
    /// Creates a new edge with a fresh id.
    pub fn new(
        source: NodeId,
        source_handle: impl Into<String>,
        target: NodeId,
        target_handle: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            source,
            source_handle: source_handle.into(),
            target,
            target_handle: target_handle.into(),
        }
    }

    /// Returns `true` when either endpoint is `node_id`.
    pub fn touches(&self, node_id: NodeId) -> bool {
        self.source == node_id || self.target == node_id
    }
}

/// A saved flow: metadata plus its node/edge snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flow {
    /// Unique identifier for this flow
    pub id: FlowId,
    /// User-visible name
    pub name: String,
    /// Short free-form description shown in the gallery
    #[serde(default)]
    pub description: String,
    /// Time of the last save
    #[serde(default = "Utc::now")]
    pub last_modified: DateTime<Utc>,
    /// Number of nodes at the last save; informational only
    #[serde(default)]
    pub node_count: usize,
    /// Nodes and edges
    #[serde(flatten)]
    pub graph: FlowGraph,
}

impl Flow {
    /// Creates an empty flow with a fresh id.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_graph(name, FlowGraph::new())
    }

    /// Creates a flow with a fresh id around an existing graph.
    pub fn with_graph(name: impl Into<String>, graph: FlowGraph) -> Self {
        let node_count = graph.len();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: String::new(),
            last_modified: Utc::now(),
            node_count,
            graph,
        }
    }

    /// Stamps the modification time and recomputes the derived node count.
    pub fn touch(&mut self) {
        self.last_modified = Utc::now();
        self.node_count = self.graph.len();
    }

    /// Gallery metadata for this flow.
    pub fn summary(&self) -> FlowSummary {
        FlowSummary {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
            last_modified: self.last_modified,
            node_count: self.graph.len(),
        }
    }

    /// Serialize the flow to a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize a flow from a JSON string.
    ///
    /// The loaded graph is normalized so every node carries its kind's default
    /// keys and no edge dangles.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut flow: Flow = serde_json::from_str(json)?;
        flow.graph.normalize();
        flow.node_count = flow.graph.len();
        Ok(flow)
    }
}

/// Metadata-only view of a flow used by the gallery list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowSummary {
    /// Flow id
    pub id: FlowId,
    /// Flow name
    pub name: String,
    /// Flow description
    pub description: String,
    /// Time of the last save
    pub last_modified: DateTime<Utc>,
    /// Number of nodes in the flow
    pub node_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_node_creation_uses_defaults() {
        let node = FlowNode::new(NodeKind::Text, Position::new(10.0, 20.0));

        assert!(!node.id.is_nil());
        assert_eq!(node.position, Position::new(10.0, 20.0));
        assert_eq!(node.data["content"], json!(""));
        assert_eq!(node.data["delaySeconds"], json!(0));
        assert_eq!(node.label(), "Text Message");
    }

    #[test]
    fn test_label_falls_back_to_kind_name() {
        let mut node = FlowNode::new(NodeKind::Media, Position::default());
        node.data.insert("label".into(), json!("   "));
        assert_eq!(node.label(), "Media");
    }

    #[test]
    fn test_fill_missing_defaults() {
        let mut node = FlowNode::new(NodeKind::Options, Position::default());
        node.data.remove("question");
        node.data.insert("label".into(), json!("Keep me"));

        assert!(node.fill_missing_defaults());
        assert_eq!(node.data["question"], json!(""));
        assert_eq!(node.data["label"], json!("Keep me"));
        assert!(!node.fill_missing_defaults());
    }

    #[test]
    fn test_edge_serializes_camel_case() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let edge = Edge::new(a, "out", b, "in");
        let value = serde_json::to_value(&edge).unwrap();

        assert_eq!(value["sourceHandle"], json!("out"));
        assert_eq!(value["targetHandle"], json!("in"));
        assert_eq!(value["source"], json!(a.to_string()));
        assert!(edge.touches(a));
        assert!(edge.touches(b));
        assert!(!edge.touches(Uuid::new_v4()));
    }

    #[test]
    fn test_flow_serialization_shape() {
        let mut flow = Flow::new("Welcome");
        flow.graph.add_node(NodeKind::Text, Position::new(1.0, 2.0));
        flow.touch();

        let value = serde_json::to_value(&flow).unwrap();
        assert_eq!(value["name"], json!("Welcome"));
        assert_eq!(value["nodeCount"], json!(1));
        assert!(value["lastModified"].is_string());
        assert_eq!(value["nodes"][0]["type"], json!("text"));
        assert_eq!(value["nodes"][0]["position"]["x"], json!(1.0));
        assert!(value["edges"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_from_json_recomputes_node_count_and_backfills() {
        let id = Uuid::new_v4();
        let json = json!({
            "id": Uuid::new_v4(),
            "name": "Legacy",
            "nodeCount": 42,
            "nodes": [
                {"id": id, "type": "media", "position": {"x": 0.0, "y": 0.0},
                 "data": {"label": "Old media"}}
            ],
            "edges": []
        })
        .to_string();

        let flow = Flow::from_json(&json).unwrap();
        assert_eq!(flow.node_count, 1);
        let node = flow.graph.node(id).unwrap();
        assert_eq!(node.data["label"], json!("Old media"));
        assert_eq!(node.data["mediaType"], json!("image"));
        assert_eq!(node.data["caption"], json!(""));
    }

    #[test]
    fn test_unknown_node_type_is_rejected() {
        let json = json!({
            "id": Uuid::new_v4(),
            "name": "Bad",
            "nodes": [{"id": Uuid::new_v4(), "type": "fax", "position": {"x": 0.0, "y": 0.0}}],
            "edges": []
        })
        .to_string();

        assert!(Flow::from_json(&json).is_err());
    }

    #[test]
    fn test_summary_reflects_graph() {
        let mut flow = Flow::new("Summary");
        flow.description = "desc".into();
        flow.graph.add_node(NodeKind::Text, Position::default());
        flow.graph.add_node(NodeKind::Options, Position::default());

        let summary = flow.summary();
        assert_eq!(summary.id, flow.id);
        assert_eq!(summary.node_count, 2);
        assert_eq!(summary.description, "desc");
    }
}
