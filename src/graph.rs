//! The graph store: nodes and edges of one flow plus the operations that
//! mutate them.
//!
//! Every mutation keeps two invariants:
//! - no edge references a node that is not in the graph, and
//! - at most one edge leaves any `(source, source_handle)` pair.
//!
//! Rejected operations are no-ops rather than errors; the caller re-reads the
//! graph after each call and sees the result.

use crate::constants::NEW_NODE_OFFSET;
use crate::registry::NodeKind;
use crate::types::{Edge, EdgeId, FlowNode, NodeData, NodeId, Position};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Nodes and edges of a single flow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowGraph {
    nodes: Vec<FlowNode>,
    edges: Vec<Edge>,
}

impl FlowGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// All nodes, in creation order.
    pub fn nodes(&self) -> &[FlowNode] {
        &self.nodes
    }

    /// All edges, in creation order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` when the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Looks up a node by id.
    pub fn node(&self, id: NodeId) -> Option<&FlowNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Returns `true` when a node with `id` exists.
    pub fn contains_node(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    /// The edge leaving `(source, handle)`, if any.
    pub fn edge_from(&self, source: NodeId, handle: &str) -> Option<&Edge> {
        self.edges
            .iter()
            .find(|e| e.source == source && e.source_handle == handle)
    }

    /// Edges with `node_id` as source or target.
    pub fn edges_touching(&self, node_id: NodeId) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(move |e| e.touches(node_id))
    }

    /// Output handles of the node, derived from its kind and current data.
    pub fn output_handles(&self, id: NodeId) -> Vec<String> {
        self.node(id)
            .map(|n| n.kind.output_handles(&n.data))
            .unwrap_or_default()
    }

    /// Where a node should go when the caller has no point in mind: a fixed
    /// offset from the most recently added node, or the origin.
    pub fn next_node_position(&self) -> Position {
        self.nodes
            .last()
            .map(|n| n.position.offset(NEW_NODE_OFFSET))
            .unwrap_or_default()
    }

    /// Adds a node of `kind` with the kind's default data.
    ///
    /// # Returns
    ///
    /// The id of the new node.
    pub fn add_node(&mut self, kind: NodeKind, position: Position) -> NodeId {
        let node = FlowNode::new(kind, position);
        let id = node.id;
        log::debug!("adding {kind} node {id} at ({}, {})", position.x, position.y);
        self.nodes.push(node);
        id
    }

    /// Adds a node by its wire name.
    ///
    /// # Panics
    ///
    /// Panics when `kind` is not a registered node type. Callers are expected
    /// to pass names taken from the registry.
    pub fn add_node_named(&mut self, kind: &str, position: Position) -> NodeId {
        match kind.parse::<NodeKind>() {
            Ok(kind) => self.add_node(kind, position),
            Err(err) => panic!("add_node_named: {err}"),
        }
    }

    /// Removes a node and every edge touching it.
    ///
    /// Deleting a node that does not exist does nothing.
    pub fn delete_node(&mut self, id: NodeId) {
        let before = self.nodes.len();
        self.nodes.retain(|n| n.id != id);
        if self.nodes.len() != before {
            let dropped = self.edges_touching(id).count();
            self.edges.retain(|e| !e.touches(id));
            log::debug!("deleted node {id} and {dropped} edges");
        }
    }

    /// Removes a single edge. Deleting an unknown edge does nothing.
    pub fn delete_edge(&mut self, id: EdgeId) {
        self.edges.retain(|e| e.id != id);
    }

    /// Connects `source`'s output handle to `target`'s input handle.
    ///
    /// Self-loops and connections to or from missing nodes are rejected. An
    /// existing edge from the same `(source, source_handle)` is replaced.
    ///
    /// # Returns
    ///
    /// The id of the new edge, or `None` when the connection was rejected.
    pub fn connect(
        &mut self,
        source: NodeId,
        source_handle: &str,
        target: NodeId,
        target_handle: &str,
    ) -> Option<EdgeId> {
        if source == target {
            log::debug!("rejecting self-loop on {source}");
            return None;
        }
        if !self.contains_node(source) || !self.contains_node(target) {
            log::debug!("rejecting edge {source} -> {target}: missing endpoint");
            return None;
        }

        self.edges
            .retain(|e| !(e.source == source && e.source_handle == source_handle));
        let edge = Edge::new(source, source_handle, target, target_handle);
        let id = edge.id;
        self.edges.push(edge);
        Some(id)
    }

    /// Shallow-merges `partial` into the node's data.
    ///
    /// Keys in `partial` overwrite existing ones; keys absent from `partial`
    /// are kept. Unknown nodes are ignored.
    pub fn update_node_data(&mut self, id: NodeId, partial: NodeData) {
        if let Some(node) = self.nodes.iter_mut().find(|n| n.id == id) {
            for (key, value) in partial {
                node.data.insert(key, value);
            }
        }
    }

    /// Moves a node. Data and edges are untouched.
    pub fn move_node(&mut self, id: NodeId, position: Position) {
        if let Some(node) = self.nodes.iter_mut().find(|n| n.id == id) {
            node.position = position;
        }
    }

    /// Deep copy with fresh ids for every node and edge.
    ///
    /// Edge endpoints are remapped to the new node ids, so the copy is fully
    /// independent of `self`.
    pub fn with_fresh_ids(&self) -> FlowGraph {
        let remap: HashMap<NodeId, NodeId> =
            self.nodes.iter().map(|n| (n.id, Uuid::new_v4())).collect();

        let nodes = self
            .nodes
            .iter()
            .map(|n| FlowNode {
                id: remap[&n.id],
                ..n.clone()
            })
            .collect();

        let edges = self
            .edges
            .iter()
            .filter_map(|e| {
                Some(Edge {
                    id: Uuid::new_v4(),
                    source: *remap.get(&e.source)?,
                    source_handle: e.source_handle.clone(),
                    target: *remap.get(&e.target)?,
                    target_handle: e.target_handle.clone(),
                })
            })
            .collect();

        FlowGraph { nodes, edges }
    }

    /// Restores the graph invariants on data loaded from outside.
    ///
    /// Missing default keys are filled in, duplicate node ids are dropped,
    /// dangling edges and self-loops are removed, and when several edges leave
    /// the same handle only the last one is kept.
    pub fn normalize(&mut self) {
        let mut seen = HashSet::new();
        self.nodes.retain(|n| seen.insert(n.id));
        for node in &mut self.nodes {
            node.fill_missing_defaults();
        }

        let ids: HashSet<NodeId> = self.nodes.iter().map(|n| n.id).collect();
        let mut claimed: HashSet<(NodeId, String)> = HashSet::new();
        let mut kept: Vec<Edge> = Vec::with_capacity(self.edges.len());
        for edge in self.edges.drain(..).rev() {
            let valid = edge.source != edge.target
                && ids.contains(&edge.source)
                && ids.contains(&edge.target);
            if valid && claimed.insert((edge.source, edge.source_handle.clone())) {
                kept.push(edge);
            }
        }
        kept.reverse();
        self.edges = kept;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{INPUT_HANDLE, OUTPUT_HANDLE};
    use serde_json::json;

    fn data(value: serde_json::Value) -> NodeData {
        match value {
            serde_json::Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn test_add_node_uses_kind_defaults() {
        let mut graph = FlowGraph::new();
        let id = graph.add_node(NodeKind::Options, Position::new(5.0, 6.0));

        let node = graph.node(id).unwrap();
        assert_eq!(node.kind, NodeKind::Options);
        assert_eq!(node.position, Position::new(5.0, 6.0));
        assert_eq!(node.data, NodeKind::Options.default_data());
    }

    #[test]
    #[should_panic(expected = "unknown node type")]
    fn test_add_node_named_panics_on_unknown_type() {
        let mut graph = FlowGraph::new();
        graph.add_node_named("carrier-pigeon", Position::default());
    }

    #[test]
    fn test_add_node_named_accepts_registered_type() {
        let mut graph = FlowGraph::new();
        let id = graph.add_node_named("http-request", Position::default());
        assert_eq!(graph.node(id).unwrap().kind, NodeKind::HttpRequest);
    }

    #[test]
    fn test_next_node_position_offsets_last_node() {
        let mut graph = FlowGraph::new();
        assert_eq!(graph.next_node_position(), Position::default());

        graph.add_node(NodeKind::Text, Position::new(100.0, 100.0));
        assert_eq!(
            graph.next_node_position(),
            Position::new(100.0 + NEW_NODE_OFFSET.0, 100.0 + NEW_NODE_OFFSET.1)
        );
    }

    #[test]
    fn test_delete_node_removes_touching_edges() {
        let mut graph = FlowGraph::new();
        let a = graph.add_node(NodeKind::Text, Position::default());
        let b = graph.add_node(NodeKind::Text, Position::default());
        let c = graph.add_node(NodeKind::Text, Position::default());
        graph.connect(a, OUTPUT_HANDLE, b, INPUT_HANDLE).unwrap();
        graph.connect(b, OUTPUT_HANDLE, c, INPUT_HANDLE).unwrap();
        graph.connect(c, OUTPUT_HANDLE, a, INPUT_HANDLE).unwrap();

        graph.delete_node(b);

        assert_eq!(graph.len(), 2);
        assert_eq!(graph.edges().len(), 1);
        assert!(graph.edges().iter().all(|e| !e.touches(b)));
    }

    #[test]
    fn test_delete_node_is_idempotent() {
        let mut graph = FlowGraph::new();
        let a = graph.add_node(NodeKind::Text, Position::default());
        graph.delete_node(a);
        let snapshot = graph.clone();

        graph.delete_node(a);
        graph.delete_node(Uuid::new_v4());
        assert_eq!(graph, snapshot);
    }

    #[test]
    fn test_connect_rejects_self_loop() {
        let mut graph = FlowGraph::new();
        let a = graph.add_node(NodeKind::Text, Position::default());

        assert!(graph.connect(a, OUTPUT_HANDLE, a, INPUT_HANDLE).is_none());
        assert!(graph.edges().is_empty());
    }

    #[test]
    fn test_connect_rejects_missing_endpoints() {
        let mut graph = FlowGraph::new();
        let a = graph.add_node(NodeKind::Text, Position::default());
        let ghost = Uuid::new_v4();

        assert!(graph.connect(a, OUTPUT_HANDLE, ghost, INPUT_HANDLE).is_none());
        assert!(graph.connect(ghost, OUTPUT_HANDLE, a, INPUT_HANDLE).is_none());
        assert!(graph.edges().is_empty());
    }

    #[test]
    fn test_connect_replaces_edge_from_same_handle() {
        let mut graph = FlowGraph::new();
        let a = graph.add_node(NodeKind::Text, Position::default());
        let b = graph.add_node(NodeKind::Text, Position::default());
        let c = graph.add_node(NodeKind::Text, Position::default());

        let first = graph.connect(a, OUTPUT_HANDLE, b, INPUT_HANDLE).unwrap();
        let second = graph.connect(a, OUTPUT_HANDLE, c, INPUT_HANDLE).unwrap();

        assert_ne!(first, second);
        assert_eq!(graph.edges().len(), 1);
        let edge = graph.edge_from(a, OUTPUT_HANDLE).unwrap();
        assert_eq!(edge.id, second);
        assert_eq!(edge.target, c);
    }

    #[test]
    fn test_options_handles_connect_independently() {
        let mut graph = FlowGraph::new();
        let q = graph.add_node(NodeKind::Options, Position::default());
        let yes = graph.add_node(NodeKind::Text, Position::default());
        let no = graph.add_node(NodeKind::Text, Position::default());

        graph.connect(q, "option-0", yes, INPUT_HANDLE).unwrap();
        graph.connect(q, "option-1", no, INPUT_HANDLE).unwrap();

        assert_eq!(graph.edges().len(), 2);
        assert_eq!(graph.edge_from(q, "option-0").unwrap().target, yes);
        assert_eq!(graph.edge_from(q, "option-1").unwrap().target, no);
        assert_eq!(graph.output_handles(q), vec!["option-0", "option-1"]);
    }

    #[test]
    fn test_update_node_data_merges_shallowly() {
        let mut graph = FlowGraph::new();
        let id = graph.add_node(NodeKind::Text, Position::default());

        graph.update_node_data(id, data(json!({"content": "Hola"})));
        graph.update_node_data(id, data(json!({"delaySeconds": 2})));

        let node = graph.node(id).unwrap();
        assert_eq!(node.data["content"], json!("Hola"));
        assert_eq!(node.data["delaySeconds"], json!(2));
        assert_eq!(node.data["label"], json!("Text Message"));
    }

    #[test]
    fn test_update_unknown_node_is_noop() {
        let mut graph = FlowGraph::new();
        graph.add_node(NodeKind::Text, Position::default());
        let snapshot = graph.clone();

        graph.update_node_data(Uuid::new_v4(), data(json!({"content": "x"})));
        assert_eq!(graph, snapshot);
    }

    #[test]
    fn test_move_node_touches_only_position() {
        let mut graph = FlowGraph::new();
        let a = graph.add_node(NodeKind::Text, Position::default());
        let b = graph.add_node(NodeKind::Text, Position::default());
        graph.connect(a, OUTPUT_HANDLE, b, INPUT_HANDLE).unwrap();
        let data_before = graph.node(a).unwrap().data.clone();
        let edges_before = graph.edges().to_vec();

        graph.move_node(a, Position::new(42.0, -3.0));

        assert_eq!(graph.node(a).unwrap().position, Position::new(42.0, -3.0));
        assert_eq!(graph.node(a).unwrap().data, data_before);
        assert_eq!(graph.edges(), edges_before.as_slice());
    }

    #[test]
    fn test_delete_edge() {
        let mut graph = FlowGraph::new();
        let a = graph.add_node(NodeKind::Text, Position::default());
        let b = graph.add_node(NodeKind::Text, Position::default());
        let edge = graph.connect(a, OUTPUT_HANDLE, b, INPUT_HANDLE).unwrap();

        graph.delete_edge(edge);
        graph.delete_edge(edge);
        assert!(graph.edges().is_empty());
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn test_with_fresh_ids_remaps_edges() {
        let mut graph = FlowGraph::new();
        let a = graph.add_node(NodeKind::Options, Position::new(1.0, 1.0));
        let b = graph.add_node(NodeKind::Text, Position::new(2.0, 2.0));
        graph.connect(a, "option-1", b, INPUT_HANDLE).unwrap();

        let copy = graph.with_fresh_ids();

        assert_eq!(copy.len(), 2);
        assert!(copy.nodes().iter().all(|n| !graph.contains_node(n.id)));
        let edge = &copy.edges()[0];
        assert_ne!(edge.id, graph.edges()[0].id);
        let source = copy.node(edge.source).unwrap();
        let target = copy.node(edge.target).unwrap();
        assert_eq!(source.kind, NodeKind::Options);
        assert_eq!(source.position, Position::new(1.0, 1.0));
        assert_eq!(target.kind, NodeKind::Text);
        assert_eq!(edge.source_handle, "option-1");
    }

    #[test]
    fn test_normalize_repairs_loaded_graph() {
        let a = FlowNode::new(NodeKind::Text, Position::default());
        let b = FlowNode::new(NodeKind::Text, Position::default());
        let mut stripped = FlowNode::new(NodeKind::Media, Position::default());
        stripped.data.clear();
        let ghost = Uuid::new_v4();

        let mut graph = FlowGraph {
            nodes: vec![a.clone(), b.clone(), a.clone(), stripped.clone()],
            edges: vec![
                Edge::new(a.id, OUTPUT_HANDLE, b.id, INPUT_HANDLE),
                Edge::new(a.id, OUTPUT_HANDLE, stripped.id, INPUT_HANDLE),
                Edge::new(b.id, OUTPUT_HANDLE, ghost, INPUT_HANDLE),
                Edge::new(b.id, OUTPUT_HANDLE, b.id, INPUT_HANDLE),
            ],
        };

        graph.normalize();

        assert_eq!(graph.len(), 3);
        assert_eq!(graph.edges().len(), 1);
        assert_eq!(graph.edge_from(a.id, OUTPUT_HANDLE).unwrap().target, stripped.id);
        assert_eq!(
            graph.node(stripped.id).unwrap().data,
            NodeKind::Media.default_data()
        );
    }
}
