//! Drawer navigation state machine.
//!
//! The drawer is the side panel that drives node creation and configuration.
//! Its view is a tagged union: the configuring variant carries the id of the
//! node being configured, so a configuration view without a selected node
//! cannot be represented.
//!
//! ```text
//! Main ──choose_menu──▶ Channels | Flow | Ai | Core
//!   ▲                        │
//!   └─────────back───────────┤
//!                            │ pick_kind (creates the node)
//!                            ▼
//!                Configuring { kind, node_id } ──back──▶ kind's menu
//! ```
//!
//! Clicking a node on the canvas jumps straight to `Configuring`; closing the
//! drawer always lands back on `Main` with nothing selected.

use crate::graph::FlowGraph;
use crate::registry::{NodeCategory, NodeKind};
use crate::types::{NodeId, Position};

/// The screen the drawer currently shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrawerView {
    /// Top-level category list
    #[default]
    Main,
    /// A category's list of node kinds
    Menu(NodeCategory),
    /// Configuration form of one node
    Configuring {
        /// Kind of the configured node
        kind: NodeKind,
        /// The configured node
        node_id: NodeId,
    },
}

impl DrawerView {
    /// The view "back" leads to: one level up.
    pub fn parent(self) -> DrawerView {
        match self {
            DrawerView::Main | DrawerView::Menu(_) => DrawerView::Main,
            DrawerView::Configuring { kind, .. } => DrawerView::Menu(kind.category()),
        }
    }

    /// Stable name of the view, e.g. `flow` or `configuring-text`.
    pub fn name(self) -> String {
        match self {
            DrawerView::Main => "main".to_string(),
            DrawerView::Menu(category) => category.title().to_lowercase(),
            DrawerView::Configuring { kind, .. } => format!("configuring-{}", kind.name()),
        }
    }
}

/// Drawer open/closed flag plus its current view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Drawer {
    open: bool,
    view: DrawerView,
}

impl Drawer {
    /// A closed drawer on the main view.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the drawer is visible.
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Current view.
    pub fn view(&self) -> DrawerView {
        self.view
    }

    /// The node being configured, if any.
    pub fn selected_node_id(&self) -> Option<NodeId> {
        match self.view {
            DrawerView::Configuring { node_id, .. } => Some(node_id),
            _ => None,
        }
    }

    /// Opens the drawer. A drawer opened with nothing selected starts on the
    /// main menu; an already-open drawer keeps its view.
    pub fn open(&mut self) {
        if !self.open {
            self.open = true;
            self.view = DrawerView::Main;
        }
    }

    /// Closes the drawer, returning to the main view with no selection.
    pub fn close(&mut self) {
        self.open = false;
        self.view = DrawerView::Main;
    }

    /// Enters a category menu. Only valid from the main view.
    pub fn choose_menu(&mut self, category: NodeCategory) {
        if self.view == DrawerView::Main {
            self.open = true;
            self.view = DrawerView::Menu(category);
        }
    }

    /// Creates a node of `kind` and starts configuring it.
    ///
    /// Only valid while the menu offering `kind` is shown. `position` is where
    /// the node goes; `None` places it next to the last node.
    ///
    /// # Returns
    ///
    /// The new node's id, or `None` when `kind` is not offered by the
    /// current view (nothing is created in that case).
    pub fn pick_kind(
        &mut self,
        kind: NodeKind,
        graph: &mut FlowGraph,
        position: Option<Position>,
    ) -> Option<NodeId> {
        if self.view != DrawerView::Menu(kind.category()) {
            log::debug!("{kind} is not offered from the {} view", self.view.name());
            return None;
        }
        let position = position.unwrap_or_else(|| graph.next_node_position());
        let node_id = graph.add_node(kind, position);
        self.view = DrawerView::Configuring { kind, node_id };
        Some(node_id)
    }

    /// Goes one level up: configuring returns to the menu that spawned it,
    /// a menu returns to main.
    pub fn back(&mut self) {
        self.view = self.view.parent();
    }

    /// Configures an existing node directly, bypassing the menus.
    ///
    /// Unknown ids are ignored.
    pub fn configure_existing(&mut self, node_id: NodeId, graph: &FlowGraph) {
        if let Some(node) = graph.node(node_id) {
            self.open = true;
            self.view = DrawerView::Configuring {
                kind: node.kind,
                node_id,
            };
        }
    }

    /// Falls back to the parent menu when the configured node has vanished.
    ///
    /// Returns `true` when the view changed.
    pub fn reconcile(&mut self, graph: &FlowGraph) -> bool {
        match self.view {
            DrawerView::Configuring { node_id, .. } if !graph.contains_node(node_id) => {
                log::debug!("configured node {node_id} is gone, leaving configuration view");
                self.view = self.view.parent();
                true
            }
            _ => false,
        }
    }

    /// Titles from the top of the hierarchy down to the current view.
    pub fn breadcrumb(&self) -> Vec<&'static str> {
        let mut crumbs = vec!["Add node"];
        match self.view {
            DrawerView::Main => {}
            DrawerView::Menu(category) => crumbs.push(category.title()),
            DrawerView::Configuring { kind, .. } => {
                crumbs.push(kind.category().title());
                crumbs.push(kind.display_name());
            }
        }
        crumbs
    }
}
