//! The flow gallery: listing, creating, duplicating, deleting and
//! instantiating flows on top of a [`FlowStore`].

use crate::constants::DUPLICATE_SUFFIX;
use crate::error::{FlowError, Result};
use crate::storage::FlowStore;
use crate::templates::{self, TemplateInfo};
use crate::types::{Flow, FlowId, FlowSummary};

/// Proof that the user confirmed deleting a flow.
///
/// Only [`FlowGallery::request_delete`] creates one, and
/// [`FlowGallery::confirm_delete`] consumes it.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "the flow is only deleted once the request is confirmed"]
pub struct PendingDelete {
    id: FlowId,
    name: String,
}

impl PendingDelete {
    /// Id of the flow awaiting deletion.
    pub fn id(&self) -> FlowId {
        self.id
    }

    /// Name of the flow, for the confirmation prompt.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Saved flows and templates, backed by a storage implementation.
#[derive(Debug)]
pub struct FlowGallery<S> {
    store: S,
}

impl<S: FlowStore> FlowGallery<S> {
    /// Wraps a storage backend.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Metadata of every saved flow, most recently modified first.
    pub fn list_flows(&self) -> Result<Vec<FlowSummary>> {
        let mut flows = self.store.list()?;
        flows.sort_by(|a, b| {
            b.last_modified
                .cmp(&a.last_modified)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(flows)
    }

    /// Built-in templates.
    pub fn templates(&self) -> &'static [TemplateInfo] {
        templates::all_templates()
    }

    /// Creates and stores an empty flow.
    pub fn create_new(&mut self, name: impl Into<String>) -> Result<Flow> {
        let mut flow = Flow::new(name);
        self.save_flow(&mut flow)?;
        log::info!("created flow {} ({})", flow.name, flow.id);
        Ok(flow)
    }

    /// Loads a flow for editing.
    pub fn open_flow(&self, id: FlowId) -> Result<Flow> {
        self.store.load(id)
    }

    /// Stores `flow` as a full replacement of its previous snapshot.
    ///
    /// The modification time is stamped and the node count recomputed.
    pub fn save_flow(&mut self, flow: &mut Flow) -> Result<()> {
        flow.touch();
        self.store.save(flow)?;
        log::debug!("saved flow {} with {} nodes", flow.id, flow.node_count);
        Ok(())
    }

    /// Renames a stored flow.
    pub fn rename_flow(&mut self, id: FlowId, name: impl Into<String>) -> Result<Flow> {
        let mut flow = self.store.load(id)?;
        flow.name = name.into();
        self.save_flow(&mut flow)?;
        Ok(flow)
    }

    /// Stores an independent copy of a flow.
    ///
    /// The copy gets a new flow id and new ids for every node and edge, with
    /// edge endpoints remapped to the new node ids.
    pub fn duplicate_flow(&mut self, id: FlowId) -> Result<Flow> {
        let original = self.store.load(id)?;
        let mut copy = Flow::with_graph(
            format!("{}{DUPLICATE_SUFFIX}", original.name),
            original.graph.with_fresh_ids(),
        );
        copy.description = original.description.clone();
        self.save_flow(&mut copy)?;
        log::info!("duplicated flow {id} as {}", copy.id);
        Ok(copy)
    }

    /// First step of deleting a flow: returns the token the confirmation step
    /// needs. Nothing is removed yet.
    pub fn request_delete(&self, id: FlowId) -> Result<PendingDelete> {
        let flow = self.store.load(id)?;
        Ok(PendingDelete {
            id,
            name: flow.name,
        })
    }

    /// Removes the flow the user confirmed. This cannot be undone.
    pub fn confirm_delete(&mut self, pending: PendingDelete) -> Result<()> {
        self.store.delete(pending.id)?;
        log::info!("deleted flow {} ({})", pending.name, pending.id);
        Ok(())
    }

    /// Creates and stores a new flow from a built-in template.
    pub fn use_template(&mut self, template_id: &str) -> Result<Flow> {
        let template = templates::build_template(template_id)?;
        let mut flow = Flow::with_graph(template.name, template.graph.with_fresh_ids());
        flow.description = template.description;
        self.save_flow(&mut flow)?;
        log::info!("instantiated {template_id} as flow {}", flow.id);
        Ok(flow)
    }

    /// Stores an externally supplied flow document as a new flow.
    ///
    /// All ids are regenerated, so importing the same file twice yields two
    /// independent flows.
    pub fn import_flow(&mut self, json: &str) -> Result<Flow> {
        let imported = Flow::from_json(json)?;
        let mut flow = Flow::with_graph(imported.name, imported.graph.with_fresh_ids());
        flow.description = imported.description;
        self.save_flow(&mut flow)?;
        Ok(flow)
    }

    /// Whether `id` names a stored flow.
    pub fn exists(&self, id: FlowId) -> Result<bool> {
        self.store.contains(id)
    }

    /// Loads a flow, mapping a missing id to `None`.
    pub fn find_flow(&self, id: FlowId) -> Result<Option<Flow>> {
        match self.store.load(id) {
            Ok(flow) => Ok(Some(flow)),
            Err(FlowError::NotFound(_)) => Ok(None),
            Err(err) => Err(err),
        }
    }
}
