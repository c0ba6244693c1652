//! Storage backends for whole-flow snapshots.
//!
//! A [`FlowStore`] persists complete [`Flow`] documents keyed by id. Saving
//! always replaces the previous snapshot; there are no partial updates.

use crate::error::{FlowError, Result};
use crate::types::{Flow, FlowId, FlowSummary};
use std::collections::HashMap;

/// Contract every storage backend implements.
pub trait FlowStore {
    /// Metadata of every stored flow, in no particular order.
    fn list(&self) -> Result<Vec<FlowSummary>>;

    /// Loads the full snapshot of a flow.
    ///
    /// # Errors
    ///
    /// [`FlowError::NotFound`] when no flow has this id.
    fn load(&self, id: FlowId) -> Result<Flow>;

    /// Stores `flow`, replacing any snapshot with the same id.
    fn save(&mut self, flow: &Flow) -> Result<()>;

    /// Removes a flow. Removing a missing flow succeeds.
    fn delete(&mut self, id: FlowId) -> Result<()>;

    /// Whether a flow with this id is stored.
    fn contains(&self, id: FlowId) -> Result<bool>;
}

impl<T: FlowStore + ?Sized> FlowStore for Box<T> {
    fn list(&self) -> Result<Vec<FlowSummary>> {
        (**self).list()
    }

    fn load(&self, id: FlowId) -> Result<Flow> {
        (**self).load(id)
    }

    fn save(&mut self, flow: &Flow) -> Result<()> {
        (**self).save(flow)
    }

    fn delete(&mut self, id: FlowId) -> Result<()> {
        (**self).delete(id)
    }

    fn contains(&self, id: FlowId) -> Result<bool> {
        (**self).contains(id)
    }
}

/// Non-durable store kept in memory. Used on the web and in tests.
#[derive(Debug, Default, Clone)]
pub struct MemoryFlowStore {
    flows: HashMap<FlowId, Flow>,
}

impl MemoryFlowStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl FlowStore for MemoryFlowStore {
    fn list(&self) -> Result<Vec<FlowSummary>> {
        Ok(self.flows.values().map(Flow::summary).collect())
    }

    fn load(&self, id: FlowId) -> Result<Flow> {
        self.flows.get(&id).cloned().ok_or(FlowError::NotFound(id))
    }

    fn save(&mut self, flow: &Flow) -> Result<()> {
        self.flows.insert(flow.id, flow.clone());
        Ok(())
    }

    fn delete(&mut self, id: FlowId) -> Result<()> {
        self.flows.remove(&id);
        Ok(())
    }

    fn contains(&self, id: FlowId) -> Result<bool> {
        Ok(self.flows.contains_key(&id))
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use dir::JsonDirStore;

#[cfg(not(target_arch = "wasm32"))]
mod dir {
    use super::*;
    use std::fs;
    use std::io::ErrorKind;
    use std::path::PathBuf;

    /// Stores each flow as a pretty-printed `<id>.json` file in a directory.
    #[derive(Debug, Clone)]
    pub struct JsonDirStore {
        root: PathBuf,
    }

    impl JsonDirStore {
        /// Opens (and creates if needed) the store directory.
        pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
            let root = root.into();
            fs::create_dir_all(&root)?;
            log::info!("flow store at {}", root.display());
            Ok(Self { root })
        }

        fn path_for(&self, id: FlowId) -> PathBuf {
            self.root.join(format!("{id}.json"))
        }
    }

    impl FlowStore for JsonDirStore {
        fn list(&self) -> Result<Vec<FlowSummary>> {
            let mut summaries = Vec::new();
            for entry in fs::read_dir(&self.root)? {
                let path = entry?.path();
                if path.extension().and_then(|e| e.to_str()) != Some("json") {
                    continue;
                }
                match fs::read_to_string(&path)
                    .map_err(FlowError::from)
                    .and_then(|json| Flow::from_json(&json).map_err(FlowError::from))
                {
                    Ok(flow) => summaries.push(flow.summary()),
                    Err(err) => log::warn!("skipping {}: {err}", path.display()),
                }
            }
            Ok(summaries)
        }

        fn load(&self, id: FlowId) -> Result<Flow> {
            let json = match fs::read_to_string(self.path_for(id)) {
                Ok(json) => json,
                Err(err) if err.kind() == ErrorKind::NotFound => {
                    return Err(FlowError::NotFound(id))
                }
                Err(err) => return Err(err.into()),
            };
            Ok(Flow::from_json(&json)?)
        }

        /// Writes to `<id>.json.tmp` first and renames it over the snapshot,
        /// so an interrupted save leaves the previous version intact.
        fn save(&mut self, flow: &Flow) -> Result<()> {
            let target = self.path_for(flow.id);
            let staging = target.with_extension("json.tmp");
            fs::write(&staging, flow.to_json()?)?;
            if let Err(err) = fs::rename(&staging, &target) {
                let _ = fs::remove_file(&staging);
                return Err(err.into());
            }
            Ok(())
        }

        fn delete(&mut self, id: FlowId) -> Result<()> {
            match fs::remove_file(self.path_for(id)) {
                Ok(()) => Ok(()),
                Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
                Err(err) => Err(err.into()),
            }
        }

        fn contains(&self, id: FlowId) -> Result<bool> {
            Ok(self.path_for(id).is_file())
        }
    }
}
