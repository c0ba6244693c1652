//! # Flow Builder
//!
//! A visual editor for conversational-automation flows: directed graphs of
//! typed nodes (text messages, option menus, media, channel entry points and
//! tool calls) joined by edges between output and input handles.
//!
//! The core is UI-independent:
//! - [`registry`]: the closed set of node kinds, their defaults, fields and renderers
//! - [`graph`]: the node/edge store and its invariants
//! - [`drawer`]: the drawer navigation state machine
//! - [`binder`]: node configuration forms and the edit reducer
//! - [`gallery`], [`storage`], [`templates`]: saved flows and built-in templates
//!
//! The [`ui`] module is the egui shell on top.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod binder;
pub mod config;
pub mod constants;
pub mod drawer;
pub mod error;
pub mod gallery;
pub mod graph;
pub mod registry;
pub mod storage;
pub mod templates;
pub mod types;
pub mod ui;

pub use binder::{apply_edit, FieldEdit, FieldValue, NodeForm};
pub use config::EditorConfig;
pub use drawer::{Drawer, DrawerView};
pub use error::{FlowError, Result};
pub use gallery::{FlowGallery, PendingDelete};
pub use graph::FlowGraph;
pub use registry::{NodeCategory, NodeKind};
#[cfg(not(target_arch = "wasm32"))]
pub use storage::JsonDirStore;
pub use storage::{FlowStore, MemoryFlowStore};
pub use types::*;
pub use ui::FlowBuilderApp;

/// Runs the flow builder in a native window.
///
/// Settings are restored from eframe's storage and flows are kept in the
/// configured data directory.
///
/// # Example
///
/// ```no_run
/// fn main() -> Result<(), eframe::Error> {
///     flow_builder::run_app()
/// }
/// ```
#[cfg(not(target_arch = "wasm32"))]
pub fn run_app() -> std::result::Result<(), eframe::Error> {
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_title("Flow Builder"),
        ..Default::default()
    };
    eframe::run_native(
        "Flow Builder",
        options,
        Box::new(|cc| Ok(Box::new(FlowBuilderApp::new(cc)))),
    )
}
