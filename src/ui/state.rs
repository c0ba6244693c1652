//! Application state management structures.
//!
//! This module contains the state the editor shell owns: the open flow and its
//! drawer, canvas navigation, in-progress pointer interactions, gallery screen
//! state and file operations.

use crate::config::EditorConfig;
use crate::drawer::Drawer;
use crate::gallery::{FlowGallery, PendingDelete};
use crate::storage::{FlowStore, MemoryFlowStore};
use crate::types::{Flow, FlowSummary, NodeId, Position};
use eframe::egui;
use std::sync::mpsc::{channel, Receiver, Sender};

/// Key under which settings are persisted in eframe storage.
pub const APP_STATE_KEY: &str = "app_state";

/// Boxed storage backend chosen at startup.
pub type DynStore = Box<dyn FlowStore>;

/// State related to canvas navigation.
pub struct CanvasState {
    /// Current canvas pan offset (in screen space)
    pub offset: egui::Vec2,
    /// Current zoom level (1.0 = normal)
    pub zoom_factor: f32,
    /// Whether the offset was already centred for the open flow
    pub centered: bool,
}

impl Default for CanvasState {
    fn default() -> Self {
        Self {
            offset: egui::Vec2::ZERO,
            zoom_factor: 1.0,
            centered: false,
        }
    }
}

/// A connection being dragged out of an output handle.
///
/// Lives only in UI state: the graph is not touched until the drag is released
/// over a node, and a release anywhere else simply drops it.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingConnection {
    /// Node the drag started from
    pub source: NodeId,
    /// Output handle the drag started from
    pub handle: String,
    /// Current pointer position (screen space)
    pub pointer: egui::Pos2,
}

/// State related to pointer interactions on the canvas.
#[derive(Default)]
pub struct InteractionState {
    /// Node currently being dragged
    pub dragging_node: Option<NodeId>,
    /// Pointer position where the current press started (screen space)
    pub press_origin: Option<egui::Pos2>,
    /// Whether the current press moved far enough to count as a drag
    pub moved_beyond_click: bool,
    /// Offset from pointer to node centre while dragging
    pub node_drag_offset: egui::Vec2,
    /// Where the dragged node is drawn until the drag is released
    pub drag_preview: Option<Position>,
    /// Connection drag in progress
    pub pending_connection: Option<PendingConnection>,
    /// Whether the user is currently panning the canvas
    pub is_panning: bool,
    /// Last pointer position during panning
    pub last_pan_pos: Option<egui::Pos2>,
}

impl InteractionState {
    /// Drops any in-progress drag without touching the graph.
    pub fn cancel(&mut self) {
        self.dragging_node = None;
        self.press_origin = None;
        self.moved_beyond_click = false;
        self.drag_preview = None;
        self.pending_connection = None;
    }
}

/// The flow currently open in the editor.
pub struct EditorSession {
    /// Flow being edited
    pub flow: Flow,
    /// Drawer navigation state
    pub drawer: Drawer,
    /// Where a node picked from the drawer should go; `None` means next to
    /// the last node
    pub drawer_anchor: Option<Position>,
    /// Whether the flow changed since it was last saved
    pub dirty: bool,
}

impl EditorSession {
    /// Starts editing `flow` with a closed drawer.
    pub fn new(flow: Flow) -> Self {
        Self {
            flow,
            drawer: Drawer::new(),
            drawer_anchor: None,
            dirty: false,
        }
    }
}

/// State of the gallery screen.
#[derive(Default)]
pub struct GalleryScreenState {
    /// Cached flow list, refreshed after every gallery mutation
    pub flows: Vec<FlowSummary>,
    /// Delete awaiting the user's confirmation
    pub pending_delete: Option<PendingDelete>,
    /// Name for the next flow created from scratch
    pub new_flow_name: String,
}

/// Represents a pending file operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingFileOperation {
    /// Write the open flow to a user-chosen file
    Export,
    /// Read a flow file and add it to the gallery
    Import,
}

/// Messages sent from async file operations back to the main app.
#[derive(Debug)]
pub enum FileOperationResult {
    /// Export finished; carries the destination
    ExportCompleted(String),
    /// Import read a file; carries its name and content
    ImportLoaded(String, String),
    /// Operation failed with an error message
    OperationFailed(String),
}

/// State related to file import/export.
pub struct FileState {
    /// Operation to start on the next frame
    pub pending: Option<PendingFileOperation>,
    /// Sender handed to async tasks
    pub sender: Sender<FileOperationResult>,
    /// Receiver drained at the start of every frame
    pub receiver: Receiver<FileOperationResult>,
}

impl Default for FileState {
    fn default() -> Self {
        let (sender, receiver) = channel();
        Self {
            pending: None,
            sender,
            receiver,
        }
    }
}

/// The main application structure: settings, gallery and the open flow.
///
/// This struct implements the `eframe::App` trait and handles all user
/// interface rendering and interaction logic.
pub struct FlowBuilderApp {
    /// Persisted editor settings
    pub config: EditorConfig,
    /// Saved flows and templates
    pub gallery: FlowGallery<DynStore>,
    /// Gallery screen state
    pub gallery_screen: GalleryScreenState,
    /// Open flow; `None` shows the gallery
    pub session: Option<EditorSession>,
    /// Canvas navigation state
    pub canvas: CanvasState,
    /// Pointer interaction state
    pub interaction: InteractionState,
    /// File operations state
    pub file: FileState,
    /// Last status message shown in the toolbar
    pub status: Option<String>,
}

impl Default for FlowBuilderApp {
    fn default() -> Self {
        Self::with_store(EditorConfig::default(), Box::new(MemoryFlowStore::new()))
    }
}

impl FlowBuilderApp {
    /// Builds the app around an explicit storage backend.
    pub fn with_store(config: EditorConfig, store: DynStore) -> Self {
        let mut app = Self {
            config,
            gallery: FlowGallery::new(store),
            gallery_screen: GalleryScreenState::default(),
            session: None,
            canvas: CanvasState::default(),
            interaction: InteractionState::default(),
            file: FileState::default(),
            status: None,
        };
        app.refresh_flow_list();
        app
    }

    /// Builds the app from eframe's creation context, restoring persisted
    /// settings and opening the configured storage backend.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let stored = cc
            .storage
            .and_then(|storage| storage.get_string(APP_STATE_KEY))
            .and_then(|json| match serde_json::from_str::<EditorConfig>(&json) {
                Ok(config) => Some(config),
                Err(err) => {
                    log::warn!("ignoring unreadable settings: {err}");
                    None
                }
            });
        let config = match stored {
            Some(config) => config.with_env_overrides(),
            None => EditorConfig::from_env(),
        };
        let store = open_store(&config);
        Self::with_store(config, store)
    }

    /// Reloads the cached gallery list.
    pub fn refresh_flow_list(&mut self) {
        match self.gallery.list_flows() {
            Ok(flows) => self.gallery_screen.flows = flows,
            Err(err) => self.report_error("Could not list flows", err),
        }
    }

    /// Logs an error and shows it in the status line.
    pub fn report_error(&mut self, context: &str, err: impl std::fmt::Display) {
        log::error!("{context}: {err}");
        self.status = Some(format!("{context}: {err}"));
    }

    /// Shows an informational status message.
    pub fn report(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::info!("{message}");
        self.status = Some(message);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn open_store(config: &EditorConfig) -> DynStore {
    match crate::storage::JsonDirStore::open(&config.data_dir) {
        Ok(store) => Box::new(store),
        Err(err) => {
            log::error!(
                "cannot use {} for flows ({err}); keeping flows in memory",
                config.data_dir
            );
            Box::new(MemoryFlowStore::new())
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn open_store(_config: &EditorConfig) -> DynStore {
    Box::new(MemoryFlowStore::new())
}
