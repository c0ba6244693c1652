//! Shared application-wide constants.
//! Centralizes tweakable values used across the graph store and UI rendering.

// Node dimensions
/// Default node width in world units.
pub const NODE_WIDTH: f32 = 180.0;
/// Minimum node height in world units.
pub const NODE_HEIGHT: f32 = 90.0;
/// Radius of a connection handle dot (in world units).
pub const HANDLE_RADIUS: f32 = 6.0;
/// Minimum vertical distance between two output handles; nodes with many
/// outputs grow taller to keep it.
pub const HANDLE_SPACING: f32 = 24.0;
/// Size of the delete button drawn in a node's top-right corner (in world units).
pub const DELETE_BUTTON_SIZE: f32 = 14.0;

// Placement
/// Offset applied to the last node's position when placing a node without an explicit point.
pub const NEW_NODE_OFFSET: (f32, f32) = (220.0, 40.0);

// Grid/drawing
/// Grid cell size in world units.
pub const GRID_SIZE: f32 = 20.0;

// Canvas interactions
/// Click threshold in world units used for distinguishing click vs drag.
pub const CLICK_THRESHOLD: f32 = 10.0;
/// Minimum zoom factor.
pub const MIN_ZOOM: f32 = 0.25;
/// Maximum zoom factor.
pub const MAX_ZOOM: f32 = 3.0;

// Gallery
/// Suffix appended to the name of a duplicated flow.
pub const DUPLICATE_SUFFIX: &str = " (copy)";
/// Environment variable overriding the flow storage directory.
pub const DATA_DIR_ENV: &str = "FLOW_BUILDER_DATA_DIR";
/// Storage directory used when the environment does not provide one.
pub const DEFAULT_DATA_DIR: &str = "flows";
