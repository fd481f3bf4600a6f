//! Model and configuration assets.
//!
//! Parses OBJ meshes into node trees, computes their bounds, and defines the
//! JSON viewer configuration loaded through the asset server.

/// Axis-aligned bounds used for recentring and camera framing.
pub mod bounds;

/// Wavefront OBJ parser producing per-group mesh nodes.
pub mod obj;

/// Runtime configuration asset with compiled-in defaults.
pub mod viewer_config;
