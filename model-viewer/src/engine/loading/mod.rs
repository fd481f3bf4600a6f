//! Loading of runtime configuration and model meshes.
//!
//! Mesh loads replace the displayed model: the old model is detached, the
//! OBJ is transferred with progress reporting, parsed, attached and framed.

/// Runtime viewer configuration loading through the asset server.
pub mod config_loader;

/// Cancellable mesh transfers reporting into a shared event queue.
pub mod fetch;

/// Mesh load lifecycle: requests, stale-result filtering and outcomes.
pub mod mesh_loader;

/// Progress of the current mesh load.
pub mod progress;
