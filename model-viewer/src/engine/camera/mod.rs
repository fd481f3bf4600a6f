//! Viewport camera and orbit controls.
//!
//! Spawns the perspective camera, applies damped orbit/pan/dolly input each
//! frame and computes the framing used after a model loads.

/// Camera framing from model bounds.
pub mod framing;

/// Orbit controls resource with input and per-frame update systems.
pub mod orbit_controls;

/// Viewer camera marker and spawn helpers.
pub mod viewer_camera;
