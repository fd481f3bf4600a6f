//! Runtime systems around the viewport session.
//!
//! Resize handling, status display and session teardown.

/// Container resize handling for the render surface and camera aspect.
pub mod resize;

/// Status line display on the page (WASM) or a text overlay (native).
pub mod status_display;

/// Shutdown requests and session teardown.
///
/// Triggered by RPC, page unload (WASM) or window close (native).
pub mod shutdown;
