//! Core application setup and state management.
//!
//! Handles application lifecycle, window configuration, the viewport session
//! and the status line for both native and WASM targets.

/// Application setup and plugin configuration for the Bevy engine.
///
/// Creates the main app with asset loading, submission handling and
/// platform-specific configurations.
pub mod app_setup;

/// Viewer state machine gating the per-frame render loop.
pub mod app_state;

/// Viewport session created at start-up.
pub mod session;

/// User-facing status line and its message formats.
pub mod status;

/// Platform-specific window configuration for native and WASM builds.
///
/// Configures canvas integration for web targets and vsync settings.
pub mod window_config;
