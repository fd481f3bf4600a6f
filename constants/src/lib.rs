//! Shared constants for the model viewer: render settings, backend routes,
//! page element ids and user-facing status strings.

pub mod backend;
pub mod page;
pub mod render_settings;
pub mod status;
