//! Scene contents: lighting, the axes helper and the displayed model.

/// World axes drawn at the origin.
pub mod axes;

/// Ambient and directional lighting.
pub mod lighting;

/// Attaching and detaching the displayed model.
pub mod model;
