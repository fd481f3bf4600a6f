//! Viewer engine: assets, camera, loading, scene and runtime systems.

pub mod assets;
pub mod camera;
pub mod core;
pub mod loading;
pub mod scene;
pub mod systems;
