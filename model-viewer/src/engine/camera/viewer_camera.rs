use bevy::prelude::*;
use constants::render_settings::{CAMERA_FAR, CAMERA_NEAR, INITIAL_CAMERA_Z};

/// Marks the single perspective camera the viewport renders from.
#[derive(Component, Debug, Default)]
pub struct ViewerCamera;

/// Perspective projection for a surface of the given aspect ratio.
pub fn viewer_projection(fov: f32, aspect_ratio: f32) -> PerspectiveProjection {
    PerspectiveProjection {
        fov,
        aspect_ratio,
        near: CAMERA_NEAR,
        far: CAMERA_FAR,
    }
}

/// Spawn the viewport camera on +Z looking back at the origin.
pub fn spawn_viewer_camera(commands: &mut Commands, fov: f32, aspect_ratio: f32) -> Entity {
    commands
        .spawn((
            Camera3d::default(),
            Projection::Perspective(viewer_projection(fov, aspect_ratio)),
            Transform::from_xyz(0.0, 0.0, INITIAL_CAMERA_Z).looking_at(Vec3::ZERO, Vec3::Y),
            ViewerCamera,
        ))
        .id()
}
