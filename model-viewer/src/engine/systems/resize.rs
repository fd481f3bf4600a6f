use bevy::prelude::*;
use bevy::window::WindowResized;

use crate::engine::camera::viewer_camera::ViewerCamera;
use crate::engine::core::session::{SurfaceSize, ViewportSession};

/// Match surface size and camera aspect to new container dimensions.
/// Zero-sized containers (collapsed or minimised) are ignored.
pub fn resize_viewport(
    surface: &mut SurfaceSize,
    projection: &mut Projection,
    width: u32,
    height: u32,
) -> bool {
    let resized = SurfaceSize::new(width, height);
    if resized.is_empty() {
        return false;
    }

    *surface = resized;
    if let Projection::Perspective(perspective) = projection {
        perspective.aspect_ratio = resized.aspect_ratio();
    }
    true
}

/// Apply every resize signal synchronously, without debouncing. Does nothing
/// until the viewport session exists.
pub fn handle_resize(
    mut resize_events: EventReader<WindowResized>,
    session: Option<ResMut<ViewportSession>>,
    mut cameras: Query<&mut Projection, With<ViewerCamera>>,
) {
    let Some(mut session) = session else {
        resize_events.clear();
        return;
    };

    for event in resize_events.read() {
        let width = event.width.round() as u32;
        let height = event.height.round() as u32;
        let camera = session.camera;

        let Ok(mut projection) = cameras.get_mut(camera) else {
            continue;
        };
        if resize_viewport(&mut session.surface, &mut projection, width, height) {
            debug!("Viewport resized to {}x{}", width, height);
        }
    }
}
