use bevy::prelude::*;
use constants::render_settings::AXES_LENGTH;

/// Draw the world axes at the origin: X red, Y green, Z blue.
pub fn draw_axes_helper(mut gizmos: Gizmos) {
    gizmos.line(Vec3::ZERO, Vec3::X * AXES_LENGTH, Color::srgb(1.0, 0.0, 0.0));
    gizmos.line(Vec3::ZERO, Vec3::Y * AXES_LENGTH, Color::srgb(0.0, 1.0, 0.0));
    gizmos.line(Vec3::ZERO, Vec3::Z * AXES_LENGTH, Color::srgb(0.0, 0.0, 1.0));
}
