use bevy::prelude::*;
use constants::render_settings::{
    AMBIENT_BRIGHTNESS, DIRECTIONAL_ILLUMINANCE, DIRECTIONAL_LIGHT_FROM,
};

/// Soft white ambient fill plus one directional light from above-front.
pub fn spawn_lighting(commands: &mut Commands) {
    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: AMBIENT_BRIGHTNESS,
        ..default()
    });

    let from = Vec3::from_array(DIRECTIONAL_LIGHT_FROM).normalize();
    commands.spawn((
        DirectionalLight {
            illuminance: DIRECTIONAL_ILLUMINANCE,
            shadows_enabled: false,
            ..default()
        },
        Transform::from_translation(from).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}
