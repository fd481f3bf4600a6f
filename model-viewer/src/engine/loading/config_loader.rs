use bevy::asset::LoadState;
use bevy::prelude::*;
use constants::page::VIEWER_CONFIG_PATH;

use crate::engine::assets::viewer_config::ViewerConfig;
use crate::engine::camera::orbit_controls::OrbitControls;
use crate::engine::camera::viewer_camera::ViewerCamera;
use crate::engine::core::session::ViewportSession;

#[derive(Resource, Default)]
pub struct ConfigLoader {
    handle: Option<Handle<ViewerConfig>>,
    settled: bool,
}

// Start loading the optional runtime configuration
pub fn start_config_loading(mut loader: ResMut<ConfigLoader>, asset_server: Res<AssetServer>) {
    loader.handle = Some(asset_server.load(VIEWER_CONFIG_PATH));
}

/// Replace the compiled-in defaults once the config asset arrives. A missing
/// or invalid file keeps the defaults.
pub fn apply_loaded_config(
    mut loader: ResMut<ConfigLoader>,
    asset_server: Res<AssetServer>,
    configs: Res<Assets<ViewerConfig>>,
    mut commands: Commands,
    session: Option<ResMut<ViewportSession>>,
    controls: Option<ResMut<OrbitControls>>,
    mut projections: Query<&mut Projection, With<ViewerCamera>>,
) {
    if loader.settled {
        return;
    }
    let Some(handle) = loader.handle.clone() else {
        return;
    };

    if let LoadState::Failed(err) = asset_server.load_state(&handle) {
        warn!("Viewer config not loaded ({}), using defaults", err);
        loader.settled = true;
        return;
    }

    let Some(config) = configs.get(&handle) else {
        return;
    };
    // Session must exist so the camera and background can be updated.
    let Some(mut session) = session else {
        return;
    };

    info!("✓ Viewer config loaded from {}", VIEWER_CONFIG_PATH);
    match config.background() {
        Some(background) => {
            session.background = background;
            commands.insert_resource(ClearColor(background));
        }
        None => warn!(
            "Invalid background colour '{}' in viewer config",
            config.background_colour
        ),
    }

    for mut projection in &mut projections {
        if let Projection::Perspective(perspective) = &mut *projection {
            perspective.fov = config.fov_radians();
        }
    }

    if let Some(mut controls) = controls {
        controls.damping_factor = config.damping_factor;
    }

    commands.insert_resource(config.clone());
    loader.settled = true;
}
