// Standard library and external crates
use bevy::asset::AssetMetaCheck;
use bevy::diagnostic::FrameTimeDiagnosticsPlugin;
use bevy::prelude::*;
use bevy_common_assets::json::JsonAssetPlugin;

// Crate engine modules
use crate::engine::assets::viewer_config::ViewerConfig;
use crate::engine::camera::orbit_controls::{orbit_controls_input, orbit_controls_update};
use crate::engine::core::app_state::{ViewerState, transition_to_ready};
use crate::engine::core::session::initialise_viewport;
use crate::engine::core::status::StatusMessage;
use crate::engine::core::window_config::create_window_config;
use crate::engine::loading::config_loader::{
    ConfigLoader, apply_loaded_config, start_config_loading,
};
use crate::engine::loading::mesh_loader::{
    LoadMeshRequest, MeshFetchBackend, MeshLoadTracker, ModelLoaded, begin_mesh_loads,
    poll_mesh_loads,
};
use crate::engine::loading::progress::LoadProgress;
use crate::engine::scene::axes::draw_axes_helper;
use crate::engine::systems::resize::handle_resize;
use crate::engine::systems::shutdown::{ShutdownRequest, teardown_session};

// Submission and Web RPC modules
use crate::rpc::web_rpc::WebRpcPlugin;
use crate::submission::SubmissionPlugin;

pub fn create_app() -> App {
    let mut app = App::new();

    app.add_plugins(create_default_plugins())
        .init_state::<ViewerState>()
        .add_plugins(FrameTimeDiagnosticsPlugin::default())
        // Registers ViewerConfig as a loadable asset type from *.config.json files.
        .add_plugins(JsonAssetPlugin::<ViewerConfig>::new(&["config.json"]))
        .add_plugins(WebRpcPlugin)
        .add_plugins(SubmissionPlugin);

    // Initialise resources early
    app.init_resource::<ViewerConfig>()
        .init_resource::<StatusMessage>()
        .init_resource::<LoadProgress>()
        .init_resource::<MeshLoadTracker>()
        .init_resource::<MeshFetchBackend>()
        .init_resource::<ConfigLoader>()
        .add_event::<LoadMeshRequest>()
        .add_event::<ModelLoaded>()
        .add_event::<ShutdownRequest>();

    app.add_systems(
        Startup,
        (initialise_viewport, transition_to_ready, start_config_loading).chain(),
    );

    // Render loop: input, loads, resize, then the controls update so a resize
    // is reflected in the same frame.
    app.add_systems(
        Update,
        (
            orbit_controls_input,
            begin_mesh_loads,
            poll_mesh_loads,
            apply_loaded_config,
            handle_resize,
            orbit_controls_update,
            draw_axes_helper,
        )
            .chain()
            .run_if(in_state(ViewerState::Ready)),
    );

    // Teardown runs last so a shutdown in this frame sees every earlier update.
    app.add_systems(
        PostUpdate,
        teardown_session.run_if(in_state(ViewerState::Ready)),
    );

    #[cfg(target_arch = "wasm32")]
    {
        use crate::engine::systems::shutdown::{
            request_shutdown_on_pagehide, setup_pagehide_listener,
        };
        use crate::engine::systems::status_display::sync_status_element;

        app.add_systems(Startup, setup_pagehide_listener)
            .add_systems(Update, (sync_status_element, request_shutdown_on_pagehide));
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        use crate::engine::systems::shutdown::request_shutdown_on_close;
        use crate::engine::systems::status_display::{
            create_status_overlay, update_status_overlay,
        };

        app.add_systems(Startup, create_status_overlay)
            .add_systems(Update, (update_status_overlay, request_shutdown_on_close));
    }

    app
}

fn create_default_plugins() -> impl PluginGroup {
    let window_config = WindowPlugin {
        primary_window: Some(create_window_config()),
        // Close requests go through the viewer's own teardown.
        close_when_requested: false,
        ..default()
    };

    let asset_config = AssetPlugin {
        meta_check: AssetMetaCheck::Never,
        ..default()
    };

    DefaultPlugins.set(window_config).set(asset_config)
}
