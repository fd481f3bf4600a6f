use bevy::prelude::*;

use crate::engine::core::app_state::ViewerState;
use crate::engine::core::session::ViewportSession;
use crate::engine::loading::mesh_loader::MeshLoadTracker;
use crate::engine::loading::progress::LoadProgress;
use crate::engine::scene::model::detach_model;

/// Ask the viewer to stop: any load is cancelled, the model released and the
/// frame loop ended.
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct ShutdownRequest;

/// Turn native window close into a shutdown request.
#[cfg(not(target_arch = "wasm32"))]
pub fn request_shutdown_on_close(
    mut close_events: EventReader<bevy::window::WindowCloseRequested>,
    mut shutdown: EventWriter<ShutdownRequest>,
) {
    if close_events.read().next().is_some() {
        shutdown.write(ShutdownRequest);
    }
}

pub fn teardown_session(
    mut requests: EventReader<ShutdownRequest>,
    mut commands: Commands,
    session: Option<ResMut<ViewportSession>>,
    mut tracker: ResMut<MeshLoadTracker>,
    mut progress: ResMut<LoadProgress>,
    mut next_state: ResMut<NextState<ViewerState>>,
    mut exit: EventWriter<AppExit>,
) {
    if requests.read().count() == 0 {
        return;
    }

    tracker.cancel_in_flight();
    progress.finish();
    if let Some(mut session) = session {
        detach_model(&mut commands, &mut session);
    }

    next_state.set(ViewerState::ShutDown);
    exit.write(AppExit::Success);
    info!("→ Viewer shut down");
}

/// Resource holding the flag raised by the page's `pagehide` listener.
#[cfg(target_arch = "wasm32")]
#[derive(Resource)]
pub struct PageHideFlag(std::sync::Arc<std::sync::atomic::AtomicBool>);

#[cfg(target_arch = "wasm32")]
pub fn setup_pagehide_listener(mut commands: Commands) {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;

    let flag = Arc::new(AtomicBool::new(false));
    let flag_clone = flag.clone();

    let closure = Closure::wrap(Box::new(move |_event: web_sys::Event| {
        flag_clone.store(true, Ordering::Release);
    }) as Box<dyn FnMut(web_sys::Event)>);

    if let Some(window) = web_sys::window() {
        if let Err(e) =
            window.add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref())
        {
            error!("Failed to register pagehide listener: {:?}", e);
        }
    }

    closure.forget();
    commands.insert_resource(PageHideFlag(flag));
}

#[cfg(target_arch = "wasm32")]
pub fn request_shutdown_on_pagehide(
    flag: Option<Res<PageHideFlag>>,
    mut shutdown: EventWriter<ShutdownRequest>,
) {
    use std::sync::atomic::Ordering;

    if let Some(flag) = flag {
        if flag.0.swap(false, Ordering::AcqRel) {
            shutdown.write(ShutdownRequest);
        }
    }
}

#[cfg(test)]
mod tests {
    use bevy::state::app::StatesPlugin;

    use super::*;
    use crate::engine::core::session::SurfaceSize;
    use crate::engine::scene::model::DisplayedModel;

    fn shutdown_app() -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, StatesPlugin))
            .init_state::<ViewerState>()
            .init_resource::<MeshLoadTracker>()
            .init_resource::<LoadProgress>()
            .add_event::<ShutdownRequest>()
            .add_event::<AppExit>()
            .add_systems(Update, teardown_session);
        app
    }

    #[test]
    fn shutdown_cancels_load_and_releases_model() {
        let mut app = shutdown_app();
        let camera = app.world_mut().spawn_empty().id();
        let model = app
            .world_mut()
            .spawn(DisplayedModel {
                source_url: "cube.obj".to_string(),
                bounds: crate::engine::assets::bounds::ModelBounds {
                    min: Vec3::ZERO,
                    max: Vec3::ONE,
                },
            })
            .id();
        app.insert_resource(ViewportSession {
            surface: SurfaceSize::new(800, 600),
            camera,
            background: Color::BLACK,
            model: Some(model),
        });
        let sink = app
            .world_mut()
            .resource_mut::<MeshLoadTracker>()
            .start("slow.obj");

        app.world_mut().send_event(ShutdownRequest);
        app.update();
        app.update();

        let world = app.world();
        assert!(sink.is_cancelled());
        assert!(world.get_entity(model).is_err());
        assert!(world.resource::<ViewportSession>().model.is_none());
        assert_eq!(
            *world.resource::<State<ViewerState>>().get(),
            ViewerState::ShutDown
        );
        assert!(!world.resource::<Events<AppExit>>().is_empty());
    }

    #[test]
    fn no_request_keeps_running() {
        let mut app = shutdown_app();
        app.update();

        assert_eq!(
            *app.world().resource::<State<ViewerState>>().get(),
            ViewerState::Initialising
        );
        assert!(app.world().resource::<Events<AppExit>>().is_empty());
    }
}
