use bevy::prelude::*;
use bevy::window::RequestRedraw;
use constants::status::MODEL_DISPLAYED;

use super::fetch::{CancelToken, FetchEvent, FetchQueue, FetchSink, HttpMeshFetcher, MeshFetcher};
use super::progress::LoadProgress;
use crate::engine::assets::obj::{ObjModel, parse_obj};
use crate::engine::assets::viewer_config::ViewerConfig;
use crate::engine::camera::framing::frame_bounds;
use crate::engine::camera::orbit_controls::OrbitControls;
use crate::engine::camera::viewer_camera::ViewerCamera;
use crate::engine::core::session::ViewportSession;
use crate::engine::core::status::{
    StatusMessage, StatusTone, load_error_text, loading_text, progress_percent,
};
use crate::engine::scene::model::{attach_model, detach_model};

/// Replace the displayed model with the OBJ at `url`.
#[derive(Event, Debug, Clone)]
pub struct LoadMeshRequest {
    pub url: String,
}

/// Emitted after a model is attached and framed.
#[derive(Event, Debug, Clone)]
pub struct ModelLoaded {
    pub url: String,
    pub nodes: usize,
    pub vertices: usize,
    pub triangles: usize,
    pub size: Vec3,
}

/// What one step of a load means for the viewport.
#[derive(Debug)]
pub enum LoadOutcome {
    Progress(Option<u32>),
    Success(ObjModel),
    Failure(String),
}

/// Fetch events become outcomes; a completed body is parsed here.
pub fn resolve_fetch_event(event: FetchEvent) -> LoadOutcome {
    match event {
        FetchEvent::Progress { loaded, total } => {
            LoadOutcome::Progress(progress_percent(loaded, total))
        }
        FetchEvent::Completed(text) => match parse_obj(&text) {
            Ok(model) => LoadOutcome::Success(model),
            Err(err) => LoadOutcome::Failure(err.to_string()),
        },
        FetchEvent::Failed(err) => LoadOutcome::Failure(err.to_string()),
    }
}

/// Transfer backend used for mesh loads.
#[derive(Resource)]
pub struct MeshFetchBackend(pub Box<dyn MeshFetcher>);

impl Default for MeshFetchBackend {
    fn default() -> Self {
        Self(Box::new(HttpMeshFetcher))
    }
}

#[derive(Debug)]
struct InFlightLoad {
    generation: u64,
    url: String,
    cancel: CancelToken,
}

/// Tracks the one load whose results may still reach the scene. Starting a
/// load cancels the previous one, so the most recently requested model wins.
#[derive(Resource, Default)]
pub struct MeshLoadTracker {
    next_generation: u64,
    in_flight: Option<InFlightLoad>,
    queue: FetchQueue,
}

impl MeshLoadTracker {
    /// Cancel any in-flight load and open a sink for a new one.
    pub fn start(&mut self, url: &str) -> FetchSink {
        self.cancel_in_flight();

        self.next_generation += 1;
        let cancel = CancelToken::default();
        self.in_flight = Some(InFlightLoad {
            generation: self.next_generation,
            url: url.to_string(),
            cancel: cancel.clone(),
        });
        FetchSink::new(self.next_generation, self.queue.clone(), cancel)
    }

    pub fn cancel_in_flight(&mut self) {
        if let Some(load) = self.in_flight.take() {
            load.cancel.cancel();
            info!("Cancelled load of {}", load.url);
        }
    }

    pub fn in_flight_url(&self) -> Option<&str> {
        self.in_flight.as_ref().map(|load| load.url.as_str())
    }

    /// Take queued events belonging to the in-flight load; stale ones are dropped.
    fn drain_current(&mut self) -> Vec<FetchEvent> {
        let events = match self.queue.lock() {
            Ok(mut queue) => std::mem::take(&mut *queue),
            Err(_) => Vec::new(),
        };

        let Some(current) = self.in_flight.as_ref().map(|load| load.generation) else {
            return Vec::new();
        };
        events
            .into_iter()
            .filter_map(|(generation, event)| (generation == current).then_some(event))
            .collect()
    }

    fn finish(&mut self) -> Option<String> {
        self.in_flight.take().map(|load| load.url)
    }
}

/// Start loads for new requests. The current model is detached right away and
/// is not restored if the load fails.
pub fn begin_mesh_loads(
    mut requests: EventReader<LoadMeshRequest>,
    mut commands: Commands,
    mut session: ResMut<ViewportSession>,
    mut tracker: ResMut<MeshLoadTracker>,
    mut progress: ResMut<LoadProgress>,
    backend: Res<MeshFetchBackend>,
) {
    for request in requests.read() {
        if let Some(previous) = tracker.in_flight_url() {
            info!("Superseding load of {}", previous);
        }
        info!("Loading model from {}", request.url);
        detach_model(&mut commands, &mut session);

        let sink = tracker.start(&request.url);
        progress.begin(&request.url);
        backend.0.fetch(&request.url, sink);
    }
}

/// Drain transfer events for the in-flight load and apply their outcomes.
pub fn poll_mesh_loads(
    mut commands: Commands,
    mut tracker: ResMut<MeshLoadTracker>,
    mut session: ResMut<ViewportSession>,
    mut status: ResMut<StatusMessage>,
    mut progress: ResMut<LoadProgress>,
    mut controls: ResMut<OrbitControls>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut camera_query: Query<(&mut Transform, &Projection), With<ViewerCamera>>,
    config: Res<ViewerConfig>,
    mut redraw: EventWriter<RequestRedraw>,
    mut loaded: EventWriter<ModelLoaded>,
) {
    for event in tracker.drain_current() {
        match resolve_fetch_event(event) {
            LoadOutcome::Progress(percent) => {
                progress.percent = percent;
                status.set_text(loading_text(percent));
            }
            LoadOutcome::Success(model) => {
                let url = tracker.finish().unwrap_or_default();
                progress.finish();
                detach_model(&mut commands, &mut session);

                let Some(attached) =
                    attach_model(&mut commands, &mut meshes, &mut materials, &model, &url)
                else {
                    status.set(load_error_text("model has no geometry"), StatusTone::Error);
                    continue;
                };
                session.model = Some(attached.root);

                if let Ok((mut transform, projection)) = camera_query.single_mut() {
                    let fov = match projection {
                        Projection::Perspective(perspective) => perspective.fov,
                        _ => config.fov_radians(),
                    };
                    let framing = frame_bounds(&attached.bounds, fov, config.framing_padding);
                    *transform =
                        Transform::from_translation(framing.eye).looking_at(framing.target, Vec3::Y);
                    controls.reset_to(framing.target);
                    debug!(
                        "Camera framed at {:?} looking at {:?}",
                        framing.eye, framing.target
                    );
                }

                redraw.write(RequestRedraw);
                status.set(MODEL_DISPLAYED, StatusTone::Success);
                info!(
                    "✓ Model attached: {} nodes, {} triangles",
                    model.nodes.len(),
                    model.triangle_count()
                );
                if !model.material_libraries.is_empty() {
                    debug!(
                        "Material libraries {:?} ignored, flat material applied",
                        model.material_libraries
                    );
                }
                loaded.write(ModelLoaded {
                    url,
                    nodes: model.nodes.len(),
                    vertices: model.vertex_count(),
                    triangles: model.triangle_count(),
                    size: attached.bounds.size(),
                });
            }
            LoadOutcome::Failure(detail) => {
                let url = tracker.finish().unwrap_or_default();
                progress.finish();
                error!("Model load from {} failed: {}", url, detail);
                status.set(load_error_text(&detail), StatusTone::Error);
            }
        }
    }
}
