use bevy::diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::engine::assets::viewer_config::ViewerConfig;
use crate::engine::core::status::StatusMessage;
use crate::engine::loading::mesh_loader::{LoadMeshRequest, ModelLoaded};
use crate::engine::loading::progress::LoadProgress;
use crate::engine::scene::model::DisplayedModel;
use crate::engine::systems::shutdown::ShutdownRequest;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsValue;

#[cfg(target_arch = "wasm32")]
use web_sys::{MessageEvent, window};

/// JSON-RPC 2.0 request structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 response structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub result: Option<serde_json::Value>,
    pub error: Option<RpcError>,
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 notification structure for one-way communication.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcNotification {
    pub jsonrpc: String,
    pub method: String,
    pub params: serde_json::Value,
}

/// JSON-RPC error structure following specification.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

/// Resource managing bidirectional RPC communication with the embedding page.
/// Handles both request-response patterns and notification broadcasting.
#[derive(Resource, Default)]
pub struct WebRpcInterface {
    outgoing_notifications: Vec<RpcNotification>,
    outgoing_responses: Vec<RpcResponse>,
}

impl WebRpcInterface {
    /// Send notification to the embedding page without expecting response.
    pub fn send_notification(&mut self, method: &str, params: serde_json::Value) {
        self.outgoing_notifications.push(RpcNotification {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
        });
    }

    /// Queue response for transmission to the embedding page.
    fn queue_response(&mut self, response: RpcResponse) {
        self.outgoing_responses.push(response);
    }
}

/// Plugin establishing the WebRPC communication layer for embedded deployment.
pub struct WebRpcPlugin;

impl Plugin for WebRpcPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WebRpcInterface>()
            .add_event::<IncomingRpcMessage>()
            .add_systems(
                Update,
                (
                    process_incoming_messages,
                    handle_rpc_messages,
                    status_notification_system,
                    model_loaded_notification_system,
                    send_outgoing_messages,
                )
                    .chain(),
            );

        #[cfg(target_arch = "wasm32")]
        app.add_systems(Startup, setup_message_listener);
    }
}

#[cfg(target_arch = "wasm32")]
fn setup_message_listener(mut commands: Commands) {
    use std::sync::Arc;
    use std::sync::Mutex;

    // Thread-safe message queue for cross-thread communication.
    let message_queue: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let queue_clone = message_queue.clone();

    let closure = Closure::wrap(Box::new(move |event: MessageEvent| {
        // Filter messages to ensure they contain string data.
        if let Ok(data) = event.data().dyn_into::<js_sys::JsString>() {
            let message_str: String = data.into();

            if message_str.contains("jsonrpc") {
                if let Ok(mut queue) = queue_clone.lock() {
                    queue.push(message_str);
                }
            }
        }
    }) as Box<dyn FnMut(MessageEvent)>);

    if let Some(window) = window() {
        if let Err(e) =
            window.add_event_listener_with_callback("message", closure.as_ref().unchecked_ref())
        {
            error!("Failed to register message listener: {:?}", e);
        }
    }

    // Prevent closure from being dropped by transferring ownership to JS.
    closure.forget();
    commands.insert_resource(MessageQueue(message_queue));
}

/// Resource wrapping thread-safe message queue for WASM event handling.
#[derive(Resource)]
struct MessageQueue(std::sync::Arc<std::sync::Mutex<Vec<String>>>);

/// Event representing incoming RPC message from the embedding page.
#[derive(Event)]
struct IncomingRpcMessage {
    content: String,
}

fn process_incoming_messages(
    message_queue: Option<Res<MessageQueue>>,
    mut message_events: EventWriter<IncomingRpcMessage>,
) {
    let Some(queue_res) = message_queue else {
        return;
    };

    let messages = if let Ok(mut queue) = queue_res.0.lock() {
        std::mem::take(&mut *queue)
    } else {
        Vec::new()
    };

    for message_str in messages {
        message_events.write(IncomingRpcMessage {
            content: message_str,
        });
    }
}

/// Read-only viewer state visible to RPC handlers.
struct RpcContext<'a> {
    diagnostics: &'a DiagnosticsStore,
    status: &'a StatusMessage,
    progress: &'a LoadProgress,
    config: &'a ViewerConfig,
    model: Option<&'a DisplayedModel>,
}

fn handle_rpc_messages(
    mut events: EventReader<IncomingRpcMessage>,
    diagnostics: Res<DiagnosticsStore>,
    status: Res<StatusMessage>,
    progress: Res<LoadProgress>,
    config: Res<ViewerConfig>,
    models: Query<&DisplayedModel>,
    mut rpc_interface: ResMut<WebRpcInterface>,
    mut load_requests: EventWriter<LoadMeshRequest>,
    mut shutdown: EventWriter<ShutdownRequest>,
) {
    let context = RpcContext {
        diagnostics: &diagnostics,
        status: &status,
        progress: &progress,
        config: &config,
        model: models.iter().next(),
    };

    for event in events.read() {
        match serde_json::from_str::<RpcRequest>(&event.content) {
            Ok(request) => {
                debug!("Processing RPC method: {}", request.method);
                if let Some(response) =
                    handle_rpc_request(&request, &context, &mut load_requests, &mut shutdown)
                {
                    rpc_interface.queue_response(response);
                }
            }
            Err(parse_error) => {
                rpc_interface.send_notification(
                    "debug_message",
                    serde_json::json!({
                        "message": format!("Parse error: {}", parse_error)
                    }),
                );
            }
        }
    }
}

/// Handle individual RPC request and generate response based on method.
fn handle_rpc_request(
    request: &RpcRequest,
    context: &RpcContext,
    load_requests: &mut EventWriter<LoadMeshRequest>,
    shutdown: &mut EventWriter<ShutdownRequest>,
) -> Option<RpcResponse> {
    let result = match request.method.as_str() {
        "load_model" => handle_load_model(&request.params, context.config, load_requests),
        "get_status" => handle_get_status(context.status, context.progress, context.model),
        "get_fps" => handle_get_fps(context.diagnostics),
        "shutdown" => {
            shutdown.write(ShutdownRequest);
            Ok(serde_json::json!({ "success": true }))
        }
        _ => {
            warn!("Unknown RPC method: {}", request.method);
            let id = request.id.clone()?;
            return Some(create_error_response(
                id,
                -32601,
                "Method not found",
                Some(serde_json::json!({"method": request.method})),
            ));
        }
    };

    // Only generate responses for requests with IDs (notifications have no ID).
    let id = request.id.clone()?;

    match result {
        Ok(result_value) => Some(RpcResponse {
            jsonrpc: "2.0".to_string(),
            result: Some(result_value),
            error: None,
            id: Some(id),
        }),
        Err(error) => Some(RpcResponse {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(error),
            id: Some(id),
        }),
    }
}

/// Queue a mesh load. Relative paths resolve against the backend base URL.
fn handle_load_model(
    params: &serde_json::Value,
    config: &ViewerConfig,
    load_requests: &mut EventWriter<LoadMeshRequest>,
) -> Result<serde_json::Value, RpcError> {
    #[derive(serde::Deserialize)]
    struct LoadModelParams {
        url: String,
    }

    let load_params = serde_json::from_value::<LoadModelParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected 'url' parameter"))?;
    if load_params.url.trim().is_empty() {
        return Err(RpcError::invalid_params("'url' must not be empty"));
    }

    let url = config.model_url(&load_params.url);
    load_requests.write(LoadMeshRequest { url: url.clone() });
    info!("Model load requested via RPC: {}", url);

    Ok(serde_json::json!({
        "success": true,
        "url": url
    }))
}

fn handle_get_status(
    status: &StatusMessage,
    progress: &LoadProgress,
    model: Option<&DisplayedModel>,
) -> Result<serde_json::Value, RpcError> {
    let status_value = serde_json::to_value(status)
        .map_err(|e| RpcError::internal_error(&format!("Failed to serialise status: {}", e)))?;

    Ok(serde_json::json!({
        "status": status_value,
        "loading": progress.loading,
        "percent": progress.percent,
        "url": progress.url,
        "model": model.map(|model| {
            let size = model.bounds.size();
            serde_json::json!({
                "url": model.source_url,
                "size": [size.x, size.y, size.z],
                "center": model.bounds.center().to_array()
            })
        })
    }))
}

/// Handle FPS retrieval with diagnostic system integration.
fn handle_get_fps(diagnostics: &DiagnosticsStore) -> Result<serde_json::Value, RpcError> {
    let fps = diagnostics
        .get(&FrameTimeDiagnosticsPlugin::FPS)
        .and_then(|fps_diagnostic| fps_diagnostic.smoothed())
        .unwrap_or(0.0) as f32;

    Ok(serde_json::json!({
        "fps": fps
    }))
}

/// Push the status line to the page whenever it changes.
fn status_notification_system(
    status: Res<StatusMessage>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    if !status.is_changed() || status.is_added() {
        return;
    }

    rpc_interface.send_notification(
        "status_changed",
        serde_json::json!({
            "text": status.text,
            "tone": status.tone
        }),
    );
}

fn model_loaded_notification_system(
    mut loaded: EventReader<ModelLoaded>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    for model in loaded.read() {
        rpc_interface.send_notification(
            "model_loaded",
            serde_json::json!({
                "url": model.url,
                "nodes": model.nodes,
                "vertices": model.vertices,
                "triangles": model.triangles,
                "size": [model.size.x, model.size.y, model.size.z]
            }),
        );
    }
}

/// Create standardised error response with optional data payload.
fn create_error_response(
    id: serde_json::Value,
    code: i32,
    message: &str,
    data: Option<serde_json::Value>,
) -> RpcResponse {
    RpcResponse {
        jsonrpc: "2.0".to_string(),
        result: None,
        error: Some(RpcError {
            code,
            message: message.to_string(),
            data,
        }),
        id: Some(id),
    }
}

/// Send queued notifications and responses to the embedding page.
fn send_outgoing_messages(mut rpc_interface: ResMut<WebRpcInterface>) {
    // Send notifications first.
    for notification in rpc_interface.outgoing_notifications.drain(..) {
        send_message_to_parent(&notification);
    }

    // Send responses second to maintain order.
    for response in rpc_interface.outgoing_responses.drain(..) {
        send_message_to_parent(&response);
    }
}

/// Send serialised message to the parent window.
fn send_message_to_parent<T: Serialize>(message: &T) {
    #[cfg(target_arch = "wasm32")]
    {
        match serde_json::to_string(message) {
            Ok(json) => {
                if let Some(window) = window() {
                    if let Some(parent) = window.parent().ok().flatten() {
                        if let Err(e) = parent.post_message(&JsValue::from_str(&json), "*") {
                            error!("Failed to send message to parent: {:?}", e);
                        }
                    } else {
                        warn!("No parent window available for message transmission");
                    }
                } else {
                    error!("Window object not available");
                }
            }
            Err(e) => {
                error!("Failed to serialise message: {}", e);
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        // No-op for non-WASM targets.
        let _ = message;
    }
}

/// Standard RPC error codes and constructors.
impl RpcError {
    pub fn invalid_params(message: &str) -> Self {
        Self {
            code: -32602,
            message: message.to_string(),
            data: None,
        }
    }

    pub fn internal_error(message: &str) -> Self {
        Self {
            code: -32603,
            message: message.to_string(),
            data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::engine::core::status::StatusTone;

    fn rpc_app() -> (App, Arc<Mutex<Vec<String>>>) {
        let queue = Arc::new(Mutex::new(Vec::new()));
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .init_resource::<DiagnosticsStore>()
            .init_resource::<StatusMessage>()
            .init_resource::<LoadProgress>()
            .init_resource::<ViewerConfig>()
            .init_resource::<WebRpcInterface>()
            .insert_resource(MessageQueue(queue.clone()))
            .add_event::<IncomingRpcMessage>()
            .add_event::<LoadMeshRequest>()
            .add_event::<ModelLoaded>()
            .add_event::<ShutdownRequest>()
            .add_systems(
                Update,
                (
                    process_incoming_messages,
                    handle_rpc_messages,
                    status_notification_system,
                    model_loaded_notification_system,
                )
                    .chain(),
            );
        (app, queue)
    }

    fn call(app: &mut App, queue: &Arc<Mutex<Vec<String>>>, message: serde_json::Value) {
        queue.lock().unwrap().push(message.to_string());
        app.update();
    }

    fn take_responses(app: &mut App) -> Vec<RpcResponse> {
        std::mem::take(
            &mut app
                .world_mut()
                .resource_mut::<WebRpcInterface>()
                .outgoing_responses,
        )
    }

    fn take_notifications(app: &mut App) -> Vec<RpcNotification> {
        std::mem::take(
            &mut app
                .world_mut()
                .resource_mut::<WebRpcInterface>()
                .outgoing_notifications,
        )
    }

    #[test]
    fn load_model_resolves_relative_url() {
        let (mut app, queue) = rpc_app();
        call(
            &mut app,
            &queue,
            serde_json::json!({
                "jsonrpc": "2.0",
                "method": "load_model",
                "params": { "url": "/generated_models/mock_cube.obj" },
                "id": 1
            }),
        );

        let responses = take_responses(&mut app);
        assert_eq!(responses.len(), 1);
        let result = responses[0].result.as_ref().unwrap();
        assert_eq!(
            result["url"],
            "http://127.0.0.1:8000/generated_models/mock_cube.obj"
        );

        let requests = app.world().resource::<Events<LoadMeshRequest>>();
        let urls: Vec<_> = requests
            .iter_current_update_events()
            .map(|request| request.url.clone())
            .collect();
        assert_eq!(
            urls,
            vec!["http://127.0.0.1:8000/generated_models/mock_cube.obj".to_string()]
        );
    }

    #[test]
    fn load_model_without_url_is_invalid_params() {
        let (mut app, queue) = rpc_app();
        call(
            &mut app,
            &queue,
            serde_json::json!({
                "jsonrpc": "2.0",
                "method": "load_model",
                "params": {},
                "id": "a"
            }),
        );

        let responses = take_responses(&mut app);
        assert_eq!(responses[0].error.as_ref().unwrap().code, -32602);
        assert!(
            app.world()
                .resource::<Events<LoadMeshRequest>>()
                .is_empty()
        );
    }

    #[test]
    fn unknown_method_is_reported() {
        let (mut app, queue) = rpc_app();
        call(
            &mut app,
            &queue,
            serde_json::json!({ "jsonrpc": "2.0", "method": "explode", "id": 3 }),
        );

        let responses = take_responses(&mut app);
        assert_eq!(responses[0].error.as_ref().unwrap().code, -32601);
    }

    #[test]
    fn shutdown_notification_needs_no_id() {
        let (mut app, queue) = rpc_app();
        call(
            &mut app,
            &queue,
            serde_json::json!({ "jsonrpc": "2.0", "method": "shutdown" }),
        );

        assert!(take_responses(&mut app).is_empty());
        assert!(
            !app.world()
                .resource::<Events<ShutdownRequest>>()
                .is_empty()
        );
    }

    #[test]
    fn get_status_reports_message_and_progress() {
        let (mut app, queue) = rpc_app();
        app.update();
        app.world_mut()
            .resource_mut::<StatusMessage>()
            .set("Loading 3D model: 40%", StatusTone::Info);
        app.world_mut()
            .resource_mut::<LoadProgress>()
            .begin("http://127.0.0.1:8000/a.obj");

        call(
            &mut app,
            &queue,
            serde_json::json!({ "jsonrpc": "2.0", "method": "get_status", "id": 9 }),
        );

        let responses = take_responses(&mut app);
        let result = responses[0].result.as_ref().unwrap();
        assert_eq!(result["status"]["text"], "Loading 3D model: 40%");
        assert_eq!(result["status"]["tone"], "info");
        assert_eq!(result["loading"], true);
        assert!(result["model"].is_null());

        let notifications = take_notifications(&mut app);
        assert!(
            notifications
                .iter()
                .any(|notification| notification.method == "status_changed")
        );
    }

    #[test]
    fn get_status_describes_displayed_model() {
        let (mut app, queue) = rpc_app();
        app.world_mut().spawn(DisplayedModel {
            source_url: "http://127.0.0.1:8000/generated_models/mock_cube.obj".to_string(),
            bounds: crate::engine::assets::bounds::ModelBounds {
                min: Vec3::splat(-0.5),
                max: Vec3::splat(0.5),
            },
        });

        call(
            &mut app,
            &queue,
            serde_json::json!({ "jsonrpc": "2.0", "method": "get_status", "id": 10 }),
        );

        let responses = take_responses(&mut app);
        let model = &responses[0].result.as_ref().unwrap()["model"];
        assert_eq!(
            model["url"],
            "http://127.0.0.1:8000/generated_models/mock_cube.obj"
        );
        assert_eq!(model["size"], serde_json::json!([1.0, 1.0, 1.0]));
        assert_eq!(model["center"], serde_json::json!([0.0, 0.0, 0.0]));
    }

    #[test]
    fn model_loaded_is_forwarded() {
        let (mut app, _queue) = rpc_app();
        app.world_mut().send_event(ModelLoaded {
            url: "cube.obj".to_string(),
            nodes: 1,
            vertices: 8,
            triangles: 12,
            size: Vec3::ONE,
        });
        app.update();

        let notifications = take_notifications(&mut app);
        let loaded = notifications
            .iter()
            .find(|notification| notification.method == "model_loaded")
            .unwrap();
        assert_eq!(loaded.params["triangles"], 12);
    }
}
