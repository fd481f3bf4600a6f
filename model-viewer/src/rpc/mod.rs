//! JSON-RPC 2.0 communication layer for the embedding page.
//!
//! Implements bidirectional messaging between the Bevy viewer and a parent
//! window via postMessage, supporting both request-response and notification
//! patterns.
//!
//! ## Message Flow
//!
//! ```text
//! Parent window  <──postMessage──>  Viewer (iframe)
//!        │                                │
//!        ├─ Request (with ID) ──────────> │
//!        │                                ├─ Process request
//!        │ <───────── Response (with ID) ─┤
//!        │                                │
//!        │ <──── Notification (no ID) ────┤
//! ```
//!
//! ## Error Handling
//!
//! Standard JSON-RPC 2.0 error codes:
//! - `-32601`: Method not found
//! - `-32602`: Invalid params
//! - `-32603`: Internal error
//!
//! ## Methods
//!
//! - `load_model {url}`: Replace the displayed model. Relative paths resolve
//!   against the backend base URL
//! - `get_status`: Current status line, load progress and displayed model
//! - `get_fps`: Retrieve current frame rate
//! - `shutdown`: Cancel loads, release the model and stop the viewer
//!
//! ## Notifications
//!
//! - `status_changed {text, tone}`
//! - `model_loaded {url, nodes, vertices, triangles, size}`
//! - `debug_message {message}`: Unparsable incoming messages

/// JSON-RPC 2.0 bidirectional communication system for page integration.
///
/// Handles request-response patterns, notifications, and WASM message listeners.
pub mod web_rpc;
