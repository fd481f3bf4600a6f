//! Form submission to the model-generation backend.
//!
//! The request itself runs outside the schedule (a `spawn_local` future on
//! WASM, an I/O task natively) and reports through `SubmissionQueue`. This
//! module turns those reports into status updates and mesh load requests.

use std::sync::{Arc, Mutex};

use bevy::prelude::*;
use constants::backend::{ERROR_DETAIL_FIELD, MESSAGE_FIELD, MODEL_URL_FIELD};
use constants::status::{MISSING_MODEL_URL, SUBMITTING};
use serde_json::Value;
use thiserror::Error;

use crate::engine::assets::viewer_config::ViewerConfig;
use crate::engine::core::status::{StatusMessage, StatusTone, submit_error_text};
use crate::engine::loading::mesh_loader::LoadMeshRequest;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SubmissionError {
    /// Backend rejected the request and gave no `detail`.
    #[error("HTTP error! status: {0}")]
    Status(u16),
    /// Backend-provided error detail.
    #[error("{0}")]
    Rejected(String),
    #[error("{0}")]
    Transport(String),
    #[error("invalid JSON response: {0}")]
    InvalidResponse(String),
}

/// How a finished submission ended.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionOutcome {
    /// The backend produced a model; holds the reference it returned.
    ModelReady(String),
    /// Success without a model reference; holds the message to show.
    NoModel(String),
    Failed(SubmissionError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionEvent {
    Started,
    Finished(SubmissionOutcome),
}

/// Shared queue between request tasks and the schedule.
#[derive(Resource, Debug, Clone, Default)]
pub struct SubmissionQueue(Arc<Mutex<Vec<SubmissionEvent>>>);

impl SubmissionQueue {
    pub fn push(&self, event: SubmissionEvent) {
        if let Ok(mut queue) = self.0.lock() {
            queue.push(event);
        }
    }

    fn drain(&self) -> Vec<SubmissionEvent> {
        match self.0.lock() {
            Ok(mut queue) => std::mem::take(&mut *queue),
            Err(_) => Vec::new(),
        }
    }
}

/// Interpret the backend's reply. `body` is the parsed JSON body, or the
/// parse error when the body was not JSON.
pub fn interpret_response(status: u16, body: Result<Value, String>) -> SubmissionOutcome {
    if !(200..300).contains(&status) {
        let detail = body.ok().and_then(|value| match value.get(ERROR_DETAIL_FIELD) {
            Some(Value::String(detail)) if !detail.is_empty() => Some(detail.clone()),
            Some(Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        });
        return SubmissionOutcome::Failed(match detail {
            Some(detail) => SubmissionError::Rejected(detail),
            None => SubmissionError::Status(status),
        });
    }

    let body = match body {
        Ok(body) => body,
        Err(err) => return SubmissionOutcome::Failed(SubmissionError::InvalidResponse(err)),
    };

    match body.get(MODEL_URL_FIELD).and_then(Value::as_str) {
        Some(reference) if !reference.is_empty() => {
            SubmissionOutcome::ModelReady(reference.to_string())
        }
        _ => {
            let message = body
                .get(MESSAGE_FIELD)
                .and_then(Value::as_str)
                .filter(|message| !message.is_empty())
                .unwrap_or(MISSING_MODEL_URL);
            SubmissionOutcome::NoModel(message.to_string())
        }
    }
}

/// Apply submission reports in arrival order.
pub fn handle_submission_events(
    queue: Res<SubmissionQueue>,
    config: Res<ViewerConfig>,
    mut status: ResMut<StatusMessage>,
    mut load_requests: EventWriter<LoadMeshRequest>,
) {
    for event in queue.drain() {
        match event {
            SubmissionEvent::Started => {
                status.set(SUBMITTING, StatusTone::Info);
            }
            SubmissionEvent::Finished(SubmissionOutcome::ModelReady(reference)) => {
                let url = config.model_url(&reference);
                info!("Backend generated model at {}", url);
                load_requests.write(LoadMeshRequest { url });
            }
            SubmissionEvent::Finished(SubmissionOutcome::NoModel(message)) => {
                warn!("Backend response missing {}", MODEL_URL_FIELD);
                status.set(message, StatusTone::Warning);
            }
            SubmissionEvent::Finished(SubmissionOutcome::Failed(err)) => {
                error!("Model generation request failed: {}", err);
                status.set(submit_error_text(&err.to_string()), StatusTone::Error);
            }
        }
    }
}
