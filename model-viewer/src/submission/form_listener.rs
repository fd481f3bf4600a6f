//! Page form integration for the WASM build.

use std::sync::{Arc, Mutex};

use bevy::prelude::*;
use gloo_net::http::Request;
use serde_json::Value;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{FormData, HtmlFormElement};

use super::controller::{
    SubmissionError, SubmissionEvent, SubmissionOutcome, SubmissionQueue, interpret_response,
};
use crate::engine::assets::viewer_config::ViewerConfig;

/// Endpoint the submit handler posts to. Shared with the listener closure so
/// a late config load still takes effect.
#[derive(Resource, Clone)]
pub struct SubmitEndpoint(Arc<Mutex<String>>);

impl SubmitEndpoint {
    fn current(&self) -> String {
        self.0.lock().map(|url| url.clone()).unwrap_or_default()
    }
}

/// Attach the submit handler to the page form. A missing form is logged and
/// submission stays unavailable.
pub fn attach_form_listener(
    mut commands: Commands,
    config: Res<ViewerConfig>,
    queue: Res<SubmissionQueue>,
) {
    let endpoint = SubmitEndpoint(Arc::new(Mutex::new(config.generate_url())));
    commands.insert_resource(endpoint.clone());

    let form = web_sys::window()
        .and_then(|window| window.document())
        .and_then(|document| document.get_element_by_id(&config.form_element_id))
        .and_then(|element| element.dyn_into::<HtmlFormElement>().ok());
    let Some(form) = form else {
        error!(
            "Form element #{} not found, submission handler not attached",
            config.form_element_id
        );
        return;
    };

    let queue = queue.clone();
    let submitted_form = form.clone();
    let closure = Closure::wrap(Box::new(move |event: web_sys::Event| {
        event.prevent_default();
        queue.push(SubmissionEvent::Started);

        let form_data = match FormData::new_with_form(&submitted_form) {
            Ok(form_data) => form_data,
            Err(e) => {
                queue.push(SubmissionEvent::Finished(SubmissionOutcome::Failed(
                    SubmissionError::Transport(format!("{:?}", e)),
                )));
                return;
            }
        };

        let url = endpoint.current();
        let queue = queue.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let outcome = post_form(&url, form_data).await;
            queue.push(SubmissionEvent::Finished(outcome));
        });
    }) as Box<dyn FnMut(web_sys::Event)>);

    if let Err(e) = form.add_event_listener_with_callback("submit", closure.as_ref().unchecked_ref())
    {
        error!("Failed to register submit listener: {:?}", e);
        return;
    }

    closure.forget();
    info!("Submit handler attached to #{}", config.form_element_id);
}

/// Keep the shared endpoint in step with the loaded config.
pub fn update_submit_endpoint(config: Res<ViewerConfig>, endpoint: Option<Res<SubmitEndpoint>>) {
    if !config.is_changed() {
        return;
    }
    if let Some(endpoint) = endpoint {
        if let Ok(mut url) = endpoint.0.lock() {
            *url = config.generate_url();
        }
    }
}

/// One multipart `POST` of the form fields, file inputs included.
async fn post_form(url: &str, form_data: FormData) -> SubmissionOutcome {
    let request = match Request::post(url).body(form_data) {
        Ok(request) => request,
        Err(err) => return SubmissionOutcome::Failed(SubmissionError::Transport(err.to_string())),
    };

    match request.send().await {
        Ok(response) => {
            let body = response.json::<Value>().await.map_err(|err| err.to_string());
            interpret_response(response.status(), body)
        }
        Err(err) => SubmissionOutcome::Failed(SubmissionError::Transport(err.to_string())),
    }
}
