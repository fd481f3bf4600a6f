//! Native submission: no page form, so Enter posts the configured fields.

use std::collections::BTreeMap;

use bevy::prelude::*;
use bevy::tasks::IoTaskPool;
use serde_json::Value;

use super::controller::{
    SubmissionError, SubmissionEvent, SubmissionOutcome, SubmissionQueue, interpret_response,
};
use crate::engine::assets::viewer_config::ViewerConfig;

pub fn submit_on_enter(
    keyboard: Res<ButtonInput<KeyCode>>,
    config: Res<ViewerConfig>,
    queue: Res<SubmissionQueue>,
) {
    if !keyboard.just_pressed(KeyCode::Enter) {
        return;
    }

    queue.push(SubmissionEvent::Started);

    let url = config.generate_url();
    let fields = config.native_form_fields.clone();
    let queue = queue.clone();
    IoTaskPool::get()
        .spawn(async move {
            queue.push(SubmissionEvent::Finished(post_form(&url, &fields)));
        })
        .detach();
}

/// Blocking url-encoded `POST` of the form fields.
fn post_form(url: &str, fields: &BTreeMap<String, String>) -> SubmissionOutcome {
    let pairs: Vec<(&str, &str)> = fields
        .iter()
        .map(|(name, value)| (name.as_str(), value.as_str()))
        .collect();

    match ureq::post(url).send_form(&pairs) {
        Ok(response) => interpret_response(response.status(), read_json(response)),
        Err(ureq::Error::Status(code, response)) => interpret_response(code, read_json(response)),
        Err(err) => SubmissionOutcome::Failed(SubmissionError::Transport(err.to_string())),
    }
}

fn read_json(response: ureq::Response) -> Result<Value, String> {
    response.into_json::<Value>().map_err(|err| err.to_string())
}
