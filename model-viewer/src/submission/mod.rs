//! Model-generation form submission.
//!
//! Collects the form, posts it to the backend and hands any returned model to
//! the mesh loader. On WASM the page's form drives submission; natively the
//! Enter key submits the fields from `viewer.config.json`.

use bevy::prelude::*;

use crate::engine::core::app_state::ViewerState;

/// Response interpretation and the system applying submission results.
pub mod controller;

/// Submit listener on the page form.
#[cfg(target_arch = "wasm32")]
pub mod form_listener;

/// Keyboard-triggered submission for native builds.
#[cfg(not(target_arch = "wasm32"))]
pub mod native;

pub struct SubmissionPlugin;

impl Plugin for SubmissionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<controller::SubmissionQueue>().add_systems(
            Update,
            controller::handle_submission_events.run_if(in_state(ViewerState::Ready)),
        );

        #[cfg(target_arch = "wasm32")]
        app.add_systems(Startup, form_listener::attach_form_listener)
            .add_systems(Update, form_listener::update_submit_endpoint);

        #[cfg(not(target_arch = "wasm32"))]
        app.add_systems(
            Update,
            native::submit_on_enter.run_if(in_state(ViewerState::Ready)),
        );
    }
}
