use std::collections::BTreeMap;

use bevy::prelude::*;
use constants::backend::{DEFAULT_BACKEND_BASE_URL, GENERATE_MODEL_ROUTE};
use constants::page::{FORM_ELEMENT_ID, STATUS_ELEMENT_ID};
use constants::render_settings::{CAMERA_FOV_DEGREES, FRAMING_PADDING, ORBIT_DAMPING_FACTOR};
use serde::{Deserialize, Serialize};

/// Runtime viewer configuration. Loaded from JSON as a Bevy asset; every
/// field falls back to the compiled-in default when absent.
#[derive(Asset, Resource, Debug, Clone, PartialEq, Serialize, Deserialize, TypePath)]
#[serde(default)]
pub struct ViewerConfig {
    pub backend_base_url: String,
    pub generate_route: String,
    pub form_element_id: String,
    pub status_element_id: String,
    /// Hex colour, e.g. `#333333`.
    pub background_colour: String,
    pub field_of_view_degrees: f32,
    pub framing_padding: f32,
    pub damping_factor: f32,
    /// Fields submitted by the native build, which has no page form.
    pub native_form_fields: BTreeMap<String, String>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            backend_base_url: DEFAULT_BACKEND_BASE_URL.to_string(),
            generate_route: GENERATE_MODEL_ROUTE.to_string(),
            form_element_id: FORM_ELEMENT_ID.to_string(),
            status_element_id: STATUS_ELEMENT_ID.to_string(),
            background_colour: "#333333".to_string(),
            field_of_view_degrees: CAMERA_FOV_DEGREES,
            framing_padding: FRAMING_PADDING,
            damping_factor: ORBIT_DAMPING_FACTOR,
            native_form_fields: BTreeMap::new(),
        }
    }
}

impl ViewerConfig {
    /// Full URL of the model-generation endpoint.
    pub fn generate_url(&self) -> String {
        join_url(&self.backend_base_url, &self.generate_route)
    }

    /// Resolve the model reference returned by the backend. Absolute URLs are
    /// used as-is, paths are joined onto the backend base.
    pub fn model_url(&self, reference: &str) -> String {
        if reference.starts_with("http://") || reference.starts_with("https://") {
            reference.to_string()
        } else {
            join_url(&self.backend_base_url, reference)
        }
    }

    /// Parsed background colour, or `None` when the hex string is invalid.
    pub fn background(&self) -> Option<Color> {
        Srgba::hex(&self.background_colour).ok().map(Color::from)
    }

    pub fn fov_radians(&self) -> f32 {
        self.field_of_view_degrees.to_radians()
    }
}

fn join_url(base: &str, path: &str) -> String {
    match (base.ends_with('/'), path.starts_with('/')) {
        (true, true) => format!("{}{}", base, &path[1..]),
        (false, false) => format!("{}/{}", base, path),
        _ => format!("{}{}", base, path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_model_path_joins_backend_base() {
        let config = ViewerConfig::default();
        assert_eq!(
            config.model_url("/generated_models/mock_cube.obj"),
            "http://127.0.0.1:8000/generated_models/mock_cube.obj"
        );
        assert_eq!(
            config.generate_url(),
            "http://127.0.0.1:8000/generate-model/"
        );
    }

    #[test]
    fn absolute_model_url_is_kept() {
        let config = ViewerConfig::default();
        let url = "https://cdn.example.com/models/a.obj";
        assert_eq!(config.model_url(url), url);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: ViewerConfig =
            serde_json::from_str(r#"{ "backend_base_url": "http://models.local/" }"#).unwrap();

        assert_eq!(config.generate_url(), "http://models.local/generate-model/");
        assert_eq!(config.field_of_view_degrees, CAMERA_FOV_DEGREES);
        assert!(config.native_form_fields.is_empty());
    }

    #[test]
    fn background_parses_hex() {
        let mut config = ViewerConfig::default();
        assert!(config.background().is_some());

        config.background_colour = "not-a-colour".to_string();
        assert!(config.background().is_none());
    }
}
