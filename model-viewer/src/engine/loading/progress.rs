use bevy::prelude::*;

/// Progress of the current mesh load, reported to the embedding page.
#[derive(Resource, Debug, Default, Clone, PartialEq)]
pub struct LoadProgress {
    pub url: Option<String>,
    pub percent: Option<u32>,
    pub loading: bool,
}

impl LoadProgress {
    pub fn begin(&mut self, url: &str) {
        self.url = Some(url.to_string());
        self.percent = None;
        self.loading = true;
    }

    pub fn finish(&mut self) {
        self.loading = false;
    }
}
