use bevy::prelude::*;
use constants::status::{
    ERROR_CSS, INFO_CSS, LOAD_ERROR_PREFIX, LOADING_PREFIX, LOADING_UNKNOWN_SIZE, SUBMIT_ERROR_PREFIX,
    SUCCESS_CSS, WARNING_CSS,
};
use serde::Serialize;

/// Colour class of the status line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusTone {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

impl StatusTone {
    pub fn css_colour(self) -> &'static str {
        match self {
            StatusTone::Info => INFO_CSS,
            StatusTone::Success => SUCCESS_CSS,
            StatusTone::Warning => WARNING_CSS,
            StatusTone::Error => ERROR_CSS,
        }
    }

    /// Overlay colour for the native build.
    pub fn colour(self) -> Color {
        match self {
            StatusTone::Info => Color::srgb_u8(0x00, 0x7b, 0xff),
            StatusTone::Success => Color::srgb(0.0, 0.5, 0.0),
            StatusTone::Warning => Color::srgb(1.0, 0.65, 0.0),
            StatusTone::Error => Color::srgb(1.0, 0.0, 0.0),
        }
    }
}

/// The single user-facing status line, reused for progress, success,
/// warnings and errors.
#[derive(Resource, Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatusMessage {
    pub text: String,
    pub tone: StatusTone,
}

impl StatusMessage {
    pub fn set(&mut self, text: impl Into<String>, tone: StatusTone) {
        self.text = text.into();
        self.tone = tone;
    }

    /// Replace the text and keep the current tone.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }
}

/// Whole percent loaded, or `None` when the total size is unknown.
pub fn progress_percent(loaded: u64, total: Option<u64>) -> Option<u32> {
    match total {
        Some(total) if total > 0 => Some((loaded as f64 / total as f64 * 100.0).round() as u32),
        _ => None,
    }
}

pub fn loading_text(percent: Option<u32>) -> String {
    match percent {
        Some(percent) => format!("{}: {}%", LOADING_PREFIX, percent),
        None => LOADING_UNKNOWN_SIZE.to_string(),
    }
}

pub fn load_error_text(detail: &str) -> String {
    format!("{}: {}", LOAD_ERROR_PREFIX, detail)
}

pub fn submit_error_text(detail: &str) -> String {
    format!("{}: {}", SUBMIT_ERROR_PREFIX, detail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_rounds_to_nearest() {
        assert_eq!(progress_percent(1, Some(3)), Some(33));
        assert_eq!(progress_percent(2, Some(3)), Some(67));
        assert_eq!(progress_percent(512, Some(512)), Some(100));
        assert_eq!(progress_percent(10, None), None);
        assert_eq!(progress_percent(10, Some(0)), None);
    }

    #[test]
    fn status_strings() {
        assert_eq!(loading_text(Some(42)), "Loading 3D model: 42%");
        assert_eq!(loading_text(None), "Loading 3D model...");
        assert_eq!(
            submit_error_text("bad input"),
            "Error generating model: bad input"
        );
        assert_eq!(
            load_error_text("HTTP status 404"),
            "Error loading 3D model: HTTP status 404"
        );
    }

    #[test]
    fn set_text_keeps_tone() {
        let mut status = StatusMessage::default();
        status.set("Generating model... Please wait.", StatusTone::Info);
        status.set_text(loading_text(Some(50)));

        assert_eq!(status.tone, StatusTone::Info);
        assert_eq!(status.text, "Loading 3D model: 50%");
        assert_eq!(StatusTone::Success.css_colour(), "green");
    }
}
