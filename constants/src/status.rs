pub const SUBMITTING: &str = "Generating model... Please wait.";
pub const MODEL_DISPLAYED: &str = "Model generated and displayed!";
pub const MISSING_MODEL_URL: &str = "Model generation complete, but no model URL provided.";
pub const LOADING_UNKNOWN_SIZE: &str = "Loading 3D model...";

pub const LOADING_PREFIX: &str = "Loading 3D model";
pub const LOAD_ERROR_PREFIX: &str = "Error loading 3D model";
pub const SUBMIT_ERROR_PREFIX: &str = "Error generating model";

/// CSS colours for each status tone.
pub const INFO_CSS: &str = "#007bff";
pub const SUCCESS_CSS: &str = "green";
pub const WARNING_CSS: &str = "orange";
pub const ERROR_CSS: &str = "red";
