/// Canvas the WASM build renders into, nested in the viewer container.
pub const CANVAS_SELECTOR: &str = "#modelViewer canvas";

pub const FORM_ELEMENT_ID: &str = "modelForm";
pub const STATUS_ELEMENT_ID: &str = "responseMessage";

/// Runtime configuration asset, relative to the asset root.
pub const VIEWER_CONFIG_PATH: &str = "viewer.config.json";
