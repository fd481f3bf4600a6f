/// Host serving both the generation endpoint and the generated meshes.
pub const DEFAULT_BACKEND_BASE_URL: &str = "http://127.0.0.1:8000";

/// Route accepting the multipart model-generation form.
pub const GENERATE_MODEL_ROUTE: &str = "/generate-model/";

/// JSON fields read from the generation response.
pub const MODEL_URL_FIELD: &str = "generated_model_url";
pub const MESSAGE_FIELD: &str = "message";
pub const ERROR_DETAIL_FIELD: &str = "detail";
