/// Route served by the classification service.
pub const CLASSIFY_PATH: &str = "/classify";

/// Multipart field carrying the uploaded image.
pub const IMAGE_FIELD_NAME: &str = "image";

/// Public deployment of the classification service.
pub const DEFAULT_ENDPOINT_URL: &str =
    "https://gym-classifier-76781534fd77.herokuapp.com/classify";

pub const DEFAULT_IMAGE_MIME_TYPE: &str = "application/octet-stream";
