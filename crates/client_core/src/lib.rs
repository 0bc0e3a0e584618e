use std::sync::{Arc, Mutex, PoisonError};

use reqwest::{
    multipart::{Form, Part},
    Client, StatusCode,
};
use shared::{
    domain::ClassificationResult,
    error::{ApiError, ApiException, ErrorCode},
    protocol::{DEFAULT_IMAGE_MIME_TYPE, IMAGE_FIELD_NAME},
};
use tracing::{error, info};
use url::Url;

pub mod config;
pub mod error;
pub mod render;
pub mod surface;

pub use config::ClassifierConfig;
pub use error::ClassifyError;
pub use surface::{
    Alert, FileInput, FileSlot, MemoryRegion, OutputRegion, RecordedAlerts, SelectedFile,
};

pub const NO_FILE_WARNING: &str = "Please select an image file.";
const MAX_REJECTION_BODY_CHARS: usize = 200;

/// Everything the handler reads from or writes to.
#[derive(Clone)]
pub struct Surfaces {
    pub input: Arc<dyn FileInput>,
    pub description: Arc<dyn OutputRegion>,
    pub video_link: Arc<dyn OutputRegion>,
    pub alert: Arc<dyn Alert>,
}

/// Uploads the selected image to the classification endpoint and renders the
/// answer.
///
/// Each [`trigger`](Self::trigger) is independent. Overlapping triggers are
/// not de-duplicated; whichever response resolves last owns both regions.
#[derive(Clone)]
pub struct UploadAndClassify {
    http: Client,
    endpoint: Url,
    surfaces: Surfaces,
    render_lock: Arc<Mutex<()>>,
}

impl UploadAndClassify {
    pub fn new(config: &ClassifierConfig, surfaces: Surfaces) -> Result<Self, ClassifyError> {
        let endpoint = config.endpoint()?;
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            endpoint,
            surfaces,
            render_lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Runs one upload-and-classify interaction.
    ///
    /// Without a selected file the user is warned and nothing is sent. Request
    /// and parse failures are logged and returned, but never shown to the user
    /// and never touch the output regions.
    pub async fn trigger(&self) -> Result<ClassificationResult, ClassifyError> {
        let Some(file) = self.surfaces.input.selected_file() else {
            self.surfaces.alert.alert(NO_FILE_WARNING);
            return Err(ClassifyError::NoFileSelected);
        };

        match self.submit(&file).await {
            Ok(result) => {
                self.render(&result);
                Ok(result)
            }
            Err(error) => {
                error!(
                    endpoint = %self.endpoint,
                    file_name = %file.file_name,
                    %error,
                    "classification failed"
                );
                Err(error)
            }
        }
    }

    /// Sends `file` as the single `image` part of a multipart POST.
    pub async fn submit(&self, file: &SelectedFile) -> Result<ClassificationResult, ClassifyError> {
        info!(
            endpoint = %self.endpoint,
            file_name = %file.file_name,
            size_bytes = file.size_bytes(),
            "uploading image for classification"
        );

        let part = Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(
                file.mime_type
                    .as_deref()
                    .unwrap_or(DEFAULT_IMAGE_MIME_TYPE),
            )?;
        let form = Form::new().part(IMAGE_FIELD_NAME, part);

        let response = self
            .http
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            return Err(rejection(status, &body));
        }
        Ok(serde_json::from_slice(&body)?)
    }

    fn render(&self, result: &ClassificationResult) {
        let _guard = self
            .render_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        self.surfaces
            .description
            .replace(&render::description_markup(&result.description));
        self.surfaces
            .video_link
            .replace(&render::video_link_markup(result.video_link.as_deref()));
    }
}

fn rejection(status: StatusCode, body: &[u8]) -> ClassifyError {
    let source = match serde_json::from_slice::<ApiError>(body) {
        Ok(api_error) => ApiException::from(api_error),
        Err(_) => {
            let text: String = String::from_utf8_lossy(body)
                .chars()
                .take(MAX_REJECTION_BODY_CHARS)
                .collect();
            ApiException::new(ErrorCode::Upstream, text)
        }
    };

    ClassifyError::Rejected {
        status: status.as_u16(),
        source,
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
