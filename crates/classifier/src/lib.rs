use std::sync::Arc;

use shared::{
    domain::{ClassificationResult, ImageUpload},
    error::{ApiError, ErrorCode},
};
use tracing::{info, warn};

pub mod equipment;
pub mod imaging;
pub mod video;
pub mod vision;

pub use equipment::extract_equipment_name;
pub use video::{VideoLookup, VideoSearch, YouTubeSearch};
pub use vision::{MissingVisionDescriber, OpenAiDescriber, VisionDescriber};

/// Collaborators used to answer a classification request.
#[derive(Clone)]
pub struct ClassifierContext {
    pub describer: Arc<dyn VisionDescriber>,
    pub videos: Arc<dyn VideoSearch>,
}

/// Describes the uploaded equipment and attaches a short tutorial video.
pub async fn classify_upload(
    ctx: &ClassifierContext,
    upload: &ImageUpload,
) -> Result<ClassificationResult, ApiError> {
    let bytes = upload.bytes.clone();
    let prepared = tokio::task::spawn_blocking(move || imaging::prepare_for_vision(&bytes))
        .await
        .map_err(|e| ApiError::new(ErrorCode::Internal, e.to_string()))?
        .map_err(|error| {
            warn!(file_name = %upload.file_name, %error, "rejected upload");
            ApiError::validation("invalid image file")
        })?;

    let description = ctx
        .describer
        .describe(&prepared)
        .await
        .map_err(upstream)?;

    let equipment = extract_equipment_name(&description);
    let lookup = ctx
        .videos
        .find_tutorial(&format!("{equipment} gym tutorial"))
        .await;
    info!(
        file_name = %upload.file_name,
        %equipment,
        video_found = lookup.is_found(),
        "classified upload"
    );

    Ok(ClassificationResult {
        description,
        video_link: Some(lookup.into_link_text()),
    })
}

fn upstream(err: anyhow::Error) -> ApiError {
    let message = format!("{err:#}");
    warn!(error = %message, "vision model call failed");
    ApiError::new(ErrorCode::Upstream, message)
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
