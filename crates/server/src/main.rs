use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, State},
    http::{HeaderValue, Method, StatusCode},
    routing::{get, post},
    Json, Router,
};
use classifier::{
    classify_upload, ClassifierContext, MissingVisionDescriber, OpenAiDescriber, VisionDescriber,
    YouTubeSearch,
};
use shared::{
    domain::{ClassificationResult, ImageUpload},
    error::{ApiError, ErrorCode},
    protocol::{CLASSIFY_PATH, IMAGE_FIELD_NAME},
};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

mod app_state;
mod config;

use app_state::AppState;
use config::{load_settings, Settings};

type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let settings = load_settings();
    let state = AppState {
        classifier: build_classifier(&settings),
        allowed_origin: settings.allowed_origin.clone(),
        max_upload_bytes: settings.max_upload_bytes,
    };
    let app = build_router(Arc::new(state));

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, "classification service listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_classifier(settings: &Settings) -> ClassifierContext {
    let describer: Arc<dyn VisionDescriber> = match settings.openai_api_key.as_deref() {
        Some(api_key) => Arc::new(OpenAiDescriber::new(
            settings.openai_base_url.as_str(),
            api_key,
            settings.openai_model.as_str(),
        )),
        None => {
            warn!("OPENAI_API_KEY is not set; classification requests will fail");
            Arc::new(MissingVisionDescriber)
        }
    };

    ClassifierContext {
        describer,
        videos: Arc::new(YouTubeSearch::new(
            settings.youtube_base_url.as_str(),
            settings.youtube_api_key.clone(),
        )),
    }
}

fn build_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(state.allowed_origin.as_deref());
    let max_upload_bytes = state.max_upload_bytes;

    Router::new()
        .route("/healthz", get(healthz))
        .route(CLASSIFY_PATH, post(classify))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(cors)
        .with_state(state)
}

fn cors_layer(allowed_origin: Option<&str>) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    match allowed_origin.map(HeaderValue::from_str) {
        Some(Ok(origin)) => base.allow_origin(origin),
        Some(Err(error)) => {
            warn!(%error, "ignoring invalid allowed origin");
            base
        }
        None => base,
    }
}

async fn healthz() -> &'static str {
    "ok"
}

async fn classify(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> ApiResult<Json<ClassificationResult>> {
    let upload = read_image_field(&mut multipart).await?;
    info!(
        file_name = %upload.file_name,
        size_bytes = upload.size_bytes(),
        "received classification upload"
    );

    let result = classify_upload(&state.classifier, &upload)
        .await
        .map_err(|e| (status_for(e.code), Json(e)))?;
    Ok(Json(result))
}

async fn read_image_field(multipart: &mut Multipart) -> ApiResult<ImageUpload> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(IMAGE_FIELD_NAME) {
            continue;
        }

        // A part without a filename is a form value, not a file.
        let Some(file_name) = field.file_name().map(|name| name.trim().to_string()) else {
            return Err(bad_request("no image file uploaded"));
        };
        if file_name.is_empty() {
            return Err(bad_request("no selected file"));
        }
        let mime_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(multipart_error)?;
        return Ok(ImageUpload::new(file_name, mime_type, bytes.to_vec()));
    }

    Err(bad_request("no image file uploaded"))
}

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
        ErrorCode::Upstream => StatusCode::BAD_GATEWAY,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn bad_request(message: &str) -> (StatusCode, Json<ApiError>) {
    (StatusCode::BAD_REQUEST, Json(ApiError::validation(message)))
}

fn multipart_error(err: MultipartError) -> (StatusCode, Json<ApiError>) {
    let status = err.status();
    let code = if status == StatusCode::PAYLOAD_TOO_LARGE {
        ErrorCode::PayloadTooLarge
    } else {
        ErrorCode::Validation
    };
    (status, Json(ApiError::new(code, err.body_text())))
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
