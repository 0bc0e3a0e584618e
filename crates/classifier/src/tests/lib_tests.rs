use std::io::Cursor;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use tokio::sync::Mutex;

use super::*;

struct TestDescriber {
    reply: Result<String, String>,
    seen: Arc<Mutex<Vec<String>>>,
}

impl TestDescriber {
    fn replying(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn failing(err: &str) -> Self {
        Self {
            reply: Err(err.to_string()),
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl VisionDescriber for TestDescriber {
    async fn describe(&self, png_base64: &str) -> Result<String> {
        self.seen.lock().await.push(png_base64.to_string());
        self.reply.clone().map_err(|e| anyhow!(e))
    }
}

#[derive(Default)]
struct TestVideos {
    queries: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl VideoSearch for TestVideos {
    async fn find_tutorial(&self, query: &str) -> VideoLookup {
        self.queries.lock().await.push(query.to_string());
        VideoLookup::Found(video::watch_url("abc123"))
    }
}

fn jpeg_upload() -> ImageUpload {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(40, 20, Rgb([10, 200, 10])));
    let mut bytes = Cursor::new(Vec::new());
    img.write_to(&mut bytes, ImageFormat::Jpeg).expect("jpeg");
    ImageUpload::new("bench.jpg", Some("image/jpeg".into()), bytes.into_inner())
}

#[tokio::test]
async fn classifies_upload_and_links_tutorial() {
    let describer = Arc::new(TestDescriber::replying(
        "Equipment: Flat Bench.\nA bench for pressing.",
    ));
    let videos = Arc::new(TestVideos::default());
    let ctx = ClassifierContext {
        describer: describer.clone(),
        videos: videos.clone(),
    };

    let result = classify_upload(&ctx, &jpeg_upload()).await.expect("classify");
    assert_eq!(result.description, "Equipment: Flat Bench.\nA bench for pressing.");
    assert_eq!(
        result.video_link.as_deref(),
        Some("https://www.youtube.com/watch?v=abc123")
    );
    assert_eq!(
        *videos.queries.lock().await,
        vec!["Flat Bench gym tutorial".to_string()]
    );
    let seen = describer.seen.lock().await;
    assert_eq!(seen.len(), 1);
    assert!(!seen[0].is_empty());
}

#[tokio::test]
async fn undecodable_upload_is_a_validation_error() {
    let describer = Arc::new(TestDescriber::replying("unused"));
    let ctx = ClassifierContext {
        describer: describer.clone(),
        videos: Arc::new(TestVideos::default()),
    };
    let upload = ImageUpload::new("notes.txt", None, b"plain text".to_vec());

    let err = classify_upload(&ctx, &upload).await.expect_err("must fail");
    assert_eq!(err.code, ErrorCode::Validation);
    assert_eq!(err.message, "invalid image file");
    assert!(describer.seen.lock().await.is_empty());
}

#[tokio::test]
async fn vision_failure_is_an_upstream_error() {
    let videos = Arc::new(TestVideos::default());
    let ctx = ClassifierContext {
        describer: Arc::new(TestDescriber::failing("quota exceeded")),
        videos: videos.clone(),
    };

    let err = classify_upload(&ctx, &jpeg_upload()).await.expect_err("must fail");
    assert_eq!(err.code, ErrorCode::Upstream);
    assert!(err.message.contains("quota exceeded"));
    assert!(videos.queries.lock().await.is_empty());
}
