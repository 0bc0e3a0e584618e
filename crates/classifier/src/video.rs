use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use tracing::{info, warn};

pub const DEFAULT_YOUTUBE_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";
/// Longest video still considered a quick tutorial.
pub const MAX_TUTORIAL_SECONDS: u64 = 180;
const SEARCH_MAX_RESULTS: &str = "50";

static ISO_DURATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^PT(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?").expect("ISO_DURATION regex")
});

/// Outcome of a tutorial lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoLookup {
    Found(String),
    NoneSuitable { query: String },
    MissingApiKey,
    Failed(String),
}

impl VideoLookup {
    pub fn is_found(&self) -> bool {
        matches!(self, VideoLookup::Found(_))
    }

    /// Text placed in the `video_link` field of the classification answer.
    pub fn into_link_text(self) -> String {
        match self {
            VideoLookup::Found(url) => url,
            VideoLookup::NoneSuitable { query } => {
                format!("No suitable tutorial videos found for query: {query}")
            }
            VideoLookup::MissingApiKey => "YouTube API key not found".to_string(),
            VideoLookup::Failed(reason) => format!("Error fetching YouTube data: {reason}"),
        }
    }
}

#[async_trait]
pub trait VideoSearch: Send + Sync {
    async fn find_tutorial(&self, query: &str) -> VideoLookup;
}

/// Seconds in an ISO-8601 `PT#H#M#S` duration. Anything else counts as zero.
///
/// Components too large for `u64` saturate, so oversized durations never
/// pass as short videos.
pub fn parse_duration(duration: &str) -> u64 {
    let Some(caps) = ISO_DURATION.captures(duration) else {
        return 0;
    };
    let component = |index: usize| match caps.get(index) {
        Some(m) => m.as_str().parse::<u64>().unwrap_or(u64::MAX),
        None => 0,
    };
    component(1)
        .saturating_mul(3600)
        .saturating_add(component(2).saturating_mul(60))
        .saturating_add(component(3))
}

pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={video_id}")
}

fn is_tutorial_title(title: &str) -> bool {
    title.to_lowercase().contains("tutorial")
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItemId {
    #[serde(default)]
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Snippet {
    title: String,
}

#[derive(Debug, Deserialize)]
struct VideosResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoItem {
    content_details: ContentDetails,
}

#[derive(Debug, Deserialize)]
struct ContentDetails {
    duration: String,
}

/// YouTube Data API search for short tutorial videos.
pub struct YouTubeSearch {
    http: Client,
    base_url: String,
    api_key: Option<String>,
}

impl YouTubeSearch {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
        }
    }

    async fn first_short_tutorial(
        &self,
        api_key: &str,
        query: &str,
    ) -> Result<Option<String>, reqwest::Error> {
        let search_query = format!("{query} tutorial");
        let results: SearchResponse = self
            .http
            .get(format!("{}/search", self.base_url))
            .query(&[
                ("part", "snippet"),
                ("q", search_query.as_str()),
                ("key", api_key),
                ("maxResults", SEARCH_MAX_RESULTS),
                ("type", "video"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let candidates = results
            .items
            .into_iter()
            .filter(|item| is_tutorial_title(&item.snippet.title))
            .filter_map(|item| item.id.video_id);

        for video_id in candidates {
            let details: VideosResponse = self
                .http
                .get(format!("{}/videos", self.base_url))
                .query(&[
                    ("part", "contentDetails"),
                    ("id", video_id.as_str()),
                    ("key", api_key),
                ])
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;

            let Some(video) = details.items.first() else {
                continue;
            };
            if parse_duration(&video.content_details.duration) <= MAX_TUTORIAL_SECONDS {
                return Ok(Some(video_id));
            }
        }

        Ok(None)
    }
}

#[async_trait]
impl VideoSearch for YouTubeSearch {
    async fn find_tutorial(&self, query: &str) -> VideoLookup {
        let Some(api_key) = self.api_key.as_deref() else {
            warn!("youtube api key missing; skipping tutorial lookup");
            return VideoLookup::MissingApiKey;
        };

        match self.first_short_tutorial(api_key, query).await {
            Ok(Some(video_id)) => {
                info!(%query, %video_id, "found tutorial video");
                VideoLookup::Found(watch_url(&video_id))
            }
            Ok(None) => VideoLookup::NoneSuitable {
                query: query.to_string(),
            },
            Err(error) => {
                // The request url carries the api key.
                let error = error.without_url();
                warn!(%query, %error, "tutorial lookup failed");
                VideoLookup::Failed(error.to_string())
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/video_tests.rs"]
mod tests;
