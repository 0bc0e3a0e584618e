use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_VISION_MODEL: &str = "gpt-4o";
const MAX_DESCRIPTION_TOKENS: u32 = 300;

pub const IDENTIFY_PROMPT: &str = "Identify the gym equipment shown in this image. \
Please provide the name of the gym equipment as so: ''Equipment: name of equipment.'' \
Provide a brief, 3-paragraph description including: 1) What the equipment is, \
2) How it's used and what muscles it targets, and 3) Tips for proper form or common \
mistakes to avoid. Keep each paragraph concise, about 2-3 sentences long.";

/// Turns a prepared image into a free-text equipment description.
#[async_trait]
pub trait VisionDescriber: Send + Sync {
    async fn describe(&self, png_base64: &str) -> Result<String>;
}

/// Stand-in used when no vision model credentials are configured.
pub struct MissingVisionDescriber;

#[async_trait]
impl VisionDescriber for MissingVisionDescriber {
    async fn describe(&self, _png_base64: &str) -> Result<String> {
        Err(anyhow!("vision model is not configured"))
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: Vec<ContentPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Chat-completions client that asks a vision model to identify the equipment.
pub struct OpenAiDescriber {
    http: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiDescriber {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }
}

#[async_trait]
impl VisionDescriber for OpenAiDescriber {
    async fn describe(&self, png_base64: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: vec![
                    ContentPart::Text {
                        text: IDENTIFY_PROMPT,
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: format!("data:image/png;base64,{png_base64}"),
                        },
                    },
                ],
            }],
            max_tokens: MAX_DESCRIPTION_TOKENS,
        };

        let response: ChatResponse = self
            .http
            .post(format!(
                "{}/chat/completions",
                self.base_url.trim_end_matches('/')
            ))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .context("vision request failed")?
            .error_for_status()
            .context("vision model rejected the request")?
            .json()
            .await
            .context("vision model returned an unreadable response")?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| anyhow!("vision model returned no description"))
    }
}
