use std::{collections::HashMap, fs};

use classifier::{
    video::DEFAULT_YOUTUBE_BASE_URL,
    vision::{DEFAULT_OPENAI_BASE_URL, DEFAULT_VISION_MODEL},
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server_bind: String,
    pub allowed_origin: Option<String>,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub openai_model: String,
    pub youtube_api_key: Option<String>,
    pub youtube_base_url: String,
    pub max_upload_bytes: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "0.0.0.0:5000".into(),
            allowed_origin: Some("https://matthewkweon.github.io".into()),
            openai_api_key: None,
            openai_base_url: DEFAULT_OPENAI_BASE_URL.into(),
            openai_model: DEFAULT_VISION_MODEL.into(),
            youtube_api_key: None,
            youtube_base_url: DEFAULT_YOUTUBE_BASE_URL.into(),
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("server.toml") {
        apply_file_overrides(&mut settings, &raw);
    }

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    settings
}

/// `APP__*` names win over the bare names hosting platforms set.
fn apply_env_overrides(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("PORT") {
        settings.server_bind = with_port(&settings.server_bind, &v);
    }
    if let Some(v) = var("APP__BIND_ADDR") {
        settings.server_bind = v;
    }

    if let Some(v) = var("APP__ALLOWED_ORIGIN") {
        settings.allowed_origin = non_empty(v);
    }

    if let Some(v) = var("OPENAI_API_KEY") {
        settings.openai_api_key = non_empty(v);
    }
    if let Some(v) = var("APP__OPENAI_API_KEY") {
        settings.openai_api_key = non_empty(v);
    }
    if let Some(v) = var("APP__OPENAI_BASE_URL") {
        settings.openai_base_url = v;
    }
    if let Some(v) = var("APP__OPENAI_MODEL") {
        settings.openai_model = v;
    }

    if let Some(v) = var("YOUTUBE_API_KEY") {
        settings.youtube_api_key = non_empty(v);
    }
    if let Some(v) = var("APP__YOUTUBE_API_KEY") {
        settings.youtube_api_key = non_empty(v);
    }
    if let Some(v) = var("APP__YOUTUBE_BASE_URL") {
        settings.youtube_base_url = v;
    }

    if let Some(v) = var("APP__MAX_UPLOAD_BYTES") {
        if let Ok(parsed) = v.parse::<usize>() {
            settings.max_upload_bytes = parsed;
        }
    }
}

fn apply_file_overrides(settings: &mut Settings, raw: &str) {
    let Ok(file_cfg) = toml::from_str::<HashMap<String, toml::Value>>(raw) else {
        return;
    };
    let text = |key: &str| file_cfg.get(key).and_then(|v| v.as_str()).map(str::to_string);

    if let Some(v) = text("bind_addr") {
        settings.server_bind = v;
    }
    if let Some(v) = text("allowed_origin") {
        settings.allowed_origin = non_empty(v);
    }
    if let Some(v) = text("openai_base_url") {
        settings.openai_base_url = v;
    }
    if let Some(v) = text("openai_model") {
        settings.openai_model = v;
    }
    if let Some(v) = text("youtube_base_url") {
        settings.youtube_base_url = v;
    }
    if let Some(v) = file_cfg
        .get("max_upload_bytes")
        .and_then(|v| v.as_integer())
        .and_then(|v| usize::try_from(v).ok())
    {
        settings.max_upload_bytes = v;
    }
}

/// Replaces the port of a `host:port` bind address.
fn with_port(bind: &str, port: &str) -> String {
    let port = port.trim();
    if port.parse::<u16>().is_err() {
        return bind.to_string();
    }
    let host = bind.rsplit_once(':').map_or(bind, |(host, _)| host);
    format!("{host}:{port}")
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
