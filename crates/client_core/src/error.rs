use std::path::PathBuf;

use shared::error::ApiException;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("no image file selected")]
    NoFileSelected,
    #[error("invalid endpoint url '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },
    #[error("failed to load classifier configuration: {0}")]
    Config(#[from] config::ConfigError),
    #[error("failed to read image file '{}': {source}", .path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("classification request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("classification service rejected the upload ({status}): {source}")]
    Rejected {
        status: u16,
        #[source]
        source: ApiException,
    },
    #[error("classification response could not be parsed: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ClassifyError {
    /// Whether the failure was already shown to the user through the alert channel.
    pub fn is_user_facing(&self) -> bool {
        matches!(self, ClassifyError::NoFileSelected)
    }
}
