use std::{path::Path, time::Duration};

use config::{Config, Environment, File};
use serde::Deserialize;
use shared::protocol::DEFAULT_ENDPOINT_URL;
use url::Url;

use crate::error::ClassifyError;

/// Looked up next to the working directory when no explicit file is given.
pub const DEFAULT_CONFIG_FILE: &str = "classify";
pub const ENV_PREFIX: &str = "CLASSIFY";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default = "default_endpoint_url")]
    pub endpoint_url: String,
    /// Unset means a hung request never resolves.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

fn default_endpoint_url() -> String {
    DEFAULT_ENDPOINT_URL.to_string()
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            endpoint_url: default_endpoint_url(),
            request_timeout_secs: None,
        }
    }
}

impl ClassifierConfig {
    pub fn with_endpoint_url(endpoint_url: impl Into<String>) -> Self {
        Self {
            endpoint_url: endpoint_url.into(),
            ..Self::default()
        }
    }

    /// Layers an optional TOML file under `CLASSIFY_*` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self, ClassifyError> {
        Self::load_with_prefix(path, ENV_PREFIX)
    }

    fn load_with_prefix(path: Option<&Path>, env_prefix: &str) -> Result<Self, ClassifyError> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let settings = Config::builder()
            .add_source(file)
            .add_source(Environment::with_prefix(env_prefix).try_parsing(true))
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    /// A command-line endpoint wins over both file and environment.
    pub fn override_endpoint(mut self, endpoint_url: Option<String>) -> Self {
        if let Some(endpoint_url) = endpoint_url {
            self.endpoint_url = endpoint_url;
        }
        self
    }

    pub fn endpoint(&self) -> Result<Url, ClassifyError> {
        let invalid = |reason: String| ClassifyError::InvalidEndpoint {
            url: self.endpoint_url.clone(),
            reason,
        };

        let url = Url::parse(self.endpoint_url.trim()).map_err(|e| invalid(e.to_string()))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(invalid(format!("unsupported scheme '{other}'"))),
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn default_targets_public_deployment() {
        let config = ClassifierConfig::default();
        assert_eq!(config.endpoint_url, DEFAULT_ENDPOINT_URL);
        assert_eq!(config.request_timeout(), None);
        assert_eq!(
            config.endpoint().expect("endpoint").path(),
            "/classify"
        );
    }

    #[test]
    fn loads_endpoint_and_timeout_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("classify.toml");
        fs::write(
            &path,
            "endpoint_url = \"http://127.0.0.1:5000/classify\"\nrequest_timeout_secs = 15\n",
        )
        .expect("write config");

        let config = ClassifierConfig::load(Some(&path)).expect("load");
        assert_eq!(config.endpoint_url, "http://127.0.0.1:5000/classify");
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(15)));
    }

    #[test]
    fn environment_overrides_file_endpoint() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("classify.toml");
        fs::write(
            &path,
            "endpoint_url = \"http://127.0.0.1:5000/classify\"\nrequest_timeout_secs = 15\n",
        )
        .expect("write config");

        // Unique prefix so parallel tests never see this variable.
        let prefix = "CLASSIFY_ENV_LAYER_TEST";
        std::env::set_var(
            format!("{prefix}_ENDPOINT_URL"),
            "https://classifier.internal/classify",
        );
        let loaded = ClassifierConfig::load_with_prefix(Some(&path), prefix);
        std::env::remove_var(format!("{prefix}_ENDPOINT_URL"));

        let config = loaded.expect("load");
        assert_eq!(config.endpoint_url, "https://classifier.internal/classify");
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(15)));
    }

    #[test]
    fn command_line_endpoint_wins() {
        let config = ClassifierConfig::with_endpoint_url("http://127.0.0.1:5000/classify")
            .override_endpoint(Some("http://localhost:8080/classify".to_string()));
        assert_eq!(config.endpoint_url, "http://localhost:8080/classify");

        let config = ClassifierConfig::with_endpoint_url("http://127.0.0.1:5000/classify")
            .override_endpoint(None);
        assert_eq!(config.endpoint_url, "http://127.0.0.1:5000/classify");
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("classify.toml");
        fs::write(&path, "# nothing configured\n").expect("write config");

        let config = ClassifierConfig::load(Some(&path)).expect("load");
        assert_eq!(config.endpoint_url, DEFAULT_ENDPOINT_URL);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = ClassifierConfig::load(Some(&dir.path().join("absent.toml")))
            .expect_err("must fail");
        assert!(matches!(err, ClassifyError::Config(_)));
    }

    #[test]
    fn rejects_non_http_endpoints() {
        let err = ClassifierConfig::with_endpoint_url("ftp://example.com/classify")
            .endpoint()
            .expect_err("must fail");
        assert!(err.to_string().contains("unsupported scheme 'ftp'"));

        let err = ClassifierConfig::with_endpoint_url("not a url")
            .endpoint()
            .expect_err("must fail");
        assert!(matches!(err, ClassifyError::InvalidEndpoint { .. }));
    }

    #[test]
    fn zero_timeout_means_no_timeout() {
        let config = ClassifierConfig {
            request_timeout_secs: Some(0),
            ..ClassifierConfig::default()
        };
        assert_eq!(config.request_timeout(), None);
    }
}
