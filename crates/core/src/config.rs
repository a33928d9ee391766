use crate::error::AnalysisError;
use url::Url;

pub const DEFAULT_COMPLETION_ENDPOINT: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "openai/gpt-4o-mini";

pub const API_KEY_VAR: &str = "OPENROUTER_API_KEY";
pub const ENDPOINT_VAR: &str = "OPENROUTER_URL";
pub const MODEL_VAR: &str = "OPENROUTER_MODEL";

/// Settings for the external completion service.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Bearer credential; analysis fails with a configuration error while unset.
    pub api_key: Option<String>,
    pub endpoint: Url,
    pub model: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: Url::parse(DEFAULT_COMPLETION_ENDPOINT)
                .expect("default completion endpoint is a valid url"),
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

impl AnalysisConfig {
    pub fn from_env() -> Result<Self, AnalysisError> {
        Self::from_values(
            env_value(API_KEY_VAR),
            env_value(ENDPOINT_VAR),
            env_value(MODEL_VAR),
        )
    }

    /// Builds a config from optional overrides; blank values fall back to the defaults.
    pub fn from_values(
        api_key: Option<String>,
        endpoint: Option<String>,
        model: Option<String>,
    ) -> Result<Self, AnalysisError> {
        let mut config = Self {
            api_key: non_blank(api_key),
            ..Self::default()
        };

        if let Some(endpoint) = non_blank(endpoint) {
            config.endpoint = Url::parse(&endpoint).map_err(|error| {
                AnalysisError::Configuration(format!("invalid completion endpoint {endpoint}: {error}"))
            })?;
        }

        if let Some(model) = non_blank(model) {
            config.model = model;
        }

        Ok(config)
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = non_blank(Some(api_key.into()));
        self
    }

    pub fn with_endpoint(mut self, endpoint: Url) -> Self {
        self.endpoint = endpoint;
        self
    }
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
