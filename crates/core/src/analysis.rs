use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::models::{AnalysisResult, Metadata};
use crate::traits::DocumentAnalyzer;
use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tracing::{debug, info, warn};

const PROMPT_TEMPLATE: &str = r#"Analyze the following document text and return a JSON object with these fields:
1. "summary": A concise summary.
2. "type": The document type (e.g., Invoice, CV, Report).
3. "metadata": A JSON object with extracted key-value pairs (e.g., date, sender, amount).

Text:
"#;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnalysisPayload {
    #[serde(default)]
    summary: Option<String>,
    #[serde(default, rename = "type")]
    document_type: Option<String>,
    #[serde(default)]
    metadata: Option<Metadata>,
}

/// Client for the external chat-completion service that summarises and classifies text.
///
/// Each call is a single request: no retries, no streaming, no caching.
pub struct AnalysisClient {
    client: Client,
    config: AnalysisConfig,
}

impl AnalysisClient {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub async fn analyze(&self, text: &str) -> Result<AnalysisResult, AnalysisError> {
        if text.trim().is_empty() {
            return Err(AnalysisError::EmptyText);
        }

        let api_key = self.config.api_key.as_deref().ok_or_else(|| {
            AnalysisError::Configuration(format!("{} not set", crate::config::API_KEY_VAR))
        })?;

        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: build_prompt(text),
            }],
        };

        debug!(
            model = %self.config.model,
            endpoint = %self.config.endpoint,
            text_chars = text.len(),
            "sending analysis request"
        );

        let response = self
            .client
            .post(self.config.endpoint.clone())
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let details = response.text().await.unwrap_or_default();
            return Err(AnalysisError::Upstream(format!(
                "{} returned {}: {}",
                self.config.endpoint, status, details
            )));
        }

        let payload: ChatResponse = response.json().await.map_err(|error| {
            AnalysisError::Upstream(format!("undecodable completion response: {error}"))
        })?;

        let content = payload
            .choices
            .into_iter()
            .next()
            .ok_or(AnalysisError::EmptyResponse)?
            .message
            .content
            .unwrap_or_default();

        let result = parse_analysis(&content);
        if result.degraded {
            warn!(
                chars = result.summary.len(),
                "analysis reply was not valid json; storing raw reply as summary"
            );
        } else {
            info!(document_type = %result.document_type, keys = result.metadata.len(), "analysis parsed");
        }

        Ok(result)
    }
}

#[async_trait]
impl DocumentAnalyzer for AnalysisClient {
    async fn analyze(&self, text: &str) -> Result<AnalysisResult, AnalysisError> {
        AnalysisClient::analyze(self, text).await
    }
}

pub fn build_prompt(text: &str) -> String {
    format!("{PROMPT_TEMPLATE}{text}")
}

fn fence_opener() -> &'static Regex {
    static FENCE_OPENER: OnceLock<Regex> = OnceLock::new();
    FENCE_OPENER.get_or_init(|| {
        Regex::new(r"^```[A-Za-z0-9_+.-]*").expect("fence opener pattern is valid")
    })
}

/// Removes a surrounding Markdown code fence (with or without a language tag).
///
/// Only the fence markers go; everything between them is returned as is, and content without
/// a fence comes back unchanged.
pub fn strip_code_fence(content: &str) -> &str {
    let leading = content.trim_start();
    let unopened = match fence_opener().find(leading) {
        Some(opener) => &leading[opener.end()..],
        None => content,
    };
    unopened.trim_end().strip_suffix("```").unwrap_or(unopened)
}

/// Interprets a completion reply.
///
/// Replies that are not the expected JSON object degrade to the raw, untrimmed fence-stripped
/// text as summary, type [`crate::models::UNKNOWN_DOCUMENT_TYPE`] and empty metadata; this never fails.
pub fn parse_analysis(content: &str) -> AnalysisResult {
    let stripped = strip_code_fence(content);

    match serde_json::from_str::<AnalysisPayload>(stripped.trim()) {
        Ok(payload) => AnalysisResult {
            summary: payload.summary.unwrap_or_default(),
            document_type: payload.document_type.unwrap_or_default(),
            metadata: payload.metadata.unwrap_or_default(),
            degraded: false,
        },
        Err(error) => {
            debug!(%error, "analysis reply is not an analysis object");
            AnalysisResult::degraded(stripped)
        }
    }
}
