//! Sonar chat completions client.
//!
//! Sends structured-output requests to the Perplexity Sonar API and parses
//! the reply content as grant records.
//!
//! ### API contract
//!
//! - **Endpoint**: `https://api.perplexity.ai/chat/completions`
//! - **Authentication**: `Authorization: Bearer <SONAR_API_KEY>`.
//! - **Structured output**: `response_format.type = "json_schema"` with a
//!   schema generated from [`RawGrantRecord`].
//! - **Failures**: no retries; non-2xx and malformed content are surfaced to the caller.

pub mod error;
pub mod prompt;
pub mod request;
pub mod response;

pub use error::SonarError;
pub use request::{ChatMessage, ChatRequest, ResponseFormat, Role};
pub use response::{ChatCompletion, Usage};

use async_trait::async_trait;
use reqwest::header;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::record::{RawGrantRecord, grant_records_schema};

/// Default base URL for the Sonar API.
const DEFAULT_BASE_URL: &str = "https://api.perplexity.ai";

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Default user agent.
const DEFAULT_USER_AGENT: &str = "grantbridge/0.1";

/// Sonar API client configuration.
#[derive(Debug, Clone)]
pub struct SonarConfig {
    /// API key from SONAR_API_KEY.
    pub api_key: String,
    /// Base URL (default: https://api.perplexity.ai).
    pub base_url: String,
    /// Request timeout (default: 60s).
    pub timeout: Duration,
    /// User-agent string.
    pub user_agent: String,
}

impl Default for SonarConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl SonarConfig {
    /// Build client settings from the application config.
    pub fn from_app(config: &grantbridge_core::AppConfig) -> Result<Self, SonarError> {
        let api_key = config.require_sonar_api_key().map_err(|_| SonarError::MissingApiKey)?;

        Ok(Self {
            api_key: api_key.to_string(),
            base_url: config.sonar_base_url.clone(),
            timeout: config.timeout(),
            user_agent: config.user_agent.clone(),
        })
    }
}

/// A chat completions backend.
///
/// Implemented by [`SonarClient`]; tests substitute canned replies.
#[async_trait]
pub trait Completions: Send + Sync {
    /// Send `request` and return the first choice's message content.
    async fn complete(&self, request: &ChatRequest) -> Result<String, SonarError>;
}

/// Sonar chat completions client.
#[derive(Debug, Clone)]
pub struct SonarClient {
    http: reqwest::Client,
    config: SonarConfig,
}

impl SonarClient {
    /// Create a new client with the given configuration.
    pub fn new(config: SonarConfig) -> Result<Self, SonarError> {
        if config.api_key.trim().is_empty() {
            return Err(SonarError::MissingApiKey);
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SonarError::Network(Arc::new(e)))?;

        Ok(Self { http, config })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl Completions for SonarClient {
    async fn complete(&self, request: &ChatRequest) -> Result<String, SonarError> {
        request.validate()?;

        let start = Instant::now();
        tracing::debug!(model = %request.model, "sending completions request");

        let http_response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .header(header::ACCEPT, "application/json")
            .header(header::USER_AGENT, &self.config.user_agent)
            .json(request)
            .send()
            .await?;

        let status = http_response.status();
        tracing::debug!("completions API response status: {}", status);

        if status == 401 || status == 403 {
            return Err(SonarError::AuthError);
        }

        if status == 429 {
            return Err(SonarError::RateLimited);
        }

        if !status.is_success() {
            return Err(SonarError::HttpError { status: status.as_u16() });
        }

        let bytes = http_response.bytes().await?;
        let completion: ChatCompletion =
            serde_json::from_slice(&bytes).map_err(|e| SonarError::Parse(e.to_string()))?;

        if let Some(usage) = completion.usage {
            tracing::debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "completion finished in {:?}",
                start.elapsed()
            );
        }

        completion.into_content()
    }
}

/// System instruction shared by every grant prompt.
pub const GRANT_SYSTEM_PROMPT: &str = "You are a scholarship and grant research assistant. \
    Respond only with a JSON array of grant objects. Do not include commentary or markdown.";

/// Ask `api` for grants matching `prompt` and parse the reply as records.
///
/// # Errors
///
/// Propagates transport failures unchanged and returns `SonarError::Parse`
/// when the content is not a JSON array of objects.
pub async fn fetch_grant_records(
    api: &dyn Completions, model: &str, prompt: String,
) -> Result<Vec<RawGrantRecord>, SonarError> {
    let request = ChatRequest::structured(model, GRANT_SYSTEM_PROMPT, prompt, grant_records_schema());
    let content = api.complete(&request).await?;

    let records: Vec<RawGrantRecord> =
        serde_json::from_str(content.trim()).map_err(|e| SonarError::Parse(format!("grant list: {e}")))?;

    tracing::info!(model, count = records.len(), "received grant records");
    Ok(records)
}


#[cfg(test)]
mod tests {
    use super::stub::StubCompletions;
    use super::*;

    #[test]
    fn test_client_new_missing_key() {
        let result = SonarClient::new(SonarConfig::default());
        assert!(matches!(result, Err(SonarError::MissingApiKey)));
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let client = SonarClient::new(SonarConfig {
            api_key: "k".into(),
            base_url: "https://api.perplexity.ai/".into(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(client.endpoint(), "https://api.perplexity.ai/chat/completions");
    }

    #[test]
    fn test_config_from_app() {
        let app = grantbridge_core::AppConfig { sonar_api_key: Some("pplx".into()), ..Default::default() };
        let config = SonarConfig::from_app(&app).unwrap();
        assert_eq!(config.api_key, "pplx");
        assert_eq!(config.timeout, Duration::from_millis(60_000));

        let missing = grantbridge_core::AppConfig::default();
        assert!(matches!(SonarConfig::from_app(&missing), Err(SonarError::MissingApiKey)));
    }

    #[tokio::test]
    async fn test_fetch_grant_records_parses_array() {
        let stub = StubCompletions::replying(
            r#"[{"title": "STEM Award", "organization": "Example Foundation", "amount": "$2,500"},
                {"title": "Arts Grant", "amount": 1000}]"#,
        );

        let records = fetch_grant_records(&stub, "sonar", "find grants".into()).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].title.as_deref(), Some("STEM Award"));
        assert_eq!(records[1].amount.as_deref(), Some("1000"));

        let sent = stub.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(sent.model, "sonar");
        assert!(sent.response_format.is_some());
    }

    #[tokio::test]
    async fn test_fetch_grant_records_rejects_non_json() {
        let stub = StubCompletions::replying("Here are some grants: ...");
        let result = fetch_grant_records(&stub, "sonar", "find grants".into()).await;
        assert!(matches!(result, Err(SonarError::Parse(_))));
    }

    #[tokio::test]
    async fn test_fetch_grant_records_rejects_object() {
        let stub = StubCompletions::replying(r#"{"grants": []}"#);
        let result = fetch_grant_records(&stub, "sonar", "find grants".into()).await;
        assert!(matches!(result, Err(SonarError::Parse(_))));
    }

    #[tokio::test]
    async fn test_fetch_grant_records_propagates_upstream_error() {
        let stub = StubCompletions::default();
        let result = fetch_grant_records(&stub, "sonar", "find grants".into()).await;
        assert!(matches!(result, Err(SonarError::HttpError { status: 503 })));
    }
}
