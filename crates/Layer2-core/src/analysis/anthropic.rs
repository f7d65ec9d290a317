//! Anthropic Messages API 기반 분석 서비스

use super::{AnalysisRequest, AnalysisService};
use async_trait::async_trait;
use claude_hooks_foundation::{Error, Result, SecretStore};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// API 키 환경변수
pub const ANTHROPIC_API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

const ANTHROPIC_VERSION: &str = "2023-06-01";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Anthropic 분석 서비스
pub struct AnthropicService {
    client: Client,
    api_key: String,
    base_url: String,
}

impl AnthropicService {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::Service(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// 비밀값 저장소에서 API 키를 찾아 생성 (없으면 None)
    pub fn from_secrets(secrets: &SecretStore, base_url: &str) -> Option<Self> {
        let api_key = secrets.get(ANTHROPIC_API_KEY_ENV)?;
        Self::new(api_key, base_url).ok()
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/messages", self.base_url)
    }
}

#[async_trait]
impl AnalysisService for AnthropicService {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn analyze(&self, request: AnalysisRequest) -> Result<String> {
        let body = MessagesRequest {
            model: &request.model,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            messages: vec![MessageParam {
                role: "user",
                content: &request.prompt,
            }],
        };

        debug!("Sending analysis request to {}", self.endpoint());

        let response = self
            .client
            .post(self.endpoint())
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Service(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Service(format!("HTTP {}: {}", status.as_u16(), text)));
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| Error::Service(format!("Invalid response: {}", e)))?;

        Ok(parsed
            .content
            .into_iter()
            .filter_map(|block| block.text)
            .collect::<Vec<_>>()
            .join(""))
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    messages: Vec<MessageParam<'a>>,
}

#[derive(Serialize)]
struct MessageParam<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_endpoint_trims_slash() {
        let service = AnthropicService::new("key", "http://localhost:9000/").unwrap();
        assert_eq!(service.endpoint(), "http://localhost:9000/v1/messages");
    }

    #[test]
    fn test_response_text_blocks() {
        let parsed: MessagesResponse = serde_json::from_str(
            r#"{"content":[{"type":"text","text":"{\"valid\":"},{"type":"text","text":"true}"}]}"#,
        )
        .unwrap();
        let text: String = parsed.content.into_iter().filter_map(|b| b.text).collect();
        assert_eq!(text, "{\"valid\":true}");
    }

    #[test]
    fn test_from_secrets_without_key() {
        let dir = TempDir::new().unwrap();
        let secrets = SecretStore::for_project(dir.path()).without_process_env();
        assert!(AnthropicService::from_secrets(&secrets, "https://api.anthropic.com").is_none());
    }
}
