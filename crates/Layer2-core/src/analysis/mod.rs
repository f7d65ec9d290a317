//! Analysis Service - 외부 AI 분석 capability
//!
//! Hook은 프롬프트를 보내고 응답 텍스트를 받습니다. 응답에 포함된 JSON 객체를
//! 파싱하며, 파싱 실패 시 기본값("valid / no issues")으로 대체합니다.

mod anthropic;

pub use anthropic::{AnthropicService, ANTHROPIC_API_KEY_ENV};

use async_trait::async_trait;
use claude_hooks_foundation::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

/// 분석 요청
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisRequest {
    pub prompt: String,
    pub model: String,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl AnalysisRequest {
    pub fn new(prompt: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: model.into(),
            max_tokens: 1024,
            temperature: None,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// 외부 분석 서비스
#[async_trait]
pub trait AnalysisService: Send + Sync {
    /// 서비스 이름 (로그용)
    fn name(&self) -> &str;

    /// 프롬프트 → 응답 텍스트
    async fn analyze(&self, request: AnalysisRequest) -> Result<String>;
}

/// 응답 텍스트에서 첫 번째 `{`부터 마지막 `}`까지 추출
pub fn extract_json(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// 응답 파싱 (실패 시 기본값)
pub fn parse_json_result<T: DeserializeOwned + Default>(text: &str) -> T {
    extract_json(text)
        .and_then(|json| match serde_json::from_str(json) {
            Ok(value) => Some(value),
            Err(e) => {
                debug!("Failed to parse analysis response: {}", e);
                None
            }
        })
        .unwrap_or_default()
}
