//! 내장 Hook
//!
//! - `commit-msg`: 커밋 메시지 검사
//! - `pre-commit`: staged diff 검토
//! - `pre-push`: 보호 브랜치 검사 + 브랜치 요약
//! - `ScriptHook`: 발견된 외부 스크립트 실행
//!
//! 내장 hook은 분석 서비스가 있으면 먼저 사용하고, 없거나 실패하면 로컬 휴리스틱으로
//! 대체합니다 (`HookReport::used_fallback`).

mod commit_msg;
mod pre_commit;
mod pre_push;
mod script;

pub use commit_msg::CommitMsgHook;
pub use pre_commit::PreCommitHook;
pub use pre_push::PrePushHook;
pub use script::{interpreter_for, ScriptHook};

use crate::analysis::{parse_json_result, AnalysisRequest};
use crate::discovery::HookFactory;
use crate::hook::HookDefinition;
use crate::middleware::ExecutionContext;
use claude_hooks_foundation::DEFAULT_MODEL;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// 내장 hook 정의
pub fn definitions() -> Vec<HookDefinition> {
    factories().into_iter().map(|f| f.definition).collect()
}

/// 내장 hook 팩토리
pub fn factories() -> Vec<HookFactory> {
    vec![
        CommitMsgHook::factory(),
        PreCommitHook::factory(),
        PrePushHook::factory(),
    ]
}

// ============================================================================
// 분석 서비스 공용
// ============================================================================

/// 서비스 판정 (파싱 실패 시 "valid")
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub(crate) struct Verdict {
    pub valid: bool,
    pub issues: Vec<String>,
    pub summary: Option<String>,
}

impl Default for Verdict {
    fn default() -> Self {
        Self {
            valid: true,
            issues: Vec::new(),
            summary: None,
        }
    }
}

/// 서비스에 판정 요청
///
/// 서비스가 없거나 호출이 실패하면 None (호출자는 휴리스틱으로 대체).
pub(crate) async fn request_verdict<T>(ctx: &ExecutionContext, prompt: String) -> Option<T>
where
    T: DeserializeOwned + Default,
{
    let service = ctx.analysis.clone()?;

    let model = ctx
        .option_str("model")
        .or(ctx.services.default_model.as_deref())
        .unwrap_or(DEFAULT_MODEL);
    let mut request = AnalysisRequest::new(prompt, model)
        .with_max_tokens(ctx.option_u64("maxTokens", 1024) as u32);
    if let Some(temperature) = ctx.option("temperature").and_then(Value::as_f64) {
        request = request.with_temperature(temperature as f32);
    }

    match service.analyze(request).await {
        Ok(text) => Some(parse_json_result(&text)),
        Err(e) => {
            ctx.logger.warn(&format!(
                "Analysis service '{}' failed for hook '{}': {}; using local checks",
                service.name(),
                ctx.hook_id(),
                e
            ));
            None
        }
    }
}

/// 응답 형식 안내 (모든 프롬프트 공통 꼬리말)
pub(crate) const VERDICT_FORMAT: &str = "Respond with a JSON object: \
{\"valid\": boolean, \"issues\": [string], \"summary\": string}";

// ============================================================================
// 테스트 지원
// ============================================================================
