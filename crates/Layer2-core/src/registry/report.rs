//! Registry 결과 타입

use crate::hook::{Hook, HookReport};
use crate::middleware::Outcome;
use claude_hooks_foundation::{BlockingMode, HookSource, Strictness};
use serde::Serialize;

/// 목록 표시용 hook 요약
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HookSummary {
    pub id: String,
    pub name: String,
    pub description: String,
    pub git_hook_name: String,
    pub source: HookSource,
    pub enabled: bool,
    pub strictness: Strictness,
    pub blocking_mode: BlockingMode,
}

impl HookSummary {
    pub fn of(hook: &dyn Hook) -> Self {
        let definition = hook.definition();
        Self {
            id: definition.id.clone(),
            name: definition.name.clone(),
            description: definition.description.clone(),
            git_hook_name: definition.git_hook_name.clone(),
            source: definition.source.clone(),
            enabled: hook.is_enabled(),
            strictness: hook.strictness(),
            blocking_mode: hook.blocking_mode(),
        }
    }
}

/// 일괄 작업 결과
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub succeeded: Vec<String>,

    /// (hook id, 실패 사유)
    pub failed: Vec<(String, String)>,

    /// 처리할 것이 없던 hook
    pub skipped: Vec<String>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// 단일 hook 실행 결과
#[derive(Debug, Clone)]
pub struct FiredHook {
    pub id: String,
    pub outcome: Outcome,
    pub report: Option<HookReport>,

    /// blockingMode=block 으로 git 작업을 중단시켰는지
    pub blocked: bool,
}

impl FiredHook {
    /// 실패 여부 (에러 또는 통과하지 못한 보고)
    pub fn is_failure(&self) -> bool {
        self.outcome.is_failed() || self.report.as_ref().map_or(false, |r| !r.passed)
    }
}

/// git hook 한 번 실행한 결과
#[derive(Debug, Clone, Default)]
pub struct FireReport {
    /// 프로세스 종료 코드 (block 실패가 있으면 1)
    pub exit_code: i32,
    pub outcomes: Vec<FiredHook>,
}

impl FireReport {
    pub fn is_blocked(&self) -> bool {
        self.exit_code != 0
    }
}
