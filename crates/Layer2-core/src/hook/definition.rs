//! Hook 정의 및 실행 결과 타입

use claude_hooks_foundation::HookSource;
use serde::{Deserialize, Serialize};

// ============================================================================
// HookDefinition
// ============================================================================

/// Hook 메타데이터 (발견 이후 불변)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HookDefinition {
    /// 고유 ID
    pub id: String,

    /// 표시 이름
    pub name: String,

    /// 설명
    #[serde(default)]
    pub description: String,

    /// 연결될 git hook 이름 (예: "pre-commit")
    pub git_hook_name: String,

    /// 출처
    pub source: HookSource,
}

impl HookDefinition {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        git_hook_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            git_hook_name: git_hook_name.into(),
            source: HookSource::Core,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_source(mut self, source: HookSource) -> Self {
        self.source = source;
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }
}

// ============================================================================
// HookReport
// ============================================================================

/// Hook 도메인 로직의 실행 결과
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HookReport {
    /// 통과 여부
    pub passed: bool,

    /// 한 줄 요약
    pub summary: String,

    /// 발견된 문제
    #[serde(default)]
    pub issues: Vec<String>,

    /// 분석 서비스 대신 로컬 휴리스틱을 사용했는지
    #[serde(default)]
    pub used_fallback: bool,
}

impl HookReport {
    pub fn passed(summary: impl Into<String>) -> Self {
        Self {
            passed: true,
            summary: summary.into(),
            ..Default::default()
        }
    }

    pub fn failed(summary: impl Into<String>, issues: Vec<String>) -> Self {
        Self {
            passed: false,
            summary: summary.into(),
            issues,
            used_fallback: false,
        }
    }

    /// 문제 목록으로부터 생성 (비어있으면 통과)
    pub fn from_issues(
        ok_summary: impl Into<String>,
        fail_summary: impl Into<String>,
        issues: Vec<String>,
    ) -> Self {
        if issues.is_empty() {
            Self::passed(ok_summary)
        } else {
            Self::failed(fail_summary, issues)
        }
    }

    pub fn with_fallback(mut self, used_fallback: bool) -> Self {
        self.used_fallback = used_fallback;
        self
    }
}
