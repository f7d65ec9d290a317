//! ExecutionContext - 한 번의 hook 실행 동안 미들웨어와 hook이 공유하는 상태

use crate::analysis::AnalysisService;
use crate::git::GitInspector;
use crate::hook::{Hook, HookDefinition, HookReport};
use claude_hooks_foundation::{BlockingMode, ConfigSchema, SharedLogger, Strictness};
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::sync::Arc;

// ============================================================================
// Services
// ============================================================================

/// 미들웨어가 hook에 제공하는 외부 capability
#[derive(Clone, Default)]
pub struct Services {
    pub analysis: Option<Arc<dyn AnalysisService>>,
    pub git: Option<Arc<dyn GitInspector>>,

    /// hook 설정에 `model`이 없을 때 사용할 모델
    pub default_model: Option<String>,
}

impl Services {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_analysis(mut self, service: Arc<dyn AnalysisService>) -> Self {
        self.analysis = Some(service);
        self
    }

    pub fn with_git(mut self, git: Arc<dyn GitInspector>) -> Self {
        self.git = Some(git);
        self
    }

    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = Some(model.into());
        self
    }
}

// ============================================================================
// GitSnapshot
// ============================================================================

/// 실행 시점의 git 상태
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitSnapshot {
    pub branch: Option<String>,
    pub upstream: Option<String>,
    pub staged_files: Vec<String>,
}

// ============================================================================
// Outcome
// ============================================================================

/// 실행 결과 상태
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Outcome {
    /// 아직 실행되지 않음
    #[default]
    Pending,
    /// hook 본문이 에러 없이 완료
    Succeeded,
    /// 에러 발생
    Failed(String),
    /// 미들웨어가 `next`를 호출하지 않음
    Cancelled,
}

impl Outcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Succeeded => write!(f, "succeeded"),
            Self::Failed(e) => write!(f, "failed: {}", e),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

// ============================================================================
// ExecutionContext
// ============================================================================

/// 실행 컨텍스트
pub struct ExecutionContext {
    /// hook 메타데이터
    pub definition: HookDefinition,

    /// git이 전달한 인자
    pub args: Vec<String>,

    pub project_root: PathBuf,

    pub enabled: bool,
    pub strictness: Strictness,
    pub blocking_mode: BlockingMode,

    /// hook 종류 스키마
    pub schema: ConfigSchema,

    /// 해석된 설정 (ConfigMiddleware가 파일 옵션을 병합)
    pub config: Map<String, Value>,

    /// GitContextMiddleware가 채움
    pub git: Option<GitSnapshot>,

    /// AnalysisMiddleware가 연결
    pub analysis: Option<Arc<dyn AnalysisService>>,

    /// 사용 가능한 capability
    pub services: Services,

    pub outcome: Outcome,
    pub report: Option<HookReport>,

    /// 미들웨어 간 자유 데이터
    pub extensions: Map<String, Value>,

    pub logger: SharedLogger,
    pub dry_run: bool,
}

impl ExecutionContext {
    /// hook 현재 상태로 생성
    pub fn for_hook(hook: &dyn Hook, args: Vec<String>, logger: SharedLogger) -> Self {
        let base = hook.base();
        Self {
            definition: hook.definition().clone(),
            args,
            project_root: base.project_root().to_path_buf(),
            enabled: hook.is_enabled(),
            strictness: hook.strictness(),
            blocking_mode: hook.blocking_mode(),
            schema: hook.schema().clone(),
            config: hook.config(),
            git: None,
            analysis: None,
            services: Services::default(),
            outcome: Outcome::Pending,
            report: None,
            extensions: Map::new(),
            logger,
            dry_run: false,
        }
    }

    pub fn with_services(mut self, services: Services) -> Self {
        self.services = services;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn hook_id(&self) -> &str {
        &self.definition.id
    }

    // ========================================================================
    // 설정 조회 헬퍼
    // ========================================================================

    pub fn option(&self, key: &str) -> Option<&Value> {
        self.config.get(key)
    }

    pub fn option_bool(&self, key: &str, default: bool) -> bool {
        self.option(key).and_then(Value::as_bool).unwrap_or(default)
    }

    pub fn option_u64(&self, key: &str, default: u64) -> u64 {
        self.option(key).and_then(Value::as_u64).unwrap_or(default)
    }

    pub fn option_str(&self, key: &str) -> Option<&str> {
        self.option(key).and_then(Value::as_str)
    }

    pub fn option_strings(&self, key: &str) -> Vec<String> {
        self.option(key)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}
