//! Built-in middleware
//!
//! - `LoggingMiddleware`: 시작/종료 및 소요 시간
//! - `EnabledGuard`: 비활성 hook 단락
//! - `ConfigMiddleware`: `.claude/hooks.json` 병합 + 기본값 + 검증
//! - `GitContextMiddleware`: 브랜치/upstream/staged 파일
//! - `AnalysisMiddleware`: 분석 서비스 연결
//! - `ErrorBoundary`: 에러를 실패 outcome으로 변환

use super::context::{ExecutionContext, GitSnapshot, Outcome};
use super::pipeline::{Middleware, MiddlewarePipeline, Next, Phase};
use crate::compat::normalize_legacy_config;
use async_trait::async_trait;
use claude_hooks_foundation::{
    validate_property, BlockingMode, JsonStore, Result, Strictness, HOOKS_CONFIG_FILE,
};
use serde_json::{Map, Value};
use std::time::Instant;
use tracing::{debug, warn};

/// 기본 파이프라인
///
/// Logging → EnabledGuard → Config → GitContext → Analysis
pub fn standard_pipeline() -> MiddlewarePipeline {
    let mut pipeline = MiddlewarePipeline::new();
    pipeline
        .use_middleware(Phase::BeforeExecution, LoggingMiddleware)
        .use_middleware(Phase::BeforeExecution, EnabledGuard)
        .use_middleware(Phase::BeforeExecution, ConfigMiddleware)
        .use_middleware(Phase::BeforeExecution, GitContextMiddleware)
        .use_middleware(Phase::BeforeExecution, AnalysisMiddleware);
    pipeline
}

// ============================================================================
// LoggingMiddleware
// ============================================================================

/// 실행 로그
pub struct LoggingMiddleware;

#[async_trait]
impl Middleware for LoggingMiddleware {
    fn name(&self) -> &str {
        "logging"
    }

    async fn handle(&self, ctx: &mut ExecutionContext, next: Next<'_>) -> Result<()> {
        let start = Instant::now();
        ctx.logger
            .debug(&format!("Running hook '{}'", ctx.hook_id()));

        let result = next.run(ctx).await;

        let elapsed = start.elapsed().as_millis();
        match &result {
            Ok(()) => ctx.logger.debug(&format!(
                "Hook '{}' finished in {}ms",
                ctx.hook_id(),
                elapsed
            )),
            Err(e) => ctx.logger.debug(&format!(
                "Hook '{}' errored after {}ms: {}",
                ctx.hook_id(),
                elapsed,
                e
            )),
        }
        result
    }
}

// ============================================================================
// EnabledGuard
// ============================================================================

/// 비활성 hook은 본문을 실행하지 않음
pub struct EnabledGuard;

#[async_trait]
impl Middleware for EnabledGuard {
    fn name(&self) -> &str {
        "enabled-guard"
    }

    async fn handle(&self, ctx: &mut ExecutionContext, next: Next<'_>) -> Result<()> {
        if !ctx.enabled {
            ctx.logger
                .debug(&format!("Hook '{}' is disabled; skipping", ctx.hook_id()));
            return Ok(());
        }
        next.run(ctx).await
    }
}

// ============================================================================
// ConfigMiddleware
// ============================================================================

/// 파일 설정 병합
///
/// 파일의 hook 항목을 메모리 설정 위에 덮어쓰고, 기본값을 적용한 뒤 검증합니다.
/// 스키마에 맞지 않는 파일 옵션은 경고 후 버립니다.
pub struct ConfigMiddleware;

pub(crate) const IDENTITY_KEYS: [&str; 2] = ["name", "gitHookName"];

impl ConfigMiddleware {
    fn file_entry(ctx: &ExecutionContext) -> Map<String, Value> {
        let store = JsonStore::project(&ctx.project_root);
        let document = match store.load_object(HOOKS_CONFIG_FILE) {
            Ok(doc) => doc,
            Err(e) => {
                warn!("Failed to load hook configuration: {}", e);
                return Map::new();
            }
        };

        document
            .get("hooks")
            .and_then(|hooks| hooks.get(ctx.hook_id()))
            .and_then(Value::as_object)
            .cloned()
            .map(normalize_legacy_config)
            .unwrap_or_default()
    }
}

#[async_trait]
impl Middleware for ConfigMiddleware {
    fn name(&self) -> &str {
        "config"
    }

    async fn handle(&self, ctx: &mut ExecutionContext, next: Next<'_>) -> Result<()> {
        let mut merged = ctx.config.clone();

        for (key, value) in Self::file_entry(ctx) {
            if IDENTITY_KEYS.contains(&key.as_str()) {
                continue;
            }
            if let Some(spec) = ctx.schema.property(&key) {
                let report = validate_property(&key, &value, spec);
                if !report.is_valid {
                    ctx.logger.warn(&format!(
                        "Ignoring invalid option for hook '{}': {}",
                        ctx.hook_id(),
                        report.errors.join("; ")
                    ));
                    continue;
                }
            } else {
                debug!("Unknown option '{}' for hook '{}'", key, ctx.hook_id());
            }
            merged.insert(key, value);
        }

        let merged = ctx.schema.apply_defaults(&merged);
        ctx.schema.validate(&merged).into_result()?;

        if let Some(enabled) = merged.get("enabled").and_then(Value::as_bool) {
            ctx.enabled = enabled;
        }
        if let Some(strictness) = merged
            .get("strictness")
            .and_then(Value::as_str)
            .and_then(|s| s.parse::<Strictness>().ok())
        {
            ctx.strictness = strictness;
        }
        if let Some(mode) = merged
            .get("blockingMode")
            .and_then(Value::as_str)
            .and_then(|s| s.parse::<BlockingMode>().ok())
        {
            ctx.blocking_mode = mode;
        }
        ctx.config = merged;

        next.run(ctx).await
    }
}

// ============================================================================
// GitContextMiddleware
// ============================================================================

/// git 상태 수집
pub struct GitContextMiddleware;

#[async_trait]
impl Middleware for GitContextMiddleware {
    fn name(&self) -> &str {
        "git-context"
    }

    async fn handle(&self, ctx: &mut ExecutionContext, next: Next<'_>) -> Result<()> {
        if let Some(git) = ctx.services.git.clone() {
            let branch = match git.current_branch().await {
                Ok(branch) => Some(branch),
                Err(e) => {
                    debug!("Failed to read current branch: {}", e);
                    None
                }
            };
            let upstream = git.upstream().await.unwrap_or_else(|e| {
                debug!("Failed to read upstream: {}", e);
                None
            });
            let staged_files = git.staged_files().await.unwrap_or_else(|e| {
                debug!("Failed to list staged files: {}", e);
                Vec::new()
            });

            ctx.git = Some(GitSnapshot {
                branch,
                upstream,
                staged_files,
            });
        }

        next.run(ctx).await
    }
}

// ============================================================================
// AnalysisMiddleware
// ============================================================================

/// 분석 서비스 연결
pub struct AnalysisMiddleware;

#[async_trait]
impl Middleware for AnalysisMiddleware {
    fn name(&self) -> &str {
        "analysis"
    }

    async fn handle(&self, ctx: &mut ExecutionContext, next: Next<'_>) -> Result<()> {
        ctx.analysis = ctx.services.analysis.clone();
        if ctx.analysis.is_none() {
            ctx.logger.debug(&format!(
                "No analysis service configured; '{}' will use local checks",
                ctx.hook_id()
            ));
        }
        next.run(ctx).await
    }
}

// ============================================================================
// ErrorBoundary
// ============================================================================

/// 에러 처리 미들웨어
///
/// 내부 체인의 에러를 `Outcome::Failed`로 바꾸고 `Ok`를 반환합니다.
pub struct ErrorBoundary;

#[async_trait]
impl Middleware for ErrorBoundary {
    fn name(&self) -> &str {
        "error-boundary"
    }

    async fn handle(&self, ctx: &mut ExecutionContext, next: Next<'_>) -> Result<()> {
        if let Err(e) = next.run(ctx).await {
            ctx.logger
                .error(&format!("Hook '{}' failed: {}", ctx.hook_id(), e));
            ctx.outcome = Outcome::Failed(e.to_string());
        }
        Ok(())
    }
}

// ============================================================================
// 테스트
// ============================================================================
