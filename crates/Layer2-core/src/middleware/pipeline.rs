//! Middleware Pipeline - hook 실행을 감싸는 미들웨어 체인
//!
//! ## 실행 순서
//!
//! ```text
//! BeforeExecution[0] → BeforeExecution[1] → ... → hook.execute()
//!         ↓ (next 미호출 시 취소)
//! AfterExecution[0] → AfterExecution[1] → ...   (항상 실행, outcome 관찰)
//! ```
//!
//! 각 미들웨어는 `next.run(ctx)` 호출 전후에 로직을 둘 수 있습니다 (wrap).

use super::context::{ExecutionContext, Outcome};
use crate::hook::Hook;
use async_trait::async_trait;
use claude_hooks_foundation::Result;
use futures::future::{BoxFuture, FutureExt};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

// ============================================================================
// Phase
// ============================================================================

/// 미들웨어 단계
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Phase {
    BeforeExecution,
    AfterExecution,
    /// 사용자 정의 단계 (`run_phase`로 실행)
    Custom(String),
}

impl Phase {
    pub fn custom(name: impl Into<String>) -> Self {
        Self::Custom(name.into())
    }
}

// ============================================================================
// Middleware trait
// ============================================================================

/// 미들웨어 단계
#[async_trait]
pub trait Middleware: Send + Sync {
    /// 이름 (로그용)
    fn name(&self) -> &str;

    /// 처리
    ///
    /// `next.run(ctx)`를 호출하지 않으면 나머지 체인과 hook 본문이 취소됩니다.
    async fn handle(&self, ctx: &mut ExecutionContext, next: Next<'_>) -> Result<()>;
}

// ============================================================================
// Next - 체인의 나머지
// ============================================================================

/// 체인의 나머지 부분
pub struct Next<'a> {
    chain: &'a [Arc<dyn Middleware>],
    hook: Option<&'a dyn Hook>,
}

impl<'a> Next<'a> {
    fn new(chain: &'a [Arc<dyn Middleware>], hook: Option<&'a dyn Hook>) -> Self {
        Self { chain, hook }
    }

    /// 나머지 체인 실행 (끝에 도달하면 hook 본문 실행)
    pub fn run<'c>(self, ctx: &'c mut ExecutionContext) -> BoxFuture<'c, Result<()>>
    where
        'a: 'c,
    {
        async move {
            match self.chain.split_first() {
                Some((head, rest)) => head.handle(ctx, Next::new(rest, self.hook)).await,
                None => {
                    if let Some(hook) = self.hook {
                        let report = hook.execute(ctx).await?;
                        ctx.report = Some(report);
                        ctx.outcome = Outcome::Succeeded;
                    }
                    Ok(())
                }
            }
        }
        .boxed()
    }
}

// ============================================================================
// MiddlewarePipeline
// ============================================================================

/// 미들웨어 파이프라인
#[derive(Clone, Default)]
pub struct MiddlewarePipeline {
    phases: HashMap<Phase, Vec<Arc<dyn Middleware>>>,
}

impl MiddlewarePipeline {
    /// 빈 파이프라인
    pub fn new() -> Self {
        Self::default()
    }

    /// 미들웨어 추가 (등록 순서대로 실행)
    pub fn use_middleware(&mut self, phase: Phase, middleware: impl Middleware + 'static) -> &mut Self {
        self.use_shared(phase, Arc::new(middleware))
    }

    /// 공유 미들웨어 추가
    pub fn use_shared(&mut self, phase: Phase, middleware: Arc<dyn Middleware>) -> &mut Self {
        debug!("Registered middleware '{}' for {:?}", middleware.name(), phase);
        self.phases.entry(phase).or_default().push(middleware);
        self
    }

    /// 단계별 미들웨어 이름
    pub fn names(&self, phase: &Phase) -> Vec<String> {
        self.chain(phase)
            .iter()
            .map(|m| m.name().to_string())
            .collect()
    }

    fn chain(&self, phase: &Phase) -> &[Arc<dyn Middleware>] {
        self.phases.get(phase).map(Vec::as_slice).unwrap_or(&[])
    }

    /// hook 실행
    ///
    /// BEFORE 체인 → hook 본문 → AFTER 체인. AFTER 체인은 결과와 무관하게 실행되며
    /// BEFORE 체인/본문의 에러가 있으면 그 에러를 반환합니다.
    pub async fn run(&self, hook: &dyn Hook, ctx: &mut ExecutionContext) -> Result<()> {
        let result = Next::new(self.chain(&Phase::BeforeExecution), Some(hook))
            .run(ctx)
            .await;

        match &result {
            Err(e) => ctx.outcome = Outcome::Failed(e.to_string()),
            Ok(()) if ctx.outcome == Outcome::Pending => ctx.outcome = Outcome::Cancelled,
            Ok(()) => {}
        }

        let after = Next::new(self.chain(&Phase::AfterExecution), None)
            .run(ctx)
            .await;

        match (result, after) {
            (Err(e), Err(after_err)) => {
                warn!("After-execution middleware failed: {}", after_err);
                Err(e)
            }
            (Err(e), Ok(())) => Err(e),
            (Ok(()), after) => after,
        }
    }

    /// 사용자 정의 단계 실행 (hook 본문 없음)
    pub async fn run_phase(&self, phase: &Phase, ctx: &mut ExecutionContext) -> Result<()> {
        Next::new(self.chain(phase), None).run(ctx).await
    }
}

// ============================================================================
// 테스트
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hook::{
        schemas, Configurable, Executable, HookBase, HookDefinition, HookInit, HookReport,
        Installable,
    };
    use claude_hooks_foundation::{Error, MemoryLogger, SharedLogger};
    use serde_json::json;
    use std::sync::Mutex;
    use tempfile::TempDir;

    struct TestHook {
        base: HookBase,
        fail: bool,
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl Configurable for TestHook {
        fn base(&self) -> &HookBase {
            &self.base
        }
        fn base_mut(&mut self) -> &mut HookBase {
            &mut self.base
        }
    }

    impl Installable for TestHook {}

    #[async_trait]
    impl Executable for TestHook {
        async fn execute(&self, _ctx: &mut ExecutionContext) -> Result<HookReport> {
            self.calls.lock().unwrap().push("hook".into());
            if self.fail {
                Err(Error::execution("test", "boom"))
            } else {
                Ok(HookReport::passed("ok"))
            }
        }
    }

    struct Recorder {
        label: &'static str,
        calls: Arc<Mutex<Vec<String>>>,
        call_next: bool,
    }

    #[async_trait]
    impl Middleware for Recorder {
        fn name(&self) -> &str {
            self.label
        }

        async fn handle(&self, ctx: &mut ExecutionContext, next: Next<'_>) -> Result<()> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("{}:before:{}", self.label, ctx.outcome));
            if !self.call_next {
                return Ok(());
            }
            let result = next.run(ctx).await;
            self.calls
                .lock()
                .unwrap()
                .push(format!("{}:after", self.label));
            result
        }
    }

    fn setup(dir: &TempDir, fail: bool) -> (TestHook, Arc<Mutex<Vec<String>>>, SharedLogger) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let logger: SharedLogger = Arc::new(MemoryLogger::new());
        let hook = TestHook {
            base: HookBase::new(
                HookDefinition::new("test", "Test", "pre-commit"),
                schemas::base(),
                HookInit::new("test", dir.path(), logger.clone())
                    .with_defaults(json!({"enabled": true}).as_object().cloned().unwrap()),
            ),
            fail,
            calls: calls.clone(),
        };
        (hook, calls, logger)
    }

    fn recorder(label: &'static str, calls: &Arc<Mutex<Vec<String>>>, call_next: bool) -> Recorder {
        Recorder {
            label,
            calls: calls.clone(),
            call_next,
        }
    }

    #[tokio::test]
    async fn test_wrap_order_and_after_phase() {
        let dir = TempDir::new().unwrap();
        let (hook, calls, logger) = setup(&dir, false);

        let mut pipeline = MiddlewarePipeline::new();
        pipeline
            .use_middleware(Phase::BeforeExecution, recorder("a", &calls, true))
            .use_middleware(Phase::BeforeExecution, recorder("b", &calls, true))
            .use_middleware(Phase::AfterExecution, recorder("z", &calls, true));

        let mut ctx = ExecutionContext::for_hook(&hook, vec![], logger);
        pipeline.run(&hook, &mut ctx).await.unwrap();

        assert_eq!(
            *calls.lock().unwrap(),
            vec![
                "a:before:pending",
                "b:before:pending",
                "hook",
                "b:after",
                "a:after",
                "z:before:succeeded",
                "z:after",
            ]
        );
        assert_eq!(ctx.outcome, Outcome::Succeeded);
        assert!(ctx.report.as_ref().unwrap().passed);
    }

    #[tokio::test]
    async fn test_short_circuit_cancels_hook() {
        let dir = TempDir::new().unwrap();
        let (hook, calls, logger) = setup(&dir, false);

        let mut pipeline = MiddlewarePipeline::new();
        pipeline
            .use_middleware(Phase::BeforeExecution, recorder("gate", &calls, false))
            .use_middleware(Phase::BeforeExecution, recorder("later", &calls, true))
            .use_middleware(Phase::AfterExecution, recorder("after", &calls, true));

        let mut ctx = ExecutionContext::for_hook(&hook, vec![], logger);
        pipeline.run(&hook, &mut ctx).await.unwrap();

        let calls = calls.lock().unwrap().clone();
        assert!(!calls.contains(&"hook".to_string()));
        assert!(!calls.iter().any(|c| c.starts_with("later")));
        assert!(calls.contains(&"after:before:cancelled".to_string()));
        assert_eq!(ctx.outcome, Outcome::Cancelled);
    }

    #[tokio::test]
    async fn test_error_propagates_after_after_phase() {
        let dir = TempDir::new().unwrap();
        let (hook, calls, logger) = setup(&dir, true);

        let mut pipeline = MiddlewarePipeline::new();
        pipeline.use_middleware(Phase::AfterExecution, recorder("after", &calls, true));

        let mut ctx = ExecutionContext::for_hook(&hook, vec![], logger);
        let result = pipeline.run(&hook, &mut ctx).await;

        assert!(result.is_err());
        assert!(ctx.outcome.is_failed());
        assert!(calls
            .lock()
            .unwrap()
            .iter()
            .any(|c| c.starts_with("after:before:failed")));
    }

    #[tokio::test]
    async fn test_custom_phase() {
        let dir = TempDir::new().unwrap();
        let (hook, calls, logger) = setup(&dir, false);

        let mut pipeline = MiddlewarePipeline::new();
        pipeline.use_middleware(Phase::custom("notify"), recorder("n", &calls, true));
        assert_eq!(pipeline.names(&Phase::custom("notify")), vec!["n"]);

        let mut ctx = ExecutionContext::for_hook(&hook, vec![], logger);
        pipeline.run(&hook, &mut ctx).await.unwrap();
        assert!(!calls.lock().unwrap().iter().any(|c| c.starts_with("n:")));

        pipeline
            .run_phase(&Phase::custom("notify"), &mut ctx)
            .await
            .unwrap();
        assert!(calls.lock().unwrap().contains(&"n:after".to_string()));
    }
}
