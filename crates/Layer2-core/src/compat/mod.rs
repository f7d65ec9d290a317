//! Compatibility Adapter - 레거시(비-미들웨어) hook 연동
//!
//! - `LegacyHookAdapter`: 레거시 hook을 `Hook`으로 감싸 파이프라인에서 실행
//! - `LegacyFacade`: 현재 hook을 레거시 직접 호출 인터페이스로 노출
//! - `normalize_legacy_config`: boolean `blockingMode` → block / warn
//!
//! 어느 쪽도 enable/disable/setup/remove 동작을 바꾸지 않습니다.

use crate::discovery::HookFactory;
use crate::hook::{
    schemas, Configurable, Executable, Hook, HookBase, HookDefinition, HookInit, HookReport,
    Installable,
};
use crate::middleware::ExecutionContext;
use async_trait::async_trait;
use claude_hooks_foundation::{BlockingMode, Result, SharedLogger};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

// ============================================================================
// 레거시 설정 변환
// ============================================================================

/// boolean `blockingMode`를 tri-state 값으로 변환
pub fn normalize_legacy_config(mut config: Map<String, Value>) -> Map<String, Value> {
    if let Some(Value::Bool(blocking)) = config.get("blockingMode") {
        let mode = BlockingMode::from_legacy(*blocking);
        config.insert("blockingMode".into(), Value::from(mode.as_str()));
    }
    config
}

/// 레거시 hook 설정
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strictness: Option<String>,

    /// true → block, false → warn
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocking_mode: Option<bool>,

    #[serde(flatten)]
    pub options: Map<String, Value>,
}

impl LegacyConfig {
    /// 현재 설정 맵으로 변환
    pub fn into_config(self) -> Map<String, Value> {
        let mut config = self.options;
        config.insert("enabled".into(), Value::Bool(self.enabled));
        if let Some(strictness) = self.strictness {
            config.insert("strictness".into(), Value::from(strictness));
        }
        if let Some(blocking) = self.blocking_mode {
            config.insert(
                "blockingMode".into(),
                Value::from(BlockingMode::from_legacy(blocking).as_str()),
            );
        }
        config
    }
}

// ============================================================================
// LegacyHook - 레거시 직접 호출 인터페이스
// ============================================================================

/// 미들웨어 없이 직접 호출되는 hook
#[async_trait]
pub trait LegacyHook: Send + Sync {
    fn id(&self) -> &str;

    fn name(&self) -> &str;

    fn git_hook_name(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    fn legacy_config(&self) -> LegacyConfig;

    /// 실행 (true = 통과)
    async fn run(&self, args: &[String]) -> Result<bool>;
}

// ============================================================================
// LegacyHookAdapter - 레거시 → Hook
// ============================================================================

/// 레거시 hook을 파이프라인에서 실행하기 위한 어댑터
pub struct LegacyHookAdapter {
    base: HookBase,
    inner: Arc<dyn LegacyHook>,
}

impl LegacyHookAdapter {
    pub fn new(inner: Arc<dyn LegacyHook>, init: HookInit) -> Self {
        let definition = HookDefinition::new(inner.id(), inner.name(), inner.git_hook_name())
            .with_description(inner.description());
        Self {
            base: HookBase::new(definition, schemas::base(), init),
            inner,
        }
    }

    /// 레지스트리 등록용 팩토리
    pub fn factory(inner: Arc<dyn LegacyHook>) -> HookFactory {
        let definition = HookDefinition::new(inner.id(), inner.name(), inner.git_hook_name())
            .with_description(inner.description());
        let defaults = inner.legacy_config().into_config();

        HookFactory::new(definition, defaults, move |init| {
            Box::new(LegacyHookAdapter::new(inner.clone(), init)) as Box<dyn Hook>
        })
    }
}

impl Configurable for LegacyHookAdapter {
    fn base(&self) -> &HookBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut HookBase {
        &mut self.base
    }
}

impl Installable for LegacyHookAdapter {}

#[async_trait]
impl Executable for LegacyHookAdapter {
    async fn execute(&self, ctx: &mut ExecutionContext) -> Result<HookReport> {
        let passed = self.inner.run(&ctx.args).await?;
        let name = self.inner.name();
        Ok(if passed {
            HookReport::passed(format!("{} passed", name))
        } else {
            HookReport::failed(format!("{} reported a failure", name), Vec::new())
        })
    }
}

// ============================================================================
// LegacyFacade - Hook → 레거시
// ============================================================================

/// 현재 hook을 레거시 인터페이스로 노출 (파이프라인 없이 직접 실행)
pub struct LegacyFacade<'a> {
    hook: &'a dyn Hook,
    logger: SharedLogger,
}

impl<'a> LegacyFacade<'a> {
    pub fn new(hook: &'a dyn Hook, logger: SharedLogger) -> Self {
        Self { hook, logger }
    }
}

#[async_trait]
impl<'a> LegacyHook for LegacyFacade<'a> {
    fn id(&self) -> &str {
        self.hook.id()
    }

    fn name(&self) -> &str {
        &self.hook.definition().name
    }

    fn git_hook_name(&self) -> &str {
        &self.hook.definition().git_hook_name
    }

    fn description(&self) -> &str {
        &self.hook.definition().description
    }

    fn legacy_config(&self) -> LegacyConfig {
        let mut options = self.hook.config();
        for key in crate::hook::CORE_KEYS {
            options.remove(key);
        }
        LegacyConfig {
            enabled: self.hook.is_enabled(),
            strictness: Some(self.hook.strictness().to_string()),
            blocking_mode: Some(self.hook.blocking_mode() == BlockingMode::Block),
            options,
        }
    }

    async fn run(&self, args: &[String]) -> Result<bool> {
        let mut ctx = ExecutionContext::for_hook(self.hook, args.to_vec(), self.logger.clone());
        let report = self.hook.execute(&mut ctx).await?;
        Ok(report.passed)
    }
}
