//! Hook Contract - hook이 구현해야 하는 capability trait
//!
//! - `Configurable`: 설정 상태 (enable/disable/strictness)
//! - `Installable`: git 스크립트 설치/제거
//! - `Executable`: 도메인 로직 (모든 hook 종류 필수)
//!
//! 세 trait을 모두 구현하면 blanket impl으로 `Hook`이 됩니다.
//! 공유 동작은 `HookBase`에 있으며 기본 메서드가 이를 위임합니다.

use super::base::HookBase;
use super::definition::{HookDefinition, HookReport};
use crate::middleware::ExecutionContext;
use async_trait::async_trait;
use claude_hooks_foundation::{BlockingMode, ConfigSchema, Result, Strictness};
use serde_json::{Map, Value};

// ============================================================================
// Configurable
// ============================================================================

/// 설정 가능한 hook
pub trait Configurable: Send + Sync {
    fn base(&self) -> &HookBase;

    fn base_mut(&mut self) -> &mut HookBase;

    fn definition(&self) -> &HookDefinition {
        self.base().definition()
    }

    fn id(&self) -> &str {
        self.base().id()
    }

    fn schema(&self) -> &ConfigSchema {
        self.base().schema()
    }

    fn is_enabled(&self) -> bool {
        self.base().is_enabled()
    }

    fn enable(&mut self) {
        self.base_mut().set_enabled(true);
    }

    fn disable(&mut self) {
        self.base_mut().set_enabled(false);
    }

    fn strictness(&self) -> Strictness {
        self.base().strictness()
    }

    fn set_strictness(&mut self, strictness: Strictness) {
        self.base_mut().set_strictness(strictness);
    }

    fn blocking_mode(&self) -> BlockingMode {
        self.base().blocking_mode()
    }

    fn set_blocking_mode(&mut self, mode: BlockingMode) {
        self.base_mut().set_blocking_mode(mode);
    }

    /// 현재 설정 (검증된 스키마 형태)
    fn config(&self) -> Map<String, Value> {
        self.base().config()
    }
}

// ============================================================================
// Installable
// ============================================================================

/// git hook 스크립트로 설치 가능한 hook
#[async_trait]
pub trait Installable: Configurable {
    fn generate_hook_script(&self) -> String {
        self.base().generate_hook_script()
    }

    /// 설치 (비활성이면 false)
    async fn setup(&self) -> Result<bool> {
        self.base().setup().await
    }

    /// 제거 (관리 파일이 아니면 false)
    async fn remove(&self) -> Result<bool> {
        self.base().remove().await
    }
}

// ============================================================================
// Executable
// ============================================================================

/// 도메인 로직
#[async_trait]
pub trait Executable: Send + Sync {
    /// 실행
    ///
    /// `ctx.config`에는 파이프라인이 해석한 최종 설정이 들어 있습니다.
    async fn execute(&self, ctx: &mut ExecutionContext) -> Result<HookReport>;
}

// ============================================================================
// Hook
// ============================================================================

/// 완전한 hook
pub trait Hook: Installable + Executable {}

impl<T: Installable + Executable> Hook for T {}
