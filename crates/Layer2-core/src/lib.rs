//! claude-hooks-core: Core Runtime for claude-hooks
//!
//! Layer2 - hook 계약, 미들웨어, 탐색, 레지스트리
//!
//! # 주요 모듈
//!
//! - `hook`: Hook 계약 (Configurable / Installable / Executable) + HookBase
//! - `middleware`: 실행 파이프라인 (before / after 단계)
//! - `discovery`: core / project / plugin / user 탐색 + resolver
//! - `registry`: 등록, 일괄 설치/제거, 설정 저장, git hook 실행
//! - `compat`: legacy hook 어댑터
//! - `builtin`: 내장 hook (commit-msg, pre-commit, pre-push, script)
//! - `git`: 읽기 전용 git 조회
//! - `analysis`: AI 분석 서비스
//!
//! # 사용 예시
//!
//! ```ignore
//! use claude_hooks_core::{HookDiscovery, HookLoader, HookRegistry};
//!
//! let discovery = HookDiscovery::new(&settings.project_root);
//! let loader = HookLoader::new(logger.clone());
//!
//! let mut registry = HookRegistry::new(&settings, logger);
//! registry.register_discovered(&discovery.discover_all().await, &loader);
//! registry.load_config()?;
//!
//! // git이 호출하는 스크립트에서
//! let fire = registry.run_git_hook("pre-commit", &args).await;
//! std::process::exit(fire.exit_code);
//! ```

pub mod analysis;
pub mod builtin;
pub mod compat;
pub mod discovery;
pub mod git;
pub mod hook;
pub mod middleware;
pub mod registry;

// Re-exports: Hook
pub use hook::{
    Configurable, Executable, Hook, HookBase, HookDefinition, HookInit, HookReport, Installable,
    ScriptInstaller, MANAGED_MARKER,
};

// Re-exports: Middleware
pub use middleware::{
    standard_pipeline, ExecutionContext, Middleware, MiddlewarePipeline, Next, Outcome, Phase,
    Services,
};

// Re-exports: Discovery
pub use discovery::{HookDiscovery, HookFactory, HookLoader, HookModuleDescriptor, HookResolver};

// Re-exports: Registry
pub use registry::{BatchReport, FireReport, FiredHook, HookRegistry, HookSummary};

// Re-exports: Compat
pub use compat::{LegacyFacade, LegacyHook, LegacyHookAdapter};

// Re-exports: Services
pub use analysis::{AnalysisService, AnthropicService};
pub use git::{GitInspector, GitOps};
