//! # Middleware Pipeline
//!
//! 모든 hook 실행을 감싸는 횡단 관심사 (로깅, 설정 주입, git 컨텍스트, 분석 서비스).
//!
//! ## 예시
//!
//! ```ignore
//! let mut pipeline = standard_pipeline();
//! pipeline.use_middleware(Phase::AfterExecution, MyReporter);
//!
//! let mut ctx = ExecutionContext::for_hook(hook, args, logger);
//! pipeline.run(hook, &mut ctx).await?;
//! ```

mod builtin;
mod context;
mod pipeline;

pub(crate) use builtin::IDENTITY_KEYS;
pub use builtin::{
    standard_pipeline, AnalysisMiddleware, ConfigMiddleware, EnabledGuard, ErrorBoundary,
    GitContextMiddleware, LoggingMiddleware,
};
pub use context::{ExecutionContext, GitSnapshot, Outcome, Services};
pub use pipeline::{Middleware, MiddlewarePipeline, Next, Phase};
