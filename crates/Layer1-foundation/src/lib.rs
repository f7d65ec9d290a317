//! # claude-hooks-foundation
//!
//! Foundation layer for claude-hooks:
//! - Error: 중앙 에러 타입
//! - Logging: 사용자 출력용 `Logger` (console / tracing / memory)
//! - Schema: 설정 스키마 + 검증기 + 기본값 적용
//! - Storage: JsonStore (`.claude/hooks.json`)
//! - Config: 프레임워크 설정 (`Settings`)
//! - Secrets: `.env` 기반 비밀값 조회

pub mod config;
pub mod error;
pub mod logging;
pub mod schema;
pub mod secrets;
pub mod storage;
pub mod types;

// ============================================================================
// Error
// ============================================================================
pub use error::{Error, Result};

// ============================================================================
// Logging
// ============================================================================
pub use logging::{
    ConsoleLogger, LogEntry, LogLevel, Logger, MemoryLogger, SharedLogger, TracingLogger,
};

// ============================================================================
// Schema
// ============================================================================
pub use schema::{
    apply_defaults, validate, validate_property, ConfigSchema, PropertyKind, PropertySpec,
    SchemaBuilder, ValidationReport,
};

// ============================================================================
// Storage / Config / Secrets
// ============================================================================
pub use config::{git_hooks_dir, Settings, DEFAULT_MODEL, DEFAULT_RUNNER};
pub use secrets::SecretStore;
pub use storage::{JsonStore, HOOKS_CONFIG_FILE};

// ============================================================================
// Types
// ============================================================================
pub use types::{BlockingMode, HookSource, Strictness};
