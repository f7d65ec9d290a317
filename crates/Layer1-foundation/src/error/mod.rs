//! Error types for claude-hooks
//!
//! 모든 에러를 중앙에서 관리

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// claude-hooks 에러 타입
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // 설정 관련
    // ========================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    // ========================================================================
    // Discovery 관련
    // ========================================================================
    #[error("Discovery error: {0}")]
    Discovery(String),

    #[error("Hook not found: {0}")]
    HookNotFound(String),

    // ========================================================================
    // 실행 관련
    // ========================================================================
    #[error("Hook execution failed: {hook} - {message}")]
    Execution { hook: String, message: String },

    #[error("Command failed: {0}")]
    Command(String),

    #[error("Cancelled")]
    Cancelled,

    // ========================================================================
    // 외부 서비스 관련
    // ========================================================================
    #[error("Analysis service error: {0}")]
    Service(String),

    #[error("Missing secret: {0}")]
    MissingSecret(String),

    #[error("Git error: {0}")]
    Git(String),

    // ========================================================================
    // 외부 에러 변환
    // ========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ========================================================================
    // 기타
    // ========================================================================
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// 사용자에게 보여줄 수 있는 에러인지 확인
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Error::Config(_)
                | Error::Validation(_)
                | Error::HookNotFound(_)
                | Error::MissingSecret(_)
                | Error::Cancelled
        )
    }

    /// 인프라 계층 에러인지 확인 (항상 로컬에서 흡수됨)
    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            Error::Discovery(_) | Error::Io(_) | Error::Json(_) | Error::Config(_)
        )
    }

    /// Hook 실행 에러 생성 헬퍼
    pub fn execution(hook: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Execution {
            hook: hook.into(),
            message: message.into(),
        }
    }
}

// ============================================================================
// From 구현 (추가 변환)
// ============================================================================

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Internal(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Internal(s.to_string())
    }
}
