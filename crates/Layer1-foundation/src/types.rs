//! 공용 타입 - Strictness, BlockingMode, HookSource

use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

// ============================================================================
// Strictness
// ============================================================================

/// 분석 엄격도
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strictness {
    Low,
    #[default]
    Medium,
    High,
}

impl Strictness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl std::fmt::Display for Strictness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strictness {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(crate::Error::Validation(format!(
                "Invalid strictness '{}': expected low, medium or high",
                other
            ))),
        }
    }
}

// ============================================================================
// BlockingMode
// ============================================================================

/// 실패 시 git 동작 결정
///
/// - `Block`: non-zero exit (git 작업 중단)
/// - `Warn`: 경고 출력 후 exit 0
/// - `None`: 조용히 통과
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockingMode {
    Block,
    #[default]
    Warn,
    None,
}

impl BlockingMode {
    /// 레거시 boolean 값 변환 (true → block, false → warn)
    pub fn from_legacy(blocking: bool) -> Self {
        if blocking {
            Self::Block
        } else {
            Self::Warn
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Block => "block",
            Self::Warn => "warn",
            Self::None => "none",
        }
    }
}

impl std::fmt::Display for BlockingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlockingMode {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "block" => Ok(Self::Block),
            "warn" => Ok(Self::Warn),
            "none" => Ok(Self::None),
            other => Err(crate::Error::Validation(format!(
                "Invalid blocking mode '{}': expected block, warn or none",
                other
            ))),
        }
    }
}

// 레거시 설정 파일의 boolean 값도 허용
impl<'de> Deserialize<'de> for BlockingMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Legacy(bool),
            Mode(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Legacy(b) => Ok(Self::from_legacy(b)),
            Raw::Mode(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

// ============================================================================
// HookSource
// ============================================================================

/// Hook 출처
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum HookSource {
    /// 프레임워크 내장
    Core,
    /// `.claude/hooks/`
    Project,
    /// npm 플러그인 패키지
    Plugin { package: String },
    /// `.claude/user-hooks/`
    User,
}

impl HookSource {
    pub fn label(&self) -> &str {
        match self {
            Self::Core => "core",
            Self::Project => "project",
            Self::Plugin { .. } => "plugin",
            Self::User => "user",
        }
    }
}

impl std::fmt::Display for HookSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plugin { package } => write!(f, "plugin:{}", package),
            other => f.write_str(other.label()),
        }
    }
}
