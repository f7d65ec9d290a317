//! Logger - 사용자 출력용 로거
//!
//! Hook 출력은 모두 레벨이 지정된 `Logger` 호출을 거칩니다.
//!
//! - `ConsoleLogger`: 단독 실행용 (색상 있는 터미널 출력)
//! - `TracingLogger`: 임베딩용 (`tracing`으로 전달)
//! - `MemoryLogger`: 출력 수집용 (테스트, 임베딩 호스트)
//!
//! 내부 진단 로그는 이와 별개로 `tracing` 매크로를 사용합니다.

use crossterm::style::Stylize;
use std::sync::{Arc, Mutex};

/// 공유 로거 핸들
pub type SharedLogger = Arc<dyn Logger>;

// ============================================================================
// LogLevel
// ============================================================================

/// 로그 레벨
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Debug,
    Info,
    Success,
    Warn,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Success => write!(f, "success"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

// ============================================================================
// Logger trait
// ============================================================================

/// 레벨 로거
pub trait Logger: Send + Sync {
    /// 메시지 기록
    fn log(&self, level: LogLevel, message: &str);

    fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, message);
    }

    fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }

    fn success(&self, message: &str) {
        self.log(LogLevel::Success, message);
    }
}

// ============================================================================
// ConsoleLogger
// ============================================================================

/// 터미널 출력 로거 (기본 sink)
#[derive(Debug, Clone)]
pub struct ConsoleLogger {
    /// 최소 출력 레벨
    min_level: LogLevel,
}

impl ConsoleLogger {
    pub fn new() -> Self {
        Self {
            min_level: LogLevel::Info,
        }
    }

    /// 디버그 출력 포함
    pub fn verbose() -> Self {
        Self {
            min_level: LogLevel::Debug,
        }
    }

    pub fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    pub fn shared(self) -> SharedLogger {
        Arc::new(self)
    }
}

impl Default for ConsoleLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger for ConsoleLogger {
    fn log(&self, level: LogLevel, message: &str) {
        if level < self.min_level {
            return;
        }

        match level {
            LogLevel::Debug => println!("{}", format!("[debug] {}", message).dark_grey()),
            LogLevel::Info => println!("{} {}", "ℹ".blue(), message),
            LogLevel::Success => println!("{} {}", "✓".green(), message.green()),
            LogLevel::Warn => eprintln!("{} {}", "⚠".yellow(), message.yellow()),
            LogLevel::Error => eprintln!("{} {}", "✗".red(), message.red()),
        }
    }
}

// ============================================================================
// TracingLogger
// ============================================================================

/// `tracing`으로 전달하는 로거 (임베딩 모드)
#[derive(Debug, Clone, Default)]
pub struct TracingLogger;

impl TracingLogger {
    pub fn shared() -> SharedLogger {
        Arc::new(Self)
    }
}

impl Logger for TracingLogger {
    fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Debug => tracing::debug!("{}", message),
            LogLevel::Info => tracing::info!("{}", message),
            LogLevel::Success => tracing::info!(success = true, "{}", message),
            LogLevel::Warn => tracing::warn!("{}", message),
            LogLevel::Error => tracing::error!("{}", message),
        }
    }
}

// ============================================================================
// MemoryLogger
// ============================================================================

/// 기록된 로그 항목
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
}

/// 메모리에 기록하는 로거
#[derive(Debug, Default)]
pub struct MemoryLogger {
    entries: Mutex<Vec<LogEntry>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// 기록된 항목 복사본
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    /// 특정 레벨 항목 수
    pub fn count(&self, level: LogLevel) -> usize {
        self.entries().iter().filter(|e| e.level == level).count()
    }

    /// 특정 레벨에서 문자열을 포함하는 항목이 있는지 확인
    pub fn contains(&self, level: LogLevel, needle: &str) -> bool {
        self.entries()
            .iter()
            .any(|e| e.level == level && e.message.contains(needle))
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }
}

impl Logger for MemoryLogger {
    fn log(&self, level: LogLevel, message: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(LogEntry {
                level,
                message: message.to_string(),
            });
        }
    }
}
