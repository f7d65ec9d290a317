//! Config - 프레임워크 설정
//!
//! Hook별 설정(`.claude/hooks.json`)과 별개로, 러너 명령/모델/API 주소 등
//! 프레임워크 동작을 결정하는 값들입니다. 환경변수에서 읽고 CLI 플래그가 덮어씁니다.

use std::path::{Path, PathBuf};

/// 생성된 스크립트가 호출할 기본 러너 명령
pub const DEFAULT_RUNNER: &str = "claude-hooks";

/// 기본 분석 모델
pub const DEFAULT_MODEL: &str = "claude-3-5-haiku-latest";

/// 기본 API 주소
pub const DEFAULT_API_BASE_URL: &str = "https://api.anthropic.com";

/// 프레임워크 설정
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// 프로젝트 루트 (git 저장소 루트)
    pub project_root: PathBuf,

    /// 파일시스템을 건드리지 않고 의도만 로그
    pub dry_run: bool,

    /// 스크립트 dispatch 명령 (CLAUDE_HOOKS_RUNNER)
    pub runner: String,

    /// 분석 모델 (CLAUDE_HOOKS_MODEL)
    pub model: String,

    /// API 주소 (ANTHROPIC_BASE_URL)
    pub api_base_url: String,

    /// 추가 core hook 디렉토리 (CLAUDE_HOOKS_CORE_DIR)
    pub core_dir: Option<PathBuf>,
}

impl Settings {
    /// 기본값으로 생성
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            dry_run: false,
            runner: DEFAULT_RUNNER.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            core_dir: None,
        }
    }

    /// 환경변수 반영
    pub fn from_env(project_root: impl Into<PathBuf>) -> Self {
        Self::new(project_root).apply_env(|key| std::env::var(key).ok())
    }

    fn apply_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(runner) = lookup("CLAUDE_HOOKS_RUNNER") {
            self.runner = runner;
        }
        if let Some(model) = lookup("CLAUDE_HOOKS_MODEL") {
            self.model = model;
        }
        if let Some(url) = lookup("ANTHROPIC_BASE_URL") {
            self.api_base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(dir) = lookup("CLAUDE_HOOKS_CORE_DIR") {
            self.core_dir = Some(PathBuf::from(dir));
        }
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_runner(mut self, runner: impl Into<String>) -> Self {
        self.runner = runner.into();
        self
    }

    pub fn with_core_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.core_dir = Some(dir.into());
        self
    }

    /// `.git/hooks` 경로
    pub fn git_hooks_dir(&self) -> PathBuf {
        git_hooks_dir(&self.project_root)
    }
}

/// `<project>/.git/hooks`
pub fn git_hooks_dir(project_root: &Path) -> PathBuf {
    project_root.join(".git").join("hooks")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let settings = Settings::new("/repo");
        assert_eq!(settings.runner, DEFAULT_RUNNER);
        assert!(!settings.dry_run);
        assert_eq!(settings.git_hooks_dir(), PathBuf::from("/repo/.git/hooks"));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("CLAUDE_HOOKS_RUNNER", "npx claude-hooks"),
            ("ANTHROPIC_BASE_URL", "http://localhost:8080/"),
            ("CLAUDE_HOOKS_MODEL", "  "),
        ]
        .into_iter()
        .collect();

        let settings =
            Settings::new("/repo").apply_env(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(settings.runner, "npx claude-hooks");
        assert_eq!(settings.api_base_url, "http://localhost:8080");
        assert_eq!(settings.model, DEFAULT_MODEL);
        assert!(settings.core_dir.is_none());
    }
}
