//! Hook Base - 모든 hook이 공유하는 상태와 동작
//!
//! 각 hook 종류는 `HookBase`를 필드로 포함하고 `Configurable::base()`로 노출합니다.
//! 설정 상태, 스크립트 설치/제거, 외부 명령 실행, 비밀값 조회를 담당합니다.

use super::definition::HookDefinition;
use super::installer::ScriptInstaller;
use crate::compat::normalize_legacy_config;
use claude_hooks_foundation::{
    git_hooks_dir, BlockingMode, ConfigSchema, Error, Result, SecretStore, SharedLogger,
    Strictness, DEFAULT_RUNNER,
};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// 타입 필드로 관리되는 설정 키
pub const CORE_KEYS: [&str; 3] = ["enabled", "strictness", "blockingMode"];

// ============================================================================
// HookInit - 생성 인자
// ============================================================================

/// Registry가 hook 생성자에 전달하는 인자
#[derive(Clone)]
pub struct HookInit {
    /// 등록 ID
    pub id: String,

    /// 기본 설정
    pub defaults: Map<String, Value>,

    /// 프로젝트 루트
    pub project_root: PathBuf,

    /// 출력 로거
    pub logger: SharedLogger,

    /// dry-run 여부
    pub dry_run: bool,

    /// 생성 스크립트의 dispatch 명령
    pub runner: String,
}

impl HookInit {
    pub fn new(id: impl Into<String>, project_root: impl Into<PathBuf>, logger: SharedLogger) -> Self {
        Self {
            id: id.into(),
            defaults: Map::new(),
            project_root: project_root.into(),
            logger,
            dry_run: false,
            runner: DEFAULT_RUNNER.to_string(),
        }
    }

    pub fn with_defaults(mut self, defaults: Map<String, Value>) -> Self {
        self.defaults = defaults;
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
}

// ============================================================================
// CommandOutput
// ============================================================================

/// 외부 명령 실행 결과
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

// ============================================================================
// HookBase
// ============================================================================

/// 공유 hook 컴포넌트
#[derive(Clone)]
pub struct HookBase {
    definition: HookDefinition,
    schema: ConfigSchema,
    enabled: bool,
    strictness: Strictness,
    blocking_mode: BlockingMode,
    options: Map<String, Value>,
    project_root: PathBuf,
    logger: SharedLogger,
    installer: ScriptInstaller,
    secrets: SecretStore,
}

impl HookBase {
    /// 기본값 적용 후 생성
    pub fn new(definition: HookDefinition, schema: ConfigSchema, init: HookInit) -> Self {
        let definition = definition.with_id(init.id);
        let config = schema.apply_defaults(&normalize_legacy_config(init.defaults));

        let report = schema.validate(&config);
        if !report.is_valid {
            init.logger.warn(&format!(
                "Invalid configuration for hook '{}': {}",
                definition.id,
                report.errors.join("; ")
            ));
        }

        let installer = ScriptInstaller::new(
            git_hooks_dir(&init.project_root),
            init.runner,
            init.logger.clone(),
        )
        .with_dry_run(init.dry_run);

        let mut base = Self {
            definition,
            schema,
            enabled: false,
            strictness: Strictness::default(),
            blocking_mode: BlockingMode::default(),
            options: Map::new(),
            secrets: SecretStore::for_project(&init.project_root),
            project_root: init.project_root,
            logger: init.logger,
            installer,
        };
        base.apply_config(&config);
        base
    }

    // ========================================================================
    // 접근자
    // ========================================================================

    pub fn definition(&self) -> &HookDefinition {
        &self.definition
    }

    pub fn id(&self) -> &str {
        &self.definition.id
    }

    pub fn schema(&self) -> &ConfigSchema {
        &self.schema
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn logger(&self) -> &SharedLogger {
        &self.logger
    }

    pub fn installer(&self) -> &ScriptInstaller {
        &self.installer
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn strictness(&self) -> Strictness {
        self.strictness
    }

    pub fn set_strictness(&mut self, strictness: Strictness) {
        self.strictness = strictness;
    }

    pub fn blocking_mode(&self) -> BlockingMode {
        self.blocking_mode
    }

    pub fn set_blocking_mode(&mut self, mode: BlockingMode) {
        self.blocking_mode = mode;
    }

    /// 도메인 옵션 (enabled/strictness/blockingMode 제외)
    pub fn options(&self) -> &Map<String, Value> {
        &self.options
    }

    // ========================================================================
    // 설정
    // ========================================================================

    /// 전체 설정 맵
    pub fn config(&self) -> Map<String, Value> {
        let mut config = self.options.clone();
        config.insert("enabled".into(), Value::Bool(self.enabled));
        config.insert("strictness".into(), Value::from(self.strictness.as_str()));
        config.insert(
            "blockingMode".into(),
            Value::from(self.blocking_mode.as_str()),
        );
        config
    }

    /// 설정 맵 반영 (없는 키는 현재 값 유지)
    pub fn apply_config(&mut self, config: &Map<String, Value>) {
        if let Some(enabled) = config.get("enabled").and_then(Value::as_bool) {
            self.enabled = enabled;
        }
        if let Some(strictness) = config
            .get("strictness")
            .and_then(Value::as_str)
            .and_then(|s| s.parse().ok())
        {
            self.strictness = strictness;
        }
        if let Some(mode) = config
            .get("blockingMode")
            .and_then(|v| serde_json::from_value::<BlockingMode>(v.clone()).ok())
        {
            self.blocking_mode = mode;
        }

        self.options = config
            .iter()
            .filter(|(k, _)| !CORE_KEYS.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
    }

    // ========================================================================
    // 설치
    // ========================================================================

    pub fn generate_hook_script(&self) -> String {
        self.installer
            .generate_script(&self.definition.name, &self.definition.git_hook_name)
    }

    /// 스크립트 설치 (비활성 hook은 false)
    pub async fn setup(&self) -> Result<bool> {
        if !self.enabled {
            self.logger.info(&format!(
                "Hook '{}' is disabled; skipping setup",
                self.definition.id
            ));
            return Ok(false);
        }

        let script = self.generate_hook_script();
        self.installer
            .install(&self.definition.git_hook_name, &script)
            .await
    }

    /// 스크립트 제거
    pub async fn remove(&self) -> Result<bool> {
        self.installer
            .uninstall(&self.definition.git_hook_name)
            .await
    }

    // ========================================================================
    // 실행 도구
    // ========================================================================

    /// 프로젝트 루트에서 외부 명령 실행
    pub async fn run_command(
        &self,
        program: &str,
        args: &[String],
        envs: &[(String, String)],
    ) -> Result<CommandOutput> {
        debug!("Running {} {:?}", program, args);

        let output = Command::new(program)
            .args(args)
            .envs(envs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .current_dir(&self.project_root)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| Error::Command(format!("Failed to run {}: {}", program, e)))?;

        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }

    /// 비밀값 조회
    pub fn load_secret(&self, key: &str) -> Option<String> {
        self.secrets.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hook::schemas;
    use claude_hooks_foundation::{LogLevel, MemoryLogger};
    use serde_json::json;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn base_with(dir: &TempDir, defaults: Value, logger: Arc<MemoryLogger>) -> HookBase {
        let defaults = match defaults {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        HookBase::new(
            HookDefinition::new("pre-commit", "Pre Commit", "pre-commit"),
            schemas::pre_commit(),
            HookInit::new("pre-commit", dir.path(), logger).with_defaults(defaults),
        )
    }

    #[test]
    fn test_defaults_applied() {
        let dir = TempDir::new().unwrap();
        let base = base_with(&dir, json!({}), Arc::new(MemoryLogger::new()));

        assert!(!base.is_enabled());
        assert_eq!(base.strictness(), Strictness::Medium);
        assert_eq!(base.blocking_mode(), BlockingMode::Warn);
        assert_eq!(base.options()["maxDiffSize"], json!(50_000));
        assert!(!base.options().contains_key("enabled"));
    }

    #[test]
    fn test_legacy_blocking_bool_translated() {
        let dir = TempDir::new().unwrap();
        let logger = Arc::new(MemoryLogger::new());
        let base = base_with(
            &dir,
            json!({"enabled": true, "blockingMode": true}),
            logger.clone(),
        );

        assert!(base.is_enabled());
        assert_eq!(base.blocking_mode(), BlockingMode::Block);
        assert_eq!(logger.count(LogLevel::Warn), 0);
    }

    #[test]
    fn test_config_round_trip() {
        let dir = TempDir::new().unwrap();
        let mut base = base_with(&dir, json!({}), Arc::new(MemoryLogger::new()));
        base.set_strictness(Strictness::High);

        let config = base.config();
        assert_eq!(config["strictness"], json!("high"));
        assert_eq!(config["blockingMode"], json!("warn"));
        assert!(base.schema().validate(&config).is_valid);
    }

    #[tokio::test]
    async fn test_disabled_setup_returns_false() {
        let dir = TempDir::new().unwrap();
        let base = base_with(&dir, json!({}), Arc::new(MemoryLogger::new()));
        assert!(!base.setup().await.unwrap());
        assert!(!dir.path().join(".git/hooks/pre-commit").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_command() {
        let dir = TempDir::new().unwrap();
        let base = base_with(&dir, json!({}), Arc::new(MemoryLogger::new()));
        let output = base
            .run_command(
                "sh",
                &["-c".to_string(), "echo $GREETING".to_string()],
                &[("GREETING".to_string(), "hello".to_string())],
            )
            .await
            .unwrap();
        assert!(output.success());
        assert_eq!(output.stdout.trim(), "hello");
    }
}
