//! HookRegistry - 등록된 hook 관리
//!
//! hook 인스턴스를 id로 보관하고, 일괄 설치/제거, 설정 저장/복원,
//! git hook 실행(dispatch)을 담당합니다.

use super::report::{BatchReport, FireReport, FiredHook, HookSummary};
use crate::compat::normalize_legacy_config;
use crate::discovery::{is_known_git_hook, HookFactory, HookLoader, HookModuleDescriptor};
use crate::hook::{Hook, HookInit};
use crate::middleware::{
    standard_pipeline, ExecutionContext, MiddlewarePipeline, Outcome, Services, IDENTITY_KEYS,
};
use claude_hooks_foundation::{
    BlockingMode, JsonStore, Result, Settings, SharedLogger, Strictness, ValidationReport,
    HOOKS_CONFIG_FILE,
};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::debug;

/// 설정 문서 버전
pub const CONFIG_VERSION: &str = "1.0.0";

struct RegisteredHook {
    hook: Box<dyn Hook>,
    load_order: u64,
}

// ============================================================================
// HookRegistry
// ============================================================================

/// Hook 레지스트리
pub struct HookRegistry {
    hooks: HashMap<String, RegisteredHook>,
    load_counter: u64,
    project_root: PathBuf,
    dry_run: bool,
    runner: String,
    logger: SharedLogger,
    pipeline: MiddlewarePipeline,
    services: Services,
    store: JsonStore,
}

impl HookRegistry {
    pub fn new(settings: &Settings, logger: SharedLogger) -> Self {
        Self {
            hooks: HashMap::new(),
            load_counter: 0,
            project_root: settings.project_root.clone(),
            dry_run: settings.dry_run,
            runner: settings.runner.clone(),
            logger,
            pipeline: standard_pipeline(),
            services: Services::default(),
            store: JsonStore::project(&settings.project_root),
        }
    }

    pub fn with_pipeline(mut self, pipeline: MiddlewarePipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    pub fn with_services(mut self, services: Services) -> Self {
        self.services = services;
        self
    }

    pub fn pipeline_mut(&mut self) -> &mut MiddlewarePipeline {
        &mut self.pipeline
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn config_path(&self) -> PathBuf {
        self.store.file_path(HOOKS_CONFIG_FILE)
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    // ========================================================================
    // 등록
    // ========================================================================

    /// hook 생성 후 등록 (같은 id는 교체)
    pub fn register_hook<F>(&mut self, id: impl Into<String>, constructor: F, defaults: Map<String, Value>)
    where
        F: FnOnce(HookInit) -> Box<dyn Hook>,
    {
        let id = id.into();
        let init = HookInit::new(&id, &self.project_root, self.logger.clone())
            .with_defaults(defaults)
            .with_dry_run(self.dry_run)
            .with_runner(&self.runner);

        if self.hooks.contains_key(&id) {
            self.logger
                .warn(&format!("Hook '{}' is already registered; replacing it", id));
        }

        self.load_counter += 1;
        let hook = constructor(init);
        debug!("Registered hook '{}' ({})", id, hook.definition().source);
        self.hooks.insert(
            id,
            RegisteredHook {
                hook,
                load_order: self.load_counter,
            },
        );
    }

    pub fn register_factory(&mut self, factory: &HookFactory) {
        self.register_hook(
            factory.id(),
            |init| factory.build(init),
            factory.defaults.clone(),
        );
    }

    /// 발견된 모듈 등록 (resolver 실패는 건너뜀)
    pub fn register_discovered(
        &mut self,
        descriptors: &[HookModuleDescriptor],
        loader: &HookLoader,
    ) -> usize {
        let mut registered = 0;
        for descriptor in descriptors {
            if let Some(factory) = loader.load_hook_module(descriptor) {
                let git_hook_name = &factory.definition.git_hook_name;
                if !is_known_git_hook(git_hook_name) {
                    self.logger.warn(&format!(
                        "Hook '{}' targets '{}', which git never runs; declare `gitHookName: <git hook>` in its header",
                        factory.id(),
                        git_hook_name
                    ));
                }
                self.register_factory(&factory);
                registered += 1;
            }
        }
        registered
    }

    // ========================================================================
    // 조회
    // ========================================================================

    pub fn get_hook(&self, id: &str) -> Option<&dyn Hook> {
        self.hooks.get(id).map(|entry| entry.hook.as_ref())
    }

    /// 등록 순서대로
    pub fn get_all_hooks(&self) -> Vec<&dyn Hook> {
        let mut entries: Vec<&RegisteredHook> = self.hooks.values().collect();
        entries.sort_by_key(|entry| entry.load_order);
        entries.into_iter().map(|entry| entry.hook.as_ref()).collect()
    }

    pub fn get_hooks_list(&self) -> Vec<HookSummary> {
        self.get_all_hooks()
            .into_iter()
            .map(HookSummary::of)
            .collect()
    }

    pub fn get_enabled_hooks(&self) -> Vec<&dyn Hook> {
        self.get_all_hooks()
            .into_iter()
            .filter(|hook| hook.is_enabled())
            .collect()
    }

    // ========================================================================
    // 상태 변경
    // ========================================================================

    fn update<F>(&mut self, id: &str, apply: F) -> bool
    where
        F: FnOnce(&mut (dyn Hook + 'static)),
    {
        match self.hooks.get_mut(id) {
            Some(entry) => {
                apply(entry.hook.as_mut());
                true
            }
            None => {
                debug!("Unknown hook id '{}'", id);
                false
            }
        }
    }

    pub fn enable_hook(&mut self, id: &str) -> bool {
        self.update(id, |hook| hook.enable())
    }

    pub fn disable_hook(&mut self, id: &str) -> bool {
        self.update(id, |hook| hook.disable())
    }

    pub fn set_strictness(&mut self, id: &str, strictness: Strictness) -> bool {
        self.update(id, |hook| hook.set_strictness(strictness))
    }

    pub fn set_blocking_mode(&mut self, id: &str, mode: BlockingMode) -> bool {
        self.update(id, |hook| hook.set_blocking_mode(mode))
    }

    // ========================================================================
    // 설치 / 제거
    // ========================================================================

    /// 활성 hook 설치 후 설정 저장
    pub async fn setup_hooks(&self) -> Result<BatchReport> {
        let mut report = BatchReport::default();

        for hook in self.get_enabled_hooks() {
            match hook.setup().await {
                Ok(_) => report.succeeded.push(hook.id().to_string()),
                Err(e) => {
                    self.logger
                        .error(&format!("Failed to set up hook '{}': {}", hook.id(), e));
                    report.failed.push((hook.id().to_string(), e.to_string()));
                }
            }
        }

        self.save_config()?;

        self.logger.info(&format!(
            "Set up {} hook(s), {} failed",
            report.succeeded.len(),
            report.failed.len()
        ));
        Ok(report)
    }

    /// 모든 hook 제거
    ///
    /// 같은 git hook 이름을 공유하는 hook은 스크립트 하나를 공유하므로 한 번만 제거합니다.
    pub async fn remove_hooks(&self) -> BatchReport {
        let mut report = BatchReport::default();
        let mut handled: HashSet<String> = HashSet::new();

        for hook in self.get_all_hooks() {
            let git_hook_name = hook.definition().git_hook_name.clone();
            if !handled.insert(git_hook_name) {
                report.skipped.push(hook.id().to_string());
                continue;
            }

            match hook.remove().await {
                Ok(true) => report.succeeded.push(hook.id().to_string()),
                Ok(false) => report.skipped.push(hook.id().to_string()),
                Err(e) => {
                    self.logger
                        .error(&format!("Failed to remove hook '{}': {}", hook.id(), e));
                    report.failed.push((hook.id().to_string(), e.to_string()));
                }
            }
        }

        report
    }

    // ========================================================================
    // 설정 저장 / 복원
    // ========================================================================

    /// `.claude/hooks.json` 저장
    ///
    /// 파일의 기존 옵션은 유지하고, 상태 키(enabled/strictness/blockingMode)와
    /// 식별 정보만 덮어씁니다.
    pub fn save_config(&self) -> Result<()> {
        if self.dry_run {
            self.logger.info(&format!(
                "[dry-run] Would save configuration to {}",
                self.config_path().display()
            ));
            return Ok(());
        }

        let mut document = self.store.load_object(HOOKS_CONFIG_FILE)?;
        let mut hooks = match document.remove("hooks") {
            Some(Value::Object(hooks)) => hooks,
            _ => Map::new(),
        };

        for hook in self.get_all_hooks() {
            let entry = hooks
                .entry(hook.id().to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            let Some(entry) = entry.as_object_mut() else {
                continue;
            };

            let definition = hook.definition();
            entry.insert("name".into(), Value::from(definition.name.clone()));
            entry.insert(
                "gitHookName".into(),
                Value::from(definition.git_hook_name.clone()),
            );
            for (key, value) in hook.config() {
                if crate::hook::CORE_KEYS.contains(&key.as_str()) {
                    entry.insert(key, value);
                } else {
                    entry.entry(key).or_insert(value);
                }
            }
        }

        document.insert("version".into(), Value::from(CONFIG_VERSION));
        document.insert(
            "timestamp".into(),
            Value::from(chrono::Utc::now().to_rfc3339()),
        );
        document.insert("hooks".into(), Value::Object(hooks));

        self.store.save(HOOKS_CONFIG_FILE, &document)?;
        self.logger.debug(&format!(
            "Saved configuration to {}",
            self.config_path().display()
        ));
        Ok(())
    }

    /// 저장된 상태를 등록된 hook에 반영 (미등록 id는 무시)
    pub fn load_config(&mut self) -> Result<usize> {
        let document = self.store.load_object(HOOKS_CONFIG_FILE)?;
        let Some(hooks) = document.get("hooks").and_then(Value::as_object) else {
            return Ok(0);
        };

        let mut applied = 0;
        for (id, entry) in hooks {
            let Some(registered) = self.hooks.get_mut(id) else {
                debug!("Ignoring configuration for unregistered hook '{}'", id);
                continue;
            };
            let Some(entry) = entry.as_object() else {
                continue;
            };

            let entry = normalize_legacy_config(entry.clone());
            let hook = registered.hook.as_mut();

            if let Some(enabled) = entry.get("enabled").and_then(Value::as_bool) {
                if enabled {
                    hook.enable();
                } else {
                    hook.disable();
                }
            }
            if let Some(strictness) = entry
                .get("strictness")
                .and_then(Value::as_str)
                .and_then(|s| s.parse::<Strictness>().ok())
            {
                hook.set_strictness(strictness);
            }
            if let Some(mode) = entry
                .get("blockingMode")
                .and_then(Value::as_str)
                .and_then(|s| s.parse::<BlockingMode>().ok())
            {
                hook.set_blocking_mode(mode);
            }
            applied += 1;
        }

        Ok(applied)
    }

    /// 저장된 설정을 각 hook 스키마로 검증
    pub fn validate_config(&self) -> Result<Vec<(String, ValidationReport)>> {
        let document = self.store.load_object(HOOKS_CONFIG_FILE)?;
        let stored = document
            .get("hooks")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();

        let mut reports = Vec::new();
        for hook in self.get_all_hooks() {
            let mut config = hook.config();
            if let Some(Value::Object(entry)) = stored.get(hook.id()) {
                for (key, value) in normalize_legacy_config(entry.clone()) {
                    if !IDENTITY_KEYS.contains(&key.as_str()) {
                        config.insert(key, value);
                    }
                }
            }
            let config = hook.schema().apply_defaults(&config);
            reports.push((hook.id().to_string(), hook.schema().validate(&config)));
        }

        for id in stored.keys().filter(|id| !self.hooks.contains_key(*id)) {
            self.logger
                .warn(&format!("Configuration found for unknown hook '{}'", id));
        }

        Ok(reports)
    }

    // ========================================================================
    // git hook 실행
    // ========================================================================

    /// git hook 이름에 연결된 활성 hook을 파이프라인으로 실행
    pub async fn run_git_hook(&self, git_hook_name: &str, args: &[String]) -> FireReport {
        let mut fire = FireReport::default();

        let hooks: Vec<&dyn Hook> = self
            .get_enabled_hooks()
            .into_iter()
            .filter(|hook| hook.definition().git_hook_name == git_hook_name)
            .collect();

        if hooks.is_empty() {
            debug!("No enabled hooks for git hook '{}'", git_hook_name);
            return fire;
        }

        for hook in hooks {
            let mut ctx = ExecutionContext::for_hook(hook, args.to_vec(), self.logger.clone())
                .with_services(self.services.clone())
                .with_dry_run(self.dry_run);

            // AFTER 단계 에러는 outcome에 기록되지 않으므로 여기서 실패로 전환
            if let Err(e) = self.pipeline.run(hook, &mut ctx).await {
                debug!("Hook '{}' returned error: {}", hook.id(), e);
                if !ctx.outcome.is_failed() {
                    ctx.outcome = Outcome::Failed(e.to_string());
                }
            }

            let mut fired = FiredHook {
                id: hook.id().to_string(),
                outcome: ctx.outcome.clone(),
                report: ctx.report.clone(),
                blocked: false,
            };

            if fired.outcome == Outcome::Cancelled {
                debug!("Hook '{}' was skipped", fired.id);
            } else if fired.is_failure() {
                fired.blocked = self.report_failure(&fired, ctx.blocking_mode);
                if fired.blocked {
                    fire.exit_code = 1;
                }
            } else if let Some(report) = &fired.report {
                self.logger
                    .success(&format!("{}: {}", fired.id, report.summary));
            }

            fire.outcomes.push(fired);
        }

        fire
    }

    /// 실패 출력 (block이면 true)
    fn report_failure(&self, fired: &FiredHook, mode: BlockingMode) -> bool {
        let reason = match (&fired.outcome, &fired.report) {
            (Outcome::Failed(e), _) => e.clone(),
            (_, Some(report)) => report.summary.clone(),
            _ => "failed".to_string(),
        };
        let issues = fired
            .report
            .as_ref()
            .map(|r| r.issues.as_slice())
            .unwrap_or_default();

        match mode {
            BlockingMode::Block => {
                self.logger.error(&format!("{}: {}", fired.id, reason));
                for issue in issues {
                    self.logger.error(&format!("  - {}", issue));
                }
                true
            }
            BlockingMode::Warn => {
                self.logger.warn(&format!("{}: {}", fired.id, reason));
                for issue in issues {
                    self.logger.warn(&format!("  - {}", issue));
                }
                false
            }
            BlockingMode::None => {
                debug!("Hook '{}' failed silently: {}", fired.id, reason);
                false
            }
        }
    }
}

// ============================================================================
// 테스트
// ============================================================================
