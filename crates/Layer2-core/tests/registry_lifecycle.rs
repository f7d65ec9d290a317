//! Registry lifecycle: discover → register → setup → fire → remove

use claude_hooks_core::{HookDiscovery, HookLoader, HookRegistry, MANAGED_MARKER};
use claude_hooks_foundation::{BlockingMode, HookSource, LogLevel, MemoryLogger, Settings};
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

const USER_SCRIPT: &str = "#!/bin/sh\necho 'my own pre-commit'\n";

fn init_repo(dir: &TempDir) {
    fs::create_dir_all(dir.path().join(".git/hooks")).unwrap();
}

fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

async fn discovered_registry(dir: &TempDir, logger: Arc<MemoryLogger>) -> HookRegistry {
    let discovery = HookDiscovery::new(dir.path());
    let loader = HookLoader::new(logger.clone());

    let mut registry = HookRegistry::new(&Settings::new(dir.path()), logger);
    registry.register_discovered(&discovery.discover_all().await, &loader);
    registry
}

fn read_config(registry: &HookRegistry) -> Value {
    serde_json::from_str(&fs::read_to_string(registry.config_path()).unwrap()).unwrap()
}

#[tokio::test]
async fn test_full_lifecycle() {
    let dir = TempDir::new().unwrap();
    init_repo(&dir);
    write(
        &dir.path().join(".claude/hooks/pre-commit-hook.sh"),
        "echo 'lint failed in main.rs' >&2\nexit 1\n",
    );
    let git_hook = dir.path().join(".git/hooks/pre-commit");
    write(&git_hook, USER_SCRIPT);

    // project hook overrides the built-in pre-commit
    let logger = Arc::new(MemoryLogger::new());
    let mut registry = discovered_registry(&dir, logger.clone()).await;
    let hook = registry.get_hook("pre-commit").unwrap();
    assert_eq!(hook.definition().source, HookSource::Project);
    assert!(logger.contains(LogLevel::Warn, "'pre-commit' is already registered"));
    assert!(registry.get_hook("commit-msg").is_some());

    assert!(registry.enable_hook("pre-commit"));
    assert!(registry.set_blocking_mode("pre-commit", BlockingMode::Block));

    let report = registry.setup_hooks().await.unwrap();
    assert_eq!(report.succeeded, vec!["pre-commit"]);
    assert!(report.failed.is_empty());

    let installed = fs::read_to_string(&git_hook).unwrap();
    assert!(installed.contains(MANAGED_MARKER));
    assert!(installed.contains("exec claude-hooks run pre-commit \"$@\""));

    let config = read_config(&registry);
    assert_eq!(config["hooks"]["pre-commit"]["enabled"], Value::Bool(true));
    assert_eq!(config["hooks"]["pre-commit"]["blockingMode"], "block");
    assert_eq!(config["hooks"]["commit-msg"]["enabled"], Value::Bool(false));

    // a fresh process (the generated script) restores state from hooks.json
    let runner_logger = Arc::new(MemoryLogger::new());
    let mut runner = discovered_registry(&dir, runner_logger.clone()).await;
    runner.load_config().unwrap();
    assert!(runner.get_hook("pre-commit").unwrap().is_enabled());

    if cfg!(unix) {
        let fire = runner.run_git_hook("pre-commit", &[]).await;
        assert_eq!(fire.exit_code, 1);
        assert!(fire.outcomes[0].blocked);
        assert!(runner_logger.contains(LogLevel::Error, "lint failed in main.rs"));
    }

    let removed = registry.remove_hooks().await;
    assert_eq!(removed.succeeded, vec!["pre-commit"]);
    assert!(removed.failed.is_empty());
    assert_eq!(fs::read_to_string(&git_hook).unwrap(), USER_SCRIPT);
}

#[tokio::test]
async fn test_setup_reports_partial_failure() {
    let dir = TempDir::new().unwrap();
    init_repo(&dir);
    // a directory in place of the script makes installation fail
    write(&dir.path().join(".git/hooks/commit-msg/keep"), "x");

    let logger = Arc::new(MemoryLogger::new());
    let mut registry = discovered_registry(&dir, logger.clone()).await;
    for id in ["commit-msg", "pre-commit", "pre-push"] {
        assert!(registry.enable_hook(id));
    }

    let report = registry.setup_hooks().await.unwrap();
    assert_eq!(report.succeeded, vec!["pre-commit", "pre-push"]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, "commit-msg");
    assert_eq!(logger.count(LogLevel::Error), 1);

    let saves = logger
        .entries()
        .iter()
        .filter(|e| e.message.starts_with("Saved configuration"))
        .count();
    assert_eq!(saves, 1);

    let config = read_config(&registry);
    assert!(config["timestamp"].is_string());
    assert_eq!(config["hooks"].as_object().unwrap().len(), 3);
}

#[tokio::test]
async fn test_duplicate_plugin_ids_resolve_to_later_package() {
    let dir = TempDir::new().unwrap();
    init_repo(&dir);
    write(
        &dir.path().join("package.json"),
        r#"{
            "dependencies": {"claude-hook-beta": "1.0.0"},
            "devDependencies": {"claude-hook-alpha": "1.0.0"}
        }"#,
    );
    for package in ["claude-hook-alpha", "claude-hook-beta"] {
        let root = dir.path().join("node_modules").join(package);
        write(
            &root.join("package.json"),
            r#"{"claudeHooks": {"id": "security", "path": "security-hook.sh", "gitHookName": "pre-commit"}}"#,
        );
        write(&root.join("security-hook.sh"), "exit 0\n");
    }

    let logger = Arc::new(MemoryLogger::new());
    let registry = discovered_registry(&dir, logger.clone()).await;

    let hook = registry.get_hook("security").unwrap();
    assert_eq!(
        hook.definition().source,
        HookSource::Plugin {
            package: "claude-hook-alpha".into()
        }
    );
    assert_eq!(hook.definition().git_hook_name, "pre-commit");
    assert_eq!(logger.count(LogLevel::Warn), 1);
}

#[tokio::test]
async fn test_discovery_of_empty_project() {
    let dir = TempDir::new().unwrap();
    let logger = Arc::new(MemoryLogger::new());
    let registry = discovered_registry(&dir, logger.clone()).await;

    let ids: Vec<_> = registry.get_hooks_list().into_iter().map(|s| s.id).collect();
    assert_eq!(ids, vec!["commit-msg", "pre-commit", "pre-push"]);
    assert!(registry.get_enabled_hooks().is_empty());
    assert_eq!(logger.count(LogLevel::Warn), 0);
}

#[tokio::test]
async fn test_script_declares_git_hook_in_header() {
    let dir = TempDir::new().unwrap();
    init_repo(&dir);
    write(
        &dir.path().join(".claude/hooks/lint-hook.sh"),
        "#!/bin/sh\n# gitHookName: pre-commit\nexit 0\n",
    );
    write(&dir.path().join(".claude/user-hooks/notes-hook.sh"), "exit 0\n");

    let logger = Arc::new(MemoryLogger::new());
    let mut registry = discovered_registry(&dir, logger.clone()).await;

    let lint = registry.get_hook("lint").unwrap();
    assert_eq!(lint.definition().git_hook_name, "pre-commit");
    assert!(registry.get_hook("pre-commit").is_some());
    assert!(logger.contains(LogLevel::Warn, "'notes' targets 'notes'"));
    assert!(!logger.contains(LogLevel::Warn, "'lint' targets"));

    assert!(registry.enable_hook("lint"));
    let report = registry.setup_hooks().await.unwrap();
    assert_eq!(report.succeeded, vec!["lint"]);

    let installed = fs::read_to_string(dir.path().join(".git/hooks/pre-commit")).unwrap();
    assert!(installed.contains(MANAGED_MARKER));
    assert!(!dir.path().join(".git/hooks/lint").exists());
}
