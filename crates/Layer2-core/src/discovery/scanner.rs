//! Hook Discovery - 네 가지 출처에서 hook 모듈 탐색
//!
//! - core: 내장 hook + 선택적 core 디렉토리 (`CLAUDE_HOOKS_CORE_DIR`)
//! - project: `.claude/hooks/`
//! - plugin: `package.json` 의존성 중 이름에 `claude-hook`이 들어간 패키지의 `claudeHooks`
//! - user: `.claude/user-hooks/`
//!
//! 모든 스캔은 실패하지 않습니다. I/O 에러는 로그 후 빈/부분 목록을 반환합니다.
//!
//! 스크립트는 머리말 주석(`# gitHookName: pre-commit`)으로 연결할 git hook을 지정합니다.

use super::descriptor::{parse_git_hook_declaration, HookModuleDescriptor, HOOK_FILE_PATTERN};
use crate::hook::HookDefinition;
use claude_hooks_foundation::HookSource;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

/// core 디렉토리에서 제외할 인프라 파일 (확장자 제외 파일명)
const INFRASTRUCTURE_STEMS: &[&str] = &[
    "base-hook",
    "enhanced-base-hook",
    "hook-interface",
    "hook-registry",
    "hook-middleware",
    "hook-config",
    "hook-discovery",
    "registry",
    "middleware",
    "config",
    "discovery",
];

const PLUGIN_NAME_MARKER: &str = "claude-hook";

/// `gitHookName` 선언을 찾을 머리말 줄 수
const HEADER_LINES: usize = 10;

// ============================================================================
// HookDiscovery
// ============================================================================

/// Hook 탐색기
pub struct HookDiscovery {
    project_root: PathBuf,
    core_dir: Option<PathBuf>,
    builtins: Vec<HookDefinition>,
}

impl HookDiscovery {
    /// 내장 hook 목록과 함께 생성
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            core_dir: None,
            builtins: crate::builtin::definitions(),
        }
    }

    pub fn with_core_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.core_dir = dir;
        self
    }

    pub fn with_builtins(mut self, builtins: Vec<HookDefinition>) -> Self {
        self.builtins = builtins;
        self
    }

    pub fn project_hooks_dir(&self) -> PathBuf {
        self.project_root.join(".claude").join("hooks")
    }

    pub fn user_hooks_dir(&self) -> PathBuf {
        self.project_root.join(".claude").join("user-hooks")
    }

    // ========================================================================
    // 출처별 스캔
    // ========================================================================

    /// 내장 + core 디렉토리
    pub async fn discover_core(&self) -> Vec<HookModuleDescriptor> {
        let mut found: Vec<_> = self
            .builtins
            .iter()
            .map(HookModuleDescriptor::builtin)
            .collect();

        if let Some(dir) = &self.core_dir {
            found.extend(
                scan_hook_dir(dir, HookSource::Core)
                    .await
                    .into_iter()
                    .filter(|d| !is_infrastructure(&d.path)),
            );
        }

        debug!("Discovered {} core hooks", found.len());
        found
    }

    /// `.claude/hooks/`
    pub async fn discover_project(&self) -> Vec<HookModuleDescriptor> {
        scan_hook_dir(&self.project_hooks_dir(), HookSource::Project).await
    }

    /// npm 플러그인 패키지
    pub async fn discover_plugins(&self) -> Vec<HookModuleDescriptor> {
        let manifest_path = self.project_root.join("package.json");
        let Some(manifest) = read_package_json(&manifest_path).await else {
            return Vec::new();
        };

        // manifest 순서 유지 (dependencies → devDependencies), 중복 제거
        let mut packages: Vec<&String> = Vec::new();
        for name in manifest
            .dependencies
            .keys()
            .chain(manifest.dev_dependencies.keys())
            .filter(|name| name.contains(PLUGIN_NAME_MARKER))
        {
            if !packages.contains(&name) {
                packages.push(name);
            }
        }

        let mut found = Vec::new();
        for package in packages {
            let package_root = self.project_root.join("node_modules").join(package);
            let Some(plugin) = read_package_json(&package_root.join("package.json")).await else {
                continue;
            };

            let entries = plugin
                .claude_hooks
                .map(|value| manifest_entries(package, value))
                .unwrap_or_default();
            if entries.is_empty() {
                debug!("Package {} declares no claudeHooks", package);
            }

            for entry in entries {
                if let Some(descriptor) = entry.into_descriptor(package, &package_root) {
                    found.push(descriptor);
                }
            }
        }

        debug!("Discovered {} plugin hooks", found.len());
        found
    }

    /// `.claude/user-hooks/`
    pub async fn discover_user(&self) -> Vec<HookModuleDescriptor> {
        scan_hook_dir(&self.user_hooks_dir(), HookSource::User).await
    }

    /// core → project → plugin → user (뒤쪽이 우선)
    pub async fn discover_all(&self) -> Vec<HookModuleDescriptor> {
        let mut all = self.discover_core().await;
        all.extend(self.discover_project().await);
        all.extend(self.discover_plugins().await);
        all.extend(self.discover_user().await);

        info!("Discovered {} hook modules", all.len());
        all
    }
}

// ============================================================================
// 디렉토리 스캔
// ============================================================================

/// `*-hook.*` 파일 스캔 (파일명 순)
async fn scan_hook_dir(dir: &Path, source: HookSource) -> Vec<HookModuleDescriptor> {
    if !dir.is_dir() {
        return Vec::new();
    }

    let pattern = match glob::Pattern::new(HOOK_FILE_PATTERN) {
        Ok(pattern) => pattern,
        Err(e) => {
            warn!("Invalid hook file pattern: {}", e);
            return Vec::new();
        }
    };

    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Failed to scan hook directory {:?}: {}", dir, e);
            return Vec::new();
        }
    };

    let mut found = Vec::new();
    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                warn!("Failed to read entry in {:?}: {}", dir, e);
                break;
            }
        };

        let path = entry.path();
        let is_file = entry.file_type().await.map(|t| !t.is_dir()).unwrap_or(false);
        let matches = path
            .file_name()
            .and_then(|n| n.to_str())
            .map_or(false, |n| pattern.matches(n));

        if is_file && matches {
            if let Some(descriptor) = HookModuleDescriptor::from_file(&path, source.clone()) {
                let descriptor =
                    descriptor.with_git_hook_name(declared_git_hook_name(&path).await);
                debug!(
                    "Found hook: {} ({}) at {:?}",
                    descriptor.id,
                    descriptor.resolved_git_hook_name(),
                    path
                );
                found.push(descriptor);
            }
        }
    }

    found.sort_by(|a, b| a.path.cmp(&b.path));
    found
}

/// 머리말의 `gitHookName: <name>` 선언 (읽을 수 없으면 None)
async fn declared_git_hook_name(path: &Path) -> Option<String> {
    let file = match fs::File::open(path).await {
        Ok(file) => file,
        Err(e) => {
            debug!("Cannot read header of {:?}: {}", path, e);
            return None;
        }
    };

    let mut lines = BufReader::new(file).lines();
    for _ in 0..HEADER_LINES {
        let line = lines.next_line().await.ok()??;
        if let Some(name) = parse_git_hook_declaration(&line) {
            return Some(name);
        }
    }
    None
}

fn is_infrastructure(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .and_then(|n| n.split('.').next())
        .map_or(false, |stem| INFRASTRUCTURE_STEMS.contains(&stem))
}

// ============================================================================
// package.json
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct PackageJson {
    dependencies: Map<String, Value>,
    dev_dependencies: Map<String, Value>,
    claude_hooks: Option<Value>,
}

/// `claudeHooks`: 단일 객체 또는 배열 (잘못된 항목만 건너뜀)
fn manifest_entries(package: &str, value: Value) -> Vec<PluginHookEntry> {
    let items = match value {
        Value::Array(items) => items,
        other => vec![other],
    };

    items
        .into_iter()
        .enumerate()
        .filter_map(|(i, item)| match serde_json::from_value(item) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Skipping claudeHooks[{}] in {}: {}", i, package, e);
                None
            }
        })
        .collect()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PluginHookEntry {
    id: Option<String>,
    name: Option<String>,
    path: String,
    git_hook_name: Option<String>,
    description: Option<String>,
}

impl PluginHookEntry {
    fn into_descriptor(self, package: &str, package_root: &Path) -> Option<HookModuleDescriptor> {
        let path = package_root.join(&self.path);
        let id = self
            .id
            .or_else(|| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .and_then(super::descriptor::hook_id_from_file_name)
            })
            .or_else(|| {
                path.file_stem()
                    .and_then(|n| n.to_str())
                    .map(str::to_string)
            })?;

        Some(HookModuleDescriptor {
            name: self.name.unwrap_or_else(|| id.clone()),
            id,
            path,
            source: HookSource::Plugin {
                package: package.to_string(),
            },
            git_hook_name: self.git_hook_name,
            description: self.description,
        })
    }
}

async fn read_package_json(path: &Path) -> Option<PackageJson> {
    let content = match fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            warn!("Failed to read {:?}: {}", path, e);
            return None;
        }
    };

    match serde_json::from_str(&content) {
        Ok(manifest) => Some(manifest),
        Err(e) => {
            warn!("Failed to parse {:?}: {}", path, e);
            None
        }
    }
}

// ============================================================================
// 테스트
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "#!/bin/sh\nexit 0\n").unwrap();
    }

    #[tokio::test]
    async fn test_empty_project_yields_only_builtins() {
        let dir = tempdir().unwrap();
        let discovery = HookDiscovery::new(dir.path());

        assert!(discovery.discover_project().await.is_empty());
        assert!(discovery.discover_plugins().await.is_empty());
        assert!(discovery.discover_user().await.is_empty());

        let core = discovery.discover_core().await;
        assert!(!core.is_empty());
        assert!(core.iter().all(|d| d.is_builtin()));
    }

    #[tokio::test]
    async fn test_project_and_user_scans() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join(".claude/hooks/lint-hook.sh"));
        touch(&dir.path().join(".claude/hooks/README.md"));
        touch(&dir.path().join(".claude/user-hooks/notify-hook.py"));

        let discovery = HookDiscovery::new(dir.path()).with_builtins(vec![]);

        let project = discovery.discover_project().await;
        assert_eq!(project.len(), 1);
        assert_eq!(project[0].id, "lint");
        assert_eq!(project[0].source, HookSource::Project);

        let all = discovery.discover_all().await;
        let ids: Vec<_> = all.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["lint", "notify"]);
    }

    #[tokio::test]
    async fn test_core_dir_excludes_infrastructure() {
        let dir = tempdir().unwrap();
        let core = dir.path().join("core");
        touch(&core.join("security-hook.js"));
        touch(&core.join("base-hook.js"));
        touch(&core.join("enhanced-base-hook.js"));

        let discovery = HookDiscovery::new(dir.path())
            .with_builtins(vec![])
            .with_core_dir(Some(core));

        let found = discovery.discover_core().await;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "security");
        assert_eq!(found[0].source, HookSource::Core);
    }

    #[tokio::test]
    async fn test_plugin_manifest_single_and_array() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("package.json"),
            r#"{
                "dependencies": {"claude-hook-security": "^1.0.0", "lodash": "4"},
                "devDependencies": {"@acme/claude-hooks-extra": "1.0.0"}
            }"#,
        )
        .unwrap();

        let security = dir.path().join("node_modules/claude-hook-security");
        fs::create_dir_all(&security).unwrap();
        fs::write(
            security.join("package.json"),
            r#"{"claudeHooks": {"id": "security", "path": "hooks/security-hook.js", "gitHookName": "pre-commit"}}"#,
        )
        .unwrap();

        let extra = dir.path().join("node_modules/@acme/claude-hooks-extra");
        fs::create_dir_all(&extra).unwrap();
        fs::write(
            extra.join("package.json"),
            r#"{"claudeHooks": [
                {"path": "a-hook.sh", "description": "A"},
                {"id": "b", "name": "B Hook", "path": "b.sh"}
            ]}"#,
        )
        .unwrap();

        let discovery = HookDiscovery::new(dir.path());
        let plugins = discovery.discover_plugins().await;
        let ids: Vec<_> = plugins.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["security", "a", "b"]);

        let security = plugins.iter().find(|d| d.id == "security").unwrap();
        assert_eq!(security.resolved_git_hook_name(), "pre-commit");
        assert_eq!(
            security.source,
            HookSource::Plugin {
                package: "claude-hook-security".into()
            }
        );
        assert!(security.path.ends_with("hooks/security-hook.js"));
    }

    #[tokio::test]
    async fn test_broken_manifests_never_fail() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("package.json"), "{ not json").unwrap();
        let discovery = HookDiscovery::new(dir.path());
        assert!(discovery.discover_plugins().await.is_empty());

        fs::write(
            dir.path().join("package.json"),
            r#"{"dependencies": {"claude-hook-missing": "1"}}"#,
        )
        .unwrap();
        assert!(discovery.discover_plugins().await.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_plugin_entry_skips_only_that_entry() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("package.json"),
            r#"{"dependencies": {"claude-hook-mixed": "1"}}"#,
        )
        .unwrap();
        let package = dir.path().join("node_modules/claude-hook-mixed");
        fs::create_dir_all(&package).unwrap();
        fs::write(
            package.join("package.json"),
            r#"{"claudeHooks": [
                {"id": "no-path", "gitHookName": "pre-commit"},
                {"id": "ok", "path": "ok-hook.sh"},
                "not an object"
            ]}"#,
        )
        .unwrap();

        let plugins = HookDiscovery::new(dir.path()).discover_plugins().await;
        let ids: Vec<_> = plugins.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["ok"]);
    }

    #[tokio::test]
    async fn test_unreadable_hook_dirs_never_fail() {
        let dir = tempdir().unwrap();
        // a file where the directory should be
        touch(&dir.path().join(".claude/hooks"));
        let discovery = HookDiscovery::new(dir.path()).with_builtins(vec![]);
        assert!(discovery.discover_project().await.is_empty());

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;

            let user_dir = dir.path().join(".claude/user-hooks");
            touch(&user_dir.join("notify-hook.sh"));
            fs::set_permissions(&user_dir, fs::Permissions::from_mode(0o000)).unwrap();

            let found = discovery.discover_user().await;
            // root ignores directory permissions
            if fs::read_dir(&user_dir).is_err() {
                assert!(found.is_empty());
            }
            assert!(discovery.discover_all().await.len() <= 1);

            fs::set_permissions(&user_dir, fs::Permissions::from_mode(0o755)).unwrap();
        }
    }

    #[tokio::test]
    async fn test_header_declares_git_hook_name() {
        let dir = tempdir().unwrap();
        let hooks = dir.path().join(".claude/hooks");
        fs::create_dir_all(&hooks).unwrap();
        fs::write(
            hooks.join("lint-hook.sh"),
            "#!/bin/sh\n# gitHookName: pre-commit\nexit 0\n",
        )
        .unwrap();
        fs::write(hooks.join("notes-hook.sh"), "#!/bin/sh\nexit 0\n").unwrap();

        let found = HookDiscovery::new(dir.path()).discover_project().await;
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].id, "lint");
        assert_eq!(found[0].resolved_git_hook_name(), "pre-commit");
        assert_eq!(found[1].resolved_git_hook_name(), "notes");
    }
}
