//! HookModuleDescriptor - 발견된 hook 모듈 정보

use crate::hook::HookDefinition;
use claude_hooks_foundation::HookSource;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// 파일명 규칙 (`<id>-hook.<ext>`)
pub const HOOK_FILE_PATTERN: &str = "*-hook.*";

/// git이 실행하는 hook 이름 (githooks(5))
pub const GIT_HOOK_NAMES: &[&str] = &[
    "applypatch-msg",
    "pre-applypatch",
    "post-applypatch",
    "pre-commit",
    "pre-merge-commit",
    "prepare-commit-msg",
    "commit-msg",
    "post-commit",
    "pre-rebase",
    "post-checkout",
    "post-merge",
    "pre-push",
    "pre-receive",
    "update",
    "proc-receive",
    "post-receive",
    "post-update",
    "reference-transaction",
    "push-to-checkout",
    "pre-auto-gc",
    "post-rewrite",
    "sendemail-validate",
    "fsmonitor-watchman",
    "p4-changelist",
    "p4-prepare-changelist",
    "p4-post-changelist",
    "p4-pre-submit",
    "post-index-change",
];

pub fn is_known_git_hook(name: &str) -> bool {
    GIT_HOOK_NAMES.contains(&name)
}

fn declaration_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*(?:#|//|--|;|\*)\s*gitHookName\s*:\s*([A-Za-z0-9_-]+)\s*$").ok()
    })
    .as_ref()
}

/// 스크립트 머리말 한 줄에서 `gitHookName: <name>` 선언 추출
///
/// `# gitHookName: pre-commit`, `// gitHookName: pre-push` 형식을 인식합니다.
pub fn parse_git_hook_declaration(line: &str) -> Option<String> {
    declaration_regex()?
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// 발견된 hook 모듈
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HookModuleDescriptor {
    pub id: String,
    pub name: String,

    /// 모듈 경로 (내장 hook은 빈 경로)
    pub path: PathBuf,

    pub source: HookSource,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_hook_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl HookModuleDescriptor {
    /// 내장 hook
    pub fn builtin(definition: &HookDefinition) -> Self {
        Self {
            id: definition.id.clone(),
            name: definition.name.clone(),
            path: PathBuf::new(),
            source: HookSource::Core,
            git_hook_name: Some(definition.git_hook_name.clone()),
            description: (!definition.description.is_empty())
                .then(|| definition.description.clone()),
        }
    }

    /// `<id>-hook.<ext>` 파일
    pub fn from_file(path: &Path, source: HookSource) -> Option<Self> {
        let file_name = path.file_name()?.to_str()?;
        let id = hook_id_from_file_name(file_name)?;
        Some(Self {
            name: id.clone(),
            id,
            path: path.to_path_buf(),
            source,
            git_hook_name: None,
            description: None,
        })
    }

    pub fn with_git_hook_name(mut self, git_hook_name: Option<String>) -> Self {
        if git_hook_name.is_some() {
            self.git_hook_name = git_hook_name;
        }
        self
    }

    pub fn is_builtin(&self) -> bool {
        self.source == HookSource::Core && self.path.as_os_str().is_empty()
    }

    /// 연결될 git hook 이름 (미지정 시 id)
    pub fn resolved_git_hook_name(&self) -> &str {
        self.git_hook_name.as_deref().unwrap_or(&self.id)
    }

    pub fn to_definition(&self) -> HookDefinition {
        HookDefinition::new(&self.id, &self.name, self.resolved_git_hook_name())
            .with_description(self.description.clone().unwrap_or_default())
            .with_source(self.source.clone())
    }
}

/// `lint-hook.sh` → `lint`
pub fn hook_id_from_file_name(file_name: &str) -> Option<String> {
    let idx = file_name.find("-hook.")?;
    let id = &file_name[..idx];
    (!id.is_empty()).then(|| id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hook_id_from_file_name() {
        assert_eq!(hook_id_from_file_name("lint-hook.sh").as_deref(), Some("lint"));
        assert_eq!(
            hook_id_from_file_name("pre-push-hook.test.js").as_deref(),
            Some("pre-push")
        );
        assert!(hook_id_from_file_name("-hook.sh").is_none());
        assert!(hook_id_from_file_name("lint.sh").is_none());
    }

    #[test]
    fn test_git_hook_name_defaults_to_id() {
        let d = HookModuleDescriptor::from_file(Path::new("/p/.claude/hooks/pre-commit-hook.sh"), HookSource::Project)
            .unwrap();
        assert_eq!(d.resolved_git_hook_name(), "pre-commit");
        assert!(!d.is_builtin());
        assert_eq!(d.to_definition().source, HookSource::Project);
    }

    #[test]
    fn test_parse_git_hook_declaration() {
        assert_eq!(
            parse_git_hook_declaration("# gitHookName: pre-commit").as_deref(),
            Some("pre-commit")
        );
        assert_eq!(
            parse_git_hook_declaration("  // gitHookName:pre-push  ").as_deref(),
            Some("pre-push")
        );
        assert!(parse_git_hook_declaration("#!/bin/sh").is_none());
        assert!(parse_git_hook_declaration("gitHookName: pre-commit").is_none());
        assert!(parse_git_hook_declaration("# gitHookName: two words").is_none());
    }

    #[test]
    fn test_declared_git_hook_name_overrides_id() {
        let d = HookModuleDescriptor::from_file(Path::new("/p/.claude/hooks/lint-hook.sh"), HookSource::Project)
            .unwrap()
            .with_git_hook_name(Some("pre-commit".into()));
        assert_eq!(d.id, "lint");
        assert_eq!(d.to_definition().git_hook_name, "pre-commit");

        assert!(is_known_git_hook("pre-commit"));
        assert!(!is_known_git_hook("lint"));
    }
}
