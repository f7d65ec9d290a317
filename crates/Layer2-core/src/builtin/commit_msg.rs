//! commit-msg hook
//!
//! git이 넘겨주는 메시지 파일(첫 번째 인자)을 읽어 검사합니다.

use super::{request_verdict, Verdict, VERDICT_FORMAT};
use crate::discovery::HookFactory;
use crate::hook::{
    schemas, Configurable, Executable, Hook, HookBase, HookDefinition, HookInit, HookReport,
    Installable,
};
use crate::middleware::ExecutionContext;
use async_trait::async_trait;
use claude_hooks_foundation::{Error, Result, Strictness};
use regex::Regex;
use serde_json::Map;
use std::sync::OnceLock;

pub const COMMIT_MSG_HOOK_ID: &str = "commit-msg";

/// allowedTypes 미지정 시 허용 타입
const DEFAULT_TYPES: &[&str] = &[
    "feat", "fix", "docs", "style", "refactor", "perf", "test", "build", "ci", "chore", "revert",
];

fn conventional_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?P<type>[a-zA-Z]+)(\([^()]+\))?!?: \S").ok())
        .as_ref()
}

/// 커밋 메시지 검사 hook
pub struct CommitMsgHook {
    base: HookBase,
}

impl CommitMsgHook {
    pub fn definition() -> HookDefinition {
        HookDefinition::new(COMMIT_MSG_HOOK_ID, "Commit Message", "commit-msg")
            .with_description("Checks commit messages for format and clarity")
    }

    pub fn new(init: HookInit) -> Self {
        Self {
            base: HookBase::new(Self::definition(), schemas::commit_msg(), init),
        }
    }

    pub fn factory() -> HookFactory {
        HookFactory::new(Self::definition(), Map::new(), |init| {
            Box::new(Self::new(init)) as Box<dyn Hook>
        })
    }

    async fn read_message(ctx: &ExecutionContext) -> Result<String> {
        let arg = ctx.args.first().ok_or_else(|| {
            Error::execution(ctx.hook_id(), "Missing commit message file argument")
        })?;
        let path = ctx.project_root.join(arg);
        let raw = tokio::fs::read_to_string(&path).await.map_err(|e| {
            Error::execution(
                ctx.hook_id(),
                format!("Failed to read commit message {}: {}", path.display(), e),
            )
        })?;
        Ok(strip_comments(&raw))
    }
}

impl Configurable for CommitMsgHook {
    fn base(&self) -> &HookBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut HookBase {
        &mut self.base
    }
}

impl Installable for CommitMsgHook {}

#[async_trait]
impl Executable for CommitMsgHook {
    async fn execute(&self, ctx: &mut ExecutionContext) -> Result<HookReport> {
        let message = Self::read_message(ctx).await?;

        if message.is_empty() {
            return Ok(HookReport::failed(
                "Empty commit message",
                vec!["Commit message is empty".to_string()],
            ));
        }
        if is_merge_or_revert(&message) {
            return Ok(HookReport::passed("Generated commit message accepted"));
        }

        let prompt = format!(
            "Review this git commit message with {} strictness. \
             Check that it is clear, specific, and follows conventional commit style.\n\n\
             Commit message:\n{}\n\n{}",
            ctx.strictness, message, VERDICT_FORMAT
        );

        if let Some(verdict) = request_verdict::<Verdict>(ctx, prompt).await {
            let summary = verdict.summary.unwrap_or_else(|| {
                if verdict.valid {
                    "Commit message looks good".to_string()
                } else {
                    "Commit message needs work".to_string()
                }
            });
            return Ok(if verdict.valid {
                HookReport::passed(summary)
            } else {
                HookReport::failed(summary, verdict.issues)
            });
        }

        let rules = MessageRules {
            conventional: ctx.option_bool("conventionalCommits", true),
            max_subject_length: ctx.option_u64("maxSubjectLength", 72) as usize,
            allowed_types: ctx.option_strings("allowedTypes"),
            strictness: ctx.strictness,
        };

        Ok(HookReport::from_issues(
            "Commit message looks good",
            "Commit message needs work",
            rules.check(&message),
        )
        .with_fallback(true))
    }
}

// ============================================================================
// 휴리스틱
// ============================================================================

/// 로컬 검사 규칙
#[derive(Debug, Clone)]
pub struct MessageRules {
    pub conventional: bool,
    pub max_subject_length: usize,
    pub allowed_types: Vec<String>,
    pub strictness: Strictness,
}

impl MessageRules {
    pub fn check(&self, message: &str) -> Vec<String> {
        let mut issues = Vec::new();
        let mut lines = message.lines();
        let subject = lines.next().unwrap_or_default().trim();

        let length = subject.chars().count();
        if length > self.max_subject_length {
            issues.push(format!(
                "Subject is {} characters (max {})",
                length, self.max_subject_length
            ));
        }

        if self.conventional {
            match conventional_regex().and_then(|re| re.captures(subject)) {
                Some(caps) => {
                    let kind = caps.name("type").map_or("", |m| m.as_str());
                    if !self.type_allowed(kind) {
                        issues.push(format!("Commit type '{}' is not allowed", kind));
                    }
                }
                None => issues.push(
                    "Subject does not follow conventional commit format: type(scope): description"
                        .to_string(),
                ),
            }
        }

        if self.strictness == Strictness::High {
            if subject.ends_with('.') {
                issues.push("Subject should not end with a period".to_string());
            }
            if lines.next().map_or(false, |l| !l.trim().is_empty()) {
                issues.push("Separate subject from body with a blank line".to_string());
            }
        }

        if self.strictness != Strictness::Low && subject.split_whitespace().count() < 2 {
            issues.push("Subject is too short to describe the change".to_string());
        }

        issues
    }

    fn type_allowed(&self, kind: &str) -> bool {
        if self.allowed_types.is_empty() {
            DEFAULT_TYPES.contains(&kind)
        } else {
            self.allowed_types.iter().any(|t| t == kind)
        }
    }
}

/// `#` 주석 줄 제거
fn strip_comments(raw: &str) -> String {
    raw.lines()
        .filter(|l| !l.starts_with('#'))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

fn is_merge_or_revert(message: &str) -> bool {
    message.starts_with("Merge ") || message.starts_with("Revert \"")
}

// ============================================================================
// 테스트
// ============================================================================
