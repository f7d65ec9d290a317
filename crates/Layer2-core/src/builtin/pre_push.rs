//! pre-push hook
//!
//! 보호 브랜치로의 직접 push를 막고, push될 커밋을 요약합니다.

use super::{request_verdict, Verdict, VERDICT_FORMAT};
use crate::discovery::HookFactory;
use crate::git::CommitInfo;
use crate::hook::{
    schemas, Configurable, Executable, Hook, HookBase, HookDefinition, HookInit, HookReport,
    Installable,
};
use crate::middleware::ExecutionContext;
use async_trait::async_trait;
use claude_hooks_foundation::Result;
use serde_json::Map;

pub const PRE_PUSH_HOOK_ID: &str = "pre-push";

/// 요약에 나열할 최대 커밋 수
const MAX_LISTED_COMMITS: usize = 10;

/// push 검사 hook
pub struct PrePushHook {
    base: HookBase,
}

impl PrePushHook {
    pub fn definition() -> HookDefinition {
        HookDefinition::new(PRE_PUSH_HOOK_ID, "Pre-Push Check", "pre-push")
            .with_description("Guards protected branches and summarizes outgoing commits")
    }

    pub fn new(init: HookInit) -> Self {
        Self {
            base: HookBase::new(Self::definition(), schemas::pre_push(), init),
        }
    }

    pub fn factory() -> HookFactory {
        HookFactory::new(Self::definition(), Map::new(), |init| {
            Box::new(Self::new(init)) as Box<dyn Hook>
        })
    }
}

impl Configurable for PrePushHook {
    fn base(&self) -> &HookBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut HookBase {
        &mut self.base
    }
}

impl Installable for PrePushHook {}

#[async_trait]
impl Executable for PrePushHook {
    async fn execute(&self, ctx: &mut ExecutionContext) -> Result<HookReport> {
        let Some(git) = ctx.services.git.clone() else {
            return Ok(HookReport::passed("Git is unavailable; nothing to check"));
        };

        let snapshot = ctx.git.clone().unwrap_or_default();
        let branch = match snapshot.branch {
            Some(branch) => branch,
            None => git.current_branch().await?,
        };
        let upstream = match snapshot.upstream {
            Some(upstream) => Some(upstream),
            None => git.upstream().await?,
        };

        let protected = ctx.option_strings("protectedBranches");
        if protected.iter().any(|p| p == &branch) {
            return Ok(HookReport::failed(
                format!("Push to protected branch '{}' rejected", branch),
                vec![format!(
                    "Direct push to protected branch '{}'; open a pull request instead",
                    branch
                )],
            ));
        }

        if !ctx.option_bool("summarize", true) {
            return Ok(HookReport::passed(format!("Branch '{}' is not protected", branch)));
        }

        let commits = match &upstream {
            Some(base) => git.commits_since(base).await?,
            None => git.last_commit().await?.into_iter().collect(),
        };
        if commits.is_empty() {
            return Ok(HookReport::passed(format!("Nothing new to push on '{}'", branch)));
        }

        let listing = commits
            .iter()
            .map(|c| format!("{} {}", c.short_hash, c.subject))
            .collect::<Vec<_>>()
            .join("\n");
        let prompt = format!(
            "Summarize the commits about to be pushed from branch '{}' with {} strictness \
             and flag anything that should not be pushed.\n\nCommits:\n{}\n\n{}",
            branch, ctx.strictness, listing, VERDICT_FORMAT
        );

        if let Some(verdict) = request_verdict::<Verdict>(ctx, prompt).await {
            let summary = verdict
                .summary
                .unwrap_or_else(|| summarize(&branch, upstream.as_deref(), &commits));
            return Ok(if verdict.valid {
                HookReport::passed(summary)
            } else {
                HookReport::failed(summary, verdict.issues)
            });
        }

        Ok(HookReport::passed(summarize(&branch, upstream.as_deref(), &commits)).with_fallback(true))
    }
}

/// 로컬 요약
fn summarize(branch: &str, upstream: Option<&str>, commits: &[CommitInfo]) -> String {
    let target = upstream.unwrap_or("remote");
    let mut lines = vec![format!(
        "{} commit(s) on '{}' ahead of {}",
        commits.len(),
        branch,
        target
    )];
    lines.extend(
        commits
            .iter()
            .take(MAX_LISTED_COMMITS)
            .map(|c| format!("  {} {}", c.short_hash, c.subject)),
    );
    if commits.len() > MAX_LISTED_COMMITS {
        lines.push(format!("  ... and {} more", commits.len() - MAX_LISTED_COMMITS));
    }
    lines.join("\n")
}
