//! Script Hook - 발견된 외부 스크립트 실행
//!
//! project/user 디렉토리나 플러그인 패키지에서 찾은 파일을 별도 프로세스로 실행합니다.
//! 종료 코드 0이면 통과입니다.

use crate::discovery::{HookFactory, HookModuleDescriptor};
use crate::hook::{
    schemas, Configurable, Executable, Hook, HookBase, HookInit, HookReport, Installable,
};
use crate::middleware::ExecutionContext;
use async_trait::async_trait;
use claude_hooks_foundation::Result;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// 실패 보고에 포함할 최대 출력 줄 수
const MAX_ISSUE_LINES: usize = 20;

/// 확장자로 인터프리터 선택 (None이면 직접 실행)
pub fn interpreter_for(path: &Path) -> Option<&'static str> {
    match path.extension().and_then(|e| e.to_str())? {
        "sh" => Some("sh"),
        "bash" => Some("bash"),
        "py" => Some("python3"),
        "js" | "mjs" | "cjs" => Some("node"),
        _ => None,
    }
}

/// 외부 스크립트 hook
pub struct ScriptHook {
    base: HookBase,
    path: PathBuf,
}

impl ScriptHook {
    pub fn new(descriptor: &HookModuleDescriptor, init: HookInit) -> Self {
        Self {
            base: HookBase::new(descriptor.to_definition(), schemas::script(), init),
            path: descriptor.path.clone(),
        }
    }

    pub fn factory(descriptor: &HookModuleDescriptor) -> HookFactory {
        let captured = descriptor.clone();
        HookFactory::new(descriptor.to_definition(), Map::new(), move |init| {
            Box::new(ScriptHook::new(&captured, init)) as Box<dyn Hook>
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// (프로그램, 인자)
    fn command_line(&self, ctx: &ExecutionContext) -> (String, Vec<String>) {
        let script = self.path.to_string_lossy().to_string();
        let interpreter = ctx
            .option_str("interpreter")
            .map(str::to_string)
            .or_else(|| interpreter_for(&self.path).map(str::to_string));

        match interpreter {
            Some(program) => {
                let mut args = vec![script];
                args.extend(ctx.args.iter().cloned());
                (program, args)
            }
            None => (script, ctx.args.clone()),
        }
    }

    fn environment(ctx: &ExecutionContext) -> Vec<(String, String)> {
        let mut envs: Vec<(String, String)> = ctx
            .option("env")
            .and_then(Value::as_object)
            .map(|vars| {
                vars.iter()
                    .map(|(k, v)| {
                        let value = match v {
                            Value::String(s) => s.clone(),
                            other => other.to_string(),
                        };
                        (k.clone(), value)
                    })
                    .collect()
            })
            .unwrap_or_default();

        envs.push(("HOOK_ID".into(), ctx.hook_id().to_string()));
        envs.push(("CLAUDE_HOOKS_STRICTNESS".into(), ctx.strictness.to_string()));
        envs.push((
            "CLAUDE_HOOKS_BLOCKING_MODE".into(),
            ctx.blocking_mode.to_string(),
        ));
        envs
    }
}

impl Configurable for ScriptHook {
    fn base(&self) -> &HookBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut HookBase {
        &mut self.base
    }
}

impl Installable for ScriptHook {}

#[async_trait]
impl Executable for ScriptHook {
    async fn execute(&self, ctx: &mut ExecutionContext) -> Result<HookReport> {
        let (program, args) = self.command_line(ctx);

        if ctx.dry_run {
            return Ok(HookReport::passed(format!(
                "[dry-run] Would run {} {}",
                program,
                args.join(" ")
            )));
        }

        let output = self
            .base
            .run_command(&program, &args, &Self::environment(ctx))
            .await?;

        if output.success() {
            return Ok(HookReport::passed(format!(
                "{} passed",
                self.path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| ctx.hook_id().to_string())
            )));
        }

        let issues = output
            .stderr
            .lines()
            .chain(output.stdout.lines())
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .take(MAX_ISSUE_LINES)
            .map(str::to_string)
            .collect();

        let summary = match output.code {
            Some(code) => format!("Script exited with code {}", code),
            None => "Script was terminated by a signal".to_string(),
        };
        Ok(HookReport::failed(summary, issues))
    }
}
