//! CLI 명령 정의와 실행

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use claude_hooks_core::{
    AnthropicService, GitOps, HookDiscovery, HookLoader, HookRegistry, Services,
};
use claude_hooks_foundation::{
    ConsoleLogger, LogLevel, SecretStore, Settings, SharedLogger, Strictness,
};
use crossterm::style::Stylize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// claude-hooks - AI-assisted git hooks
#[derive(Parser, Debug)]
#[command(name = "claude-hooks")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Project root (defaults to the enclosing git repository)
    #[arg(long, global = true)]
    pub project: Option<PathBuf>,

    /// Show what would change without writing anything
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Only print warnings and errors
    #[arg(short, long, global = true, conflicts_with = "debug")]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Install git hook scripts for every enabled hook
    Setup,
    /// Remove installed git hook scripts and restore backups
    Remove,
    /// List registered hooks
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Enable a hook
    Enable { id: String },
    /// Disable a hook
    Disable { id: String },
    /// Set a hook's strictness (low, medium, high)
    Strictness { id: String, level: Strictness },
    /// Validate .claude/hooks.json against each hook's schema
    Validate,
    /// Show discovered hook modules
    Discover,
    /// Run the hooks mapped to a git hook (called by generated scripts)
    Run {
        git_hook: String,

        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
}

// ============================================================================
// 실행
// ============================================================================

/// 명령 실행 후 종료 코드 반환
pub async fn execute(cli: Cli) -> anyhow::Result<i32> {
    let settings = settings_for(&cli)?;
    let logger = logger_for(&cli);

    match cli.command {
        Command::Discover => discover(&settings).await,
        Command::Setup => {
            if !settings.project_root.join(".git").exists() {
                bail!("{} is not a git repository", settings.project_root.display());
            }
            let registry = build_registry(&settings, logger.clone()).await;
            if registry.get_enabled_hooks().is_empty() {
                logger.info("No hooks are enabled; run `claude-hooks enable <id>` first");
            }
            let report = registry.setup_hooks().await?;
            Ok(if report.is_success() { 0 } else { 1 })
        }
        Command::Remove => {
            let registry = build_registry(&settings, logger.clone()).await;
            let report = registry.remove_hooks().await;
            logger.info(&format!(
                "Removed {} hook script(s), {} failed",
                report.succeeded.len(),
                report.failed.len()
            ));
            Ok(if report.is_success() { 0 } else { 1 })
        }
        Command::List { json } => {
            let registry = build_registry(&settings, logger).await;
            list(&registry, json)
        }
        Command::Enable { id } => {
            let mut registry = build_registry(&settings, logger.clone()).await;
            update(&mut registry, &logger, &id, |r| r.enable_hook(&id), "Enabled")
        }
        Command::Disable { id } => {
            let mut registry = build_registry(&settings, logger.clone()).await;
            update(&mut registry, &logger, &id, |r| r.disable_hook(&id), "Disabled")
        }
        Command::Strictness { id, level } => {
            let mut registry = build_registry(&settings, logger.clone()).await;
            let action = format!("Set strictness {} for", level);
            update(
                &mut registry,
                &logger,
                &id,
                |r| r.set_strictness(&id, level),
                &action,
            )
        }
        Command::Validate => {
            let registry = build_registry(&settings, logger.clone()).await;
            validate(&registry, &logger)
        }
        Command::Run { git_hook, args } => {
            let registry = build_registry(&settings, logger).await;
            let fire = registry.run_git_hook(&git_hook, &args).await;
            Ok(fire.exit_code)
        }
    }
}

fn settings_for(cli: &Cli) -> anyhow::Result<Settings> {
    let project_root = match &cli.project {
        Some(dir) => dir.clone(),
        None => {
            let cwd = std::env::current_dir().context("Failed to read current directory")?;
            GitOps::find_git_root(&cwd).unwrap_or(cwd)
        }
    };
    Ok(Settings::from_env(project_root).with_dry_run(cli.dry_run))
}

fn logger_for(cli: &Cli) -> SharedLogger {
    if cli.debug {
        ConsoleLogger::verbose().shared()
    } else if cli.quiet {
        ConsoleLogger::new().with_min_level(LogLevel::Warn).shared()
    } else {
        ConsoleLogger::new().shared()
    }
}

fn discovery_for(settings: &Settings) -> HookDiscovery {
    HookDiscovery::new(&settings.project_root).with_core_dir(settings.core_dir.clone())
}

fn services_for(settings: &Settings) -> Services {
    let mut services = Services::new().with_default_model(&settings.model);

    match GitOps::new(&settings.project_root) {
        Ok(git) => services = services.with_git(Arc::new(git)),
        Err(e) => debug!("Git unavailable: {}", e),
    }

    let secrets = SecretStore::for_project(&settings.project_root);
    match AnthropicService::from_secrets(&secrets, &settings.api_base_url) {
        Some(service) => services = services.with_analysis(Arc::new(service)),
        None => debug!("No analysis service configured; hooks use local checks"),
    }

    services
}

/// 탐색 → 등록 → 저장된 설정 반영
///
/// 설정 파일을 읽지 못하면 경고 후 기본값으로 계속합니다.
async fn build_registry(settings: &Settings, logger: SharedLogger) -> HookRegistry {
    let descriptors = discovery_for(settings).discover_all().await;
    let loader = HookLoader::new(logger.clone());

    let mut registry =
        HookRegistry::new(settings, logger.clone()).with_services(services_for(settings));
    registry.register_discovered(&descriptors, &loader);
    if let Err(e) = registry.load_config() {
        logger.warn(&format!(
            "Failed to load {}: {}; using defaults",
            registry.config_path().display(),
            e
        ));
    }
    registry
}

// ============================================================================
// 명령별 처리
// ============================================================================

fn update(
    registry: &mut HookRegistry,
    logger: &SharedLogger,
    id: &str,
    apply: impl FnOnce(&mut HookRegistry) -> bool,
    action: &str,
) -> anyhow::Result<i32> {
    if !apply(registry) {
        logger.error(&format!("Unknown hook '{}'", id));
        return Ok(1);
    }
    registry.save_config()?;
    logger.success(&format!("{} {}", action, id));
    logger.info("Run `claude-hooks setup` to install or refresh the git hook scripts");
    Ok(0)
}

fn list(registry: &HookRegistry, json: bool) -> anyhow::Result<i32> {
    let hooks = registry.get_hooks_list();

    if json {
        println!("{}", serde_json::to_string_pretty(&hooks)?);
        return Ok(0);
    }

    if hooks.is_empty() {
        println!("No hooks registered.");
        return Ok(0);
    }

    println!(
        "{:<20} {:<10} {:<8} {:<8} {:<16} {}",
        "ID", "STATUS", "LEVEL", "MODE", "GIT HOOK", "SOURCE"
    );
    println!("{}", "-".repeat(80));
    for hook in hooks {
        let status = if hook.enabled {
            format!("{:<10}", "enabled").green()
        } else {
            format!("{:<10}", "disabled").dark_grey()
        };
        println!(
            "{:<20} {} {:<8} {:<8} {:<16} {}",
            hook.id,
            status,
            hook.strictness.as_str(),
            hook.blocking_mode.as_str(),
            hook.git_hook_name,
            hook.source
        );
    }
    Ok(0)
}

fn validate(registry: &HookRegistry, logger: &SharedLogger) -> anyhow::Result<i32> {
    let reports = registry.validate_config()?;
    let mut invalid = 0;

    for (id, report) in &reports {
        if report.is_valid {
            logger.success(&format!("{}: valid", id));
        } else {
            invalid += 1;
            logger.error(&format!("{}: {}", id, report.errors.join("; ")));
        }
    }

    if invalid > 0 {
        logger.error(&format!("{} of {} hook(s) have invalid configuration", invalid, reports.len()));
        Ok(1)
    } else {
        Ok(0)
    }
}

async fn discover(settings: &Settings) -> anyhow::Result<i32> {
    let descriptors = discovery_for(settings).discover_all().await;

    println!("{:<20} {:<32} {}", "ID", "SOURCE", "PATH");
    println!("{}", "-".repeat(80));
    for d in descriptors {
        let path = if d.is_builtin() {
            "(built-in)".to_string()
        } else {
            d.path.display().to_string()
        };
        println!("{:<20} {:<32} {}", d.id, d.source.to_string(), path);
    }
    Ok(0)
}

// ============================================================================
// 테스트
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("claude-hooks").chain(args.iter().copied())).unwrap()
    }

    fn cli_in(dir: &TempDir, command: Command) -> Cli {
        Cli {
            command,
            project: Some(dir.path().to_path_buf()),
            dry_run: false,
            debug: false,
            quiet: true,
        }
    }

    #[test]
    fn test_parse_run_passes_through_args() {
        let cli = parse(&["run", "commit-msg", ".git/COMMIT_EDITMSG", "--no-verify"]);
        assert_eq!(
            cli.command,
            Command::Run {
                git_hook: "commit-msg".into(),
                args: vec![".git/COMMIT_EDITMSG".into(), "--no-verify".into()],
            }
        );
    }

    #[test]
    fn test_parse_global_flags_and_strictness() {
        let cli = parse(&["strictness", "pre-commit", "high", "--dry-run", "--project", "/tmp/x"]);
        assert!(cli.dry_run);
        assert_eq!(cli.project, Some(PathBuf::from("/tmp/x")));
        assert_eq!(
            cli.command,
            Command::Strictness {
                id: "pre-commit".into(),
                level: Strictness::High,
            }
        );

        assert!(Cli::try_parse_from(["claude-hooks", "strictness", "x", "extreme"]).is_err());
        assert!(Cli::try_parse_from(["claude-hooks", "list", "-d", "-q"]).is_err());
    }

    #[tokio::test]
    async fn test_enable_persists_configuration() {
        let dir = TempDir::new().unwrap();

        let code = execute(cli_in(&dir, Command::Enable { id: "pre-push".into() }))
            .await
            .unwrap();
        assert_eq!(code, 0);

        let saved: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(dir.path().join(".claude/hooks.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(saved["hooks"]["pre-push"]["enabled"], serde_json::json!(true));

        let code = execute(cli_in(&dir, Command::Enable { id: "ghost".into() }))
            .await
            .unwrap();
        assert_eq!(code, 1);
    }

    #[tokio::test]
    async fn test_setup_requires_git_repository() {
        let dir = TempDir::new().unwrap();
        assert!(execute(cli_in(&dir, Command::Setup)).await.is_err());
    }

    #[tokio::test]
    async fn test_run_without_enabled_hooks_exits_zero() {
        let dir = TempDir::new().unwrap();
        let code = execute(cli_in(
            &dir,
            Command::Run {
                git_hook: "pre-commit".into(),
                args: vec![],
            },
        ))
        .await
        .unwrap();
        assert_eq!(code, 0);
    }

    #[tokio::test]
    async fn test_run_with_corrupt_configuration_exits_zero() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".claude")).unwrap();
        std::fs::write(dir.path().join(".claude/hooks.json"), "{ oops").unwrap();

        let code = execute(cli_in(
            &dir,
            Command::Run {
                git_hook: "pre-commit".into(),
                args: vec![],
            },
        ))
        .await
        .unwrap();
        assert_eq!(code, 0);

        let code = execute(cli_in(&dir, Command::List { json: true }))
            .await
            .unwrap();
        assert_eq!(code, 0);
    }

    #[tokio::test]
    async fn test_validate_flags_bad_configuration() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".claude")).unwrap();
        std::fs::write(
            dir.path().join(".claude/hooks.json"),
            r#"{"hooks": {"commit-msg": {"maxSubjectLength": "long"}}}"#,
        )
        .unwrap();

        let code = execute(cli_in(&dir, Command::Validate)).await.unwrap();
        assert_eq!(code, 1);
    }
}
