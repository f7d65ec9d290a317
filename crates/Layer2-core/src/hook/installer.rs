//! Script Installer - `.git/hooks/<name>` 스크립트 설치/제거
//!
//! - 설치: 기존 (비관리) 스크립트는 타임스탬프 백업 후 덮어씀
//! - 제거: 소유권 마커가 있는 파일만 삭제, 가장 최근 백업 복원
//! - dry-run: 의도만 로그, 파일시스템 변경 없음

use claude_hooks_foundation::{Result, SharedLogger};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// 생성된 스크립트의 소유권 마커
pub const MANAGED_MARKER: &str = "claude-hooks:managed";

const BACKUP_INFIX: &str = ".backup-";

/// Git hook 스크립트 설치기
#[derive(Clone)]
pub struct ScriptInstaller {
    hooks_dir: PathBuf,
    runner: String,
    dry_run: bool,
    logger: SharedLogger,
}

impl ScriptInstaller {
    pub fn new(hooks_dir: impl Into<PathBuf>, runner: impl Into<String>, logger: SharedLogger) -> Self {
        Self {
            hooks_dir: hooks_dir.into(),
            runner: runner.into(),
            dry_run: false,
            logger,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn hooks_dir(&self) -> &Path {
        &self.hooks_dir
    }

    pub fn hook_path(&self, git_hook_name: &str) -> PathBuf {
        self.hooks_dir.join(git_hook_name)
    }

    // ========================================================================
    // 스크립트 생성
    // ========================================================================

    /// dispatch 스크립트 생성
    pub fn generate_script(&self, hook_name: &str, git_hook_name: &str) -> String {
        format!(
            "#!/bin/sh\n\
             # {marker}\n\
             # {hook_name} ({git_hook_name}) - installed by claude-hooks.\n\
             # Remove with `claude-hooks remove`; manual edits are overwritten on setup.\n\
             exec {runner} run {git_hook_name} \"$@\"\n",
            marker = MANAGED_MARKER,
            hook_name = hook_name,
            git_hook_name = git_hook_name,
            runner = self.runner,
        )
    }

    // ========================================================================
    // 설치
    // ========================================================================

    /// 스크립트 설치
    pub async fn install(&self, git_hook_name: &str, script: &str) -> Result<bool> {
        let path = self.hook_path(git_hook_name);

        if self.dry_run {
            self.logger
                .info(&format!("[dry-run] Would install {}", path.display()));
            return Ok(true);
        }

        fs::create_dir_all(&self.hooks_dir).await?;

        if let Ok(meta) = fs::symlink_metadata(&path).await {
            if meta.file_type().is_symlink() {
                debug!("Replacing symlinked hook {}", path.display());
                fs::remove_file(&path).await?;
            } else if meta.len() > 0 && !self.is_managed(&path).await {
                let backup = self.backup_path(git_hook_name);
                fs::copy(&path, &backup).await?;
                self.logger.info(&format!(
                    "Backed up existing {} hook to {}",
                    git_hook_name,
                    backup.display()
                ));
            }
        }

        fs::write(&path, script).await?;
        make_executable(&path).await?;

        self.logger
            .success(&format!("Installed {} hook", git_hook_name));
        Ok(true)
    }

    // ========================================================================
    // 제거
    // ========================================================================

    /// 스크립트 제거 (관리 파일만)
    pub async fn uninstall(&self, git_hook_name: &str) -> Result<bool> {
        let path = self.hook_path(git_hook_name);

        if fs::symlink_metadata(&path).await.is_err() {
            debug!("No {} hook installed", git_hook_name);
            return Ok(false);
        }

        if !self.is_managed(&path).await {
            self.logger.warn(&format!(
                "{} was not installed by claude-hooks; leaving it untouched",
                path.display()
            ));
            return Ok(false);
        }

        if self.dry_run {
            self.logger
                .info(&format!("[dry-run] Would remove {}", path.display()));
            return Ok(true);
        }

        fs::remove_file(&path).await?;
        self.logger
            .success(&format!("Removed {} hook", git_hook_name));

        if let Some(backup) = self.latest_backup(git_hook_name).await {
            fs::rename(&backup, &path).await?;
            make_executable(&path).await?;
            self.logger.info(&format!(
                "Restored previous {} hook from {}",
                git_hook_name,
                backup.display()
            ));
        }

        Ok(true)
    }

    // ========================================================================
    // 유틸리티
    // ========================================================================

    /// 소유권 마커 확인
    pub async fn is_managed(&self, path: &Path) -> bool {
        match fs::read_to_string(path).await {
            Ok(content) => content.contains(MANAGED_MARKER),
            Err(_) => false,
        }
    }

    fn backup_path(&self, git_hook_name: &str) -> PathBuf {
        let stamp = chrono::Local::now().format("%Y%m%d%H%M%S%3f");
        self.hooks_dir
            .join(format!("{}{}{}", git_hook_name, BACKUP_INFIX, stamp))
    }

    /// 가장 최근 백업 (접미사 사전순 최대)
    pub async fn latest_backup(&self, git_hook_name: &str) -> Option<PathBuf> {
        let prefix = format!("{}{}", git_hook_name, BACKUP_INFIX);
        let mut entries = fs::read_dir(&self.hooks_dir).await.ok()?;
        let mut latest: Option<String> = None;

        while let Ok(Some(entry)) = entries.next_entry().await {
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with(&prefix) && latest.as_ref().map_or(true, |l| name > *l) {
                latest = Some(name);
            }
        }

        latest.map(|name| self.hooks_dir.join(name))
    }
}

#[cfg(unix)]
async fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).await?;
    Ok(())
}

#[cfg(not(unix))]
async fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use claude_hooks_foundation::{LogLevel, MemoryLogger};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn installer(dir: &TempDir) -> (ScriptInstaller, Arc<MemoryLogger>) {
        let logger = Arc::new(MemoryLogger::new());
        let installer = ScriptInstaller::new(
            dir.path().join(".git/hooks"),
            "claude-hooks",
            logger.clone(),
        );
        (installer, logger)
    }

    #[test]
    fn test_generate_script() {
        let dir = TempDir::new().unwrap();
        let (installer, _) = installer(&dir);
        let script = installer.generate_script("Commit Message", "commit-msg");

        assert!(script.starts_with("#!/bin/sh\n"));
        assert!(script.contains(MANAGED_MARKER));
        assert!(script.contains("exec claude-hooks run commit-msg \"$@\""));
    }

    #[tokio::test]
    async fn test_install_then_uninstall_leaves_nothing() {
        let dir = TempDir::new().unwrap();
        let (installer, _) = installer(&dir);
        let script = installer.generate_script("Pre Commit", "pre-commit");

        assert!(installer.install("pre-commit", &script).await.unwrap());
        let path = installer.hook_path("pre-commit");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), script);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o755);
        }

        assert!(installer.uninstall("pre-commit").await.unwrap());
        assert!(!path.exists());
        assert!(installer.latest_backup("pre-commit").await.is_none());
    }

    #[tokio::test]
    async fn test_existing_hook_is_backed_up_and_restored() {
        let dir = TempDir::new().unwrap();
        let (installer, _) = installer(&dir);
        std::fs::create_dir_all(installer.hooks_dir()).unwrap();
        let path = installer.hook_path("pre-push");
        std::fs::write(&path, "#!/bin/sh\necho original\n").unwrap();

        let script = installer.generate_script("Pre Push", "pre-push");
        installer.install("pre-push", &script).await.unwrap();
        assert!(installer.latest_backup("pre-push").await.is_some());

        installer.uninstall("pre-push").await.unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "#!/bin/sh\necho original\n"
        );
        assert!(installer.latest_backup("pre-push").await.is_none());
    }

    #[tokio::test]
    async fn test_latest_backup_wins() {
        let dir = TempDir::new().unwrap();
        let (installer, _) = installer(&dir);
        let hooks = installer.hooks_dir().to_path_buf();
        std::fs::create_dir_all(&hooks).unwrap();
        std::fs::write(hooks.join("pre-commit.backup-20240101000000000"), "old").unwrap();
        std::fs::write(hooks.join("pre-commit.backup-20250101000000000"), "newer").unwrap();

        let script = installer.generate_script("Pre Commit", "pre-commit");
        installer.install("pre-commit", &script).await.unwrap();
        installer.uninstall("pre-commit").await.unwrap();

        let restored = std::fs::read_to_string(hooks.join("pre-commit")).unwrap();
        assert_eq!(restored, "newer");
        assert!(hooks.join("pre-commit.backup-20240101000000000").exists());
    }

    #[tokio::test]
    async fn test_unmanaged_file_left_untouched() {
        let dir = TempDir::new().unwrap();
        let (installer, logger) = installer(&dir);
        std::fs::create_dir_all(installer.hooks_dir()).unwrap();
        let path = installer.hook_path("commit-msg");
        std::fs::write(&path, "#!/bin/sh\nexit 0\n").unwrap();

        assert!(!installer.uninstall("commit-msg").await.unwrap());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "#!/bin/sh\nexit 0\n");
        assert_eq!(logger.count(LogLevel::Warn), 1);
    }

    #[tokio::test]
    async fn test_empty_or_managed_file_not_backed_up() {
        let dir = TempDir::new().unwrap();
        let (installer, _) = installer(&dir);
        std::fs::create_dir_all(installer.hooks_dir()).unwrap();
        std::fs::write(installer.hook_path("pre-commit"), "").unwrap();

        let script = installer.generate_script("Pre Commit", "pre-commit");
        installer.install("pre-commit", &script).await.unwrap();
        installer.install("pre-commit", &script).await.unwrap();
        assert!(installer.latest_backup("pre-commit").await.is_none());
    }

    #[tokio::test]
    async fn test_dry_run_touches_nothing() {
        let dir = TempDir::new().unwrap();
        let (installer, logger) = installer(&dir);
        let installer = installer.with_dry_run(true);

        let script = installer.generate_script("Pre Commit", "pre-commit");
        assert!(installer.install("pre-commit", &script).await.unwrap());
        assert!(!installer.hooks_dir().exists());
        assert!(logger.contains(LogLevel::Info, "[dry-run]"));
    }
}
