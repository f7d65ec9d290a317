//! SecretStore - API 키 등 비밀값 조회
//!
//! 조회 순서: 프로세스 환경변수 → `<project>/.env` → `<project>/.claude/.env`
//! `.env` 파일은 읽기만 하며 프로세스 환경을 변경하지 않습니다.

use crate::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::warn;

/// 비밀값 저장소
#[derive(Debug, Clone)]
pub struct SecretStore {
    env_files: Vec<PathBuf>,
    use_process_env: bool,
}

impl SecretStore {
    /// 프로젝트 기준 저장소
    pub fn for_project(project_root: impl AsRef<Path>) -> Self {
        let root = project_root.as_ref();
        Self {
            env_files: vec![root.join(".env"), root.join(".claude").join(".env")],
            use_process_env: true,
        }
    }

    /// 프로세스 환경변수 무시 (테스트용)
    pub fn without_process_env(mut self) -> Self {
        self.use_process_env = false;
        self
    }

    /// 비밀값 조회
    pub fn get(&self, key: &str) -> Option<String> {
        if self.use_process_env {
            if let Ok(value) = std::env::var(key) {
                if !value.is_empty() {
                    return Some(value);
                }
            }
        }

        self.env_files
            .iter()
            .find_map(|path| lookup_in_file(path, key))
    }

    /// 비밀값 조회 (없으면 에러)
    pub fn require(&self, key: &str) -> Result<String> {
        self.get(key)
            .ok_or_else(|| Error::MissingSecret(key.to_string()))
    }
}

fn lookup_in_file(path: &Path, key: &str) -> Option<String> {
    if !path.is_file() {
        return None;
    }

    let iter = match dotenvy::from_path_iter(path) {
        Ok(iter) => iter,
        Err(e) => {
            warn!("Failed to read {}: {}", path.display(), e);
            return None;
        }
    };

    for item in iter {
        match item {
            Ok((k, v)) if k == key && !v.is_empty() => return Some(v),
            Ok(_) => {}
            Err(e) => {
                warn!("Failed to parse {}: {}", path.display(), e);
                return None;
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_lookup_order() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".claude")).unwrap();
        std::fs::write(dir.path().join(".env"), "HOOKS_TEST_KEY=root\n").unwrap();
        std::fs::write(
            dir.path().join(".claude/.env"),
            "HOOKS_TEST_KEY=nested\nHOOKS_ONLY_NESTED=deep\n",
        )
        .unwrap();

        let store = SecretStore::for_project(dir.path()).without_process_env();
        assert_eq!(store.get("HOOKS_TEST_KEY").as_deref(), Some("root"));
        assert_eq!(store.get("HOOKS_ONLY_NESTED").as_deref(), Some("deep"));
    }

    #[test]
    fn test_missing_secret() {
        let dir = TempDir::new().unwrap();
        let store = SecretStore::for_project(dir.path()).without_process_env();
        assert!(store.get("HOOKS_ABSENT").is_none());
        assert!(matches!(
            store.require("HOOKS_ABSENT"),
            Err(Error::MissingSecret(_))
        ));
    }
}
