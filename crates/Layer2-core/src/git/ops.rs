//! Git Operations
//!
//! Read-only git queries used by hooks, run through the `git` CLI.

use async_trait::async_trait;
use claude_hooks_foundation::Error;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum GitError {
    #[error("Not a git repository: {0}")]
    NotARepository(PathBuf),

    #[error("Git command failed: {0}")]
    CommandFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<GitError> for Error {
    fn from(e: GitError) -> Self {
        Error::Git(e.to_string())
    }
}

// ============================================================================
// Commit Info
// ============================================================================

/// A commit summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    pub hash: String,
    pub short_hash: String,
    pub subject: String,
    pub author_name: String,
}

impl CommitInfo {
    fn parse(line: &str) -> Option<Self> {
        let parts: Vec<&str> = line.splitn(4, '|').collect();
        if parts.len() != 4 {
            return None;
        }
        Some(Self {
            hash: parts[0].to_string(),
            short_hash: parts[1].to_string(),
            subject: parts[2].to_string(),
            author_name: parts[3].to_string(),
        })
    }
}

const LOG_FORMAT: &str = "--format=%H|%h|%s|%an";

// ============================================================================
// GitInspector - read-only capability
// ============================================================================

/// Read-only git queries
#[async_trait]
pub trait GitInspector: Send + Sync {
    /// Current branch name
    async fn current_branch(&self) -> Result<String, GitError>;

    /// Upstream ref of the current branch, if any
    async fn upstream(&self) -> Result<Option<String>, GitError>;

    /// Paths of staged files
    async fn staged_files(&self) -> Result<Vec<String>, GitError>;

    /// Diff of staged changes
    async fn staged_diff(&self) -> Result<String, GitError>;

    /// Commits in HEAD that are not in `base`
    async fn commits_since(&self, base: &str) -> Result<Vec<CommitInfo>, GitError>;

    /// Most recent commit
    async fn last_commit(&self) -> Result<Option<CommitInfo>, GitError>;
}

// ============================================================================
// Git Operations
// ============================================================================

/// `git` CLI backed inspector
#[derive(Debug, Clone)]
pub struct GitOps {
    /// Repository root directory
    root: PathBuf,
}

impl GitOps {
    /// Create new GitOps for a directory
    pub fn new(path: impl AsRef<Path>) -> Result<Self, GitError> {
        let root = Self::find_git_root(path.as_ref())?;
        Ok(Self { root })
    }

    /// Find the git repository root
    pub fn find_git_root(path: &Path) -> Result<PathBuf, GitError> {
        let mut current = if path.is_file() {
            path.parent().unwrap_or(path).to_path_buf()
        } else {
            path.to_path_buf()
        };

        loop {
            if current.join(".git").exists() {
                return Ok(current);
            }

            if let Some(parent) = current.parent() {
                current = parent.to_path_buf();
            } else {
                return Err(GitError::NotARepository(path.to_path_buf()));
            }
        }
    }

    /// Get repository root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Check if directory is a git repository
    pub fn is_repo(path: impl AsRef<Path>) -> bool {
        Self::find_git_root(path.as_ref()).is_ok()
    }

    /// Run a git command
    async fn run_git(&self, args: &[&str]) -> Result<String, GitError> {
        debug!("git {}", args.join(" "));

        let output = Command::new("git")
            .args(args)
            .current_dir(&self.root)
            .output()
            .await?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(GitError::CommandFailed(stderr.trim().to_string()))
        }
    }
}

#[async_trait]
impl GitInspector for GitOps {
    async fn current_branch(&self) -> Result<String, GitError> {
        self.run_git(&["rev-parse", "--abbrev-ref", "HEAD"]).await
    }

    async fn upstream(&self) -> Result<Option<String>, GitError> {
        match self
            .run_git(&["rev-parse", "--abbrev-ref", "--symbolic-full-name", "@{upstream}"])
            .await
        {
            Ok(name) if !name.is_empty() => Ok(Some(name)),
            Ok(_) => Ok(None),
            // no upstream configured
            Err(GitError::CommandFailed(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn staged_files(&self) -> Result<Vec<String>, GitError> {
        let output = self
            .run_git(&["diff", "--cached", "--name-only", "--diff-filter=ACMR"])
            .await?;
        Ok(output
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(str::to_string)
            .collect())
    }

    async fn staged_diff(&self) -> Result<String, GitError> {
        self.run_git(&["diff", "--cached"]).await
    }

    async fn commits_since(&self, base: &str) -> Result<Vec<CommitInfo>, GitError> {
        let range = format!("{}..HEAD", base);
        let output = self.run_git(&["log", LOG_FORMAT, &range]).await?;
        Ok(output.lines().filter_map(CommitInfo::parse).collect())
    }

    async fn last_commit(&self) -> Result<Option<CommitInfo>, GitError> {
        match self.run_git(&["log", LOG_FORMAT, "-n", "1"]).await {
            Ok(output) => Ok(output.lines().next().and_then(CommitInfo::parse)),
            // fresh repository without commits
            Err(GitError::CommandFailed(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
