//! Git Integration Module
//!
//! Read-only git plumbing for hooks:
//! - `GitInspector`: capability trait (branch, upstream, staged files, diffs, commits)
//! - `GitOps`: implementation backed by the `git` CLI

pub mod ops;

pub use ops::{CommitInfo, GitError, GitInspector, GitOps};
