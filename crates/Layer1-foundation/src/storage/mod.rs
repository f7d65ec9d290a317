//! Storage module for claude-hooks
//!
//! - `json`: JSON - 프로젝트 설정 파일 저장/로드 (`.claude/hooks.json`)

mod json;

pub use json::{JsonStore, HOOKS_CONFIG_FILE};
