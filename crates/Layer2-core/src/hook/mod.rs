//! Hook System - hook 계약과 공유 동작
//!
//! - `definition`: HookDefinition, HookReport
//! - `contract`: Configurable / Installable / Executable → Hook
//! - `base`: HookBase (설정 상태, 설치, 명령 실행)
//! - `installer`: `.git/hooks` 스크립트 설치기
//! - `schemas`: hook 종류별 설정 스키마

mod base;
mod contract;
mod definition;
mod installer;
pub mod schemas;

pub use base::{CommandOutput, HookBase, HookInit, CORE_KEYS};
pub use contract::{Configurable, Executable, Hook, Installable};
pub use definition::{HookDefinition, HookReport};
pub use installer::{ScriptInstaller, MANAGED_MARKER};
