//! Hook Registry
//!
//! ```text
//! HookDiscovery ──► HookLoader ──► HookRegistry ──► MiddlewarePipeline ──► Hook
//!  (descriptor)     (factory)      (instances)        (before/after)
//! ```

mod hooks;
mod report;

pub use hooks::{HookRegistry, CONFIG_VERSION};
pub use report::{BatchReport, FireReport, FiredHook, HookSummary};
