//! Hook Resolver - descriptor → hook 생성자
//!
//! 발견된 모듈을 실제 hook 인스턴스 생성자로 바꿉니다.
//! 등록된 resolver를 순서대로 시도하며, 처음으로 성공한 결과를 사용합니다.

use super::descriptor::HookModuleDescriptor;
use crate::builtin::{self, ScriptHook};
use crate::hook::{Hook, HookDefinition, HookInit};
use claude_hooks_foundation::SharedLogger;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// hook 생성 함수
pub type HookConstructor = Arc<dyn Fn(HookInit) -> Box<dyn Hook> + Send + Sync>;

// ============================================================================
// HookFactory
// ============================================================================

/// 등록 가능한 hook 종류
#[derive(Clone)]
pub struct HookFactory {
    pub definition: HookDefinition,

    /// 등록 시 기본 설정
    pub defaults: Map<String, Value>,

    pub constructor: HookConstructor,
}

impl HookFactory {
    pub fn new<F>(definition: HookDefinition, defaults: Map<String, Value>, constructor: F) -> Self
    where
        F: Fn(HookInit) -> Box<dyn Hook> + Send + Sync + 'static,
    {
        Self {
            definition,
            defaults,
            constructor: Arc::new(constructor),
        }
    }

    pub fn id(&self) -> &str {
        &self.definition.id
    }

    pub fn build(&self, init: HookInit) -> Box<dyn Hook> {
        (self.constructor)(init)
    }
}

impl std::fmt::Debug for HookFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookFactory")
            .field("definition", &self.definition)
            .field("defaults", &self.defaults)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// HookResolver
// ============================================================================

/// descriptor 해석기
pub trait HookResolver: Send + Sync {
    fn name(&self) -> &str;

    /// 처리할 수 없는 descriptor면 None
    fn resolve(&self, descriptor: &HookModuleDescriptor) -> Option<HookFactory>;
}

/// 내장 hook (경로 없는 core descriptor)
pub struct BuiltinResolver {
    factories: HashMap<String, HookFactory>,
}

impl BuiltinResolver {
    pub fn new() -> Self {
        Self::with_factories(builtin::factories())
    }

    pub fn with_factories(factories: Vec<HookFactory>) -> Self {
        Self {
            factories: factories
                .into_iter()
                .map(|f| (f.id().to_string(), f))
                .collect(),
        }
    }
}

impl Default for BuiltinResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl HookResolver for BuiltinResolver {
    fn name(&self) -> &str {
        "builtin"
    }

    fn resolve(&self, descriptor: &HookModuleDescriptor) -> Option<HookFactory> {
        if !descriptor.is_builtin() {
            return None;
        }
        self.factories.get(&descriptor.id).cloned()
    }
}

/// 실행 파일/스크립트 hook
pub struct ScriptResolver;

impl HookResolver for ScriptResolver {
    fn name(&self) -> &str {
        "script"
    }

    fn resolve(&self, descriptor: &HookModuleDescriptor) -> Option<HookFactory> {
        if descriptor.is_builtin() {
            return None;
        }
        if !descriptor.path.is_file() {
            debug!("Script for hook '{}' not found at {:?}", descriptor.id, descriptor.path);
            return None;
        }
        Some(ScriptHook::factory(descriptor))
    }
}

// ============================================================================
// HookLoader
// ============================================================================

/// resolver 체인
pub struct HookLoader {
    resolvers: Vec<Box<dyn HookResolver>>,
    logger: SharedLogger,
}

impl HookLoader {
    /// builtin → script
    pub fn new(logger: SharedLogger) -> Self {
        Self {
            resolvers: vec![Box::new(BuiltinResolver::new()), Box::new(ScriptResolver)],
            logger,
        }
    }

    /// 사용자 resolver 추가 (기본 resolver보다 먼저 시도)
    pub fn with_resolver(mut self, resolver: impl HookResolver + 'static) -> Self {
        self.resolvers.insert(0, Box::new(resolver));
        self
    }

    pub fn resolver_names(&self) -> Vec<&str> {
        self.resolvers.iter().map(|r| r.name()).collect()
    }

    /// descriptor 로드 (실패 시 경고 후 None)
    pub fn load_hook_module(&self, descriptor: &HookModuleDescriptor) -> Option<HookFactory> {
        for resolver in &self.resolvers {
            if let Some(factory) = resolver.resolve(descriptor) {
                debug!(
                    "Resolved hook '{}' with {} resolver",
                    descriptor.id,
                    resolver.name()
                );
                return Some(factory);
            }
        }

        self.logger.warn(&format!(
            "Failed to load hook module '{}' from {} ({})",
            descriptor.id,
            descriptor.path.display(),
            descriptor.source
        ));
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use claude_hooks_foundation::{HookSource, LogLevel, MemoryLogger};
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    struct NeverResolver;

    impl HookResolver for NeverResolver {
        fn name(&self) -> &str {
            "never"
        }

        fn resolve(&self, _descriptor: &HookModuleDescriptor) -> Option<HookFactory> {
            None
        }
    }

    #[test]
    fn test_builtin_descriptors_resolve() {
        let loader = HookLoader::new(Arc::new(MemoryLogger::new()));
        for definition in builtin::definitions() {
            let descriptor = HookModuleDescriptor::builtin(&definition);
            let factory = loader.load_hook_module(&descriptor).unwrap();
            assert_eq!(factory.id(), definition.id);
        }
    }

    #[test]
    fn test_script_descriptor_resolves() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lint-hook.sh");
        std::fs::write(&path, "#!/bin/sh\nexit 0\n").unwrap();

        let descriptor = HookModuleDescriptor::from_file(&path, HookSource::Project).unwrap();
        let loader = HookLoader::new(Arc::new(MemoryLogger::new())).with_resolver(NeverResolver);
        assert_eq!(loader.resolver_names(), vec!["never", "builtin", "script"]);

        let factory = loader.load_hook_module(&descriptor).unwrap();
        assert_eq!(factory.id(), "lint");
        assert_eq!(factory.definition.source, HookSource::Project);
    }

    #[test]
    fn test_unresolvable_descriptor_warns() {
        let logger = Arc::new(MemoryLogger::new());
        let loader = HookLoader::new(logger.clone());

        let missing = HookModuleDescriptor::from_file(
            Path::new("/nonexistent/ghost-hook.sh"),
            HookSource::User,
        )
        .unwrap();
        assert!(loader.load_hook_module(&missing).is_none());

        let unknown_builtin = HookModuleDescriptor {
            id: "unknown".into(),
            name: "unknown".into(),
            path: PathBuf::new(),
            source: HookSource::Core,
            git_hook_name: None,
            description: None,
        };
        assert!(loader.load_hook_module(&unknown_builtin).is_none());
        assert_eq!(logger.count(LogLevel::Warn), 2);
    }
}
