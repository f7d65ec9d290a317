//! Hook Discovery
//!
//! core/project/plugin/user 출처에서 hook 모듈을 찾아 descriptor로 만들고,
//! resolver 체인으로 등록 가능한 `HookFactory`로 변환합니다.

mod descriptor;
mod resolver;
mod scanner;

pub use descriptor::{
    hook_id_from_file_name, is_known_git_hook, parse_git_hook_declaration, HookModuleDescriptor,
    GIT_HOOK_NAMES, HOOK_FILE_PATTERN,
};
pub use resolver::{
    BuiltinResolver, HookConstructor, HookFactory, HookLoader, HookResolver, ScriptResolver,
};
pub use scanner::HookDiscovery;
