//! Hook 종류별 설정 스키마
//!
//! 모든 종류는 `base()`를 `SchemaBuilder::extend`로 확장합니다.

use claude_hooks_foundation::{ConfigSchema, PropertySpec, SchemaBuilder};
use serde_json::json;
use tracing::error;

/// 모든 hook 공통 스키마
pub fn base() -> ConfigSchema {
    finish(
        SchemaBuilder::new()
            .property("enabled", PropertySpec::boolean())
            .property(
                "strictness",
                PropertySpec::string_enum(["low", "medium", "high"]),
            )
            .property(
                "blockingMode",
                PropertySpec::string_enum(["block", "warn", "none"]),
            )
            .property(
                "model",
                PropertySpec::string().with_description("Model used by the analysis service"),
            )
            .property("maxTokens", PropertySpec::number())
            .property("temperature", PropertySpec::number())
            .require("enabled")
            .require("strictness")
            .require("blockingMode")
            .default_value("enabled", json!(false))
            .default_value("strictness", json!("medium"))
            .default_value("blockingMode", json!("warn"))
            .default_value("maxTokens", json!(1024))
            .default_value("temperature", json!(0.2)),
    )
}

/// commit-msg
pub fn commit_msg() -> ConfigSchema {
    finish(
        SchemaBuilder::extend(&base())
            .property("conventionalCommits", PropertySpec::boolean())
            .property("maxSubjectLength", PropertySpec::number())
            .property("allowedTypes", PropertySpec::array(PropertySpec::string()))
            .default_value("conventionalCommits", json!(true))
            .default_value("maxSubjectLength", json!(72)),
    )
}

/// pre-commit
pub fn pre_commit() -> ConfigSchema {
    let checks = finish(
        SchemaBuilder::new()
            .property("security", PropertySpec::boolean())
            .property("quality", PropertySpec::boolean())
            .default_value("security", json!(true))
            .default_value("quality", json!(true)),
    );

    finish(
        SchemaBuilder::extend(&base())
            .property("maxDiffSize", PropertySpec::number())
            .property("checks", PropertySpec::object(checks))
            .property("fileExtensions", PropertySpec::array(PropertySpec::string()))
            .default_value("maxDiffSize", json!(50_000))
            .default_value("checks", json!({}))
            .default_value("fileExtensions", json!([])),
    )
}

/// pre-push
pub fn pre_push() -> ConfigSchema {
    finish(
        SchemaBuilder::extend(&base())
            .property(
                "protectedBranches",
                PropertySpec::array(PropertySpec::string()),
            )
            .property("summarize", PropertySpec::boolean())
            .default_value("protectedBranches", json!(["main", "master"]))
            .default_value("summarize", json!(true)),
    )
}

/// 발견된 외부 스크립트 hook
pub fn script() -> ConfigSchema {
    finish(
        SchemaBuilder::extend(&base())
            .property("interpreter", PropertySpec::string())
            .property("env", PropertySpec::any_object()),
    )
}

fn finish(builder: SchemaBuilder) -> ConfigSchema {
    builder.build().unwrap_or_else(|e| {
        error!("Invalid built-in schema: {}", e);
        ConfigSchema::default()
    })
}
