//! Config Schema - 선언적 설정 스키마와 검증기
//!
//! Hook 종류별 설정 스키마(필수 필드, 타입, enum, 기본값)와
//! 어떤 스키마에도 동작하는 범용 검증기/기본값 적용기를 제공합니다.
//!
//! ## 검증 규칙
//!
//! - 필수 키 누락: 에러 + invalid
//! - 스키마에 없는 키: "unknown property" 경고 (valid 유지)
//! - 타입 불일치, enum 위반: 에러 + invalid
//! - 배열은 `items`로 원소별 검증, 중첩 객체는 재귀 검증 (경로 prefix 유지)
//!
//! ## 예시
//!
//! ```ignore
//! let schema = SchemaBuilder::new()
//!     .property("enabled", PropertySpec::boolean())
//!     .require("enabled")
//!     .default_value("enabled", json!(false))
//!     .build()?;
//!
//! let config = schema.apply_defaults(&Map::new());
//! assert!(schema.validate(&config).is_valid);
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

// ============================================================================
// PropertyKind - 원시 타입
// ============================================================================

/// 프로퍼티 원시 타입
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyKind {
    Boolean,
    String,
    Number,
    Array,
    Object,
}

impl PropertyKind {
    /// 값이 이 타입과 일치하는지 확인
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Self::Boolean => value.is_boolean(),
            Self::String => value.is_string(),
            Self::Number => value.is_number(),
            Self::Array => value.is_array(),
            Self::Object => value.is_object(),
        }
    }

    /// JSON 값의 타입 이름
    pub fn name_of(value: &Value) -> &'static str {
        match value {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }
}

impl std::fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Boolean => write!(f, "boolean"),
            Self::String => write!(f, "string"),
            Self::Number => write!(f, "number"),
            Self::Array => write!(f, "array"),
            Self::Object => write!(f, "object"),
        }
    }
}

// ============================================================================
// PropertySpec - 프로퍼티 명세
// ============================================================================

/// 단일 프로퍼티 명세
#[derive(Debug, Clone, PartialEq)]
pub struct PropertySpec {
    /// 원시 타입
    pub kind: PropertyKind,

    /// 허용 값 목록
    pub enum_values: Option<Vec<Value>>,

    /// 배열 원소 명세
    pub items: Option<Box<PropertySpec>>,

    /// 중첩 객체 스키마
    pub nested: Option<Box<ConfigSchema>>,

    /// 설명
    pub description: Option<String>,
}

impl PropertySpec {
    fn of_kind(kind: PropertyKind) -> Self {
        Self {
            kind,
            enum_values: None,
            items: None,
            nested: None,
            description: None,
        }
    }

    pub fn boolean() -> Self {
        Self::of_kind(PropertyKind::Boolean)
    }

    pub fn string() -> Self {
        Self::of_kind(PropertyKind::String)
    }

    pub fn number() -> Self {
        Self::of_kind(PropertyKind::Number)
    }

    /// 원소 명세를 가진 배열
    pub fn array(items: PropertySpec) -> Self {
        Self {
            items: Some(Box::new(items)),
            ..Self::of_kind(PropertyKind::Array)
        }
    }

    /// 원소 명세 없는 배열
    pub fn any_array() -> Self {
        Self::of_kind(PropertyKind::Array)
    }

    /// 중첩 스키마를 가진 객체
    pub fn object(nested: ConfigSchema) -> Self {
        Self {
            nested: Some(Box::new(nested)),
            ..Self::of_kind(PropertyKind::Object)
        }
    }

    /// 자유 형식 객체
    pub fn any_object() -> Self {
        Self::of_kind(PropertyKind::Object)
    }

    /// 문자열 enum
    pub fn string_enum<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::string().with_enum(values.into_iter().map(|v| Value::String(v.into())))
    }

    pub fn with_enum(mut self, values: impl IntoIterator<Item = Value>) -> Self {
        self.enum_values = Some(values.into_iter().collect());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

// ============================================================================
// ConfigSchema - 불변 스키마 값
// ============================================================================

/// 설정 스키마
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigSchema {
    properties: BTreeMap<String, PropertySpec>,
    required: BTreeSet<String>,
    defaults: Map<String, Value>,
}

impl ConfigSchema {
    pub fn properties(&self) -> &BTreeMap<String, PropertySpec> {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&PropertySpec> {
        self.properties.get(name)
    }

    pub fn required(&self) -> &BTreeSet<String> {
        &self.required
    }

    pub fn defaults(&self) -> &Map<String, Value> {
        &self.defaults
    }

    /// 검증
    pub fn validate(&self, config: &Map<String, Value>) -> ValidationReport {
        validate(config, self)
    }

    /// 기본값 적용
    pub fn apply_defaults(&self, config: &Map<String, Value>) -> Map<String, Value> {
        apply_defaults(config, self)
    }
}

// ============================================================================
// SchemaBuilder - 스키마 합성
// ============================================================================

/// 스키마 빌더
///
/// `extend`로 기존 스키마를 복사한 뒤 델타를 적용해 새 스키마를 만듭니다.
/// 같은 키를 다시 선언하면 새 명세가 통째로 이깁니다.
#[derive(Debug, Clone, Default)]
pub struct SchemaBuilder {
    properties: BTreeMap<String, PropertySpec>,
    required: BTreeSet<String>,
    defaults: Map<String, Value>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 기존 스키마에서 시작
    pub fn extend(base: &ConfigSchema) -> Self {
        Self {
            properties: base.properties.clone(),
            required: base.required.clone(),
            defaults: base.defaults.clone(),
        }
    }

    pub fn property(mut self, name: impl Into<String>, spec: PropertySpec) -> Self {
        self.properties.insert(name.into(), spec);
        self
    }

    pub fn require(mut self, name: impl Into<String>) -> Self {
        self.required.insert(name.into());
        self
    }

    pub fn default_value(mut self, name: impl Into<String>, value: Value) -> Self {
        self.defaults.insert(name.into(), value);
        self
    }

    /// 스키마 생성
    ///
    /// 모든 필수 키는 기본값을 가져야 합니다.
    pub fn build(self) -> Result<ConfigSchema> {
        if let Some(missing) = self
            .required
            .iter()
            .find(|key| !self.defaults.contains_key(key.as_str()))
        {
            return Err(Error::Config(format!(
                "Required property '{}' has no default",
                missing
            )));
        }

        Ok(ConfigSchema {
            properties: self.properties,
            required: self.required,
            defaults: self.defaults,
        })
    }
}

// ============================================================================
// ValidationReport - 검증 결과
// ============================================================================

/// 검증 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
        }
    }
}

impl ValidationReport {
    fn fatal(&mut self, message: String) {
        self.is_valid = false;
        self.errors.push(message);
    }

    fn warning(&mut self, message: String) {
        self.errors.push(message);
    }

    fn absorb(&mut self, prefix: &str, other: ValidationReport) {
        self.is_valid &= other.is_valid;
        self.errors
            .extend(other.errors.into_iter().map(|e| format!("{}: {}", prefix, e)));
    }

    /// invalid면 Validation 에러로 변환
    pub fn into_result(self) -> Result<()> {
        if self.is_valid {
            Ok(())
        } else {
            Err(Error::Validation(self.errors.join("; ")))
        }
    }
}

// ============================================================================
// 검증 / 기본값 적용
// ============================================================================

/// 설정을 스키마로 검증
pub fn validate(config: &Map<String, Value>, schema: &ConfigSchema) -> ValidationReport {
    let mut report = ValidationReport::default();

    for key in &schema.required {
        if !config.contains_key(key) {
            report.fatal(format!("Missing required property: {}", key));
        }
    }

    for (key, value) in config {
        match schema.properties.get(key) {
            Some(spec) => check_value(key, value, spec, &mut report),
            None => report.warning(format!("Unknown property: {}", key)),
        }
    }

    report
}

/// 단일 프로퍼티 값 검증
pub fn validate_property(name: &str, value: &Value, spec: &PropertySpec) -> ValidationReport {
    let mut report = ValidationReport::default();
    check_value(name, value, spec, &mut report);
    report
}

fn check_value(name: &str, value: &Value, spec: &PropertySpec, report: &mut ValidationReport) {
    if !spec.kind.matches(value) {
        report.fatal(format!(
            "Invalid type for property {}: expected {}, got {}",
            name,
            spec.kind,
            PropertyKind::name_of(value)
        ));
        return;
    }

    if let Some(allowed) = &spec.enum_values {
        if !allowed.contains(value) {
            let list = allowed
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            report.fatal(format!(
                "Invalid value for property {}: expected one of [{}], got {}",
                name, list, value
            ));
            return;
        }
    }

    match (value, &spec.items, &spec.nested) {
        (Value::Array(elements), Some(items), _) => {
            for (i, element) in elements.iter().enumerate() {
                check_value(&format!("{}[{}]", name, i), element, items, report);
            }
        }
        (Value::Object(object), _, Some(nested)) => {
            let inner = validate(object, nested);
            report.absorb(&format!("In property {}", name), inner);
        }
        _ => {}
    }
}

/// 스키마 기본값 적용
///
/// 명시된 값(false, 0 포함)은 절대 덮어쓰지 않습니다.
/// 값이 객체인 중첩 객체 프로퍼티에만 재귀합니다.
pub fn apply_defaults(config: &Map<String, Value>, schema: &ConfigSchema) -> Map<String, Value> {
    let mut result = config.clone();

    for (key, default) in &schema.defaults {
        if !result.contains_key(key) {
            result.insert(key.clone(), default.clone());
        }
    }

    for (key, spec) in &schema.properties {
        let Some(nested) = &spec.nested else {
            continue;
        };
        if let Some(Value::Object(object)) = result.get_mut(key) {
            *object = apply_defaults(object, nested);
        }
    }

    result
}

// ============================================================================
// 테스트
// ============================================================================
