//! Signature descriptions and schema synthesis.
//!
//! A [`Signature`] is an ordered description of a function's parameters,
//! built explicitly by the caller since Rust erases parameter names at
//! runtime. [`build_parameters`] turns it into the JSON-schema-shaped
//! `parameters` object that function-calling APIs expect.

use std::collections::BTreeSet;

use schemars::{JsonSchema, generate::SchemaSettings};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use thiserror::Error;

/// Errors raised while building a schema, before any wrapper is constructed.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("parameter `{0}` can't be included and excluded at the same time")]
    IncludeExcludeOverlap(String),
    #[error("included parameter `{0}` not found in the signature")]
    UnknownParameter(String),
}

/// The role a parameter plays in a call, as declared by the wrapped function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// A normal caller-supplied argument.
    Regular,
    /// An implicit receiver (`self`/`cls` typed as a class). Skipped when it
    /// is the first parameter.
    Receiver,
    /// Collects excess positional arguments. Never part of the schema.
    VarPositional,
    /// Collects excess keyword arguments. Never part of the schema.
    VarKeyword,
}

/// Semantic type of a parameter, rendered into a JSON schema fragment.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamType {
    String,
    Integer,
    Number,
    Boolean,
    Null,
    Array(Box<ParamType>),
    Object,
    /// A closed choice of string literals, emitted as `"enum": [...]` rather
    /// than an opaque type reference, for readability in the generated
    /// schema.
    Enumeration(Vec<String>),
    /// An arbitrary JSON schema fragment, e.g. derived via [`ParamType::of`].
    Schema(Value),
}

impl ParamType {
    /// A closed choice over the given member names.
    pub fn enumeration<I, S>(members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ParamType::Enumeration(members.into_iter().map(Into::into).collect())
    }

    /// Derive the schema fragment for a Rust type via schemars.
    pub fn of<T: JsonSchema>() -> Self {
        ParamType::Schema(derive_schema::<T>())
    }

    fn to_schema(&self) -> Value {
        match self {
            ParamType::String => json!({"type": "string"}),
            ParamType::Integer => json!({"type": "integer"}),
            ParamType::Number => json!({"type": "number"}),
            ParamType::Boolean => json!({"type": "boolean"}),
            ParamType::Null => json!({"type": "null"}),
            ParamType::Array(items) => json!({"type": "array", "items": items.to_schema()}),
            ParamType::Object => json!({"type": "object"}),
            ParamType::Enumeration(members) => json!({"type": "string", "enum": members}),
            ParamType::Schema(schema) => schema.clone(),
        }
    }
}

/// Derive a JSON schema fragment that is useful inside a function-calling
/// tool definition.
fn derive_schema<T: JsonSchema>() -> Value {
    let generator = SchemaSettings::default()
        .with(|s| {
            // Don't need the meta schema link, keeping it minimal.
            s.meta_schema = None;
        })
        .into_generator();
    let mut schema = generator.into_root_schema_for::<T>();

    // The synthetic title is an artifact of schema generation, drop it.
    schema.remove("title");

    serde_json::to_value(&schema).expect("schema is valid JSON")
}

/// One declared parameter of a wrapped function.
#[derive(Debug, Clone)]
pub struct ParamSpec {
    name: String,
    kind: ParamKind,
    ty: ParamType,
    description: Option<String>,
    default: Option<Value>,
}

impl ParamSpec {
    /// A regular caller-supplied parameter.
    pub fn new(name: impl Into<String>, ty: ParamType) -> Self {
        ParamSpec {
            name: name.into(),
            kind: ParamKind::Regular,
            ty,
            description: None,
            default: None,
        }
    }

    /// An implicit receiver parameter, e.g. `self` typed as its class.
    pub fn receiver(name: impl Into<String>) -> Self {
        ParamSpec {
            name: name.into(),
            kind: ParamKind::Receiver,
            ty: ParamType::Object,
            description: None,
            default: None,
        }
    }

    /// A variadic positional collector, e.g. `*args`.
    pub fn var_positional(name: impl Into<String>) -> Self {
        ParamSpec {
            name: name.into(),
            kind: ParamKind::VarPositional,
            ty: ParamType::Object,
            description: None,
            default: None,
        }
    }

    /// A variadic keyword collector, e.g. `**kwargs`.
    pub fn var_keyword(name: impl Into<String>) -> Self {
        ParamSpec {
            name: name.into(),
            kind: ParamKind::VarKeyword,
            ty: ParamType::Object,
            description: None,
            default: None,
        }
    }

    /// Human-readable description of the parameter, for the language model.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Default value. A parameter with a default is optional unless forced
    /// required via the wrapper's `include` set.
    pub fn default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Ordered parameter list of a function, with an optional doc string that
/// stands in for the function's documentation.
#[derive(Debug, Clone, Default)]
pub struct Signature {
    params: Vec<ParamSpec>,
    doc: Option<String>,
}

impl Signature {
    pub fn new() -> Self {
        Signature::default()
    }

    /// The function's documentation string, used as the schema description
    /// when no explicit description is configured.
    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Append a parameter, in declaration order.
    pub fn param(mut self, param: ParamSpec) -> Self {
        self.params.push(param);
        self
    }

    pub(crate) fn doc_string(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    fn contains(&self, name: &str) -> bool {
        self.params.iter().any(|p| p.name == name)
    }
}

/// The serialized description of a function's invocation contract, attached
/// to every wrapped callable.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct FunctionSchema {
    pub name: String,
    pub description: String,
    /// Object-shaped parameters schema: `{"type": "object", "properties":
    /// {...}, "required": [...]}`, without a top-level `title`.
    pub parameters: Value,
}

/// Convert a signature into the `parameters` object of a function schema.
///
/// `include` forces parameters with defaults into the required set; `exclude`
/// omits parameters from the schema entirely. Both are validated eagerly,
/// before any schema is assembled, and are never mutated.
pub(crate) fn build_parameters(
    signature: &Signature,
    include: &BTreeSet<String>,
    exclude: &BTreeSet<String>,
) -> Result<Value, SchemaError> {
    if let Some(name) = include.intersection(exclude).next() {
        return Err(SchemaError::IncludeExcludeOverlap(name.clone()));
    }
    for name in include {
        if !signature.contains(name) {
            return Err(SchemaError::UnknownParameter(name.clone()));
        }
    }

    let mut properties = Map::new();
    let mut required = Vec::new();

    for (idx, param) in signature.params.iter().enumerate() {
        // Skip the implicit receiver of an instance or class method.
        if idx == 0
            && param.kind == ParamKind::Receiver
            && matches!(param.name.as_str(), "self" | "cls")
        {
            continue;
        }
        // No schema representation for open-ended argument lists.
        if matches!(param.kind, ParamKind::VarPositional | ParamKind::VarKeyword) {
            continue;
        }
        if exclude.contains(&param.name) {
            continue;
        }

        if param.default.is_none() || include.contains(&param.name) {
            required.push(param.name.clone());
        }

        let mut property = param.ty.to_schema();
        if let Value::Object(map) = &mut property {
            if let Some(description) = &param.description {
                map.insert("description".to_string(), Value::String(description.clone()));
            }
            if let Some(default) = &param.default {
                map.insert("default".to_string(), default.clone());
            }
        }
        properties.insert(param.name.clone(), property);
    }

    Ok(json!({
        "type": "object",
        "properties": properties,
        "required": required,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_param_signature() -> Signature {
        Signature::new()
            .param(ParamSpec::new("a", ParamType::String))
            .param(ParamSpec::new("b", ParamType::Integer).default(1))
    }

    fn names(set: &[&str]) -> BTreeSet<String> {
        set.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_default_makes_parameter_optional() {
        let params =
            build_parameters(&two_param_signature(), &BTreeSet::new(), &BTreeSet::new()).unwrap();

        assert_eq!(params["required"], json!(["a"]));
        assert!(params["properties"]["a"].is_object());
        assert_eq!(params["properties"]["b"]["default"], json!(1));
    }

    #[test]
    fn test_include_forces_required() {
        let no_include =
            build_parameters(&two_param_signature(), &BTreeSet::new(), &BTreeSet::new()).unwrap();
        let with_include =
            build_parameters(&two_param_signature(), &names(&["b"]), &BTreeSet::new()).unwrap();

        assert_eq!(with_include["required"], json!(["a", "b"]));
        assert_eq!(with_include["properties"], no_include["properties"]);
    }

    #[test]
    fn test_exclude_omits_parameter_entirely() {
        let params =
            build_parameters(&two_param_signature(), &BTreeSet::new(), &names(&["b"])).unwrap();

        assert_eq!(params["required"], json!(["a"]));
        assert!(params["properties"].get("b").is_none());
    }

    #[test]
    fn test_exclude_can_drop_a_required_parameter() {
        let params =
            build_parameters(&two_param_signature(), &BTreeSet::new(), &names(&["a"])).unwrap();

        assert_eq!(params["required"], json!([]));
        assert!(params["properties"].get("a").is_none());
        assert!(params["properties"].get("b").is_some());
    }

    #[test]
    fn test_overlapping_include_and_exclude_is_an_error() {
        let result = build_parameters(&two_param_signature(), &names(&["b"]), &names(&["b"]));

        assert!(matches!(
            result,
            Err(SchemaError::IncludeExcludeOverlap(name)) if name == "b"
        ));
    }

    #[test]
    fn test_unknown_included_parameter_is_an_error() {
        let result =
            build_parameters(&two_param_signature(), &names(&["missing"]), &BTreeSet::new());

        assert!(matches!(
            result,
            Err(SchemaError::UnknownParameter(name)) if name == "missing"
        ));
    }

    #[test]
    fn test_receiver_is_skipped() {
        let signature = Signature::new()
            .param(ParamSpec::receiver("self"))
            .param(ParamSpec::new("query", ParamType::String));
        let params = build_parameters(&signature, &BTreeSet::new(), &BTreeSet::new()).unwrap();

        assert!(params["properties"].get("self").is_none());
        assert_eq!(params["required"], json!(["query"]));
    }

    #[test]
    fn test_regular_parameter_named_self_is_retained() {
        let signature = Signature::new()
            .param(ParamSpec::new("self", ParamType::String))
            .param(ParamSpec::new("query", ParamType::String));
        let params = build_parameters(&signature, &BTreeSet::new(), &BTreeSet::new()).unwrap();

        assert!(params["properties"].get("self").is_some());
        assert_eq!(params["required"], json!(["self", "query"]));
    }

    #[test]
    fn test_variadic_collectors_are_skipped() {
        let signature = Signature::new()
            .param(ParamSpec::new("a", ParamType::String))
            .param(ParamSpec::var_positional("args"))
            .param(ParamSpec::var_keyword("kwargs"));
        let params = build_parameters(&signature, &BTreeSet::new(), &BTreeSet::new()).unwrap();

        assert!(params["properties"].get("args").is_none());
        assert!(params["properties"].get("kwargs").is_none());
        assert_eq!(params["required"], json!(["a"]));
    }

    #[test]
    fn test_enumeration_renders_as_closed_string_choice() {
        let signature = Signature::new().param(ParamSpec::new(
            "level",
            ParamType::enumeration(["LOW", "HIGH"]),
        ));
        let params = build_parameters(&signature, &BTreeSet::new(), &BTreeSet::new()).unwrap();

        assert_eq!(
            params["properties"]["level"],
            json!({"type": "string", "enum": ["LOW", "HIGH"]})
        );
    }

    #[test]
    fn test_description_and_default_are_emitted_on_the_property() {
        let signature = Signature::new().param(
            ParamSpec::new("unit", ParamType::String)
                .description("Temperature unit")
                .default("celsius"),
        );
        let params = build_parameters(&signature, &BTreeSet::new(), &BTreeSet::new()).unwrap();

        assert_eq!(
            params["properties"]["unit"],
            json!({
                "type": "string",
                "description": "Temperature unit",
                "default": "celsius",
            })
        );
    }

    #[test]
    fn test_derived_schema_has_no_title() {
        #[derive(JsonSchema)]
        #[allow(dead_code)]
        struct Location {
            city: String,
            state: Option<String>,
        }

        let ParamType::Schema(schema) = ParamType::of::<Location>() else {
            panic!("expected a schema fragment");
        };
        assert!(schema.get("title").is_none());
        assert!(schema["properties"].get("city").is_some());
    }

    #[test]
    fn test_array_type_renders_items() {
        let signature = Signature::new().param(ParamSpec::new(
            "tags",
            ParamType::Array(Box::new(ParamType::String)),
        ));
        let params = build_parameters(&signature, &BTreeSet::new(), &BTreeSet::new()).unwrap();

        assert_eq!(
            params["properties"]["tags"],
            json!({"type": "array", "items": {"type": "string"}})
        );
    }

    #[test]
    fn test_parameters_object_has_no_title() {
        let params =
            build_parameters(&two_param_signature(), &BTreeSet::new(), &BTreeSet::new()).unwrap();

        assert!(params.get("title").is_none());
        assert_eq!(params["type"], json!("object"));
    }
}
