//! Schema inference from annotated JSON samples.
//!
//! Samples use a small type-annotation format: every leaf holds a type name rather than
//! example data. A leaf whose text is `"number"` (in any case) becomes a number schema and
//! every other leaf becomes a string schema. Objects and arrays are walked recursively.
//!
//! Two policies are pinned here:
//! - an empty array infers its items as an empty object schema;
//! - object properties keep the order in which the JSON decoder exposed the fields
//!   (`serde_json` is built with `preserve_order`, so this is the wire order).

use indexmap::IndexMap;
use log::debug;
use serde_json::{Map, Value};

/// Kind of a leaf schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Number,
    String,
}

impl ScalarKind {
    /// OpenAPI type name
    pub fn as_str(&self) -> &'static str {
        match self {
            ScalarKind::Number => "number",
            ScalarKind::String => "string",
        }
    }

    /// Classify a leaf by its textual content
    fn from_token(token: &str) -> Self {
        if token.eq_ignore_ascii_case("number") {
            ScalarKind::Number
        } else {
            ScalarKind::String
        }
    }
}

/// Inferred shape of a sample
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    Object { properties: IndexMap<String, SchemaNode> },
    Array { items: Box<SchemaNode> },
    Scalar { kind: ScalarKind },
}

impl SchemaNode {
    /// An object schema without properties
    pub fn empty_object() -> Self {
        SchemaNode::Object {
            properties: IndexMap::new(),
        }
    }

    pub fn number() -> Self {
        SchemaNode::Scalar {
            kind: ScalarKind::Number,
        }
    }

    pub fn string() -> Self {
        SchemaNode::Scalar {
            kind: ScalarKind::String,
        }
    }

    /// Render the node as an OpenAPI schema object
    pub fn to_value(&self) -> Value {
        let mut schema = Map::new();
        match self {
            SchemaNode::Object { properties } => {
                schema.insert("type".to_string(), Value::from("object"));
                let properties: Map<String, Value> = properties
                    .iter()
                    .map(|(name, node)| (name.clone(), node.to_value()))
                    .collect();
                schema.insert("properties".to_string(), Value::Object(properties));
            }
            SchemaNode::Array { items } => {
                schema.insert("type".to_string(), Value::from("array"));
                schema.insert("items".to_string(), items.to_value());
            }
            SchemaNode::Scalar { kind } => {
                schema.insert("type".to_string(), Value::from(kind.as_str()));
            }
        }
        Value::Object(schema)
    }
}

impl From<&SchemaNode> for Value {
    fn from(node: &SchemaNode) -> Self {
        node.to_value()
    }
}

/// Schema generator - converts annotated samples to schema nodes
///
/// The override table forces the kind of scalar leaves by property name, regardless of
/// the leaf's own annotation. Overrides never apply to object or array values.
#[derive(Debug, Clone, Default)]
pub struct SchemaGenerator {
    overrides: IndexMap<String, ScalarKind>,
}

impl SchemaGenerator {
    /// Generator without overrides, used for request bodies
    pub fn new() -> Self {
        Self::default()
    }

    /// Generator used for response bodies: `amount` is always a number
    pub fn for_responses() -> Self {
        Self::new().with_override("amount", ScalarKind::Number)
    }

    /// Add an entry to the override table
    pub fn with_override(mut self, property: impl Into<String>, kind: ScalarKind) -> Self {
        self.overrides.insert(property.into(), kind);
        self
    }

    /// The override table in insertion order
    pub fn overrides(&self) -> &IndexMap<String, ScalarKind> {
        &self.overrides
    }

    /// Infer the schema of an optional sample; an absent sample is an empty object
    pub fn generate_schema(&self, sample: Option<&Value>) -> SchemaNode {
        match sample {
            Some(value) => self.infer(value),
            None => SchemaNode::empty_object(),
        }
    }

    /// Infer the schema of a sample
    pub fn infer(&self, sample: &Value) -> SchemaNode {
        match sample {
            Value::Null => SchemaNode::empty_object(),
            Value::Object(fields) => self.infer_object(fields),
            Value::Array(elements) => SchemaNode::Array {
                items: Box::new(self.generate_schema(elements.first())),
            },
            Value::String(token) => SchemaNode::Scalar {
                kind: ScalarKind::from_token(token),
            },
            Value::Bool(_) | Value::Number(_) => SchemaNode::Scalar {
                kind: ScalarKind::from_token(&sample.to_string()),
            },
        }
    }

    fn infer_object(&self, fields: &Map<String, Value>) -> SchemaNode {
        let properties = fields
            .iter()
            .map(|(name, value)| {
                let node = match (self.overrides.get(name), value) {
                    (Some(kind), Value::String(_) | Value::Number(_) | Value::Bool(_)) => {
                        debug!("Forcing property '{}' to {}", name, kind.as_str());
                        SchemaNode::Scalar { kind: *kind }
                    }
                    _ => self.infer(value),
                };
                (name.clone(), node)
            })
            .collect();
        SchemaNode::Object { properties }
    }
}

/// Infer a request schema
pub fn infer_request_schema(sample: Option<&Value>) -> SchemaNode {
    SchemaGenerator::new().generate_schema(sample)
}

/// Infer a response schema, applying the response override table
pub fn infer_response_schema(sample: Option<&Value>) -> SchemaNode {
    SchemaGenerator::for_responses().generate_schema(sample)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn object(properties: Vec<(&str, SchemaNode)>) -> SchemaNode {
        SchemaNode::Object {
            properties: properties
                .into_iter()
                .map(|(name, node)| (name.to_string(), node))
                .collect(),
        }
    }

    fn array(items: SchemaNode) -> SchemaNode {
        SchemaNode::Array {
            items: Box::new(items),
        }
    }

    #[test]
    fn test_absent_sample_is_empty_object() {
        let gen = SchemaGenerator::new();
        assert_eq!(gen.generate_schema(None), SchemaNode::empty_object());
    }

    #[test]
    fn test_null_sample_is_empty_object() {
        let gen = SchemaGenerator::new();
        assert_eq!(gen.infer(&Value::Null), SchemaNode::empty_object());
    }

    #[test]
    fn test_flat_object_tokens() {
        let gen = SchemaGenerator::new();
        let schema = gen.infer(&json!({"id": "number", "name": "string"}));
        assert_eq!(
            schema,
            object(vec![("id", SchemaNode::number()), ("name", SchemaNode::string())])
        );
    }

    #[test]
    fn test_number_token_is_case_insensitive() {
        let gen = SchemaGenerator::new();
        let schema = gen.infer(&json!({"a": "NUMBER", "b": "Number", "c": "numeric"}));
        assert_eq!(
            schema,
            object(vec![
                ("a", SchemaNode::number()),
                ("b", SchemaNode::number()),
                ("c", SchemaNode::string()),
            ])
        );
    }

    #[test]
    fn test_leaves_use_text_not_runtime_kind() {
        let gen = SchemaGenerator::new();
        let schema = gen.infer(&json!({"count": 5, "flag": true, "ratio": 0.5}));
        assert_eq!(
            schema,
            object(vec![
                ("count", SchemaNode::string()),
                ("flag", SchemaNode::string()),
                ("ratio", SchemaNode::string()),
            ])
        );
    }

    #[test]
    fn test_nested_objects_and_arrays() {
        let gen = SchemaGenerator::new();
        let schema = gen.infer(&json!({
            "user": {"id": "number", "tags": ["string"]},
            "items": [{"sku": "string", "qty": "number"}, {"ignored": "number"}]
        }));
        assert_eq!(
            schema,
            object(vec![
                (
                    "user",
                    object(vec![
                        ("id", SchemaNode::number()),
                        ("tags", array(SchemaNode::string())),
                    ])
                ),
                (
                    "items",
                    array(object(vec![
                        ("sku", SchemaNode::string()),
                        ("qty", SchemaNode::number()),
                    ]))
                ),
            ])
        );
    }

    #[test]
    fn test_empty_array_items_are_empty_object() {
        let gen = SchemaGenerator::new();
        let schema = gen.infer(&json!({"list": []}));
        assert_eq!(schema, object(vec![("list", array(SchemaNode::empty_object()))]));
        assert_eq!(
            schema.to_value(),
            json!({
                "type": "object",
                "properties": {
                    "list": {"type": "array", "items": {"type": "object", "properties": {}}}
                }
            })
        );
    }

    #[test]
    fn test_null_property_is_empty_object() {
        let gen = SchemaGenerator::new();
        let schema = gen.infer(&json!({"meta": null}));
        assert_eq!(schema, object(vec![("meta", SchemaNode::empty_object())]));
    }

    #[test]
    fn test_top_level_array_and_scalar() {
        let gen = SchemaGenerator::new();
        assert_eq!(gen.infer(&json!(["number"])), array(SchemaNode::number()));
        assert_eq!(gen.infer(&json!("number")), SchemaNode::number());
        assert_eq!(gen.infer(&json!("boolean")), SchemaNode::string());
    }

    #[test]
    fn test_property_order_follows_input() {
        let gen = SchemaGenerator::new();
        let sample: Value = serde_json::from_str(r#"{"zeta": "string", "alpha": "number", "mid": "string"}"#).unwrap();
        let SchemaNode::Object { properties } = gen.infer(&sample) else {
            panic!("expected object schema");
        };
        let names: Vec<&str> = properties.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_request_generator_has_no_overrides() {
        let schema = infer_request_schema(Some(&json!({"amount": "string"})));
        assert_eq!(schema, object(vec![("amount", SchemaNode::string())]));
    }

    #[test]
    fn test_response_generator_forces_amount() {
        let schema = infer_response_schema(Some(&json!({
            "amount": "string",
            "total": "string",
            "nested": {"amount": "text"}
        })));
        assert_eq!(
            schema,
            object(vec![
                ("amount", SchemaNode::number()),
                ("total", SchemaNode::string()),
                ("nested", object(vec![("amount", SchemaNode::number())])),
            ])
        );
    }

    #[test]
    fn test_override_is_exact_and_leaf_only() {
        let schema = infer_response_schema(Some(&json!({
            "Amount": "string",
            "amount": {"value": "string"}
        })));
        assert_eq!(
            schema,
            object(vec![
                ("Amount", SchemaNode::string()),
                ("amount", object(vec![("value", SchemaNode::string())])),
            ])
        );
    }

    #[test]
    fn test_custom_override_table() {
        let gen = SchemaGenerator::new()
            .with_override("price", ScalarKind::Number)
            .with_override("code", ScalarKind::String);
        assert_eq!(gen.overrides().len(), 2);

        let schema = gen.infer(&json!({"price": "string", "code": "number"}));
        assert_eq!(
            schema,
            object(vec![("price", SchemaNode::number()), ("code", SchemaNode::string())])
        );
    }

    #[test]
    fn test_to_value_scalar_and_array() {
        assert_eq!(SchemaNode::number().to_value(), json!({"type": "number"}));
        assert_eq!(
            array(SchemaNode::string()).to_value(),
            json!({"type": "array", "items": {"type": "string"}})
        );
        assert_eq!(
            Value::from(&SchemaNode::empty_object()),
            json!({"type": "object", "properties": {}})
        );
    }
}
