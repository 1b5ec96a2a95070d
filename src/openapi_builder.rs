use crate::descriptor::{EndpointDescriptor, HttpMethod, Parameter};
use crate::schema_generator::SchemaGenerator;
use indexmap::IndexMap;
use log::{debug, warn};
use serde::de::{IgnoredAny, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Id of the bearer token security scheme attached to every operation
pub const BEARER_SCHEME: &str = "bearerAuth";

const DEFAULT_SUMMARY: &str = "Generated endpoint description";
const JSON_MEDIA_TYPE: &str = "application/json";

/// Method keys a path item may hold that are not documented by this crate
const UNSUPPORTED_METHODS: [&str; 3] = ["head", "options", "trace"];

/// A security requirement: scheme id -> required scopes
pub type SecurityRequirement = IndexMap<String, Vec<String>>;

/// OpenAPI document builder
pub struct OpenApiBuilder {
    /// OpenAPI info section
    info: Info,
    /// Paths collection (URL path -> PathItem)
    paths: IndexMap<String, PathItem>,
    /// Generator for request bodies
    request_schemas: SchemaGenerator,
    /// Generator for responses
    response_schemas: SchemaGenerator,
}

/// OpenAPI Info object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Info {
    /// API title
    pub title: String,
    /// API version
    pub version: String,
    /// API description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Default for Info {
    fn default() -> Self {
        Self {
            title: "Dynamic API".to_string(),
            version: "1.0.0".to_string(),
            description: Some("Dynamically generated API documentation".to_string()),
        }
    }
}

/// OpenAPI PathItem object - all documented operations for a single path, in insertion order
///
/// Decoding keeps the five supported methods, matched by their exact lower-case key.
/// `head`, `options` and `trace` operations are recorded by name in `skipped` and otherwise
/// dropped. Path-level `parameters` and a `$ref` are kept; other keys are ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathItem {
    pub operations: IndexMap<HttpMethod, Operation>,
    /// Parameters shared by every operation on the path
    pub parameters: Option<Vec<Parameter>>,
    /// Unresolved reference to a path item defined elsewhere
    pub reference: Option<String>,
    /// Method keys present in the source document that could not be dispatched
    pub skipped: Vec<String>,
}

impl PathItem {
    pub fn get(&self, method: HttpMethod) -> Option<&Operation> {
        self.operations.get(&method)
    }

    /// Parameters that apply to `operation`: its own, then path-level ones it does not
    /// override by name and location
    pub fn effective_parameters<'a>(&'a self, operation: &'a Operation) -> Vec<&'a Parameter> {
        let mut merged: Vec<&Parameter> = operation.parameters.iter().flatten().collect();
        for shared in self.parameters.iter().flatten() {
            let overridden = shared.name.is_some()
                && merged
                    .iter()
                    .any(|p| p.name == shared.name && p.location == shared.location);
            if !overridden {
                merged.push(shared);
            }
        }
        merged
    }
}

impl Serialize for PathItem {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if let Some(reference) = &self.reference {
            map.serialize_entry("$ref", reference)?;
        }
        if let Some(parameters) = &self.parameters {
            map.serialize_entry("parameters", parameters)?;
        }
        for (method, operation) in &self.operations {
            map.serialize_entry(method.as_str(), operation)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for PathItem {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PathItemVisitor;

        impl<'de> Visitor<'de> for PathItemVisitor {
            type Value = PathItem;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an OpenAPI path item")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<PathItem, A::Error> {
                let mut item = PathItem::default();
                while let Some(key) = map.next_key::<String>()? {
                    if let Some(method) = HttpMethod::from_path_item_key(&key) {
                        let operation = map.next_value::<Operation>()?;
                        item.operations.insert(method, operation);
                        continue;
                    }
                    match key.as_str() {
                        "parameters" => item.parameters = map.next_value()?,
                        "$ref" => item.reference = Some(map.next_value()?),
                        _ => {
                            map.next_value::<IgnoredAny>()?;
                            if UNSUPPORTED_METHODS.contains(&key.as_str()) {
                                item.skipped.push(key);
                            }
                        }
                    }
                }
                Ok(item)
            }
        }

        deserializer.deserialize_map(PathItemVisitor)
    }
}

/// Decode the Paths object, ignoring `x-` extension entries
fn deserialize_paths<'de, D>(deserializer: D) -> Result<IndexMap<String, PathItem>, D::Error>
where
    D: Deserializer<'de>,
{
    struct PathsVisitor;

    impl<'de> Visitor<'de> for PathsVisitor {
        type Value = IndexMap<String, PathItem>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("an OpenAPI paths object")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut paths = IndexMap::new();
            while let Some(key) = map.next_key::<String>()? {
                if key.starts_with("x-") {
                    map.next_value::<IgnoredAny>()?;
                } else {
                    let item = map.next_value::<PathItem>()?;
                    paths.insert(key, item);
                }
            }
            Ok(paths)
        }
    }

    deserializer.deserialize_map(PathsVisitor)
}

/// OpenAPI Operation object - represents a single API operation
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Operation {
    /// Operation summary
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Operation ID
    #[serde(rename = "operationId", default, skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    /// Request body
    #[serde(rename = "requestBody", default, skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    /// Responses keyed by status code
    #[serde(default, deserialize_with = "deserialize_responses")]
    pub responses: IndexMap<String, Response>,
    /// Parameters (path, query, header)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<Parameter>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security: Option<Vec<SecurityRequirement>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

/// OpenAPI RequestBody object
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RequestBody {
    /// Whether the request body is required
    #[serde(default)]
    pub required: bool,
    /// Content types and their schemas
    #[serde(default)]
    pub content: IndexMap<String, MediaType>,
}

/// OpenAPI MediaType object
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MediaType {
    /// Schema for this media type
    #[serde(default)]
    pub schema: Value,
}

/// OpenAPI Response object
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Response {
    /// Response description
    #[serde(default)]
    pub description: String,
    /// Response content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<IndexMap<String, MediaType>>,
}

/// OpenAPI SecurityScheme object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityScheme {
    #[serde(rename = "type")]
    pub scheme_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
    #[serde(rename = "bearerFormat", default, skip_serializing_if = "Option::is_none")]
    pub bearer_format: Option<String>,
}

impl SecurityScheme {
    /// HTTP bearer authentication with JWT tokens
    pub fn bearer_jwt() -> Self {
        Self {
            scheme_type: "http".to_string(),
            scheme: Some("bearer".to_string()),
            bearer_format: Some("JWT".to_string()),
        }
    }
}

/// Either an inline object or a `$ref` to one defined elsewhere
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReferenceOr<T> {
    Reference {
        #[serde(rename = "$ref")]
        reference: String,
    },
    Item(T),
}

/// OpenAPI Components object
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Components {
    #[serde(rename = "securitySchemes", default, skip_serializing_if = "Option::is_none")]
    pub security_schemes: Option<IndexMap<String, ReferenceOr<SecurityScheme>>>,
}

/// Complete OpenAPI document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenApiDocument {
    /// OpenAPI version
    pub openapi: String,
    /// API info
    pub info: Info,
    /// API paths
    #[serde(default, deserialize_with = "deserialize_paths")]
    pub paths: IndexMap<String, PathItem>,
    /// Components (security schemes)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<Components>,
    /// Document-level security requirements
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security: Option<Vec<SecurityRequirement>>,
}

impl OpenApiDocument {
    /// Every (path, method, operation) triple in document order
    pub fn operations(&self) -> impl Iterator<Item = (&str, HttpMethod, &Operation)> {
        self.paths.iter().flat_map(|(path, item)| {
            item.operations
                .iter()
                .map(move |(method, operation)| (path.as_str(), *method, operation))
        })
    }
}

/// Status codes may be written as integers in YAML
#[derive(PartialEq, Eq, Hash, Deserialize)]
#[serde(untagged)]
enum StatusKey {
    Code(u64),
    Text(String),
}

fn deserialize_responses<'de, D>(deserializer: D) -> Result<IndexMap<String, Response>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = IndexMap::<StatusKey, Response>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(key, response)| {
            let key = match key {
                StatusKey::Code(code) => code.to_string(),
                StatusKey::Text(text) => text,
            };
            (key, response)
        })
        .collect())
}

/// The requirement `{bearerAuth: []}`
pub fn bearer_requirement() -> Vec<SecurityRequirement> {
    let mut requirement = SecurityRequirement::new();
    requirement.insert(BEARER_SCHEME.to_string(), Vec::new());
    vec![requirement]
}

fn json_content(schema: Value) -> IndexMap<String, MediaType> {
    let mut content = IndexMap::new();
    content.insert(JSON_MEDIA_TYPE.to_string(), MediaType { schema });
    content
}

impl OpenApiBuilder {
    /// Create a new OpenApiBuilder with default info
    pub fn new() -> Self {
        debug!("Initializing OpenApiBuilder");
        Self {
            info: Info::default(),
            paths: IndexMap::new(),
            request_schemas: SchemaGenerator::new(),
            response_schemas: SchemaGenerator::for_responses(),
        }
    }

    /// Set custom info for the API
    pub fn with_info(mut self, title: String, version: String, description: Option<String>) -> Self {
        self.info = Info {
            title,
            version,
            description,
        };
        self
    }

    /// Replace the generator used for response schemas
    pub fn with_response_schemas(mut self, generator: SchemaGenerator) -> Self {
        self.response_schemas = generator;
        self
    }

    /// Add an endpoint to the OpenAPI document, replacing any earlier operation for the
    /// same path and method
    pub fn add_endpoint(&mut self, descriptor: &EndpointDescriptor) {
        let method = descriptor.http_method;
        debug!("Adding endpoint: {} {}", method, descriptor.endpoint);

        let request_body = if method.has_request_body() {
            let schema = self
                .request_schemas
                .generate_schema(descriptor.request_sample.as_ref());
            Some(RequestBody {
                required: true,
                content: json_content(schema.to_value()),
            })
        } else {
            None
        };

        let response_schema = self
            .response_schemas
            .generate_schema(descriptor.response_sample.as_ref());
        let mut responses = IndexMap::new();
        responses.insert(
            "200".to_string(),
            Response {
                description: "Successful response".to_string(),
                content: Some(json_content(response_schema.to_value())),
            },
        );

        // Authorization is documented once through the bearer scheme
        let parameters = descriptor.parameters.as_ref().and_then(|params| {
            let kept: Vec<Parameter> = params
                .iter()
                .filter(|p| !p.is_named("Authorization"))
                .cloned()
                .collect();
            if kept.is_empty() {
                None
            } else {
                Some(kept)
            }
        });

        let operation = Operation {
            summary: Some(
                descriptor
                    .description
                    .clone()
                    .unwrap_or_else(|| DEFAULT_SUMMARY.to_string()),
            ),
            operation_id: descriptor.operation_id.clone(),
            request_body,
            responses,
            parameters,
            security: Some(bearer_requirement()),
            tags: descriptor.tags.clone(),
        };

        let path_item = self.paths.entry(descriptor.endpoint.clone()).or_default();
        if path_item.operations.insert(method, operation).is_some() {
            warn!(
                "Duplicate endpoint {} {}: replacing earlier definition",
                method, descriptor.endpoint
            );
        }
    }

    /// Build the final OpenAPI document
    pub fn build(self) -> OpenApiDocument {
        debug!("Building final OpenAPI document");

        let mut schemes = IndexMap::new();
        schemes.insert(
            BEARER_SCHEME.to_string(),
            ReferenceOr::Item(SecurityScheme::bearer_jwt()),
        );

        OpenApiDocument {
            openapi: "3.0.0".to_string(),
            info: self.info,
            paths: self.paths,
            components: Some(Components {
                security_schemes: Some(schemes),
            }),
            security: Some(bearer_requirement()),
        }
    }
}

impl Default for OpenApiBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Assemble a document from descriptors in order
pub fn assemble(descriptors: &[EndpointDescriptor]) -> OpenApiDocument {
    let mut builder = OpenApiBuilder::new();
    for descriptor in descriptors {
        builder.add_endpoint(descriptor);
    }
    builder.build()
}
