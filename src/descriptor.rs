//! Endpoint descriptors supplied by callers of the generator.
//!
//! A descriptor names one operation (path plus HTTP method) and carries annotated
//! request/response samples from which schemas are inferred. Descriptors arrive as JSON
//! and are never modified after decoding.
//!
//! # Example
//!
//! ```
//! use openapi_from_samples::descriptor::{EndpointDescriptor, HttpMethod};
//!
//! let json = r#"[{"endpoint": "/users", "httpMethod": "GET",
//!                 "responseSample": {"id": "number", "name": "string"}}]"#;
//! let descriptors: Vec<EndpointDescriptor> = serde_json::from_str(json).unwrap();
//! assert_eq!(descriptors[0].http_method, HttpMethod::Get);
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Description of a single API endpoint to document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointDescriptor {
    /// The URL path, e.g. "/api/v1/resource"
    pub endpoint: String,
    /// The HTTP method, accepted in any case
    pub http_method: HttpMethod,
    /// Annotated request payload whose leaves hold type names such as "string" or "number"
    #[serde(default, alias = "requestSchema", skip_serializing_if = "Option::is_none")]
    pub request_sample: Option<Value>,
    /// Annotated response payload
    #[serde(default, alias = "responseSchema", skip_serializing_if = "Option::is_none")]
    pub response_sample: Option<Value>,
    /// Parameters copied into the operation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<Parameter>>,
    /// Tags copied into the operation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    /// Used as the operation summary
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl EndpointDescriptor {
    /// Create a descriptor with only the required fields set
    pub fn new(endpoint: impl Into<String>, http_method: HttpMethod) -> Self {
        Self {
            endpoint: endpoint.into(),
            http_method,
            request_sample: None,
            response_sample: None,
            parameters: None,
            tags: None,
            operation_id: None,
            description: None,
        }
    }
}

/// HTTP methods an operation can be documented under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 5] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Delete,
        HttpMethod::Patch,
    ];

    /// Method for an OpenAPI path item key. Keys are matched exactly, so `GET` is not a method.
    pub fn from_path_item_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|method| method.as_str() == key)
    }

    /// Lower-case name as used for OpenAPI path item keys
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Delete => "delete",
            HttpMethod::Patch => "patch",
        }
    }

    /// Whether operations under this method carry a request body
    pub fn has_request_body(&self) -> bool {
        !matches!(self, HttpMethod::Get | HttpMethod::Delete)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a method name is not one of the supported methods
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedMethod(pub String);

impl fmt::Display for UnsupportedMethod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "unsupported HTTP method '{}'", self.0)
    }
}

impl std::error::Error for UnsupportedMethod {}

impl FromStr for HttpMethod {
    type Err = UnsupportedMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "get" => Ok(HttpMethod::Get),
            "post" => Ok(HttpMethod::Post),
            "put" => Ok(HttpMethod::Put),
            "delete" => Ok(HttpMethod::Delete),
            "patch" => Ok(HttpMethod::Patch),
            _ => Err(UnsupportedMethod(s.to_string())),
        }
    }
}

impl Serialize for HttpMethod {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for HttpMethod {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

/// An operation parameter.
///
/// Only `name` and `in` are interpreted; every other attribute is carried through
/// unchanged in its original order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Parameter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Parameter location (path, query, header, cookie)
    #[serde(rename = "in", default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(flatten)]
    pub attributes: IndexMap<String, Value>,
}

impl Parameter {
    /// Create a parameter with a name and location
    pub fn new(name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            location: Some(location.into()),
            attributes: IndexMap::new(),
        }
    }

    /// Add an extra attribute such as `required` or `schema`
    pub fn with_attribute(mut self, key: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    /// Whether this parameter is literally named `name` (case-sensitive)
    pub fn is_named(&self, name: &str) -> bool {
        self.name.as_deref() == Some(name)
    }
}
