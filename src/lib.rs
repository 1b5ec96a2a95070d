//! OpenAPI from samples - OpenAPI documents from annotated endpoint samples.
//!
//! This library builds OpenAPI 3.0 documents from a list of endpoint descriptors whose
//! request and response samples are annotated with type names, and checks existing
//! OpenAPI documents against a fixed set of security compliance rules.
//!
//! # Architecture
//!
//! 1. [`descriptor`] - Endpoint descriptors and HTTP methods
//! 2. [`schema_generator`] - Infers schemas from annotated samples
//! 3. [`openapi_builder`] - Assembles descriptors into an OpenAPI document
//! 4. [`serializer`] - Serializes the document to YAML or JSON
//! 5. [`validator`] - Structural validation of OpenAPI text
//! 6. [`compliance`] - Security compliance rules
//! 7. [`service`] - Request handlers for generation, compliance and liveness
//!
//! # Example Usage
//!
//! ```
//! use openapi_from_samples::{
//!     compliance::analyze_text,
//!     descriptor::{EndpointDescriptor, HttpMethod},
//!     openapi_builder::assemble,
//!     serializer::serialize_yaml,
//! };
//! use serde_json::json;
//!
//! let mut users = EndpointDescriptor::new("/users", HttpMethod::Get);
//! users.response_sample = Some(json!({"id": "number", "name": "string"}));
//!
//! let document = assemble(&[users]);
//! let yaml = serialize_yaml(&document).unwrap();
//!
//! // Generated documents never declare 400 responses
//! let findings = analyze_text(&yaml);
//! assert!(findings.contains(&"Missing '400' response for get on endpoint /users".to_string()));
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module.

pub mod cli;
pub mod descriptor;
pub mod schema_generator;
pub mod openapi_builder;
pub mod serializer;
pub mod validator;
pub mod compliance;
pub mod service;
pub mod error;
