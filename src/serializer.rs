//! Serialization module for converting OpenAPI documents to YAML or JSON format.
//!
//! This module provides functions to serialize OpenAPI documents into standard formats
//! and to read and write the text files the command-line tool works with.

use crate::openapi_builder::OpenApiDocument;
use anyhow::{Context, Result};
use log::debug;
use std::fs;
use std::io::Read;
use std::path::Path;

/// Serializes an OpenAPI document to block-style YAML.
///
/// # Errors
///
/// Returns an error if serialization fails.
///
/// # Example
///
/// ```
/// use openapi_from_samples::openapi_builder::assemble;
/// use openapi_from_samples::serializer::serialize_yaml;
///
/// let doc = assemble(&[]);
/// let yaml = serialize_yaml(&doc).unwrap();
/// assert!(yaml.starts_with("openapi:"));
/// ```
pub fn serialize_yaml(doc: &OpenApiDocument) -> Result<String> {
    debug!("Serializing OpenAPI document to YAML");
    serde_yaml::to_string(doc).context("Failed to serialize OpenAPI document to YAML")
}

/// Serializes an OpenAPI document to JSON format with pretty printing.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn serialize_json(doc: &OpenApiDocument) -> Result<String> {
    debug!("Serializing OpenAPI document to JSON");
    serde_json::to_string_pretty(doc).context("Failed to serialize OpenAPI document to JSON")
}

/// Reads text from a file, or from stdin when the path is `-`.
pub fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        debug!("Reading input from stdin");
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .context("Failed to read from stdin")?;
        return Ok(content);
    }

    debug!("Reading input from file: {}", path.display());
    fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path.display()))
}

/// Writes string content to a file.
///
/// Creates the file if it doesn't exist, or overwrites it if it does. Missing parent
/// directories are created.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written to.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    debug!("Writing content to file: {}", path.display());

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    fs::write(path, content)
        .with_context(|| format!("Failed to write to file: {}", path.display()))?;

    debug!("Successfully wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{EndpointDescriptor, HttpMethod, Parameter};
    use crate::openapi_builder::assemble;
    use serde_json::json;
    use tempfile::TempDir;

    fn create_test_document() -> OpenApiDocument {
        let mut create = EndpointDescriptor::new("/orders", HttpMethod::Post);
        create.request_sample = Some(json!({"amount": "number", "items": [{"sku": "string"}]}));
        create.response_sample = Some(json!({"id": "string", "amount": "string"}));
        create.parameters = Some(vec![Parameter::new("X-Trace", "header")]);
        create.tags = Some(vec!["orders".to_string()]);
        create.operation_id = Some("createOrder".to_string());

        assemble(&[create, EndpointDescriptor::new("/health", HttpMethod::Get)])
    }

    #[test]
    fn test_serialize_yaml() {
        let yaml = serialize_yaml(&create_test_document()).unwrap();

        assert!(yaml.starts_with("openapi: 3.0.0\n") || yaml.starts_with("openapi: '3.0.0'\n"));
        assert!(yaml.contains("title: Dynamic API"));
        assert!(yaml.contains("description: Dynamically generated API documentation"));
        assert!(yaml.contains("paths:"));
        assert!(yaml.contains("/orders:"));
        assert!(yaml.contains("requestBody:"));
        assert!(yaml.contains("bearerFormat: JWT"));
        // block style, no inline mappings for nested objects
        assert!(!yaml.contains("{type"));
    }

    #[test]
    fn test_serialize_yaml_top_level_order() {
        let yaml = serialize_yaml(&create_test_document()).unwrap();
        let top_level: Vec<&str> = yaml
            .lines()
            .filter(|line| !line.starts_with(' ') && !line.starts_with('-'))
            .filter_map(|line| line.split(':').next())
            .collect();

        assert_eq!(top_level, vec!["openapi", "info", "paths", "components", "security"]);
    }

    #[test]
    fn test_serialize_yaml_is_reproducible() {
        let first = serialize_yaml(&create_test_document()).unwrap();
        let second = serialize_yaml(&create_test_document()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_serialize_json() {
        let json = serialize_json(&create_test_document()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed["openapi"], "3.0.0");
        assert_eq!(parsed["info"]["title"], "Dynamic API");
        assert_eq!(
            parsed["paths"]["/orders"]["post"]["responses"]["200"]["content"]["application/json"]
                ["schema"]["properties"]["amount"],
            json!({"type": "number"})
        );
        assert_eq!(parsed["security"], json!([{"bearerAuth": []}]));
        assert!(json.contains('\n'));
    }

    #[test]
    fn test_roundtrip_yaml_serialization() {
        let doc = create_test_document();
        let yaml = serialize_yaml(&doc).unwrap();
        let deserialized: OpenApiDocument = serde_yaml::from_str(&yaml).unwrap();

        assert_eq!(deserialized, doc);
    }

    #[test]
    fn test_write_to_file_creates_directories() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("subdir").join("nested").join("test.yaml");

        write_to_file("test content", &file_path).unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "test content");
    }

    #[test]
    fn test_write_to_file_overwrites_existing() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("test.yaml");

        write_to_file("initial content", &file_path).unwrap();
        write_to_file("new content", &file_path).unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "new content");
    }

    #[test]
    fn test_read_input_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("input.json");
        fs::write(&file_path, "[]").unwrap();

        assert_eq!(read_input(&file_path).unwrap(), "[]");
    }

    #[test]
    fn test_read_input_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = read_input(&temp_dir.path().join("absent.json")).unwrap_err();

        assert!(err.to_string().starts_with("Failed to read file:"));
    }
}
