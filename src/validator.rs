//! Structural validation of OpenAPI documents supplied as text.
//!
//! Text is first decoded into the `openapiv3` model, which rejects documents that do not
//! have the shape of an OpenAPI 3.0 description. Accepted documents are then decoded into
//! [`OpenApiDocument`] for rule checks. Warnings are collected from that second tree, since
//! `openapiv3` drops path keys that do not start with `/`.

use crate::openapi_builder::OpenApiDocument;
use log::debug;
use openapiv3::OpenAPI;

/// A document that passed structural validation
#[derive(Debug, Clone)]
pub struct ValidatedDocument {
    pub document: OpenApiDocument,
    /// Non-fatal structural warnings in document order
    pub warnings: Vec<String>,
}

/// Validate OpenAPI text.
///
/// # Errors
///
/// Returns the validator's diagnostics when the text is not a structurally valid
/// OpenAPI document.
pub fn validate(text: &str) -> Result<ValidatedDocument, Vec<String>> {
    debug!("Validating OpenAPI document ({} bytes)", text.len());

    let spec: OpenAPI = serde_yaml::from_str(text)
        .map_err(|e| vec![format!("Schema validation error: {}", e)])?;

    let document: OpenApiDocument = serde_yaml::from_str(text)
        .map_err(|e| vec![format!("Unable to decode document: {}", e)])?;

    let warnings = collect_warnings(&spec.openapi, &document);
    debug!("Validation passed with {} warning(s)", warnings.len());

    Ok(ValidatedDocument { document, warnings })
}

fn collect_warnings(version: &str, document: &OpenApiDocument) -> Vec<String> {
    let mut warnings = Vec::new();

    if !version.starts_with("3.0") {
        warnings.push(format!(
            "Document declares OpenAPI version {}; only 3.0.x is fully supported",
            version
        ));
    }

    for (path, item) in &document.paths {
        if !path.starts_with('/') {
            warnings.push(format!("Path '{}' should start with '/'", path));
        }

        if let Some(reference) = &item.reference {
            warnings.push(format!(
                "Path item for {} is a reference to '{}' and was not analyzed",
                path, reference
            ));
            continue;
        }

        for (method, operation) in &item.operations {
            if operation.responses.is_empty() {
                warnings.push(format!(
                    "No responses declared for {} on endpoint {}",
                    method, path
                ));
            }
        }
    }

    warnings
}
