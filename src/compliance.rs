//! Security compliance checks for OpenAPI documents.
//!
//! Findings are plain messages. An empty list means the document is compliant. Findings
//! are grouped by rule, in this order:
//!
//! 1. validator diagnostics (text input only; no further rules run when present)
//! 2. missing `components.securitySchemes`, then a missing document-level `security`
//! 3. per operation, in document order: missing `security`
//! 4. per operation: missing or misplaced `Authorization` header parameter, counting
//!    parameters declared on the path item
//! 5. per operation: missing `400` response
//! 6. validator warnings (text input only)

use crate::descriptor::HttpMethod;
use crate::openapi_builder::{OpenApiDocument, Operation, PathItem};
use crate::validator;
use log::{debug, info, warn};

const AUTHORIZATION: &str = "Authorization";

/// Analyze OpenAPI text
pub fn analyze_text(text: &str) -> Vec<String> {
    match validator::validate(text) {
        Ok(validated) => {
            let mut findings = analyze_document(&validated.document);
            findings.extend(validated.warnings);
            findings
        }
        Err(diagnostics) => {
            warn!("Document failed validation; skipping compliance rules");
            let mut findings = vec!["Invalid OpenAPI document.".to_string()];
            findings.extend(diagnostics);
            findings
        }
    }
}

/// Analyze a decoded document
pub fn analyze_document(document: &OpenApiDocument) -> Vec<String> {
    for (path, item) in &document.paths {
        for method in &item.skipped {
            warn!("Skipping unsupported HTTP method '{}' on endpoint {}", method, path);
        }
    }

    let mut findings = Vec::new();

    let has_schemes = document
        .components
        .as_ref()
        .and_then(|components| components.security_schemes.as_ref())
        .is_some_and(|schemes| !schemes.is_empty());
    if !has_schemes {
        findings.push("Missing 'components.securitySchemes' definition.".to_string());
    }
    if document.security.is_none() {
        findings.push("Missing security section.".to_string());
    }

    let rules: [fn(&str, HttpMethod, &PathItem, &Operation) -> Option<String>; 3] =
        [check_security, check_authorization_header, check_bad_request_response];
    for rule in rules {
        for (path, item) in &document.paths {
            findings.extend(
                item.operations
                    .iter()
                    .filter_map(|(method, operation)| rule(path, *method, item, operation)),
            );
        }
    }

    info!("Compliance analysis found {} issue(s)", findings.len());
    findings
}

fn check_security(
    path: &str,
    method: HttpMethod,
    _item: &PathItem,
    operation: &Operation,
) -> Option<String> {
    let secured = operation
        .security
        .as_ref()
        .is_some_and(|requirements| !requirements.is_empty());
    if secured {
        return None;
    }
    debug!("{} {} has no security requirement", method, path);
    Some(format!("Missing 'security' definition for {} on endpoint {}", method, path))
}

fn check_authorization_header(
    path: &str,
    method: HttpMethod,
    item: &PathItem,
    operation: &Operation,
) -> Option<String> {
    let named: Vec<_> = item
        .effective_parameters(operation)
        .into_iter()
        .filter(|p| p.is_named(AUTHORIZATION))
        .collect();

    if named.iter().any(|p| p.location.as_deref() == Some("header")) {
        return None;
    }

    match named.first() {
        Some(misplaced) => Some(format!(
            "'{}' parameter for {} on endpoint {} must be located in header, found in {}",
            AUTHORIZATION,
            method,
            path,
            misplaced.location.as_deref().unwrap_or("an unspecified location")
        )),
        None => Some(format!(
            "Missing '{}' header parameter for {} on endpoint {}",
            AUTHORIZATION, method, path
        )),
    }
}

fn check_bad_request_response(
    path: &str,
    method: HttpMethod,
    _item: &PathItem,
    operation: &Operation,
) -> Option<String> {
    if operation.responses.contains_key("400") {
        None
    } else {
        Some(format!("Missing '400' response for {} on endpoint {}", method, path))
    }
}
