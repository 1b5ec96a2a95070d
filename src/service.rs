//! Request handlers for the generator service.
//!
//! Handlers are independent of any HTTP framework: each takes the raw request body and
//! returns a [`ServiceResponse`] carrying a status code, a content type and a body.

use crate::compliance;
use crate::descriptor::EndpointDescriptor;
use crate::error::{Error, Result};
use crate::openapi_builder::assemble;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

/// Default bound on how long document validation may run
pub const DEFAULT_VALIDATION_TIMEOUT: Duration = Duration::from_millis(5000);

/// Outcome of a handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl ServiceResponse {
    fn ok(content_type: &'static str, body: String) -> Self {
        Self {
            status: 200,
            content_type,
            body,
        }
    }

    fn bad_request(body: String) -> Self {
        Self {
            status: 400,
            content_type: "text/plain",
            body,
        }
    }

    fn internal_error(body: String) -> Self {
        Self {
            status: 500,
            content_type: "text/plain",
            body,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl From<Error> for ServiceResponse {
    fn from(err: Error) -> Self {
        if err.is_client_error() {
            ServiceResponse::bad_request(err.to_string())
        } else {
            ServiceResponse::internal_error(err.to_string())
        }
    }
}

/// Body of a compliance response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceReport {
    /// The analyzed document, unchanged
    pub document_text: String,
    /// Issues found; omitted when the document is compliant
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub findings: Vec<String>,
}

impl ComplianceReport {
    pub fn is_compliant(&self) -> bool {
        self.findings.is_empty()
    }
}

/// Liveness probe
pub fn health() -> ServiceResponse {
    ServiceResponse::ok("text/plain", "healthy".to_string())
}

/// Decode a JSON array of endpoint descriptors.
///
/// # Errors
///
/// `InputMissing` for an empty body, `null` or `[]`; `InvalidRequest` when the payload
/// cannot be decoded.
pub fn decode_descriptors(body: &str) -> Result<Vec<EndpointDescriptor>> {
    if body.trim().is_empty() {
        return Err(Error::InputMissing);
    }

    let descriptors: Option<Vec<EndpointDescriptor>> =
        serde_json::from_str(body).map_err(|e| Error::InvalidRequest(e.to_string()))?;

    match descriptors {
        Some(descriptors) if !descriptors.is_empty() => Ok(descriptors),
        _ => Err(Error::InputMissing),
    }
}

/// Generate an OpenAPI document as YAML from a JSON array of descriptors
pub fn generate(body: &str) -> ServiceResponse {
    match generate_yaml(body) {
        Ok(yaml) => ServiceResponse::ok("application/yaml", yaml),
        Err(err) => {
            warn!("Generation request rejected: {}", err);
            err.into()
        }
    }
}

fn generate_yaml(body: &str) -> Result<String> {
    let descriptors = decode_descriptors(body)?;
    info!("Generating document for {} endpoint(s)", descriptors.len());
    let document = assemble(&descriptors);
    Ok(serde_yaml::to_string(&document)?)
}

/// Analyze OpenAPI text, giving up after `timeout`
///
/// Analysis runs on a detached worker thread. On timeout the worker is not cancelled: it
/// keeps running until the analysis finishes and its result is then discarded.
pub fn analyze_with_timeout(text: &str, timeout: Duration) -> Vec<String> {
    let (tx, rx) = mpsc::channel();
    let owned = text.to_string();
    thread::spawn(move || {
        // The receiver is gone if we already timed out
        let _ = tx.send(compliance::analyze_text(&owned));
    });

    match rx.recv_timeout(timeout) {
        Ok(findings) => findings,
        Err(mpsc::RecvTimeoutError::Timeout) => {
            warn!("Validation did not finish within {:?}", timeout);
            vec![format!(
                "OpenAPI validation timed out after {} ms",
                timeout.as_millis()
            )]
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => {
            vec!["OpenAPI validation failed unexpectedly".to_string()]
        }
    }
}

/// Build the compliance report for OpenAPI text
pub fn compliance_report(text: &str, timeout: Duration) -> ComplianceReport {
    let findings = analyze_with_timeout(text, timeout);
    debug!("Compliance report has {} finding(s)", findings.len());
    ComplianceReport {
        document_text: text.to_string(),
        findings,
    }
}

/// Check OpenAPI text for compliance and answer with a JSON report
pub fn check_compliance(body: &str, timeout: Duration) -> ServiceResponse {
    if body.is_empty() {
        return ServiceResponse::bad_request(String::new());
    }

    let report = compliance_report(body, timeout);
    match serde_json::to_string(&report) {
        Ok(json) => ServiceResponse::ok("application/json", json),
        Err(err) => Error::from(err).into(),
    }
}
