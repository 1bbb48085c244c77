//! Status classification and locator extraction

use crate::error::{Error, Result};
use crate::types::{DownloadLocator, JobDescriptor, JobStatus, Product};
use serde_json::Value;

/// One parsed progress response
#[derive(Debug, Clone)]
pub struct ProgressReport {
    /// Job the status belongs to
    pub job: JobDescriptor,
    /// Raw status token
    pub status: String,
    /// Full response body
    pub body: Value,
    /// Endpoint the report came from, for diagnostics
    pub endpoint: String,
}

impl ProgressReport {
    /// Parse a progress response body
    ///
    /// The body must be a JSON object with a string status field.
    pub fn parse(product: Product, job: JobDescriptor, endpoint: &str, raw: &str) -> Result<Self> {
        let body: Value = serde_json::from_str(raw)
            .map_err(|e| Error::malformed(endpoint, format!("invalid JSON: {e}")))?;

        if !body.is_object() {
            return Err(Error::malformed(endpoint, "expected a JSON object"));
        }

        let field = product.status_field();
        let status = body
            .get(field)
            .and_then(Value::as_str)
            .ok_or_else(|| Error::malformed(endpoint, format!("missing string field '{field}'")))?
            .to_string();

        Ok(Self {
            job,
            status,
            body,
            endpoint: endpoint.to_string(),
        })
    }

    /// Classify the status token (case-sensitive exact match)
    pub fn job_status(&self, product: Product) -> JobStatus {
        if self.status == product.success_token() {
            JobStatus::Success
        } else {
            JobStatus::Incomplete {
                status: self.status.clone(),
            }
        }
    }

    /// Fail with `BackupIncomplete` unless the job succeeded
    pub fn ensure_complete(&self, product: Product) -> Result<()> {
        match self.job_status(product) {
            JobStatus::Success => Ok(()),
            JobStatus::Incomplete { status } => Err(Error::BackupIncomplete {
                product: product.to_string(),
                status,
            }),
        }
    }
}

/// Extract the download locator from a successful report
///
/// Returns the field verbatim. No network I/O.
pub fn resolve_locator(product: Product, report: &ProgressReport) -> Result<DownloadLocator> {
    let field = product.locator_field();
    report
        .body
        .get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(DownloadLocator::new)
        .ok_or_else(|| Error::malformed(&report.endpoint, format!("missing download field '{field}'")))
}
