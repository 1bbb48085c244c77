//! Common types used throughout Backup Relay
//!
//! This module contains the backend variants and the transient values
//! passed between the workflow steps. Nothing here outlives one invocation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Product
// ============================================================================

/// Backup-capable product, one per upstream backend shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Product {
    /// Confluence Cloud: implicit "current" job, `/wiki/rest/obm` API
    Confluence,
    /// Jira Cloud: explicit task ids, `/rest/backup/1/export` API
    Jira,
}

impl Product {
    /// Lowercase product name
    pub fn as_str(&self) -> &'static str {
        match self {
            Product::Confluence => "confluence",
            Product::Jira => "jira",
        }
    }

    /// Path that starts a new export, if the backend supports triggering
    pub fn trigger_path(&self) -> Option<&'static str> {
        match self {
            Product::Confluence => Some("/wiki/rest/obm/1.0/runbackup"),
            Product::Jira => None,
        }
    }

    /// Path returning the most recent job identifier as plain text
    pub fn last_job_path(&self) -> Option<&'static str> {
        match self {
            Product::Confluence => None,
            Product::Jira => Some("/rest/backup/1/export/lastTaskId"),
        }
    }

    /// Path of the progress endpoint
    pub fn progress_path(&self) -> &'static str {
        match self {
            Product::Confluence => "/wiki/rest/obm/1.0/getprogress.json",
            Product::Jira => "/rest/backup/1/export/getProgress",
        }
    }

    /// JSON field holding the job status token
    pub fn status_field(&self) -> &'static str {
        match self {
            Product::Confluence => "currentStatus",
            Product::Jira => "status",
        }
    }

    /// Exact status token meaning "finished and fetchable"
    pub fn success_token(&self) -> &'static str {
        match self {
            Product::Confluence => "COMPLETE",
            Product::Jira => "Success",
        }
    }

    /// JSON field holding the download locator once the job succeeded
    pub fn locator_field(&self) -> &'static str {
        match self {
            Product::Confluence => "fileName",
            Product::Jira => "result",
        }
    }

    /// Site-relative prefix the locator is appended to for downloading
    pub fn download_prefix(&self) -> &'static str {
        match self {
            Product::Confluence => "/wiki/download/",
            Product::Jira => "/plugins/servlet/",
        }
    }

    /// Destination object name prefix
    pub fn object_prefix(&self) -> &'static str {
        match self {
            Product::Confluence => "confluence-backup-",
            Product::Jira => "jira-backup-",
        }
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Product {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "confluence" => Ok(Product::Confluence),
            "jira" => Ok(Product::Jira),
            other => Err(crate::Error::invalid_value(
                "product",
                format!("unknown product '{other}' (expected confluence or jira)"),
            )),
        }
    }
}

// ============================================================================
// Job Types
// ============================================================================

/// Identifies the export job a status was read for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobDescriptor {
    /// The server's "current" export (Confluence)
    Current,
    /// An explicit task id obtained from the last-task lookup (Jira)
    Task(String),
}

impl fmt::Display for JobDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobDescriptor::Current => f.write_str("current"),
            JobDescriptor::Task(id) => write!(f, "task {id}"),
        }
    }
}

/// Opaque string locating a finished artifact relative to the site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadLocator(String);

impl DownloadLocator {
    pub fn new(locator: impl Into<String>) -> Self {
        Self(locator.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DownloadLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Instantaneous classification of an export job
///
/// Neither backend separates "still running" from "failed", so every
/// non-success token lands in `Incomplete` together with the raw value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    /// The status token matched the backend's success token exactly
    Success,
    /// Anything else, with the token as the server sent it
    Incomplete { status: String },
}

impl JobStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

// ============================================================================
// Invocation Types
// ============================================================================

/// Structured invocation input
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationPayload {
    /// Include binary attachments in a triggered export
    #[serde(
        rename = "includeAttachments",
        default,
        deserialize_with = "deserialize_flag"
    )]
    pub include_attachments: bool,
}

impl InvocationPayload {
    /// Parse a payload; an empty or whitespace-only string is the default payload
    pub fn from_json(json: &str) -> crate::Result<Self> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(json)?)
    }
}

/// Truthiness of an arbitrary JSON value
///
/// `null`, `false`, `0`, `""`, `[]` and `{}` are false; every other value,
/// including the string `"false"`, is true.
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => false,
        Some(serde_json::Value::Bool(b)) => b,
        Some(serde_json::Value::Number(n)) => n.as_f64().is_some_and(|f| f.abs() > 0.0),
        Some(serde_json::Value::String(s)) => !s.is_empty(),
        Some(serde_json::Value::Array(a)) => !a.is_empty(),
        Some(serde_json::Value::Object(o)) => !o.is_empty(),
    })
}

/// Structured invocation output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationResult {
    pub status: String,
    /// Destination object name, present for retrieval runs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

impl InvocationResult {
    /// Result of a trigger run
    pub fn triggered() -> Self {
        Self {
            status: "success".to_string(),
            filename: None,
        }
    }

    /// Result of a retrieval run
    pub fn stored(filename: impl Into<String>) -> Self {
        Self {
            status: "success".to_string(),
            filename: Some(filename.into()),
        }
    }
}

/// Failure report handed back to the invoking host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationFailure {
    pub status: String,
    /// Condition name, e.g. `BackupIncomplete`
    pub error: String,
    pub message: String,
    /// Raw job status token for `BackupIncomplete`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upstream_status: Option<String>,
    pub retryable: bool,
}

impl From<&crate::Error> for InvocationFailure {
    fn from(err: &crate::Error) -> Self {
        Self {
            status: "error".to_string(),
            error: err.kind().to_string(),
            message: err.to_string(),
            upstream_status: err.upstream_status_token().map(String::from),
            retryable: err.is_retryable(),
        }
    }
}
