//! Error types for Backup Relay
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.
//!
//! Every error is fatal to the current invocation. Nothing in the crate
//! retries; [`Error::is_retryable`] only tells the invoking host whether a
//! later re-invocation has a chance of succeeding.

use thiserror::Error;

/// The main error type for Backup Relay
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Credential Errors
    // ============================================================================
    #[error("Secret '{secret_ref}' is unavailable: {message}")]
    SecretUnavailable { secret_ref: String, message: String },

    #[error("Secret '{secret_ref}' is malformed: {message}")]
    SecretMalformed { secret_ref: String, message: String },

    // ============================================================================
    // Upstream Errors
    // ============================================================================
    #[error("Export trigger rejected with HTTP {status}: {body}")]
    TriggerRejected { status: u16, body: String },

    #[error("Request to {endpoint} failed{}: {message}", fmt_status(.status))]
    UpstreamRequestFailed {
        endpoint: String,
        status: Option<u16>,
        message: String,
    },

    #[error("The latest {product} backup is not finished or was not successful (status: {status})")]
    BackupIncomplete { product: String, status: String },

    #[error("Malformed response from {endpoint}: {message}")]
    MalformedResponse { endpoint: String, message: String },

    #[error("Download from {url} failed{}: {message}", fmt_status(.status))]
    DownloadFailed {
        url: String,
        status: Option<u16>,
        message: String,
    },

    // ============================================================================
    // Storage Errors
    // ============================================================================
    #[error("Upload of '{object}' failed: {message}")]
    UploadFailed { object: String, message: String },
}

fn fmt_status(status: &Option<u16>) -> String {
    status.map(|s| format!(" with HTTP {s}")).unwrap_or_default()
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an invalid config value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a secret unavailable error
    pub fn secret_unavailable(secret_ref: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SecretUnavailable {
            secret_ref: secret_ref.into(),
            message: message.into(),
        }
    }

    /// Create a secret malformed error
    pub fn secret_malformed(secret_ref: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SecretMalformed {
            secret_ref: secret_ref.into(),
            message: message.into(),
        }
    }

    /// Create an upstream failure for a request that never got a response
    pub fn upstream_transport(endpoint: impl Into<String>, err: &reqwest::Error) -> Self {
        Self::UpstreamRequestFailed {
            endpoint: endpoint.into(),
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }

    /// Create an upstream failure for a non-2xx response
    pub fn upstream_status(
        endpoint: impl Into<String>,
        status: u16,
        body: impl Into<String>,
    ) -> Self {
        Self::UpstreamRequestFailed {
            endpoint: endpoint.into(),
            status: Some(status),
            message: body.into(),
        }
    }

    /// Create a malformed response error
    pub fn malformed(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Create an upload error
    pub fn upload(object: impl Into<String>, message: impl Into<String>) -> Self {
        Self::UploadFailed {
            object: object.into(),
            message: message.into(),
        }
    }

    /// Stable condition name, reported verbatim to the invoking host
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Config { .. }
            | Error::MissingConfigField { .. }
            | Error::InvalidConfigValue { .. }
            | Error::YamlParse(_)
            | Error::JsonParse(_) => "ConfigInvalid",
            Error::SecretUnavailable { .. } => "SecretUnavailable",
            Error::SecretMalformed { .. } => "SecretMalformed",
            Error::TriggerRejected { .. } => "TriggerRejected",
            Error::UpstreamRequestFailed { .. } => "UpstreamRequestFailed",
            Error::BackupIncomplete { .. } => "BackupIncomplete",
            Error::MalformedResponse { .. } => "MalformedResponse",
            Error::DownloadFailed { .. } => "DownloadFailed",
            Error::UploadFailed { .. } => "UploadFailed",
        }
    }

    /// Raw upstream job status token, when the failure carries one
    pub fn upstream_status_token(&self) -> Option<&str> {
        match self {
            Error::BackupIncomplete { status, .. } => Some(status),
            _ => None,
        }
    }

    /// Check if re-invoking the workflow later could succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::BackupIncomplete { .. } => true,
            Error::UpstreamRequestFailed { status, .. } | Error::DownloadFailed { status, .. } => {
                status.map_or(true, is_retryable_status)
            }
            Error::TriggerRejected { status, .. } => is_retryable_status(*status),
            Error::UploadFailed { .. } => true,
            _ => false,
        }
    }
}

/// Check if an HTTP status code is retryable
fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

/// Result type alias for Backup Relay
pub type Result<T> = std::result::Result<T, Error>;
