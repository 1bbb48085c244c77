//! Credential providers

use super::types::{parse_secret, Credentials};
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Resolves a secret reference into credentials
///
/// Called exactly once per invocation, before any request to the site.
/// Providers do not retry.
#[async_trait]
pub trait SecretProvider: Send + Sync {
    /// Fetch and parse the secret
    ///
    /// Fails with `SecretUnavailable` when the reference does not resolve and
    /// with `SecretMalformed` when the value lacks either field.
    async fn fetch(&self, secret_ref: &str) -> Result<Credentials>;
}

/// Reads the secret JSON from an environment variable
#[derive(Debug, Clone, Default)]
pub struct EnvSecretProvider;

#[async_trait]
impl SecretProvider for EnvSecretProvider {
    async fn fetch(&self, secret_ref: &str) -> Result<Credentials> {
        let name = secret_ref.strip_prefix("env:").unwrap_or(secret_ref);
        debug!("Reading credentials from environment variable {name}");
        let raw = std::env::var(name).map_err(|e| Error::secret_unavailable(secret_ref, e.to_string()))?;
        parse_secret(secret_ref, &raw)
    }
}

/// Reads the secret JSON from a file
#[derive(Debug, Clone, Default)]
pub struct FileSecretProvider {
    /// Directory relative references are resolved against
    base_dir: Option<PathBuf>,
}

impl FileSecretProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative paths against `dir`
    pub fn with_base_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(dir.into()),
        }
    }

    fn resolve(&self, secret_ref: &str) -> PathBuf {
        let path = PathBuf::from(secret_ref.strip_prefix("file:").unwrap_or(secret_ref));
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path,
        }
    }
}

#[async_trait]
impl SecretProvider for FileSecretProvider {
    async fn fetch(&self, secret_ref: &str) -> Result<Credentials> {
        let path = self.resolve(secret_ref);
        debug!("Reading credentials from {}", path.display());
        let raw = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| Error::secret_unavailable(secret_ref, format!("{}: {e}", path.display())))?;
        parse_secret(secret_ref, &raw)
    }
}

/// Pick the provider for a secret reference
///
/// `region` is only consulted for AWS Secrets Manager references.
pub async fn provider_for(secret_ref: &str, region: Option<&str>) -> Result<Arc<dyn SecretProvider>> {
    if secret_ref.starts_with("env:") {
        return Ok(Arc::new(EnvSecretProvider));
    }
    if secret_ref.starts_with("file:") {
        return Ok(Arc::new(FileSecretProvider::new()));
    }
    aws_provider(secret_ref, region).await
}

#[cfg(feature = "aws-secrets")]
async fn aws_provider(_secret_ref: &str, region: Option<&str>) -> Result<Arc<dyn SecretProvider>> {
    Ok(Arc::new(super::AwsSecretsManagerProvider::from_env(region).await))
}

#[cfg(not(feature = "aws-secrets"))]
async fn aws_provider(secret_ref: &str, _region: Option<&str>) -> Result<Arc<dyn SecretProvider>> {
    Err(Error::secret_unavailable(
        secret_ref,
        "AWS Secrets Manager references require the 'aws-secrets' feature (or use env:/file:)",
    ))
}
