//! Relay configuration
//!
//! Configuration is assembled once, before a workflow is built, from any mix
//! of a YAML file, environment variables and command-line overrides. The
//! workflow itself only ever sees the validated [`RelayConfig`].
//!
//! ```yaml
//! product: confluence
//! site: my-site.atlassian.net
//! secret_ref: aws:atlassian/backups/credentials
//! secret_region: us-east-1
//! destination: my-company-confluence-backups
//! ```

use crate::error::{Error, Result};
use crate::types::Product;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

// ============================================================================
// Environment Variables
// ============================================================================

/// Site host name
pub const ENV_SITE_NAME: &str = "SITE_NAME";
/// Credential secret reference
pub const ENV_SECRET_NAME: &str = "CREDENTIALS_SECRET_NAME";
/// Region of the credential secret (AWS Secrets Manager only)
pub const ENV_SECRET_REGION: &str = "CREDENTIALS_SECRET_REGION_NAME";
/// Destination bucket or URL
pub const ENV_BUCKET_NAME: &str = "S3_BUCKET_NAME";
/// `confluence` or `jira`
pub const ENV_PRODUCT: &str = "BACKUP_PRODUCT";

// ============================================================================
// Partial Config
// ============================================================================

/// One layer of configuration, every field optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigSource {
    #[serde(default)]
    pub product: Option<Product>,

    /// Host name of the tenant, e.g. `my-site.atlassian.net`
    #[serde(default)]
    pub site: Option<String>,

    /// Reference handed to the credential provider
    #[serde(default)]
    pub secret_ref: Option<String>,

    #[serde(default)]
    pub secret_region: Option<String>,

    /// Bucket name or object store URL
    #[serde(default)]
    pub destination: Option<String>,

    /// Per-request timeout; unset means the host's deadline is the only one
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Unparsable product value seen in this layer; reported by `build`
    /// only if no layer supplies a valid product
    #[serde(skip)]
    pub rejected_product: Option<String>,
}

impl ConfigSource {
    /// Parse a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("Failed to read {}: {e}", path.display())))?;
        Self::from_yaml_str(&content)
    }

    /// Read the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read variables through `lookup`; empty values count as unset
    ///
    /// An invalid product is kept aside and only fails [`build`](Self::build)
    /// when no higher layer overrides it.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let raw_product = get(ENV_PRODUCT);
        let product = raw_product.as_deref().and_then(|p| p.parse::<Product>().ok());
        let rejected_product = raw_product.filter(|_| product.is_none());

        Self {
            product,
            site: get(ENV_SITE_NAME),
            secret_ref: get(ENV_SECRET_NAME),
            secret_region: get(ENV_SECRET_REGION),
            destination: get(ENV_BUCKET_NAME),
            timeout_secs: None,
            rejected_product,
        }
    }

    /// Fill fields left empty here from `fallback`
    #[must_use]
    pub fn or(self, fallback: ConfigSource) -> Self {
        let rejected_product = if self.product.is_some() || fallback.product.is_some() {
            None
        } else {
            self.rejected_product.or(fallback.rejected_product)
        };
        Self {
            product: self.product.or(fallback.product),
            site: self.site.or(fallback.site),
            secret_ref: self.secret_ref.or(fallback.secret_ref),
            secret_region: self.secret_region.or(fallback.secret_region),
            destination: self.destination.or(fallback.destination),
            timeout_secs: self.timeout_secs.or(fallback.timeout_secs),
            rejected_product,
        }
    }

    /// Validate and produce the final config
    pub fn build(self) -> Result<RelayConfig> {
        let product = match (self.product, self.rejected_product) {
            (Some(product), _) => product,
            (None, Some(raw)) => raw.parse()?,
            (None, None) => return Err(Error::missing_field("product")),
        };
        let site = required(self.site, "site")?;
        let secret_ref = required(self.secret_ref, "secret_ref")?;

        let config = RelayConfig {
            product,
            site,
            secret_ref,
            secret_region: self.secret_region.filter(|r| !r.trim().is_empty()),
            destination: self.destination.filter(|d| !d.trim().is_empty()),
            timeout: self.timeout_secs.map(Duration::from_secs),
        };
        config.site_url()?;
        Ok(config)
    }
}

fn required(value: Option<String>, field: &str) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(Error::missing_field(field)),
    }
}

// ============================================================================
// Validated Config
// ============================================================================

/// Validated configuration for one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    pub product: Product,
    pub site: String,
    pub secret_ref: String,
    pub secret_region: Option<String>,
    /// Required for retrieval only
    pub destination: Option<String>,
    pub timeout: Option<Duration>,
}

impl RelayConfig {
    /// Base URL of the site
    ///
    /// A bare host name gets `https://`; a value that already carries a
    /// scheme is used as is.
    pub fn site_url(&self) -> Result<Url> {
        let raw = if self.site.contains("://") {
            self.site.clone()
        } else {
            format!("https://{}", self.site)
        };
        let url = Url::parse(&raw).map_err(|e| Error::invalid_value("site", e.to_string()))?;
        if url.host_str().is_none() {
            return Err(Error::invalid_value("site", "no host name"));
        }
        Ok(url)
    }

    /// Destination, failing if retrieval is attempted without one
    pub fn require_destination(&self) -> Result<&str> {
        self.destination
            .as_deref()
            .ok_or_else(|| Error::missing_field("destination"))
    }
}
