//! AWS Secrets Manager provider

use super::provider::SecretProvider;
use super::types::{parse_secret, Credentials};
use crate::error::{Error, Result};
use async_trait::async_trait;
use aws_sdk_secretsmanager::error::DisplayErrorContext;
use aws_sdk_secretsmanager::Client;
use tracing::debug;

/// Reads `SecretString` from AWS Secrets Manager
#[derive(Debug, Clone)]
pub struct AwsSecretsManagerProvider {
    client: Client,
}

impl AwsSecretsManagerProvider {
    /// Build a client from the ambient AWS configuration
    ///
    /// `region` overrides the region from the environment.
    pub async fn from_env(region: Option<&str>) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(aws_config::Region::new(region.to_string()));
        }
        let config = loader.load().await;
        Self {
            client: Client::new(&config),
        }
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SecretProvider for AwsSecretsManagerProvider {
    async fn fetch(&self, secret_ref: &str) -> Result<Credentials> {
        let secret_id = secret_ref.strip_prefix("aws:").unwrap_or(secret_ref);
        debug!("Fetching secret {secret_id} from Secrets Manager");

        let output = self
            .client
            .get_secret_value()
            .secret_id(secret_id)
            .send()
            .await
            .map_err(|e| Error::secret_unavailable(secret_ref, DisplayErrorContext(&e).to_string()))?;

        let raw = output
            .secret_string()
            .ok_or_else(|| Error::secret_malformed(secret_ref, "secret has no SecretString"))?;
        parse_secret(secret_ref, raw)
    }
}
