//! Export trigger workflow

use crate::config::RelayConfig;
use crate::error::{Error, Result};
use crate::export::ExportApi;
use crate::secrets::{provider_for, SecretProvider};
use crate::types::{InvocationPayload, InvocationResult};
use std::sync::Arc;
use tracing::info;

/// Starts a new export job and returns without waiting for it
pub struct TriggerWorkflow {
    config: RelayConfig,
    secrets: Arc<dyn SecretProvider>,
}

impl TriggerWorkflow {
    pub fn new(config: RelayConfig, secrets: Arc<dyn SecretProvider>) -> Self {
        Self { config, secrets }
    }

    /// Build with the credential provider named by the secret reference
    pub async fn from_config(config: RelayConfig) -> Result<Self> {
        ensure_triggerable(&config)?;
        let secrets = provider_for(&config.secret_ref, config.secret_region.as_deref()).await?;
        Ok(Self::new(config, secrets))
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Run one invocation
    pub async fn run(&self, payload: &InvocationPayload) -> Result<InvocationResult> {
        ensure_triggerable(&self.config)?;
        let credentials = self.secrets.fetch(&self.config.secret_ref).await?;
        let api = ExportApi::connect(&self.config, credentials)?;

        api.trigger_export(payload.include_attachments).await?;

        info!("{} export triggered on {}", self.config.product, self.config.site);
        Ok(InvocationResult::triggered())
    }
}

/// Only products with a trigger endpoint; checked before any secret lookup
fn ensure_triggerable(config: &RelayConfig) -> Result<()> {
    match config.product.trigger_path() {
        Some(_) => Ok(()),
        None => Err(Error::config(format!(
            "{} does not support triggering exports",
            config.product
        ))),
    }
}
