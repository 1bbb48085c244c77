//! Backup retrieval workflow

use crate::config::RelayConfig;
use crate::error::Result;
use crate::export::{resolve_locator, ExportApi};
use crate::output::{object_name, BackupDestination, Clock, CountingStream, SystemClock};
use crate::secrets::{provider_for, SecretProvider};
use crate::types::InvocationResult;
use futures::StreamExt;
use std::sync::Arc;
use tracing::info;

/// Checks the latest export once and, if finished, relays it to storage
pub struct RetrievalWorkflow {
    config: RelayConfig,
    secrets: Arc<dyn SecretProvider>,
    destination: BackupDestination,
    clock: Arc<dyn Clock>,
}

impl RetrievalWorkflow {
    pub fn new(
        config: RelayConfig,
        secrets: Arc<dyn SecretProvider>,
        destination: BackupDestination,
    ) -> Self {
        Self {
            config,
            secrets,
            destination,
            clock: Arc::new(SystemClock),
        }
    }

    /// Build the credential provider and destination from the config
    pub async fn from_config(config: RelayConfig) -> Result<Self> {
        let destination = BackupDestination::parse(config.require_destination()?)?;
        let secrets = provider_for(&config.secret_ref, config.secret_region.as_deref()).await?;
        Ok(Self::new(config, secrets, destination))
    }

    /// Replace the clock used for object naming
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Run one invocation
    ///
    /// Nothing is downloaded or uploaded unless the status check succeeds,
    /// and the object name is only chosen once the download is open.
    pub async fn run(&self) -> Result<InvocationResult> {
        let product = self.config.product;
        let credentials = self.secrets.fetch(&self.config.secret_ref).await?;
        let api = ExportApi::connect(&self.config, credentials)?;

        let report = api.poll().await?;
        report.ensure_complete(product)?;
        let locator = resolve_locator(product, &report)?;
        info!("Backup file available at: {locator}");

        let download = api.open_download(&locator).await?;
        let name = object_name(product, self.clock.now());

        let counting = CountingStream::new(download.stream);
        let counter = counting.counter();
        let location = self
            .destination
            .upload_stream(&name, counting.boxed())
            .await?;

        info!(
            "Stored {} bytes at {location}{}",
            counter.get(),
            download
                .content_length
                .map(|len| format!(" (announced {len})"))
                .unwrap_or_default()
        );
        Ok(InvocationResult::stored(name))
    }
}
