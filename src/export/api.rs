//! Backup API client

use crate::config::RelayConfig;
use crate::error::{Error, Result};
use crate::http::{HttpClient, HttpClientConfig, RequestConfig};
use crate::output::ArtifactStream;
use crate::secrets::Credentials;
use crate::types::{DownloadLocator, JobDescriptor, Product};
use futures::StreamExt;
use reqwest::Response;
use serde_json::{json, Value};
use super::status::ProgressReport;
use tracing::info;

/// Request body for the trigger endpoint
///
/// Both flags are strings, not JSON booleans.
pub fn trigger_body(include_attachments: bool) -> Value {
    json!({
        "cbAttachments": if include_attachments { "true" } else { "false" },
        "exportToCloud": "true",
    })
}

/// An opened artifact download
pub struct Download {
    /// Full URL the artifact is streamed from
    pub url: String,
    /// Size announced by the server, if any
    pub content_length: Option<u64>,
    /// The artifact bytes
    pub stream: ArtifactStream,
}

impl std::fmt::Debug for Download {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Download")
            .field("url", &self.url)
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

/// Backup endpoints of one site
#[derive(Debug, Clone)]
pub struct ExportApi {
    http: HttpClient,
    product: Product,
}

impl ExportApi {
    pub fn new(http: HttpClient, product: Product) -> Self {
        Self { http, product }
    }

    /// Build an authenticated client for the configured site
    pub fn connect(config: &RelayConfig, credentials: Credentials) -> Result<Self> {
        let http_config = HttpClientConfig::builder()
            .base_url(config.site_url()?.as_str())
            .timeout(config.timeout)
            .build();
        let http = HttpClient::with_credentials(http_config, credentials)?;
        Ok(Self::new(http, config.product))
    }

    /// Ask the site to start generating a backup
    ///
    /// Returns once the request is accepted; the job itself runs on.
    pub async fn trigger_export(&self, include_attachments: bool) -> Result<()> {
        let path = self.product.trigger_path().ok_or_else(|| {
            Error::config(format!("{} does not support triggering exports", self.product))
        })?;

        info!("Triggering {} Cloud backup...", self.product);
        let request = RequestConfig::new()
            .header("Accept", "application/json")
            .json(trigger_body(include_attachments));

        let response = self
            .http
            .post_with_config(path, request)
            .await
            .map_err(|e| Error::upstream_transport(path, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::TriggerRejected {
                status: status.as_u16(),
                body: body_text(response).await,
            });
        }

        info!("Backup triggered (attachments: {include_attachments})");
        Ok(())
    }

    /// Look up the most recent task id (explicit-job backends)
    pub async fn last_task_id(&self) -> Result<String> {
        let path = self.product.last_job_path().ok_or_else(|| {
            Error::config(format!("{} has no task id lookup", self.product))
        })?;

        info!("Querying latest task ID...");
        let response = self.send_get(path, RequestConfig::new()).await?;
        let text = response
            .text()
            .await
            .map_err(|e| Error::upstream_transport(path, &e))?;

        let task_id = text.trim();
        if task_id.is_empty() {
            return Err(Error::malformed(path, "empty task id"));
        }
        info!("Task ID: {task_id}");
        Ok(task_id.to_string())
    }

    /// Read the status of one job, once
    pub async fn progress(&self, job: JobDescriptor) -> Result<ProgressReport> {
        let path = self.product.progress_path();
        let request = match &job {
            JobDescriptor::Current => RequestConfig::new(),
            JobDescriptor::Task(id) => RequestConfig::new().query("taskId", id.as_str()),
        };

        info!("Querying status of {} backup ({job})...", self.product);
        let response = self.send_get(path, request).await?;
        let raw = response
            .text()
            .await
            .map_err(|e| Error::upstream_transport(path, &e))?;

        let report = ProgressReport::parse(self.product, job, path, &raw)?;
        info!("Task status: {}", report.status);
        Ok(report)
    }

    /// Resolve the job to check and read its status
    pub async fn poll(&self) -> Result<ProgressReport> {
        let job = match self.product.last_job_path() {
            Some(_) => JobDescriptor::Task(self.last_task_id().await?),
            None => JobDescriptor::Current,
        };
        self.progress(job).await
    }

    /// Open the finished artifact as a stream
    ///
    /// The URL is the site, the backend's download prefix and the locator,
    /// concatenated without further encoding.
    pub async fn open_download(&self, locator: &DownloadLocator) -> Result<Download> {
        let path = format!("{}{}", self.product.download_prefix(), locator.as_str());
        let url = self.http.build_url(&path);
        info!("Downloading from: {locator}");

        let response = self
            .http
            .get(&path)
            .await
            .map_err(|e| Error::DownloadFailed {
                url: url.clone(),
                status: None,
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::DownloadFailed {
                url,
                status: Some(status.as_u16()),
                message: body_text(response).await,
            });
        }

        let content_length = response.content_length();
        let stream_url = url.clone();
        let stream = response
            .bytes_stream()
            .map(move |chunk| {
                chunk.map_err(|e| Error::DownloadFailed {
                    url: stream_url.clone(),
                    status: None,
                    message: format!("stream interrupted: {e}"),
                })
            })
            .boxed();

        Ok(Download {
            url,
            content_length,
            stream,
        })
    }

    async fn send_get(&self, path: &str, request: RequestConfig) -> Result<Response> {
        let response = self
            .http
            .get_with_config(path, request)
            .await
            .map_err(|e| Error::upstream_transport(path, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::upstream_status(
                path,
                status.as_u16(),
                body_text(response).await,
            ));
        }
        Ok(response)
    }
}

/// Error bodies are diagnostics only; a failed read yields an empty string
async fn body_text(response: Response) -> String {
    response.text().await.unwrap_or_default()
}
