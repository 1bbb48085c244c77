//! Object storage destination (S3, R2, GCS, Azure, local)

use super::stream::ArtifactStream;
use crate::error::{Error, Result};
use futures::StreamExt;
use object_store::aws::AmazonS3Builder;
use object_store::azure::MicrosoftAzureBuilder;
use object_store::gcp::GoogleCloudStorageBuilder;
use object_store::local::LocalFileSystem;
use object_store::path::Path as ObjectPath;
use object_store::{ObjectStore, WriteMultipart};
use std::sync::Arc;
use tracing::{info, warn};

/// Upper bound on parts uploading at once; with the default 5 MiB part size
/// this caps buffered artifact bytes per invocation
pub const MAX_IN_FLIGHT_PARTS: usize = 4;

/// Where backups are written
#[derive(Debug, Clone)]
pub struct BackupDestination {
    /// The object store implementation
    store: Arc<dyn ObjectStore>,
    /// Key prefix within the bucket/container
    prefix: String,
    /// URL scheme for logging
    scheme: String,
}

impl BackupDestination {
    /// Parse a destination and create the matching object store
    ///
    /// Supported formats:
    /// - `my-bucket` - AWS S3 bucket
    /// - `s3://bucket/path/` - AWS S3
    /// - `r2://bucket/path/` - Cloudflare R2 (S3-compatible)
    /// - `gs://bucket/path/` - Google Cloud Storage
    /// - `az://container/path/` - Azure Blob Storage
    /// - `file:///path/`, `/local/path/` or `./path/` - Local filesystem
    pub fn parse(destination: &str) -> Result<Self> {
        let destination = destination.trim();
        if destination.is_empty() {
            return Err(Error::missing_field("destination"));
        }

        if destination.starts_with("s3://") {
            Self::parse_s3(destination, false)
        } else if destination.starts_with("r2://") {
            Self::parse_s3(destination, true)
        } else if destination.starts_with("gs://") {
            Self::parse_gcs(destination)
        } else if destination.starts_with("az://") {
            Self::parse_azure(destination)
        } else if destination.starts_with("file://")
            || destination.starts_with('/')
            || destination.starts_with('.')
        {
            Self::parse_local(destination)
        } else if destination.contains("://") {
            Err(Error::invalid_value(
                "destination",
                format!("unsupported scheme in {destination}"),
            ))
        } else {
            Self::parse_s3(&format!("s3://{destination}"), false)
        }
    }

    /// Wrap an existing store
    pub fn from_store(store: Arc<dyn ObjectStore>, prefix: impl Into<String>) -> Self {
        Self {
            store,
            prefix: prefix.into(),
            scheme: "memory".to_string(),
        }
    }

    /// Parse S3 or R2 URL
    fn parse_s3(url: &str, is_r2: bool) -> Result<Self> {
        let scheme = if is_r2 { "r2" } else { "s3" };
        let (bucket, prefix) = split_bucket(url, scheme)?;

        let mut builder = AmazonS3Builder::from_env().with_bucket_name(bucket);

        // AWS_ENDPOINT is read by from_env(); R2 also honours its own variable
        if is_r2 {
            if let Ok(endpoint) = std::env::var("R2_ENDPOINT_URL") {
                builder = builder.with_endpoint(endpoint);
            }
        }

        let store = builder
            .build()
            .map_err(|e| Error::config(format!("Failed to create {scheme} client: {e}")))?;

        Ok(Self {
            store: Arc::new(store),
            prefix,
            scheme: scheme.to_string(),
        })
    }

    /// Parse GCS URL
    fn parse_gcs(url: &str) -> Result<Self> {
        let (bucket, prefix) = split_bucket(url, "gs")?;

        let store = GoogleCloudStorageBuilder::from_env()
            .with_bucket_name(bucket)
            .build()
            .map_err(|e| Error::config(format!("Failed to create GCS client: {e}")))?;

        Ok(Self {
            store: Arc::new(store),
            prefix,
            scheme: "gs".to_string(),
        })
    }

    /// Parse Azure Blob URL
    fn parse_azure(url: &str) -> Result<Self> {
        let (container, prefix) = split_bucket(url, "az")?;

        let store = MicrosoftAzureBuilder::from_env()
            .with_container_name(container)
            .build()
            .map_err(|e| Error::config(format!("Failed to create Azure client: {e}")))?;

        Ok(Self {
            store: Arc::new(store),
            prefix,
            scheme: "az".to_string(),
        })
    }

    /// Parse local filesystem path
    fn parse_local(path: &str) -> Result<Self> {
        let path = path.strip_prefix("file://").unwrap_or(path);

        std::fs::create_dir_all(path)
            .map_err(|e| Error::config(format!("Failed to create directory {path}: {e}")))?;

        let store = LocalFileSystem::new_with_prefix(path)
            .map_err(|e| Error::config(format!("Failed to create local store: {e}")))?;

        Ok(Self {
            store: Arc::new(store),
            prefix: String::new(),
            scheme: "file".to_string(),
        })
    }

    /// Get the scheme (s3, r2, gs, az, file, memory)
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Full object path for a name
    pub fn object_path(&self, name: &str) -> ObjectPath {
        if self.prefix.is_empty() {
            ObjectPath::from(name)
        } else {
            ObjectPath::from(format!("{}/{name}", self.prefix.trim_end_matches('/')))
        }
    }

    /// Stream an artifact into a new object
    ///
    /// Chunks are handed to a multipart upload as they arrive, with at most
    /// [`MAX_IN_FLIGHT_PARTS`] parts in flight. The object only becomes
    /// visible once the upload completes. On any failure the multipart upload
    /// is aborted; an error from the source stream is returned unchanged,
    /// storage errors become `UploadFailed`.
    pub async fn upload_stream(&self, name: &str, mut stream: ArtifactStream) -> Result<String> {
        let path = self.object_path(name);
        info!("Uploading to {}: {name}", self.scheme);

        let upload = self
            .store
            .put_multipart(&path)
            .await
            .map_err(|e| Error::upload(name, e.to_string()))?;
        let mut writer = WriteMultipart::new(upload);

        while let Some(chunk) = stream.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    abort(writer, name).await;
                    return Err(e);
                }
            };

            if let Err(e) = writer.wait_for_capacity(MAX_IN_FLIGHT_PARTS).await {
                abort(writer, name).await;
                return Err(Error::upload(name, e.to_string()));
            }
            writer.put(chunk);
        }

        writer
            .finish()
            .await
            .map_err(|e| Error::upload(name, e.to_string()))?;

        Ok(format!("{}://{path}", self.scheme))
    }
}

/// Parts already written are discarded; no completed object is touched
async fn abort(writer: WriteMultipart, name: &str) {
    if let Err(e) = writer.abort().await {
        warn!("Failed to abort upload of {name}: {e}");
    } else {
        warn!("Aborted upload of {name}");
    }
}

/// Split `scheme://bucket/prefix` into bucket and prefix
fn split_bucket<'a>(url: &'a str, scheme: &str) -> Result<(&'a str, String)> {
    let without_scheme = url
        .strip_prefix(&format!("{scheme}://"))
        .ok_or_else(|| Error::config(format!("Invalid {scheme} URL: {url}")))?;

    let (bucket, prefix) = match without_scheme.find('/') {
        Some(idx) => (
            &without_scheme[..idx],
            without_scheme[idx + 1..].trim_end_matches('/').to_string(),
        ),
        None => (without_scheme, String::new()),
    };

    if bucket.is_empty() {
        return Err(Error::invalid_value("destination", format!("no bucket in {url}")));
    }
    Ok((bucket, prefix))
}
