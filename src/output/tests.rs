//! Tests for the output module

use super::*;
use crate::error::Error;
use crate::types::Product;
use bytes::Bytes;
use chrono::{TimeZone, Utc};
use futures::{stream, StreamExt};
use object_store::memory::InMemory;
use object_store::ObjectStore;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use test_case::test_case;

fn chunks(parts: &[&'static [u8]]) -> ArtifactStream {
    let items: Vec<crate::Result<Bytes>> = parts.iter().map(|p| Ok(Bytes::from_static(p))).collect();
    stream::iter(items).boxed()
}

async fn read_object(store: &Arc<dyn ObjectStore>, path: &str) -> Vec<u8> {
    store
        .get(&object_store::path::Path::from(path))
        .await
        .unwrap()
        .bytes()
        .await
        .unwrap()
        .to_vec()
}

// ============================================================================
// Naming
// ============================================================================

#[test_case(Product::Confluence, "confluence-backup-2025-01-02T03-04-05Z.zip" ; "confluence")]
#[test_case(Product::Jira, "jira-backup-2025-01-02T03-04-05Z.zip" ; "jira")]
fn test_object_name(product: Product, expected: &str) {
    let at = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
    assert_eq!(object_name(product, at), expected);
}

#[test]
fn test_object_name_truncates_to_seconds() {
    let at = Utc.with_ymd_and_hms(2025, 12, 31, 23, 59, 59).unwrap()
        + chrono::Duration::milliseconds(999);
    assert_eq!(
        object_name(Product::Jira, at),
        "jira-backup-2025-12-31T23-59-59Z.zip"
    );
}

#[test]
fn test_distinct_instants_give_distinct_names() {
    let t0 = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
    let t1 = t0 + chrono::Duration::seconds(1);
    assert_ne!(
        object_name(Product::Confluence, t0),
        object_name(Product::Confluence, t1)
    );
}

#[test]
fn test_fixed_clock() {
    let at = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
    let clock = FixedClock(at);
    assert_eq!(clock.now(), at);
    assert_eq!(clock.now(), at);
}

// ============================================================================
// Counting Stream
// ============================================================================

#[tokio::test]
async fn test_counting_stream_passes_chunks_through() {
    let counting = CountingStream::new(chunks(&[b"abc", b"", b"defgh"]));
    let counter = counting.counter();

    let collected: Vec<Bytes> = counting.map(|c| c.unwrap()).collect().await;
    assert_eq!(collected.len(), 3);
    assert_eq!(collected.concat(), b"abcdefgh".to_vec());
    assert_eq!(counter.get(), 8);
}

#[tokio::test]
async fn test_counting_stream_skips_errors() {
    let items: Vec<crate::Result<Bytes>> = vec![
        Ok(Bytes::from_static(b"1234")),
        Err(Error::DownloadFailed {
            url: "https://x/wiki/download/a.zip".to_string(),
            status: None,
            message: "connection reset".to_string(),
        }),
    ];
    let counting = CountingStream::new(stream::iter(items));
    let counter = counting.counter();

    let results: Vec<_> = counting.collect().await;
    assert!(results[1].is_err());
    assert_eq!(counter.get(), 4);
}

// ============================================================================
// Destination
// ============================================================================

#[test]
fn test_parse_local_path() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("backups");
    let dest = BackupDestination::parse(path.to_str().unwrap()).unwrap();
    assert_eq!(dest.scheme(), "file");
    assert!(path.is_dir());
}

#[test]
fn test_parse_file_url() {
    let temp_dir = tempfile::tempdir().unwrap();
    let url = format!("file://{}", temp_dir.path().display());
    let dest = BackupDestination::parse(&url).unwrap();
    assert_eq!(dest.scheme(), "file");
}

#[test]
fn test_parse_rejects_unknown_scheme() {
    let err = BackupDestination::parse("ftp://host/dir").unwrap_err();
    assert!(matches!(err, Error::InvalidConfigValue { .. }));
}

#[test]
fn test_parse_rejects_empty() {
    let err = BackupDestination::parse("  ").unwrap_err();
    assert!(matches!(err, Error::MissingConfigField { .. }));
}

#[test]
fn test_object_path_with_prefix() {
    let store: Arc<dyn ObjectStore> = Arc::new(InMemory::new());
    let dest = BackupDestination::from_store(store.clone(), "nightly/");
    assert_eq!(dest.object_path("a.zip").as_ref(), "nightly/a.zip");

    let dest = BackupDestination::from_store(store, "");
    assert_eq!(dest.object_path("a.zip").as_ref(), "a.zip");
}

#[tokio::test]
async fn test_upload_stream_in_memory() {
    let store: Arc<dyn ObjectStore> = Arc::new(InMemory::new());
    let dest = BackupDestination::from_store(store.clone(), "atlassian");

    let location = dest
        .upload_stream("jira-backup-x.zip", chunks(&[b"PK\x03\x04", b"rest of zip"]))
        .await
        .unwrap();

    assert_eq!(location, "memory://atlassian/jira-backup-x.zip");
    assert_eq!(
        read_object(&store, "atlassian/jira-backup-x.zip").await,
        b"PK\x03\x04rest of zip".to_vec()
    );
}

#[tokio::test]
async fn test_upload_large_stream_spans_parts() {
    static CHUNK: [u8; 1024 * 1024] = [7u8; 1024 * 1024];
    let parts: Vec<crate::Result<Bytes>> = (0..12).map(|_| Ok(Bytes::from_static(&CHUNK))).collect();

    let store: Arc<dyn ObjectStore> = Arc::new(InMemory::new());
    let dest = BackupDestination::from_store(store.clone(), "");
    dest.upload_stream("big.zip", stream::iter(parts).boxed())
        .await
        .unwrap();

    let meta = store
        .head(&object_store::path::Path::from("big.zip"))
        .await
        .unwrap();
    assert_eq!(meta.size, 12 * 1024 * 1024);
}

#[tokio::test]
async fn test_upload_stream_source_error_leaves_no_object() {
    let items: Vec<crate::Result<Bytes>> = vec![
        Ok(Bytes::from_static(b"partial")),
        Err(Error::DownloadFailed {
            url: "https://site/wiki/download/x.zip".to_string(),
            status: None,
            message: "stream interrupted".to_string(),
        }),
    ];

    let store: Arc<dyn ObjectStore> = Arc::new(InMemory::new());
    let dest = BackupDestination::from_store(store.clone(), "");
    let err = dest
        .upload_stream("broken.zip", stream::iter(items).boxed())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::DownloadFailed { .. }));
    assert!(store
        .head(&object_store::path::Path::from("broken.zip"))
        .await
        .is_err());
}

#[tokio::test]
async fn test_upload_stream_to_local_dir() {
    let temp_dir = tempfile::tempdir().unwrap();
    let dest = BackupDestination::parse(temp_dir.path().to_str().unwrap()).unwrap();

    dest.upload_stream("confluence-backup-t.zip", chunks(&[b"hello ", b"world"]))
        .await
        .unwrap();

    let written = std::fs::read(temp_dir.path().join("confluence-backup-t.zip")).unwrap();
    assert_eq!(written, b"hello world".to_vec());
}
