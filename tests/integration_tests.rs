//! Integration tests using mock HTTP server
//!
//! Tests the full end-to-end flow: config → secret → Atlassian export API →
//! streamed upload into an object store

use async_trait::async_trait;
use backup_relay::config::ConfigSource;
use backup_relay::output::{BackupDestination, FixedClock};
use backup_relay::secrets::{provider_for, Credentials, SecretProvider};
use backup_relay::types::{InvocationFailure, InvocationPayload, Product};
use backup_relay::{Error, RelayConfig, Result, RetrievalWorkflow, TriggerWorkflow};
use base64::Engine;
use chrono::{TimeZone, Utc};
use object_store::memory::InMemory;
use object_store::path::Path as ObjectPath;
use object_store::ObjectStore;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::io::Write;
use std::sync::Arc;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const EMAIL: &str = "ops@example.com";
const TOKEN: &str = "s3cr3t";

struct StaticSecrets;

#[async_trait]
impl SecretProvider for StaticSecrets {
    async fn fetch(&self, _secret_ref: &str) -> Result<Credentials> {
        Ok(Credentials::new(EMAIL, TOKEN))
    }
}

fn basic_auth() -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(format!("{EMAIL}:{TOKEN}"));
    format!("Basic {encoded}")
}

fn relay_config(server: &MockServer, product: Product) -> RelayConfig {
    ConfigSource {
        product: Some(product),
        site: Some(server.uri()),
        secret_ref: Some("atlassian/backups/credentials".to_string()),
        destination: Some("unused-bucket".to_string()),
        ..Default::default()
    }
    .build()
    .unwrap()
}

fn clock() -> Arc<FixedClock> {
    Arc::new(FixedClock(Utc.with_ymd_and_hms(2024, 6, 30, 23, 59, 1).unwrap()))
}

fn retrieval(
    server: &MockServer,
    product: Product,
) -> (Arc<dyn ObjectStore>, RetrievalWorkflow) {
    let store: Arc<dyn ObjectStore> = Arc::new(InMemory::new());
    let destination = BackupDestination::from_store(store.clone(), "");
    let workflow = RetrievalWorkflow::new(
        relay_config(server, product),
        Arc::new(StaticSecrets),
        destination,
    )
    .with_clock(clock());
    (store, workflow)
}

// ============================================================================
// Retrieval
// ============================================================================

#[tokio::test]
async fn test_confluence_backup_is_relayed() {
    let server = MockServer::start().await;
    let artifact: Vec<u8> = (0..=255u8).cycle().take(3 * 1024 * 1024).collect();

    Mock::given(method("GET"))
        .and(path("/wiki/rest/obm/1.0/getprogress.json"))
        .and(header("authorization", basic_auth().as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "currentStatus": "COMPLETE",
            "fileName": "temp/filestore/abc.zip",
            "alternativePercentage": "100%"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/wiki/download/temp/filestore/abc.zip"))
        .and(header("authorization", basic_auth().as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(artifact.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let (store, workflow) = retrieval(&server, Product::Confluence);
    let result = workflow.run().await.unwrap();

    assert_eq!(
        serde_json::to_value(&result).unwrap(),
        json!({"status": "success", "filename": "confluence-backup-2024-06-30T23-59-01Z.zip"})
    );

    let stored = store
        .get(&ObjectPath::from("confluence-backup-2024-06-30T23-59-01Z.zip"))
        .await
        .unwrap()
        .bytes()
        .await
        .unwrap();
    assert_eq!(stored.len(), artifact.len());
    assert!(stored.as_ref() == artifact.as_slice());
}

#[tokio::test]
async fn test_jira_backup_is_relayed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/backup/1/export/lastTaskId"))
        .respond_with(ResponseTemplate::new(200).set_body_string("10042\n"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/backup/1/export/getProgress"))
        .and(query_param("taskId", "10042"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "Success",
            "result": "export/download/?fileId=xyz",
            "progress": 100
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/plugins/servlet/export/download/"))
        .and(query_param("fileId", "xyz"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"PK\x03\x04jira".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let (store, workflow) = retrieval(&server, Product::Jira);
    let result = workflow.run().await.unwrap();
    assert_eq!(
        result.filename.as_deref(),
        Some("jira-backup-2024-06-30T23-59-01Z.zip")
    );

    let stored = store
        .get(&ObjectPath::from("jira-backup-2024-06-30T23-59-01Z.zip"))
        .await
        .unwrap()
        .bytes()
        .await
        .unwrap();
    assert_eq!(stored.as_ref(), b"PK\x03\x04jira");
}

#[tokio::test]
async fn test_running_backup_stores_nothing() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/wiki/rest/obm/1.0/getprogress.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "currentStatus": "RUNNING",
            "fileName": null
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/wiki/download/anything"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (store, workflow) = retrieval(&server, Product::Confluence);
    let err = workflow.run().await.unwrap_err();
    assert!(matches!(err, Error::BackupIncomplete { ref status, .. } if status == "RUNNING"));

    let failure = serde_json::to_value(InvocationFailure::from(&err)).unwrap();
    assert_eq!(failure["status"], "error");
    assert_eq!(failure["error"], "BackupIncomplete");
    assert_eq!(failure["upstreamStatus"], "RUNNING");

    let listed = store.list_with_delimiter(None).await.unwrap();
    assert!(listed.objects.is_empty());
}

#[tokio::test]
async fn test_failed_download_stores_nothing() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/wiki/rest/obm/1.0/getprogress.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "currentStatus": "COMPLETE",
            "fileName": "gone.zip"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/wiki/download/gone.zip"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let (store, workflow) = retrieval(&server, Product::Confluence);
    let err = workflow.run().await.unwrap_err();
    assert!(matches!(err, Error::DownloadFailed { status: Some(404), .. }));

    let listed = store.list_with_delimiter(None).await.unwrap();
    assert!(listed.objects.is_empty());
}

#[tokio::test]
async fn test_relay_into_local_directory() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/wiki/rest/obm/1.0/getprogress.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "currentStatus": "COMPLETE",
            "fileName": "abc.zip"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/wiki/download/abc.zip"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"local".to_vec()))
        .mount(&server)
        .await;

    let destination = BackupDestination::parse(dir.path().to_str().unwrap()).unwrap();
    assert_eq!(destination.scheme(), "file");

    let workflow = RetrievalWorkflow::new(
        relay_config(&server, Product::Confluence),
        Arc::new(StaticSecrets),
        destination,
    )
    .with_clock(clock());
    workflow.run().await.unwrap();

    let written =
        std::fs::read(dir.path().join("confluence-backup-2024-06-30T23-59-01Z.zip")).unwrap();
    assert_eq!(written, b"local");
}

// ============================================================================
// Trigger
// ============================================================================

#[tokio::test]
async fn test_trigger_with_attachments() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/wiki/rest/obm/1.0/runbackup"))
        .and(header("authorization", basic_auth().as_str()))
        .and(header("content-type", "application/json"))
        .and(header("accept", "application/json"))
        .and(body_json(json!({"cbAttachments": "true", "exportToCloud": "true"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let workflow = TriggerWorkflow::new(
        relay_config(&server, Product::Confluence),
        Arc::new(StaticSecrets),
    );
    let payload = InvocationPayload::from_json(r#"{"includeAttachments": true}"#).unwrap();
    let result = workflow.run(&payload).await.unwrap();

    assert_eq!(serde_json::to_value(&result).unwrap(), json!({"status": "success"}));
}

#[tokio::test]
async fn test_trigger_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/wiki/rest/obm/1.0/runbackup"))
        .respond_with(
            ResponseTemplate::new(406).set_body_string("Backup frequency is limited"),
        )
        .mount(&server)
        .await;

    let workflow = TriggerWorkflow::new(
        relay_config(&server, Product::Confluence),
        Arc::new(StaticSecrets),
    );
    let err = workflow.run(&InvocationPayload::default()).await.unwrap_err();
    assert!(matches!(err, Error::TriggerRejected { status: 406, ref body } if body.contains("limited")));
}

// ============================================================================
// Credentials
// ============================================================================

#[tokio::test]
async fn test_file_secret_reaches_the_wire() {
    let server = MockServer::start().await;
    let mut secret = tempfile::NamedTempFile::new().unwrap();
    write!(secret, r#"{{"email": "{EMAIL}", "api_token": "{TOKEN}"}}"#).unwrap();

    Mock::given(method("POST"))
        .and(path("/wiki/rest/obm/1.0/runbackup"))
        .and(header("authorization", basic_auth().as_str()))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let secret_ref = format!("file:{}", secret.path().display());
    let provider = provider_for(&secret_ref, None).await.unwrap();
    let mut config = relay_config(&server, Product::Confluence);
    config.secret_ref = secret_ref;

    TriggerWorkflow::new(config, provider)
        .run(&InvocationPayload::default())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_malformed_secret_makes_no_requests() {
    let server = MockServer::start().await;
    let mut secret = tempfile::NamedTempFile::new().unwrap();
    write!(secret, r#"{{"email": "{EMAIL}"}}"#).unwrap();

    let secret_ref = format!("file:{}", secret.path().display());
    let provider = provider_for(&secret_ref, None).await.unwrap();
    let mut config = relay_config(&server, Product::Confluence);
    config.secret_ref = secret_ref;

    let err = TriggerWorkflow::new(config, provider)
        .run(&InvocationPayload::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::SecretMalformed { .. }));
    assert!(server.received_requests().await.unwrap().is_empty());
}
