#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # Backup Relay
//!
//! Relays asynchronously generated Atlassian Cloud backups (Confluence and
//! Jira) into object storage.
//!
//! Atlassian Cloud produces site backups out of band: an export is started,
//! runs for minutes to hours, and its artifact is then downloadable for a
//! while. Backup Relay drives that cycle through two independent,
//! single-shot workflows that an external scheduler invokes:
//!
//! - **Trigger**: start a new export (Confluence only)
//! - **Retrieve**: check the latest export once and, if it succeeded, stream
//!   the artifact straight into a bucket under a timestamped name
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use backup_relay::config::ConfigSource;
//! use backup_relay::workflow::RetrievalWorkflow;
//!
//! #[tokio::main]
//! async fn main() -> backup_relay::Result<()> {
//!     let config = ConfigSource::from_env().build()?;
//!     let workflow = RetrievalWorkflow::from_config(config).await?;
//!     let result = workflow.run().await?;
//!     println!("{}", serde_json::to_string(&result)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │            Invocation (CLI one-shot / HTTP endpoint)            │
//! │   trigger(payload) → {"status"}   retrieve() → {"status","filename"}│
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────┬───────────┬───────┴───────┬───────────┬─────────────┐
//! │  Config  │  Secrets  │     HTTP      │  Export   │   Output    │
//! ├──────────┼───────────┼───────────────┼───────────┼─────────────┤
//! │ YAML     │ env:      │ Basic auth    │ Trigger   │ S3 / R2     │
//! │ Env vars │ file:     │ GET/POST      │ Progress  │ GCS / Azure │
//! │ Flags    │ AWS SM    │ Streaming     │ Locator   │ Multipart   │
//! └──────────┴───────────┴───────────────┴───────────┴─────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for Backup Relay
pub mod error;

/// Common types and type aliases
pub mod types;

/// Layered configuration
pub mod config;

/// Credential providers
pub mod secrets;

/// Authenticated HTTP client
pub mod http;

/// Export API for both products
pub mod export;

/// Object storage destinations and streaming upload
pub mod output;

/// Trigger and retrieval workflows
pub mod workflow;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

pub use config::{ConfigSource, RelayConfig};
pub use workflow::{RetrievalWorkflow, TriggerWorkflow};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
