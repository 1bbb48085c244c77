//! CLI commands and argument parsing

use crate::config::ConfigSource;
use crate::types::Product;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Relay Atlassian Cloud backups into object storage
#[derive(Parser, Debug)]
#[command(name = "backup-relay")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Product to back up
    #[arg(short, long, global = true)]
    pub product: Option<Product>,

    /// Site host name, e.g. my-site.atlassian.net
    #[arg(short, long, global = true)]
    pub site: Option<String>,

    /// Credential secret reference (env:NAME, file:PATH, aws:NAME)
    #[arg(long, global = true)]
    pub secret: Option<String>,

    /// Region of an AWS Secrets Manager secret
    #[arg(long, global = true)]
    pub secret_region: Option<String>,

    /// Destination bucket or URL
    /// Supports: bucket, s3://bucket/path, r2://bucket/path, gs://bucket/path, az://container/path, /local/path
    #[arg(short, long, global = true)]
    pub destination: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Flags as the highest-priority config layer
    pub fn overrides(&self) -> ConfigSource {
        ConfigSource {
            product: self.product,
            site: self.site.clone(),
            secret_ref: self.secret.clone(),
            secret_region: self.secret_region.clone(),
            destination: self.destination.clone(),
            ..Default::default()
        }
    }
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start a new export job without waiting for it
    Trigger {
        /// Include attachments in the export
        #[arg(long)]
        include_attachments: bool,

        /// Invocation payload JSON, e.g. '{"includeAttachments": true}'
        #[arg(long, conflicts_with = "include_attachments")]
        payload: Option<String>,
    },

    /// Check the latest export once and relay it to storage if finished
    Retrieve,

    /// Start HTTP invocation endpoint
    Serve {
        /// Port to listen on
        #[arg(long, default_value = "8080")]
        port: u16,
    },
}
