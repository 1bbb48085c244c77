//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands};
use crate::cli::server::{serve, ServerState};
use crate::config::{ConfigSource, RelayConfig};
use crate::error::Result;
use crate::types::{InvocationFailure, InvocationPayload, InvocationResult};
use crate::workflow::{RetrievalWorkflow, TriggerWorkflow};
use tracing::debug;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        let config = self.load_config(ConfigSource::from_env())?;
        debug!("Loaded config: {config:?}");

        match &self.cli.command {
            Commands::Trigger {
                include_attachments,
                payload,
            } => {
                let payload = match payload {
                    Some(json) => InvocationPayload::from_json(json)?,
                    None => InvocationPayload {
                        include_attachments: *include_attachments,
                    },
                };
                let workflow = TriggerWorkflow::from_config(config).await?;
                report(workflow.run(&payload).await)
            }
            Commands::Retrieve => {
                let workflow = RetrievalWorkflow::from_config(config).await?;
                report(workflow.run().await)
            }
            Commands::Serve { port } => {
                let state = ServerState::from_config(config).await?;
                serve(state, *port).await
            }
        }
    }

    /// Merge flags, config file and environment, in that priority
    pub fn load_config(&self, env: ConfigSource) -> Result<RelayConfig> {
        let mut source = self.cli.overrides();
        if let Some(path) = &self.cli.config {
            source = source.or(ConfigSource::from_file(path)?);
        }
        source.or(env).build()
    }
}

/// Print the invocation outcome as one JSON line on stdout
fn report(outcome: Result<InvocationResult>) -> Result<()> {
    match outcome {
        Ok(result) => {
            println!("{}", serde_json::to_string(&result)?);
            Ok(())
        }
        Err(err) => {
            println!("{}", serde_json::to_string(&InvocationFailure::from(&err))?);
            Err(err)
        }
    }
}
