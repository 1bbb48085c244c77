//! CLI module
//!
//! Command-line interface for invoking the workflows.
//!
//! # Commands
//!
//! - `trigger` - Start a new export on the site
//! - `retrieve` - Relay the latest finished export into storage
//! - `serve` - Accept invocations over HTTP

mod commands;
mod runner;
mod server;

pub use commands::{Cli, Commands};
pub use runner::Runner;
pub use server::{router, serve, ServerState};
