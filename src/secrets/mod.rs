//! Credential module
//!
//! Supplies the identity/token pair attached to every upstream request.
//!
//! Providers are picked by the scheme of the secret reference:
//!
//! - `env:NAME` - JSON stored in environment variable `NAME`
//! - `file:PATH` - JSON file at `PATH`
//! - `aws:NAME` or a bare `NAME` - AWS Secrets Manager (`aws-secrets` feature, on by default)
//!
//! Every provider resolves to the same JSON shape:
//! `{"email": "...", "api_token": "..."}`.

#[cfg(feature = "aws-secrets")]
mod aws;
mod provider;
mod types;

#[cfg(feature = "aws-secrets")]
pub use aws::AwsSecretsManagerProvider;
pub use provider::{provider_for, EnvSecretProvider, FileSecretProvider, SecretProvider};
pub use types::{parse_secret, Credentials};
