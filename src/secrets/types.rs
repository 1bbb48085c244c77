//! Credential value object

use crate::error::{Error, Result};
use reqwest::RequestBuilder;
use serde_json::Value;
use std::fmt;

/// Identity and API token for one site
///
/// Immutable once built. `Debug` never prints the token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    email: String,
    api_token: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            api_token: api_token.into(),
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn api_token(&self) -> &str {
        &self.api_token
    }

    /// Attach the credentials as HTTP Basic auth
    pub fn apply(&self, req: RequestBuilder) -> RequestBuilder {
        req.basic_auth(&self.email, Some(&self.api_token))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("api_token", &"<redacted>")
            .finish()
    }
}

/// Parse a secret document into credentials
///
/// The document must be a JSON object with non-empty string fields
/// `email` and `api_token`.
pub fn parse_secret(secret_ref: &str, raw: &str) -> Result<Credentials> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| Error::secret_malformed(secret_ref, format!("not valid JSON: {e}")))?;

    let field = |name: &str| -> Result<String> {
        value
            .get(name)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .ok_or_else(|| {
                Error::secret_malformed(secret_ref, format!("missing string field '{name}'"))
            })
    };

    Ok(Credentials::new(field("email")?, field("api_token")?))
}
