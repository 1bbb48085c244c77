//! Destination object naming

use crate::types::Product;
use chrono::{DateTime, Utc};

/// Second-precision UTC timestamp, filesystem safe
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H-%M-%SZ";

/// Extension of every backup object
pub const OBJECT_EXTENSION: &str = "zip";

/// Source of the invocation timestamp
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always returns the same instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Build the destination object name
///
/// Format: `{product}-backup-{YYYY-MM-DDTHH-MM-SSZ}.zip`
///
/// Examples:
/// - `confluence-backup-2025-01-02T03-04-05Z.zip`
/// - `jira-backup-2025-01-02T03-04-05Z.zip`
pub fn object_name(product: Product, at: DateTime<Utc>) -> String {
    format!(
        "{}{}.{OBJECT_EXTENSION}",
        product.object_prefix(),
        at.format(TIMESTAMP_FORMAT)
    )
}
