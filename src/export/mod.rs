//! Export API module
//!
//! Talks to the site's undocumented backup endpoints.
//!
//! # Flow
//!
//! 1. [`ExportApi::trigger_export`] starts a job (Confluence only) and returns
//!    without waiting
//! 2. [`ExportApi::poll`] reads the job status exactly once; for Jira it first
//!    looks up the latest task id
//! 3. [`ProgressReport::ensure_complete`] fails with `BackupIncomplete` unless
//!    the status token is the backend's success token
//! 4. [`resolve_locator`] pulls the download locator out of the same report
//! 5. [`ExportApi::open_download`] opens the artifact as a byte stream
//!
//! There is no wait loop. An external scheduler re-invokes the whole
//! workflow until the job is done.

mod api;
mod status;

pub use api::{trigger_body, Download, ExportApi};
pub use status::{resolve_locator, ProgressReport};
