//! Output module
//!
//! Streams the backup artifact into object storage.
//!
//! # Overview
//!
//! This module provides utilities for:
//! - Naming destination objects from the invocation timestamp
//! - Counting bytes as they flow through the artifact stream
//! - Multipart uploads to S3, R2, GCS, Azure or a local directory

mod destination;
mod naming;
mod stream;

pub use destination::{BackupDestination, MAX_IN_FLIGHT_PARTS};
pub use naming::{object_name, Clock, FixedClock, SystemClock, OBJECT_EXTENSION, TIMESTAMP_FORMAT};
pub use stream::{ArtifactStream, ByteCounter, CountingStream};

#[cfg(test)]
mod tests;
