//! Workflow module
//!
//! One invocation of either workflow is strictly linear, single attempt and
//! stateless:
//!
//! ```text
//! trigger:   credentials → POST runbackup → {"status":"success"}
//! retrieve:  credentials → [lastTaskId] → progress → locator
//!            → download stream → multipart upload → {"status":"success","filename":..}
//! ```
//!
//! Any error aborts the rest of the run and is returned unchanged.

mod retrieve;
mod trigger;

pub use retrieve::RetrievalWorkflow;
pub use trigger::TriggerWorkflow;
