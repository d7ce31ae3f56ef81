//! End-to-end flows built from the lower modules.
//!
//! - [`RemoteResolver`]: spec string to descriptor
//! - [`FetchPipeline`]: descriptor to downloaded archive plus stored provenance
//! - Batches of either, where each spec succeeds or fails on its own

mod batch;
mod fetch;
mod resolver;

pub use batch::{BatchItem, failure_count, run_batch};
pub use fetch::{FetchOutcome, FetchPipeline, FetchReport};
pub use resolver::{Built, RemoteResolver};
