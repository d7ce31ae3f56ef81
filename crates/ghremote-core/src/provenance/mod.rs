//! Provenance: which exact commit a download came from.
//!
//! - Recovering the sha from a zipball comment
//! - Choosing between a known sha, the archive and the commits API
//! - The record written for installed packages, and its store

mod archive;
mod record;
mod sha;
mod store;

pub use archive::{SHA_LEN, extract_sha};
pub use record::{LegacyFields, ProvenanceRecord, REMOTE_TYPE};
pub use sha::{ResolvedSha, ShaSource, determine_sha};
pub use store::{ProvenanceDocument, ProvenanceStore};
