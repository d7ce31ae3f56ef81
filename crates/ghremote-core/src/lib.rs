//! ghremote Core Library
//!
//! Resolves `owner/repo/subdir@ref` style remote specs into download
//! descriptors, fetches archives from a GitHub-compatible API and records
//! the exact commit each archive was built from.

pub mod config;
pub mod error;
pub mod github;
pub mod pipeline;
pub mod provenance;
pub mod remote;
pub mod resolve;
pub mod spec;

#[cfg(test)]
pub(crate) mod testing;

/// Re-exports of commonly used types
pub mod prelude {
    // Configuration
    pub use crate::config::{ConfigStore, RemoteConfig};

    // Errors
    pub use crate::error::{RemoteError, Result};

    // Parsing and resolution
    pub use crate::remote::{DescriptorBuilder, RemoteDescriptor, RepoCoords};
    pub use crate::resolve::{RefResolver, ResolvedRef};
    pub use crate::spec::{RepoSpec, Selector};

    // Hosting API
    pub use crate::github::{GitHubApi, HostingApi};

    // Provenance
    pub use crate::provenance::{ProvenanceRecord, ProvenanceStore, extract_sha};

    // Pipeline
    pub use crate::pipeline::{
        BatchItem, Built, FetchOutcome, FetchPipeline, FetchReport, RemoteResolver,
    };
}
