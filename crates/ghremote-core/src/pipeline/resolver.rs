//! Spec string to remote descriptor.

use crate::config::RemoteConfig;
use crate::error::Result;
use crate::github::HostingApi;
use crate::remote::{DescriptorBuilder, RemoteDescriptor};
use crate::resolve::RefResolver;
use crate::spec::RepoSpec;

use super::batch::{BatchItem, run_batch};

/// A descriptor plus the non-fatal warnings raised while building it.
#[derive(Debug, Clone)]
pub struct Built {
    pub descriptor: RemoteDescriptor,
    pub warnings: Vec<String>,
}

/// Parses, applies defaults and resolves refs.
#[derive(Clone, Copy)]
pub struct RemoteResolver<'a> {
    config: &'a RemoteConfig,
    api: &'a dyn HostingApi,
}

impl<'a> RemoteResolver<'a> {
    pub fn new(config: &'a RemoteConfig, api: &'a dyn HostingApi) -> Self {
        Self { config, api }
    }

    pub fn config(&self) -> &RemoteConfig {
        self.config
    }

    /// Parse `spec` and resolve it into a descriptor.
    pub fn remote(&self, spec: &str) -> Result<Built> {
        let parsed = RepoSpec::parse(spec)?;
        self.remote_for(&parsed)
    }

    /// Resolve an already parsed spec.
    pub fn remote_for(&self, spec: &RepoSpec) -> Result<Built> {
        let builder = DescriptorBuilder::new(self.config);
        let mut warnings = Vec::new();

        let coords = builder.coordinates(spec, &mut warnings)?;
        let resolved = RefResolver::new(self.api, &self.config.default_ref)
            .resolve(spec.selector.as_ref(), &coords)?;

        Ok(Built {
            descriptor: builder.build(coords, resolved),
            warnings,
        })
    }

    /// Resolve every spec independently.
    pub fn resolve_all<S: AsRef<str>>(&self, specs: &[S]) -> Vec<BatchItem<Built>> {
        run_batch(specs, |spec| self.remote(spec))
    }
}
