//! Remote descriptors: a parsed spec with defaults applied and its ref
//! resolved, ready for download.

use tracing::warn;

use crate::config::RemoteConfig;
use crate::error::{RemoteError, Result};
use crate::github::endpoints;
use crate::resolve::ResolvedRef;
use crate::spec::RepoSpec;

/// Repository coordinates after owner and subdir defaults are applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoCoords {
    pub owner: String,
    pub repo: String,
    pub subdir: Option<String>,
}

/// Everything needed to download and record one remote package.
///
/// Built once and not mutated afterwards; a sha can be attached by value
/// with [`RemoteDescriptor::with_sha`].
#[derive(Clone, PartialEq, Eq)]
pub struct RemoteDescriptor {
    host: String,
    owner: String,
    repo: String,
    subdir: Option<String>,
    reference: String,
    auth_token: Option<String>,
    sha: Option<String>,
}

impl RemoteDescriptor {
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn repo(&self) -> &str {
        &self.repo
    }

    pub fn subdir(&self) -> Option<&str> {
        self.subdir.as_deref()
    }

    /// Resolved ref (branch, tag or commit) to download.
    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token.as_deref()
    }

    /// Commit sha, when already known.
    pub fn sha(&self) -> Option<&str> {
        self.sha.as_deref()
    }

    pub fn with_sha(mut self, sha: impl Into<String>) -> Self {
        self.sha = Some(sha.into());
        self
    }

    /// Key identifying the package independent of its ref:
    /// `owner/repo` or `owner/repo/subdir`.
    pub fn key(&self) -> String {
        match &self.subdir {
            Some(subdir) => format!("{}/{}/{}", self.owner, self.repo, subdir),
            None => format!("{}/{}", self.owner, self.repo),
        }
    }

    /// API path of the zipball for the resolved ref.
    pub fn zipball_path(&self) -> String {
        endpoints::zipball(&self.owner, &self.repo, &self.reference)
    }

    /// API path of the commit for the resolved ref.
    pub fn commit_path(&self) -> String {
        endpoints::commit(&self.owner, &self.repo, &self.reference)
    }
}

impl std::fmt::Debug for RemoteDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteDescriptor")
            .field("host", &self.host)
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("subdir", &self.subdir)
            .field("reference", &self.reference)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "<redacted>"))
            .field("sha", &self.sha)
            .finish()
    }
}

impl std::fmt::Display for RemoteDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.key(), self.reference)
    }
}

/// Combines a parsed spec with configured defaults.
///
/// Owner and subdir defaults are applied first (resolving a pull request
/// needs the owner), the resolved ref is attached afterwards. No network
/// access happens here.
#[derive(Debug, Clone, Copy)]
pub struct DescriptorBuilder<'a> {
    config: &'a RemoteConfig,
}

impl<'a> DescriptorBuilder<'a> {
    pub fn new(config: &'a RemoteConfig) -> Self {
        Self { config }
    }

    /// Apply owner and subdir defaults to a spec.
    ///
    /// Falling back to the configured owner is deprecated usage: a warning
    /// is logged and pushed onto `warnings`.
    pub fn coordinates(&self, spec: &RepoSpec, warnings: &mut Vec<String>) -> Result<RepoCoords> {
        let owner = match (&spec.owner, &self.config.default_owner) {
            (Some(owner), _) => owner.clone(),
            (None, Some(fallback)) => {
                let message = format!(
                    "Default owner '{}' used for '{}' is deprecated; write '{}/{}' instead",
                    fallback, spec, fallback, spec
                );
                warn!("{}", message);
                warnings.push(message);
                fallback.clone()
            }
            (None, None) => {
                return Err(RemoteError::MissingOwner {
                    spec: spec.to_string(),
                });
            }
        };

        let subdir = spec
            .subdir
            .clone()
            .or_else(|| self.config.default_subdir.clone());

        Ok(RepoCoords {
            owner,
            repo: spec.repo.clone(),
            subdir,
        })
    }

    /// Attach a resolved ref to coordinates.
    ///
    /// The resolved owner wins over the coordinate owner, so a pull request
    /// from a fork downloads from the fork.
    pub fn build(&self, coords: RepoCoords, resolved: ResolvedRef) -> RemoteDescriptor {
        RemoteDescriptor {
            host: self.config.host.clone(),
            owner: resolved.owner,
            repo: coords.repo,
            subdir: coords.subdir,
            reference: resolved.reference,
            auth_token: self.config.auth_token.clone(),
            sha: None,
        }
    }
}
