//! Reference resolution.
//!
//! Turns a [`Selector`] into a concrete ref:
//!
//! | Selector    | Result                              | API calls |
//! |-------------|-------------------------------------|-----------|
//! | absent      | configured default ref (`master`)   | 0         |
//! | `@ref`      | `ref` unchanged                     | 0         |
//! | `#number`   | head branch, owner of the head repo | 1         |
//! | `@*`        | tag of the newest release           | 1         |

use tracing::debug;

use crate::error::{RemoteError, Result};
use crate::github::HostingApi;
use crate::remote::RepoCoords;
use crate::spec::Selector;

/// A concrete ref and the owner whose repository holds it.
///
/// `owner` differs from the input coordinates when a pull request comes
/// from a fork.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRef {
    pub owner: String,
    pub reference: String,
}

impl ResolvedRef {
    fn new(owner: impl Into<String>, reference: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            reference: reference.into(),
        }
    }
}

/// Resolves selectors against a hosting API.
pub struct RefResolver<'a> {
    api: &'a dyn HostingApi,
    default_ref: &'a str,
}

impl<'a> RefResolver<'a> {
    pub fn new(api: &'a dyn HostingApi, default_ref: &'a str) -> Self {
        Self { api, default_ref }
    }

    pub fn resolve(&self, selector: Option<&Selector>, coords: &RepoCoords) -> Result<ResolvedRef> {
        match selector {
            None => Ok(ResolvedRef::new(&coords.owner, self.default_ref)),
            Some(Selector::Ref(reference)) => Ok(ResolvedRef::new(&coords.owner, reference)),
            Some(Selector::Pull(number)) => self.resolve_pull(*number, coords),
            Some(Selector::Release) => self.resolve_release(coords),
        }
    }

    fn resolve_pull(&self, number: u64, coords: &RepoCoords) -> Result<ResolvedRef> {
        let pull = self.api.pull_request(&coords.owner, &coords.repo, number)?;
        debug!(
            "Pull request #{} in {}/{} resolved to {}:{}",
            number, coords.owner, coords.repo, pull.user.login, pull.head.reference
        );
        Ok(ResolvedRef::new(pull.user.login, pull.head.reference))
    }

    fn resolve_release(&self, coords: &RepoCoords) -> Result<ResolvedRef> {
        let releases = self.api.releases(&coords.owner, &coords.repo)?;
        // The API lists releases newest first.
        let latest = releases.into_iter().next().ok_or_else(|| {
            RemoteError::NotFound(format!("release of {}/{}", coords.owner, coords.repo))
        })?;
        debug!(
            "Latest release of {}/{} is {}",
            coords.owner, coords.repo, latest.tag_name
        );
        Ok(ResolvedRef::new(&coords.owner, latest.tag_name))
    }
}
