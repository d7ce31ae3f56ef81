//! Hosting API access for GitHub-compatible services.
//!
//! [`HostingApi`] is the seam between resolution logic and the network:
//! [`GitHubApi`] talks to a real host, tests plug in an in-memory fake.

mod client;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{RemoteError, Result};

pub use client::{AUTH_SENTINEL_PASSWORD, GitHubApi, base_url_for};

/// Default API host.
pub const DEFAULT_HOST: &str = "api.github.com";

/// Pull request as returned by `GET /repos/{owner}/{repo}/pulls/{number}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    /// Account that opened the pull request
    pub user: Account,
    /// Branch the pull request is built from
    pub head: PullHead,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub login: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullHead {
    #[serde(rename = "ref")]
    pub reference: String,
}

/// Entry of `GET /repos/{owner}/{repo}/releases`, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    pub tag_name: String,
}

/// Commit as returned by `GET /repos/{owner}/{repo}/commits/{ref}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub sha: String,
}

/// Read-only operations against the hosting service.
///
/// Implementations carry the host and credentials; every call is blocking.
pub trait HostingApi {
    /// Fetch a single pull request.
    fn pull_request(&self, owner: &str, repo: &str, number: u64) -> Result<PullRequest>;

    /// List releases, newest first.
    fn releases(&self, owner: &str, repo: &str) -> Result<Vec<Release>>;

    /// Look up the commit a ref points to.
    fn commit(&self, owner: &str, repo: &str, reference: &str) -> Result<Commit>;

    /// Download the zipball for a ref into `dest`.
    fn download_zipball(&self, owner: &str, repo: &str, reference: &str, dest: &Path)
    -> Result<()>;
}

/// API paths, relative to the host's base URL.
///
/// Owner, repo and ref are percent-encoded per `/`-separated segment, so
/// refs such as `release#2` or `fix?x` stay inside the path.
pub mod endpoints {
    use url::form_urlencoded::byte_serialize;

    pub fn pull(owner: &str, repo: &str, number: u64) -> String {
        format!("{}/pulls/{number}", repo_path(owner, repo))
    }

    pub fn releases(owner: &str, repo: &str) -> String {
        format!("{}/releases", repo_path(owner, repo))
    }

    pub fn commit(owner: &str, repo: &str, reference: &str) -> String {
        format!("{}/commits/{}", repo_path(owner, repo), escape_ref(reference))
    }

    pub fn zipball(owner: &str, repo: &str, reference: &str) -> String {
        format!("{}/zipball/{}", repo_path(owner, repo), escape_ref(reference))
    }

    fn repo_path(owner: &str, repo: &str) -> String {
        format!("/repos/{}/{}", escape_segment(owner), escape_segment(repo))
    }

    /// Branch names keep their `/` separators.
    fn escape_ref(reference: &str) -> String {
        reference
            .split('/')
            .map(escape_segment)
            .collect::<Vec<_>>()
            .join("/")
    }

    // Form encoding writes a space as `+` and a literal `+` as `%2B`.
    fn escape_segment(segment: &str) -> String {
        byte_serialize(segment.as_bytes())
            .collect::<String>()
            .replace('+', "%20")
    }
}

/// Map a non-success HTTP status from a lookup into an error.
///
/// 404 means the thing asked for does not exist; anything else is a
/// resolution failure carrying the status.
pub(crate) fn lookup_error(status: u16, what: &str, message: impl Into<String>) -> RemoteError {
    if status == 404 {
        RemoteError::NotFound(what.to_string())
    } else {
        RemoteError::RefResolution {
            what: what.to_string(),
            status: Some(status),
            message: message.into(),
        }
    }
}
