//! reqwest-backed [`HostingApi`] implementation.

use std::path::Path;

use anyhow::Context;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::config::RemoteConfig;
use crate::error::{RemoteError, Result};

use super::{Commit, HostingApi, PullRequest, Release, endpoints, lookup_error};

/// Password sent alongside a token in HTTP basic auth.
pub const AUTH_SENTINEL_PASSWORD: &str = "x-oauth-basic";

const USER_AGENT: &str = concat!("ghremote/", env!("CARGO_PKG_VERSION"));

/// Blocking client for a GitHub-compatible REST API.
///
/// Requests run on a runtime owned by the client so callers stay
/// synchronous.
pub struct GitHubApi {
    base_url: Url,
    auth_token: Option<String>,
    client: reqwest::Client,
    runtime: tokio::runtime::Runtime,
}

impl GitHubApi {
    /// Create a client for `host`, optionally authenticating with a token.
    pub fn new(host: &str, auth_token: Option<String>) -> anyhow::Result<Self> {
        let base_url = base_url_for(host)?;
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;
        let runtime = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;

        Ok(Self {
            base_url,
            auth_token,
            client,
            runtime,
        })
    }

    /// Create a client from the host and token in a [`RemoteConfig`].
    pub fn from_config(config: &RemoteConfig) -> anyhow::Result<Self> {
        Self::new(&config.host, config.auth_token.clone())
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.as_str().trim_end_matches('/'), path)
    }

    fn request(&self, url: &str) -> reqwest::RequestBuilder {
        let request = self.client.get(url);
        match &self.auth_token {
            Some(token) => request.basic_auth(token, Some(AUTH_SENTINEL_PASSWORD)),
            None => request,
        }
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str, what: &str) -> Result<T> {
        let url = self.url(path);
        debug!(%url, "GET {}", what);

        self.runtime.block_on(async {
            let response =
                self.request(&url)
                    .send()
                    .await
                    .map_err(|err| RemoteError::RefResolution {
                        what: what.to_string(),
                        status: err.status().map(|s| s.as_u16()),
                        message: err.to_string(),
                    })?;

            let status = response.status();
            if !status.is_success() {
                return Err(lookup_error(
                    status.as_u16(),
                    what,
                    format!("HTTP {} from {}", status, url),
                ));
            }

            response
                .json::<T>()
                .await
                .map_err(|err| RemoteError::RefResolution {
                    what: what.to_string(),
                    status: Some(status.as_u16()),
                    message: format!("Unexpected response body from {}: {}", url, err),
                })
        })
    }
}

impl std::fmt::Debug for GitHubApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubApi")
            .field("base_url", &self.base_url.as_str())
            .field("authenticated", &self.auth_token.is_some())
            .finish()
    }
}

impl HostingApi for GitHubApi {
    fn pull_request(&self, owner: &str, repo: &str, number: u64) -> Result<PullRequest> {
        let what = format!("pull request #{number} in {owner}/{repo}");
        self.get_json(&endpoints::pull(owner, repo, number), &what)
    }

    fn releases(&self, owner: &str, repo: &str) -> Result<Vec<Release>> {
        let what = format!("releases of {owner}/{repo}");
        self.get_json(&endpoints::releases(owner, repo), &what)
    }

    fn commit(&self, owner: &str, repo: &str, reference: &str) -> Result<Commit> {
        let what = format!("commit for {owner}/{repo}@{reference}");
        self.get_json(&endpoints::commit(owner, repo, reference), &what)
    }

    fn download_zipball(
        &self,
        owner: &str,
        repo: &str,
        reference: &str,
        dest: &Path,
    ) -> Result<()> {
        let url = self.url(&endpoints::zipball(owner, repo, reference));
        debug!(%url, dest = %dest.display(), "Downloading zipball");

        let download_error = |status: Option<u16>, message: String| RemoteError::Download {
            url: url.clone(),
            status,
            message,
        };

        let bytes = self.runtime.block_on(async {
            let response = self
                .request(&url)
                .send()
                .await
                .map_err(|err| download_error(err.status().map(|s| s.as_u16()), err.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(download_error(
                    Some(status.as_u16()),
                    format!("HTTP {}", status),
                ));
            }

            response
                .bytes()
                .await
                .map_err(|err| download_error(Some(status.as_u16()), err.to_string()))
        })?;

        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent).map_err(|err| {
                download_error(
                    None,
                    format!("Failed to create {}: {}", parent.display(), err),
                )
            })?;
        }
        std::fs::write(dest, &bytes).map_err(|err| {
            download_error(None, format!("Failed to write {}: {}", dest.display(), err))
        })?;

        Ok(())
    }
}

/// Build the API base URL for a host.
///
/// A bare host such as `api.github.com` or `github.example.com/api/v3` gets
/// an `https://` scheme; a value that already has a scheme is used as-is.
pub fn base_url_for(host: &str) -> anyhow::Result<Url> {
    let raw = if host.contains("://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    };
    Url::parse(&raw).with_context(|| format!("Invalid API host: {}", host))
}
