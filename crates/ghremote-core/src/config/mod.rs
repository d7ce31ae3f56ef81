//! Configuration for remote resolution.
//!
//! Defaults that a spec string does not carry itself (API host, fallback
//! owner and subdirectory, default ref) plus the optional access token.
//! The token is never read from disk or from the environment here; the
//! frontend sources it and threads it through [`RemoteConfig::with_auth_token`].

pub mod store;

use serde::{Deserialize, Serialize};

use crate::github::DEFAULT_HOST;

pub use store::ConfigStore;

/// Ref used when a spec has no selector.
pub const DEFAULT_REF: &str = "master";

/// Environment variable the CLI reads the access token from.
pub const DEFAULT_TOKEN_ENV: &str = "GITHUB_PAT";

/// Remote resolution settings.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// API host, e.g. `api.github.com` or `github.example.com/api/v3`
    pub host: String,

    /// Access token sent with every API request
    #[serde(skip)]
    pub auth_token: Option<String>,

    /// Name of the environment variable holding the token
    pub token_env: String,

    /// Owner used when a spec omits one (deprecated usage, warns)
    pub default_owner: Option<String>,

    /// Subdirectory used when a spec omits one
    pub default_subdir: Option<String>,

    /// Ref used when a spec has no selector
    pub default_ref: String,
}

impl RemoteConfig {
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    pub fn with_default_owner(mut self, owner: impl Into<String>) -> Self {
        self.default_owner = Some(owner.into());
        self
    }

    pub fn with_default_subdir(mut self, subdir: impl Into<String>) -> Self {
        self.default_subdir = Some(subdir.into());
        self
    }

    pub fn with_default_ref(mut self, reference: impl Into<String>) -> Self {
        self.default_ref = reference.into();
        self
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            auth_token: None,
            token_env: DEFAULT_TOKEN_ENV.to_string(),
            default_owner: None,
            default_subdir: None,
            default_ref: DEFAULT_REF.to_string(),
        }
    }
}

impl std::fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteConfig")
            .field("host", &self.host)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "<redacted>"))
            .field("token_env", &self.token_env)
            .field("default_owner", &self.default_owner)
            .field("default_subdir", &self.default_subdir)
            .field("default_ref", &self.default_ref)
            .finish()
    }
}
