//! Provenance records written alongside installed packages.
//!
//! Field names are read by external tools and must not change. The
//! `Github*` fields duplicate the `Remote*` ones for older readers.

use serde::{Deserialize, Serialize};

use crate::remote::RemoteDescriptor;

/// Value of `RemoteType` for records produced here.
pub const REMOTE_TYPE: &str = "github";

/// Where an installed package came from, pinned to an exact commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvenanceRecord {
    #[serde(rename = "RemoteType")]
    pub remote_type: String,

    #[serde(rename = "RemoteHost")]
    pub host: String,

    #[serde(rename = "RemoteRepo")]
    pub repo: String,

    #[serde(rename = "RemoteUsername")]
    pub owner: String,

    #[serde(rename = "RemoteRef")]
    pub reference: String,

    #[serde(rename = "RemoteSha")]
    pub sha: String,

    #[serde(
        rename = "RemoteSubdir",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub subdir: Option<String>,

    #[serde(flatten)]
    pub legacy: LegacyFields,
}

/// Legacy aliases of the `Remote*` fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyFields {
    #[serde(rename = "GithubRepo")]
    pub repo: String,

    #[serde(rename = "GithubUsername")]
    pub owner: String,

    #[serde(rename = "GithubRef")]
    pub reference: String,

    #[serde(rename = "GithubSHA1")]
    pub sha: String,

    #[serde(
        rename = "GithubSubdir",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub subdir: Option<String>,
}

impl ProvenanceRecord {
    /// Record a descriptor pinned to `sha`.
    pub fn new(descriptor: &RemoteDescriptor, sha: impl Into<String>) -> Self {
        let sha = sha.into();
        let subdir = descriptor.subdir().map(str::to_string);

        Self {
            remote_type: REMOTE_TYPE.to_string(),
            host: descriptor.host().to_string(),
            repo: descriptor.repo().to_string(),
            owner: descriptor.owner().to_string(),
            reference: descriptor.reference().to_string(),
            sha: sha.clone(),
            subdir: subdir.clone(),
            legacy: LegacyFields {
                repo: descriptor.repo().to_string(),
                owner: descriptor.owner().to_string(),
                reference: descriptor.reference().to_string(),
                sha,
                subdir,
            },
        }
    }

    /// Fields in manifest order, legacy aliases last.
    pub fn manifest_fields(&self) -> Vec<(&'static str, &str)> {
        let mut fields = vec![
            ("RemoteType", self.remote_type.as_str()),
            ("RemoteHost", self.host.as_str()),
            ("RemoteRepo", self.repo.as_str()),
            ("RemoteUsername", self.owner.as_str()),
            ("RemoteRef", self.reference.as_str()),
            ("RemoteSha", self.sha.as_str()),
        ];
        if let Some(subdir) = &self.subdir {
            fields.push(("RemoteSubdir", subdir.as_str()));
        }
        fields.extend([
            ("GithubRepo", self.legacy.repo.as_str()),
            ("GithubUsername", self.legacy.owner.as_str()),
            ("GithubRef", self.legacy.reference.as_str()),
            ("GithubSHA1", self.legacy.sha.as_str()),
        ]);
        if let Some(subdir) = &self.legacy.subdir {
            fields.push(("GithubSubdir", subdir.as_str()));
        }
        fields
    }

    /// `Key: value` lines for a package manifest.
    pub fn to_manifest(&self) -> String {
        self.manifest_fields()
            .into_iter()
            .map(|(key, value)| format!("{key}: {value}\n"))
            .collect()
    }
}
