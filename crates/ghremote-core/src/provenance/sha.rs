//! Choosing the commit sha recorded for a download.

use std::path::Path;

use tracing::debug;

use crate::error::Result;
use crate::github::HostingApi;
use crate::remote::RemoteDescriptor;

use super::extract_sha;

/// Where a recorded sha came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaSource {
    /// Already known before download (descriptor or previous record)
    Known,
    /// Read from the downloaded archive's comment
    Archive,
    /// Looked up through the commits API
    Api,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSha {
    pub sha: String,
    pub source: ShaSource,
}

/// Determine the final sha, cheapest source first: a sha already on the
/// descriptor, then the archive comment, then one commits API call.
pub fn determine_sha(
    descriptor: &RemoteDescriptor,
    archive: Option<&Path>,
    api: &dyn HostingApi,
) -> Result<ResolvedSha> {
    if let Some(sha) = descriptor.sha() {
        return Ok(ResolvedSha {
            sha: sha.to_string(),
            source: ShaSource::Known,
        });
    }

    if let Some(path) = archive
        && let Some(sha) = extract_sha(path)?
    {
        return Ok(ResolvedSha {
            sha,
            source: ShaSource::Archive,
        });
    }

    debug!(
        "No sha in archive for {}, asking the commits API",
        descriptor
    );
    let commit = api.commit(descriptor.owner(), descriptor.repo(), descriptor.reference())?;
    Ok(ResolvedSha {
        sha: commit.sha,
        source: ShaSource::Api,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RemoteConfig;
    use crate::remote::DescriptorBuilder;
    use crate::resolve::ResolvedRef;
    use crate::spec::RepoSpec;
    use crate::testing::FakeApi;
    use tempfile::TempDir;

    const ARCHIVE_SHA: &str = "1111111111111111111111111111111111111111";
    const API_SHA: &str = "2222222222222222222222222222222222222222";
    const KNOWN_SHA: &str = "3333333333333333333333333333333333333333";

    fn descriptor() -> RemoteDescriptor {
        let config = RemoteConfig::default();
        let builder = DescriptorBuilder::new(&config);
        let coords = builder
            .coordinates(&RepoSpec::parse("hadley/httr").unwrap(), &mut Vec::new())
            .unwrap();
        builder.build(
            coords,
            ResolvedRef {
                owner: "hadley".to_string(),
                reference: "master".to_string(),
            },
        )
    }

    fn archive_with_trailer(dir: &TempDir, trailer: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join("archive.zip");
        let mut bytes = b"PK\x05\x06".to_vec();
        bytes.extend_from_slice(&[0u8; 18]);
        bytes.extend_from_slice(trailer);
        std::fs::write(&path, bytes).unwrap();
        path
    }

    fn commented(sha: &str) -> Vec<u8> {
        let mut trailer = vec![0x28, 0x00];
        trailer.extend_from_slice(sha.as_bytes());
        trailer
    }

    #[test]
    fn known_sha_wins_without_io() {
        let api = FakeApi::new().with_commit("hadley", "httr", "master", API_SHA);
        let temp = TempDir::new().unwrap();
        let archive = archive_with_trailer(&temp, &commented(ARCHIVE_SHA));

        let resolved = determine_sha(
            &descriptor().with_sha(KNOWN_SHA),
            Some(&archive),
            &api,
        )
        .unwrap();

        assert_eq!(resolved.sha, KNOWN_SHA);
        assert_eq!(resolved.source, ShaSource::Known);
        assert!(api.calls().is_empty());
    }

    #[test]
    fn archive_comment_beats_api() {
        let api = FakeApi::new().with_commit("hadley", "httr", "master", API_SHA);
        let temp = TempDir::new().unwrap();
        let archive = archive_with_trailer(&temp, &commented(ARCHIVE_SHA));

        let resolved = determine_sha(&descriptor(), Some(&archive), &api).unwrap();

        assert_eq!(resolved.sha, ARCHIVE_SHA);
        assert_eq!(resolved.source, ShaSource::Archive);
        assert!(api.calls().is_empty());
    }

    #[test]
    fn falls_back_to_commit_lookup() {
        let api = FakeApi::new().with_commit("hadley", "httr", "master", API_SHA);
        let temp = TempDir::new().unwrap();
        let archive = archive_with_trailer(&temp, &[0u8; 42]);

        let resolved = determine_sha(&descriptor(), Some(&archive), &api).unwrap();

        assert_eq!(resolved.sha, API_SHA);
        assert_eq!(resolved.source, ShaSource::Api);
        assert_eq!(api.calls(), vec!["/repos/hadley/httr/commits/master"]);
    }

    #[test]
    fn no_archive_goes_straight_to_api() {
        let api = FakeApi::new().with_commit("hadley", "httr", "master", API_SHA);

        let resolved = determine_sha(&descriptor(), None, &api).unwrap();

        assert_eq!(resolved.source, ShaSource::Api);
    }

    #[test]
    fn unreadable_archive_is_an_error() {
        let api = FakeApi::new().with_commit("hadley", "httr", "master", API_SHA);
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("gone.zip");

        let err = determine_sha(&descriptor(), Some(&missing), &api).unwrap_err();

        assert!(matches!(err, crate::error::RemoteError::ArchiveRead { .. }));
        assert!(api.calls().is_empty());
    }
}
