//! In-memory [`HostingApi`] for unit tests.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;

use crate::error::{RemoteError, Result};
use crate::github::{
    Account, Commit, HostingApi, PullHead, PullRequest, Release, endpoints, lookup_error,
};

#[derive(Debug, Default)]
pub(crate) struct FakeApi {
    pulls: HashMap<String, PullRequest>,
    releases: HashMap<String, Vec<Release>>,
    commits: HashMap<String, String>,
    archive: Option<Vec<u8>>,
    failure: Option<u16>,
    calls: RefCell<Vec<String>>,
}

impl FakeApi {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_pull(
        mut self,
        owner: &str,
        repo: &str,
        number: u64,
        head_owner: &str,
        head_ref: &str,
    ) -> Self {
        self.pulls.insert(
            endpoints::pull(owner, repo, number),
            PullRequest {
                user: Account {
                    login: head_owner.to_string(),
                },
                head: PullHead {
                    reference: head_ref.to_string(),
                },
            },
        );
        self
    }

    pub(crate) fn with_releases(mut self, owner: &str, repo: &str, tags: &[&str]) -> Self {
        self.releases.insert(
            endpoints::releases(owner, repo),
            tags.iter()
                .map(|tag| Release {
                    tag_name: tag.to_string(),
                })
                .collect(),
        );
        self
    }

    pub(crate) fn with_commit(
        mut self,
        owner: &str,
        repo: &str,
        reference: &str,
        sha: &str,
    ) -> Self {
        self.commits
            .insert(endpoints::commit(owner, repo, reference), sha.to_string());
        self
    }

    pub(crate) fn with_archive(mut self, bytes: Vec<u8>) -> Self {
        self.archive = Some(bytes);
        self
    }

    /// Make every call fail with the given HTTP status.
    pub(crate) fn failing_with(mut self, status: u16) -> Self {
        self.failure = Some(status);
        self
    }

    /// Paths requested so far, in order.
    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn record(&self, path: &str, what: &str) -> Result<()> {
        self.calls.borrow_mut().push(path.to_string());
        match self.failure {
            Some(status) => Err(lookup_error(status, what, format!("HTTP {status}"))),
            None => Ok(()),
        }
    }
}

impl HostingApi for FakeApi {
    fn pull_request(&self, owner: &str, repo: &str, number: u64) -> Result<PullRequest> {
        let path = endpoints::pull(owner, repo, number);
        let what = format!("pull request #{number} in {owner}/{repo}");
        self.record(&path, &what)?;
        self.pulls
            .get(&path)
            .cloned()
            .ok_or(RemoteError::NotFound(what))
    }

    fn releases(&self, owner: &str, repo: &str) -> Result<Vec<Release>> {
        let path = endpoints::releases(owner, repo);
        self.record(&path, &format!("releases of {owner}/{repo}"))?;
        Ok(self.releases.get(&path).cloned().unwrap_or_default())
    }

    fn commit(&self, owner: &str, repo: &str, reference: &str) -> Result<Commit> {
        let path = endpoints::commit(owner, repo, reference);
        let what = format!("commit for {owner}/{repo}@{reference}");
        self.record(&path, &what)?;
        self.commits
            .get(&path)
            .map(|sha| Commit { sha: sha.clone() })
            .ok_or(RemoteError::NotFound(what))
    }

    fn download_zipball(
        &self,
        owner: &str,
        repo: &str,
        reference: &str,
        dest: &Path,
    ) -> Result<()> {
        let path = endpoints::zipball(owner, repo, reference);
        self.record(&path, &format!("zipball of {owner}/{repo}@{reference}"))?;
        let bytes = self.archive.clone().unwrap_or_default();
        std::fs::write(dest, bytes).map_err(|err| RemoteError::Download {
            url: path,
            status: None,
            message: err.to_string(),
        })
    }
}

/// A small zipball with an optional archive comment.
pub(crate) fn zipball(comment: Option<&str>) -> Vec<u8> {
    use std::io::Write;

    let mut buf = std::io::Cursor::new(Vec::new());
    {
        let mut zip = zip::ZipWriter::new(&mut buf);
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored);
        zip.start_file("hadley-httr-7f2c4e1/DESCRIPTION", options)
            .unwrap();
        zip.write_all(b"Package: httr\n").unwrap();
        if let Some(comment) = comment {
            zip.set_comment(comment);
        }
        zip.finish().unwrap();
    }
    buf.into_inner()
}

/// A zipball whose comment carries `sha`, the way GitHub writes them.
pub(crate) fn zipball_with_sha(sha: &str) -> Vec<u8> {
    zipball(Some(sha))
}
