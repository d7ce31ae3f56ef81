#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde_json::Value;

use ghremote_core::error::{RemoteError, Result};
use ghremote_core::github::{Commit, HostingApi, PullRequest, Release, endpoints};

/// Hosting API answering from canned JSON bodies, keyed by API path.
///
/// Bodies go through serde exactly like real responses, so field names
/// such as `head.ref` are exercised.
#[derive(Default)]
pub struct RecordedApi {
    responses: HashMap<String, Value>,
    archives: HashMap<String, Vec<u8>>,
    requests: RefCell<Vec<String>>,
}

impl RecordedApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, path: impl Into<String>, body: Value) -> Self {
        self.responses.insert(path.into(), body);
        self
    }

    pub fn serve_archive(
        mut self,
        owner: &str,
        repo: &str,
        reference: &str,
        bytes: Vec<u8>,
    ) -> Self {
        self.archives
            .insert(endpoints::zipball(owner, repo, reference), bytes);
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }

    fn get<T: DeserializeOwned>(&self, path: String, what: String) -> Result<T> {
        self.requests.borrow_mut().push(path.clone());
        let body = self
            .responses
            .get(&path)
            .cloned()
            .ok_or(RemoteError::NotFound(what.clone()))?;
        serde_json::from_value(body).map_err(|err| RemoteError::RefResolution {
            what,
            status: None,
            message: err.to_string(),
        })
    }
}

impl HostingApi for RecordedApi {
    fn pull_request(&self, owner: &str, repo: &str, number: u64) -> Result<PullRequest> {
        self.get(
            endpoints::pull(owner, repo, number),
            format!("pull request #{number} in {owner}/{repo}"),
        )
    }

    fn releases(&self, owner: &str, repo: &str) -> Result<Vec<Release>> {
        self.get(
            endpoints::releases(owner, repo),
            format!("releases of {owner}/{repo}"),
        )
    }

    fn commit(&self, owner: &str, repo: &str, reference: &str) -> Result<Commit> {
        self.get(
            endpoints::commit(owner, repo, reference),
            format!("commit for {owner}/{repo}@{reference}"),
        )
    }

    fn download_zipball(
        &self,
        owner: &str,
        repo: &str,
        reference: &str,
        dest: &Path,
    ) -> Result<()> {
        let path = endpoints::zipball(owner, repo, reference);
        self.requests.borrow_mut().push(path.clone());
        let bytes = self.archives.get(&path).ok_or_else(|| RemoteError::Download {
            url: path.clone(),
            status: Some(404),
            message: "no archive".to_string(),
        })?;
        std::fs::write(dest, bytes).map_err(|err| RemoteError::Download {
            url: path,
            status: None,
            message: err.to_string(),
        })
    }
}

/// Zip archive with `comment` as its archive comment.
pub fn zipball(comment: &str) -> Vec<u8> {
    let mut buf = std::io::Cursor::new(Vec::new());
    {
        let mut zip = zip::ZipWriter::new(&mut buf);
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored);
        zip.start_file("owner-repo-abc1234/DESCRIPTION", options)
            .unwrap();
        zip.write_all(b"Package: repo\nVersion: 0.1.0\n").unwrap();
        zip.set_comment(comment);
        zip.finish().unwrap();
    }
    buf.into_inner()
}
