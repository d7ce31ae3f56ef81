//! Download an archive for a spec and record its provenance.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::RemoteConfig;
use crate::error::{RemoteError, Result};
use crate::github::HostingApi;
use crate::provenance::{ProvenanceRecord, ProvenanceStore, ShaSource, determine_sha};
use crate::remote::RemoteDescriptor;

use super::batch::{BatchItem, run_batch};
use super::resolver::RemoteResolver;

/// What a fetch did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// A new archive was downloaded to `archive`
    Fetched { archive: PathBuf },
    /// The recorded sha still matches the remote; nothing downloaded
    UpToDate,
}

/// Report for one fetched spec.
#[derive(Debug, Clone)]
pub struct FetchReport {
    pub spec: String,
    pub descriptor: RemoteDescriptor,
    pub outcome: FetchOutcome,
    pub record: ProvenanceRecord,
    pub sha_source: ShaSource,
    pub warnings: Vec<String>,
}

impl FetchReport {
    pub fn is_up_to_date(&self) -> bool {
        self.outcome == FetchOutcome::UpToDate
    }
}

pub struct FetchPipeline<'a> {
    resolver: RemoteResolver<'a>,
    api: &'a dyn HostingApi,
    store: &'a ProvenanceStore,
    download_dir: PathBuf,
}

impl<'a> FetchPipeline<'a> {
    pub fn new(
        config: &'a RemoteConfig,
        api: &'a dyn HostingApi,
        store: &'a ProvenanceStore,
        download_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            resolver: RemoteResolver::new(config, api),
            api,
            store,
            download_dir: download_dir.into(),
        }
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    /// Fetch one spec.
    ///
    /// Unless `force` is set, a package whose recorded sha still matches the
    /// remote ref is reported as up to date without downloading.
    pub fn fetch(&self, spec: &str, force: bool) -> Result<FetchReport> {
        let built = self.resolver.remote(spec)?;
        let mut descriptor = built.descriptor;
        let key = descriptor.key();

        if !force && let Some(previous) = self.store.get(&key)? {
            let current = self
                .api
                .commit(descriptor.owner(), descriptor.repo(), descriptor.reference())?;
            if current.sha == previous.sha {
                info!("{} is up to date at {}", descriptor, short_sha(&current.sha));
                let record = ProvenanceRecord::new(&descriptor, &current.sha);
                return Ok(FetchReport {
                    spec: spec.to_string(),
                    descriptor: descriptor.with_sha(current.sha),
                    outcome: FetchOutcome::UpToDate,
                    record,
                    sha_source: ShaSource::Api,
                    warnings: built.warnings,
                });
            }
            debug!(
                "{} moved from {} to {}",
                descriptor,
                short_sha(&previous.sha),
                short_sha(&current.sha)
            );
            descriptor = descriptor.with_sha(current.sha);
        }

        let archive = self.archive_path(&descriptor);
        self.download(&descriptor, &archive)?;

        let resolved = determine_sha(&descriptor, Some(&archive), self.api)?;
        let record = ProvenanceRecord::new(&descriptor, &resolved.sha);
        self.store.put(&key, record.clone())?;

        info!(
            "Fetched {} at {} into {}",
            descriptor,
            short_sha(&resolved.sha),
            archive.display()
        );

        Ok(FetchReport {
            spec: spec.to_string(),
            descriptor: descriptor.with_sha(resolved.sha),
            outcome: FetchOutcome::Fetched { archive },
            record,
            sha_source: resolved.source,
            warnings: built.warnings,
        })
    }

    /// Fetch every spec in order; a failed spec does not stop the rest.
    pub fn fetch_all<S: AsRef<str>>(
        &self,
        specs: &[S],
        force: bool,
    ) -> Vec<BatchItem<FetchReport>> {
        run_batch(specs, |spec| self.fetch(spec, force))
    }

    /// `<download_dir>/<hash>.zip`, keyed by the zipball URL.
    pub fn archive_path(&self, descriptor: &RemoteDescriptor) -> PathBuf {
        let url = format!("{}{}", descriptor.host(), descriptor.zipball_path());
        self.download_dir.join(format!("{}.zip", hash_url(&url)))
    }

    fn download(&self, descriptor: &RemoteDescriptor, archive: &Path) -> Result<()> {
        fs::create_dir_all(&self.download_dir).map_err(|err| RemoteError::Download {
            url: descriptor.zipball_path(),
            status: None,
            message: format!(
                "Failed to create download directory {}: {}",
                self.download_dir.display(),
                err
            ),
        })?;

        debug!("Downloading {} to {}", descriptor, archive.display());
        self.api.download_zipball(
            descriptor.owner(),
            descriptor.repo(),
            descriptor.reference(),
            archive,
        )
    }
}

fn hash_url(url: &str) -> String {
    let hash = blake3::hash(url.as_bytes());
    hash.to_hex()[..32].to_string()
}

fn short_sha(sha: &str) -> &str {
    sha.get(..7).unwrap_or(sha)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeApi, zipball_with_sha};
    use tempfile::TempDir;

    const OLD_SHA: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
    const NEW_SHA: &str = "bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";

    struct Fixture {
        temp: TempDir,
        config: RemoteConfig,
        store: ProvenanceStore,
    }

    impl Fixture {
        fn new() -> Self {
            let temp = TempDir::new().unwrap();
            let store = ProvenanceStore::new(&temp.path().join("state"));
            Self {
                temp,
                config: RemoteConfig::default(),
                store,
            }
        }

        fn pipeline<'a>(&'a self, api: &'a FakeApi) -> FetchPipeline<'a> {
            FetchPipeline::new(
                &self.config,
                api,
                &self.store,
                self.temp.path().join("downloads"),
            )
        }
    }

    #[test]
    fn first_fetch_downloads_and_records() {
        let fixture = Fixture::new();
        let api = FakeApi::new().with_archive(zipball_with_sha(NEW_SHA));

        let report = fixture.pipeline(&api).fetch("hadley/httr", false).unwrap();

        let FetchOutcome::Fetched { archive } = &report.outcome else {
            panic!("expected a download, got {:?}", report.outcome);
        };
        assert!(archive.exists());
        assert_eq!(archive.extension().unwrap(), "zip");
        assert_eq!(report.sha_source, ShaSource::Archive);
        assert_eq!(report.record.sha, NEW_SHA);
        assert_eq!(report.descriptor.sha(), Some(NEW_SHA));

        let stored = fixture.store.get("hadley/httr").unwrap().unwrap();
        assert_eq!(stored, report.record);
        assert_eq!(api.calls(), vec!["/repos/hadley/httr/zipball/master"]);
    }

    #[test]
    fn unchanged_sha_is_up_to_date() {
        let fixture = Fixture::new();
        let api = FakeApi::new()
            .with_archive(zipball_with_sha(OLD_SHA))
            .with_commit("hadley", "httr", "master", OLD_SHA);
        let pipeline = fixture.pipeline(&api);

        pipeline.fetch("hadley/httr", false).unwrap();
        let report = pipeline.fetch("hadley/httr", false).unwrap();

        assert!(report.is_up_to_date());
        assert_eq!(report.record.sha, OLD_SHA);
        assert_eq!(
            api.calls(),
            vec![
                "/repos/hadley/httr/zipball/master",
                "/repos/hadley/httr/commits/master",
            ]
        );
    }

    #[test]
    fn moved_ref_downloads_with_known_sha() {
        let fixture = Fixture::new();
        let api = FakeApi::new()
            .with_archive(zipball_with_sha(OLD_SHA))
            .with_commit("hadley", "httr", "master", NEW_SHA);
        let pipeline = fixture.pipeline(&api);

        pipeline.fetch("hadley/httr", false).unwrap();
        let report = pipeline.fetch("hadley/httr", false).unwrap();

        assert!(!report.is_up_to_date());
        assert_eq!(report.sha_source, ShaSource::Known);
        assert_eq!(report.record.sha, NEW_SHA);
        assert_eq!(
            fixture.store.get("hadley/httr").unwrap().unwrap().sha,
            NEW_SHA
        );
    }

    #[test]
    fn force_skips_the_up_to_date_check() {
        let fixture = Fixture::new();
        let api = FakeApi::new().with_archive(zipball_with_sha(OLD_SHA));
        let pipeline = fixture.pipeline(&api);

        pipeline.fetch("hadley/httr", false).unwrap();
        let report = pipeline.fetch("hadley/httr", true).unwrap();

        assert!(!report.is_up_to_date());
        assert!(
            !api.calls().iter().any(|call| call.contains("/commits/")),
            "force must not ask for the current commit"
        );
    }

    #[test]
    fn archive_without_comment_falls_back_to_api() {
        let fixture = Fixture::new();
        let api = FakeApi::new()
            .with_archive(b"not a zip".to_vec())
            .with_commit("hadley", "httr", "v1.0", NEW_SHA);

        let report = fixture.pipeline(&api).fetch("hadley/httr@v1.0", false).unwrap();

        assert_eq!(report.sha_source, ShaSource::Api);
        assert_eq!(report.record.sha, NEW_SHA);
        assert_eq!(report.record.reference, "v1.0");
    }

    #[test]
    fn ref_with_hash_is_fetched_and_recorded_verbatim() {
        let fixture = Fixture::new();
        let api = FakeApi::new()
            .with_archive(b"no comment".to_vec())
            .with_commit("hadley", "httr", "release#2", NEW_SHA);

        let report = fixture.pipeline(&api).fetch("hadley/httr@release#2", false).unwrap();

        assert_eq!(
            api.calls(),
            vec![
                "/repos/hadley/httr/zipball/release%232",
                "/repos/hadley/httr/commits/release%232",
            ]
        );
        assert_eq!(report.record.reference, "release#2");
        assert_eq!(report.record.sha, NEW_SHA);
    }

    #[test]
    fn download_failure_records_nothing() {
        let fixture = Fixture::new();
        let api = FakeApi::new().failing_with(500);

        let err = fixture.pipeline(&api).fetch("hadley/httr", false).unwrap_err();

        assert_eq!(err.status(), Some(500));
        assert_eq!(fixture.store.get("hadley/httr").unwrap(), None);
    }

    #[test]
    fn archive_path_is_stable_per_url() {
        let fixture = Fixture::new();
        let api = FakeApi::new();
        let pipeline = fixture.pipeline(&api);
        let resolver = RemoteResolver::new(&fixture.config, &api);

        let master = resolver.remote("hadley/httr").unwrap().descriptor;
        let again = resolver.remote("hadley/httr@master").unwrap().descriptor;
        let tagged = resolver.remote("hadley/httr@v1.0").unwrap().descriptor;

        let path = pipeline.archive_path(&master);
        assert_eq!(path, pipeline.archive_path(&again));
        assert_ne!(path, pipeline.archive_path(&tagged));
        assert_eq!(path.file_stem().unwrap().len(), 32);
        assert!(path.starts_with(pipeline.download_dir()));
    }

    #[test]
    fn batch_continues_after_failure() {
        let fixture = Fixture::new();
        let api = FakeApi::new().with_archive(zipball_with_sha(NEW_SHA));

        let items = fixture
            .pipeline(&api)
            .fetch_all(&["a/b", "bad spec@@", "c/d"], false);

        assert_eq!(items.len(), 3);
        assert!(items[0].is_ok());
        assert!(!items[1].is_ok());
        assert!(items[2].is_ok());
        assert!(fixture.store.get("a/b").unwrap().is_some());
        assert!(fixture.store.get("c/d").unwrap().is_some());
    }
}
