//! Provenance record persistence in the state directory.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{RemoteError, Result};

use super::ProvenanceRecord;

const STORE_FILE: &str = "provenance.json";
const STORE_VERSION: u32 = 1;

/// On-disk document: records keyed by `owner/repo[/subdir]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvenanceDocument {
    pub version: u32,
    #[serde(default)]
    pub records: BTreeMap<String, ProvenanceRecord>,
}

impl Default for ProvenanceDocument {
    fn default() -> Self {
        Self {
            version: STORE_VERSION,
            records: BTreeMap::new(),
        }
    }
}

/// JSON store of the last recorded provenance per package.
///
/// Stored at `<state_dir>/provenance.json`, written atomically
/// (tmp + rename).
#[derive(Debug, Clone)]
pub struct ProvenanceStore {
    path: PathBuf,
}

impl ProvenanceStore {
    pub fn new(state_dir: &Path) -> Self {
        Self {
            path: state_dir.join(STORE_FILE),
        }
    }

    /// Default state directory
    ///
    /// - Unix: `$XDG_STATE_HOME/ghremote` or `~/.local/state/ghremote`
    /// - Windows: `%LOCALAPPDATA%\ghremote`
    pub fn default_state_dir() -> anyhow::Result<PathBuf> {
        let base = if cfg!(unix) {
            dirs::state_dir()
                .or_else(dirs::data_local_dir)
                .ok_or_else(|| anyhow::anyhow!("Cannot determine state directory"))?
        } else {
            dirs::data_local_dir()
                .ok_or_else(|| anyhow::anyhow!("Cannot determine local app data directory"))?
        };
        Ok(base.join("ghremote"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the document, or an empty one when the file does not exist.
    pub fn load(&self) -> Result<ProvenanceDocument> {
        if !self.path.exists() {
            return Ok(ProvenanceDocument::default());
        }

        let bytes = fs::read(&self.path)
            .map_err(|err| self.error(format!("Failed to read store: {}", err)))?;
        let document: ProvenanceDocument = serde_json::from_slice(&bytes)
            .map_err(|err| self.error(format!("Failed to parse store: {}", err)))?;
        if document.version != STORE_VERSION {
            return Err(self.error(format!(
                "Unsupported store version: {}",
                document.version
            )));
        }
        Ok(document)
    }

    pub fn save(&self, document: &ProvenanceDocument) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|err| {
                self.error(format!(
                    "Failed to create state directory {}: {}",
                    parent.display(),
                    err
                ))
            })?;
        }

        let json = serde_json::to_vec_pretty(document)
            .map_err(|err| self.error(format!("Failed to serialize store: {}", err)))?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, json)
            .map_err(|err| self.error(format!("Failed to write temp store: {}", err)))?;
        fs::rename(&tmp_path, &self.path)
            .map_err(|err| self.error(format!("Failed to replace store: {}", err)))?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<Option<ProvenanceRecord>> {
        Ok(self.load()?.records.remove(key))
    }

    /// Insert or replace the record for `key`.
    pub fn put(&self, key: &str, record: ProvenanceRecord) -> Result<()> {
        let mut document = self.load()?;
        document.records.insert(key.to_string(), record);
        self.save(&document)
    }

    fn error(&self, message: String) -> RemoteError {
        RemoteError::Store {
            path: self.path.clone(),
            message,
        }
    }
}
