//! Remote spec types and parsing.
//!
//! A remote spec is a compact string naming a repository on the hosting
//! service, with an optional subdirectory and revision selector:
//!
//! - `repo`
//! - `owner/repo`
//! - `owner/repo/sub/dir`
//! - `owner/repo@v1.2` (branch, tag or commit)
//! - `owner/repo#142` (pull request)
//! - `owner/repo@*` (latest release)

mod parser;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{RemoteError, Result};

use self::parser::SpecParser;

/// Marker used after `@` to select the latest release.
pub const RELEASE_MARKER: &str = "*";

/// Revision selector attached to a remote spec.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Selector {
    /// Branch, tag or commit SHA (`@ref`)
    Ref(String),
    /// Pull request number (`#142`)
    Pull(u64),
    /// Most recent release (`@*`)
    Release,
}

impl Selector {
    /// Short name of the selector kind, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Ref(_) => "ref",
            Self::Pull(_) => "pull",
            Self::Release => "release",
        }
    }

    /// True if resolving this selector needs a round trip to the hosting API.
    pub fn needs_lookup(&self) -> bool {
        !matches!(self, Self::Ref(_))
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ref(reference) => write!(f, "@{reference}"),
            Self::Pull(number) => write!(f, "#{number}"),
            Self::Release => write!(f, "@{RELEASE_MARKER}"),
        }
    }
}

/// A parsed remote spec.
///
/// `selector` is `None` when the input carried no suffix at all, which is
/// different from an explicit `@master`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoSpec {
    /// Repository owner (user or organisation)
    pub owner: Option<String>,
    /// Repository name
    pub repo: String,
    /// Subdirectory within the repository
    pub subdir: Option<String>,
    /// Revision selector
    pub selector: Option<Selector>,
}

impl RepoSpec {
    /// Create a spec naming only a repository.
    pub fn new(repo: impl Into<String>) -> Self {
        Self {
            owner: None,
            repo: repo.into(),
            subdir: None,
            selector: None,
        }
    }

    /// Set the repository owner.
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    /// Set the subdirectory path.
    pub fn with_subdir(mut self, subdir: impl Into<String>) -> Self {
        self.subdir = Some(subdir.into());
        self
    }

    /// Set the revision selector.
    pub fn with_selector(mut self, selector: Selector) -> Self {
        self.selector = Some(selector);
        self
    }

    /// Parse a remote spec string.
    ///
    /// Fails with [`RemoteError::InvalidSpec`] naming the offending field
    /// and byte offset when the input does not match
    /// `[owner/]repo[/subdir][@ref|#pull|@*]`.
    pub fn parse(spec: &str) -> Result<Self> {
        SpecParser::new(spec).parse()
    }
}

impl fmt::Display for RepoSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(owner) = &self.owner {
            write!(f, "{owner}/")?;
        }
        f.write_str(&self.repo)?;
        if let Some(subdir) = &self.subdir {
            write!(f, "/{subdir}")?;
        }
        if let Some(selector) = &self.selector {
            write!(f, "{selector}")?;
        }
        Ok(())
    }
}

impl FromStr for RepoSpec {
    type Err = RemoteError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
