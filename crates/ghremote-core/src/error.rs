//! Error types for spec parsing, resolution and provenance.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while turning a remote spec into a fetched archive.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The spec string does not match `[owner/]repo[/subdir][@ref|#pull|@*]`.
    #[error("Invalid remote spec '{spec}': {reason}")]
    InvalidSpec {
        /// The offending input
        spec: String,
        /// What went wrong and where
        reason: String,
    },

    /// Neither the spec nor the configuration names an owner.
    #[error("No owner for '{spec}': use owner/repo or configure a default owner")]
    MissingOwner { spec: String },

    /// A pull request, release or commit lookup failed.
    #[error("Failed to resolve {what}{}: {message}", status_note(.status))]
    RefResolution {
        what: String,
        /// HTTP status returned by the hosting service, if one was received
        status: Option<u16>,
        message: String,
    },

    /// The pull request, release or repository does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// The downloaded archive could not be opened or read.
    #[error("Failed to read archive {}: {source}", .path.display())]
    ArchiveRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The archive download failed.
    #[error("Failed to download {url}{}: {message}", status_note(.status))]
    Download {
        url: String,
        status: Option<u16>,
        message: String,
    },

    /// The provenance store could not be read or written.
    #[error("Provenance store error at {}: {message}", .path.display())]
    Store { path: PathBuf, message: String },
}

impl RemoteError {
    /// HTTP status carried by API failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RefResolution { status, .. } | Self::Download { status, .. } => *status,
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub(crate) fn invalid_spec(spec: &str, reason: impl Into<String>) -> Self {
        Self::InvalidSpec {
            spec: spec.to_string(),
            reason: reason.into(),
        }
    }
}

fn status_note(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" (HTTP {code})"),
        None => String::new(),
    }
}

/// A specialized Result type for remote operations.
pub type Result<T> = std::result::Result<T, RemoteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ref_resolution_message_includes_status() {
        let err = RemoteError::RefResolution {
            what: "releases of hadley/httr".to_string(),
            status: Some(401),
            message: "Bad credentials".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to resolve releases of hadley/httr (HTTP 401): Bad credentials"
        );
        assert_eq!(err.status(), Some(401));
    }

    #[test]
    fn transport_failure_has_no_status() {
        let err = RemoteError::Download {
            url: "https://api.github.com/repos/a/b/zipball/master".to_string(),
            status: None,
            message: "connection refused".to_string(),
        };
        assert!(!err.to_string().contains("HTTP"));
        assert_eq!(err.status(), None);
    }

    #[test]
    fn invalid_spec_names_the_input() {
        let err = RemoteError::invalid_spec("a//b", "empty repository at offset 2");
        assert!(err.to_string().contains("'a//b'"));
        assert!(!err.is_not_found());
    }
}
