//! Commit sha recovery from zipball comments.
//!
//! The hosting service writes the commit sha as the zip archive comment.
//! The end-of-central-directory record is 22 bytes followed by the comment,
//! so with a 40 byte comment the comment-length field sits 42 bytes before
//! the end of the file.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use crate::error::{RemoteError, Result};

/// Length of a hex-encoded SHA-1.
pub const SHA_LEN: usize = 40;

/// Offset of the comment-length field from the end of the file.
const COMMENT_LEN_OFFSET: i64 = SHA_LEN as i64 + 2;

/// Read the commit sha stored in a zipball's archive comment.
///
/// Returns `Ok(None)` when the archive has no 40 byte ASCII comment (older
/// or re-zipped archives). Only failing to open, seek or read the file is
/// an error.
pub fn extract_sha(path: &Path) -> Result<Option<String>> {
    let read_error = |source| RemoteError::ArchiveRead {
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::open(path).map_err(read_error)?;
    let len = file.metadata().map_err(read_error)?.len();
    if len < COMMENT_LEN_OFFSET as u64 {
        return Ok(None);
    }

    file.seek(SeekFrom::End(-COMMENT_LEN_OFFSET))
        .map_err(read_error)?;

    let mut len_field = [0u8; 2];
    file.read_exact(&mut len_field).map_err(read_error)?;
    if u16::from_le_bytes(len_field) as usize != SHA_LEN {
        return Ok(None);
    }

    let mut sha = [0u8; SHA_LEN];
    file.read_exact(&mut sha).map_err(read_error)?;
    if !sha.is_ascii() {
        return Ok(None);
    }

    Ok(String::from_utf8(sha.to_vec()).ok())
}
